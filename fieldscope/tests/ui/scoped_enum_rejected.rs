use fieldscope::Scoped;

#[derive(Scoped)]
enum Status {
    Active,
    Closed,
}

fn main() {}
