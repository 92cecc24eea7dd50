use fieldscope::Scoped;

#[derive(Scoped)]
struct Account {
    #[scope(hidden)]
    balance: u64,
}

fn main() {}
