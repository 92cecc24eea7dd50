use fieldscope::Scoped;

#[derive(Scoped)]
#[scope("admin")]
struct Secret {
    value: String,
}

fn main() {}
