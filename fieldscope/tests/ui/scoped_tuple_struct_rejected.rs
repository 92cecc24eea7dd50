use fieldscope::Scoped;

#[derive(Scoped)]
struct Pair(u8, u8);

fn main() {}
