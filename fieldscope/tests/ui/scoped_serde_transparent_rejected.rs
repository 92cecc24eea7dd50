use fieldscope::Scoped;
use serde::Serialize;

#[derive(Scoped, Serialize)]
#[serde(transparent)]
struct Meters {
    value: u64,
}

fn main() {}
