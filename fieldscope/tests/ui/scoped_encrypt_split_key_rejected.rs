use fieldscope::Scoped;
use serde::Deserialize;

#[derive(Scoped, Deserialize)]
struct Card {
    #[scope(encrypt)]
    #[serde(rename(serialize = "num", deserialize = "number"))]
    number: String,
}

fn main() {}
