use fieldscope::Unscoped;
use serde::Serialize;

#[derive(Unscoped, Serialize)]
struct Config {
    #[scope("admin")]
    token: String,
}

fn main() {}
