use fieldscope::Scoped;
use serde::Serialize;

#[derive(Serialize)]
struct Audit {
    created_by: String,
}

#[derive(Scoped, Serialize)]
struct Document {
    title: String,
    #[serde(flatten)]
    audit: Audit,
}

fn main() {}
