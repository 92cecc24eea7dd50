use fieldscope::{PermissionSet, Scoped, Unscoped};
use serde::Serialize;

#[derive(Clone, Serialize, Unscoped)]
enum Status {
    Active,
    Suspended { reason: String },
}

#[derive(Clone, Serialize, Unscoped)]
struct Point(i32, i32);

#[derive(Clone, Serialize, Unscoped)]
struct Wrapper<T>(T);

#[derive(Scoped)]
struct Device {
    status: Status,
    #[scope("ops")]
    location: Option<Point>,
    tags: Vec<Wrapper<String>>,
}

fn main() {
    let device = Device {
        status: Status::Suspended {
            reason: "maintenance".into(),
        },
        location: Some(Point(3, 4)),
        tags: vec![Wrapper("edge".into())],
    };
    let _ = fieldscope::filter(&device, &PermissionSet::new());
    let _ = Status::Active;
}
