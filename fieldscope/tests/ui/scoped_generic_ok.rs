use std::collections::HashMap;

use fieldscope::{OpaqueValue, PermissionSet, Scoped, ScopedContainer};

#[derive(Default, Scoped)]
struct Page<T> {
    number: u32,
    #[scope("reader")]
    items: Vec<T>,
}

#[derive(Default, Scoped)]
struct Tagged<M> {
    #[scope(opaque)]
    meta: M,
    labels: HashMap<String, OpaqueValue<M>>,
}

#[derive(Default, Scoped)]
struct Entry {
    title: String,
    #[scope("editor+reviewer")]
    draft: Option<String>,
}

fn assert_container<T: ScopedContainer>() {}

fn main() {
    assert_container::<Page<Entry>>();
    assert_container::<Page<u64>>();
    assert_container::<Tagged<(u8, bool)>>();

    let page = Page {
        number: 1,
        items: vec![Entry::default()],
    };
    let _ = fieldscope::marshal(&page, &PermissionSet::from(["reader"]));
}
