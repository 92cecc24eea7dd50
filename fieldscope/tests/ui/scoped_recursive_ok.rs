use std::{cell::RefCell, rc::Rc, sync::Arc};

use fieldscope::{PermissionSet, Scoped, resolve_tree};

#[derive(Default, Clone, Scoped)]
struct Folder {
    name: String,
    #[scope("owner")]
    children: Vec<Folder>,
    parent: Option<Box<Folder>>,
    shared: Option<Arc<File>>,
    pinned: Rc<RefCell<Vec<File>>>,
}

#[derive(Default, Clone, Scoped)]
struct File {
    name: String,
    #[scope("owner,admin")]
    folder: Option<Box<Folder>>,
}

fn main() {
    let tree = resolve_tree::<Folder>();
    assert!(tree.is_ok());
    let _ = fieldscope::filter(&Folder::default(), &PermissionSet::new());
}
