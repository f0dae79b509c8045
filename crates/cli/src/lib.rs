// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod commands {
    pub mod import;
    pub mod inspect;
    pub mod suggest;
}

use std::path::Path;
use std::sync::Arc;

use tinta_kernel::types::Product;
use tinta_node::persistence::{FileTarget, PersistTarget};
use tinta_node::store::{Store, StoreConfig};

/// Opens the product document at `path` the way the node does.
pub fn open_store(path: &Path) -> Store<Product> {
    let target: Arc<dyn PersistTarget> = Arc::new(FileTarget::new(path));
    Store::open("products", Some(target), StoreConfig::default())
}
