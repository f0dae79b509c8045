// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod color;
pub mod product;

pub use color::{Lab, Rgb};
pub use product::Product;
