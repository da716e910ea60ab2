#![crate_type = "lib"]
#![crate_name = "rustybase"]

pub mod algebra;
pub mod common;
pub mod config;
pub mod frontend;
pub mod storage;
pub mod types;
