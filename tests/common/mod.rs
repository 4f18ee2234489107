//! Common test utilities for luscious-dl end-to-end tests

#[allow(dead_code)]
pub mod config;
#[allow(dead_code)]
pub mod site;

pub use config::*;
#[allow(unused_imports)]
pub use site::*;
