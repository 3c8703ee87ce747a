//! CLI command implementations.

pub mod cache;
pub mod common;
pub mod evaluate;
pub mod pygsti;
pub mod version;
