// ImeiSift - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: app, platform, or any filesystem access.

pub mod classify;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod query;
pub mod registry;
pub mod vision;
