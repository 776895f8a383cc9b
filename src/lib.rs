// ImeiSift - lib.rs
//
// Library entry point, exposing all modules for integration testing
// and for callers that embed the pipeline in their own front end.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
