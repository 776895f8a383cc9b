// ImeiSift - app/mod.rs
//
// Application layer: session state, queries, image recovery and the
// manual-resolution queue.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod resolution;
pub mod state;
