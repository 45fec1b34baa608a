// LogAtlas - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library plus parsing/serialisation crates.
// Must NOT depend on: platform, app, or the filesystem (except gazette
// loading, which reads one table file).

pub mod export;
pub mod field;
pub mod gazette;
pub mod geo;
pub mod model;
pub mod parser;
