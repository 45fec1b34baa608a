// LogAtlas - app/mod.rs
//
// Application layer: wires filesystem reads to the core decoders.

pub mod batch;
