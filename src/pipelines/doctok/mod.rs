//! Parallel document tokenization.
//!
//! The corpus is split into near-equal chunks of records via a persisted
//! byte-offset table, each chunk is tokenized by an independent worker,
//! and the per-chunk partial files are merged back in chunk order.
pub mod chunk;
pub mod offsets;
pub mod pipeline;

pub use offsets::OffsetTable;
pub use pipeline::DocTokenizer;
