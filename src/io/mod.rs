/*!
# IO utilities

Record parsing for the TSV corpus/query files, and the partial/final
file writers used by the document tokenization pipeline.
!*/
pub mod reader;
pub mod writer;

pub use reader::{DocRecord, QueryRecord};
pub use writer::{merge_partials, OutputForm, PartialFiles};
