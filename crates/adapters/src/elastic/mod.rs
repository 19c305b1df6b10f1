pub mod finding_index;

pub use finding_index::EsFindingIndex;
