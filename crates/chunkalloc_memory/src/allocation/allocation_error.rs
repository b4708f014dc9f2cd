use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// A single allocation has to fit into one chunk.
    #[error("Cannot allocate {count} elements of {element_size} bytes: a single allocation must fit into one {capacity}-byte chunk")]
    InvalidSize {
        count: usize,
        element_size: usize,
        capacity: usize,
    },
}
