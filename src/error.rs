use std::alloc::Layout;
use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by [`Queue`](crate::Queue) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The allocator could not provide storage for a node (or the ghost node).
    #[error("failed to allocate a queue node ({} bytes)", .layout.size())]
    NodeAlloc { layout: Layout },

    /// The allocator could not provide storage for the copy of a string.
    #[error("failed to copy a {len}-byte string into the queue")]
    StringAlloc {
        len: usize,
        #[source]
        source: TryReserveError,
    },

    /// The operation needs at least one element.
    #[error("queue is empty")]
    Empty,

    /// `node.next.prev != node` for the node at `index` (the ghost node is
    /// reported as the length of the queue).
    #[error("broken link at position {index}")]
    BrokenLink { index: usize },
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
