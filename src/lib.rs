//! This crate provides a queue of owned strings, implemented as a cyclic
//! doubly-linked list with a ghost node.
//!
//! The [`Queue`] allows inserting and removing strings at both ends in constant
//! time, and rearranges its elements in place: reversing, swapping pairs,
//! deleting the middle element or duplicated strings, and merge sorting. None
//! of the structural operations allocate; they only rewrite links.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use string_queue::Queue;
//!
//! let mut queue = Queue::new();
//! queue.insert_tail("b").unwrap();
//! queue.insert_tail("c").unwrap();
//! queue.insert_head("a").unwrap();
//! assert_eq!(queue.size(), 3);
//!
//! queue.reverse();
//! assert!(queue.iter().eq(["c", "b", "a"].iter().copied()));
//!
//! queue.sort();
//! let element = queue.remove_head(None).unwrap(); // removed, not yet freed
//! assert_eq!(element.value(), "a");
//! element.release(); // now freed
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the queue is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║  String   ║           ║  String   ║                            ↑   ↑
//! │  ╚═══════════╝           ╚═══════════╝                            │   │
//! │      Node 0                  Node 1                               │   │
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     Queue
//! ```
//! The `Queue` only holds the pointer `ghost` to the ghost node. There is no
//! length field: [`Queue::size`] counts the nodes each time it is called.
//!
//! Each element node is allocated on heap, and contains:
//! - the `next` pointer that points to the next element (or the ghost node if it
//!   is the last element in the queue);
//! - the `prev` pointer that points to the previous element (or the ghost node if
//!   it is the first element in the queue);
//! - the owned `String`, a copy of the string passed on insertion.
//!
//! The ghost node only has the two pointers. In an empty queue they point to
//! the ghost node itself.
//!
//! # Remove and Release
//!
//! Removing an element ([`Queue::remove_head`], [`Queue::remove_tail`]) only
//! unlinks it: the caller receives an [`Element`] that still owns its node and
//! string. [`Element::release`] (or dropping the element) frees them. The
//! `delete_*` operations unlink and free at once.
//!
//! # Allocation Failures
//!
//! Insertion reports allocation failures as [`QueueError`] instead of aborting,
//! and leaves the queue unmodified when it fails.
//!
//! # Features
//!
//! - `check-links`: verify every link of the queue after each structural
//!   operation, panicking on a broken one (see [`Queue::check_links`]).

#[doc(inline)]
pub use error::{QueueError, Result};
#[doc(inline)]
pub use queue::element::Element;
#[doc(inline)]
pub use queue::iterator::{IntoIter, Iter};
#[doc(inline)]
pub use queue::Queue;

pub mod error;
pub mod queue;
