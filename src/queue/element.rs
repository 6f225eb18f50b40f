use crate::queue::Node;
use std::fmt;

/// An element detached from a [`Queue`](crate::Queue).
///
/// Created by [`Queue::remove_head`](crate::Queue::remove_head) and
/// [`Queue::remove_tail`](crate::Queue::remove_tail). The element owns its node
/// and its string; both are freed by [`Element::release`], or when the element
/// is dropped.
pub struct Element {
    node: Box<Node>,
}

impl Element {
    /// Take ownership of a node that is no longer linked into any queue, and
    /// copy its string into `buf` if given.
    pub(crate) fn detached(node: Box<Node>, buf: Option<&mut [u8]>) -> Self {
        let element = Self { node };
        if let Some(buf) = buf {
            element.copy_to(buf);
        }
        element
    }

    /// The string held by the element.
    #[inline]
    pub fn value(&self) -> &str {
        &self.node.value
    }

    /// Copies at most `buf.len() - 1` bytes of the string into `buf`, followed
    /// by a NUL byte, and returns the number of string bytes copied.
    ///
    /// Nothing is written into an empty buffer. The copy is byte-wise, so a
    /// truncated copy may end in the middle of a UTF-8 sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("queue").unwrap();
    /// let element = queue.remove_head(None).unwrap();
    ///
    /// let mut buf = [0u8; 3];
    /// assert_eq!(element.copy_to(&mut buf), 2);
    /// assert_eq!(&buf, b"qu\0");
    ///
    /// let mut buf = [0u8; 16];
    /// assert_eq!(element.copy_to(&mut buf), 5);
    /// assert_eq!(&buf[..6], b"queue\0");
    /// ```
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let capacity = match buf.len().checked_sub(1) {
            Some(capacity) => capacity,
            None => return 0,
        };
        let bytes = self.node.value.as_bytes();
        let len = bytes.len().min(capacity);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf[len] = 0;
        len
    }

    /// Consumes the element and returns its string. The node storage is freed.
    #[inline]
    pub fn into_value(self) -> String {
        self.node.value
    }

    /// Frees the string and the node storage of the element.
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.value()).finish()
    }
}

impl AsRef<str> for Element {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

// The links of a detached node are stale and never read.
unsafe impl Send for Element {}

unsafe impl Sync for Element {}
