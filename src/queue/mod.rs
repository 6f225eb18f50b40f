use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use tracing::debug;

use crate::error::{QueueError, Result};
use crate::{Element, Iter};

pub mod element;
pub mod iterator;

mod algorithms;

/// The `Queue` is a queue of owned strings, implemented as a cyclic doubly-linked
/// list with a ghost node.
///
/// Inserting and removing at both ends take *O*(1) time. The queue keeps no
/// length counter, so [`Queue::size`] walks the whole list.
///
/// The `Queue` contains a single pointer `ghost` to the ghost (sentinel) node,
/// which has links but no payload. An empty queue is exactly a ghost node whose
/// `next` and `prev` point to itself.
///
/// # Naming Conventions
///
/// - a *link* is the `next`/`prev` pair embedded at the start of every node,
///   including the ghost node;
/// - a *node* is a link followed by the owned string of one element.
pub struct Queue {
    ghost: NonNull<Link>,
    _marker: PhantomData<Box<Node>>,
}

#[repr(C)]
pub(crate) struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

/// An element node. The link comes first, so a `NonNull<Link>` of an element
/// can be cast to a `NonNull<Node>`.
#[repr(C)]
pub(crate) struct Node {
    pub(crate) link: Link,
    pub(crate) value: String,
}

// private methods
impl Queue {
    pub(crate) fn ghost_link(&self) -> NonNull<Link> {
        self.ghost
    }
    pub(crate) fn front_link(&self) -> NonNull<Link> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the queue).
        unsafe { self.ghost.as_ref().next }
    }
    pub(crate) fn back_link(&self) -> NonNull<Link> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the queue).
        unsafe { self.ghost.as_ref().prev }
    }

    /// Detach a single element `link` from the queue, and return its node as a box.
    ///
    /// It is unsafe because it does not check whether `link` is an element of
    /// the queue. Detaching the ghost node or a foreign node makes the queue
    /// ill-formed.
    pub(crate) unsafe fn detach_node(&mut self, link: NonNull<Link>) -> Box<Node> {
        debug_assert_ne!(link, self.ghost, "Cannot detach the ghost node");
        let (prev, next) = (link.as_ref().prev, link.as_ref().next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, link);
            assert_adjacent(link, next);
        }
        connect(prev, next);
        Box::from_raw(link.cast::<Node>().as_ptr())
    }

    /// Attach a single detached node `link` to the queue, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belong
    /// to the queue, or whether they are adjacent (only in `#[cfg(debug_assertions)]`).
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        link: NonNull<Link>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, link);
        connect(link, next);
        #[cfg(debug_assertions)]
        {
            assert_adjacent(prev, link);
            assert_adjacent(link, next);
        }
    }

    /// Copy `s` into a new node and attach it between the adjacent `prev` and
    /// `next`. On failure nothing is attached and nothing is leaked.
    fn insert_between(
        &mut self,
        prev: NonNull<Link>,
        next: NonNull<Link>,
        s: &str,
    ) -> Result<()> {
        let link = Node::new_detached(s)?;
        // SAFETY: callers pass `prev` and `next` as an adjacent pair of this queue.
        unsafe { self.attach_node(prev, next, link) };
        Ok(())
    }

    /// Panics on a broken link when the `check-links` feature is enabled.
    #[inline]
    pub(crate) fn assert_links(&self) {
        #[cfg(feature = "check-links")]
        if let Err(err) = self.check_links() {
            panic!("{}", err);
        }
    }
}

impl Queue {
    /// Create an empty `Queue`, or return [`QueueError::NodeAlloc`] if the
    /// ghost node cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use string_queue::Queue;
    /// let queue = Queue::try_new().unwrap();
    /// assert!(queue.is_empty());
    /// ```
    pub fn try_new() -> Result<Self> {
        let ghost = new_ghost()?;
        let _marker = PhantomData;
        Ok(Self { ghost, _marker })
    }

    /// Create an empty `Queue`.
    ///
    /// # Aborts
    ///
    /// Calls [`handle_alloc_error`](std::alloc::handle_alloc_error) if the ghost
    /// node cannot be allocated, the same way std collections do.
    #[inline]
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(queue) => queue,
            Err(_) => alloc::handle_alloc_error(Layout::new::<Link>()),
        }
    }

    /// Returns `true` if the `Queue` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_link() == self.ghost
    }

    /// Returns the number of elements, counted by walking the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.size(), 0);
    ///
    /// queue.insert_head("b").unwrap();
    /// queue.insert_tail("c").unwrap();
    /// assert_eq!(queue.size(), 2);
    /// ```
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Releases every element of the `Queue`, keeping the ghost node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    #[inline]
    pub fn clear(&mut self) {
        while let Some(element) = self.remove_head(None) {
            element.release();
        }
    }

    /// Provides the first string, or `None` if the queue is empty.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        self.iter().next()
    }

    /// Provides the last string, or `None` if the queue is empty.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        self.iter().next_back()
    }

    /// Copies `s` into a new element at the head of the queue.
    ///
    /// Returns an error, leaving the queue unmodified, if either the node or
    /// the copy of the string cannot be allocated.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    ///
    /// queue.insert_head("b").unwrap();
    /// queue.insert_head("a").unwrap();
    /// assert_eq!(queue.front(), Some("a"));
    /// ```
    pub fn insert_head(&mut self, s: &str) -> Result<()> {
        self.insert_between(self.ghost, self.front_link(), s)
    }

    /// Copies `s` into a new element at the tail of the queue.
    ///
    /// Returns an error, leaving the queue unmodified, if either the node or
    /// the copy of the string cannot be allocated.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    ///
    /// queue.insert_tail("a").unwrap();
    /// queue.insert_tail("b").unwrap();
    /// assert_eq!(queue.back(), Some("b"));
    /// ```
    pub fn insert_tail(&mut self, s: &str) -> Result<()> {
        self.insert_between(self.back_link(), self.ghost, s)
    }

    /// Detaches the first element and returns it, or `None` if the queue is
    /// empty.
    ///
    /// The element is *removed*, not deleted: its storage now belongs to the
    /// caller, who releases it with [`Element::release`] (or by dropping it).
    ///
    /// If `buf` is given, the string is also copied into it, see
    /// [`Element::copy_to`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert!(queue.remove_head(None).is_none());
    ///
    /// queue.insert_tail("hello").unwrap();
    /// let mut buf = [0xff_u8; 4];
    /// let element = queue.remove_head(Some(&mut buf[..])).unwrap();
    /// assert_eq!(element.value(), "hello");
    /// assert_eq!(&buf, b"hel\0");
    /// element.release();
    /// ```
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the queue is not empty, so `front_link` is an element.
        let node = unsafe { self.detach_node(self.front_link()) };
        Some(Element::detached(node, buf))
    }

    /// Detaches the last element and returns it, or `None` if the queue is
    /// empty. Otherwise the same as [`Queue::remove_head`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("a").unwrap();
    /// queue.insert_tail("b").unwrap();
    ///
    /// let element = queue.remove_tail(None).unwrap();
    /// assert_eq!(element.into_value(), "b");
    /// assert_eq!(queue.size(), 1);
    /// ```
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the queue is not empty, so `back_link` is an element.
        let node = unsafe { self.detach_node(self.back_link()) };
        Some(Element::detached(node, buf))
    }

    /// Walks the whole circle and checks that `node.next.prev == node` and
    /// `node.prev.next == node` for every node, the ghost node included.
    ///
    /// Returns the position of the first bad node. Elements are indexed by
    /// 0, 1, ..., *n* - 1 and the ghost node by *n*.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["c", "a", "b"].iter().collect();
    /// queue.sort();
    /// assert!(queue.check_links().is_ok());
    /// ```
    pub fn check_links(&self) -> Result<()> {
        let mut link = self.front_link();
        let mut index = 0;
        loop {
            // SAFETY: every link reachable from the ghost node is owned by the queue.
            let (next, prev) = unsafe { (link.as_ref().next, link.as_ref().prev) };
            let consistent = unsafe { next.as_ref().prev == link && prev.as_ref().next == link };
            if !consistent {
                return Err(QueueError::BrokenLink { index });
            }
            if link == self.ghost {
                return Ok(());
            }
            link = next;
            index += 1;
        }
    }

    /// Provides a forward iterator over the strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let queue: Queue = ["x", "y"].iter().collect();
    /// let mut iter = queue.iter();
    /// assert_eq!(iter.next(), Some("x"));
    /// assert_eq!(iter.next(), Some("y"));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Allocate a detached node holding a copy of `s`. Its links are dangling.
    ///
    /// The node storage is obtained first; if copying `s` then fails, the node
    /// storage is given back before returning the error.
    pub(crate) fn new_detached(s: &str) -> Result<NonNull<Link>> {
        let layout = Layout::new::<Node>();
        // SAFETY: `Node` is not zero-sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Node>();
        let node = match NonNull::new(raw) {
            Some(node) => node,
            None => {
                debug!(size = layout.size(), "failed to allocate queue node");
                return Err(QueueError::NodeAlloc { layout });
            }
        };
        let value = match duplicate(s) {
            Ok(value) => value,
            Err(err) => {
                // SAFETY: `node` was allocated above with `layout` and never initialized.
                unsafe { alloc::dealloc(node.as_ptr().cast(), layout) };
                return Err(err);
            }
        };
        let link = Link {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        };
        // SAFETY: `node` is valid for writes and properly aligned for `Node`.
        unsafe { ptr::write(node.as_ptr(), Node { link, value }) };
        Ok(node.cast())
    }
}

fn duplicate(s: &str) -> Result<String> {
    let mut value = String::new();
    if let Err(source) = value.try_reserve_exact(s.len()) {
        debug!(len = s.len(), "failed to allocate string copy");
        return Err(QueueError::StringAlloc {
            len: s.len(),
            source,
        });
    }
    value.push_str(s);
    Ok(value)
}

fn new_ghost() -> Result<NonNull<Link>> {
    let layout = Layout::new::<Link>();
    // SAFETY: `Link` is not zero-sized.
    let raw = unsafe { alloc::alloc(layout) }.cast::<Link>();
    let ghost = match NonNull::new(raw) {
        Some(ghost) => ghost,
        None => {
            debug!(size = layout.size(), "failed to allocate ghost node");
            return Err(QueueError::NodeAlloc { layout });
        }
    };
    // SAFETY: `ghost` is valid for writes and properly aligned for `Link`.
    unsafe {
        ptr::write(
            ghost.as_ptr(),
            Link {
                next: ghost,
                prev: ghost,
            },
        )
    };
    Ok(ghost)
}

/// Link `prev -> next` in both directions.
pub(crate) unsafe fn connect(mut prev: NonNull<Link>, mut next: NonNull<Link>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

/// The string of an element link. `link` must not be the ghost node.
pub(crate) unsafe fn value<'a>(link: NonNull<Link>) -> &'a str {
    &link.cast::<Node>().as_ref().value
}

#[cfg(debug_assertions)]
fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost node was allocated with `Layout::new::<Link>()` by the
        // global allocator, which is what `Box<Link>` expects.
        unsafe { drop(Box::from_raw(self.ghost.as_ptr())) };
    }
}

unsafe impl Send for Queue {}

unsafe impl Sync for Queue {}

#[cfg(test)]
mod tests {
    use crate::error::QueueError;
    use crate::Queue;

    pub(crate) fn strings(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn queue_create() {
        let mut queue = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.size(), 0);
        assert!(queue.check_links().is_ok());
        queue.insert_tail("1").unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.remove_tail(None).unwrap().into_value(), "1");
        assert!(queue.is_empty());
        assert!(queue.check_links().is_ok());
    }

    #[test]
    fn queue_insert_and_remove() {
        let mut queue = Queue::new();
        assert!(queue.remove_head(None).is_none());
        assert!(queue.remove_tail(None).is_none());
        assert_eq!(queue.size(), 0);

        queue.insert_head("2").unwrap();
        queue.insert_head("1").unwrap();
        queue.insert_tail("3").unwrap();
        assert_eq!(strings(&queue), vec!["1", "2", "3"]);
        assert_eq!(queue.front(), Some("1"));
        assert_eq!(queue.back(), Some("3"));
        assert!(queue.check_links().is_ok());

        let element = queue.remove_tail(None).unwrap();
        assert_eq!(element.value(), "3");
        element.release();
        assert!(queue.check_links().is_ok());

        let element = queue.remove_head(None).unwrap();
        assert_eq!(element.value(), "1");
        assert_eq!(strings(&queue), vec!["2"]);
        assert_eq!(queue.front(), queue.back());

        assert_eq!(queue.remove_head(None).unwrap().into_value(), "2");
        assert!(queue.remove_head(None).is_none());
        assert_eq!(queue.front(), None);
        assert_eq!(queue.back(), None);
        assert!(queue.check_links().is_ok());
    }

    #[test]
    fn queue_size_follows_inserts_and_removes() {
        let mut queue = Queue::new();
        let mut expected = 0_usize;
        for i in 0..40 {
            let s = i.to_string();
            match i % 5 {
                0 | 3 => {
                    queue.insert_head(&s).unwrap();
                    expected += 1;
                }
                1 => {
                    queue.insert_tail(&s).unwrap();
                    expected += 1;
                }
                2 => {
                    if queue.remove_head(None).is_some() {
                        expected -= 1;
                    }
                }
                _ => {
                    if queue.remove_tail(None).is_some() {
                        expected -= 1;
                    }
                }
            }
            assert_eq!(queue.size(), expected);
            assert!(queue.check_links().is_ok());
        }
    }

    #[test]
    fn queue_remove_into_buffer() {
        let mut queue: Queue = ["abcdef", "xy", "tail"].iter().collect();

        let mut buf = [0xff_u8; 4];
        let element = queue.remove_head(Some(&mut buf[..])).unwrap();
        assert_eq!(&buf, b"abc\0");
        assert_eq!(element.value(), "abcdef");

        let mut buf = [0xff_u8; 8];
        queue.remove_head(Some(&mut buf[..])).unwrap().release();
        assert_eq!(&buf[..3], b"xy\0");
        assert_eq!(&buf[3..], &[0xff; 5]);

        let mut buf = [0xff_u8; 0];
        let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
        assert_eq!(element.value(), "tail");

        let mut buf = [0xff_u8; 1];
        assert!(queue.remove_tail(Some(&mut buf[..])).is_none());
        assert_eq!(buf, [0xff]);
    }

    #[test]
    fn queue_check_links_reports_position() {
        let queue: Queue = ["a", "b", "c"].iter().collect();
        assert!(queue.check_links().is_ok());
        let middle = unsafe { queue.front_link().as_ref().next };
        unsafe { (*middle.as_ptr()).prev = queue.ghost_link() };
        assert_eq!(
            queue.check_links(),
            Err(QueueError::BrokenLink { index: 0 })
        );
        // restore, so that dropping the queue is sound
        unsafe { (*middle.as_ptr()).prev = queue.front_link() };
        assert!(queue.check_links().is_ok());
    }

    #[test]
    fn queue_clear() {
        let mut queue: Queue = ["a", "b", "c"].iter().collect();
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.check_links().is_ok());
        queue.clear();
        queue.insert_tail("d").unwrap();
        assert_eq!(strings(&queue), vec!["d"]);
    }

    #[test]
    fn queue_send_across_threads() {
        let queue: Queue = ["a", "b"].iter().collect();
        let handle = std::thread::spawn(move || queue.size());
        assert_eq!(handle.join().unwrap(), 2);
    }
}
