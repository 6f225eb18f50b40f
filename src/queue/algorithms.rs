use crate::error::{QueueError, Result};
use crate::queue::{connect, value, Queue};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ptr::NonNull;

use tracing::trace;

mod sort;

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl Eq for Queue {}

impl PartialOrd for Queue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queue {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl Clone for Queue {
    /// # Panics
    ///
    /// Panics if an element cannot be allocated.
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl Hash for Queue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for s in self {
            s.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

impl Queue {
    /// Returns `true` if the `Queue` contains the given string.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let queue: Queue = ["a", "b"].iter().collect();
    /// assert!(queue.contains("b"));
    /// assert!(!queue.contains("c"));
    /// ```
    pub fn contains(&self, s: &str) -> bool {
        self.iter().any(|e| e == s)
    }

    /// Deletes the middle element, i.e. the element at index ⌊*n* / 2⌋ of a
    /// queue with *n* elements. The element is released, not returned.
    ///
    /// Returns [`QueueError::Empty`] if there is nothing to delete.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time. The middle is found by
    /// walking from both ends at once, without counting the elements first.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["1", "2", "3", "4", "5", "6"].iter().collect();
    /// queue.delete_mid().unwrap();
    /// assert!(queue.iter().eq(["1", "2", "3", "5", "6"].iter().copied()));
    /// ```
    pub fn delete_mid(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(QueueError::Empty);
        }
        let (mut forward, mut backward) = (self.front_link(), self.back_link());
        // SAFETY: both walks stay on elements; they meet (odd length) or become
        // adjacent (even length) before either reaches the ghost node.
        let mid = unsafe {
            loop {
                if forward == backward {
                    break forward;
                }
                if forward.as_ref().next == backward {
                    break backward;
                }
                forward = forward.as_ref().next;
                backward = backward.as_ref().prev;
            }
        };
        // SAFETY: `mid` is an element of the queue.
        drop(unsafe { self.detach_node(mid) });
        trace!("deleted middle element");
        self.assert_links();
        Ok(())
    }

    /// Deletes every element whose string equals a neighbor's, leaving only the
    /// strings that occur exactly once. Returns the number of deleted elements.
    ///
    /// The queue must already be sorted (see [`Queue::sort`]): only adjacent
    /// equal strings are detected. On an unsorted queue the result is
    /// unspecified, though the queue stays well-formed.
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
    /// let mut queue: Queue = ["a", "a", "b", "c", "c", "c"].iter().collect();
    /// assert_eq!(queue.delete_dup(), 5);
    /// assert!(queue.iter().eq(["b"].iter().copied()));
    /// ```
    pub fn delete_dup(&mut self) -> usize {
        let ghost = self.ghost_link();
        let mut link = self.front_link();
        let mut deleted = 0;
        // whether `link` equals the element before it
        let mut in_run = false;
        while link != ghost {
            // SAFETY: `link` is an element, and `next` is either an element or the
            // ghost node, which is never compared.
            let next = unsafe { link.as_ref().next };
            let same_as_next = next != ghost && unsafe { value(link) == value(next) };
            if in_run || same_as_next {
                // SAFETY: `link` is an element of the queue; `next` stays linked.
                drop(unsafe { self.detach_node(link) });
                deleted += 1;
            }
            in_run = same_as_next;
            link = next;
        }
        trace!(deleted, "deleted duplicated elements");
        self.assert_links();
        deleted
    }

    /// Swaps every two adjacent elements: the 1st with the 2nd, the 3rd with the
    /// 4th, and so on. A last unpaired element stays in place.
    ///
    /// Only links are rearranged; no element is allocated, freed or copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["1", "2", "3", "4", "5"].iter().collect();
    /// queue.swap();
    /// assert!(queue.iter().eq(["2", "1", "4", "3", "5"].iter().copied()));
    /// ```
    pub fn swap(&mut self) {
        let ghost = self.ghost_link();
        let mut first = self.front_link();
        let mut pairs = 0_usize;
        while first != ghost {
            // SAFETY: `first` is an element, so `first.prev` and `first.next` are
            // valid links of the queue.
            unsafe {
                let second = first.as_ref().next;
                if second == ghost {
                    break;
                }
                let (before, after) = (first.as_ref().prev, second.as_ref().next);
                // before -> second -> first -> after
                connect(before, second);
                connect(second, first);
                connect(first, after);
                first = after;
            }
            pairs += 1;
        }
        trace!(pairs, "swapped adjacent elements");
        self.assert_links();
    }

    /// Reverses the order of the elements in place, by exchanging `next` and
    /// `prev` of every node, the ghost node included.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["a", "b", "c"].iter().collect();
    /// queue.reverse();
    /// assert!(queue.iter().eq(["c", "b", "a"].iter().copied()));
    /// ```
    pub fn reverse(&mut self) {
        let ghost = self.ghost_link();
        let mut link: NonNull<_> = ghost;
        loop {
            // SAFETY: the walk follows the old `next` pointers, which visit every
            // node of the circle exactly once before returning to the ghost node.
            unsafe {
                let node = link.as_mut();
                mem::swap(&mut node.next, &mut node.prev);
                link = node.prev;
            }
            if link == ghost {
                break;
            }
        }
        trace!("reversed queue");
        self.assert_links();
    }
}

#[cfg(test)]
mod tests {
    use crate::error::QueueError;
    use crate::queue::tests::strings;
    use crate::Queue;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn queue_of(items: &[&str]) -> Queue {
        items.iter().collect()
    }

    #[test]
    fn queue_eq_ord_and_hash() {
        let a = queue_of(&["a", "b"]);
        let b = a.clone();
        assert_eq!(a, b);
        assert!(a < queue_of(&["a", "c"]));
        assert!(queue_of(&["a"]) < a);

        let hash = |q: &Queue| {
            let mut hasher = DefaultHasher::new();
            q.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
        assert!(a.contains("b"));
    }

    #[test]
    fn queue_delete_mid() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = queue_of(input);
            queue.delete_mid().unwrap();
            assert_eq!(strings(&queue), expected);
            assert!(queue.check_links().is_ok());
        }
        test_case(&["1", "2", "3", "4", "5", "6"], &["1", "2", "3", "5", "6"]);
        test_case(&["1", "2", "3", "4", "5"], &["1", "2", "4", "5"]);
        test_case(&["1", "2", "3"], &["1", "3"]);
        test_case(&["1", "2"], &["1"]);
        test_case(&["1"], &[]);

        let mut queue = Queue::new();
        assert_eq!(queue.delete_mid(), Err(QueueError::Empty));
        assert!(queue.check_links().is_ok());
    }

    #[test]
    fn queue_delete_mid_until_empty() {
        let mut queue = queue_of(&["0", "1", "2", "3", "4", "5", "6", "7"]);
        let mut size = queue.size();
        while size > 0 {
            let mid = strings(&queue)[size / 2].to_owned();
            queue.delete_mid().unwrap();
            size -= 1;
            assert_eq!(queue.size(), size);
            assert!(!queue.contains(&mid));
            assert!(queue.check_links().is_ok());
        }
        assert_eq!(queue.delete_mid(), Err(QueueError::Empty));
    }

    #[test]
    fn queue_delete_dup() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = queue_of(input);
            assert_eq!(queue.delete_dup(), input.len() - expected.len());
            assert_eq!(strings(&queue), expected);
            assert!(queue.check_links().is_ok());
        }
        test_case(&["a", "a", "b", "c", "c", "c"], &["b"]);
        test_case(&["a", "b", "b", "b", "c"], &["a", "c"]);
        test_case(&["a", "b", "c"], &["a", "b", "c"]);
        test_case(&["a", "b", "c", "c"], &["a", "b"]);
        test_case(&["a", "a", "a", "a"], &[]);
        test_case(&["a", "a"], &[]);
        test_case(&["a"], &["a"]);
        test_case(&[], &[]);
    }

    #[test]
    fn queue_delete_dup_after_sort() {
        let mut queue = queue_of(&["c", "a", "b", "c", "a", "d", "c"]);
        queue.sort();
        queue.delete_dup();
        assert_eq!(strings(&queue), vec!["b", "d"]);
    }

    #[test]
    fn queue_delete_dup_unsorted_stays_well_formed() {
        // Only the shape is checked: which elements survive is unspecified.
        let mut queue = queue_of(&["b", "a", "b", "b", "a"]);
        let deleted = queue.delete_dup();
        assert_eq!(queue.size(), 5 - deleted);
        assert!(queue.check_links().is_ok());
    }

    #[test]
    fn queue_swap() {
        fn test_case(input: &[&str], expected: &[&str]) {
            let mut queue = queue_of(input);
            queue.swap();
            assert_eq!(strings(&queue), expected);
            assert!(queue.check_links().is_ok());
        }
        test_case(&["1", "2", "3", "4", "5"], &["2", "1", "4", "3", "5"]);
        test_case(&["1", "2", "3", "4"], &["2", "1", "4", "3"]);
        test_case(&["1", "2"], &["2", "1"]);
        test_case(&["1"], &["1"]);
        test_case(&[], &[]);
    }

    #[test]
    fn queue_swap_twice_restores() {
        let input = ["a", "b", "c", "d", "e", "f", "g"];
        let mut queue = queue_of(&input);
        queue.swap();
        queue.swap();
        assert_eq!(strings(&queue), input);
    }

    #[test]
    fn queue_reverse() {
        fn test_case(input: &[&str]) {
            let mut queue = queue_of(input);
            queue.reverse();
            let mut reversed = input.to_vec();
            reversed.reverse();
            assert_eq!(strings(&queue), reversed);
            assert_eq!(queue.front(), reversed.first().copied());
            assert_eq!(queue.back(), reversed.last().copied());
            assert!(queue.check_links().is_ok());

            queue.reverse();
            assert_eq!(strings(&queue), input);
            assert!(queue.check_links().is_ok());
        }
        test_case(&["a", "b", "c", "d", "e"]);
        test_case(&["a", "b", "c", "d"]);
        test_case(&["a", "b"]);
        test_case(&["a"]);
        test_case(&[]);
    }

    #[test]
    fn queue_reverse_then_edit_ends() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.reverse();
        queue.insert_head("d").unwrap();
        queue.insert_tail("z").unwrap();
        assert_eq!(queue.remove_tail(None).unwrap().value(), "z");
        assert_eq!(queue.remove_head(None).unwrap().value(), "d");
        assert_eq!(strings(&queue), vec!["c", "b", "a"]);
        assert!(queue.check_links().is_ok());
    }
}
