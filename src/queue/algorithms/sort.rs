use crate::queue::{connect, value, Link, Queue};
use std::ptr::NonNull;

use tracing::trace;

impl Queue {
    /// Sorts the queue in ascending order of its strings (byte-wise
    /// lexicographic, as `str` orders).
    ///
    /// This sort is stable: when two strings compare equal, the one that came
    /// first stays first.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time. It allocates
    /// nothing; the recursion is *O*(log(*n*)) deep.
    ///
    /// # Current Implementation
    ///
    /// A top-down merge sort over the `next` links only: the nodes are treated
    /// as a forward list ending at the ghost node, split at the middle with a
    /// slow/fast walk, and merged back. The `prev` links are rebuilt in a last
    /// pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use string_queue::Queue;
    ///
    /// let mut queue: Queue = ["pear", "apple", "fig", "apple"].iter().collect();
    /// queue.sort();
    /// assert!(queue.iter().eq(["apple", "apple", "fig", "pear"].iter().copied()));
    /// ```
    pub fn sort(&mut self) {
        let (front, back) = (self.front_link(), self.back_link());
        // empty, or a single element
        if front == back {
            return;
        }
        let ghost = self.ghost_link();
        // SAFETY: `front..ghost` is the whole forward chain of the queue, and
        // `back.next` is already the ghost node, which ends it.
        unsafe {
            let front = merge_sort(front, ghost);
            relink(ghost, front);
        }
        trace!("sorted queue");
        self.assert_links();
    }
}

/// Sort the forward chain `start..end` and return its new front. The returned
/// chain ends at `end`; `prev` links are left stale.
unsafe fn merge_sort(start: NonNull<Link>, end: NonNull<Link>) -> NonNull<Link> {
    if start == end || start.as_ref().next == end {
        return start;
    }
    let (mut slow, mut fast) = (start, start.as_ref().next);
    while fast != end && fast.as_ref().next != end {
        slow = slow.as_ref().next;
        fast = fast.as_ref().next.as_ref().next;
    }
    let mid = slow.as_ref().next;
    slow.as_mut().next = end;
    let left = merge_sort(start, end);
    let right = merge_sort(mid, end);
    merge(left, right, end)
}

/// Merge two ascending forward chains, both ending at `end`. On a tie the
/// node of `left` goes first.
unsafe fn merge(
    mut left: NonNull<Link>,
    mut right: NonNull<Link>,
    end: NonNull<Link>,
) -> NonNull<Link> {
    let mut head = Link { next: end, prev: end };
    let mut tail = NonNull::from(&mut head);
    while left != end && right != end {
        let picked;
        if value(left) <= value(right) {
            picked = left;
            left = left.as_ref().next;
        } else {
            picked = right;
            right = right.as_ref().next;
        }
        tail.as_mut().next = picked;
        tail = picked;
    }
    tail.as_mut().next = if left != end { left } else { right };
    head.next
}

/// Close the sorted forward chain starting at `front` into the circle of
/// `ghost`, rebuilding every `prev` link from left to right.
unsafe fn relink(ghost: NonNull<Link>, front: NonNull<Link>) {
    connect(ghost, front);
    let mut link = front;
    while link.as_ref().next != ghost {
        let next = link.as_ref().next;
        connect(link, next);
        link = next;
    }
    connect(link, ghost);
}
