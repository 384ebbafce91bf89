//! Intrusive doubly-linked list of free page frames.
//!
//! The links live inside the page frame table entries themselves, so the
//! list needs no storage of its own beyond head, tail and a running count.
//! All operations are O(1). The list does not own the entries it links;
//! the table owns all of them.

use crate::physical::mgmt::PageFrameTable;
use crate::physical::PageFrame;

pub struct FreeList {
    head: Option<PageFrame>,
    tail: Option<PageFrame>,
    len: usize,
}

impl FreeList {
    pub const fn new() -> FreeList {
        FreeList {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First frame in the list without removing it.
    pub fn peek_front(&self) -> Option<PageFrame> {
        self.head
    }

    /// Link `frame` in at the front of the list. The frame must not already
    /// be linked.
    pub fn push_front(&mut self, table: &mut PageFrameTable, frame: PageFrame) {
        let old_head = self.head;
        {
            let entry = table.index_mut(frame.0);
            entry.next_free = old_head;
            entry.prev_free = None;
        }
        match old_head {
            Some(head) => table.index_mut(head.0).prev_free = Some(frame),
            None => self.tail = Some(frame),
        }
        self.head = Some(frame);
        self.len += 1;
    }

    /// Link `frame` in at the back of the list. The frame must not already
    /// be linked.
    pub fn push_back(&mut self, table: &mut PageFrameTable, frame: PageFrame) {
        let old_tail = self.tail;
        {
            let entry = table.index_mut(frame.0);
            entry.prev_free = old_tail;
            entry.next_free = None;
        }
        match old_tail {
            Some(tail) => table.index_mut(tail.0).next_free = Some(frame),
            None => self.head = Some(frame),
        }
        self.tail = Some(frame);
        self.len += 1;
    }

    /// Unlink and return the first frame of the list.
    pub fn pop_front(&mut self, table: &mut PageFrameTable) -> Option<PageFrame> {
        let frame = self.head?;
        let next = {
            let entry = table.index_mut(frame.0);
            entry.prev_free = None;
            entry.next_free.take()
        };
        match next {
            Some(next) => table.index_mut(next.0).prev_free = None,
            None => self.tail = None,
        }
        self.head = next;
        self.len -= 1;
        Some(frame)
    }
}
