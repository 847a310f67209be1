/*!
 * Stable List
 * Doubly-linked list of reference-counted nodes whose cursors stay valid
 * across insertion and across erasure of other nodes
 */

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

/// A list node. `prev == None` on a non-sentinel node marks it as erased
/// (a tombstone); `next` is preserved so captured cursors can still walk
/// forward to a live successor.
struct ListNode<T> {
    sentinel: bool,
    value: RefCell<Option<T>>,
    links: RefCell<NodeLinks<T>>,
}

struct NodeLinks<T> {
    prev: Option<Weak<ListNode<T>>>,
    next: Option<Rc<ListNode<T>>>,
}

impl<T> ListNode<T> {
    fn sentinel() -> Rc<Self> {
        Rc::new(Self {
            sentinel: true,
            value: RefCell::new(None),
            links: RefCell::new(NodeLinks {
                prev: None,
                next: None,
            }),
        })
    }

    fn with_value(value: T) -> Rc<Self> {
        Rc::new(Self {
            sentinel: false,
            value: RefCell::new(Some(value)),
            links: RefCell::new(NodeLinks {
                prev: None,
                next: None,
            }),
        })
    }

    fn is_tombstone(&self) -> bool {
        !self.sentinel && self.links.borrow().prev.is_none()
    }
}

/// Bidirectional cursor into a [`StableList`].
///
/// A cursor keeps its node alive. A cursor whose node was erased still
/// advances to a live successor (or the end position); its value reads as
/// `None`.
pub struct Cursor<T> {
    node: Rc<ListNode<T>>,
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T> Cursor<T> {
    /// Read the value under the cursor. `None` at the end position or on
    /// an erased node.
    pub fn value(&self) -> Option<Ref<'_, T>> {
        let value = self.node.value.borrow();
        if value.is_some() {
            Some(Ref::map(value, |v| v.as_ref().unwrap()))
        } else {
            None
        }
    }

    /// True when the cursor sits on the end sentinel.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.node.sentinel && self.node.links.borrow().next.is_none()
    }

    /// Advance to the next position. Valid on erased nodes: their
    /// preserved `next` link leads back into the live list. Returns false
    /// when already at the end.
    pub fn move_next(&mut self) -> bool {
        let next = self.node.links.borrow().next.clone();
        match next {
            Some(next) => {
                self.node = next;
                true
            }
            None => false,
        }
    }

    /// Step back to the previous position. Returns false at the front, on
    /// an erased node, or on the front sentinel.
    pub fn move_prev(&mut self) -> bool {
        let prev = self.node.links.borrow().prev.as_ref().and_then(Weak::upgrade);
        match prev {
            Some(prev) if !prev.sentinel => {
                self.node = prev;
                true
            }
            _ => false,
        }
    }

    fn points_at(&self, node: &Rc<ListNode<T>>) -> bool {
        Rc::ptr_eq(&self.node, node)
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<T> Eq for Cursor<T> {}

/// Doubly-linked list with address-stable, reference-counted nodes.
///
/// Two properties the standard list does not guarantee jointly: an
/// element's node never moves, and a cursor retained to an erased element
/// stays usable, walking forward to a still-live successor. Erasure
/// unlinks a node but preserves its `next` link; `clear` re-points every
/// `next` at the end sentinel so outstanding cursors converge there.
pub struct StableList<T> {
    head: Rc<ListNode<T>>,
    tail: Rc<ListNode<T>>,
    len: Cell<usize>,
}

impl<T> StableList<T> {
    pub fn new() -> Self {
        let head = ListNode::sentinel();
        let tail = ListNode::sentinel();
        head.links.borrow_mut().next = Some(tail.clone());
        tail.links.borrow_mut().prev = Some(Rc::downgrade(&head));
        Self {
            head,
            tail,
            len: Cell::new(0),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    /// Cursor at the first element (the end position when empty).
    pub fn cursor_front(&self) -> Cursor<T> {
        let first = self.head.links.borrow().next.clone();
        Cursor {
            node: first.unwrap_or_else(|| self.tail.clone()),
        }
    }

    /// Cursor at the last element (the front sentinel when empty; its
    /// value reads as `None`).
    pub fn cursor_back(&self) -> Cursor<T> {
        let last = self.tail.links.borrow().prev.as_ref().and_then(Weak::upgrade);
        Cursor {
            node: last.unwrap_or_else(|| self.tail.clone()),
        }
    }

    pub fn push_front(&mut self, value: T) -> Cursor<T> {
        let first = self.head.links.borrow().next.clone().unwrap_or_else(|| self.tail.clone());
        self.link_before(&first, value)
    }

    pub fn push_back(&mut self, value: T) -> Cursor<T> {
        let tail = self.tail.clone();
        self.link_before(&tail, value)
    }

    /// Insert a value just before the cursor's position.
    ///
    /// The position must still be linked (the end position counts);
    /// inserting before an erased node is a logic error.
    pub fn insert_before(&mut self, at: &Cursor<T>, value: T) -> Cursor<T> {
        assert!(
            !at.node.is_tombstone(),
            "insert position was erased from the list"
        );
        let node = at.node.clone();
        self.link_before(&node, value)
    }

    /// Unlink the node under the cursor and return its value.
    ///
    /// The node's `next` link is preserved so the cursor (and any clones)
    /// can still advance into the live list. Returns `None` on sentinels
    /// and on already-erased nodes.
    pub fn erase(&mut self, at: &Cursor<T>) -> Option<T> {
        if at.node.sentinel {
            return None;
        }
        let mut links = at.node.links.borrow_mut();
        let prev = links.prev.take()?;
        let next = links.next.clone();
        drop(links);

        if let Some(prev) = prev.upgrade() {
            prev.links.borrow_mut().next = next.clone();
            if let Some(next) = &next {
                next.links.borrow_mut().prev = Some(Rc::downgrade(&prev));
            }
        }
        self.len.set(self.len.get() - 1);
        at.node.value.borrow_mut().take()
    }

    /// Unlink every node in `[first, last)`, returning how many were
    /// erased. Each erased node's `next` is re-pointed at `last` so
    /// captured cursors inside the range skip straight past it.
    pub fn erase_range(&mut self, first: &Cursor<T>, last: &Cursor<T>) -> usize {
        let before = first.node.links.borrow().prev.clone();
        let mut erased = 0;
        let mut current = first.node.clone();
        while !last.points_at(&current) {
            if current.sentinel {
                break;
            }
            let mut links = current.links.borrow_mut();
            let next = links.next.replace(last.node.clone());
            links.prev = None;
            drop(links);
            current.value.borrow_mut().take();
            erased += 1;
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        if let Some(before) = before.as_ref().and_then(Weak::upgrade) {
            before.links.borrow_mut().next = Some(last.node.clone());
            last.node.links.borrow_mut().prev = Some(Rc::downgrade(&before));
        }
        self.len.set(self.len.get() - erased);
        erased
    }

    /// Erase every element equal to `value`.
    pub fn remove(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.remove_if(|v| v == value)
    }

    /// Erase every element matching the predicate. Iteration re-anchors on
    /// each erased node's preserved `next` link, so matches adjacent to
    /// one another are handled.
    pub fn remove_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        let mut cursor = self.cursor_front();
        while !cursor.at_end() {
            let matched = cursor.value().map(|v| pred(&v)).unwrap_or(false);
            if matched {
                self.erase(&cursor);
                removed += 1;
            }
            if !cursor.move_next() {
                break;
            }
        }
        removed
    }

    /// Erase everything. Every node's `next` is re-pointed directly at the
    /// end sentinel so concurrent cursors converge to the end position.
    pub fn clear(&mut self) {
        let mut current = self.head.links.borrow_mut().next.clone();
        while let Some(node) = current {
            if node.sentinel {
                break;
            }
            let mut links = node.links.borrow_mut();
            let next = links.next.replace(self.tail.clone());
            links.prev = None;
            drop(links);
            node.value.borrow_mut().take();
            current = next;
        }
        self.head.links.borrow_mut().next = Some(self.tail.clone());
        self.tail.links.borrow_mut().prev = Some(Rc::downgrade(&self.head));
        self.len.set(0);
    }

    /// Visit elements front to back.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let mut current = self.head.links.borrow().next.clone();
        while let Some(node) = current {
            if node.sentinel {
                break;
            }
            if let Some(value) = node.value.borrow().as_ref() {
                f(value);
            }
            current = node.links.borrow().next.clone();
        }
    }

    /// Visit elements back to front.
    pub fn for_each_rev<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let mut current = self.tail.links.borrow().prev.as_ref().and_then(Weak::upgrade);
        while let Some(node) = current {
            if node.sentinel {
                break;
            }
            if let Some(value) = node.value.borrow().as_ref() {
                f(value);
            }
            current = node.links.borrow().prev.as_ref().and_then(Weak::upgrade);
        }
    }

    fn link_before(&mut self, at: &Rc<ListNode<T>>, value: T) -> Cursor<T> {
        let node = ListNode::with_value(value);
        let prev = at.links.borrow().prev.clone();
        {
            let mut links = node.links.borrow_mut();
            links.prev = prev.clone();
            links.next = Some(at.clone());
        }
        if let Some(prev) = prev.as_ref().and_then(Weak::upgrade) {
            prev.links.borrow_mut().next = Some(node.clone());
        }
        at.links.borrow_mut().prev = Some(Rc::downgrade(&node));
        self.len.set(self.len.get() + 1);
        Cursor { node }
    }
}

impl<T> Default for StableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for StableList<T> {
    fn drop(&mut self) {
        // Break the head -> tail link chain so no deep recursive drop can
        // occur and outstanding cursors see an empty list.
        self.clear();
        self.head.links.borrow_mut().next = None;
        self.tail.links.borrow_mut().prev = None;
    }
}

impl<T: Clone> StableList<T> {
    /// Snapshot of the current elements, front to back.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|v| out.push(v.clone()));
        out
    }
}
