use crate::{
    arena::NodeArena,
    config::{InsertPolicy, SeqConfig},
    errors::SeqError,
    handle::Handle,
};
use tracing::{debug, trace, warn};

/// A singly linked sequence addressed by 1-based position.
///
/// Nodes live in an arena owned by the sequence, so dropping the sequence
/// releases every node exactly once. The first node is the head; there is no
/// sentinel.
#[derive(Debug)]
pub struct NodeSeq<T> {
    arena: NodeArena<T>,
    head: Option<usize>,
    config: SeqConfig,
    // Set by `close_cycle`; the tail link points back into the chain.
    cyclic: bool,
}

/// Iterator over values in chain order.
pub struct Iter<'a, T> {
    walk: Walk<'a, T>,
}

/// Iterator over `(Handle, &T)` in chain order.
pub struct IterHandles<'a, T> {
    walk: Walk<'a, T>,
}

/// Slot indices from the head, bounded by the live count so a cyclic chain
/// is visited once.
struct Walk<'a, T> {
    arena: &'a NodeArena<T>,
    cur: Option<usize>,
    remaining: usize,
}

impl<T> Default for NodeSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeSeq<T> {
    /// Create an empty sequence with the default configuration.
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            head: None,
            config: SeqConfig::default(),
            cyclic: false,
        }
    }

    /// Create an empty sequence, preallocating `config.initial_capacity` nodes.
    pub fn with_config(config: SeqConfig) -> Result<Self, SeqError> {
        let mut seq = Self::new();
        seq.config = config;
        seq.reserve(config.initial_capacity)?;
        Ok(seq)
    }

    /// Build a sequence holding `values` in order.
    pub fn from_values<I>(values: I) -> Result<Self, SeqError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut seq = Self::new();
        seq.extend_tail(values)?;
        Ok(seq)
    }

    pub fn config(&self) -> &SeqConfig {
        &self.config
    }

    /// Make room for `additional` more nodes without touching the chain.
    pub fn reserve(&mut self, additional: usize) -> Result<(), SeqError> {
        self.arena.try_reserve(additional)
    }

    /// Number of nodes in the chain.
    ///
    /// Read from the arena's live count rather than a walk; every live node
    /// sits on the chain.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Node at 1-based `pos` together with its value.
    pub fn get_by_position(&self, pos: usize) -> Result<(Handle, &T), SeqError> {
        let idx = self.index_at(check_position(pos)?).ok_or(SeqError::NotFound)?;
        trace!(pos, "get_by_position");
        let node = self.arena.get(idx).ok_or(SeqError::NotFound)?;
        Ok((self.arena.handle(idx), &node.value))
    }

    /// First node, scanning from the head, whose value equals `val`.
    pub fn get_by_value(&self, val: &T) -> Result<Handle, SeqError>
    where
        T: PartialEq,
    {
        let idx = self
            .walk()
            .find(|&i| self.arena.get(i).is_some_and(|n| n.value == *val))
            .ok_or(SeqError::NotFound)?;
        trace!(slot = idx, "get_by_value hit");
        Ok(self.arena.handle(idx))
    }

    /// Value of a live node.
    pub fn get(&self, h: Handle) -> Option<&T> {
        let idx = self.arena.resolve(h)?;
        self.arena.get(idx).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        let idx = self.arena.resolve(h)?;
        self.arena.get_mut(idx).map(|n| &mut n.value)
    }

    /// 1-based position of a live node.
    pub fn position_of(&self, h: Handle) -> Result<usize, SeqError> {
        let idx = self.arena.resolve(h).ok_or(SeqError::InvalidHandle)?;
        self.walk()
            .position(|i| i == idx)
            .map(|p| p + 1)
            .ok_or(SeqError::InvalidHandle)
    }

    /// Replace the value at `pos`, returning the previous one.
    pub fn set_at(&mut self, pos: usize, value: T) -> Result<T, SeqError> {
        let idx = self.index_at(check_position(pos)?).ok_or(SeqError::NotFound)?;
        let node = self.arena.get_mut(idx).ok_or(SeqError::NotFound)?;
        Ok(core::mem::replace(&mut node.value, value))
    }

    /// Insert `value` so it becomes the node at 1-based `pos`.
    ///
    /// `pos` past `len + 1` is handled by the configured [`InsertPolicy`].
    pub fn insert_at(&mut self, pos: usize, value: T) -> Result<Handle, SeqError> {
        let mut pos = check_position(pos)?;
        self.ensure_acyclic()?;
        let end = self.len() + 1;
        if pos > end {
            match self.config.insert_policy {
                InsertPolicy::Clamp => {
                    warn!(requested = pos, clamped = end, "insert position past end, appending");
                    pos = end;
                }
                InsertPolicy::Reject => return Err(SeqError::NotFound),
            }
        }

        // Locate the predecessor before allocating so a failure changes nothing.
        let pred = if pos == 1 {
            None
        } else {
            Some(self.index_at(pos - 1).ok_or(SeqError::NotFound)?)
        };
        let idx = self.arena.alloc(value)?;
        self.link_after(pred, idx);
        debug!(pos, len = self.len(), "inserted node");
        Ok(self.arena.handle(idx))
    }

    pub fn insert_head(&mut self, value: T) -> Result<Handle, SeqError> {
        self.insert_at(1, value)
    }

    pub fn insert_tail(&mut self, value: T) -> Result<Handle, SeqError> {
        self.ensure_acyclic()?;
        let tail = self.tail_index();
        let idx = self.arena.alloc(value)?;
        self.link_after(tail, idx);
        debug!(len = self.len(), "appended node");
        Ok(self.arena.handle(idx))
    }

    /// Insert `value` directly after the node named by `anchor`.
    pub fn insert_after(&mut self, anchor: Handle, value: T) -> Result<Handle, SeqError> {
        let anchor_idx = self.arena.resolve(anchor).ok_or(SeqError::InvalidHandle)?;
        self.ensure_acyclic()?;
        let idx = self.arena.alloc(value)?;
        self.link_after(Some(anchor_idx), idx);
        debug!(anchor = anchor_idx, len = self.len(), "inserted node after anchor");
        Ok(self.arena.handle(idx))
    }

    /// Append every value of `values` at the tail.
    pub fn extend_tail<I>(&mut self, values: I) -> Result<(), SeqError>
    where
        I: IntoIterator<Item = T>,
    {
        self.ensure_acyclic()?;
        let values: Vec<T> = values.into_iter().collect();
        // Reserve up front so a failed append leaves the chain unchanged.
        self.arena.try_reserve(values.len())?;
        let mut tail = self.tail_index();
        for value in values {
            let idx = self.arena.alloc(value)?;
            self.link_after(tail, idx);
            tail = Some(idx);
        }
        Ok(())
    }

    /// Remove the node at 1-based `pos`, returning its value.
    pub fn remove_at(&mut self, pos: usize) -> Result<T, SeqError> {
        let pos = check_position(pos)?;
        self.ensure_acyclic()?;
        let (pred, idx) = if pos == 1 {
            (None, self.head.ok_or(SeqError::NotFound)?)
        } else {
            let pred = self.index_at(pos - 1).ok_or(SeqError::NotFound)?;
            (Some(pred), self.arena.next_of(pred).ok_or(SeqError::NotFound)?)
        };
        let value = self.unlink(pred, idx).ok_or(SeqError::NotFound)?;
        debug!(pos, len = self.len(), "removed node");
        Ok(value)
    }

    /// Remove the node named by `h`, returning its value.
    pub fn remove(&mut self, h: Handle) -> Result<T, SeqError> {
        let idx = self.arena.resolve(h).ok_or(SeqError::InvalidHandle)?;
        self.ensure_acyclic()?;
        let mut pred = None;
        let mut found = false;
        for i in self.walk() {
            if i == idx {
                found = true;
                break;
            }
            pred = Some(i);
        }
        if !found {
            return Err(SeqError::InvalidHandle);
        }
        let value = self.unlink(pred, idx).ok_or(SeqError::InvalidHandle)?;
        debug!(slot = idx, len = self.len(), "removed node by handle");
        Ok(value)
    }

    /// Remove every node whose value equals `val`; returns how many went.
    pub fn remove_by_value(&mut self, val: &T) -> Result<usize, SeqError>
    where
        T: PartialEq,
    {
        self.ensure_acyclic()?;
        let mut removed = 0;
        let mut pred = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let Some(node) = self.arena.get(idx) else {
                break;
            };
            let (hit, next) = (node.value == *val, node.next);
            if hit {
                self.unlink(pred, idx);
                removed += 1;
            } else {
                pred = Some(idx);
            }
            cur = next;
        }
        if removed == 0 {
            return Err(SeqError::NotFound);
        }
        debug!(removed, len = self.len(), "removed nodes by value");
        Ok(removed)
    }

    /// Reverse the chain in place. Node handles keep naming the same values.
    pub fn reverse(&mut self) -> Result<(), SeqError> {
        self.ensure_acyclic()?;
        let mut prev = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let Some(node) = self.arena.get_mut(idx) else {
                break;
            };
            cur = core::mem::replace(&mut node.next, prev);
            prev = Some(idx);
        }
        self.head = prev;
        debug!(len = self.len(), "reversed sequence");
        Ok(())
    }

    /// Stable ascending merge of two non-decreasing sequences into a new one.
    ///
    /// On equal values, nodes of `a` come first. Neither input is modified.
    pub fn merge(a: &NodeSeq<T>, b: &NodeSeq<T>) -> Result<NodeSeq<T>, SeqError>
    where
        T: Ord + Clone,
    {
        a.ensure_acyclic()?;
        b.ensure_acyclic()?;
        let mut out = NodeSeq::with_config(a.config)?;
        out.arena.try_reserve(a.len() + b.len())?;

        let mut left = a.iter().peekable();
        let mut right = b.iter().peekable();
        let mut tail = None;
        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) if r < l => right.next(),
                (Some(_), _) => left.next(),
                (None, _) => right.next(),
            };
            let Some(value) = next else {
                break;
            };
            let idx = out.arena.alloc(value.clone())?;
            out.link_after(tail, idx);
            tail = Some(idx);
        }
        debug!(left = a.len(), right = b.len(), "merged sequences");
        Ok(out)
    }

    /// Node at position `⌈len / 2⌉`, found with a fast/slow cursor pair.
    pub fn find_middle(&self) -> Result<Handle, SeqError> {
        self.ensure_acyclic()?;
        let mut slow = self.head.ok_or(SeqError::NotFound)?;
        let mut fast = slow;
        while let Some(two) = self.arena.next_of(fast).and_then(|i| self.arena.next_of(i)) {
            fast = two;
            match self.arena.next_of(slow) {
                Some(i) => slow = i,
                None => break,
            }
        }
        Ok(self.arena.handle(slow))
    }

    /// The `k`-th node counting back from the tail (`k = 1` is the tail).
    pub fn find_from_end(&self, k: usize) -> Result<Handle, SeqError> {
        if k == 0 {
            return Err(SeqError::InvalidArgument("k is 1-based"));
        }
        self.ensure_acyclic()?;
        let mut lead = self.head;
        for _ in 0..k {
            lead = self.arena.next_of(lead.ok_or(SeqError::NotFound)?);
        }
        let mut trail = self.head.ok_or(SeqError::NotFound)?;
        while let Some(i) = lead {
            lead = self.arena.next_of(i);
            trail = self.arena.next_of(trail).ok_or(SeqError::NotFound)?;
        }
        Ok(self.arena.handle(trail))
    }

    /// Does the chain re-enter itself?
    pub fn has_cycle(&self) -> bool {
        self.meeting_point().is_some()
    }

    /// First node of the loop, if the chain has one.
    pub fn find_cycle_entry(&self) -> Result<Handle, SeqError> {
        let mut inner = self.meeting_point().ok_or(SeqError::NotFound)?;
        let mut outer = self.head.ok_or(SeqError::NotFound)?;
        while outer != inner {
            outer = self.arena.next_of(outer).ok_or(SeqError::NotFound)?;
            inner = self.arena.next_of(inner).ok_or(SeqError::NotFound)?;
        }
        Ok(self.arena.handle(outer))
    }

    /// Point the tail link at `entry`, making the chain loop.
    ///
    /// Meant for exercising the cycle queries. Structural operations fail with
    /// [`SeqError::Cyclic`] until [`break_cycle`](Self::break_cycle) is called.
    pub fn close_cycle(&mut self, entry: Handle) -> Result<(), SeqError> {
        let entry_idx = self.arena.resolve(entry).ok_or(SeqError::InvalidHandle)?;
        self.ensure_acyclic()?;
        let tail = self.tail_index().ok_or(SeqError::NotFound)?;
        if let Some(node) = self.arena.get_mut(tail) {
            node.next = Some(entry_idx);
        }
        self.cyclic = true;
        debug!(entry = entry_idx, "closed cycle");
        Ok(())
    }

    /// Restore a terminating tail after [`close_cycle`](Self::close_cycle).
    pub fn break_cycle(&mut self) {
        if !self.cyclic {
            return;
        }
        // The walk is bounded by the live count, so its last step is the tail.
        if let Some(tail) = self.walk().last() {
            if let Some(node) = self.arena.get_mut(tail) {
                node.next = None;
            }
        }
        self.cyclic = false;
        debug!("broke cycle");
    }

    /// Release every node; the sequence is empty afterwards.
    pub fn destroy(&mut self) {
        let released = self.len();
        self.arena.clear();
        self.head = None;
        self.cyclic = false;
        debug!(released, "destroyed sequence");
    }

    /// Iterate values in order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { walk: self.walk() }
    }

    /// Iterate `(Handle, &T)` in order.
    pub fn iter_handles(&self) -> IterHandles<'_, T> {
        IterHandles { walk: self.walk() }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    fn walk(&self) -> Walk<'_, T> {
        Walk {
            arena: &self.arena,
            cur: self.head,
            remaining: self.arena.len(),
        }
    }

    fn index_at(&self, pos: usize) -> Option<usize> {
        self.walk().nth(pos.checked_sub(1)?)
    }

    fn tail_index(&self) -> Option<usize> {
        self.walk()
            .find(|&i| self.arena.get(i).is_some_and(|n| n.is_tail()))
    }

    fn ensure_acyclic(&self) -> Result<(), SeqError> {
        if self.cyclic {
            return Err(SeqError::Cyclic);
        }
        Ok(())
    }

    /// Splice the unlinked node `idx` in after `pred` (or at the head).
    fn link_after(&mut self, pred: Option<usize>, idx: usize) {
        let next = match pred {
            None => self.head.replace(idx),
            Some(p) => self.arena.get_mut(p).and_then(|n| n.next.replace(idx)),
        };
        if let Some(node) = self.arena.get_mut(idx) {
            node.next = next;
        }
    }

    /// Cut `idx` out from behind `pred` (or the head) and release it.
    fn unlink(&mut self, pred: Option<usize>, idx: usize) -> Option<T> {
        let next = self.arena.next_of(idx);
        match pred {
            None => self.head = next,
            Some(p) => self.arena.get_mut(p)?.next = next,
        }
        self.arena.release(idx)
    }

    /// Where Floyd's fast and slow cursors meet, if they do.
    fn meeting_point(&self) -> Option<usize> {
        let mut slow = self.head?;
        let mut fast = slow;
        loop {
            fast = self.arena.next_of(fast).and_then(|i| self.arena.next_of(i))?;
            slow = self.arena.next_of(slow)?;
            if slow == fast {
                return Some(slow);
            }
        }
    }
}

fn check_position(pos: usize) -> Result<usize, SeqError> {
    if pos == 0 {
        return Err(SeqError::InvalidArgument("positions are 1-based"));
    }
    Ok(pos)
}

impl<T: PartialEq> PartialEq for NodeSeq<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for NodeSeq<T> {}

impl<'a, T> IntoIterator for &'a NodeSeq<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Iterator for Walk<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.cur?;
        self.remaining -= 1;
        self.cur = self.arena.next_of(idx);
        Some(idx)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.walk.next()?;
        self.walk.arena.get(idx).map(|n| &n.value)
    }
}

impl<'a, T> Iterator for IterHandles<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.walk.next()?;
        let arena = self.walk.arena;
        arena.get(idx).map(|n| (arena.handle(idx), &n.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[i32]) -> NodeSeq<i32> {
        NodeSeq::from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn basic_usage() {
        let mut s = NodeSeq::new();
        assert!(s.is_empty());
        s.insert_tail(10).unwrap();
        s.insert_tail(20).unwrap();
        s.insert_tail(30).unwrap();
        assert_eq!(s.to_vec(), vec![10, 20, 30]);

        s.insert_at(2, 99).unwrap();
        assert_eq!(s.to_vec(), vec![10, 99, 20, 30]);

        assert_eq!(s.remove_at(1), Ok(10));
        assert_eq!(s.to_vec(), vec![99, 20, 30]);

        let h = s.get_by_value(&20).unwrap();
        assert_eq!(s.get(h), Some(&20));
        assert_eq!(s.position_of(h), Ok(2));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn position_zero_is_invalid() {
        let mut s = seq(&[1, 2]);
        let invalid = SeqError::InvalidArgument("positions are 1-based");
        assert_eq!(s.get_by_position(0).err(), Some(invalid.clone()));
        assert_eq!(s.insert_at(0, 5).err(), Some(invalid.clone()));
        assert_eq!(s.remove_at(0), Err(invalid));
        assert_eq!(s.to_vec(), vec![1, 2]);
    }

    #[test]
    fn lookups_on_empty_fail() {
        let s: NodeSeq<i32> = NodeSeq::new();
        assert_eq!(s.get_by_position(1).err(), Some(SeqError::NotFound));
        assert_eq!(s.get_by_value(&1), Err(SeqError::NotFound));
        assert_eq!(s.find_middle(), Err(SeqError::NotFound));
        assert_eq!(s.find_from_end(1), Err(SeqError::NotFound));
        assert_eq!(s.find_cycle_entry(), Err(SeqError::NotFound));
        assert!(!s.has_cycle());
    }

    #[test]
    fn get_by_position_past_end() {
        let s = seq(&[4, 5, 6]);
        assert_eq!(s.get_by_position(3).map(|(_, v)| *v), Ok(6));
        assert_eq!(s.get_by_position(4).err(), Some(SeqError::NotFound));
    }

    #[test]
    fn insert_past_end_clamps_by_default() {
        let mut s = seq(&[1, 2]);
        let h = s.insert_at(10, 3).unwrap();
        assert_eq!(s.to_vec(), vec![1, 2, 3]);
        assert_eq!(s.position_of(h), Ok(3));
    }

    #[test]
    fn insert_past_end_rejected_when_configured() {
        let cfg = SeqConfig::default().with_insert_policy(InsertPolicy::Reject);
        let mut s = NodeSeq::with_config(cfg).unwrap();
        s.insert_at(1, 1).unwrap();
        s.insert_at(2, 2).unwrap();
        assert_eq!(s.insert_at(4, 3), Err(SeqError::NotFound));
        assert_eq!(s.to_vec(), vec![1, 2]);
    }

    #[test]
    fn oversized_capacity_is_reported() {
        let cfg = SeqConfig::default().with_capacity(usize::MAX / 2);
        let err = NodeSeq::<i32>::with_config(cfg).err();
        assert_eq!(err, Some(SeqError::AllocationFailure));

        let cfg = SeqConfig::default().with_capacity(8);
        let s = NodeSeq::<i32>::with_config(cfg).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn failed_reservation_leaves_chain_intact() {
        let mut s = seq(&[1, 2, 3]);
        let two = s.get_by_value(&2).unwrap();
        assert_eq!(s.reserve(usize::MAX), Err(SeqError::AllocationFailure));
        assert_eq!(s.to_vec(), vec![1, 2, 3]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.position_of(two), Ok(2));

        s.insert_at(2, 9).unwrap();
        assert_eq!(s.to_vec(), vec![1, 9, 2, 3]);
    }

    #[test]
    fn insert_head_replaces_head() {
        let mut s = seq(&[2, 3]);
        s.insert_head(1).unwrap();
        assert_eq!(s.to_vec(), vec![1, 2, 3]);
        assert_eq!(s.get_by_position(1).map(|(_, v)| *v), Ok(1));
    }

    #[test]
    fn insert_after_handle() {
        let mut s = seq(&[1, 3]);
        let one = s.get_by_value(&1).unwrap();
        s.insert_after(one, 2).unwrap();
        let three = s.get_by_value(&3).unwrap();
        s.insert_after(three, 4).unwrap();
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn remove_at_bounds() {
        let mut s = seq(&[1, 2, 3]);
        assert_eq!(s.remove_at(4), Err(SeqError::NotFound));
        assert_eq!(s.remove_at(3), Ok(3));
        assert_eq!(s.remove_at(2), Ok(2));
        assert_eq!(s.remove_at(1), Ok(1));
        assert_eq!(s.remove_at(1), Err(SeqError::NotFound));
        assert!(s.is_empty());
    }

    #[test]
    fn remove_by_handle_and_stale_handle() {
        let mut s = seq(&[1, 2, 3]);
        let tail = s.find_from_end(1).unwrap();
        assert_eq!(s.remove(tail), Ok(3));
        assert_eq!(s.remove(tail), Err(SeqError::InvalidHandle));
        assert_eq!(s.get(tail), None);

        // the freed slot is reused, the old handle stays dead
        let fresh = s.insert_tail(9).unwrap();
        assert_eq!(fresh.as_raw(), tail.as_raw());
        assert_eq!(s.get(tail), None);
        assert_eq!(s.get(fresh), Some(&9));
        assert_eq!(s.to_vec(), vec![1, 2, 9]);
    }

    #[test]
    fn remove_by_value_removes_all() {
        let mut s = seq(&[7, 1, 7, 7, 2, 7]);
        assert_eq!(s.remove_by_value(&7), Ok(4));
        assert_eq!(s.to_vec(), vec![1, 2]);
        assert_eq!(s.remove_by_value(&7), Err(SeqError::NotFound));
        assert_eq!(s.to_vec(), vec![1, 2]);
    }

    #[test]
    fn set_at_replaces_value() {
        let mut s = seq(&[1, 2, 3]);
        assert_eq!(s.set_at(2, 20), Ok(2));
        assert_eq!(s.to_vec(), vec![1, 20, 3]);
        assert_eq!(s.set_at(4, 0), Err(SeqError::NotFound));
    }

    #[test]
    fn reverse_keeps_handles() {
        let mut s = seq(&[1, 2, 3, 4]);
        let two = s.get_by_value(&2).unwrap();
        s.reverse().unwrap();
        assert_eq!(s.to_vec(), vec![4, 3, 2, 1]);
        assert_eq!(s.position_of(two), Ok(3));
        s.insert_tail(0).unwrap();
        assert_eq!(s.to_vec(), vec![4, 3, 2, 1, 0]);

        let mut empty: NodeSeq<i32> = NodeSeq::new();
        empty.reverse().unwrap();
        assert!(empty.is_empty());
    }

    /// Orders by key only, so equal keys expose which input a node came from.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tagged(i32, char);

    impl Ord for Tagged {
        fn cmp(&self, other: &Self) -> core::cmp::Ordering {
            self.0.cmp(&other.0)
        }
    }

    impl PartialOrd for Tagged {
        fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    #[test]
    fn merge_is_stable_and_non_destructive() {
        let a = NodeSeq::from_values([Tagged(1, 'a'), Tagged(3, 'a'), Tagged(5, 'a')]).unwrap();
        let b = NodeSeq::from_values([Tagged(1, 'b'), Tagged(2, 'b'), Tagged(5, 'b'), Tagged(6, 'b')])
            .unwrap();
        let merged = NodeSeq::merge(&a, &b).unwrap();
        assert_eq!(
            merged.to_vec(),
            vec![
                Tagged(1, 'a'),
                Tagged(1, 'b'),
                Tagged(2, 'b'),
                Tagged(3, 'a'),
                Tagged(5, 'a'),
                Tagged(5, 'b'),
                Tagged(6, 'b'),
            ]
        );
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 4);

        let empty = NodeSeq::new();
        assert_eq!(NodeSeq::merge(&empty, &b).unwrap(), b);
        assert_eq!(NodeSeq::merge(&a, &empty).unwrap(), a);
    }

    #[test]
    fn merge_refuses_cyclic_input() {
        let mut a = seq(&[1, 2]);
        let b = seq(&[3]);
        let head = a.get_by_position(1).unwrap().0;
        a.close_cycle(head).unwrap();
        assert_eq!(NodeSeq::merge(&a, &b), Err(SeqError::Cyclic));
    }

    #[test]
    fn middle_is_ceil_half() {
        let mid = |vals: &[i32]| {
            let s = seq(vals);
            s.find_middle().map(|h| *s.get(h).unwrap())
        };
        assert_eq!(mid(&[1]), Ok(1));
        assert_eq!(mid(&[1, 2]), Ok(1));
        assert_eq!(mid(&[1, 2, 3]), Ok(2));
        assert_eq!(mid(&[1, 2, 3, 4]), Ok(2));
        assert_eq!(mid(&[1, 2, 3, 4, 5]), Ok(3));
    }

    #[test]
    fn from_end_bounds() {
        let s = seq(&[1, 2, 3]);
        let at = |k| s.find_from_end(k).map(|h| *s.get(h).unwrap());
        assert_eq!(at(1), Ok(3));
        assert_eq!(at(3), Ok(1));
        assert_eq!(at(4), Err(SeqError::NotFound));
        assert_eq!(at(0), Err(SeqError::InvalidArgument("k is 1-based")));
    }

    #[test]
    fn cycle_detection_and_entry() {
        let mut s = seq(&[1, 2, 3, 4, 5]);
        assert!(!s.has_cycle());
        assert_eq!(s.find_cycle_entry(), Err(SeqError::NotFound));

        let entry = s.get_by_value(&3).unwrap();
        s.close_cycle(entry).unwrap();
        assert!(s.has_cycle());
        assert_eq!(s.find_cycle_entry(), Ok(entry));

        // lookups stay bounded, structural changes are refused
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(s.len(), 5);
        assert_eq!(s.insert_tail(6).map(|_| ()), Err(SeqError::Cyclic));
        assert_eq!(s.remove_at(1), Err(SeqError::Cyclic));
        assert_eq!(s.reverse(), Err(SeqError::Cyclic));
        assert_eq!(s.find_middle(), Err(SeqError::Cyclic));

        s.break_cycle();
        assert!(!s.has_cycle());
        s.insert_tail(6).unwrap();
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn self_loop_and_full_loop() {
        let mut s = seq(&[1]);
        let only = s.get_by_value(&1).unwrap();
        s.close_cycle(only).unwrap();
        assert_eq!(s.find_cycle_entry(), Ok(only));

        let mut s = seq(&[1, 2, 3]);
        let head = s.get_by_position(1).unwrap().0;
        s.close_cycle(head).unwrap();
        assert_eq!(s.find_cycle_entry(), Ok(head));
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut s = seq(&[1, 2, 3]);
        let h = s.get_by_value(&2).unwrap();
        s.destroy();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.get(h), None);
        s.destroy();
        assert_eq!(s.len(), 0);

        s.insert_tail(1).unwrap();
        assert_eq!(s.to_vec(), vec![1]);
    }

    #[test]
    fn destroy_clears_cycle() {
        let mut s = seq(&[1, 2]);
        let head = s.get_by_position(1).unwrap().0;
        s.close_cycle(head).unwrap();
        s.destroy();
        assert!(!s.has_cycle());
        s.insert_head(3).unwrap();
        assert_eq!(s.to_vec(), vec![3]);
    }
}
