use crate::{errors::SeqError, handle::Handle, node::Node};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Slot store for the nodes of one sequence.
///
/// Released slots go on a free-list and are reused by later allocations. Each
/// release bumps the slot generation so stale [`Handle`]s stop resolving.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Make sure `additional` more nodes fit without allocating.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), SeqError> {
        let spare = self.free.len();
        if additional > spare {
            let grow = additional - spare;
            self.slots.try_reserve(grow)?;
            // Every slot may end up on the free-list at once.
            let want = self.slots.len() + grow;
            self.free.try_reserve(want.saturating_sub(self.free.len()))?;
        }
        Ok(())
    }

    /// Store `value` in a fresh, unlinked node and return its slot index.
    pub(crate) fn alloc(&mut self, value: T) -> Result<usize, SeqError> {
        self.try_reserve(1)?;
        let node = Node::new(value);
        if let Some(index) = self.free.pop() {
            self.slots[index].node = Some(node);
            self.live += 1;
            return Ok(index);
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        self.live += 1;
        Ok(index)
    }

    /// Drop the node at `index` from the store, returning its value.
    pub(crate) fn release(&mut self, index: usize) -> Option<T> {
        let slot = self.slots.get_mut(index)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(node.value)
    }

    /// Release every live node.
    pub(crate) fn clear(&mut self) {
        for index in 0..self.slots.len() {
            let _ = self.release(index);
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Node<T>> {
        self.slots.get(index).and_then(|s| s.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(index).and_then(|s| s.node.as_mut())
    }

    pub(crate) fn next_of(&self, index: usize) -> Option<usize> {
        self.get(index).and_then(|n| n.next)
    }

    pub(crate) fn handle(&self, index: usize) -> Handle {
        let generation = self.slots.get(index).map_or(0, |s| s.generation);
        Handle { index, generation }
    }

    /// Slot index of a live node, if `h` still names one.
    pub(crate) fn resolve(&self, h: Handle) -> Option<usize> {
        match self.slots.get(h.index) {
            Some(s) if s.generation == h.generation && s.node.is_some() => Some(h.index),
            _ => None,
        }
    }
}
