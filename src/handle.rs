/// Opaque reference to a node inside a [`NodeSeq`](crate::NodeSeq).
///
/// A handle stays valid until its node is removed; a removed node's handle
/// never resolves again, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl Handle {
    /// Returns the raw slot index for debugging or external maps.
    pub fn as_raw(&self) -> usize {
        self.index
    }
}
