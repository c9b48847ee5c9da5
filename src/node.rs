#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: Option<usize>,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T) -> Self {
        Node { value, next: None }
    }

    /// Is this the last node of a terminating chain?
    pub(crate) fn is_tail(&self) -> bool {
        self.next.is_none()
    }
}
