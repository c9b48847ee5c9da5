use core::str::FromStr;

use crate::errors::SeqError;

/// What `insert_at` does with a position past `len + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPolicy {
    /// Append at `len + 1`.
    #[default]
    Clamp,
    /// Fail with [`SeqError::NotFound`].
    Reject,
}

impl FromStr for InsertPolicy {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(InsertPolicy::Clamp),
            "reject" => Ok(InsertPolicy::Reject),
            _ => Err(SeqError::InvalidArgument("expected `clamp` or `reject`")),
        }
    }
}

/// Construction options for a [`NodeSeq`](crate::NodeSeq).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeqConfig {
    pub insert_policy: InsertPolicy,
    /// Node slots to preallocate.
    pub initial_capacity: usize,
}

impl SeqConfig {
    pub fn with_insert_policy(mut self, policy: InsertPolicy) -> Self {
        self.insert_policy = policy;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
