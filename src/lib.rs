mod arena;
mod config;
mod errors;
mod handle;
mod node;
mod node_seq;

pub use config::{InsertPolicy, SeqConfig};
pub use errors::SeqError;
pub use handle::Handle;
pub use node_seq::{Iter, IterHandles, NodeSeq};
