mod cache;
mod sequence;

pub use cache::MemCache;
pub use sequence::{Sequenced, Ticket};
