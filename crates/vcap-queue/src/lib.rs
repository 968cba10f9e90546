//! Redis list job queue.
//!
//! Producers `LPUSH` JSON job messages onto a named list and workers take them
//! off the other end with a bounded `BRPOP`. Delivery is at-most-once: a
//! popped message is never re-queued.

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{JobQueue, MessageSource, QueueConfig};
