//! Worker pool and batch dispatch.
//!
//! ## Structure
//!
//! - `manager` - the [`Pool`] handle and the batch protocol.
//! - `worker` - the loop each worker runs.
//! - `envelope` - a single dispatch and its reply path.

mod envelope;
mod manager;
mod worker;

pub use manager::Pool;
