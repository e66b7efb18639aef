#![doc = include_str!("../README.md")]

mod action;
mod error;
mod executor;
mod pool;
mod runtime;
mod spawn_provider;

pub use crate::action::*;
pub use crate::error::*;
pub use crate::executor::*;
pub use crate::pool::*;
pub use crate::runtime::*;
pub use crate::spawn_provider::*;
// Public re-export so callers can build contexts and shutdown signals without
// depending on `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
