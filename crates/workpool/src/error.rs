//! Error types surfaced by batch execution.
//!
//! A batch resolves to the first failure it detects. That failure is one of:
//!
//! - `PoolClosed`: the pool's shutdown token was cancelled while the batch was
//!   still being enqueued (or the workers are gone).
//! - `Cancelled`: the caller's context ended before every action was queued.
//! - `ActionPanicked`: an action panicked while a worker was driving it.
//! - `Action`: an action returned its own error, passed through unchanged.

/// A result whose error is the pool [`Error`] wrapping the action error `E`.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// All errors a batch can resolve to.
///
/// `E` is the error type returned by the actions themselves. It is surfaced
/// verbatim through [`Error::Action`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E> {
    /// The pool's shutdown signal was observed before the batch was fully
    /// enqueued.
    #[error("pool is closed")]
    PoolClosed,

    /// The batch context was cancelled by the caller.
    #[error("context canceled")]
    Cancelled,

    /// An action panicked instead of returning.
    #[error("action panicked")]
    ActionPanicked,

    /// An action returned an error.
    #[error(transparent)]
    Action(E),
}

impl<E> Error<E> {
    /// Returns the action error, if this is one.
    pub fn into_action(self) -> Option<E> {
        match self {
            Self::Action(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the batch stopped because of cancellation or pool
    /// shutdown rather than a failing action.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::PoolClosed | Self::Cancelled)
    }
}
