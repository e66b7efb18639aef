#[cfg(feature = "async-smol")]
mod smol;
mod thread;
#[cfg(feature = "async-tokio")]
mod tokio;

#[cfg(feature = "async-smol")]
pub use smol::*;
pub use thread::*;
#[cfg(feature = "async-tokio")]
pub use tokio::*;
