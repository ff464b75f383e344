//! [`Bus`]-related implementations.

pub mod broadcast;

use derive_more::{Display, Error as StdError, From};

pub use self::broadcast::Broadcast;

/// Event bus operation.
pub use common::Handler as Bus;

/// [`Bus`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to encode an [`Event`] payload.
    ///
    /// [`Event`]: crate::event::Event
    #[display("Failed to encode event: {_0}")]
    Encode(serde_json::Error),

    /// [`Bus`] has been closed.
    #[display("Event bus is closed")]
    #[from(ignore)]
    Closed,
}
