//! Infrastructure layer.

pub mod bus;
pub mod database;

#[cfg(feature = "memory")]
pub use self::database::{memory, Memory};
pub use self::{
    bus::{Broadcast, Bus},
    database::Database,
};
