pub mod error;
pub use error::*;

pub mod client;
pub mod dns;
pub mod record;

mod wrapper;
