//! Asynchronous MX resolution.
//!
//! [`MxResolver`] is the seam the prober depends on; [`SystemResolver`]
//! implements it with the system DNS configuration. [`lookup`] wraps any
//! resolver with the DNS timeout and record ordering.

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{MxResolver, SystemResolver, lookup};
pub use types::MxRecord;
