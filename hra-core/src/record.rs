//! Scalar values computed during an optimization step.
//!
//! ```rust
//! use hra_core::record::Record;
//!
//! let record = Record::from_scalar("loss", 0.5);
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
//! ```
mod base;
pub use base::Record;
