//! Outbound side of the order relay.
//!
//! Wraps a pooled HTTP client around the invoicing API's document-creation
//! endpoint with a bounded timeout and categorized failures. There is
//! deliberately no retry, queueing, or circuit breaking here: a failed
//! forward is logged by the caller and abandoned.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{ClientConfig, ForwardReceipt, VendusClient};
pub use error::ForwardError;
