//! Core domain types for the order relay.
//!
//! Provides tolerant extraction of order fields from semi-structured
//! webhook payloads, the outbound invoice document model, and the relay
//! error taxonomy. No IO happens here; the other crates depend on these
//! types for the reshape between the ordering platform and the invoicing
//! API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod invoice;
pub mod order;

pub use error::RelayError;
pub use invoice::{Customer, InvoiceDocument, InvoiceLine};
pub use order::{OrderLine, OrderSummary};
