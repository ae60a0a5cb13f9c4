//! Outbound invoice document model.
//!
//! Mirrors the invoicing API's document-creation contract. The API rejects
//! documents carrying keys with absent values, so every optional field is
//! stripped at the serializer via `skip_serializing_if` rather than cleaned
//! up after the fact.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::order::OrderSummary;

/// A document-creation request for the invoicing API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDocument {
    /// Invoicing API credential.
    pub api_key: String,

    /// Document type code. `"FT"` is the standard invoice; the code is
    /// configuration-driven because the accepted set is owned by the
    /// external API.
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Customer block; omitted entirely when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    /// Document line items. An order without items produces an empty
    /// collection, never an absent key.
    pub lines: Vec<InvoiceLine>,

    /// Free-text annotation embedding the source order id.
    pub notes: String,

    /// Optional document date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Optional cross-system reference; carries the source order id when
    /// one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

/// Customer block of an invoice document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer display name.
    pub name: String,
    /// Customer email; the API accepts an empty string.
    pub email: String,
}

/// One invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Product reference code.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Quantity invoiced.
    pub qty: f64,
    /// Unit price as given by the source order.
    pub price: f64,
    /// Optional line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InvoiceDocument {
    /// Builds a document for a resolved order.
    ///
    /// The notes annotation is exactly `GloriaFood Order #<orderId>`; the
    /// external reference is set only when the order carried a real id.
    pub fn from_order(api_key: &str, doc_type: &str, order: &OrderSummary) -> Self {
        Self {
            api_key: api_key.to_string(),
            doc_type: doc_type.to_string(),
            customer: Some(Customer {
                name: order.customer_name.clone(),
                email: order.customer_email.clone(),
            }),
            lines: order
                .lines
                .iter()
                .map(|line| InvoiceLine {
                    reference: line.reference.clone(),
                    qty: line.quantity,
                    price: line.price,
                    description: line.description.clone(),
                })
                .collect(),
            notes: format!("GloriaFood Order #{}", order.id),
            date: None,
            external_reference: order.has_known_id().then(|| order.id.clone()),
        }
    }

    /// Stamps an explicit document date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}
