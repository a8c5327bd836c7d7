//! Invoice settlement
//!
//! - [`calculator`]: pure subtotal / discount / tax / service charge arithmetic
//! - [`service`]: payment creation, invoice reads, confirmation, per-tenant rules

pub mod calculator;
pub mod service;

pub use calculator::InvoiceTotals;
pub use service::{CreateInvoice, SettlementService};
