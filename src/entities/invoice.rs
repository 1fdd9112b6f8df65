//! Patient invoice entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Issued,
    PartiallyPaid,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::PartiallyPaid => "partially-paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "issued" => Ok(InvoiceStatus::Issued),
            "partially-paid" | "partially_paid" | "partial" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            _ => Err(format!("Unknown invoice status: {}", s)),
        }
    }
}

/// A billed line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl LineItem {
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// A patient invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: EntityId,

    /// Patient billed
    pub patient_id: EntityId,

    /// Total billed amount
    pub amount: f64,

    /// Amount received so far
    #[serde(default)]
    pub amount_paid: f64,

    /// Date the invoice was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<NaiveDate>,

    /// Payment due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,

    /// Itemized charges
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,

    /// Current status
    #[serde(default)]
    pub status: InvoiceStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Invoice {
    pub fn new(patient_id: EntityId, amount: f64, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Inv),
            patient_id,
            amount,
            amount_paid: 0.0,
            issued: None,
            due: None,
            line_items: Vec::new(),
            status: InvoiceStatus::default(),
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Outstanding balance
    pub fn balance(&self) -> f64 {
        (self.amount - self.amount_paid).max(0.0)
    }

    /// An invoice is overdue when unpaid past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(
            self.status,
            InvoiceStatus::Issued | InvoiceStatus::PartiallyPaid
        ) && self.due.is_some_and(|due| due < today)
    }

    /// Record a payment, updating status from the running total
    pub fn record_payment(&mut self, amount: f64) {
        self.amount_paid += amount;
        self.status = if self.amount_paid >= self.amount {
            InvoiceStatus::Paid
        } else if self.amount_paid > 0.0 {
            InvoiceStatus::PartiallyPaid
        } else {
            self.status
        };
    }
}

impl Entity for Invoice {
    const PREFIX: &'static str = "INV";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        // Invoices have no human title; listings show the patient instead
        ""
    }

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(amount: f64) -> Invoice {
        Invoice::new(EntityId::new(EntityPrefix::Pat), amount, "test".to_string())
    }

    #[test]
    fn test_payment_progression() {
        let mut inv = invoice(100.0);
        inv.status = InvoiceStatus::Issued;

        inv.record_payment(40.0);
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(inv.balance(), 60.0);

        inv.record_payment(60.0);
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.balance(), 0.0);
    }

    #[test]
    fn test_overdue_derivation() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut inv = invoice(100.0);
        inv.status = InvoiceStatus::Issued;
        inv.due = Some(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert!(inv.is_overdue(today));

        // Paid invoices are never overdue
        inv.record_payment(100.0);
        assert!(!inv.is_overdue(today));

        // Drafts are never overdue
        let mut draft = invoice(50.0);
        draft.due = Some(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert!(!draft.is_overdue(today));
    }

    #[test]
    fn test_invoice_roundtrip() {
        let mut inv = invoice(250.0);
        inv.line_items.push(LineItem {
            description: "Consultation".to_string(),
            quantity: 1,
            unit_price: 250.0,
        });
        let yaml = serde_yml::to_string(&inv).unwrap();
        let parsed: Invoice = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(inv.id, parsed.id);
        assert_eq!(parsed.line_items.len(), 1);
        assert_eq!(parsed.line_items[0].total(), 250.0);
    }
}
