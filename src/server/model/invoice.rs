use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::controller::error::ApiError;
use crate::server::database::impl_document;
use crate::server::model::{checked_sum, contains_ci, search_term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum InvoiceStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Refunded,
    Overdue,
}

impl InvoiceStatus {
    pub fn accepts_payment(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Unpaid | InvoiceStatus::Partial | InvoiceStatus::Overdue
        )
    }

    pub fn accepts_refund(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Partial)
    }

    pub fn is_settled(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Refunded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LineItem {
    pub description: String,
    pub amount: Decimal,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Other".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Payment {
    pub id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Refund {
    pub id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Invoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub guest_id: Option<String>,
    pub guest_name: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
}

impl_document!(Invoice, "invoices", "inv");

pub(crate) fn invoice_total(items: &[LineItem]) -> Option<Decimal> {
    checked_sum(items.iter().map(|i| i.amount))
}

impl Invoice {
    pub fn total_paid(&self) -> Decimal {
        self.payments
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.amount))
    }

    pub fn total_refunded(&self) -> Decimal {
        self.refunds
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.amount))
    }

    /// Outstanding amount, `total - payments`.
    pub fn balance(&self) -> Decimal {
        self.total.saturating_sub(self.total_paid())
    }

    /// Status implied by the payments against the current total and the due date.
    /// Refunded invoices keep their status.
    pub fn settle_status(&mut self, today: NaiveDate) {
        if self.status == InvoiceStatus::Refunded {
            return;
        }
        self.status = if !self.payments.is_empty() && self.total_paid() >= self.total {
            InvoiceStatus::Paid
        } else if self.due_date.is_some_and(|due| due < today) {
            InvoiceStatus::Overdue
        } else if self.payments.is_empty() {
            InvoiceStatus::Unpaid
        } else {
            InvoiceStatus::Partial
        };
    }

    /// Append a payment and settle the status from the cumulative amount paid.
    pub fn record_payment(&mut self, payment: Payment) -> Result<(), ApiError> {
        if !self.status.accepts_payment() {
            return Err(ApiError::conflict(format!(
                "Cannot record a payment on a {} invoice",
                self.status
            )));
        }
        self.payments.push(payment);
        self.status = if self.total_paid() >= self.total {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
        Ok(())
    }

    pub fn record_refund(&mut self, refund: Refund) -> Result<(), ApiError> {
        if !self.status.accepts_refund() {
            return Err(ApiError::conflict(format!(
                "Cannot refund a {} invoice",
                self.status
            )));
        }
        let refundable = self.total_paid().saturating_sub(self.total_refunded());
        if refund.amount > refundable {
            return Err(ApiError::validation(format!(
                "Refund exceeds the refundable amount of {refundable}"
            )));
        }
        self.refunds.push(refund);
        self.status = InvoiceStatus::Refunded;
        Ok(())
    }

    /// Unpaid or partially paid past the due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, InvoiceStatus::Unpaid | InvoiceStatus::Partial)
            && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoicePayload {
    pub guest_id: Option<String>,
    pub guest_name: String,
    pub booking_id: Option<String>,
    pub items: Vec<LineItem>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PaymentPayload {
    pub amount: Decimal,
    pub method: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefundPayload {
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub search: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(term) = search_term(self.search.as_deref()) {
            if !contains_ci(&invoice.id, &term) && !contains_ci(&invoice.guest_name, &term) {
                return false;
            }
        }
        self.status.map_or(true, |s| invoice.status == s)
    }
}

/// Invoice with its derived amounts, as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub total_paid: Decimal,
    pub total_refunded: Decimal,
    pub balance: Decimal,
}

impl From<Invoice> for InvoiceView {
    fn from(invoice: Invoice) -> Self {
        Self {
            total_paid: invoice.total_paid(),
            total_refunded: invoice.total_refunded(),
            balance: invoice.balance(),
            invoice,
        }
    }
}
