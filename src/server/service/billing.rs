use std::sync::Arc;

use chrono::NaiveDate;
use log::info;
use tokio::sync::Mutex;

use crate::server::controller::error::ApiError;
use crate::server::database::{new_id, Repository, Store};
use crate::server::model::invoice::{
    invoice_total, Invoice, InvoiceFilter, InvoicePayload, InvoiceStatus, LineItem, Payment,
    PaymentPayload, Refund, RefundPayload,
};
use crate::server::util::time::helper;
use crate::server::util::validation::{
    amount_too_large, validate_non_negative, validate_positive, validate_required_text, MAX_NAME_LEN, MAX_NOTE_LEN,
};

#[derive(Clone)]
pub(crate) struct BillingService {
    invoices: Repository<Invoice>,
    /// Payments and edits read, modify, then replace a whole invoice.
    write_lock: Arc<Mutex<()>>,
}

impl BillingService {
    pub fn new(store: &Store) -> Self {
        Self {
            invoices: Repository::new(store.clone()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Newest first.
    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, ApiError> {
        let mut invoices: Vec<_> = self
            .invoices
            .find_all()
            .await?
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect();
        invoices.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then_with(|| b.id.cmp(&a.id)));
        Ok(invoices)
    }

    pub async fn get(&self, id: &str) -> Result<Invoice, ApiError> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Invoice"))
    }

    fn validate(payload: &InvoicePayload) -> Result<(), ApiError> {
        validate_required_text(&payload.guest_name, "Guest name is required", MAX_NAME_LEN)?;
        if payload.items.is_empty() {
            return Err(ApiError::validation("Add at least one line item"));
        }
        payload.items.iter().try_for_each(validate_line)
    }

    pub async fn create(&self, payload: InvoicePayload) -> Result<Invoice, ApiError> {
        Self::validate(&payload)?;
        let today = helper::today();
        let mut invoice = Invoice {
            id: String::new(),
            guest_id: payload.guest_id,
            guest_name: payload.guest_name.trim().to_string(),
            booking_id: payload.booking_id,
            total: invoice_total(&payload.items).ok_or_else(amount_too_large)?,
            items: payload.items,
            status: InvoiceStatus::Unpaid,
            issue_date: today,
            due_date: payload.due_date,
            payments: vec![],
            refunds: vec![],
        };
        invoice.settle_status(today);
        let invoice = self.invoices.create(invoice).await?;
        info!("invoice {} issued to {}, total {}", invoice.id, invoice.guest_name, invoice.total);
        Ok(invoice)
    }

    /// Settled invoices are frozen. The status is re-derived from the new
    /// total and due date, and the total may not drop below what was paid.
    pub async fn update(&self, id: &str, payload: InvoicePayload) -> Result<Invoice, ApiError> {
        Self::validate(&payload)?;
        let total = invoice_total(&payload.items).ok_or_else(amount_too_large)?;
        let _guard = self.write_lock.lock().await;
        let mut invoice = self.get(id).await?;
        if invoice.status.is_settled() {
            return Err(ApiError::conflict(format!(
                "Cannot edit a {} invoice",
                invoice.status
            )));
        }
        let paid = invoice.total_paid();
        if total < paid {
            return Err(ApiError::validation(format!(
                "Invoice total cannot be less than the {paid} already paid"
            )));
        }
        invoice.guest_id = payload.guest_id;
        invoice.guest_name = payload.guest_name.trim().to_string();
        invoice.booking_id = payload.booking_id;
        invoice.total = total;
        invoice.items = payload.items;
        invoice.due_date = payload.due_date;
        invoice.settle_status(helper::today());
        self.invoices.update(&invoice).await?;
        Ok(invoice)
    }

    pub async fn record_payment(&self, id: &str, payload: PaymentPayload) -> Result<Invoice, ApiError> {
        validate_positive(payload.amount, "Payment amount must be greater than zero")?;
        validate_required_text(&payload.method, "Payment method is required", MAX_NAME_LEN)?;
        let _guard = self.write_lock.lock().await;
        let mut invoice = self.get(id).await?;
        invoice.record_payment(Payment {
            id: new_id("pay"),
            amount: payload.amount,
            date: helper::today(),
            method: payload.method.trim().to_string(),
        })?;
        self.invoices.update(&invoice).await?;
        info!("payment of {} recorded on {}, now {}", payload.amount, invoice.id, invoice.status);
        Ok(invoice)
    }

    pub async fn record_refund(&self, id: &str, payload: RefundPayload) -> Result<Invoice, ApiError> {
        validate_positive(payload.amount, "Refund amount must be greater than zero")?;
        if payload.reason.len() > MAX_NOTE_LEN {
            return Err(ApiError::validation("Refund reason is too long"));
        }
        let _guard = self.write_lock.lock().await;
        let mut invoice = self.get(id).await?;
        invoice.record_refund(Refund {
            id: new_id("ref"),
            amount: payload.amount,
            date: helper::today(),
            reason: payload.reason,
        })?;
        self.invoices.update(&invoice).await?;
        info!("refund of {} recorded on {}", payload.amount, invoice.id);
        Ok(invoice)
    }

    /// Marks open invoices past their due date as overdue, returning the ids touched.
    pub async fn sweep_overdue(&self, today: NaiveDate) -> Result<Vec<String>, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut swept = vec![];
        for mut invoice in self.invoices.find_all().await? {
            if invoice.is_overdue(today) {
                invoice.status = InvoiceStatus::Overdue;
                self.invoices.update(&invoice).await?;
                swept.push(invoice.id);
            }
        }
        Ok(swept)
    }
}

fn validate_line(item: &LineItem) -> Result<(), ApiError> {
    validate_required_text(&item.description, "Line item description is required", MAX_NAME_LEN)?;
    validate_non_negative(item.amount, "Line item amount cannot be negative")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::testing::{now, seeded_store};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn payload(amounts: &[i64]) -> InvoicePayload {
        InvoicePayload {
            guest_id: None,
            guest_name: "Walk-in".to_string(),
            booking_id: None,
            items: amounts
                .iter()
                .map(|a| LineItem {
                    description: "Minibar".to_string(),
                    amount: Decimal::from(*a),
                    category: "Food".to_string(),
                })
                .collect(),
            due_date: None,
        }
    }

    fn pay(amount: i64) -> PaymentPayload {
        PaymentPayload {
            amount: Decimal::from(amount),
            method: "Cash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_sums_items_and_starts_unpaid() {
        let service = BillingService::new(&seeded_store().await);
        let invoice = service.create(payload(&[40, 15])).await.unwrap();
        assert_eq!(invoice.total, Decimal::from(55));
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.issue_date, now().date_naive());
        assert!(matches!(
            service.create(payload(&[-5])).await,
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn payments_settle_the_invoice() {
        let service = BillingService::new(&seeded_store().await);
        let invoice = service.record_payment("inv_001", pay(850)).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Partial);
        assert_eq!(invoice.balance(), Decimal::from(2000));
        assert!(invoice.payments[0].id.starts_with("pay_"));
        let invoice = service.record_payment("inv_001", pay(2000)).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(matches!(
            service.record_payment("inv_001", pay(1)).await,
            Err(ApiError::Conflict { .. })
        ));
        assert!(matches!(
            service.update("inv_001", payload(&[10])).await,
            Err(ApiError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn zero_payment_rejected() {
        let service = BillingService::new(&seeded_store().await);
        assert!(matches!(
            service.record_payment("inv_001", pay(0)).await,
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn refund_paid_invoice() {
        let service = BillingService::new(&seeded_store().await);
        let refund = RefundPayload {
            amount: Decimal::from(200),
            reason: "Noise complaint".to_string(),
        };
        let invoice = service.record_refund("inv_002", refund).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Refunded);
        assert_eq!(invoice.total_refunded(), Decimal::from(200));
    }

    #[tokio::test]
    async fn sweep_marks_past_due() {
        let service = BillingService::new(&seeded_store().await);
        let today = now().date_naive();
        assert!(service.sweep_overdue(today).await.unwrap().is_empty());
        let swept = service.sweep_overdue(today + Duration::days(4)).await.unwrap();
        assert_eq!(swept, vec!["inv_001".to_string()]);
        let invoice = service.get("inv_001").await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        // overdue invoices still take payments
        let invoice = service.record_payment("inv_001", pay(2850)).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn oversized_amounts_are_rejected() {
        let service = BillingService::new(&seeded_store().await);
        let mut huge = payload(&[1]);
        huge.items = vec![huge.items[0].clone(), huge.items[0].clone()];
        for item in &mut huge.items {
            item.amount = Decimal::from_scientific("5e28").unwrap();
        }
        assert!(matches!(service.create(huge).await, Err(ApiError::BadRequest { .. })));
        let payment = PaymentPayload {
            amount: Decimal::MAX,
            method: "Cash".to_string(),
        };
        assert!(matches!(
            service.record_payment("inv_001", payment).await,
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn editing_items_settles_against_payments() {
        let service = BillingService::new(&seeded_store().await);
        let invoice = service.create(payload(&[900])).await.unwrap();
        let invoice = service.record_payment(&invoice.id, pay(500)).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Partial);

        let err = service.update(&invoice.id, payload(&[400])).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
        assert_eq!(service.get(&invoice.id).await.unwrap().total, Decimal::from(900));

        let invoice = service.update(&invoice.id, payload(&[300, 200])).await.unwrap();
        assert_eq!(invoice.total, Decimal::from(500));
        assert_eq!(invoice.balance(), Decimal::ZERO);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn editing_due_date_moves_overdue_status() {
        let service = BillingService::new(&seeded_store().await);
        let today = now().date_naive();
        let mut late = payload(&[300]);
        late.due_date = Some(today - Duration::days(1));
        let invoice = service.create(late.clone()).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);

        let mut extended = late.clone();
        extended.due_date = Some(today + Duration::days(7));
        let invoice = service.update(&invoice.id, extended).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);

        service.record_payment(&invoice.id, pay(100)).await.unwrap();
        let invoice = service.update(&invoice.id, late).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
    }
}
