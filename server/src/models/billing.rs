use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::assign;
use crate::error::ApiResult;
use crate::validation::{max_len, non_blank, non_negative, one_of, positive_int, required, required_str};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BillingRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [PaymentStatus::Pending, PaymentStatus::Partial, PaymentStatus::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

fn parse_payment_status(value: &str) -> ApiResult<PaymentStatus> {
    one_of(
        "payment_status",
        value,
        PaymentStatus::parse,
        "Payment status must be pending, partial, or paid",
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingRecordPayload {
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub total_amount: Option<f64>,
    pub paid_amount: Option<f64>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBillingRecord {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct BillingRecordChanges {
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub total_amount: Option<f64>,
    pub paid_amount: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub notes: Option<String>,
}

impl BillingRecordPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("payment_method", self.payment_method.as_deref(), 50)?;
        max_len("insurance_provider", self.insurance_provider.as_deref(), 100)?;
        max_len("insurance_policy_number", self.insurance_policy_number.as_deref(), 50)?;
        max_len("notes", self.notes.as_deref(), 500)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewBillingRecord> {
        self.check_lengths()?;
        let patient_id = required(self.patient_id, "patient_id")?;
        let total_amount = non_negative("total_amount", required(self.total_amount, "total_amount")?)?;

        Ok(NewBillingRecord {
            patient_id,
            appointment_id: self.appointment_id,
            total_amount,
            paid_amount: non_negative("paid_amount", self.paid_amount.unwrap_or(0.0))?,
            payment_status: self
                .payment_status
                .map(|s| parse_payment_status(&s))
                .transpose()?
                .unwrap_or(PaymentStatus::Pending),
            payment_method: self.payment_method,
            insurance_provider: self.insurance_provider,
            insurance_policy_number: self.insurance_policy_number,
            notes: self.notes,
        })
    }

    pub fn into_changes(self) -> ApiResult<BillingRecordChanges> {
        self.check_lengths()?;
        Ok(BillingRecordChanges {
            patient_id: self.patient_id,
            appointment_id: self.appointment_id,
            total_amount: self
                .total_amount
                .map(|v| non_negative("total_amount", v))
                .transpose()?,
            paid_amount: self
                .paid_amount
                .map(|v| non_negative("paid_amount", v))
                .transpose()?,
            payment_status: self
                .payment_status
                .map(|s| parse_payment_status(&s))
                .transpose()?,
            payment_method: self.payment_method,
            insurance_provider: self.insurance_provider,
            insurance_policy_number: self.insurance_policy_number,
            notes: self.notes,
        })
    }
}

impl BillingRecordChanges {
    pub fn apply(self, record: &mut BillingRecord) {
        assign(&mut record.patient_id, self.patient_id);
        assign(&mut record.appointment_id, self.appointment_id.map(Some));
        assign(&mut record.total_amount, self.total_amount);
        assign(&mut record.paid_amount, self.paid_amount);
        assign(
            &mut record.payment_status,
            self.payment_status.map(|s| s.as_str().to_string()),
        );
        assign(&mut record.payment_method, self.payment_method.map(Some));
        assign(&mut record.insurance_provider, self.insurance_provider.map(Some));
        assign(
            &mut record.insurance_policy_number,
            self.insurance_policy_number.map(Some),
        );
        assign(&mut record.notes, self.notes.map(Some));
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingFilter {
    pub patient_id: Option<Uuid>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BillingItem {
    pub id: Uuid,
    pub billing_record_id: Uuid,
    pub item_type: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line total; the only way `total_price` is ever computed
pub fn line_total(quantity: i32, unit_price: f64) -> f64 {
    f64::from(quantity) * unit_price
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingItemPayload {
    pub item_type: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewBillingItem {
    pub item_type: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
}

impl NewBillingItem {
    pub fn total_price(&self) -> f64 {
        line_total(self.quantity, self.unit_price)
    }
}

#[derive(Debug, Default)]
pub struct BillingItemChanges {
    pub item_type: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
}

impl BillingItemPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("item_type", self.item_type.as_deref(), 50)?;
        max_len("description", self.description.as_deref(), 200)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewBillingItem> {
        self.check_lengths()?;
        let item_type = required_str(self.item_type, "item_type")?;
        let description = required_str(self.description, "description")?;
        let unit_price = non_negative("unit_price", required(self.unit_price, "unit_price")?)?;

        Ok(NewBillingItem {
            item_type,
            description,
            quantity: positive_int("quantity", self.quantity.unwrap_or(1))?,
            unit_price,
        })
    }

    pub fn into_changes(self) -> ApiResult<BillingItemChanges> {
        self.check_lengths()?;
        Ok(BillingItemChanges {
            item_type: non_blank(self.item_type, "item_type")?,
            description: non_blank(self.description, "description")?,
            quantity: self.quantity.map(|q| positive_int("quantity", q)).transpose()?,
            unit_price: self
                .unit_price
                .map(|p| non_negative("unit_price", p))
                .transpose()?,
        })
    }
}

impl BillingItemChanges {
    pub fn apply(self, item: &mut BillingItem) {
        assign(&mut item.item_type, self.item_type);
        assign(&mut item.description, self.description);
        assign(&mut item.quantity, self.quantity);
        assign(&mut item.unit_price, self.unit_price);
        item.total_price = line_total(item.quantity, item.unit_price);
    }
}
