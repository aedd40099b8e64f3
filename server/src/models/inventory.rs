use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::assign;
use crate::error::ApiResult;
use crate::validation::{
    max_len, non_blank, non_negative, non_negative_int, parse_date_or_datetime, required, required_str,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub price_per_unit: f64,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub minimum_stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.is_active && self.quantity <= self.minimum_stock
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub supplier: Option<String>,
    pub expiry_date: Option<String>,
    pub minimum_stock: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub price_per_unit: f64,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub minimum_stock: i32,
}

#[derive(Debug, Default)]
pub struct InventoryChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub minimum_stock: Option<i32>,
}

fn expiry(value: Option<String>) -> ApiResult<Option<NaiveDate>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| parse_date_or_datetime("expiry_date", &v))
        .transpose()
}

impl InventoryPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("name", self.name.as_deref(), 100)?;
        max_len("category", self.category.as_deref(), 50)?;
        max_len("unit", self.unit.as_deref(), 20)?;
        max_len("supplier", self.supplier.as_deref(), 100)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewInventoryItem> {
        self.check_lengths()?;
        let name = required_str(self.name, "name")?;
        let category = required_str(self.category, "category")?;
        let quantity = required(self.quantity, "quantity")?;
        let unit = required_str(self.unit, "unit")?;
        let price_per_unit = required(self.price_per_unit, "price_per_unit")?;

        Ok(NewInventoryItem {
            name,
            category,
            quantity: non_negative_int("quantity", quantity)?,
            unit,
            price_per_unit: non_negative("price_per_unit", price_per_unit)?,
            supplier: self.supplier,
            expiry_date: expiry(self.expiry_date)?,
            minimum_stock: non_negative_int("minimum_stock", self.minimum_stock.unwrap_or(0))?,
        })
    }

    pub fn into_changes(self) -> ApiResult<InventoryChanges> {
        self.check_lengths()?;
        Ok(InventoryChanges {
            name: non_blank(self.name, "name")?,
            category: non_blank(self.category, "category")?,
            quantity: self
                .quantity
                .map(|q| non_negative_int("quantity", q))
                .transpose()?,
            unit: non_blank(self.unit, "unit")?,
            price_per_unit: self
                .price_per_unit
                .map(|p| non_negative("price_per_unit", p))
                .transpose()?,
            supplier: self.supplier,
            expiry_date: expiry(self.expiry_date)?,
            minimum_stock: self
                .minimum_stock
                .map(|m| non_negative_int("minimum_stock", m))
                .transpose()?,
        })
    }
}

impl InventoryChanges {
    pub fn apply(self, item: &mut InventoryItem) {
        assign(&mut item.name, self.name);
        assign(&mut item.category, self.category);
        assign(&mut item.quantity, self.quantity);
        assign(&mut item.unit, self.unit);
        assign(&mut item.price_per_unit, self.price_per_unit);
        assign(&mut item.supplier, self.supplier.map(Some));
        assign(&mut item.expiry_date, self.expiry_date.map(Some));
        assign(&mut item.minimum_stock, self.minimum_stock);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryFilter {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> InventoryPayload {
        InventoryPayload {
            name: Some("Surgical gloves".into()),
            category: Some("Supplies".into()),
            quantity: Some(40),
            unit: Some("boxes".into()),
            price_per_unit: Some(6.5),
            supplier: Some("MedSupply Co".into()),
            expiry_date: Some("2027-06-30T00:00:00Z".into()),
            minimum_stock: None,
        }
    }

    #[test]
    fn test_defaults_and_expiry_parsing() {
        let new = payload().into_new().unwrap();
        assert_eq!(new.minimum_stock, 0);
        assert_eq!(new.expiry_date, NaiveDate::from_ymd_opt(2027, 6, 30));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = InventoryPayload {
            quantity: Some(-2),
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "quantity must not be negative");
    }

    #[test]
    fn test_low_stock_boundary() {
        let now = Utc::now();
        let new = payload().into_new().unwrap();
        let mut item = InventoryItem {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            quantity: 10,
            unit: new.unit,
            price_per_unit: new.price_per_unit,
            supplier: new.supplier,
            expiry_date: new.expiry_date,
            minimum_stock: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(item.is_low_stock());

        InventoryPayload {
            quantity: Some(11),
            ..Default::default()
        }
        .into_changes()
        .unwrap()
        .apply(&mut item);
        assert!(!item.is_low_stock());

        item.quantity = 0;
        item.is_active = false;
        assert!(!item.is_low_stock());
    }
}
