use serde::{Deserialize, Serialize};

use crate::errors::{require, ModelError};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Pending,
    Completed,
}

impl ItemStatus {
    pub fn toggled(self) -> Self {
        match self {
            ItemStatus::Completed => ItemStatus::Pending,
            ItemStatus::Pending => ItemStatus::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Completed => "Completed",
        }
    }
}

/// Inventory line of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Id,
    #[serde(default, alias = "eventId", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Id>,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub owner: String,
    #[serde(default)]
    pub status: ItemStatus,
}

impl Item {
    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            quantity: self.quantity.to_string(),
            price: self.price.to_string(),
            owner: self.owner.clone(),
        }
    }
}

/// Raw form input; quantity and price are still text here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub owner: String,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<ItemFields, ModelError> {
        let name = require("name", &self.name)?;
        let quantity_raw = require("quantity", &self.quantity)?;
        let price_raw = require("price", &self.price)?;
        let owner = require("owner", &self.owner)?;

        let quantity = quantity_raw.parse::<i64>().map_err(|_| ModelError::InvalidNumber {
            field: "quantity",
            expected: "integer",
            value: quantity_raw.clone(),
        })?;
        let price = price_raw
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| ModelError::InvalidNumber {
                field: "price",
                expected: "number",
                value: price_raw.clone(),
            })?;
        Ok(ItemFields { name, quantity, price, owner })
    }
}

/// Validated body of `POST /events/{id}/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub owner: String,
}

/// Partial body of `PUT /items/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(&self, item: &mut Item) {
        if let Some(n) = &self.name {
            item.name = n.clone();
        }
        if let Some(q) = self.quantity {
            item.quantity = q;
        }
        if let Some(p) = self.price {
            item.price = p;
        }
        if let Some(o) = &self.owner {
            item.owner = o.clone();
        }
        if let Some(s) = self.status {
            item.status = s;
        }
    }
}

impl From<ItemFields> for ItemPatch {
    fn from(f: ItemFields) -> Self {
        Self {
            name: Some(f.name),
            quantity: Some(f.quantity),
            price: Some(f.price),
            owner: Some(f.owner),
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_are_sent_as_numbers() {
        let draft = ItemDraft {
            name: "Chairs".into(),
            quantity: "3".into(),
            price: "9.99".into(),
            owner: "Ann".into(),
        };
        let body = serde_json::to_value(draft.validate().unwrap()).unwrap();
        assert_eq!(body["quantity"], serde_json::json!(3));
        assert!(body["quantity"].is_i64());
        assert_eq!(body["price"].as_f64(), Some(9.99));
    }

    #[test]
    fn non_integer_quantity_is_rejected() {
        let draft = ItemDraft {
            name: "Chairs".into(),
            quantity: "2.5".into(),
            price: "1".into(),
            owner: "Ann".into(),
        };
        match draft.validate().unwrap_err() {
            ModelError::InvalidNumber { field, .. } => assert_eq!(field, "quantity"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_price_is_rejected() {
        let draft = ItemDraft {
            name: "Chairs".into(),
            quantity: "2".into(),
            price: "cheap".into(),
            owner: "Ann".into(),
        };
        assert!(matches!(draft.validate(), Err(ModelError::InvalidNumber { field: "price", .. })));
    }

    #[test]
    fn item_toggle_is_two_state() {
        assert_eq!(ItemStatus::Pending.toggled(), ItemStatus::Completed);
        assert_eq!(ItemStatus::Completed.toggled(), ItemStatus::Pending);
    }

    #[test]
    fn draft_round_trips_through_edit_form() {
        let item = Item {
            id: 1,
            event_id: Some(2),
            name: "Tent".into(),
            quantity: 4,
            price: 12.5,
            owner: "Bo".into(),
            status: ItemStatus::Pending,
        };
        let fields = item.draft().validate().unwrap();
        assert_eq!(fields.quantity, 4);
        assert_eq!(fields.price, 12.5);
    }
}
