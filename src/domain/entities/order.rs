use super::cart_entry::CartEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `order_submit` で再送される注文。ローカルスナップショットは持たない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub items: Vec<CartEntry>,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderSubmission {
    pub fn from_cart(items: Vec<CartEntry>) -> Self {
        let total_amount = items.iter().map(CartEntry::line_total).sum();
        Self {
            id: None,
            user_id: None,
            items,
            total_amount,
            shipping_address: None,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_line_totals() {
        let order = OrderSubmission::from_cart(vec![
            CartEntry::new("shirt", 2, 25.0),
            CartEntry::new("tie", 1, 12.5),
        ]);
        assert_eq!(order.total_amount, 62.5);
        assert_eq!(order.items.len(), 2);
    }
}
