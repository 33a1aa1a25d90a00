use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An order as persisted in the data file and served over the API.
///
/// Field names stay camelCase on the wire so existing data files and
/// clients keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub basket_no: i64,
    /// Delivery slip number, `D` followed by the zero padded order id.
    pub delivery_no: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    /// Needed for geocoding. An order without one still gets delivered,
    /// it just can't be placed on the optimized part of the route.
    #[serde(default)]
    pub customer_postcode: Option<String>,
    /// Clients send this as either a number or a string from a form
    /// field. Junk reads as absent.
    #[serde(default, deserialize_with = "amount_from_form_value")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub delivery_notes: String,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Monetary value used by route summaries. Missing or non numeric
    /// amounts count as 0.
    pub fn amount(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
}

/// Body of `POST /api/orders`. Everything the server assigns itself
/// (id, basket number, delivery number, timestamps) is absent here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_postcode: Option<String>,
    #[serde(default, deserialize_with = "amount_from_form_value")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Body of `PUT /api/orders/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_postcode: Option<String>,
    #[serde(default, deserialize_with = "amount_from_form_value")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub delivery_notes: Option<String>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

// The form sends amounts like "12.50", older data files hold plain
// numbers, and blank form fields come through as "".
fn amount_from_form_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    Ok(amount)
}
