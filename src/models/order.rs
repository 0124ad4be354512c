use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    /// Sent good-till-cancelled
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated order. Quantity is always positive, price positive when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        OrderRequest { symbol: symbol.into(), side, quantity, price: None }
    }

    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        OrderRequest { symbol: symbol.into(), side, quantity, price: Some(price) }
    }

    pub fn with_quantity(&self, quantity: Decimal) -> Self {
        OrderRequest { quantity, ..self.clone() }
    }
}

/// What the gateway hands back for every submission.
///
/// Serialises as the exchange acknowledgment itself, or as `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum OrderResult {
    Accepted(serde_json::Value),
    Failed { error: String },
}

impl OrderResult {
    pub fn failed(error: impl Into<String>) -> Self {
        OrderResult::Failed { error: error.into() }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, OrderResult::Accepted(_))
    }

    pub fn is_failed(&self) -> bool {
        !self.is_accepted()
    }

    pub fn ack(&self) -> Option<&serde_json::Value> {
        match self {
            OrderResult::Accepted(ack) => Some(ack),
            OrderResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OrderResult::Accepted(_) => None,
            OrderResult::Failed { error } => Some(error),
        }
    }
}

/// A validated TWAP run: `request.quantity` is the total to be split.
#[derive(Debug, Clone, PartialEq)]
pub struct TwapPlan {
    pub request: OrderRequest,
    pub parts: u32,
    pub interval: Duration,
}

impl TwapPlan {
    /// Plain decimal division, no rounding.
    pub fn piece_size(&self) -> Decimal {
        self.request.quantity / Decimal::from(self.parts)
    }
}

/// Per-step results in submission order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TwapOutcome {
    pub twap_results: Vec<OrderResult>,
}

impl TwapOutcome {
    pub fn len(&self) -> usize {
        self.twap_results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.twap_results.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.twap_results.iter().filter(|r| r.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_side_serialises_uppercase() {
        assert_eq!(serde_json::to_value(OrderSide::Buy).unwrap(), json!("BUY"));
        assert_eq!(OrderSide::Sell.to_string(), "SELL");
        assert_eq!(OrderType::Limit.to_string(), "LIMIT");
    }

    #[test]
    fn test_order_result_json_shape() {
        let ok = OrderResult::Accepted(json!({"orderId": 7, "status": "FILLED"}));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"orderId": 7, "status": "FILLED"}));

        let failed = OrderResult::failed("APIError(code=-2019)");
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!({"error": "APIError(code=-2019)"}));
        assert_eq!(failed.error(), Some("APIError(code=-2019)"));
        assert!(failed.ack().is_none());
    }

    #[test]
    fn test_twap_outcome_wraps_results() {
        let outcome = TwapOutcome {
            twap_results: vec![OrderResult::Accepted(json!({"orderId": 1})), OrderResult::failed("boom")],
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"twap_results": [{"orderId": 1}, {"error": "boom"}]})
        );
        assert_eq!(outcome.failures(), 1);
    }

    #[test]
    fn test_piece_size_is_plain_division() {
        let plan = TwapPlan {
            request: OrderRequest::market("BTCUSDT", OrderSide::Buy, dec!(0.009)),
            parts: 3,
            interval: Duration::from_secs(0),
        };
        assert_eq!(plan.piece_size(), dec!(0.003));
    }
}
