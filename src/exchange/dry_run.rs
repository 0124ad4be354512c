use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::instrument::InstrumentFilters;
use crate::models::order::{OrderRequest, OrderType};

/// A no-op exchange connector that acknowledges orders without sending them
#[derive(Default)]
pub struct DryRunExchange {
  order_id_counter: AtomicU64,
}

impl DryRunExchange {
  pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl Exchange for DryRunExchange {
  async fn submit_order(&self, order: &OrderRequest, order_type: OrderType) -> Result<serde_json::Value, TradingError> {
    if order_type == OrderType::Limit && order.price.is_none() {
      return Err(TradingError::ExchangeError("limit order submitted without a price".into()));
    }

    let order_id = self.order_id_counter.fetch_add(1, Ordering::SeqCst) + 1;
    let status = match order_type {
      OrderType::Market => "FILLED",
      OrderType::Limit => "NEW",
    };

    Ok(json!({
      "orderId": order_id,
      "clientOrderId": format!("dry-{}-{}", order.symbol, order_id),
      "symbol": order.symbol,
      "side": order.side,
      "type": order_type,
      "timeInForce": if order_type == OrderType::Limit { "GTC" } else { "" },
      "origQty": order.quantity.normalize().to_string(),
      "price": order.price.map(|p| p.normalize().to_string()).unwrap_or_else(|| "0".to_string()),
      "status": status,
      "updateTime": chrono::Utc::now().timestamp_millis(),
      "dryRun": true,
    }))
  }

  async fn symbol_filters(&self, symbol: &str) -> Result<InstrumentFilters, TradingError> {
    Ok(InstrumentFilters::unrestricted(symbol))
  }

  fn name(&self) -> &'static str { "dry-run" }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::order::OrderSide;
  use rust_decimal_macros::dec;

  #[tokio::test]
  async fn test_echoes_limit_order() {
    let exchange = DryRunExchange::new();
    let order = OrderRequest::limit("BTCUSDT", OrderSide::Buy, dec!(0.01), dec!(25000));
    let ack = exchange.submit_order(&order, OrderType::Limit).await.unwrap();

    assert_eq!(ack["orderId"], 1);
    assert_eq!(ack["side"], "BUY");
    assert_eq!(ack["type"], "LIMIT");
    assert_eq!(ack["origQty"], "0.01");
    assert_eq!(ack["price"], "25000");
    assert_eq!(ack["status"], "NEW");
  }

  #[tokio::test]
  async fn test_order_ids_increase() {
    let exchange = DryRunExchange::new();
    let order = OrderRequest::market("ETHUSDT", OrderSide::Sell, dec!(1));
    let first = exchange.submit_order(&order, OrderType::Market).await.unwrap();
    let second = exchange.submit_order(&order, OrderType::Market).await.unwrap();
    assert_eq!(first["orderId"], 1);
    assert_eq!(second["orderId"], 2);
    assert_eq!(second["status"], "FILLED");
  }
}
