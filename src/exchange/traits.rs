use async_trait::async_trait;

use crate::error::TradingError;
use crate::models::instrument::InstrumentFilters;
use crate::models::order::{OrderRequest, OrderType};

/// The `Exchange` trait defines the interface for interacting with trading exchanges.
/// It is implemented by the REST connector and by the dry-run connector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Submit a new order and return the exchange acknowledgment as-is
    async fn submit_order(&self, order: &OrderRequest, order_type: OrderType) -> Result<serde_json::Value, TradingError>;

    /// Lot step and tick size for a symbol
    async fn symbol_filters(&self, symbol: &str) -> Result<InstrumentFilters, TradingError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
