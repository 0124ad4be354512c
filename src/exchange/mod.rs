pub mod binance;
pub mod dry_run;
pub mod traits;

use std::sync::Arc;

use crate::config::ExchangeConfig;
use crate::error::TradingError;

pub use binance::BinanceExchange;
pub use dry_run::DryRunExchange;
pub use traits::Exchange;

/// Build the connector selected by the configuration
pub fn from_config(config: &ExchangeConfig) -> Result<Arc<dyn Exchange>, TradingError> {
    if config.dry_run {
        return Ok(Arc::new(DryRunExchange::new()));
    }
    Ok(Arc::new(BinanceExchange::from_config(config)?))
}
