use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{ExchangeConfig, Venue};
use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::instrument::InstrumentFilters;
use crate::models::order::{OrderRequest, OrderType};

type HmacSha256 = Hmac<Sha256>;

/// Binance REST connector (futures or spot testnet), order placement and symbol filters only
pub struct BinanceExchange {
  pub venue: Venue,
  pub base_url: String,
  api_key: String,
  api_secret: String,
  recv_window_ms: u64,
  http: reqwest::Client,
}

/// Error body returned by Binance on rejected requests
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  code: i64,
  msg: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
  symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
  symbol: String,
  filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum SymbolFilter {
  #[serde(rename = "LOT_SIZE")]
  LotSize {
    #[serde(rename = "stepSize")]
    step_size: Decimal,
  },
  #[serde(rename = "PRICE_FILTER")]
  PriceFilter {
    #[serde(rename = "tickSize")]
    tick_size: Decimal,
  },
  #[serde(other)]
  Other,
}

impl BinanceExchange {
  pub fn new(
    venue: Venue,
    base_url: impl Into<String>,
    api_key: impl Into<String>,
    api_secret: impl Into<String>,
    recv_window_ms: u64,
    timeout: Duration,
  ) -> Result<Self, TradingError> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| TradingError::ConfigError(format!("failed to build http client: {}", e)))?;

    Ok(BinanceExchange {
      venue,
      base_url: base_url.into(),
      api_key: api_key.into(),
      api_secret: api_secret.into(),
      recv_window_ms,
      http,
    })
  }

  pub fn from_config(config: &ExchangeConfig) -> Result<Self, TradingError> {
    let (api_key, api_secret) = config.credentials()?;
    Self::new(
      config.venue,
      config.base_url(),
      api_key,
      api_secret,
      config.recv_window_ms,
      Duration::from_millis(config.timeout_ms),
    )
  }

  fn order_path(&self) -> &'static str {
    match self.venue {
      Venue::Futures => "/fapi/v1/order",
      Venue::Spot => "/api/v3/order",
    }
  }

  fn exchange_info_url(&self, symbol: &str) -> String {
    match self.venue {
      // futures exchangeInfo has no symbol filter
      Venue::Futures => format!("{}/fapi/v1/exchangeInfo", self.base_url),
      Venue::Spot => format!("{}/api/v3/exchangeInfo?symbol={}", self.base_url, symbol),
    }
  }

  fn sign(&self, query: &str) -> Result<String, TradingError> {
    sign_query(&self.api_secret, query)
  }

  async fn read_response(res: reqwest::Response) -> Result<serde_json::Value, TradingError> {
    let status = res.status();
    let body = res.text().await?;
    parse_response(status, &body)
  }
}

/// Map status + body: `{code,msg}` error bodies become `Rejected`, anything else unexpected `ExchangeError`
fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<serde_json::Value, TradingError> {
  if !status.is_success() {
    return Err(match serde_json::from_str::<ApiErrorBody>(body) {
      Ok(err) => TradingError::Rejected { status: status.as_u16(), code: err.code, msg: err.msg },
      Err(_) => TradingError::ExchangeError(format!("HTTP {}: {}", status, body)),
    });
  }

  serde_json::from_str(body)
    .map_err(|e| TradingError::ExchangeError(format!("unparseable response ({}): {}", e, body)))
}

/// Hex HMAC-SHA256 of the query string, keyed with the API secret
pub fn sign_query(secret: &str, query: &str) -> Result<String, TradingError> {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
    .map_err(|e| TradingError::ConfigError(format!("invalid API secret: {}", e)))?;
  mac.update(query.as_bytes());
  Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Unsigned order query in the order Binance documents it
pub fn order_query(
  order: &OrderRequest,
  order_type: OrderType,
  client_order_id: &str,
  recv_window_ms: u64,
  timestamp_ms: i64,
) -> Result<String, TradingError> {
  let mut params = vec![
    format!("symbol={}", order.symbol),
    format!("side={}", order.side),
    format!("type={}", order_type),
  ];
  let price = match order_type {
    OrderType::Limit => Some(order.price.ok_or_else(|| {
      TradingError::ExchangeError("limit order submitted without a price".to_string())
    })?),
    OrderType::Market => None,
  };
  if price.is_some() {
    params.push("timeInForce=GTC".to_string());
  }
  params.push(format!("quantity={}", order.quantity.normalize()));
  if let Some(price) = price {
    params.push(format!("price={}", price.normalize()));
  }
  params.push(format!("newClientOrderId={}", client_order_id));
  params.push(format!("recvWindow={}", recv_window_ms));
  params.push(format!("timestamp={}", timestamp_ms));
  Ok(params.join("&"))
}

fn filters_for_symbol(info: ExchangeInfo, symbol: &str) -> Result<InstrumentFilters, TradingError> {
  let entry = info
    .symbols
    .into_iter()
    .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    .ok_or_else(|| TradingError::ExchangeError(format!("Symbol {} not found", symbol)))?;

  let mut step_size = None;
  let mut tick_size = None;
  for filter in entry.filters {
    match filter {
      SymbolFilter::LotSize { step_size: s } => step_size = Some(s),
      SymbolFilter::PriceFilter { tick_size: t } => tick_size = Some(t),
      SymbolFilter::Other => {}
    }
  }

  match (step_size, tick_size) {
    (Some(step), Some(tick)) => Ok(InstrumentFilters::new(entry.symbol, step, tick)),
    (None, _) => Err(TradingError::ExchangeError(format!("{} has no LOT_SIZE filter", symbol))),
    (_, None) => Err(TradingError::ExchangeError(format!("{} has no PRICE_FILTER filter", symbol))),
  }
}

#[async_trait]
impl Exchange for BinanceExchange {
  async fn submit_order(&self, order: &OrderRequest, order_type: OrderType) -> Result<serde_json::Value, TradingError> {
    let client_order_id = Uuid::new_v4().simple().to_string();
    let ts = chrono::Utc::now().timestamp_millis();
    let query = order_query(order, order_type, &client_order_id, self.recv_window_ms, ts)?;
    let signature = self.sign(&query)?;
    let url = format!("{}{}?{}&signature={}", self.base_url, self.order_path(), query, signature);

    log::debug!("POST {}{} {} {} {}", self.base_url, self.order_path(), order_type, order.side, order.symbol);
    let res = self.http
      .post(url)
      .header("X-MBX-APIKEY", &self.api_key)
      .send().await?;
    Self::read_response(res).await
  }

  async fn symbol_filters(&self, symbol: &str) -> Result<InstrumentFilters, TradingError> {
    let res = self.http
      .get(self.exchange_info_url(symbol))
      .send().await?;
    let json = Self::read_response(res).await?;
    let info: ExchangeInfo = serde_json::from_value(json)?;
    filters_for_symbol(info, symbol)
  }

  fn name(&self) -> &'static str {
    match self.venue {
      Venue::Futures => "binance-futures",
      Venue::Spot => "binance-spot",
    }
  }
}
