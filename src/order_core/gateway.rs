use std::collections::HashMap;
use std::sync::Arc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::instrument::InstrumentFilters;
use crate::models::order::{OrderRequest, OrderResult, OrderSide, OrderType};
use crate::utils::logging::AuditLog;

/// 주문 게이트웨이 - 거래소 호출의 경계
///
/// 모든 거래소 오류는 여기서 `OrderResult::Failed` 로 변환되고,
/// 호출마다 감사 로그에 한 줄이 남는다.
pub struct OrderGateway {
    exchange: Arc<dyn Exchange>,
    audit: Arc<AuditLog>,
    round_to_instrument_increments: bool,
    /// 심볼별 lot/tick 캐시 (프로세스 수명 동안만 유지)
    filters: Mutex<HashMap<String, InstrumentFilters>>,
}

impl OrderGateway {
    pub fn new(exchange: Arc<dyn Exchange>, audit: Arc<AuditLog>) -> Self {
        OrderGateway {
            exchange,
            audit,
            round_to_instrument_increments: false,
            filters: Mutex::new(HashMap::new()),
        }
    }

    /// 제출 전 수량/가격을 거래소 단위로 내림
    pub fn with_rounding(mut self, enabled: bool) -> Self {
        self.round_to_instrument_increments = enabled;
        self
    }

    /// 반올림이 켜져 있으면 lot step 으로 내린 수량. 조회 실패나 0 이 되면 원래 수량.
    pub async fn align_quantity(&self, symbol: &str, quantity: Decimal) -> Decimal {
        if !self.round_to_instrument_increments {
            return quantity;
        }
        match self.instrument_filters(symbol).await.and_then(|f| f.round_quantity(quantity)) {
            Ok(rounded) if rounded > Decimal::ZERO => rounded,
            Ok(_) => quantity,
            Err(e) => {
                log::warn!("{} 수량 정렬 실패: {}", symbol, e);
                quantity
            }
        }
    }

    /// 시장가 주문
    pub async fn submit_market_order(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> OrderResult {
        self.submit(OrderRequest::market(symbol, side, quantity), OrderType::Market).await
    }

    /// 지정가 주문 (GTC)
    pub async fn submit_limit_order(&self, symbol: &str, side: OrderSide, quantity: Decimal, price: Decimal) -> OrderResult {
        self.submit(OrderRequest::limit(symbol, side, quantity, price), OrderType::Limit).await
    }

    async fn submit(&self, order: OrderRequest, order_type: OrderType) -> OrderResult {
        let order = match self.prepare(order.clone(), order_type).await {
            Ok(prepared) => prepared,
            Err(e) => {
                self.audit.error(&format!("{} order failed: {}: {}", label(order_type), describe(&order), e));
                return OrderResult::failed(e.to_string());
            }
        };

        match self.exchange.submit_order(&order, order_type).await {
            Ok(ack) => {
                self.audit.info(&format!("{} {}: {}", label(order_type), describe(&order), ack));
                OrderResult::Accepted(ack)
            }
            Err(e) => {
                self.audit.error(&format!("{} order failed: {}: {}", label(order_type), describe(&order), e));
                OrderResult::failed(e.to_string())
            }
        }
    }

    /// 반올림 옵션이 켜진 경우 lot step / tick 으로 내림
    async fn prepare(&self, mut order: OrderRequest, order_type: OrderType) -> Result<OrderRequest, TradingError> {
        if !self.round_to_instrument_increments {
            return Ok(order);
        }

        let filters = self.instrument_filters(&order.symbol).await?;

        let quantity = filters.round_quantity(order.quantity)?;
        if quantity <= Decimal::ZERO {
            return Err(TradingError::InstrumentFilter(format!(
                "quantity {} is below the lot step {} for {}",
                order.quantity, filters.step_size, order.symbol
            )));
        }
        if quantity != order.quantity {
            log::debug!("{} quantity {} -> {} (step {})", order.symbol, order.quantity, quantity, filters.step_size);
        }
        order.quantity = quantity;

        if let (OrderType::Limit, Some(price)) = (order_type, order.price) {
            let rounded = filters.round_price(price)?;
            if rounded <= Decimal::ZERO {
                return Err(TradingError::InstrumentFilter(format!(
                    "price {} is below the tick {} for {}",
                    price, filters.tick_size, order.symbol
                )));
            }
            order.price = Some(rounded);
        }

        Ok(order)
    }

    async fn instrument_filters(&self, symbol: &str) -> Result<InstrumentFilters, TradingError> {
        let mut cache = self.filters.lock().await;
        if let Some(filters) = cache.get(symbol) {
            return Ok(filters.clone());
        }

        let filters = self.exchange.symbol_filters(symbol).await?;
        log::info!("{} 필터: step {} / tick {}", symbol, filters.step_size, filters.tick_size);
        cache.insert(symbol.to_string(), filters.clone());
        Ok(filters)
    }
}

fn label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "Market",
        OrderType::Limit => "Limit",
    }
}

fn describe(order: &OrderRequest) -> String {
    match order.price {
        Some(price) => format!("{} {}@{} {}", order.side, order.quantity, price, order.symbol),
        None => format!("{} {} {}", order.side, order.quantity, order.symbol),
    }
}
