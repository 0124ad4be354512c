//! 주문 봇
//!
//! 검증된 작업(시장가 / 지정가 / TWAP)을 게이트웨이와 TWAP 실행기로 전달한다.

use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::core::delay::Delay;
use crate::core::twap::TwapScheduler;
use crate::error::{TradingError, ValidationError};
use crate::exchange::{self, Exchange};
use crate::models::order::{OrderRequest, OrderResult, TwapOutcome, TwapPlan};
use crate::order_core::gateway::OrderGateway;
use crate::order_core::validator::{validate_limit_order, validate_order, validate_twap, RawOrder, RawTwap};
use crate::utils::logging::AuditLog;

/// 검증을 마친 작업
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Market(OrderRequest),
    Limit(OrderRequest),
    Twap(TwapPlan),
}

impl Job {
    pub fn market(raw: &RawOrder) -> Result<Self, ValidationError> {
        validate_order(&RawOrder { price: None, ..raw.clone() }).map(Job::Market)
    }

    pub fn limit(raw: &RawOrder) -> Result<Self, ValidationError> {
        validate_limit_order(raw).map(Job::Limit)
    }

    pub fn twap(raw: &RawTwap) -> Result<Self, ValidationError> {
        validate_twap(raw).map(Job::Twap)
    }
}

/// 작업 결과. 단일 주문은 `OrderResult`, TWAP 은 `{"twap_results": [...]}` 로 직렬화된다.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum JobOutput {
    Order(OrderResult),
    Twap(TwapOutcome),
}

pub struct Bot {
    gateway: Arc<OrderGateway>,
    scheduler: TwapScheduler,
}

impl Bot {
    /// 설정으로부터 거래소, 감사 로그, 게이트웨이를 한 번에 구성
    pub fn from_config(config: &Config) -> Result<Self, TradingError> {
        let exchange = exchange::from_config(&config.exchange)?;
        let audit = match &config.logging.file_path {
            Some(path) => AuditLog::open(path)?,
            None => AuditLog::disabled(),
        };
        audit.info(&format!(
            "Initialized {} bot ({}, {})",
            exchange.name(),
            config.exchange.venue,
            if config.exchange.dry_run { "dry run".to_string() } else { config.exchange.base_url() }
        ));
        Ok(Self::new(exchange, audit, config))
    }

    pub fn new(exchange: Arc<dyn Exchange>, audit: AuditLog, config: &Config) -> Self {
        let execution = &config.execution;
        let gateway = Arc::new(
            OrderGateway::new(exchange, Arc::new(audit)).with_rounding(execution.round_to_instrument_increments),
        );
        let scheduler = TwapScheduler::new(gateway.clone())
            .with_step_failure_policy(execution.on_step_failure)
            .with_remainder_policy(execution.remainder);

        Bot { gateway, scheduler }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.scheduler = self.scheduler.with_delay(delay);
        self
    }

    pub async fn market(&self, order: &OrderRequest) -> OrderResult {
        self.gateway.submit_market_order(&order.symbol, order.side, order.quantity).await
    }

    pub async fn limit(&self, order: &OrderRequest) -> OrderResult {
        match order.price {
            Some(price) => self.gateway.submit_limit_order(&order.symbol, order.side, order.quantity, price).await,
            None => OrderResult::failed("limit order requires a price"),
        }
    }

    pub async fn twap(&self, plan: &TwapPlan) -> TwapOutcome {
        self.scheduler.run(plan).await
    }

    pub async fn execute(&self, job: &Job) -> JobOutput {
        match job {
            Job::Market(order) => JobOutput::Order(self.market(order).await),
            Job::Limit(order) => JobOutput::Order(self.limit(order).await),
            Job::Twap(plan) => JobOutput::Twap(self.twap(plan).await),
        }
    }
}
