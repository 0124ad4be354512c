//! 테스트넷 주문 라이브러리
//!
//! 시장가, 지정가, TWAP(시간 분할 시장가) 주문을 거래소 테스트넷에 제출합니다.

pub mod bot;
pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod order_core;
pub mod utils;

// 핵심 타입 재노출
pub use crate::bot::{Bot, Job, JobOutput};
pub use crate::config::Config;
pub use crate::error::{TradingError, ValidationError};
pub use crate::exchange::traits::Exchange;
pub use crate::models::order::{OrderRequest, OrderResult, OrderSide, OrderType, TwapOutcome, TwapPlan};

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TradingError>;
