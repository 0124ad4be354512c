//! 주문 검증과 거래소 게이트웨이

pub mod gateway;
pub mod validator;

pub use gateway::OrderGateway;
pub use validator::{validate_limit_order, validate_order, validate_twap, RawOrder, RawTwap};
