//! 주문 실행 알고리즘의 핵심 구현체

pub mod delay;
pub mod twap;

pub use delay::{Delay, TokioDelay};
pub use twap::{split_quantity, TwapScheduler};
