use async_trait::async_trait;
use std::time::Duration;

/// 분할 주문 사이의 대기
///
/// 기본 구현은 `tokio::time::sleep` 이라 대기 중에도 런타임의 다른 작업이 진행된다.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return;
        }
        tokio::time::sleep(duration).await;
    }
}
