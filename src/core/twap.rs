/**
* filename : twap
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use rust_decimal::Decimal;

use crate::config::{RemainderPolicy, StepFailurePolicy};
use crate::core::delay::{Delay, TokioDelay};
use crate::models::order::{TwapOutcome, TwapPlan};
use crate::order_core::gateway::OrderGateway;

/// 분할 수량 계산
///
/// `RemainderPolicy::None` 은 단순 나눗셈이라 합계가 총 수량과 다를 수 있다
/// (예: 0.01 / 3 * 3 = 0.0099...9). `LastPiece` 는 마지막 조각에 차이를 더한다.
/// 조각은 순회할 때 하나씩 계산된다.
pub fn split_quantity(total: Decimal, parts: u32, remainder: RemainderPolicy) -> Slices {
  let piece = if parts == 0 { Decimal::ZERO } else { total / Decimal::from(parts) };
  Slices::new(total, piece, parts, remainder)
}

/// 조각 수량 반복자
#[derive(Debug, Clone)]
pub struct Slices {
  piece: Decimal,
  last: Decimal,
  parts: u32,
  next: u32,
}

impl Slices {
  /// `piece` 를 `parts` 번 내되, `LastPiece` 면 마지막은 `total - piece * (parts - 1)`
  fn new(total: Decimal, piece: Decimal, parts: u32, remainder: RemainderPolicy) -> Self {
    let last = match remainder {
      RemainderPolicy::None => piece,
      RemainderPolicy::LastPiece => piece
        .checked_mul(Decimal::from(parts.saturating_sub(1)))
        .and_then(|head| total.checked_sub(head))
        .filter(|last| *last > Decimal::ZERO)
        .unwrap_or(piece),
    };
    Slices { piece, last, parts, next: 0 }
  }
}

impl Iterator for Slices {
  type Item = Decimal;

  fn next(&mut self) -> Option<Decimal> {
    if self.next >= self.parts {
      return None;
    }
    self.next += 1;
    Some(if self.next == self.parts { self.last } else { self.piece })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let left = (self.parts - self.next) as usize;
    (left, Some(left))
  }
}

/// TWAP 기반 시장가 분할 실행기
///
/// 조각을 하나씩 순서대로 제출하고, 마지막 조각 뒤를 제외하고 `interval` 만큼 대기한다.
/// 재시도와 취소는 없다.
pub struct TwapScheduler {
  /// 주문 게이트웨이
  gateway: Arc<OrderGateway>,
  /// 조각 사이 대기
  delay: Arc<dyn Delay>,
  /// 실패한 조각 이후 동작
  on_step_failure: StepFailurePolicy,
  /// 나머지 처리
  remainder: RemainderPolicy,
}

impl TwapScheduler {
  /// 새 TWAP 실행기 생성 (tokio sleep, 실패 후 계속, 나머지 재분배 없음)
  pub fn new(gateway: Arc<OrderGateway>) -> Self {
    TwapScheduler {
      gateway,
      delay: Arc::new(TokioDelay),
      on_step_failure: StepFailurePolicy::Continue,
      remainder: RemainderPolicy::None,
    }
  }

  pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
    self.delay = delay;
    self
  }

  pub fn with_step_failure_policy(mut self, policy: StepFailurePolicy) -> Self {
    self.on_step_failure = policy;
    self
  }

  pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
    self.remainder = policy;
    self
  }

  /// TWAP 실행. 모든 조각을 시도한 뒤 (또는 `Abort` 정책에서 첫 실패 시) 반환한다.
  pub async fn run(&self, plan: &TwapPlan) -> TwapOutcome {
    let request = &plan.request;
    let mut piece = request.quantity / Decimal::from(plan.parts.max(1));
    if self.remainder == RemainderPolicy::LastPiece {
      // 마지막 조각이 거래소 단위로 정렬된 조각들의 나머지를 받도록
      piece = self.gateway.align_quantity(&request.symbol, piece).await;
    }
    let pieces = Slices::new(request.quantity, piece, plan.parts, self.remainder);
    let mut outcome = TwapOutcome::default();

    log::info!(
      "TWAP 시작: {} {} {} ({}개 분할, 간격 {:?})",
      request.side, request.quantity, request.symbol, plan.parts, plan.interval
    );

    let last = plan.parts.saturating_sub(1) as usize;
    for (i, piece) in pieces.enumerate() {
      let result = self.gateway.submit_market_order(&request.symbol, request.side, piece).await;
      let failed = result.is_failed();
      if failed {
        log::warn!("TWAP step {}/{} failed: {}", i + 1, plan.parts, result.error().unwrap_or_default());
      } else {
        log::info!("TWAP step {}/{} placed: {} {}", i + 1, plan.parts, piece, request.symbol);
      }
      outcome.twap_results.push(result);

      if failed && self.on_step_failure == StepFailurePolicy::Abort {
        log::warn!("TWAP 중단: {}/{} 단계에서 실패", i + 1, plan.parts);
        break;
      }

      if i < last {
        self.delay.wait(plan.interval).await;
      }
    }

    log::info!(
      "TWAP 종료: {} - 시도 {} / 실패 {}",
      request.symbol, outcome.len(), outcome.failures()
    );
    outcome
  }
}
