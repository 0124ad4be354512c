//! 주문 입력 검증
//!
//! 문자열 입력을 검증된 `OrderRequest` / `TwapPlan` 으로 변환한다.
//! 네트워크나 거래소 메타데이터는 사용하지 않는다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ValidationError;
use crate::models::order::{OrderRequest, OrderSide, TwapPlan};

/// 검증 전 주문 입력
#[derive(Debug, Clone, Default)]
pub struct RawOrder {
    pub symbol: String,
    pub side: String,
    pub quantity: String,
    /// 지정가 주문에서만 사용
    pub price: Option<String>,
}

/// 검증 전 TWAP 입력
#[derive(Debug, Clone, Default)]
pub struct RawTwap {
    pub order: RawOrder,
    pub parts: String,
    /// 초 단위
    pub interval: String,
}

/// 양수 decimal 파싱 (일반 표기 및 지수 표기)
pub fn parse_positive_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "value is required"));
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::new(field, format!("not a decimal number: {}", raw)))?;

    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, format!("must be positive, got {}", value)));
    }

    Ok(value)
}

/// 대소문자 무시, BUY / SELL 로 정규화
pub fn parse_side(raw: &str) -> Result<OrderSide, ValidationError> {
    match raw.trim().to_uppercase().as_str() {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        _ => Err(ValidationError::new("side", format!("must be BUY or SELL, got {:?}", raw))),
    }
}

/// 심볼 정규화 (대문자). 선물 인도 계약(`BTCUSDT_250926`)의 `_` 허용
pub fn parse_symbol(raw: &str) -> Result<String, ValidationError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ValidationError::new("symbol", "value is required"));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("symbol", format!("unexpected characters in {:?}", raw)));
    }
    Ok(symbol)
}

pub fn parse_parts(raw: &str) -> Result<u32, ValidationError> {
    let parts = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::new("parts", format!("not a whole number: {}", raw)))?;
    if parts == 0 {
        return Err(ValidationError::new("parts", "must be at least 1"));
    }
    Ok(parts)
}

/// 음수가 아닌 초 단위 간격
pub fn parse_interval(raw: &str) -> Result<Duration, ValidationError> {
    let trimmed = raw.trim();
    let seconds = Decimal::from_str(trimmed)
        .map_err(|_| ValidationError::new("interval", format!("not a number of seconds: {}", raw)))?;
    if seconds < Decimal::ZERO {
        return Err(ValidationError::new("interval", "must not be negative"));
    }
    let millis = seconds
        .checked_mul(Decimal::from(1000))
        .ok_or_else(|| ValidationError::new("interval", "out of range"))?
        .trunc()
        .to_u64()
        .ok_or_else(|| ValidationError::new("interval", "out of range"))?;
    Ok(Duration::from_millis(millis))
}

/// 주문 검증
pub fn validate_order(raw: &RawOrder) -> Result<OrderRequest, ValidationError> {
    let symbol = parse_symbol(&raw.symbol)?;
    let side = parse_side(&raw.side)?;
    let quantity = parse_positive_decimal("quantity", &raw.quantity)?;
    let price = raw
        .price
        .as_deref()
        .map(|p| parse_positive_decimal("price", p))
        .transpose()?;

    Ok(OrderRequest { symbol, side, quantity, price })
}

/// 지정가 주문 검증 (가격 필수)
pub fn validate_limit_order(raw: &RawOrder) -> Result<OrderRequest, ValidationError> {
    if raw.price.is_none() {
        return Err(ValidationError::new("price", "required for limit orders"));
    }
    validate_order(raw)
}

/// TWAP 검증. 가격은 무시된다 (분할 주문은 모두 시장가).
pub fn validate_twap(raw: &RawTwap) -> Result<TwapPlan, ValidationError> {
    let request = validate_order(&RawOrder { price: None, ..raw.order.clone() })?;
    let parts = parse_parts(&raw.parts)?;
    let interval = parse_interval(&raw.interval)?;

    Ok(TwapPlan { request, parts, interval })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn raw(symbol: &str, side: &str, quantity: &str, price: Option<&str>) -> RawOrder {
        RawOrder {
            symbol: symbol.to_string(),
            side: side.to_string(),
            quantity: quantity.to_string(),
            price: price.map(str::to_string),
        }
    }

    #[rstest]
    #[case("buy", OrderSide::Buy)]
    #[case("Buy", OrderSide::Buy)]
    #[case(" BUY ", OrderSide::Buy)]
    #[case("sell", OrderSide::Sell)]
    #[case("SELL", OrderSide::Sell)]
    #[case("sElL", OrderSide::Sell)]
    fn test_side_normalisation(#[case] input: &str, #[case] expected: OrderSide) {
        assert_eq!(parse_side(input).unwrap(), expected);
    }

    #[rstest]
    #[case("long")]
    #[case("")]
    #[case("B")]
    fn test_unknown_side(#[case] input: &str) {
        assert_eq!(parse_side(input).unwrap_err().field, "side");
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("-0.001")]
    #[case("abc")]
    #[case("1.2.3")]
    #[case("")]
    fn test_rejects_bad_quantity(#[case] quantity: &str) {
        let err = validate_order(&raw("BTCUSDT", "BUY", quantity, None)).unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[rstest]
    #[case("0")]
    #[case("-25000")]
    #[case("twenty")]
    fn test_rejects_bad_price(#[case] price: &str) {
        let err = validate_order(&raw("BTCUSDT", "BUY", "0.01", Some(price))).unwrap_err();
        assert_eq!(err.field, "price");
    }

    #[test]
    fn test_valid_order_is_normalised() {
        let order = validate_order(&raw(" ethusdt ", "sell", "0.5", None)).unwrap();
        assert_eq!(order.symbol, "ETHUSDT");
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.quantity, dec!(0.5));
        assert_eq!(order.price, None);
    }

    #[test]
    fn test_scientific_quantity() {
        let order = validate_order(&raw("BTCUSDT", "BUY", "3e-3", None)).unwrap();
        assert_eq!(order.quantity, dec!(0.003));
    }

    #[test]
    fn test_limit_requires_price() {
        let err = validate_limit_order(&raw("BTCUSDT", "BUY", "0.01", None)).unwrap_err();
        assert_eq!(err.field, "price");

        let order = validate_limit_order(&raw("BTCUSDT", "BUY", "0.01", Some("25000"))).unwrap();
        assert_eq!(order.price, Some(dec!(25000)));
        assert_eq!(order.quantity, dec!(0.01));
    }

    #[test]
    fn test_symbol_rules() {
        assert_eq!(parse_symbol("btcusdt").unwrap(), "BTCUSDT");
        assert_eq!(parse_symbol("btcusdt_250926").unwrap(), "BTCUSDT_250926");
        assert_eq!(parse_symbol("  ").unwrap_err().field, "symbol");
        assert_eq!(parse_symbol("BTC/USDT").unwrap_err().field, "symbol");
    }

    #[test]
    fn test_twap_plan() {
        let plan = validate_twap(&RawTwap {
            order: raw("btcusdt", "buy", "0.009", None),
            parts: "3".into(),
            interval: "1.5".into(),
        })
        .unwrap();
        assert_eq!(plan.request.symbol, "BTCUSDT");
        assert_eq!(plan.parts, 3);
        assert_eq!(plan.interval, Duration::from_millis(1500));
        assert_eq!(plan.piece_size(), dec!(0.003));
    }

    #[rstest]
    #[case("0", "5", "parts")]
    #[case("-2", "5", "parts")]
    #[case("two", "5", "parts")]
    #[case("3", "-1", "interval")]
    #[case("3", "soon", "interval")]
    #[case("3", "79228162514264337593543950335", "interval")]
    #[case("3", "18446744073709552", "interval")]
    fn test_twap_rejects(#[case] parts: &str, #[case] interval: &str, #[case] field: &str) {
        let err = validate_twap(&RawTwap {
            order: raw("BTCUSDT", "BUY", "1", None),
            parts: parts.into(),
            interval: interval.into(),
        })
        .unwrap_err();
        assert_eq!(err.field, field);
    }

    #[test]
    fn test_zero_interval_allowed() {
        assert_eq!(parse_interval("0").unwrap(), Duration::ZERO);
    }
}
