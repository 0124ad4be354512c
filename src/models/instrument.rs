use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradingError;

/// Exchange-imposed increments for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentFilters {
    pub symbol: String,
    /// `LOT_SIZE.stepSize`
    pub step_size: Decimal,
    /// `PRICE_FILTER.tickSize`
    pub tick_size: Decimal,
}

impl InstrumentFilters {
    pub fn new(symbol: impl Into<String>, step_size: Decimal, tick_size: Decimal) -> Self {
        InstrumentFilters { symbol: symbol.into(), step_size, tick_size }
    }

    /// No increments known, rounding leaves values untouched.
    pub fn unrestricted(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Decimal::ZERO, Decimal::ZERO)
    }

    /// Round a quantity down to the lot step
    pub fn round_quantity(&self, quantity: Decimal) -> Result<Decimal, TradingError> {
        floor_to_increment(quantity, self.step_size)
            .ok_or_else(|| TradingError::InstrumentFilter(format!("quantity {} cannot be rounded to step {}", quantity, self.step_size)))
    }

    /// Round a price down to the tick
    pub fn round_price(&self, price: Decimal) -> Result<Decimal, TradingError> {
        floor_to_increment(price, self.tick_size)
            .ok_or_else(|| TradingError::InstrumentFilter(format!("price {} cannot be rounded to tick {}", price, self.tick_size)))
    }
}

/// `None` on decimal overflow
fn floor_to_increment(value: Decimal, increment: Decimal) -> Option<Decimal> {
    if increment <= Decimal::ZERO {
        return Some(value);
    }
    let steps = value.checked_div(increment)?.floor();
    Some(steps.checked_mul(increment)?.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_quantity_price() {
        let filters = InstrumentFilters::new("BTCUSDT", dec!(0.001), dec!(0.10));
        assert_eq!(filters.round_quantity(dec!(1.23456)).unwrap(), dec!(1.234));
        assert_eq!(filters.round_quantity(dec!(0.0033333)).unwrap(), dec!(0.003));
        assert_eq!(filters.round_price(dec!(50123.45)).unwrap(), dec!(50123.4));

        let coarse = InstrumentFilters::new("BTCUSDT", dec!(0.01), dec!(10));
        assert_eq!(coarse.round_price(dec!(50123.45)).unwrap(), dec!(50120));
        assert_eq!(coarse.round_quantity(dec!(0.009)).unwrap(), dec!(0));
    }

    #[test]
    fn test_zero_increment_is_noop() {
        let filters = InstrumentFilters::unrestricted("ETHUSDT");
        assert_eq!(filters.round_quantity(dec!(0.0033333)).unwrap(), dec!(0.0033333));
        assert_eq!(filters.round_price(dec!(25000.123)).unwrap(), dec!(25000.123));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let filters = InstrumentFilters::new("BTCUSDT", dec!(0.001), dec!(0.1));
        match filters.round_quantity(Decimal::MAX) {
            Err(TradingError::InstrumentFilter(msg)) => assert!(msg.contains("step 0.001")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(filters.round_price(Decimal::MAX).is_err());
    }
}
