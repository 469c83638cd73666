//! Estimated API cost accounting.
//!
//! Every completed extraction or recommendation call adds
//! `usage_tokens × unit_price` to a running total. Amounts are exact decimals,
//! so the total does not depend on the order in which calls complete.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, FromPrimitive, Zero};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::{Error, Result, TRACING_TARGET_COST};

/// Number of decimal places shown by [`CostAccumulator::total`].
const DISPLAY_SCALE: i64 = 4;

/// Number of decimal places kept when converting a float price.
const PRICE_SCALE: i64 = 12;

/// Kind of billed call, each with its own unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallKind {
    /// Image-based metadata extraction.
    Extraction,
    /// Text-based recommendation.
    Recommendation,
}

/// A non-negative price per token, in dollars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitPrice(BigDecimal);

impl UnitPrice {
    /// Creates a price from an exact decimal.
    pub fn new(value: BigDecimal) -> Result<Self> {
        if value < BigDecimal::zero() {
            return Err(Error::config(format!("unit price cannot be negative: {value}")));
        }
        Ok(Self(value))
    }

    /// Creates a price from a float, keeping twelve decimal places.
    pub fn from_f64(value: f64) -> Result<Self> {
        let decimal = BigDecimal::from_f64(value)
            .ok_or_else(|| Error::config(format!("unit price is not finite: {value}")))?;
        Self::new(decimal.round(PRICE_SCALE).normalized())
    }

    /// Returns the exact decimal value.
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Returns the cost of `tokens` at this price.
    pub fn cost_of(&self, tokens: u32) -> BigDecimal {
        BigDecimal::from(tokens) * &self.0
    }
}

impl FromStr for UnitPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let decimal = BigDecimal::from_str(s.trim())
            .map_err(|e| Error::config(format!("invalid unit price '{s}': {e}")))?;
        Self::new(decimal)
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// The fixed per-token price table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Price per token of an image extraction call.
    pub image: UnitPrice,
    /// Price per token of a text recommendation call.
    pub text: UnitPrice,
}

impl PriceTable {
    /// Default price per token of an image extraction call.
    pub const DEFAULT_IMAGE_PRICE: &'static str = "0.0000075";
    /// Default price per token of a text recommendation call.
    pub const DEFAULT_TEXT_PRICE: &'static str = "0.00001";

    /// Creates a price table.
    pub fn new(image: UnitPrice, text: UnitPrice) -> Self {
        Self { image, text }
    }

    /// Returns the unit price for a call kind.
    pub fn price_for(&self, kind: CallKind) -> &UnitPrice {
        match kind {
            CallKind::Extraction => &self.image,
            CallKind::Recommendation => &self.text,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        // 0.0000075 and 0.00001, matching the string constants above.
        Self {
            image: UnitPrice(BigDecimal::new(75.into(), 7)),
            text: UnitPrice(BigDecimal::new(1.into(), 5)),
        }
    }
}

/// Running, monotonically non-decreasing cost total for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostAccumulator {
    total: BigDecimal,
    calls: u32,
}

impl CostAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `usage_tokens × unit_price` to the total.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUsage`] if `usage_tokens` is negative; the total
    /// is left unchanged.
    pub fn add(&mut self, usage_tokens: i64, unit_price: &UnitPrice) -> Result<()> {
        if usage_tokens < 0 {
            tracing::warn!(
                target: TRACING_TARGET_COST,
                usage_tokens,
                "Rejected negative token usage"
            );
            return Err(Error::InvalidUsage(usage_tokens));
        }

        let amount = BigDecimal::from(usage_tokens) * unit_price.as_decimal();
        self.total += amount;
        self.calls += 1;

        tracing::debug!(
            target: TRACING_TARGET_COST,
            usage_tokens,
            unit_price = %unit_price,
            total = %self.exact_total(),
            "Accounted API usage"
        );

        Ok(())
    }

    /// Accounts one call of `kind` at the table's price.
    pub fn charge(&mut self, kind: CallKind, usage_tokens: u32, prices: &PriceTable) -> Result<()> {
        self.add(i64::from(usage_tokens), prices.price_for(kind))
    }

    /// Returns the total rounded to four decimal places for display.
    pub fn total(&self) -> BigDecimal {
        self.total.round(DISPLAY_SCALE)
    }

    /// Returns the total at full precision.
    pub fn exact_total(&self) -> &BigDecimal {
        &self.total
    }

    /// Returns the number of accounted calls.
    pub fn call_count(&self) -> u32 {
        self.calls
    }

    /// Clears the total.
    pub fn reset(&mut self) {
        self.total = BigDecimal::zero();
        self.calls = 0;
    }
}

impl fmt::Display for CostAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Scaled integer digits, so zero keeps its four decimals.
        let (digits, _) = self
            .total()
            .with_scale(DISPLAY_SCALE)
            .into_bigint_and_exponent();
        let scale = DISPLAY_SCALE as usize;
        let digits = format!("{:0>width$}", digits.to_string(), width = scale + 1);
        let (whole, fraction) = digits.split_at(digits.len() - scale);
        write!(f, "${whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> UnitPrice {
        s.parse().unwrap()
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extraction_then_recommendation_scenario() {
        let mut cost = CostAccumulator::new();
        assert_eq!(cost.total(), decimal("0"));

        cost.add(1200, &price("0.0000075")).unwrap();
        assert_eq!(cost.total(), decimal("0.009"));

        cost.add(50, &price("0.00001")).unwrap();
        assert_eq!(cost.total(), decimal("0.0095"));
        assert_eq!(cost.call_count(), 2);
    }

    #[test]
    fn test_negative_usage_is_rejected() {
        let mut cost = CostAccumulator::new();
        cost.add(100, &price("0.01")).unwrap();

        let err = cost.add(-1, &price("0.01")).unwrap_err();
        assert!(matches!(err, Error::InvalidUsage(-1)));
        assert_eq!(cost.total(), decimal("1"));
        assert_eq!(cost.call_count(), 1);
    }

    #[test]
    fn test_sum_is_order_independent() {
        let calls = [
            (1200, "0.0000075"),
            (50, "0.00001"),
            (333, "0.0000033"),
            (7, "0.125"),
            (0, "0.5"),
        ];

        let mut forward = CostAccumulator::new();
        for (tokens, p) in calls {
            forward.add(tokens, &price(p)).unwrap();
        }

        let mut backward = CostAccumulator::new();
        for (tokens, p) in calls.iter().rev() {
            backward.add(*tokens, &price(p)).unwrap();
        }

        let expected = calls
            .iter()
            .map(|(tokens, p)| BigDecimal::from(*tokens) * decimal(p))
            .fold(BigDecimal::zero(), |acc, x| acc + x);

        assert_eq!(forward.exact_total(), &expected);
        assert_eq!(backward.exact_total(), &expected);
    }

    #[test]
    fn test_total_rounds_for_display_only() {
        let mut cost = CostAccumulator::new();
        cost.add(1, &price("0.00004")).unwrap();
        cost.add(1, &price("0.00004")).unwrap();

        assert_eq!(cost.exact_total(), &decimal("0.00008"));
        assert_eq!(cost.total(), decimal("0.0001"));
        assert_eq!(cost.to_string(), "$0.0001");
    }

    #[test]
    fn test_display_keeps_four_decimals() {
        let mut cost = CostAccumulator::new();
        assert_eq!(cost.to_string(), "$0.0000");

        cost.add(1, &price("0.00004")).unwrap();
        assert_eq!(cost.to_string(), "$0.0000");

        cost.add(1200, &price("0.0000075")).unwrap();
        assert_eq!(cost.to_string(), "$0.0090");

        cost.add(2_000_000, &price("0.00001")).unwrap();
        assert_eq!(cost.to_string(), "$20.0090");
    }

    #[test]
    fn test_price_from_f64_is_exact_enough() {
        let p = UnitPrice::from_f64(0.0000075).unwrap();
        assert_eq!(p.as_decimal(), &decimal("0.0000075"));
        assert!(UnitPrice::from_f64(f64::NAN).is_err());
        assert!(UnitPrice::from_f64(-0.1).is_err());
    }

    #[test]
    fn test_invalid_price_strings() {
        assert!("abc".parse::<UnitPrice>().is_err());
        assert!("-0.001".parse::<UnitPrice>().is_err());
    }

    #[test]
    fn test_default_table_matches_constants() {
        let prices = PriceTable::default();
        assert_eq!(prices.image, price(PriceTable::DEFAULT_IMAGE_PRICE));
        assert_eq!(prices.text, price(PriceTable::DEFAULT_TEXT_PRICE));
    }

    #[test]
    fn test_charge_uses_table() {
        let prices = PriceTable::default();
        let mut cost = CostAccumulator::new();
        cost.charge(CallKind::Extraction, 1200, &prices).unwrap();
        cost.charge(CallKind::Recommendation, 50, &prices).unwrap();
        assert_eq!(cost.total(), decimal("0.0095"));

        cost.reset();
        assert_eq!(cost.total(), decimal("0"));
        assert_eq!(cost.call_count(), 0);
    }
}
