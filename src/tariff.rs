//! Tariff adjustment arithmetic.
//!
//! Tariffs are currency amounts with cents: every computed value is rounded
//! to two decimal places, midpoint away from zero.

use rust_decimal::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TARIFF_SCALE: u32 = 2;

pub const INVALID_MODE_MESSAGE: &str = "Modo inválido. Usa: percentage | fixed | overwrite";
pub const MISSING_VALUE_MESSAGE: &str = "El valor es obligatorio";
pub const NON_NUMERIC_VALUE_MESSAGE: &str = "El valor debe ser numérico";
pub const OUT_OF_RANGE_MESSAGE: &str =
    "La tarifa debe estar entre -999999999999.99 y 999999999999.99";

/// Largest magnitude a `NUMERIC(14, 2)` tariff column holds
pub const TARIFF_MAX: Decimal = dec!(999999999999.99);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TariffError {
    #[error("{0}")]
    InvalidMode(String),
    #[error("{0}")]
    InvalidValue(String),
}

/// How the new tariff is derived from the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentMode {
    Percentage, // current * (1 + operand / 100)
    Fixed,      // current + operand
    Overwrite,  // operand
}

impl AdjustmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentMode::Percentage => "percentage",
            AdjustmentMode::Fixed => "fixed",
            AdjustmentMode::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for AdjustmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only the three lowercase literals are accepted
impl FromStr for AdjustmentMode {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(AdjustmentMode::Percentage),
            "fixed" => Ok(AdjustmentMode::Fixed),
            "overwrite" => Ok(AdjustmentMode::Overwrite),
            _ => Err(TariffError::InvalidMode(INVALID_MODE_MESSAGE.to_string())),
        }
    }
}

/// Parses an optional mode query parameter
pub fn parse_mode(raw: Option<&str>) -> Result<AdjustmentMode, TariffError> {
    match raw {
        Some(mode) => mode.parse(),
        None => Err(TariffError::InvalidMode(INVALID_MODE_MESSAGE.to_string())),
    }
}

/// Parses an optional operand query parameter into an exact decimal.
///
/// Accepts plain and scientific notation (`10`, `-2.5`, `1e2`). Missing or
/// blank input, non-numeric text (including radix literals such as `0x10`),
/// `NaN`/`inf`, and magnitudes outside the decimal range are all rejected.
pub fn parse_operand(raw: Option<&str>) -> Result<Decimal, TariffError> {
    let trimmed = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(TariffError::InvalidValue(MISSING_VALUE_MESSAGE.to_string())),
    };

    let non_numeric = || TariffError::InvalidValue(NON_NUMERIC_VALUE_MESSAGE.to_string());

    let as_float: f64 = trimmed.parse().map_err(|_| non_numeric())?;
    if !as_float.is_finite() {
        return Err(non_numeric());
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .or_else(|_| Decimal::try_from(as_float))
        .map_err(|_| non_numeric())
}

/// Computes the adjusted tariff. An absent current tariff counts as zero.
pub fn adjust(
    current: Option<Decimal>,
    mode: AdjustmentMode,
    operand: Decimal,
) -> Result<Decimal, TariffError> {
    let current = current.unwrap_or(Decimal::ZERO);

    let new_value = match mode {
        AdjustmentMode::Percentage => Decimal::ONE_HUNDRED
            .checked_add(operand)
            .and_then(|factor| current.checked_mul(factor))
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED)),
        AdjustmentMode::Fixed => current.checked_add(operand),
        AdjustmentMode::Overwrite => Some(operand),
    }
    .ok_or_else(|| TariffError::InvalidValue(NON_NUMERIC_VALUE_MESSAGE.to_string()))?;

    check_tariff(new_value)
}

/// Rounds to cents and rejects anything the tariff column cannot store
pub fn check_tariff(value: Decimal) -> Result<Decimal, TariffError> {
    let rounded = round_tariff(value);
    if rounded.abs() > TARIFF_MAX {
        return Err(TariffError::InvalidValue(OUT_OF_RANGE_MESSAGE.to_string()));
    }
    Ok(rounded)
}

pub fn round_tariff(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(TARIFF_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(TARIFF_SCALE);
    rounded
}
