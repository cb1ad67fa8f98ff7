//! Numeric cell coercion.
//!
//! An absent or blank cell is zero. Anything else must parse cleanly; callers
//! decide whether a failure rejects the row or degrades to zero.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("not a number")]
    NotANumber,
    #[error("not a finite number")]
    NotFinite,
    #[error("negative value")]
    Negative,
    #[error("not a whole number")]
    NotAnInteger,
    #[error("value too large")]
    OutOfRange,
}

fn parse_number(text: &str) -> Result<f64, CoerceError> {
    let value: f64 = text.parse().map_err(|_| CoerceError::NotANumber)?;
    if !value.is_finite() {
        return Err(CoerceError::NotFinite);
    }
    if value < 0.0 {
        return Err(CoerceError::Negative);
    }
    Ok(value)
}

/// Parse a price cell.
pub fn parse_price(cell: Option<&str>) -> Result<f64, CoerceError> {
    match cell.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(0.0),
        Some(text) => parse_number(text),
    }
}

/// Parse a stock quantity cell. `"12"` and `"12.0"` are both 12.
pub fn parse_quantity(cell: Option<&str>) -> Result<u32, CoerceError> {
    let text = match cell.map(str::trim).filter(|s| !s.is_empty()) {
        None => return Ok(0),
        Some(text) => text,
    };
    if let Ok(n) = text.parse::<u64>() {
        return u32::try_from(n).map_err(|_| CoerceError::OutOfRange);
    }
    let value = parse_number(text)?;
    if value.fract() != 0.0 {
        return Err(CoerceError::NotAnInteger);
    }
    if value > f64::from(u32::MAX) {
        return Err(CoerceError::OutOfRange);
    }
    Ok(value as u32)
}
