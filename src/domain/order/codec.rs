use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Money & Identifier Codec
// ============================================================================
//
// Money arrives as f64 and is stored as NUMERIC. The value is formatted to
// exactly two fraction digits first, so binary float noise never reaches
// storage. Identifiers arrive as strings and are stored as UUIDs.
//
// ============================================================================

/// Fixed-point scale written to storage.
pub const MONEY_SCALE: usize = 2;

/// Total digits of the money columns, `NUMERIC(12, 2)`.
pub const MONEY_PRECISION: u32 = 12;

pub fn encode_money(field: &'static str, value: f64) -> Result<Decimal, OrderError> {
    let formatted = format!("{:.*}", MONEY_SCALE, value);

    let decimal = Decimal::from_str(&formatted).map_err(|_| OrderError::Encoding {
        field,
        value: formatted.clone(),
    })?;

    // Whole part must fit the column, or the insert itself would fail.
    let limit = Decimal::from(10_i64.pow(MONEY_PRECISION - MONEY_SCALE as u32));
    if decimal.abs() >= limit {
        return Err(OrderError::Encoding {
            field,
            value: formatted,
        });
    }

    Ok(decimal)
}

/// Stored precision is kept as-is, even beyond two digits. Parsing the
/// decimal text gives the nearest f64, so `39.98` reads back as `39.98`.
pub fn decode_money(field: &'static str, value: Decimal) -> Result<f64, OrderError> {
    let text = value.to_string();
    f64::from_str(&text).map_err(|_| OrderError::Encoding { field, value: text })
}

pub fn encode_id(field: &'static str, value: &str) -> Result<Uuid, OrderError> {
    Uuid::parse_str(value).map_err(|source| OrderError::InvalidIdentifier {
        field,
        value: value.to_string(),
        source,
    })
}

pub fn decode_id(value: Uuid) -> String {
    value.hyphenated().to_string()
}
