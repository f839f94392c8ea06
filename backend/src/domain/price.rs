//! Fixed-point recipe price.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::Sign;
use serde::{Serialize, Serializer};

/// Digits allowed after the decimal point.
pub const PRICE_SCALE: i64 = 2;
/// Total significant digits allowed, counted at [`PRICE_SCALE`].
pub const PRICE_MAX_DIGITS: u64 = 5;

const MAX_INTEGER_DIGITS: i64 = PRICE_MAX_DIGITS as i64 - PRICE_SCALE;

/// Validation failures for [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a decimal number")]
    NotANumber,
    #[error("price must not be negative")]
    Negative,
    #[error("price must have at most 2 decimal places")]
    TooPrecise,
    #[error("price must have at most 5 digits")]
    TooLarge,
}

impl PriceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotANumber => "invalid_price",
            Self::Negative => "negative_price",
            Self::TooPrecise => "price_too_precise",
            Self::TooLarge => "price_too_large",
        }
    }
}

/// Non-negative price with two decimal places, at most `999.99`.
///
/// Always rendered with exactly two fractional digits.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Price;
///
/// let price: Price = "5.5".parse().unwrap();
/// assert_eq!(price.to_string(), "5.50");
/// assert!("1000".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price(BigDecimal);

impl Price {
    /// Bounds are checked on the digits and exponent as parsed. Rescaling
    /// happens only once both are known to be small, so an input such as
    /// `1e30000000` is rejected without being expanded.
    pub fn new(value: BigDecimal) -> Result<Self, PriceError> {
        if value.sign() == Sign::Minus {
            return Err(PriceError::Negative);
        }
        // Trailing zeros do not count against precision: `4.500` is `4.5`.
        let value = value.normalized();
        let fractional = value.fractional_digit_count();
        if fractional > PRICE_SCALE {
            return Err(PriceError::TooPrecise);
        }
        let digits = i64::try_from(value.digits()).unwrap_or(i64::MAX);
        if digits.saturating_sub(fractional) > MAX_INTEGER_DIGITS {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(value.with_scale(PRICE_SCALE)))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_decimal(self) -> BigDecimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigDecimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.with_scale(PRICE_SCALE))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
