//! Registration pricing.
//!
//! Prices are keyed off the purchasable label's UTF-8 *byte* length, not its
//! character count: one emoji or CJK glyph is 3-4 bytes and prices like a
//! three-letter ASCII label. A label containing any non-ASCII byte costs
//! double its tier.

use crate::hbar::{Hbar, TINYBARS_PER_HBAR};
use crate::name::parse_name;
use crate::{Error, Result};
use core::fmt;

/// Decimal places of HBAR a converted price is rounded up to.
pub const HBAR_PRICE_DECIMALS: u32 = 4;

/// Fixed-point scale applied to the exchange rate before dividing.
const RATE_SCALE: f64 = 1e9;

/// Registration price in whole US dollars, per year.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum UsdPrice {
    /// Finite price.
    Dollars(u64),
    /// Not for sale (empty label).
    Unregistrable,
}

impl UsdPrice {
    /// Dollar amount, `None` when unregistrable.
    pub fn dollars(self) -> Option<u64> {
        match self {
            UsdPrice::Dollars(d) => Some(d),
            UsdPrice::Unregistrable => None,
        }
    }

    /// As a float; unregistrable is positive infinity.
    pub fn as_f64(self) -> f64 {
        match self {
            UsdPrice::Dollars(d) => d as f64,
            UsdPrice::Unregistrable => f64::INFINITY,
        }
    }
}

impl fmt::Display for UsdPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsdPrice::Dollars(d) => write!(f, "${d}"),
            UsdPrice::Unregistrable => f.write_str("$∞"),
        }
    }
}

/// Yearly registration price of `name` in USD.
///
/// Accepts a bare label (`foo`) or a full name (`foo.hh`); full names are
/// reduced to their second-level label first.
///
/// # Errors
///
/// [`Error::InvalidNameFormat`] when a dotted name is not `label.tld`.
pub fn register_price_usd(name: &str) -> Result<UsdPrice> {
    let parsed;
    let label = if name.contains('.') {
        parsed = parse_name(name)?;
        parsed.second_level_domain.as_str()
    } else {
        name
    };

    let tier = match label.len() {
        0 => return Ok(UsdPrice::Unregistrable),
        1 => 500,
        2 => 50,
        _ => 5,
    };

    let price = if label.is_ascii() { tier } else { tier * 2 };
    Ok(UsdPrice::Dollars(price))
}

/// Convert a USD price to HBAR at `usd_per_hbar`, rounding up to
/// [`HBAR_PRICE_DECIMALS`] places.
///
/// The rate is fixed to nine decimal places before an exact integer division,
/// so the result does not depend on float rounding of the quotient.
///
/// # Errors
///
/// * [`Error::Unregistrable`] for unregistrable prices (`name` is only used
///   for the message).
/// * [`Error::InvalidExchangeRate`] for non-finite, zero or negative rates.
pub fn register_price_hbar(name: &str, price: UsdPrice, usd_per_hbar: f64) -> Result<Hbar> {
    let dollars = price
        .dollars()
        .ok_or_else(|| Error::Unregistrable(name.to_string()))?;

    let scaled_rate = (usd_per_hbar * RATE_SCALE).round();
    if !scaled_rate.is_finite() || scaled_rate < 1.0 {
        return Err(Error::InvalidExchangeRate(usd_per_hbar));
    }
    let scaled_rate = scaled_rate as u128;

    let units_per_hbar = 10u128.pow(HBAR_PRICE_DECIMALS);
    let numerator = u128::from(dollars) * units_per_hbar * RATE_SCALE as u128;
    let units = numerator.div_ceil(scaled_rate);

    let tinybars_per_unit = TINYBARS_PER_HBAR as u128 / units_per_hbar;
    let tinybars = i64::try_from(units * tinybars_per_unit)
        .map_err(|_| Error::InvalidExchangeRate(usd_per_hbar))?;

    Ok(Hbar::from_tinybars(tinybars))
}
