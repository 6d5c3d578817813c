//! Numeric and order wire encoding.
//!
//! Prices, sizes and amounts travel as decimal strings with at most 8 fractional
//! digits; some fields carry scaled integers instead. Every conversion here
//! either reproduces the input exactly at wire precision or fails with
//! [`Error::RoundingLoss`]. Nothing is silently truncated.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::{
    Error, Result,
    types::{Order, OrderType, OrderTypeWire, OrderWire},
};

/// Fractional digits allowed in a wire decimal string.
pub const WIRE_DECIMALS: u32 = 8;

/// Scale used for integer-encoded USD amounts.
pub const USD_DECIMALS: u32 = 6;

/// Maximum drift between a float and its 8-digit rendering.
const FLOAT_TOLERANCE: f64 = 1e-12;

/// Maximum drift between a scaled value and the integer it rounds to.
const INT_TOLERANCE: f64 = 1e-3;

/// Encodes a float as a wire decimal string.
///
/// ```
/// # use hypersign::hypercore::wire::float_to_wire;
/// assert_eq!(float_to_wire(1.5).unwrap(), "1.5");
/// assert_eq!(float_to_wire(2.0).unwrap(), "2");
/// assert_eq!(float_to_wire(-0.0).unwrap(), "0");
/// assert!(float_to_wire(2500.123456785).is_err());
/// ```
pub fn float_to_wire(x: f64) -> Result<String> {
    if !x.is_finite() {
        return Err(Error::rounding(x));
    }

    let rounded = format!("{x:.8}");
    let parsed: f64 = rounded.parse().map_err(|_| Error::rounding(x))?;
    if (parsed - x).abs() >= FLOAT_TOLERANCE {
        return Err(Error::rounding(x));
    }

    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        Ok("0".to_owned())
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Encodes a float as an integer scaled by `10^decimals`.
pub fn float_to_int(x: f64, decimals: u32) -> Result<i64> {
    let scaled = x * 10f64.powi(decimals as i32);
    let rounded = scaled.round();
    if !rounded.is_finite() || (rounded - scaled).abs() >= INT_TOLERANCE {
        return Err(Error::rounding(x));
    }
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(Error::rounding(x));
    }
    Ok(rounded as i64)
}

/// [`float_to_int`] at 8 decimals.
pub fn float_to_int_for_hashing(x: f64) -> Result<i64> {
    float_to_int(x, WIRE_DECIMALS)
}

/// [`float_to_int`] at 6 decimals, for USD amounts.
pub fn float_to_usd_int(x: f64) -> Result<i64> {
    float_to_int(x, USD_DECIMALS)
}

/// Encodes a decimal as a wire decimal string.
///
/// Fails if `x` has significant digits past the 8th fractional place.
pub fn decimal_to_wire(x: Decimal) -> Result<String> {
    if x.round_dp(WIRE_DECIMALS) != x {
        return Err(Error::rounding(x));
    }
    // normalize() strips trailing zeros and turns -0 into 0
    Ok(x.normalize().to_string())
}

/// Encodes a decimal as an integer scaled by `10^decimals`.
pub fn decimal_to_int(x: Decimal, decimals: u32) -> Result<i64> {
    let factor = 10i64
        .checked_pow(decimals)
        .ok_or_else(|| Error::rounding(x))?;
    let scaled = x
        .checked_mul(Decimal::from(factor))
        .ok_or_else(|| Error::rounding(x))?;
    let rounded = scaled.round();
    if (rounded - scaled).abs() >= Decimal::new(1, 3) {
        return Err(Error::rounding(x));
    }
    rounded.to_i64().ok_or_else(|| Error::rounding(x))
}

/// [`decimal_to_int`] at 6 decimals, for USD amounts.
pub fn decimal_to_usd_int(x: Decimal) -> Result<i64> {
    decimal_to_int(x, USD_DECIMALS)
}

/// Maps an order type to its wire form.
///
/// A limit side wins over a trigger side when both are present.
pub fn order_type_to_wire(order_type: &OrderType) -> Result<OrderTypeWire> {
    if let Some(limit) = order_type.limit {
        return Ok(OrderTypeWire::Limit { tif: limit.tif });
    }

    match order_type.trigger {
        Some(trigger) => Ok(OrderTypeWire::Trigger {
            is_market: trigger.is_market,
            trigger_px: decimal_to_wire(trigger.trigger_px)?,
            tpsl: trigger.tpsl,
        }),
        None => Err(Error::InvalidOrderType),
    }
}

/// Maps an order to its wire form, given the resolved asset index.
pub fn order_to_wire(order: &Order, asset: u32) -> Result<OrderWire> {
    Ok(OrderWire {
        a: asset,
        b: order.is_buy,
        p: decimal_to_wire(order.limit_px)?,
        s: decimal_to_wire(order.sz)?,
        r: order.reduce_only,
        t: order_type_to_wire(&order.order_type)?,
        c: order.cloid,
    })
}
