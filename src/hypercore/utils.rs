//! Serde helpers for the canonical action encoding.
//!
//! Addresses and cloids are hashed as lowercase `0x` strings. Their default serde
//! impls emit raw bytes for binary formats such as msgpack, which would change the
//! action hash, so every action field holding one goes through these helpers.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Deserializer, Serializer, de};

use super::{Cloid, OidOrCloid};

pub(super) fn serialize_address<S>(address: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&address_to_lowercase(address))
}

/// `null` when absent, lowercase hex otherwise.
pub(super) fn serialize_maybe_address<S>(address: &Option<Address>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match address {
        Some(address) => serialize_address(address, s),
        None => s.serialize_none(),
    }
}

pub(super) fn serialize_cloid<S>(cloid: &Cloid, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&const_hex::encode_prefixed(cloid))
}

/// Only called when the cloid is present; `None` is skipped by the field attribute.
pub(super) fn serialize_maybe_cloid<S>(cloid: &Option<Cloid>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match cloid {
        Some(cloid) => serialize_cloid(cloid, s),
        None => s.serialize_none(),
    }
}

pub(super) fn deserialize_maybe_cloid<'de, D>(d: D) -> Result<Option<Cloid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(d)?;
    s.map(|s| Cloid::from_str(&s).map_err(de::Error::custom))
        .transpose()
}

pub(super) fn serialize_oid_or_cloid<S>(oid: &OidOrCloid, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match oid {
        either::Either::Left(oid) => s.serialize_u64(*oid),
        either::Either::Right(cloid) => serialize_cloid(cloid, s),
    }
}

pub(super) fn serialize_as_hex<S>(value: &U256, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format!("0x{value:064x}"))
}

pub(super) fn deserialize_from_hex<'de, D>(d: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    U256::from_str_radix(s.strip_prefix("0x").unwrap_or(&s), 16).map_err(de::Error::custom)
}

/// Lowercase `0x`-prefixed address string.
pub(super) fn address_to_lowercase(address: &Address) -> String {
    const_hex::encode_prefixed(address)
}
