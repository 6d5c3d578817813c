//! HyperCore action signing.
//!
//! The pipeline runs leaf-first:
//!
//! 1. [`wire`] encodes prices, sizes and orders into their compact wire form.
//! 2. [`builder::ActionBuilder`] and the request types in [`types`] assemble an
//!    [`Action`].
//! 3. L1 actions are hashed with [`Action::hash`] (msgpack + nonce + vault flag).
//! 4. [`typed_data::build_typed_data`] wraps the action in EIP-712 typed data,
//!    either as a phantom agent or as a user-signed transaction.
//! 5. [`signing::SignerAdapter`] signs it and normalizes the result into a
//!    [`Signature`].
//!
//! The resulting [`ActionRequest`] is what gets posted to `/exchange`.

use std::{fmt, str::FromStr};

use alloy::primitives::B128;
use serde::{Deserialize, Serialize};

pub mod builder;
mod error;
pub mod signing;
pub mod typed_data;
pub mod types;
mod utils;
pub mod wire;

pub use alloy::signers::local::PrivateKeySigner;
pub use builder::{ActionBuilder, AssetResolver};
pub use error::{Error, Result};
pub use signing::{
    ClientStyleSigner, DirectSigner, SignerAdapter, SignerCapabilities, sign_action,
    split_signature,
};
pub use typed_data::{SigningMode, TypedData, build_typed_data};
pub use types::{Action, ActionRequest, Signature};

/// Chain id of the phantom-agent EIP-712 domain.
pub const PHANTOM_AGENT_CHAIN_ID: u64 = 1337;

/// `signatureChainId` stamped on user-signed actions for mainnet (Arbitrum One).
pub const ARBITRUM_MAINNET_CHAIN_ID: &str = "0xa4b1";

/// `signatureChainId` stamped on user-signed actions for testnet (Arbitrum Sepolia).
pub const ARBITRUM_TESTNET_CHAIN_ID: &str = "0x66eee";

/// Client order id.
pub type Cloid = B128;

/// Reference to an order, either by exchange id or client id.
pub type OidOrCloid = either::Either<u64, Cloid>;

/// The HyperCore network an action is signed for.
///
/// Passed explicitly to every call that depends on it; there's no process-wide
/// default.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Chain {
    Mainnet,
    Testnet,
}

impl Chain {
    /// Phantom agent `source` marker.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Chain::Mainnet => "a",
            Chain::Testnet => "b",
        }
    }

    /// `signatureChainId` for user-signed actions.
    #[must_use]
    pub fn arbitrum_id(&self) -> &'static str {
        match self {
            Chain::Mainnet => ARBITRUM_MAINNET_CHAIN_ID,
            Chain::Testnet => ARBITRUM_TESTNET_CHAIN_ID,
        }
    }
}

impl FromStr for Chain {
    type Err = ParseChainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mainnet") {
            Ok(Chain::Mainnet)
        } else if s.eq_ignore_ascii_case("testnet") {
            Ok(Chain::Testnet)
        } else {
            Err(ParseChainError(s.to_owned()))
        }
    }
}

/// Error parsing a [`Chain`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChainError(String);

impl fmt::Display for ParseChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chain {:?}, expected mainnet or testnet", self.0)
    }
}

impl std::error::Error for ParseChainError {}

/// Current wall-clock time in milliseconds, for use as an action nonce.
///
/// Two calls within the same millisecond return the same value. Whether the venue
/// rejects or deduplicates such nonces is its business; nothing here guards it.
#[must_use]
pub fn timestamp_nonce() -> u64 {
    unix_millis(chrono::Utc::now())
}

/// Milliseconds since the Unix epoch, clamped to 0 for earlier times.
pub(crate) fn unix_millis(time: chrono::DateTime<chrono::Utc>) -> u64 {
    u64::try_from(time.timestamp_millis()).unwrap_or(0)
}
