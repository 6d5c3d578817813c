//! # hypersign
//!
//! Action signing and wire encoding for Hyperliquid.
//!
//! Every request to the HyperCore `/exchange` endpoint carries an action, a nonce
//! and a signature over a canonical encoding of the action. This crate produces
//! all three, byte for byte what the venue verifies:
//!
//! - Numeric wire encoding of prices, sizes and USD amounts with loss detection
//! - Order and action construction in protocol key order
//! - Msgpack action hashing for L1 actions (orders, cancels, leverage, ...)
//! - EIP-712 typed data for phantom-agent and user-signed actions
//! - Signature normalization across signer conventions
//!
//! Sending the request is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use hypersign::hypercore::{
//!     Chain, PrivateKeySigner, SignerAdapter, sign_action, timestamp_nonce,
//!     types::UsdSend,
//! };
//! use rust_decimal::dec;
//!
//! # fn main() -> Result<(), hypersign::hypercore::Error> {
//! let signer = PrivateKeySigner::random();
//! let nonce = timestamp_nonce();
//!
//! let action = UsdSend {
//!     destination: hypersign::Address::ZERO,
//!     amount: dec!(10),
//!     time: nonce,
//! }
//! .into_action(Chain::Testnet)?;
//!
//! let request = sign_action(
//!     SignerAdapter::ClientStyle(&signer),
//!     action,
//!     nonce,
//!     None,
//!     Chain::Testnet,
//! )?;
//! let body = serde_json::to_string(&request).unwrap();
//! # let _ = body;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`hypercore`]: encoding, hashing and signing of HyperCore actions

pub mod hypercore;

/// Re-exported Ethereum primitives from Alloy.
pub use alloy::primitives::{Address, B128, B256, U256, address};
/// Re-exported decimal type from rust_decimal.
///
/// Used for exact prices, sizes and amounts.
pub use rust_decimal::Decimal;
