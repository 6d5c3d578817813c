//! HyperCore type definitions for action signing.
//!
//! # Logical types
//! - [`Order`], [`OrderType`]: an order as the caller describes it, by coin symbol
//! - [`CancelRequest`], [`CancelByCloidRequest`], [`ModifyRequest`]: order references
//! - [`UsdSend`], [`SpotSend`], [`Withdraw`], [`UsdClassTransfer`], [`ApproveAgent`],
//!   [`ApproveBuilderFee`]: user-signed requests, stamped with a [`Chain`] by `into_action`
//!
//! # Wire types
//! The [`api`] module holds the exact structures that get hashed and posted, in
//! protocol key order.

use std::{fmt, str::FromStr};

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Chain, Cloid, OidOrCloid, Result, wire};

pub mod api;
pub(super) mod solidity;

pub use api::{
    Action, ActionRequest, ApproveAgentAction, ApproveBuilderFeeAction, BatchCancel,
    BatchCancelCloid, BatchModify, BatchOrder, BuilderWire, CancelByCloidWire, CancelWire,
    Modify, OrderTypeWire, OrderWire, ScheduleCancel, SetReferrer, SpotSendAction,
    UpdateIsolatedMargin, UpdateLeverage, UsdClassTransferAction, UsdSendAction, VaultTransfer,
    WithdrawAction,
};

/// Time in force of a limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Add liquidity only.
    Alo,
    /// Immediate or cancel.
    Ioc,
    /// Good til canceled.
    Gtc,
}

/// Trigger type.
///
/// Indicates whether the trigger is a take‑profit (`Tp`) or stop‑loss (`Sl`).
#[derive(PartialEq, Eq, Deserialize, Serialize, Copy, Clone, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TpSl {
    Tp,
    Sl,
}

/// Limit order parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderType {
    pub tif: TimeInForce,
}

/// Trigger order parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOrderType {
    pub is_market: bool,
    pub trigger_px: Decimal,
    pub tpsl: TpSl,
}

/// Order type as supplied by the caller.
///
/// Mirrors the request shape `{limit?: {...}, trigger?: {...}}`. Exactly one side
/// is expected; [`wire::order_type_to_wire`] rejects a value with neither and
/// prefers `limit` when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitOrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerOrderType>,
}

impl OrderType {
    /// A limit order with the given time in force.
    #[must_use]
    pub fn limit(tif: TimeInForce) -> Self {
        Self {
            limit: Some(LimitOrderType { tif }),
            trigger: None,
        }
    }

    /// A trigger order.
    #[must_use]
    pub fn trigger(is_market: bool, trigger_px: Decimal, tpsl: TpSl) -> Self {
        Self {
            limit: None,
            trigger: Some(TriggerOrderType {
                is_market,
                trigger_px,
                tpsl,
            }),
        }
    }
}

/// An order referencing its market by coin symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Coin symbol, resolved to an asset index when the action is built.
    pub coin: String,
    pub is_buy: bool,
    pub sz: Decimal,
    pub limit_px: Decimal,
    pub order_type: OrderType,
    pub reduce_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

/// Grouping of the orders in a batch.
///
/// - `Na` – No special grouping; orders are independent.
/// - `NormalTpsl` – Link a main order with its take-profit/stop-loss orders.
/// - `PositionTpsl` – Attach TP/SL orders to an existing position.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum OrderGrouping {
    #[default]
    Na,
    NormalTpsl,
    PositionTpsl,
}

/// Builder fee attached to an order batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderInfo {
    pub address: Address,
    /// Fee in tenths of a basis point.
    pub fee: u64,
}

/// Cancel an order by exchange id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    pub coin: String,
    pub oid: u64,
}

/// Cancel an order by client id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelByCloidRequest {
    pub coin: String,
    pub cloid: Cloid,
}

/// Replace an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub oid: OidOrCloid,
    pub order: Order,
}

/// Send USDC from the perp balance to another address.
///
/// <https://hyperliquid.gitbook.io/hyperliquid-docs/for-developers/api/exchange-endpoint#core-usdc-transfer>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsdSend {
    pub destination: Address,
    pub amount: Decimal,
    /// Current time, must match the request nonce.
    pub time: u64,
}

impl UsdSend {
    /// Stamps the chain and produces the signable action.
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::UsdSend(UsdSendAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            destination: self.destination,
            amount: wire::decimal_to_wire(self.amount)?,
            time: self.time,
        }))
    }
}

/// Send spot tokens to another address.
///
/// <https://hyperliquid.gitbook.io/hyperliquid-docs/for-developers/api/exchange-endpoint#core-spot-transfer>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotSend {
    pub destination: Address,
    /// Token in `NAME:0xTOKENID` form.
    pub token: String,
    pub amount: Decimal,
    pub time: u64,
}

impl SpotSend {
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::SpotSend(SpotSendAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            destination: self.destination,
            token: self.token,
            amount: wire::decimal_to_wire(self.amount)?,
            time: self.time,
        }))
    }
}

/// Withdraw USDC through the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdraw {
    pub destination: Address,
    pub amount: Decimal,
    pub time: u64,
}

impl Withdraw {
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::Withdraw3(WithdrawAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            destination: self.destination,
            amount: wire::decimal_to_wire(self.amount)?,
            time: self.time,
        }))
    }
}

/// Move USDC between the perp and spot balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsdClassTransfer {
    pub amount: Decimal,
    pub to_perp: bool,
    pub nonce: u64,
}

impl UsdClassTransfer {
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::UsdClassTransfer(UsdClassTransferAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            amount: wire::decimal_to_wire(self.amount)?,
            to_perp: self.to_perp,
            nonce: self.nonce,
        }))
    }
}

/// Authorize an agent key to trade for the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveAgent {
    pub agent_address: Address,
    /// `None` approves an unnamed agent.
    pub agent_name: Option<String>,
    pub nonce: u64,
}

impl ApproveAgent {
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::ApproveAgent(ApproveAgentAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            agent_address: self.agent_address,
            agent_name: self.agent_name,
            nonce: self.nonce,
        }))
    }
}

/// Allow a builder to charge up to `max_fee_rate` on the account's orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveBuilderFee {
    pub builder: Address,
    /// Percentage string, e.g. `"0.001%"`.
    pub max_fee_rate: String,
    pub nonce: u64,
}

impl ApproveBuilderFee {
    pub fn into_action(self, chain: Chain) -> Result<Action> {
        Ok(Action::ApproveBuilderFee(ApproveBuilderFeeAction {
            signature_chain_id: chain.arbitrum_id().to_owned(),
            hyperliquid_chain: chain,
            max_fee_rate: self.max_fee_rate,
            builder: self.builder,
            nonce: self.nonce,
        }))
    }
}

/// Signature.
///
/// Represents an EIP‑712 signature split into its components.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(
        serialize_with = "super::utils::serialize_as_hex",
        deserialize_with = "super::utils::deserialize_from_hex"
    )]
    pub r: U256,
    #[serde(
        serialize_with = "super::utils::serialize_as_hex",
        deserialize_with = "super::utils::deserialize_from_hex"
    )]
    pub s: U256,
    /// 27 or 28.
    pub v: u64,
}

impl fmt::Display for Signature {
    /// Formats the signature as `0x{r}{s}{v}`, 65 bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:064x}{:064x}{:02x}", self.r, self.s, self.v)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &format!("0x{:x}", self.r))
            .field("s", &format!("0x{:x}", self.s))
            .field("v", &self.v)
            .finish()
    }
}

impl FromStr for Signature {
    type Err = super::Error;

    /// Parses a 65-byte hex signature, with or without `0x`.
    fn from_str(s: &str) -> Result<Self> {
        super::signing::split_signature(s)
    }
}

impl From<Signature> for alloy::signers::Signature {
    fn from(sig: Signature) -> Self {
        Self::new(sig.r, sig.s, sig.v == 28)
    }
}

impl From<alloy::signers::Signature> for Signature {
    fn from(signature: alloy::signers::Signature) -> Self {
        Self {
            r: signature.r(),
            s: signature.s(),
            v: 27 + signature.v() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_order_type_constructors() {
        let limit = OrderType::limit(TimeInForce::Gtc);
        assert!(limit.limit.is_some() && limit.trigger.is_none());

        let trigger = OrderType::trigger(true, dec!(100), TpSl::Sl);
        assert!(trigger.limit.is_none() && trigger.trigger.is_some());
    }

    #[test]
    fn test_order_type_deserializes_request_shape() {
        let ty: OrderType = serde_json::from_str(r#"{"limit":{"tif":"Ioc"}}"#).unwrap();
        assert_eq!(ty, OrderType::limit(TimeInForce::Ioc));

        let empty: OrderType = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OrderType::default());
    }

    #[test]
    fn test_usd_send_stamps_chain() {
        let action = UsdSend {
            destination: Address::ZERO,
            amount: dec!(1.50),
            time: 7,
        }
        .into_action(Chain::Testnet)
        .unwrap();

        let Action::UsdSend(send) = action else {
            panic!("expected usdSend");
        };
        assert_eq!(send.signature_chain_id, "0x66eee");
        assert_eq!(send.hyperliquid_chain, Chain::Testnet);
        assert_eq!(send.amount, "1.5");
    }

    #[test]
    fn test_transfer_amount_rounding_loss() {
        let err = Withdraw {
            destination: Address::ZERO,
            amount: dec!(0.123456789),
            time: 1,
        }
        .into_action(Chain::Mainnet)
        .unwrap_err();
        assert!(err.is_rounding_loss());
    }

    #[test]
    fn test_signature_display_format() {
        let sig = Signature {
            r: U256::from(1),
            s: U256::from(2),
            v: 28,
        };
        let text = sig.to_string();
        assert_eq!(text.len(), 132);
        assert!(text.ends_with("1c"));
    }

    #[test]
    fn test_signature_serializes_fixed_width_hex() {
        let sig = Signature {
            r: U256::from(0xab),
            s: U256::from(1),
            v: 27,
        };
        let json = serde_json::to_value(sig).unwrap();
        assert_eq!(
            json["r"],
            "0x00000000000000000000000000000000000000000000000000000000000000ab"
        );
        assert_eq!(json["v"], 27);
        let back: Signature = serde_json::from_value(json).unwrap();
        assert_eq!(back, sig);
    }
}
