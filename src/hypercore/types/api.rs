//! Wire structures, in protocol key order.
//!
//! The field declaration order of every struct in this module is the key order of
//! the msgpack map the action hash is computed over. Reordering a field changes
//! the hash.

use alloy::primitives::{Address, B256, keccak256};
use serde::{Deserialize, Serialize};

use super::{OrderGrouping, Signature, TimeInForce, TpSl};
use crate::hypercore::{Chain, Cloid, OidOrCloid, Result, typed_data::SigningMode};

/// A single order in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWire {
    /// Asset index.
    pub a: u32,
    /// Is buy.
    pub b: bool,
    /// Price.
    pub p: String,
    /// Size.
    pub s: String,
    /// Reduce only.
    pub r: bool,
    /// Order type.
    pub t: OrderTypeWire,
    /// Client order id. Absent, not null, when unset.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::hypercore::utils::serialize_maybe_cloid",
        deserialize_with = "crate::hypercore::utils::deserialize_maybe_cloid"
    )]
    pub c: Option<Cloid>,
}

/// Order type in wire form: `{"limit": {...}}` or `{"trigger": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderTypeWire {
    Limit {
        tif: TimeInForce,
    },
    #[serde(rename_all = "camelCase")]
    Trigger {
        is_market: bool,
        trigger_px: String,
        tpsl: TpSl,
    },
}

/// Builder fee in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderWire {
    /// Builder address.
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub b: Address,
    /// Fee in tenths of a basis point.
    pub f: u64,
}

/// Batch of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOrder {
    pub orders: Vec<OrderWire>,
    pub grouping: OrderGrouping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderWire>,
}

/// Cancel by exchange id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelWire {
    /// Asset index.
    pub a: u32,
    /// Order id.
    pub o: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCancel {
    pub cancels: Vec<CancelWire>,
}

/// Cancel by client id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelByCloidWire {
    pub asset: u32,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_cloid")]
    pub cloid: Cloid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCancelCloid {
    pub cancels: Vec<CancelByCloidWire>,
}

/// Modification of an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modify {
    #[serde(serialize_with = "crate::hypercore::utils::serialize_oid_or_cloid")]
    pub oid: OidOrCloid,
    pub order: OrderWire,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchModify {
    pub modifies: Vec<Modify>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverage {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIsolatedMargin {
    pub asset: u32,
    pub is_buy: bool,
    /// Margin delta in micro-USD.
    pub ntli: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdSendAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub destination: Address,
    pub amount: String,
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSendAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub destination: Address,
    pub token: String,
    pub amount: String,
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub destination: Address,
    pub amount: String,
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdClassTransferAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub amount: String,
    pub to_perp: bool,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTransfer {
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub vault_address: Address,
    pub is_deposit: bool,
    /// Amount in micro-USD.
    pub usd: u64,
}

/// Schedule cancellation of all orders; `time: None` clears the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleCancel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetReferrer {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgentAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub agent_address: Address,
    /// Signed as `""` when unset, but left out of the posted action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBuilderFeeAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub max_fee_rate: String,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_address")]
    pub builder: Address,
    pub nonce: u64,
}

/// Every action the exchange accepts from this crate.
///
/// Serialized internally tagged, so `type` is always the first key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Order(BatchOrder),
    Cancel(BatchCancel),
    CancelByCloid(BatchCancelCloid),
    Modify(Modify),
    BatchModify(BatchModify),
    UpdateLeverage(UpdateLeverage),
    UpdateIsolatedMargin(UpdateIsolatedMargin),
    UsdSend(UsdSendAction),
    SpotSend(SpotSendAction),
    Withdraw3(WithdrawAction),
    UsdClassTransfer(UsdClassTransferAction),
    VaultTransfer(VaultTransfer),
    ScheduleCancel(ScheduleCancel),
    SetReferrer(SetReferrer),
    ApproveAgent(ApproveAgentAction),
    ApproveBuilderFee(ApproveBuilderFeeAction),
    Noop,
}

impl Action {
    /// The `type` discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Order(_) => "order",
            Action::Cancel(_) => "cancel",
            Action::CancelByCloid(_) => "cancelByCloid",
            Action::Modify(_) => "modify",
            Action::BatchModify(_) => "batchModify",
            Action::UpdateLeverage(_) => "updateLeverage",
            Action::UpdateIsolatedMargin(_) => "updateIsolatedMargin",
            Action::UsdSend(_) => "usdSend",
            Action::SpotSend(_) => "spotSend",
            Action::Withdraw3(_) => "withdraw3",
            Action::UsdClassTransfer(_) => "usdClassTransfer",
            Action::VaultTransfer(_) => "vaultTransfer",
            Action::ScheduleCancel(_) => "scheduleCancel",
            Action::SetReferrer(_) => "setReferrer",
            Action::ApproveAgent(_) => "approveAgent",
            Action::ApproveBuilderFee(_) => "approveBuilderFee",
            Action::Noop => "noop",
        }
    }

    /// How this action is signed. Fixed per kind.
    #[must_use]
    pub fn signing_mode(&self) -> SigningMode {
        match self {
            Action::UsdSend(_)
            | Action::SpotSend(_)
            | Action::Withdraw3(_)
            | Action::UsdClassTransfer(_)
            | Action::ApproveAgent(_)
            | Action::ApproveBuilderFee(_) => SigningMode::UserSigned,
            _ => SigningMode::L1,
        }
    }

    /// The nonce a user-signed action carries in its `time` or `nonce` field.
    #[must_use]
    pub fn embedded_nonce(&self) -> Option<u64> {
        match self {
            Action::UsdSend(send) => Some(send.time),
            Action::SpotSend(send) => Some(send.time),
            Action::Withdraw3(withdraw) => Some(withdraw.time),
            Action::UsdClassTransfer(transfer) => Some(transfer.nonce),
            Action::ApproveAgent(approve) => Some(approve.nonce),
            Action::ApproveBuilderFee(approve) => Some(approve.nonce),
            _ => None,
        }
    }

    /// Bytes hashed into the connection id:
    /// `msgpack(action) ‖ nonce (u64 BE) ‖ 0x00` or `‖ 0x01 ‖ vault (20 bytes)`.
    pub fn hash_preimage(&self, nonce: u64, vault_address: Option<Address>) -> Result<Vec<u8>> {
        let mut bytes = rmp_serde::to_vec_named(self)?;
        bytes.extend(nonce.to_be_bytes());
        if let Some(vault_address) = vault_address {
            bytes.push(1);
            bytes.extend_from_slice(vault_address.as_slice());
        } else {
            bytes.push(0);
        }
        Ok(bytes)
    }

    /// Keccak-256 of [`Action::hash_preimage`].
    pub fn hash(&self, nonce: u64, vault_address: Option<Address>) -> Result<B256> {
        let bytes = self.hash_preimage(nonce, vault_address)?;
        Ok(keccak256(bytes))
    }
}

/// A signed action, ready to be posted to `/exchange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Action,
    pub nonce: u64,
    pub signature: Signature,
    #[serde(serialize_with = "crate::hypercore::utils::serialize_maybe_address")]
    pub vault_address: Option<Address>,
}
