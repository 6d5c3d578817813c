//! EIP-712 typed data for the two signing modes.
//!
//! L1 actions are signed through a *phantom agent*: the action hash becomes the
//! `connectionId` of an `Agent` struct under the `Exchange` domain (chain id
//! 1337). User-signed actions are signed field by field under the
//! `HyperliquidSignTransaction` domain, whose chain id comes from the action's
//! own `signatureChainId`.
//!
//! [`TypedData`] keeps the JSON shape wallets consume; digests and signatures go
//! through alloy's dynamic typed data.

use std::collections::BTreeMap;

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, B256},
    sol_types::{SolStruct, eip712_domain},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    Chain, Error, PHANTOM_AGENT_CHAIN_ID, Result,
    types::{Action, solidity},
};

/// Domain of the phantom agent, shared by mainnet and testnet.
pub const PHANTOM_AGENT_DOMAIN: Eip712Domain = eip712_domain! {
    name: "Exchange",
    version: "1",
    chain_id: PHANTOM_AGENT_CHAIN_ID,
    verifying_contract: Address::ZERO,
};

/// Type name prefix of user-signed schemas.
pub const USER_SIGNED_PREFIX: &str = "HyperliquidTransaction:";

const DOMAIN_TYPE: &str = "EIP712Domain";

/// How an action is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SigningMode {
    /// Hashed with msgpack and signed through the phantom agent.
    #[display("l1")]
    L1,
    /// Signed as typed data over the action's own fields.
    #[display("user-signed")]
    UserSigned,
}

/// One member of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypeField {
    fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_owned(),
            ty: ty.to_owned(),
        }
    }
}

/// EIP-712 typed data, in the JSON shape wallets consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub domain: Eip712Domain,
    pub types: BTreeMap<String, Vec<TypeField>>,
    pub primary_type: String,
    pub message: Value,
}

impl TypedData {
    /// Assembles typed data from its parts, inferring the primary type.
    ///
    /// The primary type is the single struct type (other than `EIP712Domain`) that
    /// no other type references.
    pub fn from_parts(
        domain: Eip712Domain,
        types: BTreeMap<String, Vec<TypeField>>,
        message: Value,
    ) -> Result<Self> {
        let mut roots = types.keys().filter(|name| {
            name.as_str() != DOMAIN_TYPE
                && !types
                    .values()
                    .flatten()
                    .any(|field| field.ty.trim_end_matches("[]") == name.as_str())
        });

        let primary_type = match (roots.next(), roots.next()) {
            (Some(root), None) => root.clone(),
            _ => {
                return Err(Error::serialization(
                    "typed data must have exactly one primary type",
                ));
            }
        };

        Ok(Self {
            domain,
            types,
            primary_type,
            message,
        })
    }

    /// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`, the digest
    /// that gets signed.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] if the message doesn't fit the declared types.
    pub fn signing_hash(&self) -> Result<B256> {
        Ok(self.to_alloy()?.eip712_signing_hash()?)
    }

    /// Converts into alloy's dynamic typed data.
    pub fn to_alloy(&self) -> Result<alloy::dyn_abi::TypedData> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Ordered field list of a `sol!` struct, parsed from its root type string.
fn fields_of<T: SolStruct>() -> Vec<TypeField> {
    let root = T::eip712_root_type();
    let members = root
        .split_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .unwrap_or_default();

    members
        .split(',')
        .filter_map(|member| member.split_once(' '))
        .map(|(ty, name)| TypeField::new(name, ty))
        .collect()
}

fn domain_fields() -> Vec<TypeField> {
    vec![
        TypeField::new("name", "string"),
        TypeField::new("version", "string"),
        TypeField::new("chainId", "uint256"),
        TypeField::new("verifyingContract", "address"),
    ]
}

/// Domain of user-signed actions for the given `signatureChainId`.
pub fn user_signed_domain(signature_chain_id: &str) -> Result<Eip712Domain> {
    let invalid = || Error::InvalidChainId {
        chain_id: signature_chain_id.to_owned(),
    };
    let digits = signature_chain_id
        .strip_prefix("0x")
        .or_else(|| signature_chain_id.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    let chain_id = u64::from_str_radix(digits, 16).map_err(|_| invalid())?;

    Ok(eip712_domain! {
        name: "HyperliquidSignTransaction",
        version: "1",
        chain_id: chain_id,
        verifying_contract: Address::ZERO,
    })
}

/// Phantom agent typed data for an L1 action hash.
pub fn phantom_agent(connection_id: B256, chain: Chain) -> TypedData {
    let primary_type = solidity::Agent::NAME.to_owned();
    let types = BTreeMap::from([
        (DOMAIN_TYPE.to_owned(), domain_fields()),
        (primary_type.clone(), fields_of::<solidity::Agent>()),
    ]);

    TypedData {
        domain: PHANTOM_AGENT_DOMAIN,
        types,
        primary_type,
        message: serde_json::json!({
            "source": chain.source(),
            "connectionId": connection_id,
        }),
    }
}

/// Typed data of a user-signed action, or `None` for L1 actions.
fn user_signed(action: &Action) -> Result<Option<TypedData>> {
    let (name, fields, signature_chain_id) = match action {
        Action::UsdSend(send) => (
            solidity::UsdSend::NAME,
            fields_of::<solidity::UsdSend>(),
            &send.signature_chain_id,
        ),
        Action::SpotSend(send) => (
            solidity::SpotSend::NAME,
            fields_of::<solidity::SpotSend>(),
            &send.signature_chain_id,
        ),
        Action::Withdraw3(withdraw) => (
            solidity::Withdraw::NAME,
            fields_of::<solidity::Withdraw>(),
            &withdraw.signature_chain_id,
        ),
        Action::UsdClassTransfer(transfer) => (
            solidity::UsdClassTransfer::NAME,
            fields_of::<solidity::UsdClassTransfer>(),
            &transfer.signature_chain_id,
        ),
        Action::ApproveAgent(approve) => (
            solidity::ApproveAgent::NAME,
            fields_of::<solidity::ApproveAgent>(),
            &approve.signature_chain_id,
        ),
        Action::ApproveBuilderFee(approve) => (
            solidity::ApproveBuilderFee::NAME,
            fields_of::<solidity::ApproveBuilderFee>(),
            &approve.signature_chain_id,
        ),
        _ => return Ok(None),
    };

    let domain = user_signed_domain(signature_chain_id)?;

    let Value::Object(mut object) = serde_json::to_value(action)? else {
        return Err(Error::serialization("action is not an object"));
    };
    let mut message = Map::new();
    for field in &fields {
        let value = match object.remove(&field.name) {
            Some(value) => value,
            // unnamed agents are signed with an empty name
            None if field.name == "agentName" => Value::String(String::new()),
            None => {
                return Err(Error::serialization(format!(
                    "{} is missing field {}",
                    action.kind(),
                    field.name
                )));
            }
        };
        message.insert(field.name.clone(), value);
    }

    let primary_type = format!("{USER_SIGNED_PREFIX}{name}");
    let types = BTreeMap::from([
        (DOMAIN_TYPE.to_owned(), domain_fields()),
        (primary_type.clone(), fields),
    ]);

    Ok(Some(TypedData {
        domain,
        types,
        primary_type,
        message: Value::Object(message),
    }))
}

/// Builds the typed data to sign for `action`.
///
/// L1 actions are hashed with `nonce` and `vault_address` first; user-signed
/// actions carry their own nonce and ignore both, as well as `chain`, which was
/// stamped into them when they were built.
pub fn build_typed_data(
    action: &Action,
    nonce: u64,
    vault_address: Option<Address>,
    chain: Chain,
) -> Result<TypedData> {
    match action.signing_mode() {
        SigningMode::L1 => {
            let connection_id = action.hash(nonce, vault_address)?;
            log::trace!("{} connection id {connection_id}", action.kind());
            Ok(phantom_agent(connection_id, chain))
        }
        SigningMode::UserSigned => user_signed(action)?
            .ok_or_else(|| Error::serialization(format!("{} is not user-signed", action.kind()))),
    }
}
