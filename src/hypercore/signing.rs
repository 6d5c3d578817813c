//! Signing utilities for HyperCore actions.
//!
//! This module turns typed data into a normalized [`Signature`] and wraps the
//! result into an [`ActionRequest`]. Signers come in two shapes, and callers pick
//! one explicitly through [`SignerAdapter`].

use std::{collections::BTreeMap, fmt};

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, U256},
    signers::SignerSync,
};
use serde_json::Value;

use crate::hypercore::{
    Chain, Error, Result,
    typed_data::{SigningMode, TypeField, TypedData, build_typed_data},
    types::{Action, ActionRequest, Signature},
};

/// A signer taking the typed data as separate `domain`, `types` and `message`.
///
/// This is the shape of ethers-style `signTypedData(domain, types, value)` APIs.
/// The `types` map never needs an `EIP712Domain` entry, but may contain one.
///
/// Every [`SignerSync`] implements this trait.
pub trait DirectSigner {
    /// Signs typed data given as its three parts.
    ///
    /// # Parameters
    ///
    /// - `domain`: The EIP-712 domain
    /// - `types`: Struct types by name, with exactly one type nobody references
    /// - `message`: The message of that primary type
    ///
    /// # Returns
    ///
    /// A hex encoded 65-byte signature `r ‖ s ‖ v`, with or without `0x`. `v` may
    /// be either 0/1 or 27/28; [`split_signature`] normalizes both.
    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        types: &BTreeMap<String, Vec<TypeField>>,
        message: &Value,
    ) -> Result<String>;
}

/// A signer taking the full typed data object, like `eth_signTypedData_v4`.
///
/// Every [`SignerSync`] implements this trait.
pub trait ClientStyleSigner {
    /// Signs a complete typed data object.
    ///
    /// # Returns
    ///
    /// A hex encoded 65-byte signature, in the same forms [`DirectSigner`]
    /// accepts.
    fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String>;
}

impl<S: SignerSync> ClientStyleSigner for S {
    fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String> {
        let signature = self.sign_dynamic_typed_data_sync(&typed_data.to_alloy()?)?;
        Ok(const_hex::encode_prefixed(signature.as_bytes()))
    }
}

impl<S: SignerSync> DirectSigner for S {
    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        types: &BTreeMap<String, Vec<TypeField>>,
        message: &Value,
    ) -> Result<String> {
        let typed_data = TypedData::from_parts(domain.clone(), types.clone(), message.clone())?;
        ClientStyleSigner::sign_typed_data(self, &typed_data)
    }
}

/// The signer used for an action, tagged with the calling convention it expects.
///
/// # Example
///
/// ```rust
/// use hypersign::hypercore::{PrivateKeySigner, SignerAdapter};
///
/// let signer = PrivateKeySigner::random();
/// let adapter = SignerAdapter::ClientStyle(&signer);
/// assert!(adapter.is_client_style());
/// ```
#[derive(Clone, Copy, derive_more::IsVariant)]
pub enum SignerAdapter<'a> {
    Direct(&'a dyn DirectSigner),
    ClientStyle(&'a dyn ClientStyleSigner),
}

impl SignerAdapter<'_> {
    /// Signs the typed data and normalizes the signature.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSignature`] if the signer's output isn't a 65-byte signature
    /// - whatever the signer itself fails with, usually [`Error::Signing`]
    pub fn sign(&self, typed_data: &TypedData) -> Result<Signature> {
        let raw = match *self {
            SignerAdapter::Direct(signer) => DirectSigner::sign_typed_data(
                signer,
                &typed_data.domain,
                &typed_data.types,
                &typed_data.message,
            )?,
            SignerAdapter::ClientStyle(signer) => {
                ClientStyleSigner::sign_typed_data(signer, typed_data)?
            }
        };
        split_signature(&raw)
    }
}

impl fmt::Debug for SignerAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerAdapter::Direct(_) => f.write_str("SignerAdapter::Direct"),
            SignerAdapter::ClientStyle(_) => f.write_str("SignerAdapter::ClientStyle"),
        }
    }
}

/// The signing entry points an opaque signer object exposes.
///
/// Converting into a [`SignerAdapter`] prefers the client-style entry point and
/// fails with [`Error::UnsupportedSigner`] if there is none.
#[derive(Default, Clone, Copy)]
pub struct SignerCapabilities<'a> {
    pub direct: Option<&'a dyn DirectSigner>,
    pub client_style: Option<&'a dyn ClientStyleSigner>,
}

impl<'a> TryFrom<SignerCapabilities<'a>> for SignerAdapter<'a> {
    type Error = Error;

    fn try_from(capabilities: SignerCapabilities<'a>) -> Result<Self> {
        if let Some(signer) = capabilities.client_style {
            Ok(SignerAdapter::ClientStyle(signer))
        } else if let Some(signer) = capabilities.direct {
            Ok(SignerAdapter::Direct(signer))
        } else {
            Err(Error::UnsupportedSigner)
        }
    }
}

/// Splits a hex encoded 65-byte signature into `{r, s, v}`.
///
/// `v` values of 0 and 1 are lifted to 27 and 28.
///
/// # Errors
///
/// [`Error::InvalidSignature`] for bad hex, a wrong length or a recovery id
/// outside 0, 1, 27 and 28.
pub fn split_signature(hex: &str) -> Result<Signature> {
    let bytes = const_hex::decode(hex).map_err(|err| Error::InvalidSignature {
        message: err.to_string(),
    })?;
    if bytes.len() != 65 {
        return Err(Error::InvalidSignature {
            message: format!("expected 65 bytes, got {}", bytes.len()),
        });
    }

    let v = match bytes[64] {
        v @ (0 | 1) => u64::from(v) + 27,
        v @ (27 | 28) => u64::from(v),
        v => {
            return Err(Error::InvalidSignature {
                message: format!("unexpected recovery id {v}"),
            });
        }
    };

    Ok(Signature {
        r: U256::from_be_slice(&bytes[..32]),
        s: U256::from_be_slice(&bytes[32..64]),
        v,
    })
}

/// Signs an action and wraps it into a request for `/exchange`.
///
/// The signing mode follows from the action:
///
/// - L1 actions (orders, cancels, leverage, ...) are hashed together with `nonce`
///   and `vault_address`, and the hash is signed through the phantom agent.
/// - User-signed actions (transfers, approvals) are signed field by field. Their
///   embedded `time`/`nonce` must equal `nonce`, and `vault_address` is ignored.
///
/// # Parameters
///
/// - `signer`: The signer, tagged with its calling convention
/// - `action`: The action to sign (moved into the request)
/// - `nonce`: Request nonce, usually [`timestamp_nonce`](super::timestamp_nonce)
/// - `vault_address`: Vault or subaccount to act for, L1 actions only
/// - `chain`: Mainnet or testnet, selecting the phantom agent source
///
/// # Errors
///
/// - [`Error::NonceMismatch`] if a user-signed action carries another nonce
/// - [`Error::Serialization`] if the action can't be encoded
/// - [`Error::InvalidSignature`] if the signer's output can't be normalized
/// - [`Error::Signing`] if the signer itself fails
pub fn sign_action(
    signer: SignerAdapter<'_>,
    action: Action,
    nonce: u64,
    vault_address: Option<Address>,
    chain: Chain,
) -> Result<ActionRequest> {
    let mode = action.signing_mode();
    log::debug!(
        "signing {} action, mode={mode} nonce={nonce} chain={chain}",
        action.kind()
    );

    match mode {
        SigningMode::L1 => sign_l1(signer, action, nonce, vault_address, chain),
        SigningMode::UserSigned => {
            if vault_address.is_some() {
                log::debug!("vault address ignored for {}", action.kind());
            }
            sign_user_signed(signer, action, nonce, chain)
        }
    }
}

fn sign_l1(
    signer: SignerAdapter<'_>,
    action: Action,
    nonce: u64,
    vault_address: Option<Address>,
    chain: Chain,
) -> Result<ActionRequest> {
    let typed_data = build_typed_data(&action, nonce, vault_address, chain)?;
    let signature = signer.sign(&typed_data)?;

    Ok(ActionRequest {
        action,
        nonce,
        signature,
        vault_address,
    })
}

fn sign_user_signed(
    signer: SignerAdapter<'_>,
    action: Action,
    nonce: u64,
    chain: Chain,
) -> Result<ActionRequest> {
    if let Some(expected) = action.embedded_nonce() {
        if expected != nonce {
            return Err(Error::NonceMismatch {
                expected,
                got: nonce,
            });
        }
    }

    let typed_data = build_typed_data(&action, nonce, None, chain)?;
    let signature = signer.sign(&typed_data)?;

    Ok(ActionRequest {
        action,
        nonce,
        signature,
        vault_address: None,
    })
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{B256, address},
        signers::local::PrivateKeySigner,
    };
    use rust_decimal::dec;

    use super::*;
    use crate::hypercore::types::{
        ApproveAgent, ApproveBuilderFeeAction, BatchCancel, CancelWire, UsdSend,
    };

    fn get_signer() -> PrivateKeySigner {
        let priv_key = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
        priv_key.parse::<PrivateKeySigner>().unwrap()
    }

    fn cancel() -> Action {
        Action::Cancel(BatchCancel {
            cancels: vec![CancelWire { a: 0, o: 42 }],
        })
    }

    fn usd_send(time: u64) -> Action {
        UsdSend {
            destination: address!("0x0d1d9635d0640821d15e323ac8adadfa9c111414"),
            amount: dec!(1),
            time,
        }
        .into_action(Chain::Mainnet)
        .unwrap()
    }

    /// Signs like a wallet that reports the recovery id as 0/1.
    struct RawRecoveryIdSigner(PrivateKeySigner);

    impl DirectSigner for RawRecoveryIdSigner {
        fn sign_typed_data(
            &self,
            domain: &Eip712Domain,
            types: &BTreeMap<String, Vec<TypeField>>,
            message: &Value,
        ) -> Result<String> {
            let typed = TypedData::from_parts(domain.clone(), types.clone(), message.clone())?;
            let signature = self.0.sign_hash_sync(&typed.signing_hash()?)?;
            let mut bytes = signature.as_bytes();
            bytes[64] -= 27;
            Ok(const_hex::encode(bytes))
        }
    }

    fn recover(request: &ActionRequest, chain: Chain) -> Address {
        let typed = build_typed_data(
            &request.action,
            request.nonce,
            request.vault_address,
            chain,
        )
        .unwrap();
        let signature: alloy::signers::Signature = request.signature.into();
        signature
            .recover_address_from_prehash(&typed.signing_hash().unwrap())
            .unwrap()
    }

    #[test]
    fn test_sign_usd_transfer_action() {
        let signer = get_signer();
        let action = UsdSend {
            destination: "0x0D1d9635D0640821d15e323ac8AdADfA9c111414"
                .parse()
                .unwrap(),
            amount: dec!(1),
            time: 1690393044548,
        }
        .into_action(Chain::Mainnet)
        .unwrap();

        let req = sign_action(
            SignerAdapter::ClientStyle(&signer),
            action,
            1690393044548,
            None,
            Chain::Mainnet,
        )
        .unwrap();

        let expected_sig = "0xeca6267bcaadc4c0ae1aed73f5a2c45fcdbb7271f2e9356992404e5d4bad75a3572e08fe93f17755abadb7f84be7d1e9c4ce48bb5633e339bc430c672d5a20ed1b";
        assert_eq!(req.signature.to_string(), expected_sig);
    }

    #[test]
    fn test_sign_cancel_action() {
        let signer = get_signer();
        let action = Action::Cancel(BatchCancel {
            cancels: vec![CancelWire { a: 1, o: 82382 }],
        });

        for (chain, expected_sig) in [
            (
                Chain::Mainnet,
                "0x02f76cc5b16e0810152fa0e14e7b219f49c361e3325f771544c6f54e157bf9fa17ed0afc11a98596be85d5cd9f86600aad515337318f7ab346e5ccc1b03425d51b",
            ),
            (
                Chain::Testnet,
                "0x6ffebadfd48067663390962539fbde76cfa36f53be65abe2ab72c9db6d0db44457720db9d7c4860f142a484f070c84eb4b9694c3a617c83f0d698a27e55fd5e01c",
            ),
        ] {
            let req = sign_action(
                SignerAdapter::Direct(&signer),
                action.clone(),
                1583838,
                None,
                chain,
            )
            .unwrap();
            assert_eq!(req.signature.to_string(), expected_sig);
        }
    }

    #[test]
    fn test_sign_approve_builder_fee_action() {
        let signer = get_signer();

        for (hyperliquid_chain, expected_sig) in [
            (
                Chain::Mainnet,
                "0x343c9078af7c3d6683abefd0ca3b2960de5b669b716863e6dc49090853a4a3cd6c016301239461091a8ca3ea5ac783362526c4d9e9e624ffc563aea93d6ac2391b",
            ),
            (
                Chain::Testnet,
                "0x2ada43eeebeba9cfe13faf95aa84e5b8c4885c3a07cbf4536f2df5edd340d4eb1ed0e24f60a80d199a842258d5fa737a18d486f7d4e656268b434d226f2811d71c",
            ),
        ] {
            let action = Action::ApproveBuilderFee(ApproveBuilderFeeAction {
                signature_chain_id: "0x66eee".into(),
                hyperliquid_chain,
                max_fee_rate: "0.001%".into(),
                builder: address!("0x1234567890123456789012345678901234567890"),
                nonce: 1583838,
            });
            let req = sign_action(
                SignerAdapter::ClientStyle(&signer),
                action,
                1583838,
                None,
                hyperliquid_chain,
            )
            .unwrap();
            assert_eq!(req.signature.to_string(), expected_sig);
        }
    }

    #[test]
    fn test_split_signature_normalizes_v() {
        let r = "11".repeat(32);
        let s = "22".repeat(32);

        for (suffix, v) in [("00", 27), ("01", 28), ("1b", 27), ("1c", 28)] {
            let sig = split_signature(&format!("0x{r}{s}{suffix}")).unwrap();
            assert_eq!(sig.v, v);
            assert_eq!(sig.r, U256::from_be_slice(&[0x11; 32]));
            assert_eq!(sig.s, U256::from_be_slice(&[0x22; 32]));
        }

        // prefix is optional
        assert_eq!(
            split_signature(&format!("{r}{s}1b")).unwrap(),
            split_signature(&format!("0x{r}{s}1b")).unwrap()
        );
    }

    #[test]
    fn test_split_signature_rejects_malformed() {
        let r = "11".repeat(32);
        let s = "22".repeat(32);

        assert!(
            split_signature(&format!("0x{r}{s}02"))
                .unwrap_err()
                .is_invalid_signature()
        );
        assert!(split_signature(&format!("0x{r}{s}")).is_err());
        assert!(split_signature("0xnothex").is_err());
        assert!(split_signature("").is_err());
    }

    #[test]
    fn test_signature_display_roundtrips_through_split() {
        let signer = get_signer();
        let req = sign_action(
            SignerAdapter::ClientStyle(&signer),
            cancel(),
            1,
            None,
            Chain::Mainnet,
        )
        .unwrap();
        let parsed: Signature = req.signature.to_string().parse().unwrap();
        assert_eq!(parsed, req.signature);
    }

    #[test]
    fn test_sign_l1_action_recovers_signer() {
        let signer = get_signer();
        let req = sign_action(
            SignerAdapter::ClientStyle(&signer),
            cancel(),
            1700000000000,
            None,
            Chain::Mainnet,
        )
        .unwrap();

        assert_eq!(req.nonce, 1700000000000);
        assert!(req.vault_address.is_none());
        assert!(req.signature.v == 27 || req.signature.v == 28);
        assert_eq!(recover(&req, Chain::Mainnet), signer.address());
        // a testnet verifier recovers someone else
        assert_ne!(recover(&req, Chain::Testnet), signer.address());
    }

    #[test]
    fn test_sign_l1_action_attaches_vault() {
        let signer = get_signer();
        let vault = address!("0x1719884eb866cb12b2287399b15f7db5e7d775ea");
        let req = sign_action(
            SignerAdapter::ClientStyle(&signer),
            cancel(),
            5,
            Some(vault),
            Chain::Testnet,
        )
        .unwrap();

        assert_eq!(req.vault_address, Some(vault));
        assert_eq!(recover(&req, Chain::Testnet), signer.address());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["vaultAddress"], "0x1719884eb866cb12b2287399b15f7db5e7d775ea");
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = get_signer();
        let sign = |nonce| {
            sign_action(
                SignerAdapter::ClientStyle(&signer),
                cancel(),
                nonce,
                None,
                Chain::Mainnet,
            )
            .unwrap()
            .signature
        };
        assert_eq!(sign(10), sign(10));
        assert_ne!(sign(10), sign(11));
    }

    #[test]
    fn test_direct_and_client_style_agree() {
        let signer = get_signer();
        for action in [cancel(), usd_send(100)] {
            let direct = sign_action(
                SignerAdapter::Direct(&signer),
                action.clone(),
                100,
                None,
                Chain::Mainnet,
            )
            .unwrap();
            let client = sign_action(
                SignerAdapter::ClientStyle(&signer),
                action,
                100,
                None,
                Chain::Mainnet,
            )
            .unwrap();
            assert_eq!(direct.signature, client.signature);
        }
    }

    #[test]
    fn test_raw_recovery_id_is_normalized() {
        let signer = get_signer();
        let raw = RawRecoveryIdSigner(signer.clone());

        let expected = sign_action(
            SignerAdapter::ClientStyle(&signer),
            cancel(),
            3,
            None,
            Chain::Mainnet,
        )
        .unwrap();
        let normalized = sign_action(
            SignerAdapter::Direct(&raw),
            cancel(),
            3,
            None,
            Chain::Mainnet,
        )
        .unwrap();
        assert_eq!(normalized.signature, expected.signature);
    }

    #[test]
    fn test_sign_user_signed_action() {
        let signer = get_signer();
        let vault = address!("0x1719884eb866cb12b2287399b15f7db5e7d775ea");
        let req = sign_action(
            SignerAdapter::ClientStyle(&signer),
            usd_send(1690393044548),
            1690393044548,
            Some(vault),
            Chain::Mainnet,
        )
        .unwrap();

        assert!(req.vault_address.is_none());
        assert_eq!(recover(&req, Chain::Mainnet), signer.address());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"]["type"], "usdSend");
        assert_eq!(json["action"]["signatureChainId"], "0xa4b1");
        assert_eq!(json["nonce"], 1690393044548u64);
    }

    #[test]
    fn test_user_signed_nonce_mismatch() {
        let signer = get_signer();
        let err = sign_action(
            SignerAdapter::ClientStyle(&signer),
            usd_send(10),
            11,
            None,
            Chain::Mainnet,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::NonceMismatch {
                expected: 10,
                got: 11
            }
        );
    }

    #[test]
    fn test_approve_agent_recovers_signer() {
        let signer = get_signer();
        let agent = PrivateKeySigner::random();
        let action = ApproveAgent {
            agent_address: agent.address(),
            agent_name: Some("bot".into()),
            nonce: 77,
        }
        .into_action(Chain::Testnet)
        .unwrap();

        let req = sign_action(
            SignerAdapter::Direct(&signer),
            action,
            77,
            None,
            Chain::Testnet,
        )
        .unwrap();
        assert_eq!(recover(&req, Chain::Testnet), signer.address());
    }

    #[test]
    fn test_capabilities_select_adapter() {
        let signer = get_signer();

        let none = SignerCapabilities::default();
        assert_eq!(
            SignerAdapter::try_from(none).unwrap_err(),
            Error::UnsupportedSigner
        );

        let direct_only = SignerCapabilities {
            direct: Some(&signer),
            client_style: None,
        };
        assert!(SignerAdapter::try_from(direct_only).unwrap().is_direct());

        let both = SignerCapabilities {
            direct: Some(&signer),
            client_style: Some(&signer),
        };
        assert!(SignerAdapter::try_from(both).unwrap().is_client_style());
    }

    #[test]
    fn test_signer_failure_is_not_a_signature() {
        struct Broken;

        impl ClientStyleSigner for Broken {
            fn sign_typed_data(&self, _: &TypedData) -> Result<String> {
                Ok("0x".to_owned())
            }
        }

        let err = SignerAdapter::ClientStyle(&Broken)
            .sign(&crate::hypercore::typed_data::phantom_agent(
                B256::ZERO,
                Chain::Mainnet,
            ))
            .unwrap_err();
        assert!(err.is_invalid_signature());
    }
}
