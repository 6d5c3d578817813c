//! Error type for action encoding and signing.

/// Errors produced while encoding, hashing or signing an action.
///
/// Every variant means "do not submit": there is no fallback encoding.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Error {
    /// A number can't be represented at the wire precision without losing value.
    #[display("encoding {value} would lose precision")]
    RoundingLoss { value: String },
    /// Neither a limit nor a trigger order type was provided.
    #[display("order type must be either limit or trigger")]
    InvalidOrderType,
    /// The asset resolver returned no index for the coin.
    #[display("unknown asset: {coin}")]
    UnknownAsset { coin: String },
    /// The signer exposes none of the supported signing capabilities.
    #[display("signer supports neither direct nor client-style typed data signing")]
    UnsupportedSigner,
    /// The action or typed data could not be serialized.
    #[display("serialization: {message}")]
    Serialization { message: String },
    /// The signer returned something that is not a 65-byte signature.
    #[display("invalid signature: {message}")]
    InvalidSignature { message: String },
    /// `signatureChainId` is not a hex chain id.
    #[display("invalid signature chain id: {chain_id}")]
    InvalidChainId { chain_id: String },
    /// The request nonce differs from the nonce embedded in a user-signed action.
    #[display("nonce {got} doesn't match the action's nonce {expected}")]
    NonceMismatch { expected: u64, got: u64 },
    /// The signing backend failed.
    #[display("signing: {message}")]
    Signing { message: String },
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn rounding(value: impl ToString) -> Self {
        Self::RoundingLoss {
            value: value.to_string(),
        }
    }

    pub(crate) fn serialization(err: impl ToString) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<alloy::dyn_abi::Error> for Error {
    fn from(err: alloy::dyn_abi::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<alloy::signers::Error> for Error {
    fn from(err: alloy::signers::Error) -> Self {
        Self::Signing {
            message: err.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
