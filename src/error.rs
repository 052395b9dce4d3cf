//! Error types for the name service SDK.

use crate::coin::CoinType;

/// Boxed error handed back by external collaborators (signers, transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Name service errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The name is not of the form `example.hh`.
    #[error("invalid name `{0}`, expected a name of the form `example.hh`")]
    InvalidNameFormat(String),

    /// The record name is not of the form `example.hh` or `test.example.hh`.
    #[error("invalid record name `{0}`, expected a record name of the form `example.hh` or `test.example.hh`")]
    InvalidRecordNameFormat(String),

    /// No text serialization is known for this coin type.
    #[error("no serialization for coin type {0} available, serialize the address before calling set_address")]
    UnsupportedCoinType(CoinType),

    /// The address text does not match the shape required by its coin type.
    #[error("invalid address for coin type {coin_type}: {reason}")]
    InvalidAddress {
        /// Coin type the address was given for.
        coin_type: CoinType,
        /// What was wrong with it.
        reason: String,
    },

    /// A ledger account or entity id failed to parse.
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    /// The embedded protobuf payload was malformed.
    #[error("invalid protobuf payload: {0}")]
    BadProto(&'static str),

    /// Hex text failed to decode.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Base64 text failed to decode.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A value did not fit a fixed-width contract parameter slot.
    #[error("value of {len} bytes exceeds fixed width of {max} bytes")]
    ValueTooLarge {
        /// Length of the rejected value.
        len: usize,
        /// Width of the slot.
        max: usize,
    },

    /// The name is not registered or has expired.
    #[error("name not found")]
    NameNotFound,

    /// The label has no finite price and cannot be purchased.
    #[error("name `{0}` cannot be registered")]
    Unregistrable(String),

    /// The exchange rate cannot be used to convert a price.
    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(f64),

    /// A write operation was invoked before a signer was configured.
    #[error("signer required, call set_signer before calling this method")]
    SignerRequired,

    /// The signer declined, or failed to produce a submittable transaction.
    #[error("signer rejected the transaction")]
    SignerRejected(#[source] Option<BoxError>),

    /// The transaction receipt carried no minted serial number.
    #[error("transaction receipt is missing the minted serial number")]
    MissingSerial,

    /// A collaborator answered with data that could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure, passed through unchanged.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}
