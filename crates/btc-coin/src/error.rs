use thiserror::Error;

/// Errors raised while validating, encoding, or spending a coin.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoinError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid coin: {0}")]
    InvalidCoin(String),

    #[error("invalid tweak: {0}")]
    InvalidTweak(String),

    #[error("unsupported address: {0}")]
    UnsupportedAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}
