//! JSON encoding of [`Coin`] for the wallet's persistent store.
//!
//! One record per coin:
//!
//! ```json
//! {
//!   "txid": "<64 hex>",
//!   "vout": 0,
//!   "value": 100000,
//!   "address": "tb1q...",
//!   "status": { "isConfirmed": true, "blockHeight": 1, "blockHash": "<64 hex>", "blockTime": 1 },
//!   "tweak": "<64 hex>"
//! }
//! ```
//!
//! `tweak` is omitted for ordinary outputs and the block fields are omitted
//! while unconfirmed.

use std::str::FromStr;

use bitcoin::BlockHash;
use serde::{Deserialize, Serialize};

use crate::coin::{Coin, CoinStatus};
use crate::error::CoinError;

/// Serialize a coin into its canonical persisted form.
pub fn serialize(coin: &Coin) -> Result<String, CoinError> {
    serde_json::to_string(coin)
        .map_err(|e| CoinError::Encode(format!("failed to encode coin: {e}")))
}

/// Parse a persisted record back into a coin.
///
/// Malformed JSON, missing fields, and values the coin constructor rejects
/// all surface as [`CoinError::Parse`].
pub fn deserialize(text: &str) -> Result<Coin, CoinError> {
    serde_json::from_str(text)
        .map_err(|e| CoinError::Parse(format!("failed to decode coin: {e}")))
}

/// Wire shape of a coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CoinRecord {
    txid: String,
    vout: u32,
    value: u64,
    address: String,
    status: StatusRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tweak: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StatusRecord {
    is_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block_time: Option<u64>,
}

impl From<Coin> for CoinRecord {
    fn from(coin: Coin) -> Self {
        let status = match *coin.status() {
            CoinStatus::Unconfirmed => StatusRecord {
                is_confirmed: false,
                block_height: None,
                block_hash: None,
                block_time: None,
            },
            CoinStatus::Confirmed {
                block_height,
                block_hash,
                block_time,
            } => StatusRecord {
                is_confirmed: true,
                block_height: Some(block_height),
                block_hash: Some(block_hash.to_string()),
                block_time: Some(block_time),
            },
        };

        CoinRecord {
            txid: coin.txid().to_string(),
            vout: coin.vout(),
            value: coin.value().to_sat(),
            tweak: coin.tweak_hex(),
            address: coin.address().to_string(),
            status,
        }
    }
}

impl TryFrom<CoinRecord> for Coin {
    type Error = CoinError;

    fn try_from(record: CoinRecord) -> Result<Self, Self::Error> {
        let status = CoinStatus::try_from(record.status)?;

        let mut builder = Coin::builder()
            .txid(record.txid)
            .vout(record.vout)
            .value_sat(record.value)
            .address(record.address)
            .status(status);
        if let Some(tweak) = record.tweak {
            builder = builder.tweak(tweak);
        }
        builder.build()
    }
}

impl TryFrom<StatusRecord> for CoinStatus {
    type Error = CoinError;

    fn try_from(record: StatusRecord) -> Result<Self, Self::Error> {
        if !record.is_confirmed {
            let has_block_data = record.block_height.is_some()
                || record.block_hash.is_some()
                || record.block_time.is_some();
            if has_block_data {
                return Err(CoinError::InvalidCoin(
                    "unconfirmed status must not carry block data".into(),
                ));
            }
            return Ok(CoinStatus::Unconfirmed);
        }

        match (record.block_height, record.block_hash, record.block_time) {
            (Some(block_height), Some(hash_hex), Some(block_time)) => {
                let block_hash = BlockHash::from_str(&hash_hex)
                    .map_err(|e| CoinError::InvalidCoin(format!("invalid block hash: {e}")))?;
                Ok(CoinStatus::Confirmed {
                    block_height,
                    block_hash,
                    block_time,
                })
            }
            _ => Err(CoinError::InvalidCoin(
                "confirmed status requires blockHeight, blockHash and blockTime".into(),
            )),
        }
    }
}
