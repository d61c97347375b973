use std::str::FromStr;

use bitcoin::secp256k1::Scalar;
use bitcoin::{Amount, BlockHash, OutPoint, Txid};
use serde::{Deserialize, Serialize};

use crate::codec::CoinRecord;
use crate::error::CoinError;

/// Confirmation state of a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinStatus {
    Unconfirmed,
    Confirmed {
        block_height: u32,
        block_hash: BlockHash,
        /// Block timestamp, seconds since the Unix epoch.
        block_time: u64,
    },
}

impl CoinStatus {
    /// Whether the coin's transaction is in a block.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, CoinStatus::Confirmed { .. })
    }

    /// Height of the containing block, if confirmed.
    pub fn block_height(&self) -> Option<u32> {
        match self {
            CoinStatus::Confirmed { block_height, .. } => Some(*block_height),
            CoinStatus::Unconfirmed => None,
        }
    }
}

/// One unspent output owned by the wallet, either directly or through a
/// silent-payment tweak.
///
/// Only `status` can change after construction; everything else is fixed at
/// creation and exposed through read-only accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CoinRecord", into = "CoinRecord")]
pub struct Coin {
    txid: Txid,
    vout: u32,
    value: Amount,
    address: String,
    status: CoinStatus,
    tweak: Option<[u8; 32]>,
}

impl Coin {
    /// Create a coin from already-typed fields.
    ///
    /// Fails if `address` is empty or `tweak` is not a scalar below the curve
    /// order. The remaining invariants are carried by the field types.
    pub fn new(
        txid: Txid,
        vout: u32,
        value: Amount,
        address: impl Into<String>,
        status: CoinStatus,
        tweak: Option<[u8; 32]>,
    ) -> Result<Self, CoinError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(CoinError::InvalidCoin("address must not be empty".into()));
        }
        if let Some(tweak) = &tweak {
            check_tweak_range(tweak)?;
        }

        Ok(Self {
            txid,
            vout,
            value,
            address,
            status,
            tweak,
        })
    }

    /// Start building a coin from loosely-typed (hex string) fields.
    pub fn builder() -> CoinBuilder {
        CoinBuilder::default()
    }

    /// Hash of the transaction that created this output.
    pub fn txid(&self) -> Txid {
        self.txid
    }

    /// Index of this output within its transaction.
    pub fn vout(&self) -> u32 {
        self.vout
    }

    /// Output value.
    pub fn value(&self) -> Amount {
        self.value
    }

    /// Address of the output script as reported by the scanner.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current confirmation state.
    pub fn status(&self) -> &CoinStatus {
        &self.status
    }

    /// The silent-payment tweak scalar, big-endian, if this output has one.
    pub fn tweak(&self) -> Option<&[u8; 32]> {
        self.tweak.as_ref()
    }

    /// The tweak as lowercase hex, the form it is persisted in.
    pub fn tweak_hex(&self) -> Option<String> {
        self.tweak.map(hex::encode)
    }

    /// Whether the output has been mined.
    pub fn is_confirmed(&self) -> bool {
        self.status.is_confirmed()
    }

    /// Whether the output key was derived through a silent-payment tweak.
    pub fn is_silent_payment(&self) -> bool {
        self.tweak.is_some()
    }

    /// The `(txid, vout)` pair an input must reference to spend this coin.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }

    /// Key under which an outpoint-indexed store can file this coin.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }

    /// Number of confirmations given the current chain tip height.
    ///
    /// A coin mined in the tip block has one confirmation. Returns 0 for
    /// unconfirmed coins and when the tip is behind the coin's block.
    pub fn confirmations(&self, tip_height: u32) -> u32 {
        match self.status.block_height() {
            Some(height) if tip_height >= height => (tip_height - height).saturating_add(1),
            _ => 0,
        }
    }

    /// Replace the confirmation state, the only field that changes after creation.
    pub fn set_status(&mut self, status: CoinStatus) {
        self.status = status;
    }

    /// Record that the output was mined in the given block.
    pub fn confirm(&mut self, block_height: u32, block_hash: BlockHash, block_time: u64) {
        self.status = CoinStatus::Confirmed {
            block_height,
            block_hash,
            block_time,
        };
    }

    /// Drop confirmation data after the containing block was reorganized out.
    pub fn mark_unconfirmed(&mut self) {
        self.status = CoinStatus::Unconfirmed;
    }
}

/// Builder for [`Coin`] that validates every field in [`CoinBuilder::build`].
///
/// `txid`, `vout`, `value` and `address` are mandatory. `status` defaults to
/// unconfirmed.
#[derive(Debug, Clone, Default)]
pub struct CoinBuilder {
    txid: Option<String>,
    vout: Option<u32>,
    value_sat: Option<u64>,
    address: Option<String>,
    status: Option<CoinStatus>,
    tweak: Option<String>,
}

impl CoinBuilder {
    /// Transaction hash as 64 hex characters, display order.
    pub fn txid(mut self, txid: impl Into<String>) -> Self {
        self.txid = Some(txid.into());
        self
    }

    /// Output index.
    pub fn vout(mut self, vout: u32) -> Self {
        self.vout = Some(vout);
        self
    }

    /// Output value in satoshis.
    pub fn value_sat(mut self, value_sat: u64) -> Self {
        self.value_sat = Some(value_sat);
        self
    }

    /// Address string; decoded against a network only when an input is built.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Confirmation state; unconfirmed if never set.
    pub fn status(mut self, status: CoinStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Silent-payment tweak as 64 hex characters, big-endian scalar.
    pub fn tweak(mut self, tweak_hex: impl Into<String>) -> Self {
        self.tweak = Some(tweak_hex.into());
        self
    }

    /// Validate the collected fields and produce the coin.
    ///
    /// Fails with [`CoinError::InvalidCoin`] on a missing mandatory field, a
    /// malformed txid or tweak, or a tweak not below the curve order.
    pub fn build(self) -> Result<Coin, CoinError> {
        let txid_hex = self
            .txid
            .ok_or_else(|| CoinError::InvalidCoin("missing txid".into()))?;
        let vout = self
            .vout
            .ok_or_else(|| CoinError::InvalidCoin("missing vout".into()))?;
        let value_sat = self
            .value_sat
            .ok_or_else(|| CoinError::InvalidCoin("missing value".into()))?;
        let address = self
            .address
            .ok_or_else(|| CoinError::InvalidCoin("missing address".into()))?;

        let txid = parse_txid(&txid_hex)?;
        let tweak = self.tweak.as_deref().map(parse_tweak).transpose()?;

        Coin::new(
            txid,
            vout,
            Amount::from_sat(value_sat),
            address,
            self.status.unwrap_or(CoinStatus::Unconfirmed),
            tweak,
        )
    }
}

fn parse_txid(txid_hex: &str) -> Result<Txid, CoinError> {
    if txid_hex.len() != 64 {
        return Err(CoinError::InvalidCoin(format!(
            "txid must be 64 hex characters, got {}",
            txid_hex.len()
        )));
    }
    Txid::from_str(txid_hex).map_err(|e| CoinError::InvalidCoin(format!("invalid txid: {e}")))
}

fn parse_tweak(tweak_hex: &str) -> Result<[u8; 32], CoinError> {
    let bytes = hex::decode(tweak_hex)
        .map_err(|e| CoinError::InvalidCoin(format!("invalid tweak hex: {e}")))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CoinError::InvalidCoin(format!("tweak must be 32 bytes, got {len}")))
}

fn check_tweak_range(tweak: &[u8; 32]) -> Result<(), CoinError> {
    Scalar::from_be_bytes(*tweak)
        .map(|_| ())
        .map_err(|e| CoinError::InvalidCoin(format!("tweak not below curve order: {e}")))
}
