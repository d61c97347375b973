use bitcoin::key::XOnlyPublicKey;
use bitcoin::psbt;
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::{Scalar, Secp256k1};
use bitcoin::{OutPoint, Sequence, TxIn, TxOut, Witness};
use tracing::debug;

use crate::address::{decode_address_script, taproot_output_script};
use crate::coin::Coin;
use crate::error::CoinError;
use crate::network::BtcNetwork;

/// Everything an external signer needs to spend one coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    /// The output being spent.
    pub outpoint: OutPoint,
    /// Script and value of the output being spent, committed to by segwit sighashes.
    pub witness_utxo: TxOut,
    /// Untweaked x-only spend key, set only for silent-payment outputs.
    ///
    /// The signer adds the coin's tweak to the matching private key; the
    /// tweak itself never leaves the wallet.
    pub internal_key: Option<XOnlyPublicKey>,
}

impl InputDescriptor {
    /// PSBT input carrying the witness UTXO and, for tweaked coins, the taproot internal key.
    pub fn to_psbt_input(&self) -> psbt::Input {
        psbt::Input {
            witness_utxo: Some(self.witness_utxo.clone()),
            tap_internal_key: self.internal_key,
            ..Default::default()
        }
    }

    /// Unsigned transaction input spending this outpoint, RBF signalled.
    pub fn to_unsigned_txin(&self) -> TxIn {
        TxIn {
            previous_output: self.outpoint,
            script_sig: ScriptBuf::new(), // Empty for segwit.
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::default(),
        }
    }
}

/// Normalize a 32-byte x-only or 33-byte compressed public key to x-only form.
///
/// A 33-byte key starting with `0x02` or `0x03` loses its parity byte; the
/// caller's buffer is only read.
pub fn x_only_spend_key(spend_public_key: &[u8]) -> Result<XOnlyPublicKey, CoinError> {
    let x_only = match spend_public_key {
        [0x02 | 0x03, rest @ ..] if rest.len() == 32 => rest,
        key if key.len() == 32 || key.len() == 33 => key,
        key => {
            return Err(CoinError::InvalidPublicKey(format!(
                "expected 32 or 33 bytes, got {}",
                key.len()
            )));
        }
    };

    XOnlyPublicKey::from_slice(x_only)
        .map_err(|e| CoinError::InvalidPublicKey(format!("failed to parse x-only key: {e}")))
}

/// Add `tweak * G` to `internal_key`, returning the x-only output key.
pub fn tweak_spend_key(
    internal_key: XOnlyPublicKey,
    tweak: &[u8; 32],
) -> Result<XOnlyPublicKey, CoinError> {
    let scalar = Scalar::from_be_bytes(*tweak)
        .map_err(|e| CoinError::InvalidTweak(format!("scalar not below curve order: {e}")))?;

    let secp = Secp256k1::verification_only();
    let (output_key, _parity) = internal_key
        .add_tweak(&secp, &scalar)
        .map_err(|e| CoinError::InvalidTweak(format!("point addition failed: {e}")))?;

    Ok(output_key)
}

/// Turn a coin into a signable input descriptor.
///
/// Silent-payment coins (those with a tweak) pay to `spend key + tweak * G`
/// as a version 1 witness program and carry the untweaked key as the internal
/// key. Other coins spend the script their address decodes to on `network`.
pub fn build_input(
    coin: &Coin,
    network: BtcNetwork,
    spend_public_key: &[u8],
) -> Result<InputDescriptor, CoinError> {
    let spend_key = x_only_spend_key(spend_public_key)?;
    let outpoint = coin.outpoint();

    let (script_pubkey, internal_key) = match coin.tweak() {
        Some(tweak) => {
            let output_key = tweak_spend_key(spend_key, tweak)?;
            debug!(%outpoint, %network, "building tweaked taproot input");
            (taproot_output_script(output_key), Some(spend_key))
        }
        None => {
            let script = decode_address_script(coin.address(), network)?;
            debug!(%outpoint, %network, "building input from address script");
            (script, None)
        }
    };

    Ok(InputDescriptor {
        outpoint,
        witness_utxo: TxOut {
            value: coin.value(),
            script_pubkey,
        },
        internal_key,
    })
}
