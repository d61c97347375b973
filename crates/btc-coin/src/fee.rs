use bitcoin::blockdata::constants::WITNESS_SCALE_FACTOR;
use bitcoin::{Amount, FeeRate};

use crate::coin::Coin;

/// Non-witness bytes of an input: prevout hash (32) + index (4) + sequence (4)
/// + empty script_sig length (1).
const INPUT_BASE_BYTES: u64 = 32 + 4 + 4 + 1;

/// Largest DER signature plus sighash byte.
const MAX_SIGNATURE_BYTES: u64 = 73;

const COMPRESSED_PUBKEY_BYTES: u64 = 33;

/// Witness bytes: item count (1) + length-prefixed signature + length-prefixed key.
const WITNESS_BYTES: u64 = 1 + (1 + MAX_SIGNATURE_BYTES) + (1 + COMPRESSED_PUBKEY_BYTES);

/// Estimated virtual size, in vbytes, of the input that spends `coin`.
///
/// Every coin is sized as a signature-plus-key witness spend, 69 vbytes,
/// including tweaked taproot coins whose key-path witness is a lone Schnorr
/// signature. The estimate is therefore conservative for those.
pub fn estimate_spending_size(_coin: &Coin) -> u64 {
    INPUT_BASE_BYTES + WITNESS_BYTES.div_ceil(WITNESS_SCALE_FACTOR as u64)
}

/// Estimated fee for spending `coin` at `fee_rate` fee units per vbyte.
///
/// Not rounded; the caller rounds for display or transaction construction.
pub fn estimate_spending_fee(coin: &Coin, fee_rate: f64) -> f64 {
    estimate_spending_size(coin) as f64 * fee_rate
}

/// Same estimate priced with a `bitcoin::FeeRate`, in whole satoshis.
///
/// Returns `None` on overflow.
pub fn estimate_spending_fee_amount(coin: &Coin, fee_rate: FeeRate) -> Option<Amount> {
    fee_rate.fee_vb(estimate_spending_size(coin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_coin(tweak: Option<&str>) -> Coin {
        let mut builder = Coin::builder()
            .txid("a".repeat(64))
            .vout(0)
            .value_sat(100_000)
            .address("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx");
        if let Some(tweak) = tweak {
            builder = builder.tweak(tweak);
        }
        builder.build().unwrap()
    }

    #[test]
    fn witness_breakdown() {
        assert_eq!(INPUT_BASE_BYTES, 41);
        assert_eq!(WITNESS_BYTES, 109);
        assert_eq!(WITNESS_SCALE_FACTOR, 4);
    }

    #[test]
    fn spending_size_is_69_vbytes() {
        assert_eq!(estimate_spending_size(&make_coin(None)), 69);
    }

    #[test]
    fn tweaked_coin_uses_same_size() {
        let tweaked = make_coin(Some(&"01".repeat(32)));
        assert_eq!(estimate_spending_size(&tweaked), 69);
    }

    #[test]
    fn fee_at_five_sat_per_vbyte() {
        assert_eq!(estimate_spending_fee(&make_coin(None), 5.0), 345.0);
    }

    #[test]
    fn fractional_fee_rate_is_not_rounded() {
        let fee = estimate_spending_fee(&make_coin(None), 1.5);
        assert!((fee - 103.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_fee_rate() {
        assert_eq!(estimate_spending_fee(&make_coin(None), 0.0), 0.0);
    }

    #[test]
    fn fee_amount_with_bitcoin_fee_rate() {
        let rate = FeeRate::from_sat_per_vb(5).unwrap();
        assert_eq!(
            estimate_spending_fee_amount(&make_coin(None), rate),
            Some(Amount::from_sat(345))
        );
    }

    #[test]
    fn fee_amount_overflow_is_none() {
        assert_eq!(estimate_spending_fee_amount(&make_coin(None), FeeRate::MAX), None);
    }

    proptest! {
        #[test]
        fn fee_is_linear_in_rate(rate in 0u32..1_000_000u32) {
            let coin = make_coin(None);
            let fee = estimate_spending_fee(&coin, f64::from(rate));
            prop_assert_eq!(fee, 69.0 * f64::from(rate));
        }

        #[test]
        fn fee_scales_with_any_non_negative_rate(rate in 0.0f64..10_000.0f64) {
            let coin = make_coin(Some(&"02".repeat(32)));
            prop_assert_eq!(estimate_spending_fee(&coin, rate), 69.0 * rate);
        }
    }
}
