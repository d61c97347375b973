use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::key::{TweakedPublicKey, XOnlyPublicKey};
use bitcoin::script::ScriptBuf;

use crate::error::CoinError;
use crate::network::BtcNetwork;

/// Decode an address string into the output script it commits to.
///
/// Supports every standard address form the `bitcoin` crate understands
/// (P2PKH, P2SH, P2WPKH, P2WSH, P2TR). The address must belong to `network`;
/// testnet and signet share the `tb` prefix and are interchangeable here.
pub fn decode_address_script(address: &str, network: BtcNetwork) -> Result<ScriptBuf, CoinError> {
    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| CoinError::UnsupportedAddress(format!("failed to parse address: {e}")))?;

    let checked = parsed.require_network(network.to_bitcoin_network()).map_err(|e| {
        CoinError::UnsupportedAddress(format!("address not valid for {network}: {e}"))
    })?;

    Ok(checked.script_pubkey())
}

/// Build the version 1 witness script paying directly to `output_key`.
///
/// The key is used as-is: `OP_1 <32-byte key>`, no BIP-341 commitment is
/// applied on top. Silent-payment outputs are already tweaked by the sender.
pub fn taproot_output_script(output_key: XOnlyPublicKey) -> ScriptBuf {
    ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(output_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
    use bitcoin::{CompressedPublicKey, Network};

    const GENERATOR_X: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn p2wpkh_mainnet_test_vector() {
        let script =
            decode_address_script("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", BtcNetwork::Mainnet)
                .unwrap();
        assert_eq!(
            hex::encode(script.as_bytes()),
            "0014751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn p2wpkh_testnet_test_vector() {
        let script =
            decode_address_script("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx", BtcNetwork::Testnet)
                .unwrap();
        assert_eq!(
            hex::encode(script.as_bytes()),
            "0014751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn testnet_address_accepted_on_signet() {
        let result =
            decode_address_script("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx", BtcNetwork::Signet);
        assert!(result.is_ok());
    }

    #[test]
    fn p2pkh_genesis_address() {
        let script =
            decode_address_script("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", BtcNetwork::Mainnet)
                .unwrap();
        assert_eq!(
            hex::encode(script.as_bytes()),
            "76a91462e907b15cbf27d5425399ebf6f0fb50ebb88f1888ac"
        );
    }

    #[test]
    fn matches_independently_derived_p2tr_script() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let (internal, _) = PublicKey::from_secret_key(&secp, &secret_key).x_only_public_key();
        let address = Address::p2tr(&secp, internal, None, Network::Regtest);

        let script = decode_address_script(&address.to_string(), BtcNetwork::Regtest).unwrap();
        assert_eq!(script, address.script_pubkey());
        assert!(script.is_p2tr());
    }

    #[test]
    fn matches_independently_derived_p2wpkh_script() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0xcd; 32]).unwrap();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = Address::p2wpkh(&CompressedPublicKey(public_key), Network::Testnet);

        let script = decode_address_script(&address.to_string(), BtcNetwork::Testnet).unwrap();
        assert_eq!(script, address.script_pubkey());
    }

    #[test]
    fn mainnet_address_on_testnet_is_unsupported() {
        let err =
            decode_address_script("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4", BtcNetwork::Testnet)
                .unwrap_err();
        assert!(matches!(err, CoinError::UnsupportedAddress(_)));
    }

    #[test]
    fn garbage_address_is_unsupported() {
        let err = decode_address_script("notanaddress!!!", BtcNetwork::Mainnet).unwrap_err();
        assert!(matches!(err, CoinError::UnsupportedAddress(_)));
    }

    #[test]
    fn bad_checksum_is_unsupported() {
        let err =
            decode_address_script("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5", BtcNetwork::Mainnet)
                .unwrap_err();
        assert!(matches!(err, CoinError::UnsupportedAddress(_)));
    }

    #[test]
    fn taproot_script_layout() {
        let key: XOnlyPublicKey = GENERATOR_X.parse().unwrap();
        let script = taproot_output_script(key);
        let bytes = script.as_bytes();

        assert_eq!(bytes.len(), 34);
        assert_eq!(bytes[0], 0x51);
        assert_eq!(bytes[1], 0x20);
        assert_eq!(&bytes[2..], &key.serialize());
    }
}
