//! Unspent-output model for a command-line Bitcoin wallet.
//!
//! A [`Coin`] is one output the wallet can spend, either an ordinary
//! address output or a silent-payment output whose key is the wallet's spend
//! key plus a tweak. This crate turns coins into signable input descriptors,
//! encodes them for storage, and estimates what spending them costs.
//! Key derivation, scanning, coin selection, signing, and broadcasting live
//! elsewhere.

pub mod address;
pub mod codec;
pub mod coin;
pub mod error;
pub mod fee;
pub mod input;
pub mod network;

pub use coin::{Coin, CoinBuilder, CoinStatus};
pub use error::CoinError;
pub use fee::{estimate_spending_fee, estimate_spending_fee_amount, estimate_spending_size};
pub use input::{build_input, InputDescriptor};
pub use network::BtcNetwork;
