//! Utility functions for identifiers and hashing

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Transaction id in the form a submitting client derives it: the sha256 hex
/// digest of the proposal nonce followed by the invoked function and arguments.
pub fn derive_tx_id(nonce: &str, function: &str, args: &[&str]) -> String {
    let mut preimage = String::with_capacity(nonce.len() + function.len() + 16);
    preimage.push_str(nonce);
    preimage.push('\0');
    preimage.push_str(function);
    for arg in args {
        preimage.push('\0');
        preimage.push_str(arg);
    }
    sha256::digest(preimage)
}
