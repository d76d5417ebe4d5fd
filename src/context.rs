use super::entity::TimeStamp;
use super::utils;
use chrono::Utc;

/// Identity and time of the proposal being executed.
///
/// The timestamp is chosen by the submitting client and travels with the
/// proposal, so every node validating the transaction stamps identical
/// `createdAt`/`updatedAt` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub tx_id: String,
    pub timestamp: TimeStamp<Utc>,
}

impl TxContext {
    pub fn new(tx_id: impl Into<String>, timestamp: TimeStamp<Utc>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
        }
    }

    /// Client-side helper: a fresh nonce-derived id at the current time.
    pub fn generate(function: &str, args: &[&str]) -> anyhow::Result<Self> {
        let nonce = utils::new_uuid_to_bech32("nonce_")?;
        Ok(Self::new(
            utils::derive_tx_id(&nonce, function, args),
            TimeStamp::new(),
        ))
    }
}
