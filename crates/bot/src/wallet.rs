//! Wallet Loading
//!
//! Builds the signing keypair from the `WALLET_SECRET_KEY` secret, either
//! base58 or the JSON byte array written by `solana-keygen`.

use anyhow::{anyhow, Result};
use solana_sdk::signature::{Keypair, Signer};
use tracing::{info, warn};

/// Keypair from the configured secret, or a fresh one when none is set
pub fn load(secret: Option<&str>) -> Result<Keypair> {
    let keypair = match secret {
        Some(secret) => parse_keypair(secret)
            .map_err(|e| anyhow!("Failed to parse WALLET_SECRET_KEY: {}", e))?,
        None => {
            warn!("WALLET_SECRET_KEY not set. Generated a new wallet, fund it before trading.");
            Keypair::new()
        }
    };

    info!("👛 Wallet loaded: {}", keypair.pubkey());
    Ok(keypair)
}

pub fn parse_keypair(value: &str) -> Result<Keypair> {
    let value = value.trim();
    if value.starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(value)?;
        return Keypair::from_bytes(&bytes).map_err(|e| anyhow!("Invalid keypair bytes: {}", e));
    }

    let decoded = bs58::decode(value).into_vec()?;
    Keypair::from_bytes(&decoded).map_err(|e| anyhow!("Invalid base58 keypair: {}", e))
}
