//! Chain Gateway
//!
//! Balance queries, associated token account management and transaction
//! submission against a Solana RPC endpoint.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ArbitrageError, ArbitrageResult};

#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Lamport balance, `None` when the node could not be asked
    async fn get_balance(&self, address: &Pubkey) -> Option<u64>;

    /// Whether the associated token account of (owner, mint) holds state
    async fn account_exists(&self, owner: &Pubkey, mint: &Pubkey) -> ArbitrageResult<bool>;

    async fn create_associated_account(
        &self,
        wallet: &Keypair,
        mint: &Pubkey,
    ) -> ArbitrageResult<Signature>;

    /// Re-sign and send one base64 transaction produced by the aggregator
    async fn submit(&self, wallet: &Keypair, serialized: &str) -> ArbitrageResult<Signature>;
}

pub struct RpcChainGateway {
    client: Arc<RpcClient>,
    send_config: RpcSendTransactionConfig,
}

impl RpcChainGateway {
    pub fn new(rpc_url: &str, max_retries: usize) -> Self {
        let client = RpcClient::new_with_commitment(
            rpc_url.to_string(),
            CommitmentConfig::confirmed(),
        );
        Self {
            client: Arc::new(client),
            send_config: RpcSendTransactionConfig {
                skip_preflight: true,
                max_retries: Some(max_retries),
                ..Default::default()
            },
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.solana_rpc_url, config.send_max_retries)
    }
}

/// base64 → bincode → message re-signed by `wallet`
pub fn decode_and_sign(
    wallet: &Keypair,
    serialized: &str,
) -> ArbitrageResult<VersionedTransaction> {
    let tx_bytes = BASE64_ENGINE.decode(serialized.trim())?;
    let tx: VersionedTransaction = bincode::deserialize(&tx_bytes)?;
    VersionedTransaction::try_new(tx.message, &[wallet])
        .map_err(|e| ArbitrageError::Transaction(format!("signing failed: {}", e)))
}

#[async_trait]
impl ChainGateway for RpcChainGateway {
    async fn get_balance(&self, address: &Pubkey) -> Option<u64> {
        match self.client.get_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Error occurred while getting wallet balance: {}", e);
                None
            }
        }
    }

    async fn account_exists(&self, owner: &Pubkey, mint: &Pubkey) -> ArbitrageResult<bool> {
        let ata = get_associated_token_address(owner, mint);
        let response = self
            .client
            .get_account_with_commitment(&ata, self.client.commitment())
            .await?;
        debug!("Associated token account {} exists: {}", ata, response.value.is_some());
        Ok(response.value.is_some())
    }

    async fn create_associated_account(
        &self,
        wallet: &Keypair,
        mint: &Pubkey,
    ) -> ArbitrageResult<Signature> {
        let owner = wallet.pubkey();
        let instruction =
            create_associated_token_account(&owner, &owner, mint, &spl_token::id());

        let result: ArbitrageResult<Signature> = async {
            let blockhash = self.client.get_latest_blockhash().await?;
            let tx = Transaction::new_signed_with_payer(
                &[instruction],
                Some(&owner),
                &[wallet],
                blockhash,
            );
            self.client
                .send_transaction_with_config(&tx, self.send_config)
                .await
                .map_err(|e| ArbitrageError::Transaction(e.to_string()))
        }
        .await;

        match &result {
            Ok(signature) => info!("🪙 Created associated token account for {}: {}", mint, signature),
            Err(e) => warn!("Error occurred while creating ATA for {}: {}", mint, e),
        }
        result
    }

    async fn submit(&self, wallet: &Keypair, serialized: &str) -> ArbitrageResult<Signature> {
        let signed_tx = decode_and_sign(wallet, serialized)?;
        let signature = self
            .client
            .send_transaction_with_config(&signed_tx, self.send_config)
            .await
            .map_err(|e| ArbitrageError::Transaction(e.to_string()))?;
        info!("📡 Transaction sent: {}", signature);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::{Message, VersionedMessage};
    use solana_sdk::system_instruction;

    #[test]
    fn test_decode_and_sign_resigns_message() {
        let wallet = Keypair::new();
        let ix = system_instruction::transfer(&wallet.pubkey(), &Pubkey::new_unique(), 1);
        let message = Message::new_with_blockhash(&[ix], Some(&wallet.pubkey()), &Hash::new_unique());
        let unsigned = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(message),
        };
        let encoded = BASE64_ENGINE.encode(bincode::serialize(&unsigned).unwrap());

        let signed = decode_and_sign(&wallet, &encoded).unwrap();
        assert_eq!(signed.signatures.len(), 1);
        assert_ne!(signed.signatures[0], Signature::default());
        assert!(signed.verify_with_results().iter().all(|ok| *ok));
    }

    #[test]
    fn test_send_config_skips_preflight() {
        let gateway = RpcChainGateway::from_config(&Config::default());
        assert!(gateway.send_config.skip_preflight);
        assert_eq!(gateway.send_config.max_retries, Some(11));

        let gateway = RpcChainGateway::new("http://127.0.0.1:8899", 3);
        assert_eq!(gateway.send_config.max_retries, Some(3));
        assert_eq!(gateway.client.commitment(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let wallet = Keypair::new();
        assert!(matches!(
            decode_and_sign(&wallet, "not base64!"),
            Err(ArbitrageError::Decode(_))
        ));
        let short = BASE64_ENGINE.encode([1u8, 2, 3]);
        assert!(matches!(decode_and_sign(&wallet, &short), Err(ArbitrageError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_foreign_signer() {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let message = Message::new_with_blockhash(&[ix], Some(&payer.pubkey()), &Hash::new_unique());
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(message),
        };
        let encoded = BASE64_ENGINE.encode(bincode::serialize(&tx).unwrap());

        let stranger = Keypair::new();
        assert!(matches!(
            decode_and_sign(&stranger, &encoded),
            Err(ArbitrageError::Transaction(_))
        ));
    }
}
