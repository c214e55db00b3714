//! Shared trading state
//!
//! The wallet and trade amount are written by chat commands and read by the
//! trade loop. One `RwLock` guards both; the loop copies a [`Snapshot`] at
//! the start of each pass so a change lands on the next pass.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedState = Arc<RwLock<TradingState>>;

pub struct TradingState {
    wallet: Arc<Keypair>,
    trade_amount: u64,
}

/// Consistent view of the state for one pass
#[derive(Clone)]
pub struct Snapshot {
    pub wallet: Arc<Keypair>,
    pub trade_amount: u64,
}

impl TradingState {
    pub fn new(wallet: Keypair, trade_amount: u64) -> Self {
        Self {
            wallet: Arc::new(wallet),
            trade_amount,
        }
    }

    pub fn shared(wallet: Keypair, trade_amount: u64) -> SharedState {
        Arc::new(RwLock::new(Self::new(wallet, trade_amount)))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            wallet: Arc::clone(&self.wallet),
            trade_amount: self.trade_amount,
        }
    }

    pub fn trade_amount(&self) -> u64 {
        self.trade_amount
    }

    pub fn set_trade_amount(&mut self, amount: u64) {
        self.trade_amount = amount;
    }

    pub fn wallet_pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    /// Swap in a new wallet; the previous keypair is dropped once no pass holds it
    pub fn replace_wallet(&mut self, wallet: Keypair) -> Pubkey {
        let pubkey = wallet.pubkey();
        self.wallet = Arc::new(wallet);
        pubkey
    }
}

impl Snapshot {
    pub fn pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }
}
