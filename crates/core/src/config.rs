//! Configuration module for the arbitrage bot

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ArbitrageError, ArbitrageResult};

/// Mainnet USDC mint
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
/// Decimal places of the stablecoin
pub const USDC_DECIMALS: u32 = 6;
/// Smallest USDC units per display unit
pub const USDC_BASE: u64 = 10u64.pow(USDC_DECIMALS);

/// Application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token
    pub telegram_bot_token: String,
    /// Telegram Bot API base URL
    pub telegram_api_url: String,
    /// Long-poll timeout for getUpdates
    pub telegram_poll_timeout_secs: u64,
    /// Base58 or JSON-array wallet secret
    pub wallet_secret_key: Option<String>,
    /// Solana RPC URL
    pub solana_rpc_url: String,
    /// Jupiter quote API base URL
    pub jupiter_api_url: String,
    /// Stablecoin every round trip starts and ends in
    pub stable_mint: String,
    /// Initial trade amount in stablecoin base units
    pub trade_amount: u64,
    /// Lamport balance under which the chat gets a warning
    pub low_balance_threshold: u64,
    /// Slippage tolerance in percent
    pub slippage_pct: Decimal,
    /// Number of route map entries scanned per pass
    pub mint_window: usize,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
    /// Retries handed to the RPC node on sendTransaction
    pub send_max_retries: usize,
    /// Pause between two full passes
    pub pass_delay_ms: u64,
    /// Route map JSON file overriding the embedded list
    pub route_map_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> ArbitrageResult<Self> {
        let defaults = Self::default();
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ArbitrageError::Config("TELEGRAM_BOT_TOKEN not set".to_string()))?;

        Ok(Self {
            telegram_bot_token,
            telegram_api_url: env::var("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
            telegram_poll_timeout_secs: parse_var(
                "TELEGRAM_POLL_TIMEOUT_SECS",
                defaults.telegram_poll_timeout_secs,
            )?,
            wallet_secret_key: env::var("WALLET_SECRET_KEY").ok().filter(|k| !k.is_empty()),
            solana_rpc_url: env::var("SOLANA_RPC_URL").unwrap_or(defaults.solana_rpc_url),
            jupiter_api_url: env::var("JUPITER_API_URL").unwrap_or(defaults.jupiter_api_url),
            stable_mint: env::var("STABLE_MINT").unwrap_or(defaults.stable_mint),
            trade_amount: parse_var("TRADE_AMOUNT", defaults.trade_amount)?,
            low_balance_threshold: parse_var(
                "LOW_BALANCE_THRESHOLD",
                defaults.low_balance_threshold,
            )?,
            slippage_pct: parse_var("SLIPPAGE_PCT", defaults.slippage_pct)?,
            mint_window: parse_var("MINT_WINDOW", defaults.mint_window)?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            send_max_retries: parse_var("SEND_MAX_RETRIES", defaults.send_max_retries)?,
            pass_delay_ms: parse_var("PASS_DELAY_MS", defaults.pass_delay_ms)?,
            route_map_path: env::var("ROUTE_MAP_PATH").ok().filter(|p| !p.is_empty()),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("wallet_secret_key", &self.wallet_secret_key.as_ref().map(|_| "<redacted>"))
            .field("solana_rpc_url", &self.solana_rpc_url)
            .field("jupiter_api_url", &self.jupiter_api_url)
            .field("stable_mint", &self.stable_mint)
            .field("trade_amount", &self.trade_amount)
            .field("low_balance_threshold", &self.low_balance_threshold)
            .field("slippage_pct", &self.slippage_pct)
            .field("mint_window", &self.mint_window)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("send_max_retries", &self.send_max_retries)
            .field("pass_delay_ms", &self.pass_delay_ms)
            .field("route_map_path", &self.route_map_path)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            telegram_poll_timeout_secs: 30,
            wallet_secret_key: None,
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            jupiter_api_url: "https://quote-api.jup.ag/v1".to_string(),
            stable_mint: USDC_MINT.to_string(),
            trade_amount: 5_000_000,
            low_balance_threshold: 1_000_000,
            slippage_pct: Decimal::new(5, 1),
            mint_window: 150,
            http_timeout_secs: 15,
            send_max_retries: 11,
            pass_delay_ms: 0,
            route_map_path: None,
        }
    }
}

/// Parse an optional variable, keeping the default when unset
fn parse_var<T>(name: &str, default: T) -> ArbitrageResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> ArbitrageResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ArbitrageError::Config(format!("invalid {} {:?}: {}", name, raw, e)))
}
