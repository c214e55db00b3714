//! Core types for the round-trip arbitrage system

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::USDC_DECIMALS;
use crate::error::{ArbitrageError, ArbitrageResult};

/// First-ranked route of an aggregator quote
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Output amount after slippage (`otherAmountThreshold`)
    pub other_amount_threshold: u64,
    /// Route object exactly as returned, handed back on swap requests
    pub payload: Value,
}

impl Route {
    pub fn from_payload(payload: Value) -> ArbitrageResult<Self> {
        let threshold = payload
            .get("otherAmountThreshold")
            .ok_or_else(|| ArbitrageError::Decode("route without otherAmountThreshold".into()))?;
        let other_amount_threshold = amount_from_json(threshold)?;
        Ok(Self {
            other_amount_threshold,
            payload,
        })
    }
}

/// The aggregator emits amounts as integers or decimal strings depending on version
fn amount_from_json(value: &Value) -> ArbitrageResult<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ArbitrageError::Decode(format!("amount is not a u64: {}", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| ArbitrageError::Decode(format!("amount is not a u64: {:?}", s))),
        other => Err(ArbitrageError::Decode(format!("unexpected amount value: {}", other))),
    }
}

/// `GET /quote` response body
#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

impl QuoteResponse {
    /// Best route, `None` when the aggregator found nothing
    pub fn best_route(self) -> ArbitrageResult<Option<Route>> {
        match self.data.and_then(|routes| routes.into_iter().next()) {
            Some(payload) => Route::from_payload(payload).map(Some),
            None => Ok(None),
        }
    }
}

/// `POST /swap` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest<'a> {
    pub route: &'a Value,
    pub user_public_key: String,
    #[serde(rename = "wrapUnwrapSOL")]
    pub wrap_unwrap_sol: bool,
}

/// Serialized transactions of one swap leg, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransactions {
    pub setup_transaction: Option<String>,
    pub swap_transaction: Option<String>,
    pub cleanup_transaction: Option<String>,
}

impl SwapTransactions {
    /// Present stages in submission order
    pub fn stages(&self) -> Vec<(&'static str, &str)> {
        [
            ("setup", &self.setup_transaction),
            ("swap", &self.swap_transaction),
            ("cleanup", &self.cleanup_transaction),
        ]
        .into_iter()
        .filter_map(|(name, tx)| {
            tx.as_deref()
                .filter(|raw| !raw.is_empty())
                .map(|raw| (name, raw))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages().is_empty()
    }
}

/// Which half of the round trip a leg is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDirection {
    Forward,
    Reverse,
}

impl std::fmt::Display for LegDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegDirection::Forward => write!(f, "stable→token"),
            LegDirection::Reverse => write!(f, "token→stable"),
        }
    }
}

/// Submission result of one leg
#[derive(Debug, Clone, Default)]
pub struct LegResult {
    /// (stage, signature) of every accepted transaction
    pub submitted: Vec<(&'static str, String)>,
    /// (stage, error) of every rejected transaction
    pub failed: Vec<(&'static str, String)>,
}

impl LegResult {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An executed round trip
#[derive(Debug, Clone)]
pub struct TradeReport {
    pub mint: String,
    pub trade_amount: u64,
    pub reverse_out_amount: u64,
    /// Profit in stablecoin base units
    pub profit_atoms: u64,
    /// Profit in display units
    pub profit: Decimal,
    pub signatures: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

impl TradeReport {
    pub fn notification(&self) -> String {
        format!("Approx Profit made: {}", self.profit)
    }
}

/// What happened to a single mint during a pass
#[derive(Debug)]
pub enum MintOutcome {
    NoForwardRoute,
    NoReverseRoute,
    Unprofitable { reverse_out_amount: u64 },
    Executed(TradeReport),
    LegFailed { direction: LegDirection, result: LegResult },
    Failed(ArbitrageError),
}

/// Counters for one pass over the route map window
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    /// False when the balance check failed and the pass was skipped
    pub balance_known: bool,
    pub low_balance_warned: bool,
    pub mints_scanned: usize,
    pub no_route: usize,
    pub unprofitable: usize,
    pub executed: usize,
    pub failed: usize,
}

impl PassSummary {
    pub fn record(&mut self, outcome: &MintOutcome) {
        self.mints_scanned += 1;
        match outcome {
            MintOutcome::NoForwardRoute | MintOutcome::NoReverseRoute => self.no_route += 1,
            MintOutcome::Unprofitable { .. } => self.unprofitable += 1,
            MintOutcome::Executed(_) => self.executed += 1,
            MintOutcome::LegFailed { .. } | MintOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Profit in base units when the round trip strictly beats the stake
pub fn profit_if_profitable(trade_amount: u64, reverse_out_amount: u64) -> Option<u64> {
    reverse_out_amount
        .checked_sub(trade_amount)
        .filter(|profit| *profit > 0)
}

/// Convert stablecoin base units to display units
pub fn to_display_units(atoms: u64) -> Decimal {
    Decimal::from_i128_with_scale(atoms as i128, USDC_DECIMALS).normalize()
}
