//! Trade Engine
//!
//! Polls the aggregator for stable → token → stable round trips over the
//! route map window and executes the ones that come back with more than
//! they started with.
//!
//! Per pass: snapshot state, check the wallet balance, then for every mint
//! quote out, quote back, decide, and on profit ensure the token account,
//! submit both legs and report.

use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::chain::ChainGateway;
use crate::config::Config;
use crate::error::{ArbitrageError, ArbitrageResult};
use crate::jupiter::QuoteSource;
use crate::notify::Notifier;
use crate::route_map::RouteMap;
use crate::state::{SharedState, Snapshot};
use crate::types::{
    profit_if_profitable, to_display_units, LegDirection, LegResult, MintOutcome, PassSummary,
    Route, TradeReport,
};

pub const LOW_BALANCE_WARNING: &str = "Warning: Your wallet balance is low!";

/// Tunables of the trade loop
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub stable_mint: String,
    /// Only the first `mint_window` route map entries are scanned
    pub mint_window: usize,
    pub low_balance_threshold: u64,
    pub pass_delay: Duration,
}

impl EngineParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            stable_mint: config.stable_mint.clone(),
            mint_window: config.mint_window,
            low_balance_threshold: config.low_balance_threshold,
            pass_delay: Duration::from_millis(config.pass_delay_ms),
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct TradeEngine {
    quotes: Arc<dyn QuoteSource>,
    gateway: Arc<dyn ChainGateway>,
    notifier: Arc<dyn Notifier>,
    route_map: RouteMap,
    state: SharedState,
    params: EngineParams,
}

fn parse_mint(mint: &str) -> ArbitrageResult<Pubkey> {
    Pubkey::from_str(mint).map_err(|e| ArbitrageError::InvalidMint(format!("{}: {}", mint, e)))
}

impl TradeEngine {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        gateway: Arc<dyn ChainGateway>,
        notifier: Arc<dyn Notifier>,
        route_map: RouteMap,
        state: SharedState,
        params: EngineParams,
    ) -> ArbitrageResult<Self> {
        parse_mint(&params.stable_mint)
            .map_err(|e| ArbitrageError::Config(format!("stable mint: {}", e)))?;
        Ok(Self {
            quotes,
            gateway,
            notifier,
            route_map,
            state,
            params,
        })
    }

    /// Runs passes until a fatal error, which is returned
    pub async fn run(&self) -> ArbitrageError {
        info!(
            "🤖 Trade loop started ({} of {} mints per pass)",
            self.params.mint_window.min(self.route_map.len()),
            self.route_map.len()
        );

        let mut pass = 0u64;
        let mut executed_total = 0usize;

        loop {
            pass += 1;
            match self.run_pass().await {
                Ok(summary) => {
                    executed_total += summary.executed;
                    debug!("Pass {} complete: {:?}", pass, summary);
                    if pass % 10 == 0 {
                        info!(
                            "📊 Status - Passes: {}, Trades executed: {}",
                            pass, executed_total
                        );
                    }
                }
                Err(e) => {
                    error!("❌ Trade loop aborted on pass {}: {}", pass, e);
                    return e;
                }
            }

            if self.params.pass_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.params.pass_delay).await;
            }
        }
    }

    /// One sweep over the route map window; `Err` only for fatal errors
    pub async fn run_pass(&self) -> ArbitrageResult<PassSummary> {
        let snapshot = self.state.read().await.snapshot();
        let mut summary = PassSummary::default();

        let Some(balance) = self.gateway.get_balance(&snapshot.pubkey()).await else {
            warn!("Wallet balance unknown, skipping pass");
            return Ok(summary);
        };
        summary.balance_known = true;

        if balance < self.params.low_balance_threshold {
            warn!(
                "⚠️ Wallet balance {} below threshold {}",
                balance, self.params.low_balance_threshold
            );
            self.notify(LOW_BALANCE_WARNING).await;
            summary.low_balance_warned = true;
        }

        info!("🔎 Scanning round trips for {} base units...", snapshot.trade_amount);
        for mint in self.route_map.window(self.params.mint_window) {
            let outcome = match self.process_mint(&snapshot, mint).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping mint {}: {}", mint, e);
                    MintOutcome::Failed(e)
                }
            };
            summary.record(&outcome);
        }

        Ok(summary)
    }

    async fn process_mint(&self, snapshot: &Snapshot, mint: &str) -> ArbitrageResult<MintOutcome> {
        let stable = self.params.stable_mint.as_str();
        let amount = snapshot.trade_amount;

        let Some(forward) = self.quotes.get_quote(stable, mint, amount).await? else {
            return Ok(MintOutcome::NoForwardRoute);
        };
        let Some(reverse) = self
            .quotes
            .get_quote(mint, stable, forward.other_amount_threshold)
            .await?
        else {
            return Ok(MintOutcome::NoReverseRoute);
        };

        let reverse_out_amount = reverse.other_amount_threshold;
        let Some(profit_atoms) = profit_if_profitable(amount, reverse_out_amount) else {
            return Ok(MintOutcome::Unprofitable { reverse_out_amount });
        };

        info!(
            "💰 Profitable round trip via {}: {} → {} (+{})",
            mint, amount, reverse_out_amount, profit_atoms
        );

        let mint_pubkey = parse_mint(mint)?;
        self.ensure_token_account(snapshot, &mint_pubkey).await?;

        let forward_leg = self.submit_leg(snapshot, LegDirection::Forward, &forward).await?;
        if !forward_leg.is_clean() {
            return Ok(self.leg_failed(mint, LegDirection::Forward, forward_leg).await);
        }

        let reverse_leg = self.submit_leg(snapshot, LegDirection::Reverse, &reverse).await?;
        if !reverse_leg.is_clean() {
            return Ok(self.leg_failed(mint, LegDirection::Reverse, reverse_leg).await);
        }

        let signatures = forward_leg
            .submitted
            .into_iter()
            .chain(reverse_leg.submitted)
            .map(|(_, signature)| signature)
            .collect();

        let report = TradeReport {
            mint: mint.to_string(),
            trade_amount: amount,
            reverse_out_amount,
            profit_atoms,
            profit: to_display_units(profit_atoms),
            signatures,
            executed_at: Utc::now(),
        };
        info!("✅ Round trip via {} submitted, profit {}", mint, report.profit);
        self.notify(&report.notification()).await;

        Ok(MintOutcome::Executed(report))
    }

    /// A failed lookup abandons the mint; a failed creation is logged and the
    /// swap goes ahead, the setup transaction may still create the account
    async fn ensure_token_account(&self, snapshot: &Snapshot, mint: &Pubkey) -> ArbitrageResult<()> {
        let owner = snapshot.wallet.pubkey();
        if self.gateway.account_exists(&owner, mint).await? {
            debug!("Associated token account exists for {}", mint);
            return Ok(());
        }

        if let Err(e) = self
            .gateway
            .create_associated_account(&snapshot.wallet, mint)
            .await
        {
            warn!("Continuing without associated token account for {}: {}", mint, e);
        }
        Ok(())
    }

    /// Submits every present stage independently; a rejected stage does not stop the next one
    async fn submit_leg(
        &self,
        snapshot: &Snapshot,
        direction: LegDirection,
        route: &Route,
    ) -> ArbitrageResult<LegResult> {
        let user_public_key = snapshot.pubkey().to_string();
        let transactions = self
            .quotes
            .get_swap_transactions(route, &user_public_key)
            .await?;

        let stages = transactions.stages();
        if stages.is_empty() {
            return Err(ArbitrageError::Decode(format!(
                "swap response for {} leg carried no transactions",
                direction
            )));
        }

        let mut result = LegResult::default();
        for (stage, raw) in stages {
            match self.gateway.submit(&snapshot.wallet, raw).await {
                Ok(signature) => {
                    debug!("{} {} transaction sent: {}", direction, stage, signature);
                    result.submitted.push((stage, signature.to_string()));
                }
                Err(e) => {
                    warn!(
                        "Error occurred at execution of {} {} transaction: {}",
                        direction, stage, e
                    );
                    result.failed.push((stage, e.to_string()));
                }
            }
        }
        Ok(result)
    }

    async fn leg_failed(&self, mint: &str, direction: LegDirection, result: LegResult) -> MintOutcome {
        let stages: Vec<&str> = result.failed.iter().map(|(stage, _)| *stage).collect();
        self.notify(&format!(
            "Trade via {} failed on the {} leg ({})",
            mint,
            direction,
            stages.join(", ")
        ))
        .await;
        MintOutcome::LegFailed { direction, result }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send_text(text).await {
            warn!("Failed to deliver notification: {}", e);
        }
    }
}
