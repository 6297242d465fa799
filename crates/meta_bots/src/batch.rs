//! Runs the two-way measurement over every monitored token and ships the rows per network.

use anyhow::Context;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use meta_common::constants::SIZE_MULTIPLIER;
use meta_dex::{measurement::measure_two_way, MeasurementSession};
use meta_integration::{IntegrationError, ResultSink};
use meta_model::{TokenList, TokenReport, TwoWayMeasurement};
use meta_util::{ether::address_from_str, time::utc_now, Quantity};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    /// Network name and the reason it was abandoned.
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct BatchDriver<S> {
    session: S,
    sink: Arc<dyn ResultSink>,
    clock: fn() -> String,
}

impl<S: MeasurementSession> BatchDriver<S> {
    pub fn new(session: S, sink: Arc<dyn ResultSink>) -> Self {
        BatchDriver { session, sink, clock: utc_now }
    }

    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Networks in list order; a failing network is recorded and the next one still runs.
    pub async fn run(&mut self, lists: &[TokenList]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for list in lists {
            if list.tokens.is_empty() {
                info!("skipping {}: no tokens", list.network);
                summary.skipped.push(list.network.clone());
                continue;
            }
            info!("processing {} ({} tokens)", list.network, list.tokens.len());
            match self.run_network(list).await {
                Ok(rows) => {
                    info!("{} done, {} rows written", list.network, rows);
                    summary.completed.push(list.network.clone());
                }
                Err(e) => {
                    error!("{} aborted: {:#}", list.network, e);
                    summary.failed.push((list.network.clone(), format!("{:#}", e)));
                }
            }
        }
        summary
    }

    async fn run_network(&mut self, list: &TokenList) -> anyhow::Result<usize> {
        let network = self
            .session
            .reset_to_network(&list.network)
            .await
            .with_context(|| format!("resetting to {}", list.network))?;

        let mut rows = Vec::with_capacity(list.tokens.len());
        let mut dirty = false;
        for (i, token) in list.tokens.iter().enumerate() {
            let Some(address) = address_from_str(token) else {
                warn!("`{}` on {} is not an address, writing an error row", token, network);
                rows.push(self.unmeasured(token)?.into_row());
                continue;
            };
            if dirty {
                self.session
                    .reset_to_network(&list.network)
                    .await
                    .with_context(|| format!("re-forking {}", network))?;
            }
            info!("token {} of {}: {:?}", i + 1, list.tokens.len(), address);
            let report = self.measure_token(address).await?;
            dirty = true;
            rows.push(report.into_row());
        }

        let n = rows.len();
        self.sink
            .append_rows(&network, rows)
            .await
            .with_context(|| format!("writing {} rows for {}", n, network))?;
        Ok(n)
    }

    /// Row for a token cell that could not be measured at all.
    fn unmeasured(&self, token: &str) -> anyhow::Result<TokenReport> {
        let base_amount = self.session.base_amount().context("no network bound")?;
        debug!("no measurement for `{}`", token);
        Ok(TokenReport {
            timestamp: (self.clock)(),
            symbol: None,
            trade_amount: base_amount,
            base: TwoWayMeasurement::failed(),
            scaled: TwoWayMeasurement::failed(),
            price_per_token_diff: Quantity::Failed,
            price_per_token_diff_pct: Quantity::Failed,
            route_length: None,
        })
    }

    async fn measure_token(&mut self, token: Address) -> anyhow::Result<TokenReport> {
        let base_amount = self.session.base_amount().context("no network bound")?;
        let scaled_amount = base_amount
            .checked_mul(U256::from(SIZE_MULTIPLIER))
            .context("scaled trade amount overflows")?;
        let timestamp = (self.clock)();

        let base = measure_two_way(&mut self.session, token, base_amount).await;
        self.session.refresh().await.context("restoring fork before the scaled trade")?;
        let scaled = measure_two_way(&mut self.session, token, scaled_amount).await;

        let route_length = match self.session.route_length(token).await {
            Ok(len) => Some(len),
            Err(e) => {
                warn!("route length of {:?} unavailable: {}", token, e);
                None
            }
        };
        let symbol = match self.session.token_symbol(token).await {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                warn!("symbol of {:?} unavailable: {}", token, e);
                None
            }
        };

        let price_per_token_diff = base.price_per_token - scaled.price_per_token;
        Ok(TokenReport {
            timestamp,
            symbol,
            trade_amount: base_amount,
            base,
            scaled,
            price_per_token_diff,
            price_per_token_diff_pct: price_per_token_diff / base.price_per_token,
            route_length,
        })
    }
}

/// Sink for dry runs: rows only go to the log.
pub struct LogSink;

#[async_trait]
impl ResultSink for LogSink {
    async fn append_rows(&self, network: &str, rows: Vec<Vec<Value>>) -> Result<(), IntegrationError> {
        for row in rows {
            info!("{}: {}", network, serde_json::Value::Array(row));
        }
        Ok(())
    }
}
