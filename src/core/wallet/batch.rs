//! Sequential batch generation with progress / ETA reporting.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::core::config::GeneratorConfig;
use crate::core::domain::{Chain, WalletBatch};
use crate::core::errors::WalletGenError;
use crate::core::wallet::provider::{provider_for, KeyProvider};
use crate::security::redaction::shorten;

/// Snapshot emitted after every generated wallet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub remaining: Duration,
}

impl Progress {
    /// Linear extrapolation: `elapsed / completed * (total - completed)`.
    pub fn estimate(completed: usize, total: usize, elapsed: Duration) -> Self {
        let remaining = if completed == 0 || completed >= total {
            Duration::ZERO
        } else {
            elapsed.div_f64(completed as f64).mul_f64((total - completed) as f64)
        };
        Self { completed, total, elapsed, remaining }
    }
}

/// Drives one provider `count` times in a row.
pub struct BatchGenerator {
    provider: Box<dyn KeyProvider>,
    pacing: Duration,
}

impl BatchGenerator {
    pub fn new(provider: Box<dyn KeyProvider>, pacing: Duration) -> Self {
        Self { provider, pacing }
    }

    pub fn from_config(chain: Chain, config: &GeneratorConfig) -> Self {
        Self::new(provider_for(chain, config), Duration::from_millis(config.pacing_ms))
    }

    pub fn chain(&self) -> Chain {
        self.provider.chain()
    }

    /// Generate `count` wallets, calling `on_progress` after each one.
    ///
    /// Any provider failure aborts the run and drops the wallets generated so far.
    pub async fn run<F>(&self, count: u32, mut on_progress: F) -> Result<WalletBatch, WalletGenError>
    where
        F: FnMut(&Progress),
    {
        if count == 0 {
            return Err(WalletGenError::InvalidCount("count must be greater than 0".into()));
        }

        let total = count as usize;
        let chain = self.chain();
        info!("Generating {} {} wallet(s)", total, chain);

        let started = Instant::now();
        let mut batch = WalletBatch::with_capacity(chain, total);

        for index in 0..total {
            let record = self.provider.generate().map_err(|e| {
                warn!(completed = index, "Wallet generation failed, discarding batch");
                match e {
                    WalletGenError::Generation { reason, .. } => {
                        WalletGenError::Generation { completed: index, reason }
                    }
                    other => WalletGenError::Generation { completed: index, reason: other.to_string() },
                }
            })?;
            debug!(index, address = %shorten(record.address()), "Wallet generated");
            batch.push(record);

            let progress = Progress::estimate(index + 1, total, started.elapsed());
            on_progress(&progress);

            if index + 1 < total {
                if self.pacing.is_zero() {
                    // still give Ctrl-C a chance to be observed
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(self.pacing).await;
                }
            }
        }

        info!("Generated {} {} wallet(s) in {:.1}s", total, chain, started.elapsed().as_secs_f64());
        Ok(batch)
    }
}

/// Parse `chain`, then generate `count` wallets with the configured provider.
///
/// An unknown chain fails with `InvalidChain` before anything is generated.
pub async fn generate(
    chain: &str,
    count: u32,
    config: &GeneratorConfig,
) -> Result<WalletBatch, WalletGenError> {
    let chain: Chain = chain.parse()?;
    BatchGenerator::from_config(chain, config).run(count, |_| {}).await
}
