pub mod details;
pub mod docket;
pub mod document;
pub mod headers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use indicatif::ProgressBar;
use regsgov_lib::validation;
use regsgov_lib::{CancelFlag, Client, Harvester, PageLimits, Pipeline, QuotaGate};

use crate::output;

/// Connection, quota and paging options shared by every subcommand.
#[derive(Args)]
pub struct ApiArgs {
    /// Regulations.gov API key
    #[arg(long, env = "REGULATIONS_GOV_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "REGSGOV_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Minutes to wait between checks once the hourly quota is spent
    #[arg(long, default_value = "20", global = true)]
    pub poll_minutes: u64,

    /// Records per page (5-250)
    #[arg(long, default_value = "250", global = true)]
    pub page_size: u32,

    /// Pages per query before advancing the cursor (1-20)
    #[arg(long, default_value = "20", global = true)]
    pub max_pages: u32,

    /// Pace requests to at most this many per rolling hour
    #[arg(long, global = true)]
    pub hourly_budget: Option<u64>,
}

impl ApiArgs {
    /// Build a pipeline whose progress is shown on `spinner`.
    pub fn pipeline(&self, cancel: CancelFlag, spinner: &ProgressBar) -> Result<Pipeline> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            anyhow!("No API key. Pass --api-key or set REGULATIONS_GOV_API_KEY (a .env file works too)")
        })?;
        let api_key = validation::validate_api_key(api_key)?;
        let limits = PageLimits::new(self.page_size, self.max_pages)?;
        if self.poll_minutes == 0 {
            return Err(anyhow!("--poll-minutes must be at least 1"));
        }

        let client = match self.base_url.as_deref() {
            Some(url) => Client::with_base_url(url, api_key)?,
            None => Client::new(api_key)?,
        };

        let mut gate = QuotaGate::new(Duration::from_secs(self.poll_minutes * 60));
        if let Some(budget) = self.hourly_budget {
            if budget == 0 {
                return Err(anyhow!("--hourly-budget must be at least 1"));
            }
            gate = gate.with_hourly_budget(budget);
        }

        let harvester = Harvester::new(client)
            .with_cancel(cancel)
            .with_gate(gate)
            .with_limits(limits)
            .with_progress(Arc::new(output::spinner_progress(spinner.clone())));
        Ok(Pipeline::new(harvester))
    }
}
