//! Ticketing system configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{PoolLimits, RemovalPolicy};

const ENV_PREFIX: &str = "TICKETING_";

const fn default_stop_grace_ms() -> u64 {
    5_000
}

/// Everything an orchestrator needs to build and start a ticket pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketingConfig {
    /// Tickets present when the pool is created.
    pub total_tickets: usize,
    /// Maximum tickets the pool may hold at once.
    pub max_ticket_capacity: usize,
    /// Vendor workers to spawn.
    pub num_vendors: usize,
    /// Customer workers to spawn.
    pub num_customers: usize,
    /// Delay between a vendor's additions, in milliseconds.
    pub ticket_release_interval_ms: u64,
    /// Delay between a customer's retrievals, in milliseconds.
    pub customer_retrieval_interval_ms: u64,
    /// Removal policy for multi-ticket requests.
    #[serde(default)]
    pub removal_policy: RemovalPolicy,
    /// How long `stop` waits for workers, in milliseconds.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            total_tickets: 0,
            max_ticket_capacity: 100,
            num_vendors: 1,
            num_customers: 1,
            ticket_release_interval_ms: 1_000,
            customer_retrieval_interval_ms: 1_000,
            removal_policy: RemovalPolicy::default(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl TicketingConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ticket_capacity == 0 {
            return Err("max_ticket_capacity must be greater than 0".into());
        }
        if self.total_tickets > self.max_ticket_capacity {
            return Err(format!(
                "total_tickets ({}) must not exceed max_ticket_capacity ({})",
                self.total_tickets, self.max_ticket_capacity
            ));
        }
        if self.num_vendors + self.num_customers == 0 {
            return Err("at least one vendor or customer is required".into());
        }
        if self.stop_grace_ms == 0 {
            return Err("stop_grace_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `TICKETING_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    /// Unset variables keep their [`Default`] values.
    ///
    /// # Errors
    ///
    /// Returns a message naming a variable that is not a valid number or
    /// policy, or a validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, using the same
    /// variable names as [`TicketingConfig::from_env`].
    ///
    /// # Errors
    ///
    /// See [`TicketingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            name: &str,
            target: &mut T,
        ) -> Result<(), String> {
            let key = format!("{ENV_PREFIX}{name}");
            if let Some(raw) = lookup(&key) {
                *target = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("{key}: invalid value `{raw}`"))?;
            }
            Ok(())
        }

        let mut cfg = Self::default();
        parse(&lookup, "TOTAL_TICKETS", &mut cfg.total_tickets)?;
        parse(&lookup, "MAX_TICKET_CAPACITY", &mut cfg.max_ticket_capacity)?;
        parse(&lookup, "NUM_VENDORS", &mut cfg.num_vendors)?;
        parse(&lookup, "NUM_CUSTOMERS", &mut cfg.num_customers)?;
        parse(&lookup, "TICKET_RELEASE_INTERVAL_MS", &mut cfg.ticket_release_interval_ms)?;
        parse(
            &lookup,
            "CUSTOMER_RETRIEVAL_INTERVAL_MS",
            &mut cfg.customer_retrieval_interval_ms,
        )?;
        parse(&lookup, "STOP_GRACE_MS", &mut cfg.stop_grace_ms)?;

        let policy_key = format!("{ENV_PREFIX}REMOVAL_POLICY");
        if let Some(raw) = lookup(&policy_key) {
            cfg.removal_policy = match raw.trim() {
                "partial" => RemovalPolicy::Partial,
                "wait_for_full" => RemovalPolicy::WaitForFull,
                other => return Err(format!("{policy_key}: unknown policy `{other}`")),
            };
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Pool construction parameters derived from this configuration.
    #[must_use]
    pub const fn limits(&self) -> PoolLimits {
        PoolLimits {
            initial_count: self.total_tickets,
            capacity: self.max_ticket_capacity,
            removal_policy: self.removal_policy,
            stop_grace: Duration::from_millis(self.stop_grace_ms),
        }
    }

    /// Delay between vendor additions.
    #[must_use]
    pub const fn release_interval(&self) -> Duration {
        Duration::from_millis(self.ticket_release_interval_ms)
    }

    /// Delay between customer retrievals.
    #[must_use]
    pub const fn retrieval_interval(&self) -> Duration {
        Duration::from_millis(self.customer_retrieval_interval_ms)
    }
}
