//! Replica configuration
//!
//! Both replicas of a session must agree on `overlap_policy` and hold
//! opposite `site`s; everything else is a local deployment choice. The site
//! has no default and must be chosen explicitly for each side.
//!
//! ```rust
//! use textsync_core::{ReplicaConfig, Site};
//!
//! let config = ReplicaConfig::from_json(r#"{ "site": "secondary", "max_pending": 64 }"#).unwrap();
//! assert_eq!(config.site, Site::Secondary);
//! assert_eq!(config.max_pending, Some(64));
//! ```

use crate::error::Result;
use crate::operation::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time an edit may wait for its ACK before the session is reported degraded
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Tie-break role of a replica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// Wins ties: its text goes first when both sides insert at one point
    Primary,
    Secondary,
}

impl Site {
    pub fn wins_ties(self) -> bool {
        matches!(self, Site::Primary)
    }

    /// The site the peer must use
    pub fn opposite(self) -> Self {
        match self {
            Site::Primary => Site::Secondary,
            Site::Secondary => Site::Primary,
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::Primary => write!(f, "primary"),
            Site::Secondary => write!(f, "secondary"),
        }
    }
}

fn default_ack_timeout_ms() -> u64 {
    DEFAULT_ACK_TIMEOUT.as_millis() as u64
}

/// Settings for one replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaConfig {
    /// Required; the peer must hold the opposite site
    pub site: Site,

    #[serde(default)]
    pub overlap_policy: OverlapPolicy,

    /// Cap on unacknowledged local edits; `None` leaves the queue unbounded
    #[serde(default)]
    pub max_pending: Option<usize>,

    /// Milliseconds the pending head may wait for its ACK
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
}

impl ReplicaConfig {
    /// Defaults for everything but the site
    pub fn new(site: Site) -> Self {
        Self {
            site,
            overlap_policy: OverlapPolicy::default(),
            max_pending: None,
            ack_timeout_ms: default_ack_timeout_ms(),
        }
    }

    pub fn primary() -> Self {
        Self::new(Site::Primary)
    }

    pub fn secondary() -> Self {
        Self::new(Site::Secondary)
    }

    /// Parse a JSON document; `site` is required, other fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    pub fn with_max_pending(mut self, capacity: usize) -> Self {
        self.max_pending = Some(capacity);
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}
