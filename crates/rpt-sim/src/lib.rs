//! Repeater Channel Simulation Library
//!
//! Stand-ins for the host collaborators of `rpt-bridging`, for running
//! repeaters without telephony hardware:
//!
//! - **SimProvider**: in-memory endpoints with request/terminate accounting
//!   and failure injection
//! - **SimCallSetup**: answers or times out dials according to a script
//!
//! # Example
//!
//! ```rust
//! use rpt_bridging::{ChannelKind, ChannelRegistry, FormatCaps, RepeaterConfig, RepeaterInstance};
//! use rpt_sim::{SimCallSetup, SimProvider};
//!
//! let mut registry = ChannelRegistry::new(SimProvider::new(), SimCallSetup::new());
//! let mut repeater = RepeaterInstance::new(RepeaterConfig::new("1999", "DAHDI/1", None));
//!
//! registry.acquire(&mut repeater, &FormatCaps::slin(), ChannelKind::Rx).unwrap();
//! registry.release_all(&mut repeater);
//!
//! assert_eq!(registry.provider().live(), 0);
//! ```

pub mod call_setup;
pub mod provider;

pub use call_setup::{DialOutcome, DialRecord, SimCallSetup};
pub use provider::{SimEndpoint, SimProvider};

use serde::{Deserialize, Serialize};

/// Settings for building a simulated host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Outcome of every dial
    #[serde(default)]
    pub dial_outcome: DialOutcome,
    /// Technologies the simulated host has no driver for
    #[serde(default)]
    pub unknown_technologies: Vec<String>,
    /// Devices that are busy when requested
    #[serde(default)]
    pub busy_devices: Vec<String>,
}

impl SimConfig {
    /// Build the provider and call setup described by these settings
    pub fn build(&self) -> (SimProvider, SimCallSetup) {
        (
            SimProvider::from_config(self),
            SimCallSetup::with_default(self.dial_outcome),
        )
    }
}
