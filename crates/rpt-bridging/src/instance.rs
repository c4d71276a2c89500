//! Per-repeater slot table and configuration

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointId;
use crate::kind::ChannelKind;

/// Configuration for one repeater instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterConfig {
    /// Repeater (node) name
    pub name: String,
    /// Receive address, `tech/device`
    #[serde(default)]
    pub rx_channel: Option<String>,
    /// Transmit address. When absent the repeater transmits on its receive endpoint.
    #[serde(default)]
    pub tx_channel: Option<String>,
    /// Extra internal channels opened at startup
    #[serde(default = "default_pseudo_channels")]
    pub pseudo_channels: Vec<ChannelKind>,
}

fn default_pseudo_channels() -> Vec<ChannelKind> {
    vec![
        ChannelKind::Monitor,
        ChannelKind::Tele,
        ChannelKind::BackgroundTele,
        ChannelKind::Vox,
        ChannelKind::TxPrivate,
    ]
}

impl RepeaterConfig {
    /// Create a configuration with receive and optional transmit addresses
    pub fn new(
        name: impl Into<String>,
        rx_channel: impl Into<String>,
        tx_channel: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rx_channel: Some(rx_channel.into()),
            tx_channel,
            pseudo_channels: default_pseudo_channels(),
        }
    }
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            name: "1999".to_string(),
            rx_channel: Some("DAHDI/1".to_string()),
            tx_channel: None,
            pseudo_channels: default_pseudo_channels(),
        }
    }
}

/// Non-owning markers for endpoints that sit on radio interface hardware
///
/// `rx` and `tx` are overwritten by every successful receive/transmit
/// acquisition. A private loop channel fills `rx` only while it is unset.
/// Releasing a slot leaves the markers alone, so they may name an endpoint
/// that no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HardwareShadow {
    pub rx: Option<EndpointId>,
    pub tx: Option<EndpointId>,
}

/// Channel slots of one repeater session
#[derive(Debug, Clone)]
pub struct RepeaterInstance {
    config: RepeaterConfig,
    slots: [Option<EndpointId>; ChannelKind::COUNT],
    shadow: HardwareShadow,
}

impl RepeaterInstance {
    /// Create an instance with every slot empty
    pub fn new(config: RepeaterConfig) -> Self {
        Self {
            config,
            slots: [None; ChannelKind::COUNT],
            shadow: HardwareShadow::default(),
        }
    }

    /// Repeater name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration the instance was created from
    pub fn config(&self) -> &RepeaterConfig {
        &self.config
    }

    /// Configured address for a kind, `None` for internal kinds or blank config
    pub fn address(&self, kind: ChannelKind) -> Option<&str> {
        let configured = match kind {
            ChannelKind::Rx => self.config.rx_channel.as_deref(),
            ChannelKind::Tx => self.config.tx_channel.as_deref(),
            ChannelKind::Private
            | ChannelKind::HardwareTx
            | ChannelKind::Monitor
            | ChannelKind::Parrot
            | ChannelKind::Tele
            | ChannelKind::BackgroundTele
            | ChannelKind::Vox
            | ChannelKind::TxPrivate => None,
        };
        configured.filter(|s| !s.is_empty())
    }

    /// Endpoint currently held by a slot
    pub fn endpoint(&self, kind: ChannelKind) -> Option<EndpointId> {
        self.slots[kind.index()]
    }

    /// Storage cell for a slot
    pub fn slot_mut(&mut self, kind: ChannelKind) -> &mut Option<EndpointId> {
        &mut self.slots[kind.index()]
    }

    /// Hardware markers
    pub fn shadow(&self) -> &HardwareShadow {
        &self.shadow
    }

    pub(crate) fn shadow_mut(&mut self) -> &mut HardwareShadow {
        &mut self.shadow
    }

    /// Endpoint to key the transmitter through: the hardware transmit
    /// marker, falling back to the hardware transmit shadow slot
    pub fn hardware_tx(&self) -> Option<EndpointId> {
        self.shadow.tx.or_else(|| self.endpoint(ChannelKind::HardwareTx))
    }

    /// Receive and transmit share one endpoint
    pub fn is_aliased(&self) -> bool {
        match (self.endpoint(ChannelKind::Rx), self.endpoint(ChannelKind::Tx)) {
            (Some(rx), Some(tx)) => rx == tx,
            _ => false,
        }
    }

    /// Occupied slots in table order
    pub fn occupied(&self) -> impl Iterator<Item = (ChannelKind, EndpointId)> + '_ {
        ChannelKind::ALL
            .into_iter()
            .filter_map(|kind| self.endpoint(kind).map(|ep| (kind, ep)))
    }

    /// No slot holds an endpoint
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
