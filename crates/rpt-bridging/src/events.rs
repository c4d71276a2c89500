//! Events emitted by the repeater actor

use crate::endpoint::EndpointId;
use crate::error::ChannelError;
use crate::kind::ChannelKind;

/// Slot changes reported by a running repeater
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeaterEvent {
    /// A slot now holds an endpoint
    ChannelUp {
        repeater: String,
        kind: ChannelKind,
        endpoint: EndpointId,
    },

    /// A slot was cleared
    ChannelDown {
        repeater: String,
        kind: ChannelKind,
        endpoint: EndpointId,
    },

    /// An acquisition failed and was unwound
    AcquireFailed {
        repeater: String,
        kind: Option<ChannelKind>,
        error: ChannelError,
    },
}

impl RepeaterEvent {
    /// Name of the repeater the event belongs to
    pub fn repeater(&self) -> &str {
        match self {
            Self::ChannelUp { repeater, .. }
            | Self::ChannelDown { repeater, .. }
            | Self::AcquireFailed { repeater, .. } => repeater,
        }
    }
}
