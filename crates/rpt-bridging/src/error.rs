//! Error types for channel acquisition

use thiserror::Error;

use crate::endpoint::{EndpointState, ProviderError};
use crate::kind::ChannelKind;

/// Errors from acquiring a channel slot
///
/// Whatever the variant, no endpoint created during the failed attempt is
/// left alive and the slot table is unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No address configured for the slot
    #[error("no {0} specified")]
    NotConfigured(ChannelKind),

    /// Address is not `tech/device`
    #[error("{kind} device format must be tech/device, got {address:?}")]
    MalformedAddress { kind: ChannelKind, address: String },

    /// Host refused to create the endpoint
    #[error("failed to request {tech}/{device}: {source}")]
    RequestFailed {
        tech: String,
        device: String,
        #[source]
        source: ProviderError,
    },

    /// Freshly requested endpoint was already busy
    #[error("requested channel {0} is busy")]
    Busy(String),

    /// Call setup finished without the endpoint coming up
    #[error("requested channel {name} not up (state {})", .state.name())]
    NotAnswered { name: String, state: EndpointState },
}

/// Malformed `tech/device` address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("address {0:?} is not in tech/device form")]
pub struct AddressError(pub String);

/// Unrecognized channel kind name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown channel kind: {0}")]
pub struct ParseKindError(pub String);
