//! Endpoint handles and the host collaborators that create and drive them
//!
//! The registry never owns a live channel object. It stores plain
//! [`EndpointId`] handles and asks an [`EndpointProvider`] to act on them,
//! which keeps aliasing between slots a simple equality check.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to a live endpoint owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Call state reported by the host for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointState {
    /// Allocated, nothing happening yet
    #[default]
    Down,
    /// Reserved by the channel driver
    Reserved,
    /// Off hook, no digits dialed
    OffHook,
    /// Digits (or equivalent) have been dialed
    Dialing,
    /// Remote end is ringing
    Ringing,
    /// Answered and passing audio
    Up,
    /// Line is busy
    Busy,
}

impl EndpointState {
    /// Human-readable state name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Down => "Down",
            Self::Reserved => "Rsrvd",
            Self::OffHook => "OffHook",
            Self::Dialing => "Dialing",
            Self::Ringing => "Ringing",
            Self::Up => "Up",
            Self::Busy => "Busy",
        }
    }
}

/// Audio formats an endpoint may read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    /// 16-bit signed linear, 8 kHz
    Slin,
    /// G.711 mu-law
    Ulaw,
    /// G.711 a-law
    Alaw,
    /// GSM full rate
    Gsm,
    /// G.722 wideband
    G722,
}

/// Set of audio formats offered when requesting an endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCaps {
    formats: BTreeSet<AudioFormat>,
}

impl FormatCaps {
    /// Create an empty capability set
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities containing only signed linear
    pub fn slin() -> Self {
        [AudioFormat::Slin].into_iter().collect()
    }

    /// Add a format
    pub fn insert(&mut self, format: AudioFormat) {
        self.formats.insert(format);
    }

    /// Check whether a format is offered
    pub fn contains(&self, format: AudioFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Iterate over the offered formats
    pub fn iter(&self) -> impl Iterator<Item = AudioFormat> + '_ {
        self.formats.iter().copied()
    }

    /// No format is offered
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl FromIterator<AudioFormat> for FormatCaps {
    fn from_iter<I: IntoIterator<Item = AudioFormat>>(iter: I) -> Self {
        Self {
            formats: iter.into_iter().collect(),
        }
    }
}

/// Reasons the host can refuse to create an endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No channel driver registered for the technology
    #[error("no channel driver for technology {0}")]
    UnknownTechnology(String),

    /// Driver could not allocate the device
    #[error("device {device} unavailable: {reason}")]
    Unavailable { device: String, reason: String },

    /// None of the offered formats is supported
    #[error("no compatible audio format")]
    IncompatibleFormat,
}

/// Host side of channel creation and teardown
///
/// Implementations wrap whatever actually owns live channels. Every endpoint
/// handed out by [`request`](EndpointProvider::request) must eventually be
/// passed to [`terminate`](EndpointProvider::terminate) exactly once.
pub trait EndpointProvider {
    /// Create a raw endpoint for `tech/device` offering `caps`
    fn request(
        &mut self,
        tech: &str,
        device: &str,
        caps: &FormatCaps,
    ) -> Result<EndpointId, ProviderError>;

    /// Hang up and destroy an endpoint. The handle is invalid afterwards.
    fn terminate(&mut self, endpoint: EndpointId);

    /// Current call state of an endpoint
    fn state(&self, endpoint: EndpointId) -> EndpointState;

    /// Host-assigned channel name, for diagnostics
    fn name(&self, endpoint: EndpointId) -> String;

    /// Format the host delivers frames in when reading from the endpoint
    fn set_read_format(&mut self, endpoint: EndpointId, format: AudioFormat);

    /// Format frames are written to the endpoint in
    fn set_write_format(&mut self, endpoint: EndpointId, format: AudioFormat);

    /// Mark an endpoint answered
    fn answer(&mut self, endpoint: EndpointId);

    /// Suppress call-detail recording for an endpoint
    fn disable_recording(&mut self, endpoint: EndpointId);
}

/// Parameters for bringing a freshly requested endpoint up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialRequest<'a> {
    /// Device part of the address, dialed on the endpoint
    pub device: &'a str,
    /// Deadline, in the call-setup collaborator's own units
    pub timeout: u32,
    /// Technology part of the address
    pub tech: &'a str,
    /// Application name shown against the call
    pub app: Option<&'static str>,
    /// Application data shown against the call
    pub app_data: Option<&'static str>,
    /// Owning repeater, for diagnostics
    pub repeater: &'a str,
}

/// Drives a requested endpoint to the answered state
///
/// The outcome is observed through [`EndpointProvider::state`] afterwards;
/// the call itself reports nothing.
pub trait CallSetup {
    fn dial_and_wait(
        &mut self,
        provider: &mut dyn EndpointProvider,
        endpoint: EndpointId,
        request: &DialRequest<'_>,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slin_caps() {
        let caps = FormatCaps::slin();
        assert!(caps.contains(AudioFormat::Slin));
        assert!(!caps.contains(AudioFormat::Ulaw));
        assert_eq!(caps.iter().count(), 1);
    }

    #[test]
    fn test_caps_deduplicate() {
        let caps: FormatCaps = [AudioFormat::Ulaw, AudioFormat::Ulaw, AudioFormat::Slin]
            .into_iter()
            .collect();
        assert_eq!(caps.iter().collect::<Vec<_>>(), vec![AudioFormat::Slin, AudioFormat::Ulaw]);
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(EndpointId(42).to_string(), "#42");
        assert_eq!(EndpointState::Reserved.name(), "Rsrvd");
    }
}
