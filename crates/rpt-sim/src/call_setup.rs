//! Simulated call setup with scripted outcomes

use std::collections::{HashMap, VecDeque};

use rpt_bridging::{AudioFormat, CallSetup, DialRequest, EndpointId, EndpointProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a simulated dial ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DialOutcome {
    /// Far end answers
    #[default]
    Answer,
    /// Deadline passes without answer
    NoAnswer,
}

/// A recorded dial attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialRecord {
    pub endpoint: EndpointId,
    pub tech: String,
    pub device: String,
    pub timeout: u32,
    pub app: Option<&'static str>,
    pub app_data: Option<&'static str>,
    pub repeater: String,
    pub outcome: DialOutcome,
}

/// Call setup that answers or times out according to a script
///
/// Outcomes are taken from the queue first, then from per-device overrides,
/// then the default.
#[derive(Debug, Default)]
pub struct SimCallSetup {
    default_outcome: DialOutcome,
    by_device: HashMap<String, DialOutcome>,
    queued: VecDeque<DialOutcome>,
    dials: Vec<DialRecord>,
}

impl SimCallSetup {
    /// Call setup where every dial is answered
    pub fn new() -> Self {
        Self::default()
    }

    /// Call setup with a different default outcome
    pub fn with_default(outcome: DialOutcome) -> Self {
        Self {
            default_outcome: outcome,
            ..Default::default()
        }
    }

    /// Fix the outcome for dials to one device
    pub fn set_device_outcome(&mut self, device: impl Into<String>, outcome: DialOutcome) {
        self.by_device.insert(device.into(), outcome);
    }

    /// Use `outcome` for the next dial only
    pub fn queue(&mut self, outcome: DialOutcome) {
        self.queued.push_back(outcome);
    }

    /// Every dial seen so far
    pub fn dials(&self) -> &[DialRecord] {
        &self.dials
    }
}

impl CallSetup for SimCallSetup {
    fn dial_and_wait(
        &mut self,
        provider: &mut dyn EndpointProvider,
        endpoint: EndpointId,
        request: &DialRequest<'_>,
    ) {
        let outcome = self
            .queued
            .pop_front()
            .or_else(|| self.by_device.get(request.device).copied())
            .unwrap_or(self.default_outcome);

        provider.set_read_format(endpoint, AudioFormat::Slin);
        provider.set_write_format(endpoint, AudioFormat::Slin);
        provider.disable_recording(endpoint);

        if outcome == DialOutcome::Answer {
            provider.answer(endpoint);
        }

        debug!(
            "{}: dialed {}/{} ({}) -> {:?}",
            request.repeater,
            request.tech,
            request.device,
            request.app.unwrap_or("-"),
            outcome
        );

        self.dials.push(DialRecord {
            endpoint,
            tech: request.tech.to_string(),
            device: request.device.to_string(),
            timeout: request.timeout,
            app: request.app,
            app_data: request.app_data,
            repeater: request.repeater.to_string(),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use rpt_bridging::{EndpointState, FormatCaps};

    use super::*;
    use crate::SimProvider;

    fn dial(setup: &mut SimCallSetup, provider: &mut SimProvider, device: &str) -> EndpointId {
        let ep = provider.request("DAHDI", device, &FormatCaps::slin()).unwrap();
        let request = DialRequest {
            device,
            timeout: 999,
            tech: "DAHDI",
            app: Some("(Repeater Rx)"),
            app_data: Some("Rx"),
            repeater: "1999",
        };
        setup.dial_and_wait(provider, ep, &request);
        ep
    }

    #[test]
    fn test_default_answers() {
        let mut provider = SimProvider::new();
        let mut setup = SimCallSetup::new();

        let ep = dial(&mut setup, &mut provider, "1");
        assert_eq!(provider.state(ep), EndpointState::Up);
        assert_eq!(setup.dials().len(), 1);
        assert_eq!(setup.dials()[0].app_data, Some("Rx"));
    }

    #[test]
    fn test_queue_overrides_device() {
        let mut provider = SimProvider::new();
        let mut setup = SimCallSetup::new();
        setup.set_device_outcome("2", DialOutcome::NoAnswer);
        setup.queue(DialOutcome::Answer);

        let first = dial(&mut setup, &mut provider, "2");
        let second = dial(&mut setup, &mut provider, "2");
        assert_eq!(provider.state(first), EndpointState::Up);
        assert_eq!(provider.state(second), EndpointState::Down);
    }

    #[test]
    fn test_no_answer_default() {
        let mut provider = SimProvider::new();
        let mut setup = SimCallSetup::with_default(DialOutcome::NoAnswer);

        let ep = dial(&mut setup, &mut provider, "1");
        assert_eq!(provider.state(ep), EndpointState::Down);
        assert_eq!(setup.dials()[0].outcome, DialOutcome::NoAnswer);
    }
}
