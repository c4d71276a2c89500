//! Simulated endpoint provider
//!
//! Hands out endpoints from an in-memory table and counts every request and
//! termination, so tests can check that nothing leaks.

use std::collections::{BTreeMap, BTreeSet};

use rpt_bridging::{
    AudioFormat, EndpointId, EndpointProvider, EndpointState, FormatCaps, ProviderError,
};
use tracing::{debug, warn};

use crate::SimConfig;

/// A live simulated endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEndpoint {
    pub id: EndpointId,
    pub tech: String,
    pub device: String,
    pub name: String,
    pub state: EndpointState,
    pub caps: FormatCaps,
    pub read_format: Option<AudioFormat>,
    pub write_format: Option<AudioFormat>,
    pub recording: bool,
}

/// In-memory endpoint provider
#[derive(Debug, Default)]
pub struct SimProvider {
    endpoints: BTreeMap<EndpointId, SimEndpoint>,
    next_id: u64,
    /// Technologies with no driver
    unknown_techs: BTreeSet<String>,
    /// Devices that come back already busy
    busy_devices: BTreeSet<String>,
    /// Refuse this many upcoming requests
    refuse_next: usize,
    requested: usize,
    terminated: Vec<EndpointId>,
    stray_terminations: usize,
}

impl SimProvider {
    /// Create a provider that grants every request
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Create a provider from simulation settings
    pub fn from_config(config: &SimConfig) -> Self {
        let mut provider = Self::new();
        for tech in &config.unknown_technologies {
            provider.fail_technology(tech);
        }
        for device in &config.busy_devices {
            provider.busy_device(device);
        }
        provider
    }

    /// Refuse every request for a technology
    pub fn fail_technology(&mut self, tech: &str) {
        self.unknown_techs.insert(tech.to_ascii_uppercase());
    }

    /// Hand out endpoints for a device already in the busy state
    pub fn busy_device(&mut self, device: &str) {
        self.busy_devices.insert(device.to_string());
    }

    /// Refuse the next `count` requests regardless of address
    pub fn refuse_next(&mut self, count: usize) {
        self.refuse_next = count;
    }

    /// Successful requests so far
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Terminations of live endpoints so far
    pub fn terminated(&self) -> usize {
        self.terminated.len()
    }

    /// Endpoints terminated, in order
    pub fn terminated_ids(&self) -> &[EndpointId] {
        &self.terminated
    }

    /// How many times one endpoint was terminated
    pub fn terminations_of(&self, endpoint: EndpointId) -> usize {
        self.terminated.iter().filter(|&&e| e == endpoint).count()
    }

    /// Terminate calls for unknown or already dead endpoints
    pub fn stray_terminations(&self) -> usize {
        self.stray_terminations
    }

    /// Endpoints currently alive
    pub fn live(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_live(&self, endpoint: EndpointId) -> bool {
        self.endpoints.contains_key(&endpoint)
    }

    pub fn endpoint(&self, endpoint: EndpointId) -> Option<&SimEndpoint> {
        self.endpoints.get(&endpoint)
    }
}

impl EndpointProvider for SimProvider {
    fn request(
        &mut self,
        tech: &str,
        device: &str,
        caps: &FormatCaps,
    ) -> Result<EndpointId, ProviderError> {
        if self.refuse_next > 0 {
            self.refuse_next -= 1;
            return Err(ProviderError::Unavailable {
                device: device.to_string(),
                reason: "refused".to_string(),
            });
        }
        if self.unknown_techs.contains(&tech.to_ascii_uppercase()) {
            return Err(ProviderError::UnknownTechnology(tech.to_string()));
        }
        if caps.is_empty() {
            return Err(ProviderError::IncompatibleFormat);
        }

        let id = EndpointId(self.next_id);
        self.next_id += 1;
        self.requested += 1;

        let state = if self.busy_devices.contains(device) {
            EndpointState::Busy
        } else {
            EndpointState::Down
        };
        let name = format!("{}/{}-{}", tech, device, id.0);
        debug!("Created {}", name);

        self.endpoints.insert(
            id,
            SimEndpoint {
                id,
                tech: tech.to_string(),
                device: device.to_string(),
                name,
                state,
                caps: caps.clone(),
                read_format: None,
                write_format: None,
                recording: true,
            },
        );
        Ok(id)
    }

    fn terminate(&mut self, endpoint: EndpointId) {
        match self.endpoints.remove(&endpoint) {
            Some(ep) => {
                debug!("Terminated {}", ep.name);
                self.terminated.push(endpoint);
            }
            None => {
                warn!("Terminate of unknown endpoint {}", endpoint);
                self.stray_terminations += 1;
            }
        }
    }

    fn state(&self, endpoint: EndpointId) -> EndpointState {
        self.endpoints
            .get(&endpoint)
            .map(|ep| ep.state)
            .unwrap_or_default()
    }

    fn name(&self, endpoint: EndpointId) -> String {
        self.endpoints
            .get(&endpoint)
            .map(|ep| ep.name.clone())
            .unwrap_or_else(|| format!("<gone {}>", endpoint))
    }

    fn set_read_format(&mut self, endpoint: EndpointId, format: AudioFormat) {
        if let Some(ep) = self.endpoints.get_mut(&endpoint) {
            ep.read_format = Some(format);
        }
    }

    fn set_write_format(&mut self, endpoint: EndpointId, format: AudioFormat) {
        if let Some(ep) = self.endpoints.get_mut(&endpoint) {
            ep.write_format = Some(format);
        }
    }

    fn answer(&mut self, endpoint: EndpointId) {
        if let Some(ep) = self.endpoints.get_mut(&endpoint) {
            ep.state = EndpointState::Up;
        }
    }

    fn disable_recording(&mut self, endpoint: EndpointId) {
        if let Some(ep) = self.endpoints.get_mut(&endpoint) {
            ep.recording = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_terminate() {
        let mut provider = SimProvider::new();
        let ep = provider
            .request("DAHDI", "1", &FormatCaps::slin())
            .unwrap();

        assert!(provider.is_live(ep));
        assert_eq!(provider.state(ep), EndpointState::Down);
        assert_eq!(provider.name(ep), "DAHDI/1-1");

        provider.terminate(ep);
        assert!(!provider.is_live(ep));
        assert_eq!(provider.requested(), 1);
        assert_eq!(provider.terminated(), 1);

        provider.terminate(ep);
        assert_eq!(provider.terminated(), 1);
        assert_eq!(provider.stray_terminations(), 1);
    }

    #[test]
    fn test_unknown_technology() {
        let mut provider = SimProvider::new();
        provider.fail_technology("sip");

        let err = provider.request("SIP", "100", &FormatCaps::slin()).unwrap_err();
        assert_eq!(err, ProviderError::UnknownTechnology("SIP".to_string()));
        assert_eq!(provider.requested(), 0);
    }

    #[test]
    fn test_refuse_next() {
        let mut provider = SimProvider::new();
        provider.refuse_next(1);

        assert!(provider.request("DAHDI", "1", &FormatCaps::slin()).is_err());
        assert!(provider.request("DAHDI", "1", &FormatCaps::slin()).is_ok());
    }

    #[test]
    fn test_busy_device() {
        let mut provider = SimProvider::new();
        provider.busy_device("7");

        let ep = provider.request("DAHDI", "7", &FormatCaps::slin()).unwrap();
        assert_eq!(provider.state(ep), EndpointState::Busy);
    }

    #[test]
    fn test_answer_and_formats() {
        let mut provider = SimProvider::new();
        let ep = provider.request("DAHDI", "pseudo", &FormatCaps::slin()).unwrap();

        provider.set_read_format(ep, AudioFormat::Slin);
        provider.disable_recording(ep);
        provider.answer(ep);

        let sim = provider.endpoint(ep).unwrap();
        assert_eq!(sim.state, EndpointState::Up);
        assert_eq!(sim.read_format, Some(AudioFormat::Slin));
        assert_eq!(sim.write_format, None);
        assert!(!sim.recording);
    }

    mod props {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn live_count_tracks_requests(ops in prop::collection::vec(any::<bool>(), 0..50)) {
                let mut provider = SimProvider::new();
                let mut handles = Vec::new();

                for create in ops {
                    if create {
                        handles.push(provider.request("DAHDI", "pseudo", &FormatCaps::slin()).unwrap());
                    } else if let Some(ep) = handles.pop() {
                        provider.terminate(ep);
                    }
                    prop_assert_eq!(provider.live(), handles.len());
                    prop_assert_eq!(provider.requested() - provider.terminated(), handles.len());
                }
                prop_assert_eq!(provider.stray_terminations(), 0);
            }
        }
    }
}
