//! Channel acquisition and teardown
//!
//! [`ChannelRegistry`] pairs the host's endpoint provider with its call
//! setup and applies both to a [`RepeaterInstance`]'s slot table. It keeps
//! no locks; one owner drives each instance (see [`crate::actor`]).
//!
//! Every acquisition either commits exactly one endpoint into its slot or
//! terminates whatever it created before returning the error.

use tracing::{debug, error, info, warn};

use crate::address::ChannelAddress;
use crate::endpoint::{
    AudioFormat, CallSetup, DialRequest, EndpointId, EndpointProvider, EndpointState, FormatCaps,
};
use crate::error::ChannelError;
use crate::instance::RepeaterInstance;
use crate::kind::ChannelKind;

/// Deadline handed to call setup for real call legs
pub const DIAL_TIME: u32 = 999;

/// Acquires and releases channels for repeater instances
pub struct ChannelRegistry<P, C> {
    provider: P,
    call_setup: C,
}

impl<P: EndpointProvider, C: CallSetup> ChannelRegistry<P, C> {
    /// Create a registry over the host collaborators
    pub fn new(provider: P, call_setup: C) -> Self {
        Self {
            provider,
            call_setup,
        }
    }

    /// Endpoint provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Call setup collaborator
    pub fn call_setup(&self) -> &C {
        &self.call_setup
    }

    pub fn call_setup_mut(&mut self) -> &mut C {
        &mut self.call_setup
    }

    /// Give back the collaborators
    pub fn into_parts(self) -> (P, C) {
        (self.provider, self.call_setup)
    }

    /// Hang up the endpoint in a slot and clear it
    ///
    /// An empty slot only logs a warning. When receive and transmit share the
    /// endpoint, the partner cell is cleared too and the endpoint is
    /// terminated once.
    pub fn release(&mut self, instance: &mut RepeaterInstance, kind: ChannelKind) {
        let Some(endpoint) = instance.endpoint(kind) else {
            warn!("No {} channel to hang up", kind);
            return;
        };

        if let Some(partner) = kind.alias_partner() {
            if instance.endpoint(partner) == Some(endpoint) {
                debug!("Also resetting {}", partner);
                *instance.slot_mut(partner) = None;
            }
        }
        *instance.slot_mut(kind) = None;

        debug!("Hanging up channel {}", self.provider.name(endpoint));
        self.provider.terminate(endpoint);
    }

    /// Request the configured endpoint for `kind`, bring it up, and commit it
    ///
    /// An endpoint already in the slot is hung up on success unless another
    /// slot still shares it. On failure the slot keeps its old value.
    pub fn acquire(
        &mut self,
        instance: &mut RepeaterInstance,
        caps: &FormatCaps,
        kind: ChannelKind,
    ) -> Result<EndpointId, ChannelError> {
        let Some(address) = instance.address(kind).map(str::to_owned) else {
            warn!("No {} specified", kind);
            return Err(ChannelError::NotConfigured(kind));
        };

        let addr = ChannelAddress::parse(&address).map_err(|_| {
            error!("{} device format must be tech/device", kind);
            ChannelError::MalformedAddress {
                kind,
                address: address.clone(),
            }
        })?;

        let endpoint = self
            .provider
            .request(addr.tech, addr.device, caps)
            .map_err(|source| {
                error!("Failed to request {}: {}", addr, source);
                ChannelError::RequestFailed {
                    tech: addr.tech.to_string(),
                    device: addr.device.to_string(),
                    source,
                }
            })?;

        if self.provider.state(endpoint) == EndpointState::Busy {
            let name = self.provider.name(endpoint);
            error!("Requested channel {} is busy?", name);
            self.provider.terminate(endpoint);
            return Err(ChannelError::Busy(name));
        }

        let tags = kind.call_tags();
        let dial = DialRequest {
            device: addr.device,
            timeout: DIAL_TIME,
            tech: addr.tech,
            app: tags.map(|t| t.app),
            app_data: tags.map(|t| t.data),
            repeater: instance.name(),
        };
        self.call_setup.dial_and_wait(&mut self.provider, endpoint, &dial);

        let state = self.provider.state(endpoint);
        if state != EndpointState::Up {
            let name = self.provider.name(endpoint);
            error!("Requested channel {} not up?", name);
            self.provider.terminate(endpoint);
            return Err(ChannelError::NotAnswered { name, state });
        }

        self.commit(instance, kind, endpoint);

        match kind {
            ChannelKind::Rx => {
                instance.shadow_mut().rx = addr.is_hardware().then_some(endpoint);
            }
            ChannelKind::Tx => {
                instance.shadow_mut().tx = addr.is_hardware_device().then_some(endpoint);
            }
            _ => {}
        }

        debug!(
            "{}: {} up on {}",
            instance.name(),
            kind,
            self.provider.name(endpoint)
        );
        Ok(endpoint)
    }

    /// Request an internal loop endpoint for `kind` and commit it
    ///
    /// The endpoint is set to signed linear both ways, excluded from call
    /// records and answered. A private loop channel becomes the receive
    /// hardware marker if none is set yet.
    pub fn acquire_pseudo(
        &mut self,
        instance: &mut RepeaterInstance,
        caps: &FormatCaps,
        kind: ChannelKind,
    ) -> Result<EndpointId, ChannelError> {
        let pseudo = ChannelAddress::PSEUDO;
        let endpoint = self
            .provider
            .request(pseudo.tech, pseudo.device, caps)
            .map_err(|source| {
                error!("Failed to request pseudo channel: {}", source);
                ChannelError::RequestFailed {
                    tech: pseudo.tech.to_string(),
                    device: pseudo.device.to_string(),
                    source,
                }
            })?;

        debug!("Requested channel {}", self.provider.name(endpoint));

        self.provider.set_read_format(endpoint, AudioFormat::Slin);
        self.provider.set_write_format(endpoint, AudioFormat::Slin);
        self.provider.disable_recording(endpoint);
        self.provider.answer(endpoint);

        self.commit(instance, kind, endpoint);

        if kind == ChannelKind::Private && instance.shadow().rx.is_none() {
            instance.shadow_mut().rx = Some(endpoint);
        }

        Ok(endpoint)
    }

    /// Point the transmit slot at the receive endpoint
    ///
    /// A different endpoint already in the transmit slot is released first.
    /// The transmit hardware marker follows the receive address.
    pub fn alias_transmit(&mut self, instance: &mut RepeaterInstance) {
        let rx = instance.endpoint(ChannelKind::Rx);
        if let Some(tx) = instance.endpoint(ChannelKind::Tx) {
            if Some(tx) != rx {
                self.release(instance, ChannelKind::Tx);
            }
        }

        *instance.slot_mut(ChannelKind::Tx) = rx;

        let rx_on_hardware = instance
            .address(ChannelKind::Rx)
            .and_then(|a| ChannelAddress::parse(a).ok())
            .is_some_and(|a| a.is_hardware_device());
        instance.shadow_mut().tx = rx.filter(|_| rx_on_hardware);

        if let Some(rx) = rx {
            debug!("{}: txchan aliased to rxchan {}", instance.name(), rx);
        }
    }

    /// Bring up every channel a repeater needs to run
    ///
    /// Receive first, then transmit (or an alias of receive when no transmit
    /// address is configured), the private loop, a hardware transmit shadow
    /// when transmit is not on radio hardware, and finally the configured
    /// extra internal channels. On failure everything opened so far is
    /// released again.
    pub fn open_channels(
        &mut self,
        instance: &mut RepeaterInstance,
        caps: &FormatCaps,
    ) -> Result<(), ChannelError> {
        info!("{}: opening channels", instance.name());
        match self.open_channels_inner(instance, caps) {
            Ok(()) => {
                info!(
                    "{}: {} channels open",
                    instance.name(),
                    instance.occupied().count()
                );
                Ok(())
            }
            Err(e) => {
                error!("{}: failed to open channels: {}", instance.name(), e);
                self.release_all(instance);
                Err(e)
            }
        }
    }

    fn open_channels_inner(
        &mut self,
        instance: &mut RepeaterInstance,
        caps: &FormatCaps,
    ) -> Result<(), ChannelError> {
        self.acquire(instance, caps, ChannelKind::Rx)?;

        if instance.address(ChannelKind::Tx).is_some() {
            self.acquire(instance, caps, ChannelKind::Tx)?;
        } else {
            self.alias_transmit(instance);
        }

        self.acquire_pseudo(instance, caps, ChannelKind::Private)?;

        if instance.shadow().tx.is_none() {
            self.acquire_pseudo(instance, caps, ChannelKind::HardwareTx)?;
        }

        let extras = instance.config().pseudo_channels.clone();
        for kind in extras {
            match kind {
                ChannelKind::Rx
                | ChannelKind::Tx
                | ChannelKind::Private
                | ChannelKind::HardwareTx => {
                    warn!("{}: {} is not an extra channel, skipping", instance.name(), kind);
                }
                _ if instance.endpoint(kind).is_some() => {}
                _ => {
                    self.acquire_pseudo(instance, caps, kind)?;
                }
            }
        }

        Ok(())
    }

    /// Release every occupied slot
    pub fn release_all(&mut self, instance: &mut RepeaterInstance) {
        for kind in ChannelKind::ALL.into_iter().rev() {
            if instance.endpoint(kind).is_some() {
                self.release(instance, kind);
            }
        }
    }

    /// Install `endpoint` in its slot
    ///
    /// An endpoint the slot held before is hung up unless another slot still
    /// refers to it.
    fn commit(&mut self, instance: &mut RepeaterInstance, kind: ChannelKind, endpoint: EndpointId) {
        let Some(previous) = instance.slot_mut(kind).replace(endpoint) else {
            return;
        };
        if instance.occupied().any(|(_, ep)| ep == previous) {
            debug!("{} replaced, {} still held by another slot", kind, previous);
            return;
        }

        warn!(
            "{} slot already held {}, hanging it up for {}",
            kind, previous, endpoint
        );
        self.provider.terminate(previous);
    }
}
