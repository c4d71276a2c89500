//! Repeater Channel Bridging
//!
//! This crate manages the fixed set of channels a repeater instance uses to
//! talk to radio hardware, telephony trunks and internal loop endpoints.
//!
//! # Architecture
//!
//! Each [`RepeaterInstance`] owns one slot per [`ChannelKind`]. A
//! [`ChannelRegistry`] fills and empties those slots through two host
//! collaborators:
//!
//! - **[`EndpointProvider`]**: creates, inspects and terminates endpoints
//! - **[`CallSetup`]**: dials a freshly created endpoint and waits for answer
//!
//! Receive and transmit may share a single endpoint. Releasing either one
//! clears both slots and hangs the endpoint up once.
//!
//! Slots hold plain [`EndpointId`] handles. Which receive/transmit endpoint
//! sits on radio interface hardware is tracked separately in a
//! [`HardwareShadow`].
//!
//! # Example
//!
//! ```rust,no_run
//! use rpt_bridging::{ChannelKind, ChannelRegistry, FormatCaps, RepeaterConfig, RepeaterInstance};
//! # fn run(provider: impl rpt_bridging::EndpointProvider, call_setup: impl rpt_bridging::CallSetup) {
//! let mut registry = ChannelRegistry::new(provider, call_setup);
//! let mut repeater = RepeaterInstance::new(RepeaterConfig::new("1999", "DAHDI/1", None));
//!
//! registry
//!     .open_channels(&mut repeater, &FormatCaps::slin())
//!     .expect("repeater channels");
//! assert!(repeater.is_aliased());
//!
//! registry.release(&mut repeater, ChannelKind::Rx);
//! assert_eq!(repeater.endpoint(ChannelKind::Tx), None);
//! # }
//! ```

pub mod actor;
pub mod address;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod instance;
pub mod kind;
pub mod registry;

// Re-export actor types
pub use actor::{run_repeater_actor, RepeaterCommand, SlotSnapshot};

pub use address::{ChannelAddress, HARDWARE_TECH, PSEUDO_DEVICE};
pub use endpoint::{
    AudioFormat, CallSetup, DialRequest, EndpointId, EndpointProvider, EndpointState, FormatCaps,
    ProviderError,
};
pub use error::{AddressError, ChannelError, ParseKindError};
pub use events::RepeaterEvent;
pub use instance::{HardwareShadow, RepeaterConfig, RepeaterInstance};
pub use kind::{CallTags, ChannelKind};
pub use registry::{ChannelRegistry, DIAL_TIME};
