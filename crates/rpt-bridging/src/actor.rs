//! Repeater Actor
//!
//! One async task owns a [`RepeaterInstance`] together with its
//! [`ChannelRegistry`], so every slot mutation for that repeater happens on
//! a single task. Other tasks talk to it through a command channel and
//! observe slot changes through an event channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use rpt_bridging::actor::{run_repeater_actor, RepeaterCommand};
//! use tokio::sync::{mpsc, oneshot};
//!
//! let (cmd_tx, cmd_rx) = mpsc::channel(32);
//! let (event_tx, mut event_rx) = mpsc::channel(256);
//!
//! tokio::spawn(run_repeater_actor(instance, registry, caps, cmd_rx, event_tx));
//!
//! let (response, rx) = oneshot::channel();
//! cmd_tx.send(RepeaterCommand::Open { response }).await?;
//! rx.await??;
//! ```

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::endpoint::{CallSetup, EndpointId, EndpointProvider, FormatCaps};
use crate::error::ChannelError;
use crate::events::RepeaterEvent;
use crate::instance::{HardwareShadow, RepeaterInstance};
use crate::kind::ChannelKind;
use crate::registry::ChannelRegistry;

/// Point-in-time view of a repeater's slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// Repeater name
    pub repeater: String,
    /// Occupied slots in table order
    pub slots: Vec<(ChannelKind, EndpointId)>,
    /// Hardware markers at the time of the snapshot
    pub shadow: HardwareShadow,
    /// Receive and transmit share one endpoint
    pub aliased: bool,
}

impl SlotSnapshot {
    /// Capture the current state of an instance
    pub fn from_instance(instance: &RepeaterInstance) -> Self {
        Self {
            repeater: instance.name().to_string(),
            slots: instance.occupied().collect(),
            shadow: *instance.shadow(),
            aliased: instance.is_aliased(),
        }
    }

    /// Endpoint held by a slot in this snapshot
    pub fn endpoint(&self, kind: ChannelKind) -> Option<EndpointId> {
        self.slots
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ep)| *ep)
    }
}

/// Commands sent to the repeater actor
#[derive(Debug)]
pub enum RepeaterCommand {
    /// Bring up every channel the repeater needs
    Open {
        response: oneshot::Sender<Result<(), ChannelError>>,
    },

    /// Acquire the configured endpoint for a slot
    Acquire {
        kind: ChannelKind,
        response: oneshot::Sender<Result<EndpointId, ChannelError>>,
    },

    /// Acquire an internal loop endpoint for a slot
    AcquirePseudo {
        kind: ChannelKind,
        response: oneshot::Sender<Result<EndpointId, ChannelError>>,
    },

    /// Release a slot
    Release { kind: ChannelKind },

    /// Release every slot
    ReleaseAll,

    /// Query the slot table
    Snapshot {
        response: oneshot::Sender<SlotSnapshot>,
    },

    /// Release everything and stop the actor
    Shutdown,
}

type SlotTable = [Option<EndpointId>; ChannelKind::COUNT];

fn slot_table(instance: &RepeaterInstance) -> SlotTable {
    ChannelKind::ALL.map(|kind| instance.endpoint(kind))
}

/// Emit up/down events for every slot that changed
async fn emit_changes(
    event_tx: &mpsc::Sender<RepeaterEvent>,
    before: &SlotTable,
    instance: &RepeaterInstance,
) {
    for kind in ChannelKind::ALL {
        let old = before[kind.index()];
        let new = instance.endpoint(kind);
        if old == new {
            continue;
        }
        if let Some(endpoint) = old {
            let _ = event_tx
                .send(RepeaterEvent::ChannelDown {
                    repeater: instance.name().to_string(),
                    kind,
                    endpoint,
                })
                .await;
        }
        if let Some(endpoint) = new {
            let _ = event_tx
                .send(RepeaterEvent::ChannelUp {
                    repeater: instance.name().to_string(),
                    kind,
                    endpoint,
                })
                .await;
        }
    }
}

async fn emit_failure(
    event_tx: &mpsc::Sender<RepeaterEvent>,
    instance: &RepeaterInstance,
    kind: Option<ChannelKind>,
    error: &ChannelError,
) {
    let _ = event_tx
        .send(RepeaterEvent::AcquireFailed {
            repeater: instance.name().to_string(),
            kind,
            error: error.clone(),
        })
        .await;
}

/// Run the repeater actor until `Shutdown` or the command channel closes
///
/// All channels are released before returning. The registry is handed back
/// so the caller can recover its collaborators.
pub async fn run_repeater_actor<P, C>(
    mut instance: RepeaterInstance,
    mut registry: ChannelRegistry<P, C>,
    caps: FormatCaps,
    mut cmd_rx: mpsc::Receiver<RepeaterCommand>,
    event_tx: mpsc::Sender<RepeaterEvent>,
) -> ChannelRegistry<P, C>
where
    P: EndpointProvider,
    C: CallSetup,
{
    info!("Repeater actor started: {}", instance.name());

    while let Some(cmd) = cmd_rx.recv().await {
        let before = slot_table(&instance);

        match cmd {
            RepeaterCommand::Open { response } => {
                let result = registry.open_channels(&mut instance, &caps);
                if let Err(e) = &result {
                    emit_failure(&event_tx, &instance, None, e).await;
                }
                let _ = response.send(result);
            }

            RepeaterCommand::Acquire { kind, response } => {
                let result = registry.acquire(&mut instance, &caps, kind);
                if let Err(e) = &result {
                    emit_failure(&event_tx, &instance, Some(kind), e).await;
                }
                let _ = response.send(result);
            }

            RepeaterCommand::AcquirePseudo { kind, response } => {
                let result = registry.acquire_pseudo(&mut instance, &caps, kind);
                if let Err(e) = &result {
                    emit_failure(&event_tx, &instance, Some(kind), e).await;
                }
                let _ = response.send(result);
            }

            RepeaterCommand::Release { kind } => {
                registry.release(&mut instance, kind);
            }

            RepeaterCommand::ReleaseAll => {
                registry.release_all(&mut instance);
            }

            RepeaterCommand::Snapshot { response } => {
                let _ = response.send(SlotSnapshot::from_instance(&instance));
            }

            RepeaterCommand::Shutdown => {
                debug!("Shutdown requested for {}", instance.name());
                break;
            }
        }

        emit_changes(&event_tx, &before, &instance).await;
    }

    let before = slot_table(&instance);
    registry.release_all(&mut instance);
    emit_changes(&event_tx, &before, &instance).await;

    info!("Repeater actor stopped: {}", instance.name());
    registry
}
