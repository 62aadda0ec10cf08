//! Inbound event dispatch.

use {
    crate::{
        display::Display,
        error::DescriptorError,
        reconciler::RenderOutcome,
        surface::Surface,
    },
    marquee_protocol::{InboundEvent, PluginMessage},
    tracing::{debug, error, warn},
};

/// What handling one inbound event did.
#[derive(Debug)]
pub enum Dispatch {
    /// The registry was mutated (or re-applied) and the surface reconciled.
    /// `rejected` lists descriptors that were skipped as malformed.
    Applied {
        outcome: RenderOutcome,
        rejected: Vec<DescriptorError>,
    },
    /// A single descriptor was malformed; nothing changed.
    Rejected(DescriptorError),
    /// A `pluginMessage` reached the rendered instance's callback.
    Delivered,
    /// A `pluginMessage` had no matching subscriber.
    Dropped,
    /// The server reported an error.
    UpstreamError,
    /// A `broadcast`, which the display does not act on.
    Ignored,
    /// An envelope of a type this display does not know.
    Unrecognized(String),
    /// The frame could not be decoded.
    Undecodable,
}

impl Dispatch {
    /// Whether the surface may have changed.
    pub fn changed_surface(&self) -> bool {
        matches!(
            self,
            Self::Applied {
                outcome: RenderOutcome::Patched { .. } | RenderOutcome::Rebuilt,
                ..
            }
        )
    }
}

impl<S: Surface> Display<S> {
    /// Decode a text frame and dispatch it. Undecodable frames are logged and
    /// leave the display untouched.
    pub fn handle_frame(&mut self, text: &str) -> Dispatch {
        match InboundEvent::parse(text) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                warn!(error = %e, "dropping undecodable frame");
                Dispatch::Undecodable
            },
        }
    }

    pub fn dispatch(&mut self, event: InboundEvent) -> Dispatch {
        debug!(kind = event.kind(), "inbound event");
        match event {
            InboundEvent::ListPlugins(descriptors) => {
                let rejected = self.registry.replace_all(descriptors);
                Dispatch::Applied {
                    outcome: self.render(),
                    rejected,
                }
            },
            InboundEvent::AddPlugin(descriptor) | InboundEvent::ConfigPlugin(descriptor) => {
                match self.registry.upsert(descriptor) {
                    Ok(change) => {
                        debug!(?change, "plugin upserted");
                        Dispatch::Applied {
                            outcome: self.render(),
                            rejected: Vec::new(),
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "rejected plugin descriptor");
                        Dispatch::Rejected(e)
                    },
                }
            },
            InboundEvent::RemovePlugin(payload) => {
                if !self.registry.remove(&payload.name) {
                    debug!(plugin = %payload.name, "remove for unknown plugin");
                }
                Dispatch::Applied {
                    outcome: self.render(),
                    rejected: Vec::new(),
                }
            },
            InboundEvent::PluginMessage(message) => self.relay(message),
            InboundEvent::Error(data) => {
                error!(payload = %data, "server reported an error");
                Dispatch::UpstreamError
            },
            InboundEvent::Broadcast(_) => Dispatch::Ignored,
            InboundEvent::Unknown { kind, .. } => {
                warn!(kind = %kind, "unrecognized message type");
                Dispatch::Unrecognized(kind)
            },
        }
    }

    fn relay(&mut self, message: PluginMessage) -> Dispatch {
        let PluginMessage { name, mesg } = message;
        if self.selection.is_selected(&name) && self.reconciler.deliver(&name, &mesg) {
            Dispatch::Delivered
        } else {
            debug!(plugin = %name, "dropping plugin message without subscriber");
            Dispatch::Dropped
        }
    }
}
