//! Plugin registry, render reconciliation and message routing for a display
//! that shows one plugin at a time.
//!
//! [`Display`] owns the state; a [`Surface`] renders it and an [`Outbox`]
//! carries messages back to the plugin server.

pub mod descriptor;
pub mod display;
pub mod error;
pub mod log_surface;
pub mod reconciler;
pub mod registry;
pub mod router;
pub mod selection;
pub mod surface;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use {
    descriptor::{Config, ConfigKind, ConfigValue, HostAddress, Plugin, Script},
    display::Display,
    error::{DescriptorError, Error, Result},
    log_surface::LogSurface,
    reconciler::{RenderOutcome, RenderReconciler},
    registry::{PluginRegistry, Upsert},
    router::Dispatch,
    selection::Selection,
    surface::{ElementHandle, InboundCallback, Outbox, PluginLink, ScriptOptions, Surface},
};
