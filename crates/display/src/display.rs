use {
    crate::{
        descriptor::HostAddress,
        error::Result,
        reconciler::{RenderOutcome, RenderReconciler},
        registry::PluginRegistry,
        selection::Selection,
        surface::{Outbox, Surface},
    },
    marquee_protocol::Envelope,
    std::sync::Arc,
    tracing::{debug, info},
};

/// The display state: registry, selection and rendered snapshot, bound to a
/// surface and the outbound half of the channel.
///
/// All mutation goes through [`dispatch`](Self::dispatch),
/// [`cycle`](Self::cycle), [`select`](Self::select) and
/// [`on_open`](Self::on_open); each of them reconciles before returning.
pub struct Display<S> {
    pub(crate) registry: PluginRegistry,
    pub(crate) selection: Selection,
    pub(crate) reconciler: RenderReconciler,
    surface: S,
    outbox: Arc<dyn Outbox>,
}

impl<S: Surface> Display<S> {
    pub fn new(surface: S, outbox: Arc<dyn Outbox>, host: HostAddress) -> Self {
        Self {
            registry: PluginRegistry::new(host),
            selection: Selection::default(),
            reconciler: RenderReconciler::default(),
            surface,
            outbox,
        }
    }

    /// The channel (re)opened: drop what the previous connection told us and
    /// ask for the authoritative plugin list.
    ///
    /// The rendered snapshot is kept, so a reconnect that reports the same
    /// plugins does not rebuild the surface.
    pub fn on_open(&mut self) {
        self.registry.clear();
        self.selection.clear();
        self.outbox.send(Envelope::list_plugins());
        info!(host = %self.registry.host().host(), "requested plugin list");
    }

    /// Advance the selection to the next plugin and reconcile.
    pub fn cycle(&mut self) -> RenderOutcome {
        if self.selection.cycle(&self.registry) {
            debug!(selected = ?self.selection.current(), "cycled selection");
        }
        self.render()
    }

    /// Select a registered plugin by name and reconcile.
    pub fn select(&mut self, name: &str) -> Result<RenderOutcome> {
        self.selection.select(&self.registry, name)?;
        Ok(self.render())
    }

    /// Bring the surface in line with the registry and selection.
    pub fn render(&mut self) -> RenderOutcome {
        self.reconciler.reconcile(
            &self.registry,
            &mut self.selection,
            &mut self.surface,
            &self.outbox,
        )
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reconciler(&self) -> &RenderReconciler {
        &self.reconciler
    }

    pub fn host(&self) -> &HostAddress {
        self.registry.host()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S> std::fmt::Debug for Display<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("plugins", &self.registry.len())
            .field("selection", &self.selection.current())
            .field("rendered", &self.reconciler.rendered().map(|p| &p.name))
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::Error,
            testing::{RecordingOutbox, RecordingSurface},
        },
        marquee_protocol::MessageType,
        serde_json::json,
    };

    fn display() -> (Display<RecordingSurface>, Arc<RecordingOutbox>) {
        let outbox = Arc::new(RecordingOutbox::default());
        let display = Display::new(
            RecordingSurface::default(),
            outbox.clone(),
            HostAddress::parse("localhost:3012").unwrap(),
        );
        (display, outbox)
    }

    fn plugin(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "version": "1",
            "configs": [{"name": "enabled", "type": "checkbox", "value": true, "default": true}],
            "script": {"url": format!("/{name}.js")}
        })
    }

    #[test]
    fn on_open_requests_list_once() {
        let (mut display, outbox) = display();
        display.on_open();
        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, MessageType::ListPlugins);
    }

    #[test]
    fn on_open_resets_registry_and_selection() {
        let (mut display, _) = display();
        display.registry.replace_all(vec![plugin("a"), plugin("b")]);
        display.select("b").unwrap();

        display.on_open();
        assert!(display.registry().is_empty());
        assert_eq!(display.selection().current(), None);
        // the surface keeps showing the last rendering until the list arrives
        assert_eq!(display.reconciler().rendered().unwrap().name, "b");
    }

    #[test]
    fn select_unknown_keeps_rendering() {
        let (mut display, _) = display();
        display.registry.replace_all(vec![plugin("a")]);
        display.render();

        assert!(matches!(display.select("zzz"), Err(Error::UnknownPlugin(_))));
        assert_eq!(display.reconciler().rendered().unwrap().name, "a");
    }

    #[test]
    fn cycle_on_single_plugin_is_unchanged() {
        let (mut display, _) = display();
        display.registry.replace_all(vec![plugin("a")]);
        assert_eq!(display.render(), RenderOutcome::Rebuilt);
        assert_eq!(display.cycle(), RenderOutcome::Unchanged);
    }
}
