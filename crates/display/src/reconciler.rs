use {
    crate::{
        descriptor::Plugin,
        registry::PluginRegistry,
        selection::Selection,
        surface::{self, ElementHandle, Outbox, PluginLink, ScriptOptions, SharedSlot, Surface},
    },
    serde_json::Value,
    std::sync::Arc,
    tracing::{debug, info, warn},
};

/// What a reconciliation pass did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The registry is empty; the surface was left alone.
    Empty,
    /// The rendered plugin already matches the selection.
    Unchanged,
    /// Same plugin, new configuration: attributes were rewritten in place.
    Patched { attributes: usize },
    /// A different plugin: the surface was cleared and rebuilt.
    Rebuilt,
}

/// Decides between no-op, patch and rebuild, and applies the result.
///
/// Owns the snapshot of the rendered plugin, the handle of its element and
/// the inbound callback slot bound to it.
#[derive(Debug, Default)]
pub struct RenderReconciler {
    snapshot: Option<Plugin>,
    element: Option<ElementHandle>,
    inbound: Option<SharedSlot>,
}

impl RenderReconciler {
    /// The plugin currently on the surface.
    pub fn rendered(&self) -> Option<&Plugin> {
        self.snapshot.as_ref()
    }

    pub fn element(&self) -> Option<ElementHandle> {
        self.element
    }

    /// Whether the rendered instance has registered an inbound callback.
    pub fn has_subscriber(&self) -> bool {
        self.inbound
            .as_ref()
            .is_some_and(|slot| surface::lock(slot).is_registered())
    }

    pub fn reconcile<S: Surface + ?Sized>(
        &mut self,
        registry: &PluginRegistry,
        selection: &mut Selection,
        surface: &mut S,
        outbox: &Arc<dyn Outbox>,
    ) -> RenderOutcome {
        let Some(target) = selection.resolve(registry) else {
            debug!("no plugins to render");
            return RenderOutcome::Empty;
        };

        if self.snapshot.as_ref() == Some(target) {
            return RenderOutcome::Unchanged;
        }

        let same_plugin = self
            .snapshot
            .as_ref()
            .is_some_and(|current| current.same_identity(target));
        match self.element {
            Some(element) if same_plugin => {
                let attributes = apply_attributes(target, element, surface);
                debug!(plugin = %target.name, attributes, "patched plugin config");
                self.snapshot = Some(target.clone());
                RenderOutcome::Patched { attributes }
            },
            _ => {
                self.rebuild(target, surface, outbox);
                RenderOutcome::Rebuilt
            },
        }
    }

    /// Hand an inbound message to the rendered instance's callback.
    ///
    /// Returns `false` when `name` is not what is rendered or nothing has
    /// subscribed since the last rebuild.
    pub fn deliver(&self, name: &str, mesg: &Value) -> bool {
        let rendered = self.snapshot.as_ref().is_some_and(|p| p.name == name);
        match (&self.inbound, rendered) {
            (Some(slot), true) => surface::deliver(slot, mesg),
            _ => false,
        }
    }

    fn rebuild<S: Surface + ?Sized>(
        &mut self,
        plugin: &Plugin,
        surface: &mut S,
        outbox: &Arc<dyn Outbox>,
    ) {
        surface.clear();
        self.inbound = None;
        self.element = None;

        match plugin.script.url.as_deref() {
            Some(url) => surface.attach_script(url, ScriptOptions { module: true }),
            None => warn!(plugin = %plugin.name, "plugin has no script url"),
        }

        let element = surface.create_element(&plugin.name);
        apply_attributes(plugin, element, surface);

        if plugin.has_background() {
            let slot = SharedSlot::default();
            surface.attach_link(
                element,
                PluginLink::new(plugin.name.clone(), Arc::clone(outbox), Arc::clone(&slot)),
            );
            self.inbound = Some(slot);
        }

        surface.append(element);
        self.element = Some(element);
        self.snapshot = Some(plugin.clone());
        info!(plugin = %plugin.name, version = %plugin.version, "rendered plugin");
    }
}

fn apply_attributes<S: Surface + ?Sized>(
    plugin: &Plugin,
    element: ElementHandle,
    surface: &mut S,
) -> usize {
    let mut count = 0;
    for (name, value) in plugin.attributes() {
        surface.set_attribute(element, name, &value);
        count += 1;
    }
    count
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{descriptor::HostAddress, testing::{Op, RecordingOutbox, RecordingSurface}},
        serde_json::json,
        std::sync::Mutex,
    };

    fn descriptor(name: &str, color: &str, background: bool) -> Value {
        let mut raw = json!({
            "name": name,
            "version": "1.0.0",
            "configs": [
                {"name": "enabled", "type": "checkbox", "value": true, "default": false},
                {"name": "color", "type": "color", "value": color, "default": "black"}
            ],
            "script": {"url": format!("/script/{name}.js")}
        });
        if background {
            raw["backgroundScript"] = json!({"url": format!("/background/{name}.js")});
        }
        raw
    }

    struct Harness {
        registry: PluginRegistry,
        selection: Selection,
        reconciler: RenderReconciler,
        surface: RecordingSurface,
        outbox: Arc<dyn Outbox>,
    }

    impl Harness {
        fn new(plugins: Vec<Value>) -> Self {
            let mut registry = PluginRegistry::new(HostAddress::parse("h:1").unwrap());
            registry.replace_all(plugins);
            Self {
                registry,
                selection: Selection::default(),
                reconciler: RenderReconciler::default(),
                surface: RecordingSurface::default(),
                outbox: Arc::new(RecordingOutbox::default()),
            }
        }

        fn reconcile(&mut self) -> RenderOutcome {
            self.reconciler.reconcile(
                &self.registry,
                &mut self.selection,
                &mut self.surface,
                &self.outbox,
            )
        }
    }

    #[test]
    fn empty_registry_touches_nothing() {
        let mut h = Harness::new(vec![]);
        assert_eq!(h.reconcile(), RenderOutcome::Empty);
        assert!(h.surface.ops.is_empty());
    }

    #[test]
    fn first_render_rebuilds_with_module_script() {
        let mut h = Harness::new(vec![descriptor("clock", "red", false)]);
        assert_eq!(h.reconcile(), RenderOutcome::Rebuilt);
        assert_eq!(
            h.surface.ops,
            vec![
                Op::Clear,
                Op::Script {
                    url: "http://h:1/script/clock.js".into(),
                    module: true,
                },
                Op::Create {
                    tag: "clock".into(),
                    element: ElementHandle(1),
                },
                Op::SetAttribute {
                    element: ElementHandle(1),
                    name: "color".into(),
                    value: "red".into(),
                },
                Op::Append(ElementHandle(1)),
            ]
        );
        assert_eq!(h.reconciler.rendered().unwrap().name, "clock");
    }

    #[test]
    fn identical_state_is_a_noop() {
        let mut h = Harness::new(vec![descriptor("clock", "red", false)]);
        h.reconcile();
        h.surface.ops.clear();
        assert_eq!(h.reconcile(), RenderOutcome::Unchanged);
        assert!(h.surface.ops.is_empty());
    }

    #[test]
    fn config_change_patches_without_rebuild() {
        let mut h = Harness::new(vec![descriptor("clock", "red", true)]);
        h.reconcile();
        let link = h.surface.links.values().next().cloned().unwrap();
        link.subscribe(|_| {});
        h.surface.ops.clear();

        h.registry.upsert(descriptor("clock", "blue", true)).unwrap();
        assert_eq!(h.reconcile(), RenderOutcome::Patched { attributes: 1 });
        assert_eq!(
            h.surface.ops,
            vec![Op::SetAttribute {
                element: ElementHandle(1),
                name: "color".into(),
                value: "blue".into(),
            }]
        );
        assert!(h.reconciler.has_subscriber());
    }

    #[test]
    fn switching_plugin_rebuilds_and_drops_callback() {
        let mut h = Harness::new(vec![
            descriptor("clock", "red", true),
            descriptor("weather", "red", true),
        ]);
        h.reconcile();
        let old_link = h.surface.links.values().next().cloned().unwrap();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        old_link.subscribe(move |_| *counter.lock().unwrap() += 1);
        assert!(h.reconciler.deliver("clock", &json!(1)));

        h.selection.cycle(&h.registry);
        assert_eq!(h.reconcile(), RenderOutcome::Rebuilt);
        assert!(!h.reconciler.has_subscriber());

        // A stale instance re-subscribing must not be reachable either.
        let late = hits.clone();
        old_link.subscribe(move |_| *late.lock().unwrap() += 100);
        assert!(!h.reconciler.deliver("clock", &json!(2)));
        assert!(!h.reconciler.deliver("weather", &json!(3)));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn background_script_controls_link() {
        let mut h = Harness::new(vec![descriptor("clock", "red", false)]);
        h.reconcile();
        assert!(h.surface.links.is_empty());

        let mut h = Harness::new(vec![descriptor("clock", "red", true)]);
        h.reconcile();
        assert_eq!(h.surface.links.len(), 1);
        assert_eq!(h.surface.links.values().next().unwrap().name(), "clock");
    }

    #[test]
    fn missing_script_url_still_renders_element() {
        let mut raw = descriptor("inline", "red", false);
        raw["script"] = json!({"inline": "customElements.define('inline', class {})"});
        let mut h = Harness::new(vec![raw]);
        assert_eq!(h.reconcile(), RenderOutcome::Rebuilt);
        assert!(!h.surface.ops.iter().any(|op| matches!(op, Op::Script { .. })));
        assert!(h.surface.ops.contains(&Op::Append(ElementHandle(1))));
    }
}
