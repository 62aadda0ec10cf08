//! Boundary traits towards the rendering host and the control channel.

use {
    marquee_protocol::Envelope,
    serde_json::Value,
    std::sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Opaque reference to an element created by a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// How a script is attached to the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Execute as an isolated module.
    pub module: bool,
}

/// Rendering primitives the reconciler drives.
pub trait Surface {
    fn create_element(&mut self, tag: &str) -> ElementHandle;
    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str);
    /// Remove everything rendered so far.
    fn clear(&mut self);
    fn append(&mut self, element: ElementHandle);
    fn attach_script(&mut self, url: &str, options: ScriptOptions);
    /// Hand the send/subscribe wiring to a created element.
    fn attach_link(&mut self, element: ElementHandle, link: PluginLink);
}

/// Outbound half of the control channel.
pub trait Outbox: Send + Sync {
    fn send(&self, envelope: Envelope);
}

/// Callback registered by a rendered instance for its inbound messages.
pub type InboundCallback = Box<dyn FnMut(&Value) + Send>;

/// Holds the inbound callback of one rendered instance.
///
/// The reconciler creates a fresh slot on every rebuild, so links held by a
/// torn-down instance point at a slot nobody delivers to anymore.
#[derive(Default)]
pub struct InboundSlot {
    callback: Option<InboundCallback>,
}

impl InboundSlot {
    pub fn is_registered(&self) -> bool {
        self.callback.is_some()
    }
}

impl std::fmt::Debug for InboundSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

pub(crate) type SharedSlot = Arc<Mutex<InboundSlot>>;

pub(crate) fn lock(slot: &SharedSlot) -> MutexGuard<'_, InboundSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Invoke the slot's callback, if any. Returns whether one ran.
///
/// The callback is taken out while it runs so it may call
/// [`PluginLink::subscribe`] itself; a replacement registered meanwhile wins.
pub(crate) fn deliver(slot: &SharedSlot, mesg: &Value) -> bool {
    let Some(mut callback) = lock(slot).callback.take() else {
        return false;
    };
    callback(mesg);
    let mut guard = lock(slot);
    if guard.callback.is_none() {
        guard.callback = Some(callback);
    }
    true
}

/// Send/subscribe capabilities handed to a rendered plugin instance.
#[derive(Clone)]
pub struct PluginLink {
    name: String,
    outbox: Arc<dyn Outbox>,
    slot: SharedSlot,
}

impl PluginLink {
    pub(crate) fn new(name: impl Into<String>, outbox: Arc<dyn Outbox>, slot: SharedSlot) -> Self {
        Self {
            name: name.into(),
            outbox,
            slot,
        }
    }

    /// Name of the plugin this link speaks for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward a message to the server as `pluginMessage` from this plugin.
    pub fn send(&self, mesg: Value) {
        self.outbox.send(Envelope::plugin_message(&self.name, mesg));
    }

    /// Register the callback for inbound messages, replacing any previous one.
    pub fn subscribe(&self, callback: impl FnMut(&Value) + Send + 'static) {
        lock(&self.slot).callback = Some(Box::new(callback));
    }
}

impl std::fmt::Debug for PluginLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLink")
            .field("name", &self.name)
            .field("slot", &*lock(&self.slot))
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[derive(Default)]
    struct Captured(Mutex<Vec<Envelope>>);

    impl Outbox for Captured {
        fn send(&self, envelope: Envelope) {
            self.0.lock().unwrap().push(envelope);
        }
    }

    #[test]
    fn send_wraps_with_plugin_name() {
        let outbox = Arc::new(Captured::default());
        let link = PluginLink::new("clock", outbox.clone(), SharedSlot::default());
        link.send(json!({"ping": true}));

        let sent = outbox.0.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            [Envelope::plugin_message("clock", json!({"ping": true}))]
        );
    }

    #[test]
    fn subscribe_replaces_previous_callback() {
        let slot = SharedSlot::default();
        let link = PluginLink::new("clock", Arc::new(Captured::default()), slot.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        link.subscribe(move |m| first.lock().unwrap().push(("first", m.clone())));
        let second = seen.clone();
        link.subscribe(move |m| second.lock().unwrap().push(("second", m.clone())));

        assert!(deliver(&slot, &json!(1)));
        assert_eq!(*seen.lock().unwrap(), vec![("second", json!(1))]);
    }

    #[test]
    fn deliver_without_callback_is_false() {
        assert!(!deliver(&SharedSlot::default(), &json!(null)));
    }

    #[test]
    fn callback_may_resubscribe_while_running() {
        let slot = SharedSlot::default();
        let link = PluginLink::new("clock", Arc::new(Captured::default()), slot.clone());
        let count = Arc::new(Mutex::new(0));

        let inner_link = link.clone();
        let inner_count = count.clone();
        link.subscribe(move |_| {
            let again = inner_count.clone();
            inner_link.subscribe(move |_| *again.lock().unwrap() += 10);
        });

        assert!(deliver(&slot, &json!(1)));
        assert!(deliver(&slot, &json!(2)));
        assert_eq!(*count.lock().unwrap(), 10);
    }
}
