//! In-memory collaborators that record what the core asks of them.

use {
    crate::surface::{ElementHandle, Outbox, PluginLink, ScriptOptions, Surface},
    marquee_protocol::Envelope,
    std::{
        collections::HashMap,
        sync::{Mutex, PoisonError},
    },
};

/// A single surface call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Clear,
    Script { url: String, module: bool },
    Create { tag: String, element: ElementHandle },
    SetAttribute {
        element: ElementHandle,
        name: String,
        value: String,
    },
    Append(ElementHandle),
    Link { element: ElementHandle },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

/// A [`Surface`] that keeps a call log and the resulting element state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    pub elements: HashMap<ElementHandle, RecordedElement>,
    pub mounted: Vec<ElementHandle>,
    pub scripts: Vec<String>,
    pub links: HashMap<ElementHandle, PluginLink>,
    next_id: u64,
}

impl RecordingSurface {
    /// Tag of the single mounted element, if exactly one is mounted.
    pub fn mounted_tag(&self) -> Option<&str> {
        match self.mounted.as_slice() {
            [only] => self.elements.get(only).map(|e| e.tag.as_str()),
            _ => None,
        }
    }

    /// Current value of an attribute on the mounted element with `tag`.
    pub fn attribute(&self, tag: &str, name: &str) -> Option<&str> {
        self.mounted
            .iter()
            .filter_map(|h| self.elements.get(h))
            .find(|e| e.tag == tag)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The link attached to the mounted element, if any.
    pub fn mounted_link(&self) -> Option<&PluginLink> {
        self.mounted.iter().find_map(|h| self.links.get(h))
    }
}

impl Surface for RecordingSurface {
    fn create_element(&mut self, tag: &str) -> ElementHandle {
        self.next_id += 1;
        let element = ElementHandle(self.next_id);
        self.elements.insert(element, RecordedElement {
            tag: tag.to_owned(),
            attributes: Vec::new(),
        });
        self.ops.push(Op::Create {
            tag: tag.to_owned(),
            element,
        });
        element
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        if let Some(recorded) = self.elements.get_mut(&element) {
            match recorded.attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_owned(),
                None => recorded
                    .attributes
                    .push((name.to_owned(), value.to_owned())),
            }
        }
        self.ops.push(Op::SetAttribute {
            element,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn clear(&mut self) {
        self.mounted.clear();
        self.scripts.clear();
        self.links.clear();
        self.ops.push(Op::Clear);
    }

    fn append(&mut self, element: ElementHandle) {
        self.mounted.push(element);
        self.ops.push(Op::Append(element));
    }

    fn attach_script(&mut self, url: &str, options: ScriptOptions) {
        self.scripts.push(url.to_owned());
        self.ops.push(Op::Script {
            url: url.to_owned(),
            module: options.module,
        });
    }

    fn attach_link(&mut self, element: ElementHandle, link: PluginLink) {
        self.links.insert(element, link);
        self.ops.push(Op::Link { element });
    }
}

/// An [`Outbox`] that stores every envelope sent.
#[derive(Debug, Default)]
pub struct RecordingOutbox {
    sent: Mutex<Vec<Envelope>>,
}

impl RecordingOutbox {
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Outbox for RecordingOutbox {
    fn send(&self, envelope: Envelope) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope);
    }
}
