use {
    marquee_display::{ElementHandle, PluginLink, ScriptOptions, Surface},
    serde_json::Value,
    std::{
        collections::{HashMap, VecDeque},
        sync::{Arc, Mutex, PoisonError},
    },
    tracing::debug,
};

type Inbox = Arc<Mutex<VecDeque<Value>>>;

/// A plugin element held by the terminal surface.
#[derive(Debug)]
pub struct TerminalElement {
    pub handle: ElementHandle,
    pub tag: String,
    /// Attributes in the order they were first set.
    pub attributes: Vec<(String, String)>,
    link: Option<PluginLink>,
    inbox: Inbox,
}

impl TerminalElement {
    fn new(handle: ElementHandle, tag: &str) -> Self {
        Self {
            handle,
            tag: tag.to_owned(),
            attributes: Vec::new(),
            link: None,
            inbox: Inbox::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn link(&self) -> Option<&PluginLink> {
        self.link.as_ref()
    }

    /// Messages received from the server, oldest first.
    pub fn inbox(&self) -> Vec<Value> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// In-memory surface drawn by the terminal UI.
///
/// Elements attached with a messaging link get a subscription that keeps the
/// last `inbox_capacity` inbound messages.
#[derive(Debug)]
pub struct TerminalSurface {
    next_id: u64,
    elements: HashMap<ElementHandle, TerminalElement>,
    mounted: Vec<ElementHandle>,
    scripts: Vec<String>,
    inbox_capacity: usize,
}

impl TerminalSurface {
    pub fn new(inbox_capacity: usize) -> Self {
        Self {
            next_id: 0,
            elements: HashMap::new(),
            mounted: Vec::new(),
            scripts: Vec::new(),
            inbox_capacity: inbox_capacity.max(1),
        }
    }

    /// Mounted elements in append order.
    pub fn mounted(&self) -> impl Iterator<Item = &TerminalElement> {
        self.mounted.iter().filter_map(|h| self.elements.get(h))
    }

    /// The most recently mounted element.
    pub fn current(&self) -> Option<&TerminalElement> {
        self.mounted.last().and_then(|h| self.elements.get(h))
    }

    /// Module scripts attached since the last clear.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Send a message on behalf of the current element. Returns `false` when
    /// it has no messaging link.
    pub fn send(&self, mesg: Value) -> bool {
        match self.current().and_then(TerminalElement::link) {
            Some(link) => {
                link.send(mesg);
                true
            },
            None => false,
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Surface for TerminalSurface {
    fn create_element(&mut self, tag: &str) -> ElementHandle {
        self.next_id += 1;
        let handle = ElementHandle(self.next_id);
        self.elements.insert(handle, TerminalElement::new(handle, tag));
        handle
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        let Some(el) = self.elements.get_mut(&element) else {
            debug!(element = element.0, name, "attribute on unknown element");
            return;
        };
        match el.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => el.attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.mounted.clear();
        self.scripts.clear();
    }

    fn append(&mut self, element: ElementHandle) {
        if self.elements.contains_key(&element) && !self.mounted.contains(&element) {
            self.mounted.push(element);
        }
    }

    fn attach_script(&mut self, url: &str, options: ScriptOptions) {
        debug!(url, module = options.module, "script attached");
        self.scripts.push(url.to_owned());
    }

    fn attach_link(&mut self, element: ElementHandle, link: PluginLink) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        let inbox = Arc::clone(&el.inbox);
        let capacity = self.inbox_capacity;
        link.subscribe(move |mesg| {
            let mut queue = inbox.lock().unwrap_or_else(PoisonError::into_inner);
            if queue.len() == capacity {
                queue.pop_front();
            }
            queue.push_back(mesg.clone());
        });
        el.link = Some(link);
    }
}
