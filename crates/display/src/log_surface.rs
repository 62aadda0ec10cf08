use {
    crate::surface::{ElementHandle, PluginLink, ScriptOptions, Surface},
    tracing::info,
};

/// A [`Surface`] that renders nothing and reports every operation through
/// `tracing`. Inbound plugin messages are subscribed to and logged as well.
#[derive(Debug, Default)]
pub struct LogSurface {
    next_id: u64,
    mounted: usize,
}

impl LogSurface {
    /// Number of elements appended since the last clear.
    pub fn mounted(&self) -> usize {
        self.mounted
    }
}

impl Surface for LogSurface {
    fn create_element(&mut self, tag: &str) -> ElementHandle {
        self.next_id += 1;
        info!(element = self.next_id, tag, "create element");
        ElementHandle(self.next_id)
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        info!(element = element.0, name, value, "set attribute");
    }

    fn clear(&mut self) {
        self.mounted = 0;
        info!("clear surface");
    }

    fn append(&mut self, element: ElementHandle) {
        self.mounted += 1;
        info!(element = element.0, "append element");
    }

    fn attach_script(&mut self, url: &str, options: ScriptOptions) {
        info!(url, module = options.module, "attach script");
    }

    fn attach_link(&mut self, element: ElementHandle, link: PluginLink) {
        info!(element = element.0, plugin = link.name(), "attach messaging link");
        let plugin = link.name().to_owned();
        link.subscribe(move |mesg| info!(plugin = %plugin, mesg = %mesg, "plugin message"));
    }
}
