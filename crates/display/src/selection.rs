use crate::{
    descriptor::Plugin,
    error::{Error, Result},
    registry::PluginRegistry,
};

/// Which plugin is chosen for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Resolve the selection against the registry.
    ///
    /// An unset selection defaults to the first plugin. A name that is no
    /// longer registered falls back to the first remaining plugin, or to no
    /// selection when the registry is empty.
    pub fn resolve<'a>(&mut self, registry: &'a PluginRegistry) -> Option<&'a Plugin> {
        let resolved = self
            .current
            .as_deref()
            .and_then(|name| registry.get(name))
            .or_else(|| registry.first());
        self.current = resolved.map(|p| p.name.clone());
        resolved
    }

    /// Advance to the next plugin in registry order, wrapping around.
    ///
    /// Returns `false` (and changes nothing) when there is nothing to cycle
    /// through.
    pub fn cycle(&mut self, registry: &PluginRegistry) -> bool {
        if registry.len() <= 1 {
            return false;
        }
        let next = match self.current.as_deref().and_then(|n| registry.position(n)) {
            Some(index) => (index + 1) % registry.len(),
            None => 0,
        };
        self.current = registry.at(next).map(|p| p.name.clone());
        true
    }

    /// Select a specific registered plugin.
    pub fn select(&mut self, registry: &PluginRegistry, name: &str) -> Result<()> {
        if registry.get(name).is_none() {
            return Err(Error::UnknownPlugin(name.to_owned()));
        }
        self.current = Some(name.to_owned());
        Ok(())
    }
}
