use {
    crate::{
        descriptor::{HostAddress, Plugin},
        error::DescriptorError,
    },
    serde_json::Value,
    tracing::{debug, warn},
};

/// Result of applying a single descriptor with [`PluginRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new enabled plugin was added.
    Inserted,
    /// An existing entry was overwritten with a different descriptor.
    Replaced,
    /// The stored descriptor was already identical.
    Unchanged,
    /// The descriptor is disabled and its previous entry was dropped.
    Removed,
    /// The descriptor is disabled and was not present.
    Absent,
}

/// The enabled plugins known to the display, keyed by name.
///
/// Iteration follows insertion order; overwriting an entry keeps its place.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    host: HostAddress,
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    pub fn new(host: HostAddress) -> Self {
        Self {
            host,
            plugins: Vec::new(),
        }
    }

    pub fn host(&self) -> &HostAddress {
        &self.host
    }

    /// Replace the whole registry with the enabled subset of `descriptors`.
    ///
    /// Malformed descriptors are skipped and returned; the rest still apply.
    pub fn replace_all(&mut self, descriptors: Vec<Value>) -> Vec<DescriptorError> {
        let mut rejected = Vec::new();
        self.plugins.clear();

        for raw in descriptors {
            match Plugin::from_value(raw, &self.host) {
                Ok(plugin) if plugin.enabled => {
                    self.put(plugin);
                },
                Ok(plugin) => {
                    debug!(plugin = %plugin.name, "skipping disabled plugin");
                },
                Err(e) => {
                    warn!(error = %e, "rejected plugin descriptor");
                    rejected.push(e);
                },
            }
        }

        debug!(
            plugins = self.plugins.len(),
            rejected = rejected.len(),
            "registry replaced"
        );
        rejected
    }

    /// Insert, overwrite or drop a single plugin depending on its `enabled`
    /// config. A malformed descriptor leaves the registry untouched.
    pub fn upsert(&mut self, descriptor: Value) -> Result<Upsert, DescriptorError> {
        let plugin = Plugin::from_value(descriptor, &self.host)?;
        Ok(self.apply(plugin))
    }

    /// [`upsert`](Self::upsert) for an already normalized plugin.
    pub fn apply(&mut self, plugin: Plugin) -> Upsert {
        if !plugin.enabled {
            return if self.remove(&plugin.name) {
                Upsert::Removed
            } else {
                Upsert::Absent
            };
        }
        self.put(plugin)
    }

    /// Remove a plugin by name. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name != name);
        self.plugins.len() != before
    }

    pub fn clear(&mut self) {
        self.plugins.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.name == name)
    }

    pub fn first(&self) -> Option<&Plugin> {
        self.plugins.first()
    }

    pub fn at(&self, index: usize) -> Option<&Plugin> {
        self.plugins.get(index)
    }

    pub fn list(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn put(&mut self, plugin: Plugin) -> Upsert {
        match self.plugins.iter_mut().find(|p| p.name == plugin.name) {
            Some(existing) if *existing == plugin => Upsert::Unchanged,
            Some(existing) => {
                *existing = plugin;
                Upsert::Replaced
            },
            None => {
                self.plugins.push(plugin);
                Upsert::Inserted
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn registry() -> PluginRegistry {
        PluginRegistry::new(HostAddress::parse("localhost:3012").unwrap())
    }

    fn plugin(name: &str, enabled: bool) -> Value {
        json!({
            "name": name,
            "version": "1.0.0",
            "configs": [
                {"name": "enabled", "type": "checkbox", "value": enabled, "default": false},
                {"name": "color", "type": "color", "value": "red", "default": "black"}
            ],
            "script": {"url": format!("/script/{name}.js")}
        })
    }

    #[test]
    fn replace_all_keeps_only_enabled() {
        let mut reg = registry();
        let rejected = reg.replace_all(vec![
            plugin("a", true),
            plugin("b", false),
            plugin("c", true),
        ]);
        assert!(rejected.is_empty());
        assert_eq!(reg.names().collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn replace_all_discards_previous_entries() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true)]);
        reg.replace_all(vec![plugin("b", true)]);
        assert_eq!(reg.names().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn replace_all_dedupes_by_name_keeping_first_position() {
        let mut reg = registry();
        let mut later_a = plugin("a", true);
        later_a["version"] = json!("2.0.0");
        reg.replace_all(vec![plugin("a", true), plugin("b", true), later_a]);

        assert_eq!(reg.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(reg.get("a").unwrap().version, "2.0.0");
    }

    #[test]
    fn replace_all_rejects_malformed_individually() {
        let mut reg = registry();
        let broken = json!({
            "name": "broken",
            "version": "1",
            "configs": [],
            "script": {}
        });
        let rejected = reg.replace_all(vec![plugin("a", true), broken, plugin("b", true)]);

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].plugin(), Some("broken"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn unrecognized_config_tags_keep_plugin_registered() {
        let mut reg = registry();
        let mut switch = plugin("w", true);
        switch["configs"][0]["type"] = json!("switch");
        let mut select = plugin("u", true);
        select["configs"][1] = json!({"name": "units", "type": "select", "value": 2, "default": 1});

        let rejected = reg.replace_all(vec![switch, select]);
        assert!(rejected.is_empty());
        assert_eq!(reg.names().collect::<Vec<_>>(), ["w", "u"]);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true)]);

        assert_eq!(reg.upsert(plugin("b", true)).unwrap(), Upsert::Inserted);
        let snapshot = reg.list().to_vec();
        for _ in 0..3 {
            assert_eq!(reg.upsert(plugin("b", true)).unwrap(), Upsert::Unchanged);
        }
        assert_eq!(reg.list(), snapshot.as_slice());
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true), plugin("b", true)]);

        let mut changed = plugin("a", true);
        changed["configs"][1]["value"] = json!("blue");
        assert_eq!(reg.upsert(changed).unwrap(), Upsert::Replaced);

        assert_eq!(reg.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            reg.get("a").unwrap().config("color").unwrap().value.display(),
            Some("blue".into())
        );
    }

    #[test]
    fn upsert_disabled_removes() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true)]);

        assert_eq!(reg.upsert(plugin("a", false)).unwrap(), Upsert::Removed);
        assert!(reg.is_empty());
        assert_eq!(reg.upsert(plugin("a", false)).unwrap(), Upsert::Absent);
    }

    #[test]
    fn upsert_malformed_leaves_registry_untouched() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true)]);
        let before = reg.list().to_vec();

        let err = reg.upsert(json!({"name": "a"})).unwrap_err();
        assert_eq!(err.plugin(), Some("a"));
        assert_eq!(reg.list(), before.as_slice());
    }

    #[test]
    fn remove_twice_is_noop() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true), plugin("b", true)]);

        assert!(reg.remove("a"));
        assert_eq!(reg.len(), 1);
        assert!(!reg.remove("a"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn script_urls_are_not_prefixed_twice() {
        let mut reg = registry();
        reg.replace_all(vec![plugin("a", true)]);
        reg.upsert(plugin("b", true)).unwrap();
        reg.upsert(plugin("b", true)).unwrap();

        for p in reg.iter() {
            let url = p.script.url.as_deref().unwrap();
            assert_eq!(url, format!("http://localhost:3012/script/{}.js", p.name));
        }
    }
}
