// Entity -> app-group resolution. The real lookup lives in the catalog
// service; this boundary only needs "some groups" or "none".

use std::collections::HashMap;

use crate::config::CatalogConfig;

pub trait GroupCatalog: Send + Sync {
    /// App groups scoping upstream queries (and the cache) for `entity`,
    /// or `None` when the entity carries no grouping annotation.
    fn app_groups(&self, entity: &str) -> Option<Vec<String>>;
}

/// Config-backed catalog: a static entity -> groups table.
pub struct StaticCatalog {
    entities: HashMap<String, Vec<String>>,
}

impl StaticCatalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            entities: config.entities.clone(),
        }
    }
}

impl GroupCatalog for StaticCatalog {
    fn app_groups(&self, entity: &str) -> Option<Vec<String>> {
        self.entities
            .get(entity)
            .filter(|groups| !groups.is_empty())
            .cloned()
    }
}
