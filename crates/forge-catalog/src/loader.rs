//! Loader for catalog documents
//!
//! Reads a catalog directory into an immutable [`Catalog`] snapshot:
//!
//! ```text
//! catalog/
//!   services/
//!     svc-a.yaml
//!     svc-b.yaml
//!   profiles.yaml
//!   sizes.yaml
//!   cost-profiles.yaml
//!   monitoring-profiles.yaml
//!   channels.yaml
//!   pins.yaml
//! ```

use std::collections::BTreeMap;
use std::fs;

use forge_fs::{DocumentStore, NormalizedPath};
use serde::de::DeserializeOwned;

use crate::{Catalog, Error, Result, schema::ServiceSpec};

/// Loads all catalog tables from a catalog directory.
pub struct CatalogLoader {
    store: DocumentStore,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
        }
    }

    /// Load and validate the whole catalog.
    ///
    /// Any malformed document or violated invariant aborts the load; a
    /// run never starts on a partially valid catalog.
    pub fn load(&self, root: &NormalizedPath) -> Result<Catalog> {
        if !root.is_dir() {
            return Err(Error::CatalogDirNotFound {
                path: root.to_native(),
            });
        }

        let mut sources = BTreeMap::new();
        let services = self.load_services(root, &mut sources)?;

        let catalog = Catalog {
            services,
            profiles: self.load_table(root, "profiles", &mut sources)?,
            sizes: self.load_table(root, "sizes", &mut sources)?,
            cost_profiles: self.load_table(root, "cost-profiles", &mut sources)?,
            monitoring_profiles: self.load_table(root, "monitoring-profiles", &mut sources)?,
            channels: self.load_table(root, "channels", &mut sources)?,
            pins: self
                .load_document(root, "pins", &mut sources)?
                .unwrap_or_default(),
            sources,
        };

        catalog.validate()?;

        tracing::debug!(
            services = catalog.services.len(),
            profiles = catalog.profiles.len(),
            sizes = catalog.sizes.len(),
            channels = catalog.channels.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Load every service document from `services/`.
    fn load_services(
        &self,
        root: &NormalizedPath,
        sources: &mut BTreeMap<String, std::path::PathBuf>,
    ) -> Result<BTreeMap<String, ServiceSpec>> {
        let services_dir = root.join("services");
        let mut services = BTreeMap::new();

        if !services_dir.is_dir() {
            return Ok(services);
        }

        let native = services_dir.to_native();
        let mut entries: Vec<_> = fs::read_dir(&native)
            .map_err(|e| forge_fs::Error::io(&native, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| forge_fs::Error::io(&native, e))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = NormalizedPath::new(entry.path());
            let Some(ext) = path.extension() else { continue };
            if !matches!(ext, "yaml" | "yml" | "toml" | "json") {
                continue;
            }

            let spec: ServiceSpec = self
                .store
                .load(&path)
                .map_err(|e| Error::schema(entry.path(), e.to_string()))?;

            let stem = path.file_stem().unwrap_or_default().to_string();
            if spec.name != stem {
                return Err(Error::schema(
                    entry.path(),
                    format!("service name '{}' does not match file stem '{stem}'", spec.name),
                ));
            }

            sources.insert(format!("services/{}", spec.name), entry.path());
            services.insert(spec.name.clone(), spec);
        }

        Ok(services)
    }

    /// Load one optional top-level table document, keyed by name.
    fn load_table<T: DeserializeOwned>(
        &self,
        root: &NormalizedPath,
        table: &str,
        sources: &mut BTreeMap<String, std::path::PathBuf>,
    ) -> Result<BTreeMap<String, T>> {
        Ok(self.load_document(root, table, sources)?.unwrap_or_default())
    }

    /// Load one optional top-level document by table name.
    fn load_document<T: DeserializeOwned>(
        &self,
        root: &NormalizedPath,
        table: &str,
        sources: &mut BTreeMap<String, std::path::PathBuf>,
    ) -> Result<Option<T>> {
        for ext in ["yaml", "yml", "toml", "json"] {
            let path = root.join(&format!("{table}.{ext}"));
            if path.is_file() {
                let doc = self
                    .store
                    .load(&path)
                    .map_err(|e| Error::schema(path.to_native(), e.to_string()))?;
                sources.insert(table.to_string(), path.to_native());
                return Ok(Some(doc));
            }
        }
        sources.insert(table.to_string(), root.join(&format!("{table}.yaml")).to_native());
        Ok(None)
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}
