//! Descriptor discovery for the registry's extension phase.
//!
//! A [`DescriptorSource`] hands the [`RegistryBuilder`](crate::registry::RegistryBuilder)
//! additional named default models beyond the builtins. The YAML source reads
//! one descriptor per `.yaml`/`.yml` file from a directory:
//!
//! ```yaml
//! id: beamline.fine-grid
//! label: Fine grid
//! description: 64 x 64 over the standard sample holder
//! model:
//!   type: grid
//!   fastAxis: x
//!   slowAxis: y
//!   fastCount: 64
//!   slowCount: 64
//!   boundingBox: { fastAxisStart: 0.0, slowAxisStart: 0.0, fastAxisLength: 8.0, slowAxisLength: 8.0 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::ScanPathModel;

/// A descriptor as discovered from a source, before registration checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDescriptor {
    /// Registry id the descriptor is filed under.
    pub id: String,
    /// Short human-readable name.
    #[serde(default)]
    pub label: Option<String>,
    /// Longer human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// The default model created for this id.
    pub model: ScanPathModel,
}

/// Supplier of descriptors for the registry's extension phase.
pub trait DescriptorSource {
    /// Name used in logs and construction errors.
    fn name(&self) -> &str;

    /// Every descriptor this source offers.
    ///
    /// An `Err` aborts the registry load; sources that prefer to degrade
    /// should log and omit the broken entries instead.
    fn descriptors(&self) -> anyhow::Result<Vec<DiscoveredDescriptor>>;
}

// ============================================================================
// In-memory source
// ============================================================================

/// A fixed, in-memory descriptor source.
#[derive(Debug, Clone)]
pub struct StaticDescriptorSource {
    name: String,
    descriptors: Vec<DiscoveredDescriptor>,
}

impl StaticDescriptorSource {
    /// Wraps a list of descriptors under a source name.
    pub fn new(name: impl Into<String>, descriptors: Vec<DiscoveredDescriptor>) -> Self {
        Self {
            name: name.into(),
            descriptors,
        }
    }
}

impl DescriptorSource for StaticDescriptorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptors(&self) -> anyhow::Result<Vec<DiscoveredDescriptor>> {
        Ok(self.descriptors.clone())
    }
}

// ============================================================================
// YAML directory source
// ============================================================================

/// Reads one descriptor per YAML file from a directory.
///
/// Files are visited in path order so discovery is deterministic. In the
/// default lenient mode unreadable or unparseable files are logged and
/// skipped; in strict mode the first broken file fails the whole load.
#[derive(Debug, Clone)]
pub struct YamlDescriptorSource {
    name: String,
    dir: PathBuf,
    strict: bool,
}

impl YamlDescriptorSource {
    /// A lenient source over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: format!("yaml:{}", dir.display()),
            dir,
            strict: false,
        }
    }

    /// Toggles strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

fn is_descriptor_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}

impl DescriptorSource for YamlDescriptorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptors(&self) -> anyhow::Result<Vec<DiscoveredDescriptor>> {
        if !self.dir.is_dir() {
            if self.strict {
                anyhow::bail!("descriptor directory {} does not exist", self.dir.display());
            }
            warn!(
                "descriptor directory {} does not exist, nothing discovered",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("reading descriptor directory {}", self.dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_descriptor_file(path))
            .collect();
        paths.sort();

        let mut discovered = Vec::with_capacity(paths.len());
        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    if self.strict {
                        return Err(e)
                            .with_context(|| format!("reading descriptor {}", path.display()));
                    }
                    warn!("failed to read descriptor {}: {}", path.display(), e);
                    continue;
                }
            };
            let descriptor: DiscoveredDescriptor = match serde_yaml::from_str(&content) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    if self.strict {
                        return Err(e)
                            .with_context(|| format!("parsing descriptor {}", path.display()));
                    }
                    warn!("failed to parse descriptor {}: {}", path.display(), e);
                    continue;
                }
            };
            debug!(
                "discovered descriptor '{}' from {}",
                descriptor.id,
                path.display()
            );
            discovered.push(descriptor);
        }
        Ok(discovered)
    }
}
