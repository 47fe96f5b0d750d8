//! Export of remote resources into per-resource documents
//!
//! Names are allocated sequentially in input order, so the same input
//! exported into an empty directory always produces the same files.
//! Existing documents are never overwritten: exporting again into a
//! populated directory allocates fresh suffixes (`Overview_1`). Writing
//! happens in parallel.

use anyhow::{Context, Result, bail};
use equivalence::OneOrMany;
use naming::NameAllocator;
use rayon::prelude::*;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;

/// Keys that only steer the export and are not part of the document
const BOOKKEEPING_KEYS: &[&str] = &["type", "exportName"];

/// A resource as delivered by the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResource {
    pub resource_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub export_name: Option<String>,
    /// Remaining fields, written out as the document body
    pub body: Map<String, Json>,
}

impl RemoteResource {
    /// Build from a JSON object with at least a string `type`
    pub fn from_json(value: Json) -> Result<Self> {
        let mut body = match value {
            Json::Object(body) => body,
            other => bail!("Resource must be a JSON object, got {}", kind_of(&other)),
        };

        let resource_type = match body.get("type") {
            Some(Json::String(t)) if !t.trim().is_empty() => t.clone(),
            _ => bail!("Resource is missing a string \"type\""),
        };

        let text = |body: &Map<String, Json>, key: &str| match body.get(key) {
            Some(Json::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Json::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let id = text(&body, "id");
        let name = text(&body, "name");
        let export_name = text(&body, "exportName");

        for key in BOOKKEEPING_KEYS {
            body.remove(*key);
        }

        Ok(Self {
            resource_type,
            id,
            name,
            export_name,
            body,
        })
    }

    /// Human-readable name proposed for the block.
    ///
    /// An explicit export name wins over the display name, then the id,
    /// then the resource type itself.
    pub fn candidate(&self) -> &str {
        self.export_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.id.as_deref())
            .unwrap_or(&self.resource_type)
    }
}

fn kind_of(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Load resources from a JSON file holding one object or an array of them
pub fn load_resources(path: &Path) -> Result<Vec<RemoteResource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    parse_resources(&content).with_context(|| format!("Invalid resources in {}", path.display()))
}

/// Parse resources from JSON text
pub fn parse_resources(content: &str) -> Result<Vec<RemoteResource>> {
    let items: OneOrMany<Json> = serde_json::from_str(content).context("Invalid JSON")?;
    items
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            RemoteResource::from_json(item).with_context(|| format!("Resource #{}", i + 1))
        })
        .collect()
}

/// One document to be written
#[derive(Debug, Clone)]
pub struct ExportEntry {
    pub resource_type: String,
    pub name: String,
    pub path: PathBuf,
    pub body: Json,
}

/// Outcome of writing one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResult {
    Written,
    Skipped { reason: String },
    Failed { error: String },
}

/// Summary of an export run
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
    /// (resource path, error message)
    pub failed: Vec<(String, String)>,
}

impl ExportSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed.len()
    }
}

/// Export session over one output directory.
///
/// Each resource type gets its own allocator, since names only need to be
/// unique within a type.
pub struct Exporter<'a> {
    config: &'a Config,
    out_dir: PathBuf,
    allocators: BTreeMap<String, NameAllocator>,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a Config, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            out_dir: out_dir.into(),
            allocators: BTreeMap::new(),
        }
    }

    /// Allocate a name and output path for every resource, in input order.
    pub fn plan(&mut self, resources: Vec<RemoteResource>) -> Result<Vec<ExportEntry>> {
        let mut entries = Vec::with_capacity(resources.len());

        for resource in resources {
            let type_dir = naming::sanitize(&resource.resource_type);
            let dir = self.out_dir.join(&type_dir);

            let allocator = match self.allocators.entry(type_dir.clone()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let allocator = self.config.allocator();
                    let blocked = block_existing(&allocator, &dir)?;
                    if blocked > 0 {
                        log::info!("{type_dir}: {blocked} existing documents kept");
                    }
                    slot.insert(allocator)
                }
            };

            let candidate = if self.config.sanitize {
                naming::sanitize(resource.candidate())
            } else {
                escape_separators(resource.candidate())
            };
            let name = allocator
                .next(&candidate)
                .with_context(|| format!("Could not allocate a name for '{candidate}'"))?;
            log::debug!("{type_dir}: '{}' -> '{name}'", resource.candidate());

            let path = dir.join(format!("{name}.json"));
            if path.parent() != Some(dir.as_path()) {
                bail!("Name '{name}' does not stay inside {}", dir.display());
            }

            entries.push(ExportEntry {
                path,
                resource_type: type_dir,
                name,
                body: Json::Object(resource.body),
            });
        }

        Ok(entries)
    }

    /// Write planned entries using up to `jobs` threads
    pub fn write(&self, entries: &[ExportEntry], jobs: usize, dry_run: bool) -> Result<ExportSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()
            .context("Failed to create export thread pool")?;

        let results: Vec<ExportResult> =
            pool.install(|| entries.par_iter().map(|entry| self.write_entry(entry, dry_run)).collect());

        let mut summary = ExportSummary::default();
        for (entry, result) in entries.iter().zip(results) {
            match result {
                ExportResult::Written => summary.written += 1,
                ExportResult::Skipped { reason } => {
                    log::debug!("{}/{}: {reason}", entry.resource_type, entry.name);
                    summary.skipped += 1;
                }
                ExportResult::Failed { error } => {
                    summary
                        .failed
                        .push((format!("{}/{}", entry.resource_type, entry.name), error));
                }
            }
        }
        Ok(summary)
    }

    fn write_entry(&self, entry: &ExportEntry, dry_run: bool) -> ExportResult {
        if dry_run {
            return ExportResult::Skipped {
                reason: "Dry run".to_string(),
            };
        }

        let Some(allocator) = self.allocators.get(&entry.resource_type) else {
            return ExportResult::Failed {
                error: format!("no allocator for type '{}'", entry.resource_type),
            };
        };
        if allocator.mark_emitted(&entry.name) {
            log::warn!("{}/{} was already written", entry.resource_type, entry.name);
            return ExportResult::Failed {
                error: "already written by another resource".to_string(),
            };
        }

        match write_document(&entry.path, &entry.body) {
            Ok(()) => ExportResult::Written,
            Err(e) => ExportResult::Failed {
                error: format!("{e:#}"),
            },
        }
    }
}

/// Replace path separators so a name always maps to a single file name
fn escape_separators(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

/// Block the stems of existing `*.json` documents in `dir`
fn block_existing(allocator: &NameAllocator, dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut blocked = 0;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Could not list {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            allocator.block(stem);
            blocked += 1;
        }
    }
    Ok(blocked)
}

fn write_document(path: &Path, body: &Json) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    let mut content = serde_json::to_string_pretty(body).context("Failed to serialize document")?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))
}
