//! Reconciliation of declared documents against observed documents
//!
//! Both sides are directories of `*.json` documents laid out the way
//! `export` writes them. Documents are paired by relative path.

use anyhow::{Context, Result};
use colored::Colorize;
use equivalence::{Comparator, Value, equal_line_by_line, normalize};
use rayon::prelude::*;
use similar::TextDiff;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A top-level field whose values differ
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field name; empty when the documents are not maps
    pub key: String,
    pub local: Option<Value>,
    pub remote: Option<Value>,
}

/// Reconciliation state of one document
#[derive(Debug, Clone, PartialEq)]
pub enum DiffStatus {
    Unchanged,
    Changed { fields: Vec<FieldChange> },
    OnlyLocal,
    OnlyRemote,
    /// One side could not be read or decoded
    Invalid { error: String },
}

/// Result for one document path
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDiff {
    pub path: String,
    pub status: DiffStatus,
}

impl ResourceDiff {
    pub fn is_change(&self) -> bool {
        !matches!(self.status, DiffStatus::Unchanged)
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub changed: usize,
    pub only_local: usize,
    pub only_remote: usize,
    pub invalid: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.status {
                DiffStatus::Unchanged => summary.unchanged += 1,
                DiffStatus::Changed { .. } => summary.changed += 1,
                DiffStatus::OnlyLocal => summary.only_local += 1,
                DiffStatus::OnlyRemote => summary.only_remote += 1,
                DiffStatus::Invalid { .. } => summary.invalid += 1,
            }
        }
        summary
    }

    /// Number of documents that need attention
    pub fn total_changes(&self) -> usize {
        self.changed + self.only_local + self.only_remote + self.invalid
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// Collect `*.json` documents under `dir`, keyed by `/`-separated relative path
pub fn collect_documents(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut documents = BTreeMap::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not list {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let relative = path
            .strip_prefix(dir)
            .with_context(|| format!("{} is outside {}", path.display(), dir.display()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        documents.insert(key, path.to_path_buf());
    }
    Ok(documents)
}

/// Pair documents from both directories and compare them using up to
/// `jobs` threads. Results are sorted by path.
pub fn compute_diffs(
    comparator: &Comparator,
    local_dir: &Path,
    remote_dir: &Path,
    jobs: usize,
) -> Result<Vec<ResourceDiff>> {
    let local = collect_documents(local_dir)?;
    let remote = collect_documents(remote_dir)?;
    let paths: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();
    log::info!(
        "Comparing {} local and {} remote documents",
        local.len(),
        remote.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create diff thread pool")?;

    let diffs = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let status = match (local.get(*path), remote.get(*path)) {
                    (Some(l), Some(r)) => compare_files(comparator, l, r),
                    (Some(_), None) => DiffStatus::OnlyLocal,
                    (None, _) => DiffStatus::OnlyRemote,
                };
                ResourceDiff {
                    path: (*path).clone(),
                    status,
                }
            })
            .collect()
    });
    Ok(diffs)
}

fn compare_files(comparator: &Comparator, local: &Path, remote: &Path) -> DiffStatus {
    let load = |path: &Path| -> Result<Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        equivalence::from_json_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))
    };

    match (load(local), load(remote)) {
        (Ok(l), Ok(r)) => compare_documents(comparator, &l, &r),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("{e:#}");
            DiffStatus::Invalid {
                error: format!("{e:#}"),
            }
        }
    }
}

/// Compare two decoded documents.
///
/// Documents that are not equivalent are broken down into top-level
/// fields. String fields that only differ in JSON formatting or line
/// endings are not reported.
pub fn compare_documents(comparator: &Comparator, local: &Value, remote: &Value) -> DiffStatus {
    if comparator.equivalent(local, remote) {
        return DiffStatus::Unchanged;
    }

    let local = normalize(local).into_value();
    let remote = normalize(remote).into_value();

    let fields: Vec<FieldChange> = match (local.as_ref(), remote.as_ref()) {
        (Some(Value::Map(l)), Some(Value::Map(r))) => {
            let keys: BTreeSet<&String> = l.keys().chain(r.keys()).collect();
            keys.into_iter()
                .filter(|key| !comparator.options().ignore_keys.contains(*key))
                .filter_map(|key| field_change(comparator, key, l.get(key), r.get(key)))
                .collect()
        }
        (l, r) => field_change(comparator, "", l, r).into_iter().collect(),
    };

    if fields.is_empty() {
        DiffStatus::Unchanged
    } else {
        DiffStatus::Changed { fields }
    }
}

fn field_change(
    comparator: &Comparator,
    key: &str,
    local: Option<&Value>,
    remote: Option<&Value>,
) -> Option<FieldChange> {
    let same = match (local, remote) {
        (Some(Value::String(l)), Some(Value::String(r))) => {
            l == r || comparator.equal_text(l, r) || equal_line_by_line(l, r)
        }
        (Some(l), Some(r)) => comparator.equal(l, r),
        (None, None) => true,
        _ => false,
    };

    (!same).then(|| FieldChange {
        key: key.to_string(),
        local: local.cloned(),
        remote: remote.cloned(),
    })
}

// ============================================================================
// Display
// ============================================================================

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff], show_text: bool) {
    let changes: Vec<&ResourceDiff> = diffs.iter().filter(|d| d.is_change()).collect();
    if changes.is_empty() {
        println!();
        println!("  {} No changes ({} documents compared)", "✓".green(), diffs.len());
        return;
    }

    let mut by_type: BTreeMap<&str, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in &changes {
        let resource_type = diff.path.split_once('/').map_or("(root)", |(t, _)| t);
        by_type.entry(resource_type).or_default().push(diff);
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Configuration Diff".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in &by_type {
        println!("│ {}", resource_type.bold());

        for diff in type_diffs {
            let (symbol, note) = match &diff.status {
                DiffStatus::OnlyLocal => ("+".green(), "(declared, not on remote)".to_string()),
                DiffStatus::OnlyRemote => ("-".red(), "(on remote, not declared)".to_string()),
                DiffStatus::Changed { fields } => {
                    let keys: Vec<&str> = fields
                        .iter()
                        .map(|f| if f.key.is_empty() { "(document)" } else { f.key.as_str() })
                        .collect();
                    ("~".yellow(), keys.join(", "))
                }
                DiffStatus::Invalid { error } => ("!".red(), error.clone()),
                DiffStatus::Unchanged => ("=".dimmed(), String::new()),
            };
            println!("│   {} {:<40} {}", symbol, diff.path, note.dimmed());

            if show_text && let DiffStatus::Changed { fields } = &diff.status {
                for field in fields {
                    for line in render_field(field).lines() {
                        println!("│       {line}");
                    }
                }
            }
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changed, {} only local, {} only remote, {} invalid, {} unchanged",
        summary.changed.to_string().yellow(),
        summary.only_local.to_string().green(),
        summary.only_remote.to_string().red(),
        summary.invalid.to_string().red(),
        summary.unchanged.to_string().dimmed()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Render one field change as a unified diff (local → remote)
pub fn render_field(field: &FieldChange) -> String {
    let local = field.local.as_ref().map(render_value).unwrap_or_default();
    let remote = field.remote.as_ref().map(render_value).unwrap_or_default();
    let label = if field.key.is_empty() { "document" } else { field.key.as_str() };

    TextDiff::from_lines(&local, &remote)
        .unified_diff()
        .context_radius(2)
        .header(&format!("local/{label}"), &format!("remote/{label}"))
        .to_string()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let mut text = s.replace("\r\n", "\n");
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        }
        other => {
            let json = serde_json::Value::from(other.clone());
            let mut text = serde_json::to_string_pretty(&json).unwrap_or_default();
            text.push('\n');
            text
        }
    }
}
