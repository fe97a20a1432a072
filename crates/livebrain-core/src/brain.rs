//! The Living Brain: persisted project state kept next to the project sources.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ComponentNode, CoreError};

pub const BRAIN_DIR: &str = ".livebrain";
pub const BRAIN_FILE: &str = "brain.json";
pub const BRAIN_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(default = "default_styling")]
    pub styling: String,
}

fn default_framework() -> String {
    "nextjs".to_string()
}

fn default_styling() -> String {
    "tailwind".to_string()
}

impl ProjectInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            framework: default_framework(),
            styling: default_styling(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub path: String,
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub event: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivingBrain {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentNode>,
    /// Last compiled architecture plan, kept as raw JSON so the core crate
    /// does not depend on the compiler's types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated: Vec<GeneratedFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

fn default_version() -> u32 {
    BRAIN_VERSION
}

impl LivingBrain {
    pub fn new(project: ProjectInfo) -> Self {
        Self {
            version: BRAIN_VERSION,
            project,
            components: None,
            plan: None,
            generated: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Append a history entry. Sequence numbers only ever increase.
    pub fn record(&mut self, event: &str, detail: impl Into<String>) {
        let seq = self.history.last().map(|h| h.seq + 1).unwrap_or(1);
        self.history.push(HistoryEntry {
            seq,
            event: event.to_string(),
            detail: detail.into(),
        });
    }

    /// Record a generated file, replacing an earlier entry for the same path.
    pub fn add_generated(&mut self, file: GeneratedFile) {
        self.generated.retain(|g| g.path != file.path);
        self.generated.push(file);
    }
}

// --- Storage ---

pub fn brain_dir(project_root: &Path) -> PathBuf {
    project_root.join(BRAIN_DIR)
}

pub fn brain_path(project_root: &Path) -> PathBuf {
    brain_dir(project_root).join(BRAIN_FILE)
}

pub fn brain_exists(project_root: &Path) -> bool {
    brain_path(project_root).exists()
}

pub fn read_brain(project_root: &Path) -> Result<LivingBrain, CoreError> {
    let path = brain_path(project_root);
    if !path.exists() {
        return Err(CoreError::MissingBrain(project_root.to_path_buf()));
    }
    let raw = fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|e| CoreError::json(&path, e))
}

/// Write the brain atomically (temp file + rename) so a crash mid-write
/// never leaves a truncated brain behind.
pub fn write_brain(project_root: &Path, brain: &LivingBrain) -> Result<(), CoreError> {
    let dir = brain_dir(project_root);
    fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
    let json = serde_json::to_string_pretty(brain).map_err(|e| CoreError::json(&dir, e))?;
    let tmp = dir.join(format!(".{BRAIN_FILE}.tmp"));
    let path = dir.join(BRAIN_FILE);
    fs::write(&tmp, json).map_err(|e| CoreError::io(&tmp, e))?;
    fs::rename(&tmp, &path).map_err(|e| CoreError::io(&path, e))?;
    tracing::debug!(path = %path.display(), "wrote living brain");
    Ok(())
}

/// Create a fresh brain. Fails if one already exists unless `force` is set.
pub fn init_brain(
    project_root: &Path,
    project: ProjectInfo,
    force: bool,
) -> Result<LivingBrain, CoreError> {
    if brain_exists(project_root) && !force {
        return Err(CoreError::AlreadyInitialized(project_root.to_path_buf()));
    }
    let mut brain = LivingBrain::new(project);
    brain.record("init", brain.project.name.clone());
    write_brain(project_root, &brain)?;
    Ok(brain)
}

/// Read a component tree from a standalone manifest file.
pub fn read_component_tree(path: &Path) -> Result<ComponentNode, CoreError> {
    let raw = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| CoreError::json(path, e))
}
