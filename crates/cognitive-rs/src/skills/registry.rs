//! Skill discovery and loading.
//!
//! A skill is a folder containing a `skill.md` whose YAML frontmatter names
//! and describes it:
//!
//! ```text
//! ---
//! name: python-best-practices
//! description: Python coding best practices
//! license: MIT
//! ---
//!
//! # Python Best Practices
//! ...
//! ```
//!
//! Any other file in the folder is an artifact the model may load by
//! relative path.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File name that marks a skill folder.
pub const SKILL_FILE: &str = "skill.md";

/// A problem found while registering skills.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("Skill folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("Skill path must be a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("No skill.md files found in folder: {0}")]
    NoSkillFiles(PathBuf),
    #[error("Failed to read skill.md at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "No YAML frontmatter found in {0}. Expected format:\n---\nname: skill-name\ndescription: skill-description\n---"
    )]
    MissingFrontmatter(PathBuf),
    #[error("Invalid YAML frontmatter in {path}: {source}")]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("YAML frontmatter must be a dictionary in {0}")]
    NotAMapping(PathBuf),
    #[error("Missing required '{field}' field in {path}")]
    MissingField { field: &'static str, path: PathBuf },
    #[error("Empty '{field}' field in {path}")]
    EmptyField { field: &'static str, path: PathBuf },
    #[error("'{field}' field must be a string in {path}")]
    NotAString { field: &'static str, path: PathBuf },
}

/// A registered skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMetadata {
    pub name: String,
    pub description: String,
    pub license: Option<String>,
    /// The directory containing `skill.md`; artifacts resolve against it.
    pub folder: PathBuf,
    pub skill_md: PathBuf,
}

/// Registry of skills, keyed by frontmatter name.
///
/// ```ignore
/// let mut skills = Skills::new();
/// skills.register_skill("./skills")?;
///
/// let tools = Planning::new().toolset().merge(skills.toolset());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Skills {
    skills: BTreeMap<String, SkillMetadata>,
}

impl Skills {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every `skill.md` found under `folder`, recursively.
    ///
    /// All files are validated before any is registered, so a failure leaves
    /// the registry unchanged. A skill whose name is already registered is
    /// replaced. Returns the registered names in path order.
    pub fn register_skill(&mut self, folder: impl AsRef<Path>) -> Result<Vec<String>, SkillError> {
        let folder = folder.as_ref();
        if !folder.exists() {
            return Err(SkillError::FolderNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(SkillError::NotADirectory(folder.to_path_buf()));
        }

        let skill_files: Vec<PathBuf> = WalkDir::new(folder)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {e}", folder.display());
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.file_name() == SKILL_FILE)
            .map(|e| e.into_path())
            .collect();

        if skill_files.is_empty() {
            return Err(SkillError::NoSkillFiles(folder.to_path_buf()));
        }

        let parsed = skill_files
            .iter()
            .map(|path| read_metadata(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = Vec::with_capacity(parsed.len());
        for meta in parsed {
            debug!("Registered skill '{}' from {}", meta.name, meta.skill_md.display());
            names.push(meta.name.clone());
            self.skills.insert(meta.name.clone(), meta);
        }
        info!("Registered {} skill(s) from {}", names.len(), folder.display());
        Ok(names)
    }

    pub fn get(&self, name: &str) -> Option<&SkillMetadata> {
        self.skills.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Registered skills, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &SkillMetadata> {
        self.skills.values()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.skills.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Resolve the file a `load` call would read.
    ///
    /// An empty or absent `artifact` means `skill.md`. Errors are the
    /// model-facing `"Error: ..."` strings.
    pub fn resolve(&self, name: &str, artifact: Option<&str>) -> Result<PathBuf, String> {
        let Some(skill) = self.skills.get(name) else {
            let available = if self.skills.is_empty() {
                "none".to_string()
            } else {
                self.names().join(", ")
            };
            return Err(format!(
                "Error: Skill '{name}' not registered. Available skills: {available}"
            ));
        };

        // Blank means skill.md; anything else is joined as given.
        let target = match artifact.filter(|a| !a.trim().is_empty()) {
            None => skill.skill_md.clone(),
            Some(relative) => {
                if escapes_folder(Path::new(relative)) {
                    return Err(format!(
                        "Error: Artifact path must stay inside the skill folder: {relative}"
                    ));
                }
                skill.folder.join(relative)
            }
        };

        if !target.exists() {
            return Err(format!("Error: Artifact file not found: {}", target.display()));
        }
        Ok(target)
    }

    /// Load a skill document or artifact. Never fails: problems come back as
    /// `"Error: ..."` text for the model.
    pub fn load(&self, name: &str, artifact: Option<&str>) -> String {
        match self.resolve(name, artifact) {
            Ok(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| read_error(&path, &e)),
            Err(e) => e,
        }
    }

    /// Async variant of [`load`](Self::load) for use inside tools.
    pub async fn load_async(&self, name: &str, artifact: Option<&str>) -> String {
        match self.resolve(name, artifact) {
            Ok(path) => tokio::fs::read_to_string(&path)
                .await
                .unwrap_or_else(|e| read_error(&path, &e)),
            Err(e) => e,
        }
    }
}

fn read_error(path: &Path, err: &io::Error) -> String {
    format!("Error: Failed to read artifact file {}: {err}", path.display())
}

fn escapes_folder(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

// ── Frontmatter ────────────────────────────────────────────────────

/// Split the YAML block out of `---` delimiters at the top of `content`.
///
/// The opening `---` must be the first line; the block ends at the first
/// line starting with `---` that is followed by a line break.
fn split_frontmatter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let (opening, body) = rest.split_once('\n')?;
    if !opening.trim().is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(offset) = body.get(from..)?.find("\n---") {
        let close = from + offset;
        let (yaml, tail) = body.split_at(close);
        let after = tail.get(4..).unwrap_or_default();
        let trailing_ws = after.strip_suffix(after.trim_start()).unwrap_or_default();
        if trailing_ws.contains('\n') {
            return Some(yaml);
        }
        from = close + 1;
    }
    None
}

fn string_field(
    map: &serde_yaml::Mapping,
    field: &'static str,
    path: &Path,
) -> Result<Option<String>, SkillError> {
    match map.get(field) {
        None => Ok(None),
        Some(serde_yaml::Value::Null) => Ok(Some(String::new())),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s.clone())),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(SkillError::NotAString {
            field,
            path: path.to_path_buf(),
        }),
    }
}

fn required_field(
    map: &serde_yaml::Mapping,
    field: &'static str,
    path: &Path,
) -> Result<String, SkillError> {
    let value = string_field(map, field, path)?.ok_or_else(|| SkillError::MissingField {
        field,
        path: path.to_path_buf(),
    })?;
    if value.trim().is_empty() {
        return Err(SkillError::EmptyField {
            field,
            path: path.to_path_buf(),
        });
    }
    Ok(value)
}

/// Parse and validate the frontmatter of one `skill.md`.
fn read_metadata(skill_md: &Path) -> Result<SkillMetadata, SkillError> {
    let content = std::fs::read_to_string(skill_md).map_err(|source| SkillError::Read {
        path: skill_md.to_path_buf(),
        source,
    })?;

    let yaml = split_frontmatter(&content)
        .ok_or_else(|| SkillError::MissingFrontmatter(skill_md.to_path_buf()))?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|source| SkillError::InvalidYaml {
            path: skill_md.to_path_buf(),
            source,
        })?;
    let serde_yaml::Value::Mapping(map) = value else {
        return Err(SkillError::NotAMapping(skill_md.to_path_buf()));
    };

    let name = required_field(&map, "name", skill_md)?;
    let description = required_field(&map, "description", skill_md)?;
    let license = string_field(&map, "license", skill_md)?.filter(|l| !l.trim().is_empty());

    let folder = skill_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok(SkillMetadata {
        name,
        description,
        license,
        folder,
        skill_md: skill_md.to_path_buf(),
    })
}
