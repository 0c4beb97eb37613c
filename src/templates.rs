//! Template catalog.
//!
//! A template named `N` is the directory `<root>/N` holding `config.yaml`
//! (display name, description and [`TemplateConstraints`]) and
//! `template.pptx`.

use crate::error::{Error, Result};
use crate::ooxml::pptx::Package;
use crate::ooxml::pptx::template::scaffold_template_titled;
use crate::outline::TemplateConstraints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const TEMPLATE_FILE: &str = "template.pptx";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Contents of a template's `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub template: TemplateMeta,
    pub constraints: TemplateConstraints,
}

impl TemplateConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_saphyr::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid {CONFIG_FILE}: {e}")))?;
        config
            .constraints
            .validate()
            .map_err(|e| Error::Configuration(format!("invalid constraints: {e}")))?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| Error::Template(format!("failed to serialize {CONFIG_FILE}: {e}")))
    }
}

/// A discoverable template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Directory name; what commands refer to the template by
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub dir: PathBuf,
}

/// What `info` reports about one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub entry: TemplateEntry,
    pub constraints: TemplateConstraints,
    pub layout_count: usize,
    pub layout_names: Vec<String>,
}

/// Templates under one root directory, with parsed configs cached per name.
#[derive(Debug)]
pub struct TemplateCatalog {
    root: PathBuf,
    cache: HashMap<String, TemplateConfig>,
}

fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.trim() != name;
    if bad {
        return Err(Error::InvalidInput(format!("invalid template name '{name}'")));
    }
    Ok(())
}

impl TemplateCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn entry(&self, name: &str, config: &TemplateConfig) -> TemplateEntry {
        TemplateEntry {
            name: name.to_string(),
            display_name: config
                .template
                .name
                .clone()
                .unwrap_or_else(|| name.to_string()),
            description: config.template.description.clone(),
            dir: self.dir_of(name),
        }
    }

    /// Every template with a `config.yaml`, sorted by name.
    ///
    /// A missing root is an empty catalog. A config that does not parse is
    /// still listed, without a description.
    pub fn list(&self) -> Result<Vec<TemplateEntry>> {
        if !self.root.is_dir() {
            tracing::debug!(root = %self.root.display(), "template directory does not exist");
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&self.root).map_err(|e| {
            Error::Template(format!("cannot read {}: {e}", self.root.display()))
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry =
                dir_entry.map_err(|e| Error::Template(format!("cannot read {}: {e}", self.root.display())))?;
            let path = dir_entry.path();
            let config_path = path.join(CONFIG_FILE);
            if !path.is_dir() || !config_path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let config = match fs::read_to_string(&config_path)
                .map_err(|e| Error::Template(e.to_string()))
                .and_then(|text| TemplateConfig::from_yaml(&text))
            {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(template = name, "skipping unreadable config: {}", e);
                    TemplateConfig::default()
                },
            };
            entries.push(self.entry(name, &config));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Parsed `config.yaml` of `name`, read once per catalog.
    pub fn config(&mut self, name: &str) -> Result<&TemplateConfig> {
        validate_name(name)?;

        if !self.cache.contains_key(name) {
            let path = self.dir_of(name).join(CONFIG_FILE);
            if !path.is_file() {
                return Err(Error::Configuration(format!(
                    "unknown template '{name}' (no {} in {})",
                    CONFIG_FILE,
                    self.dir_of(name).display()
                )));
            }
            let text = fs::read_to_string(&path)
                .map_err(|e| Error::Template(format!("cannot read {}: {e}", path.display())))?;
            let config = TemplateConfig::from_yaml(&text)?;
            tracing::debug!(template = name, "loaded template config");
            self.cache.insert(name.to_string(), config);
        }

        self.cache
            .get(name)
            .ok_or_else(|| Error::Configuration(format!("unknown template '{name}'")))
    }

    pub fn constraints(&mut self, name: &str) -> Result<TemplateConstraints> {
        Ok(self.config(name)?.constraints)
    }

    /// Path of the presentation file of `name`, which must exist.
    pub fn template_path(&mut self, name: &str) -> Result<PathBuf> {
        self.config(name)?;
        let path = self.dir_of(name).join(TEMPLATE_FILE);
        if !path.is_file() {
            return Err(Error::Configuration(format!(
                "template '{name}' has no {TEMPLATE_FILE} in {}",
                self.dir_of(name).display()
            )));
        }
        Ok(path)
    }

    /// Constraints and layouts of `name`.
    pub fn info(&mut self, name: &str) -> Result<TemplateInfo> {
        let path = self.template_path(name)?;
        let config = self.config(name)?.clone();

        let package = Package::open(&path)
            .map_err(|e| Error::Template(format!("cannot open {}: {e}", path.display())))?;
        let layouts = package
            .layouts()
            .map_err(|e| Error::Template(format!("cannot read layouts of {}: {e}", path.display())))?;

        Ok(TemplateInfo {
            entry: self.entry(name, &config),
            constraints: config.constraints,
            layout_count: layouts.len(),
            layout_names: layouts.into_iter().map(|layout| layout.name).collect(),
        })
    }

    /// Write a new template `name` with default constraints.
    ///
    /// An existing template directory is only overwritten with `force`.
    pub fn scaffold(&mut self, name: &str, force: bool) -> Result<PathBuf> {
        validate_name(name)?;
        let dir = self.dir_of(name);
        if dir.exists() && !force {
            return Err(Error::InvalidInput(format!(
                "{} already exists; pass --force to overwrite",
                dir.display()
            )));
        }

        fs::create_dir_all(&dir)
            .map_err(|e| Error::Template(format!("cannot create {}: {e}", dir.display())))?;

        let config = TemplateConfig {
            template: TemplateMeta {
                name: Some(name.to_string()),
                description: Some("Generated template scaffold".to_string()),
            },
            constraints: TemplateConstraints::default(),
        };
        let bytes = scaffold_template_titled(name)
            .map_err(|e| Error::Template(format!("cannot build template: {e}")))?;

        fs::write(dir.join(TEMPLATE_FILE), bytes)
            .map_err(|e| Error::Template(format!("cannot write {TEMPLATE_FILE}: {e}")))?;
        fs::write(dir.join(CONFIG_FILE), config.to_yaml()?)
            .map_err(|e| Error::Template(format!("cannot write {CONFIG_FILE}: {e}")))?;

        self.cache.remove(name);
        tracing::info!(template = name, dir = %dir.display(), "template scaffolded");
        Ok(dir)
    }
}
