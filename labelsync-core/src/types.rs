//! Domain types for LabelSync.
//!
//! Manifest-side types (`Manifest`, `RepoConfig`, `LabelSpec`) mirror the
//! `labelsync.yml` layout and are deserialized via serde + serde_yaml.
//! Remote-side types (`Label`, `Issue`) are what collaborators hand back.

use std::fmt;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Fully qualified reference to a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// A label definition.
///
/// Used both for desired state (built from the manifest) and for remote
/// state. Remote labels never carry the `old_*` fields; reconciled updates
/// carry them so reports can show what changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_color: Option<String>,
    /// Provisioned by the platform itself.
    #[serde(default)]
    pub default: bool,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn renamed_from(mut self, old_name: impl Into<String>) -> Self {
        self.old_name = Some(old_name.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Name, description and color all match.
    ///
    /// Colors compare case-insensitively; a missing description equals an
    /// empty one.
    pub fn is_identical(&self, other: &Label) -> bool {
        self.name == other.name
            && self.color.eq_ignore_ascii_case(&other.color)
            && self.description.as_deref().unwrap_or("") == other.description.as_deref().unwrap_or("")
    }
}

/// Normalized manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelDirective {
    /// Ensure `Label` exists with exactly this definition.
    Define(Label),
    /// Rename the remote label `from` into `to` (and alias it on issues).
    Rename { from: String, to: Label },
}

impl LabelDirective {
    /// The desired label, regardless of variant.
    pub fn label(&self) -> &Label {
        match self {
            LabelDirective::Define(label) => label,
            LabelDirective::Rename { to, .. } => to,
        }
    }

    pub fn old_name(&self) -> Option<&str> {
        match self {
            LabelDirective::Define(_) => None,
            LabelDirective::Rename { from, .. } => Some(from),
        }
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// An open issue and the names of the labels it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Issue {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// One label as written in `labelsync.yml`; the name is the mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelSpec {
    #[serde(
        default,
        deserialize_with = "quoted_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
}

/// Unquoted all-digit colors such as `123456` are YAML numbers.
fn quoted_color<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(color)) => Ok(Some(color)),
        Some(serde_yaml::Value::Number(_)) => Err(D::Error::custom(
            "color looks like a number and must be quoted, e.g. color: \"123456\"",
        )),
        Some(_) => Err(D::Error::custom("color must be a quoted string")),
    }
}

/// Per-repository sync policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoPolicy {
    /// Delete remote labels the manifest does not configure.
    #[serde(default)]
    pub strict: bool,
    /// Report unconfigured labels as removals rather than leftovers.
    #[serde(default)]
    pub remove_unconfigured_labels: bool,
}

/// Configuration of a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub config: RepoPolicy,
    #[serde(default)]
    pub labels: IndexMap<String, LabelSpec>,
}

impl RepoConfig {
    pub fn is_strict(&self) -> bool {
        self.config.strict
    }

    /// Whether `name` is configured directly (renames don't count).
    pub fn configures(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Normalize manifest labels into directives, in manifest order.
    ///
    /// Entries without a color are skipped; [`crate::manifest::parse`]
    /// rejects them before a `RepoConfig` ever reaches reconciliation.
    pub fn directives(&self) -> Vec<LabelDirective> {
        self.labels
            .iter()
            .filter_map(|(name, spec)| {
                let color = spec.color.as_deref()?;
                let label = Label {
                    name: name.clone(),
                    color: normalize_color(color),
                    description: spec.description.clone(),
                    ..Label::default()
                };
                Some(match spec.old_name.as_deref() {
                    Some(from) if from != name => LabelDirective::Rename {
                        from: from.to_owned(),
                        to: label.renamed_from(from),
                    },
                    _ => LabelDirective::Define(label),
                })
            })
            .collect()
    }
}

/// Root of `labelsync.yml`: every configured repository of one owner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub repos: IndexMap<String, RepoConfig>,
}

impl Manifest {
    pub fn repo_names(&self) -> Vec<String> {
        self.repos.keys().cloned().collect()
    }
}

fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(color: &str) -> LabelSpec {
        LabelSpec {
            color: Some(color.to_owned()),
            ..LabelSpec::default()
        }
    }

    #[test]
    fn repo_ref_display() {
        assert_eq!(RepoRef::new("acme", "api").to_string(), "acme/api");
    }

    #[test]
    fn identical_ignores_color_case_and_empty_description() {
        let a = Label::new("bug", "FF0000");
        let b = Label::new("bug", "ff0000").with_description("");
        assert!(a.is_identical(&b));
        assert!(!a.is_identical(&Label::new("bug", "00ff00")));
    }

    #[test]
    fn directives_keep_manifest_order_and_detect_renames() {
        let mut config = RepoConfig::default();
        config.labels.insert("zeta".into(), spec("#000"));
        let mut renamed = spec("0f0");
        renamed.old_name = Some("help".into());
        config.labels.insert("help-wanted".into(), renamed);
        config.labels.insert("alpha".into(), spec("fff"));

        let directives = config.directives();
        let names: Vec<_> = directives.iter().map(|d| d.label().name.as_str()).collect();
        assert_eq!(names, ["zeta", "help-wanted", "alpha"]);
        assert_eq!(directives[0].label().color, "000");
        assert_eq!(directives[1].old_name(), Some("help"));
        assert_eq!(directives[1].label().old_name.as_deref(), Some("help"));
    }

    #[test]
    fn self_rename_is_a_plain_definition() {
        let mut config = RepoConfig::default();
        let mut same = spec("fff");
        same.old_name = Some("bug".into());
        config.labels.insert("bug".into(), same);
        assert!(matches!(config.directives()[0], LabelDirective::Define(_)));
    }

    #[test]
    fn manifest_serde_roundtrip() {
        let mut manifest = Manifest::default();
        let mut config = RepoConfig::default();
        config.config.strict = true;
        config.labels.insert("bug".into(), spec("f00"));
        manifest.repos.insert("api".into(), config);

        let yaml = serde_yaml::to_string(&manifest).expect("serialize");
        assert!(yaml.contains("strict: true"));
        let back: Manifest = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, manifest);
    }
}
