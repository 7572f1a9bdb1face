// Preferences
// Option schema (types, defaults, choices, bounds), validation, and the
// key/value preference store the options page and popup read from.
// The bundled store keeps every option in one JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::platform;
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::PreferencesError;
use crate::types::preferences::Options;

/// Key/value storage for options, synced by the host.
pub trait PreferenceStore: Send + Sync {
    fn get_all(&self) -> Result<Map<String, Value>, PreferencesError>;
    /// Merges `values` into the stored options.
    fn set_all(&self, values: Map<String, Value>) -> Result<(), PreferencesError>;
    fn clear_all(&self) -> Result<(), PreferencesError>;
}

/// Preference store persisted as a JSON object on disk.
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    /// Creates a store at `path_override`, or `preferences.json` in the
    /// platform config directory.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path = path_override.unwrap_or_else(|| platform::get_config_dir().join("preferences.json"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PreferencesError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|e| {
            PreferencesError::SerializationError(format!("Failed to serialize preferences: {}", e))
        })?;
        fs::write(&self.path, json)
            .map_err(|e| PreferencesError::IoError(format!("Failed to write preferences: {}", e)))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    /// A missing file reads as an empty object.
    fn get_all(&self) -> Result<Map<String, Value>, PreferencesError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| PreferencesError::IoError(format!("Failed to read preferences: {}", e)))?;
        serde_json::from_str(&content).map_err(|e| {
            PreferencesError::SerializationError(format!("Failed to parse preferences: {}", e))
        })
    }

    fn set_all(&self, values: Map<String, Value>) -> Result<(), PreferencesError> {
        let mut current = self.get_all()?;
        current.extend(values);
        self.write(&current)
    }

    fn clear_all(&self) -> Result<(), PreferencesError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| PreferencesError::IoError(format!("Failed to remove preferences: {}", e)))?;
        }
        Ok(())
    }
}

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Integer,
    String,
    Boolean,
    Array,
}

/// One selectable value of an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

/// Description of one option, used to render and validate the options page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl OptionSpec {
    fn new(name: &'static str, kind: OptionKind, default: Value) -> Self {
        Self {
            name,
            kind,
            default,
            choices: Vec::new(),
            minimum: None,
            maximum: None,
        }
    }

    fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    fn with_bounds(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Checks type, bounds and choices of `value`.
    pub fn validate(&self, value: &Value) -> Result<(), PreferencesError> {
        let invalid = |reason: String| PreferencesError::InvalidValue(format!("{}: {}", self.name, reason));
        let allowed = |candidate: &Value| self.choices.is_empty() || self.choices.iter().any(|c| &c.value == candidate);

        match self.kind {
            OptionKind::Integer => {
                let number = value.as_i64().ok_or_else(|| invalid(format!("expected an integer, got {}", value)))?;
                if self.minimum.is_some_and(|min| number < min) || self.maximum.is_some_and(|max| number > max) {
                    return Err(invalid(format!(
                        "{} is outside {}..={}",
                        number,
                        self.minimum.unwrap_or(i64::MIN),
                        self.maximum.unwrap_or(i64::MAX)
                    )));
                }
                if !allowed(value) {
                    return Err(invalid(format!("{} is not one of the choices", number)));
                }
            }
            OptionKind::String => {
                value.as_str().ok_or_else(|| invalid(format!("expected a string, got {}", value)))?;
                if !allowed(value) {
                    return Err(invalid(format!("{} is not one of the choices", value)));
                }
            }
            OptionKind::Boolean => {
                value.as_bool().ok_or_else(|| invalid(format!("expected a boolean, got {}", value)))?;
            }
            OptionKind::Array => {
                let items = value.as_array().ok_or_else(|| invalid(format!("expected an array, got {}", value)))?;
                if let Some(item) = items.iter().find(|item| !allowed(item)) {
                    return Err(invalid(format!("{} is not one of the choices", item)));
                }
            }
        }
        Ok(())
    }
}

const OPEN_METHOD_LABELS: [&str; 7] = [
    "Current tab",
    "Current tab (keep popup open)",
    "New tab",
    "Background tab",
    "Background tab (keep popup open)",
    "New window",
    "Incognito window",
];

const FONT_FAMILIES: [&str; 11] = [
    "monospace",
    "sans-serif",
    "serif",
    "ArchivoNarrow",
    "Arial",
    "Comic Sans MS",
    "Georgia",
    "Lucida Sans Unicode",
    "Tahoma",
    "Trebuchet MS",
    "Verdana",
];

fn indexed_choices(labels: &[&str]) -> Vec<Choice> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| Choice {
            value: Value::from(i as u64),
            label: label.to_string(),
        })
        .collect()
}

/// Builds the option schema. Folder choices come from the store's
/// top-level folders, which must have numeric ids.
pub fn option_schema(root_folders: &[BookmarkRecord]) -> Vec<OptionSpec> {
    let defaults = Options::default();
    let open_choices = indexed_choices(&OPEN_METHOD_LABELS);
    let folder_choices: Vec<Choice> = root_folders
        .iter()
        .filter_map(|folder| {
            folder.id.parse::<u64>().ok().map(|id| Choice {
                value: Value::from(id),
                label: folder.title.clone(),
            })
        })
        .collect();

    vec![
        OptionSpec::new("clickByLeft", OptionKind::Integer, Value::from(defaults.click_by_left))
            .with_choices(open_choices.clone()),
        OptionSpec::new("clickByLeftCtrl", OptionKind::Integer, Value::from(defaults.click_by_left_ctrl))
            .with_choices(open_choices.clone()),
        OptionSpec::new("clickByLeftShift", OptionKind::Integer, Value::from(defaults.click_by_left_shift))
            .with_choices(open_choices.clone()),
        OptionSpec::new("clickByMiddle", OptionKind::Integer, Value::from(defaults.click_by_middle))
            .with_choices(open_choices),
        OptionSpec::new("defExpand", OptionKind::Integer, Value::from(defaults.def_expand))
            .with_choices(folder_choices.clone()),
        OptionSpec::new("fontFamily", OptionKind::String, Value::from(defaults.font_family.as_str())).with_choices(
            FONT_FAMILIES
                .iter()
                .map(|family| Choice {
                    value: Value::from(*family),
                    label: family.to_string(),
                })
                .collect(),
        ),
        OptionSpec::new("fontSize", OptionKind::Integer, Value::from(defaults.font_size)).with_bounds(10, 30),
        OptionSpec::new("hideRootFolder", OptionKind::Array, Value::Array(Vec::new())).with_choices(folder_choices),
        OptionSpec::new("maxResults", OptionKind::Integer, Value::from(defaults.max_results as u64))
            .with_bounds(10, 200),
        OptionSpec::new("opFolderBy", OptionKind::Boolean, Value::from(defaults.op_folder_by)),
        OptionSpec::new("rememberPos", OptionKind::Boolean, Value::from(defaults.remember_pos)),
        OptionSpec::new("searchTarget", OptionKind::Integer, Value::from(defaults.search_target))
            .with_choices(indexed_choices(&["Title and URL", "Title only"])),
        OptionSpec::new("setWidth", OptionKind::Integer, Value::from(defaults.set_width)).with_bounds(100, 399),
        OptionSpec::new("tooltip", OptionKind::Boolean, Value::from(defaults.tooltip)),
        OptionSpec::new("warnOpenMany", OptionKind::Boolean, Value::from(defaults.warn_open_many)),
    ]
}

/// Looks up `name` in `schema` and validates `value` against it.
pub fn validate_option(schema: &[OptionSpec], name: &str, value: &Value) -> Result<(), PreferencesError> {
    schema
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| PreferencesError::InvalidKey(name.to_string()))?
        .validate(value)
}

fn to_options(values: Map<String, Value>) -> Result<Options, PreferencesError> {
    serde_json::from_value(Value::Object(values)).map_err(|e| {
        PreferencesError::SerializationError(format!("Failed to read options: {}", e))
    })
}

/// Loads options, writing defaults for every option not stored yet.
///
/// Only the missing keys are written back, so values set elsewhere are
/// never overwritten.
pub fn init_options<P: PreferenceStore + ?Sized>(
    store: &P,
    schema: &[OptionSpec],
) -> Result<Options, PreferencesError> {
    let mut values = store.get_all()?;
    let mut added = Map::new();

    for spec in schema {
        if !values.contains_key(spec.name) {
            values.insert(spec.name.to_string(), spec.default.clone());
            added.insert(spec.name.to_string(), spec.default.clone());
        }
    }

    if !added.is_empty() {
        tracing::debug!("Writing defaults for {} options", added.len());
        store.set_all(added)?;
    }
    to_options(values)
}

/// Validates and stores `changes`, returning the resulting options.
pub fn update_options<P: PreferenceStore + ?Sized>(
    store: &P,
    schema: &[OptionSpec],
    changes: Map<String, Value>,
) -> Result<Options, PreferencesError> {
    for (name, value) in &changes {
        validate_option(schema, name, value)?;
    }
    store.set_all(changes)?;
    to_options(store.get_all()?)
}

/// Drops every stored option and writes the defaults again.
pub fn reset_options<P: PreferenceStore + ?Sized>(
    store: &P,
    schema: &[OptionSpec],
) -> Result<Options, PreferencesError> {
    store.clear_all()?;
    init_options(store, schema)
}
