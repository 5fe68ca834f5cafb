//! rc file discovery and loading.
//!
//! The rc file is a JSON object with the same keys as the long command-line
//! flags. String values may reference fields of the `package.json` next to
//! the rc file as `$npm_package_<field>[_<subfield>...]`.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::Options;
use crate::error::ConfigError;

/// File names searched in the working directory, then in the home directory.
pub const RC_FILE_NAMES: [&str; 2] = [".svelteesp32rc.json", ".svelteesp32rc"];

const KNOWN_KEYS: &[&str] = &[
    "engine",
    "sourcepath",
    "outputfile",
    "espmethod",
    "define",
    "gzip",
    "etag",
    "cachetime",
    "created",
    "version",
    "exclude",
    "basepath",
    "maxsize",
    "maxgzipsize",
    "noindexcheck",
    "dryrun",
    "entry",
    "maxcss",
    "spafallback",
];

const INTERPOLATED_KEYS: &[&str] = &[
    "sourcepath",
    "outputfile",
    "espmethod",
    "define",
    "version",
    "basepath",
];

const NPM_PREFIX: &str = "$npm_package_";

/// Locate the rc file.
///
/// An explicit path must exist. Otherwise `cwd` is searched first and `home`
/// second; finding nothing is not an error.
pub fn find_rc_file(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(ConfigError::RcNotFound(path.to_path_buf()));
    }

    let found = std::iter::once(cwd)
        .chain(home)
        .flat_map(|dir| RC_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file());
    Ok(found)
}

/// [`find_rc_file`] with the process working directory and the user's home.
pub fn discover(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = dirs::home_dir();
    find_rc_file(explicit, &cwd, home.as_deref())
}

/// Read, interpolate and parse an rc file.
pub fn load(path: &Path) -> Result<Options, ConfigError> {
    let rc_error = |reason: String| ConfigError::RcFile {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| rc_error(e.to_string()))?;
    let value: Value =
        serde_json::from_str(&content).map_err(|e| rc_error(format!("invalid JSON: {e}")))?;
    let Value::Object(mut object) = value else {
        return Err(rc_error("must contain a JSON object".to_string()));
    };

    for key in object.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!("Unknown property '{}' in rc file {}", key, path.display());
        }
    }

    interpolate_npm_variables(&mut object, path)?;

    serde_json::from_value(Value::Object(object)).map_err(|e| rc_error(e.to_string()))
}

fn interpolate_npm_variables(object: &mut Map<String, Value>, rc_path: &Path) -> Result<(), ConfigError> {
    let fields = fields_with_variables(object);
    if fields.is_empty() {
        return Ok(());
    }

    let dir = rc_path.parent().unwrap_or_else(|| Path::new("."));
    let package_path = dir.join("package.json");
    if !package_path.is_file() {
        return Err(ConfigError::PackageJsonMissing {
            dir: dir.to_path_buf(),
            fields,
        });
    }
    let package: Value = fs::read_to_string(&package_path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
        .map_err(|reason| ConfigError::RcFile {
            path: package_path.clone(),
            reason,
        })?;

    let variable = npm_variable_pattern().map_err(|reason| ConfigError::RcFile {
        path: rc_path.to_path_buf(),
        reason,
    })?;
    for key in INTERPOLATED_KEYS {
        if let Some(Value::String(text)) = object.get_mut(*key) {
            *text = interpolate(&variable, text, &package).into_owned();
        }
    }
    if let Some(Value::Array(patterns)) = object.get_mut("exclude") {
        for entry in patterns.iter_mut() {
            if let Value::String(text) = entry {
                *text = interpolate(&variable, text, &package).into_owned();
            }
        }
    }
    Ok(())
}

fn fields_with_variables(object: &Map<String, Value>) -> Vec<String> {
    let mut fields: Vec<String> = INTERPOLATED_KEYS
        .iter()
        .filter(|key| matches!(object.get(**key), Some(Value::String(s)) if s.contains(NPM_PREFIX)))
        .map(|key| key.to_string())
        .collect();

    if let Some(Value::Array(patterns)) = object.get("exclude") {
        for (index, pattern) in patterns.iter().enumerate() {
            if matches!(pattern, Value::String(s) if s.contains(NPM_PREFIX)) {
                fields.push(format!("exclude[{index}]"));
            }
        }
    }
    fields
}

/// Matches `$npm_package_<field>[_<subfield>...]`.
///
/// A reference ends before `_` followed by an uppercase letter, so
/// `$npm_package_name_STATIC` reads the `name` field.
pub fn npm_variable_pattern() -> Result<Regex, String> {
    Regex::new(r"\$npm_package_[\dA-Za-z]+(?:_[a-z][\dA-Za-z]*)*").map_err(|e| e.to_string())
}

/// Replace every reference that resolves to a scalar in `package`.
/// Unresolved references are left as written.
pub fn interpolate<'a>(pattern: &Regex, text: &'a str, package: &Value) -> Cow<'a, str> {
    pattern.replace_all(text, |caps: &Captures| {
        let reference = &caps[0];
        lookup(package, &reference[NPM_PREFIX.len()..]).unwrap_or_else(|| reference.to_string())
    })
}

fn lookup(package: &Value, field_path: &str) -> Option<String> {
    let value = field_path
        .split('_')
        .try_fold(package, |current, segment| current.get(segment))?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
