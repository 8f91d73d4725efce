//! Environment variable forwarding.
//!
//! Resolves which variables of the calling process are injected into the
//! scenario container. Names come from an explicit list and, optionally, from
//! the keys of an env file; values always come from an [`EnvSnapshot`] of the
//! calling process, never from the file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::EnvFileError;

/// A `NAME=value` pair injected into the container environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    pub name: String,
    pub value: String,
}

impl EnvBinding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Render as the value of a `-e` flag.
    pub fn to_flag_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Point-in-time copy of a process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the environment of the current process.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read the variable names declared in a `KEY=VALUE` env file.
///
/// Only the keys are returned, in file order.
pub fn read_env_file_names(path: &Path) -> Result<Vec<String>, EnvFileError> {
    let to_error = |source| EnvFileError {
        path: path.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for item in dotenvy::from_path_iter(path).map_err(to_error)? {
        let (key, _value) = item.map_err(to_error)?;
        names.push(key);
    }
    Ok(names)
}

/// Resolve the environment bindings to inject into the container.
///
/// Explicit names come first, followed by names found in `env_file`.
/// Duplicates keep their first position. A name missing from `env` is
/// injected with an empty value.
pub fn resolve_env_bindings(
    explicit_names: &[String],
    env_file: Option<&Path>,
    env: &EnvSnapshot,
) -> Vec<EnvBinding> {
    let file_names = match env_file {
        Some(path) => match read_env_file_names(path) {
            Ok(names) => names,
            Err(e) => {
                // The env file is optional: an unreadable one forwards nothing.
                warn!("Ignoring env file: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mut seen = HashSet::new();
    let bindings: Vec<EnvBinding> = explicit_names
        .iter()
        .chain(file_names.iter())
        .filter(|name| seen.insert(*name))
        .map(|name| EnvBinding::new(name.clone(), env.get(name).unwrap_or_default()))
        .collect();

    debug!(
        "Forwarding {} environment variable(s) to container",
        bindings.len()
    );
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn env_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_names_only() {
        let env: EnvSnapshot = [("API_KEY", "secret"), ("OTHER", "x")]
            .into_iter()
            .collect();

        let bindings = resolve_env_bindings(&names(&["API_KEY"]), None, &env);

        assert_eq!(bindings, vec![EnvBinding::new("API_KEY", "secret")]);
    }

    #[test]
    fn test_file_supplies_names_not_values() {
        let file = env_file("API_KEY=from-file\n# comment\nTOKEN=also-from-file\n");
        let env: EnvSnapshot = [("API_KEY", "from-process"), ("TOKEN", "tok")]
            .into_iter()
            .collect();

        let bindings = resolve_env_bindings(&[], Some(file.path()), &env);

        assert_eq!(
            bindings,
            vec![
                EnvBinding::new("API_KEY", "from-process"),
                EnvBinding::new("TOKEN", "tok"),
            ]
        );
    }

    #[test]
    fn test_merge_deduplicates_keeping_first_occurrence() {
        let file = env_file("B=1\nA=2\nC=3\n");
        let env: EnvSnapshot = [("A", "a"), ("B", "b"), ("C", "c")].into_iter().collect();

        let bindings = resolve_env_bindings(&names(&["A", "B", "A"]), Some(file.path()), &env);
        let resolved: Vec<&str> = bindings.iter().map(|b| b.name.as_str()).collect();

        assert_eq!(resolved, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let env = EnvSnapshot::default();
        let bindings = resolve_env_bindings(&names(&["path", "PATH"]), None, &env);
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_missing_value_is_empty() {
        let env = EnvSnapshot::default();
        let bindings = resolve_env_bindings(&names(&["UNSET_VAR"]), None, &env);

        assert_eq!(bindings[0].to_flag_value(), "UNSET_VAR=");
    }

    #[test]
    fn test_missing_file_contributes_nothing() {
        let env: EnvSnapshot = [("A", "a")].into_iter().collect();
        let bindings = resolve_env_bindings(
            &names(&["A"]),
            Some(Path::new("/nonexistent/greenframe/.env")),
            &env,
        );

        assert_eq!(bindings, vec![EnvBinding::new("A", "a")]);
    }

    #[test]
    fn test_read_env_file_names_reports_missing_file() {
        let result = read_env_file_names(Path::new("/nonexistent/greenframe/.env"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_contributes_nothing() {
        let file = env_file("GOOD=1\nA=\"unterminated\nNOT VALID LINE\n");
        let env: EnvSnapshot = [("EXPLICIT", "e"), ("GOOD", "g")].into_iter().collect();

        assert!(read_env_file_names(file.path()).is_err());

        let bindings = resolve_env_bindings(&names(&["EXPLICIT"]), Some(file.path()), &env);
        assert_eq!(bindings, vec![EnvBinding::new("EXPLICIT", "e")]);
    }

    #[test]
    fn test_read_env_file_names_order() {
        let file = env_file("export FIRST=1\n\nSECOND=\"two words\"\n");
        let names = read_env_file_names(file.path()).unwrap();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
    }
}
