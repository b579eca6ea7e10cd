use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

/// Extension trait for Path used by path expansion and file validation
pub trait PathExt {
    /// Resolves `.` and `..` components without touching the filesystem.
    ///
    /// `..` at the root stays at the root; leading `..` components of a
    /// relative path are kept. An empty result becomes `.`.
    ///
    /// # Examples
    /// ```
    /// use userio::ext::PathExt;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(Path::new("/a/./b/../c").clean(), PathBuf::from("/a/c"));
    /// ```
    fn clean(&self) -> PathBuf;

    /// Whether the path is a directory without any entries.
    fn is_empty_dir(&self) -> Result<bool>;

    /// Display form of the path, with a trailing separator when it is an
    /// existing directory.
    fn to_display_string(&self) -> String;
}

impl PathExt for Path {
    fn clean(&self) -> PathBuf {
        let mut parts: Vec<Component> = Vec::new();
        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match parts.last() {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => parts.push(component),
                },
                other => parts.push(other),
            }
        }
        if parts.is_empty() {
            return PathBuf::from(".");
        }
        parts.iter().collect()
    }

    fn is_empty_dir(&self) -> Result<bool> {
        Ok(self.read_dir()?.next().is_none())
    }

    fn to_display_string(&self) -> String {
        let mut text = self.display().to_string();
        if self.is_dir() && !text.ends_with(MAIN_SEPARATOR) {
            text.push(MAIN_SEPARATOR);
        }
        text
    }
}

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("environment variable pattern is valid")
    })
}

/// Replaces `$VAR` and `${VAR}` with their values; unset variables expand to
/// an empty string.
pub fn expand_env(text: &str) -> String {
    env_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_default()
        })
        .into_owned()
}

/// Expands a user typed path the way the file picker shows it.
///
/// Environment variables and a leading `~` are expanded, a relative result
/// is joined onto `working_dir` and cleaned, and existing directories get a
/// trailing separator. An empty value resolves to `working_dir`.
pub fn expand_path(working_dir: &Path, value: &str, home: Option<&Path>) -> String {
    let expanded = expand_env(value);
    let expanded = match home {
        Some(home) if is_home_relative(&expanded) => {
            format!("{}{}", home.display(), &expanded[1..])
        }
        _ => expanded,
    };

    let path = Path::new(&expanded);
    let joined = if expanded.is_empty() {
        working_dir.to_path_buf()
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    joined.clean().to_display_string()
}

fn is_home_relative(path: &str) -> bool {
    match path.strip_prefix('~') {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', MAIN_SEPARATOR]),
        None => false,
    }
}

/// Completion candidates for `user_value`, expressed in the user's own
/// spelling so they extend what was typed.
///
/// A value ending with a separator lists the directory itself; anything else
/// lists siblings of the last component that share its prefix. Unreadable
/// directories yield nothing.
pub fn generate_suggestions(user_value: &str, expanded: &str) -> Vec<String> {
    let split = user_value.rfind(['/', MAIN_SEPARATOR]).map_or(0, |i| i + 1);
    let (typed_dir, prefix) = user_value.split_at(split);

    let listed = if prefix.is_empty() {
        PathBuf::from(expanded)
    } else {
        match Path::new(expanded.trim_end_matches(['/', MAIN_SEPARATOR])).parent() {
            Some(parent) => parent.to_path_buf(),
            None => return Vec::new(),
        }
    };

    let entries = match listed.read_dir() {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("Cannot list '{}' for suggestions: {err}", listed.display());
            return Vec::new();
        }
    };

    let mut suggestions: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                return None;
            }
            let separator = if entry.path().is_dir() { "/" } else { "" };
            Some(format!("{typed_dir}{name}{separator}"))
        })
        .collect();
    suggestions.sort();
    suggestions
}
