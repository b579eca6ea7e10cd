use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::constants::validation::{
    DIRECTORY_EXPECTED, DIRECTORY_NOT_EMPTY, DIRECTORY_NOT_EXPECTED, EMPTY_INPUT,
};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::widget::ValidateAndMap;

/// Trims `text` and rejects it when nothing is left.
pub fn required(text: String) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(EMPTY_INPUT));
    }
    Ok(trimmed.to_string())
}

/// Constraints checked by [`validate_file_path`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileValidatorOptions {
    /// The path must exist.
    pub existing_only: bool,
    pub dirs_only: bool,
    /// An existing directory must have no entries.
    pub dir_is_empty: bool,
    pub files_only: bool,
    /// Empty input is accepted.
    pub optional: bool,
}

/// Checks `path` against `opts`.
///
/// A path that does not exist passes unless `existing_only` is set; the type
/// constraints only apply to what is already on disk.
pub fn validate_file_path(path: &str, opts: FileValidatorOptions) -> Result<()> {
    let path = path.trim();
    if path.is_empty() {
        return if opts.optional { Ok(()) } else { Err(Error::invalid(EMPTY_INPUT)) };
    }

    let path = Path::new(path);
    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !opts.existing_only => {
            return Ok(())
        }
        Err(err) => return Err(err.into()),
    };

    if opts.files_only && metadata.is_dir() {
        return Err(Error::invalid(DIRECTORY_NOT_EXPECTED));
    }
    if opts.dirs_only && !metadata.is_dir() {
        return Err(Error::invalid(DIRECTORY_EXPECTED));
    }
    if opts.dir_is_empty && metadata.is_dir() && !path.is_empty_dir()? {
        return Err(Error::invalid(DIRECTORY_NOT_EMPTY));
    }
    Ok(())
}

/// [`validate_file_path`] as a validate-and-map function that keeps the path.
pub fn file_validator(opts: FileValidatorOptions) -> ValidateAndMap<String, String> {
    Arc::new(move |path: String| {
        validate_file_path(&path, opts)?;
        Ok(path)
    })
}

/// Rejects an empty selection with `message`.
pub fn at_least_one(message: impl Into<String>) -> ValidateAndMap<Vec<String>, Vec<String>> {
    let message = message.into();
    Arc::new(move |selected: Vec<String>| {
        if selected.is_empty() {
            return Err(Error::invalid(message.clone()));
        }
        Ok(selected)
    })
}

/// Requires the trimmed text to match `pattern`.
///
/// Fails straight away when `pattern` is not a valid regular expression.
pub fn matches_pattern(
    pattern: &str,
    message: impl Into<String>,
) -> Result<ValidateAndMap<String, String>> {
    let regex = Regex::new(pattern)
        .map_err(|e| Error::Config(format!("invalid pattern {pattern:?}: {e}")))?;
    let message = message.into();
    Ok(Arc::new(move |text: String| {
        let text = text.trim().to_string();
        if !regex.is_match(&text) {
            return Err(Error::invalid(message.clone()));
        }
        Ok(text)
    }))
}
