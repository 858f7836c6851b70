/// Directory batch driver.
///
/// Lists the `*.json` files directly inside the input directory and, one at
/// a time, parses each, rewrites it and writes the result under the same
/// name in the output directory. The first failure stops the batch; files
/// already written stay on disk.
use crate::error::RewriteError;
use crate::fixups::FixupTable;
use crate::message_code::MessageCode;
use crate::output::to_pretty_json;
use crate::rewrite::{rewrite_document, RewriteContext};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where to read from, where to write to, and how to rewrite.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fixups: FixupTable,
    /// Escape non-ASCII characters as `\uXXXX` in the output.
    pub ensure_ascii: bool,
}

impl BatchConfig {
    /// The `old/` -> `new/` convention under `base`.
    pub fn in_dir(base: &Path) -> Self {
        Self {
            input_dir: base.join("old"),
            output_dir: base.join("new"),
            fixups: FixupTable::builtin(),
            ensure_ascii: true,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

/// Files written by a completed batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
}

/// Regular `*.json` files directly inside `dir`, in directory-listing order.
/// Hidden files are skipped.
pub fn list_schema_files(dir: &Path) -> Result<Vec<PathBuf>, RewriteError> {
    let list_err = |source| RewriteError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if name.starts_with('.') || !name.ends_with(".json") {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Rewrite one file into `output_dir`. Returns the destination path.
///
/// The document is fully parsed before the destination is opened, so a
/// malformed input leaves no output behind.
pub fn process_file(
    source: &Path,
    config: &BatchConfig,
    progress: &mut dyn Write,
) -> Result<PathBuf, RewriteError> {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let destination = config.output_dir.join(&file_name);

    writeln!(
        progress,
        "Transforming file {} and saving to {}",
        source.display(),
        destination.display()
    )
    .map_err(RewriteError::Progress)?;

    let code = MessageCode::from_filename(&file_name);
    match &code {
        Some(code) => tracing::debug!(file = %file_name, code = %code, "message code found"),
        None => tracing::debug!(file = %file_name, "no message code in file name"),
    }
    let ctx = RewriteContext::new(code.as_ref(), &config.fixups);

    let text = std::fs::read_to_string(source).map_err(|e| RewriteError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| RewriteError::Parse {
        path: source.to_path_buf(),
        source: e,
    })?;

    let rewritten = rewrite_document(doc, &ctx).map_err(|e| RewriteError::Rule {
        path: source.to_path_buf(),
        source: e,
    })?;

    let bytes = to_pretty_json(&rewritten, config.ensure_ascii).map_err(|e| {
        RewriteError::Serialize {
            path: destination.clone(),
            source: e,
        }
    })?;
    std::fs::write(&destination, bytes).map_err(|e| RewriteError::Write {
        path: destination.clone(),
        source: e,
    })?;

    Ok(destination)
}

/// Process `files` in the given order, stopping at the first error.
pub fn run_batch(
    files: &[PathBuf],
    config: &BatchConfig,
    progress: &mut dyn Write,
) -> Result<BatchReport, RewriteError> {
    let mut report = BatchReport::default();
    for file in files {
        let written = process_file(file, config, progress)?;
        report.written.push(written);
    }
    tracing::info!(count = report.written.len(), "batch complete");
    Ok(report)
}

/// List the input directory and process everything in it.
pub fn process_directory(
    config: &BatchConfig,
    progress: &mut dyn Write,
) -> Result<BatchReport, RewriteError> {
    let files = list_schema_files(&config.input_dir)?;
    tracing::debug!(
        input = %config.input_dir.display(),
        count = files.len(),
        "listed schema files"
    );
    run_batch(&files, config, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch() -> (tempfile::TempDir, BatchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::in_dir(dir.path());
        fs::create_dir(&config.input_dir).unwrap();
        fs::create_dir(&config.output_dir).unwrap();
        (dir, config)
    }

    #[test]
    fn test_default_config_uses_old_and_new() {
        let config = BatchConfig::default();
        assert_eq!(config.input_dir, Path::new(".").join("old"));
        assert_eq!(config.output_dir, Path::new(".").join("new"));
        assert!(config.ensure_ascii);
        assert_eq!(config.fixups, FixupTable::builtin());
    }

    #[test]
    fn test_list_only_top_level_json_files() {
        let (_dir, config) = scratch();
        fs::write(config.input_dir.join("a.json"), "{}").unwrap();
        fs::write(config.input_dir.join("b.JSON.bak"), "{}").unwrap();
        fs::write(config.input_dir.join("notes.txt"), "x").unwrap();
        fs::write(config.input_dir.join(".hidden.json"), "{}").unwrap();
        fs::create_dir(config.input_dir.join("nested.json")).unwrap();
        fs::create_dir(config.input_dir.join("sub")).unwrap();
        fs::write(config.input_dir.join("sub").join("c.json"), "{}").unwrap();

        let files = list_schema_files(&config.input_dir).unwrap();
        assert_eq!(files, vec![config.input_dir.join("a.json")]);
    }

    #[test]
    fn test_list_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_schema_files(&dir.path().join("old")).unwrap_err();
        assert!(matches!(err, RewriteError::ListDir { .. }));
    }

    #[test]
    fn test_process_file_reports_progress() {
        let (_dir, config) = scratch();
        let source = config.input_dir.join("plain.json");
        fs::write(&source, r#"{"description": " x "}"#).unwrap();

        let mut progress = Vec::new();
        let dest = process_file(&source, &config, &mut progress).unwrap();

        assert_eq!(dest, config.output_dir.join("plain.json"));
        let line = String::from_utf8(progress).unwrap();
        assert_eq!(
            line,
            format!(
                "Transforming file {} and saving to {}\n",
                source.display(),
                dest.display()
            )
        );
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "{\n  \"description\": \"x\"\n}"
        );
    }

    #[test]
    fn test_missing_output_dir_is_fatal() {
        let (_dir, config) = scratch();
        fs::remove_dir(&config.output_dir).unwrap();
        let source = config.input_dir.join("a.json");
        fs::write(&source, "{}").unwrap();

        let err = process_file(&source, &config, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, RewriteError::Write { .. }));
    }

    #[test]
    fn test_source_file_is_left_in_place() {
        let (_dir, config) = scratch();
        let source = config.input_dir.join("a.json");
        fs::write(&source, r#"{"description": ""}"#).unwrap();
        process_file(&source, &config, &mut Vec::new()).unwrap();
        assert_eq!(fs::read_to_string(&source).unwrap(), r#"{"description": ""}"#);
    }
}
