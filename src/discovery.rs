//! Locating the inputs of one experiment inside its folder.
//!
//! A folder holds exactly one instrument export named
//! `<cycle>.<experiment_code>.json`, optionally one user override workbook
//! whose name ends in `custom_metadata.xlsx`, and any number of raw data files.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

/// File name suffix of the user override workbook
pub const CUSTOM_METADATA_SUFFIX: &str = "custom_metadata.xlsx";

/// Raw data extensions collected when none are configured
pub const DEFAULT_RAW_EXTENSIONS: &[&str] = &["h5"];

/// Errors raised while scanning an experiment folder
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The input path is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No instrument JSON was found
    #[error("No instrument JSON file found in {0}")]
    NoInstrumentFile(PathBuf),

    /// More than one instrument JSON was found
    #[error("Expected exactly one instrument JSON file, found {}: {}", .0.len(), display_paths(.0))]
    MultipleInstrumentFiles(Vec<PathBuf>),

    /// The instrument JSON name is not `<cycle>.<experiment_code>.json`
    #[error("Unrecognized instrument file name '{0}', expected <cycle>.<experiment_code>.json")]
    MalformedFileName(String),

    /// More than one override workbook was found
    #[error(
        "Expected at most one *custom_metadata.xlsx file, found {}: {}",
        .0.len(),
        display_paths(.0)
    )]
    MultipleCustomMetadata(Vec<PathBuf>),

    /// I/O error listing the folder
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inputs of one experiment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// The instrument export
    pub instrument_json: PathBuf,
    /// Cycle part of the instrument file name
    pub cycle: String,
    /// Experiment code part of the instrument file name
    pub experiment_code: String,
    /// User override workbook, if present
    pub custom_metadata: Option<PathBuf>,
    /// Raw data files, sorted by name
    pub raw_files: Vec<PathBuf>,
}

/// Scan `folder` collecting raw files with the default extensions
pub fn discover<P: AsRef<Path>>(folder: P) -> Result<Discovered, DiscoveryError> {
    discover_with(folder, DEFAULT_RAW_EXTENSIONS)
}

/// Scan `folder` collecting raw files whose extension is one of `raw_extensions`
pub fn discover_with<P, S>(folder: P, raw_extensions: &[S]) -> Result<Discovered, DiscoveryError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(DiscoveryError::NotADirectory(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut json_files = Vec::new();
    let mut custom = Vec::new();
    let mut raw_files = Vec::new();
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("Skipping non UTF-8 file name {}", path.display());
            continue;
        };
        if name.ends_with(CUSTOM_METADATA_SUFFIX) {
            custom.push(path);
        } else if has_extension(&path, "json") {
            json_files.push(path);
        } else if raw_extensions.iter().any(|ext| has_extension(&path, ext.as_ref())) {
            raw_files.push(path);
        }
    }

    let instrument_json = match json_files.len() {
        0 => return Err(DiscoveryError::NoInstrumentFile(folder.to_path_buf())),
        1 => json_files.remove(0),
        _ => return Err(DiscoveryError::MultipleInstrumentFiles(json_files)),
    };
    if custom.len() > 1 {
        return Err(DiscoveryError::MultipleCustomMetadata(custom));
    }

    let (cycle, experiment_code) = split_instrument_name(&instrument_json)?;
    info!(
        "Found instrument file {} (experiment {}), {} raw file(s){}",
        instrument_json.display(),
        experiment_code,
        raw_files.len(),
        if custom.is_empty() { "" } else { ", custom metadata" }
    );

    Ok(Discovered {
        instrument_json,
        cycle,
        experiment_code,
        custom_metadata: custom.pop(),
        raw_files,
    })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn split_instrument_name(path: &Path) -> Result<(String, String), DiscoveryError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split('.').collect::<Vec<_>>().as_slice() {
        [cycle, code, _] if !cycle.is_empty() && !code.is_empty() => {
            Ok((cycle.to_string(), code.to_string()))
        }
        _ => Err(DiscoveryError::MalformedFileName(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"{}").unwrap();
        path
    }

    #[test]
    fn test_discover_complete_folder() {
        let dir = tempdir().unwrap();
        let json = touch(dir.path(), "cycle.240906_KIGR_GEN4_01.json");
        let custom = touch(dir.path(), "240906_custom_metadata.xlsx");
        let raw_b = touch(dir.path(), "b.h5");
        let raw_a = touch(dir.path(), "a.H5");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.instrument_json, json);
        assert_eq!(found.cycle, "cycle");
        assert_eq!(found.experiment_code, "240906_KIGR_GEN4_01");
        assert_eq!(found.custom_metadata, Some(custom));
        assert_eq!(found.raw_files, vec![raw_a, raw_b]);
    }

    #[test]
    fn test_discover_custom_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cycle.EXP1.json");
        let csv = touch(dir.path(), "trace.csv");
        touch(dir.path(), "trace.h5");

        let found = discover_with(dir.path(), &["csv"]).unwrap();
        assert_eq!(found.raw_files, vec![csv]);
        assert!(found.custom_metadata.is_none());
    }

    #[test]
    fn test_discover_instrument_file_count() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover(dir.path()),
            Err(DiscoveryError::NoInstrumentFile(_))
        ));

        touch(dir.path(), "cycle.A.json");
        touch(dir.path(), "cycle.B.json");
        match discover(dir.path()) {
            Err(DiscoveryError::MultipleInstrumentFiles(files)) => assert_eq!(files.len(), 2),
            other => panic!("expected MultipleInstrumentFiles, got {:?}", other),
        }
    }

    #[test]
    fn test_discover_rejects_bad_name() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "summary.json");
        match discover(dir.path()) {
            Err(DiscoveryError::MalformedFileName(name)) => assert_eq!(name, "summary.json"),
            other => panic!("expected MalformedFileName, got {:?}", other),
        }

        let dir = tempdir().unwrap();
        touch(dir.path(), "a.b.c.json");
        assert!(matches!(
            discover(dir.path()),
            Err(DiscoveryError::MalformedFileName(_))
        ));
    }

    #[test]
    fn test_discover_rejects_two_custom_workbooks() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cycle.A.json");
        touch(dir.path(), "x_custom_metadata.xlsx");
        touch(dir.path(), "y_custom_metadata.xlsx");
        assert!(matches!(
            discover(dir.path()),
            Err(DiscoveryError::MultipleCustomMetadata(_))
        ));
    }

    #[test]
    fn test_discover_requires_directory() {
        let dir = tempdir().unwrap();
        let file = touch(dir.path(), "cycle.A.json");
        assert!(matches!(
            discover(&file),
            Err(DiscoveryError::NotADirectory(_))
        ));
    }
}
