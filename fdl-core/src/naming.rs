//! Test file naming convention
//!
//! Test files encode their traceability level and numeric identity in the
//! file name: `TC-{LEVEL}-{ID}_{component}.{ext}`, e.g. `TC-UT-086_login.py`.
//! The component may itself contain underscores.

use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::discovery;
use crate::error::{Result, TraceError};
use crate::models::TestLevel;

/// Result of validating one test file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingReport {
    pub file: String,
    pub valid: bool,
    pub level: Option<TestLevel>,
    pub id: Option<String>,
    pub component: Option<String>,
    pub errors: Vec<String>,
    pub recommendation: Option<String>,
}

impl NamingReport {
    fn new(file: &Path) -> Self {
        Self {
            file: file.display().to_string(),
            valid: false,
            level: None,
            id: None,
            component: None,
            errors: Vec::new(),
            recommendation: None,
        }
    }

    /// Canonical file name for a valid report
    pub fn canonical_name(&self, extension: &str) -> Option<String> {
        match (&self.level, &self.id, &self.component) {
            (Some(level), Some(id), Some(component)) if self.valid => {
                Some(format_test_name(*level, id, component, extension))
            }
            _ => None,
        }
    }
}

/// Builds a file name following the convention
pub fn format_test_name(level: TestLevel, id: &str, component: &str, extension: &str) -> String {
    format!("TC-{}-{}_{}.{}", level, id, component, extension)
}

/// Validates file names against the naming convention for one extension
#[derive(Debug, Clone)]
pub struct NamingValidator {
    extension: String,
    pattern: Regex,
}

impl NamingValidator {
    /// Creates a validator for test files with the given extension (no dot)
    pub fn new(extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.').to_string();
        // The level is captured loosely so an unknown level gets its own error.
        let pattern = Regex::new(&format!(
            r"^TC-([A-Z]+)-(\d+)_(.+)\.{}$",
            regex::escape(&extension)
        ))?;
        Ok(Self { extension, pattern })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The expected pattern, echoed verbatim in format errors
    pub fn expected_pattern(&self) -> String {
        format!("TC-{{LEVEL}}-{{ID}}_{{component}}.{}", self.extension)
    }

    /// Validates a single file's name. The file must exist.
    pub fn validate_filename(&self, path: &Path) -> NamingReport {
        let mut report = NamingReport::new(path);

        if !path.exists() {
            report.errors.push(format!("File not found: {}", path.display()));
            return report;
        }

        let filename = discovery::file_name(path);
        self.check_name(&filename, &mut report);
        report
    }

    fn check_name(&self, filename: &str, report: &mut NamingReport) {
        let Some(captures) = self.pattern.captures(filename) else {
            report.errors.push("Invalid naming format".to_string());
            report
                .errors
                .push(format!("Expected: {}", self.expected_pattern()));
            report.errors.push(format!("Found: {}", filename));
            report.recommendation = Some(format!(
                "Rename to match TC-LEVEL-ID_component.{} pattern",
                self.extension
            ));
            return;
        };

        let level_str = &captures[1];
        let id_str = &captures[2];
        let component = &captures[3];

        let level = match level_str.parse::<TestLevel>() {
            Ok(level) if level.as_str() == level_str => level,
            _ => {
                report.errors.push(format!("Invalid level: {}", level_str));
                report.recommendation = Some(format!(
                    "Level must be one of: {}",
                    TestLevel::all()
                        .iter()
                        .map(TestLevel::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                return;
            }
        };

        if !id_str.chars().all(|c| c.is_ascii_digit()) {
            report.errors.push(format!("ID must be numeric: {}", id_str));
            return;
        }

        report.valid = true;
        report.level = Some(level);
        report.id = Some(id_str.to_string());
        report.component = Some(component.to_string());
    }

    /// Validates every test file under `directory`
    pub fn validate_all(&self, directory: &Path) -> Result<Vec<NamingReport>> {
        if !directory.is_dir() {
            return Err(TraceError::DirectoryNotFound(directory.to_path_buf()));
        }

        let files = discovery::files_with_extension(directory, &self.extension);
        tracing::debug!("validating {} file names under {}", files.len(), directory.display());
        Ok(files.iter().map(|path| self.validate_filename(path)).collect())
    }

    /// Validates the test files of one level under `directory`.
    ///
    /// Candidates are pre-filtered on `-{LEVEL}-` in the name; only files that
    /// validate at the requested level are reported.
    pub fn validate_by_level(&self, level: TestLevel, directory: &Path) -> Result<Vec<NamingReport>> {
        if !directory.is_dir() {
            return Err(TraceError::DirectoryNotFound(directory.to_path_buf()));
        }

        let marker = format!("-{}-", level);
        let files = discovery::collect_files(directory, |path| {
            discovery::has_extension(path, &self.extension)
                && discovery::file_name(path).contains(&marker)
        });

        Ok(files
            .iter()
            .map(|path| self.validate_filename(path))
            .filter(|report| report.level == Some(level))
            .collect())
    }
}
