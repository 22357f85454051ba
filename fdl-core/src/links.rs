//! Bidirectional link validation
//!
//! Forward links are declared by a requirement's `tested_by` list; backward
//! links are the `Validates:` / `Tests:` line of each test file. A link is
//! valid only when both directions agree.

use serde::Serialize;
use std::path::Path;

use crate::config::TraceConfig;
use crate::discovery;
use crate::frontmatter::{self, LinkField, Links};
use crate::models::Level;

/// Link validation result for one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementLinkReport {
    pub requirement: String,
    pub valid: bool,
    pub tested_by: Vec<String>,
    pub missing_tests: Vec<String>,
    pub backward_links_found: Vec<String>,
    pub errors: Vec<String>,
    pub recommendation: Option<String>,
}

impl RequirementLinkReport {
    fn new(requirement: &str) -> Self {
        Self {
            requirement: requirement.to_string(),
            valid: false,
            tested_by: Vec::new(),
            missing_tests: Vec::new(),
            backward_links_found: Vec::new(),
            errors: Vec::new(),
            recommendation: None,
        }
    }

    fn fail(mut self, error: String, recommendation: Option<String>) -> Self {
        self.errors.push(error);
        self.recommendation = recommendation;
        self
    }
}

/// Link validation result for one test file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestLinkReport {
    pub test: String,
    pub valid: bool,
    pub requirement_id: Option<String>,
    pub requirement_found: bool,
    pub errors: Vec<String>,
    pub recommendation: Option<String>,
}

/// Either kind of link report, as produced by a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkReport {
    Requirement(RequirementLinkReport),
    Test(TestLinkReport),
}

impl LinkReport {
    pub fn valid(&self) -> bool {
        match self {
            LinkReport::Requirement(r) => r.valid,
            LinkReport::Test(t) => t.valid,
        }
    }

    /// "Requirement" or "Test"
    pub fn kind(&self) -> &'static str {
        match self {
            LinkReport::Requirement(_) => "Requirement",
            LinkReport::Test(_) => "Test",
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            LinkReport::Requirement(r) => &r.requirement,
            LinkReport::Test(t) => &t.test,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            LinkReport::Requirement(r) => &r.errors,
            LinkReport::Test(t) => &t.errors,
        }
    }

    pub fn recommendation(&self) -> Option<&str> {
        match self {
            LinkReport::Requirement(r) => r.recommendation.as_deref(),
            LinkReport::Test(t) => t.recommendation.as_deref(),
        }
    }
}

/// Validates links between the requirements and tests roots of a config
pub struct LinkValidator {
    config: TraceConfig,
}

impl LinkValidator {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Checks that every test a requirement declares exists and points back
    pub fn validate_requirement(&self, requirement_id: &str) -> RequirementLinkReport {
        let report = RequirementLinkReport::new(requirement_id);

        let Some(req_file) =
            discovery::find_requirement_file(&self.config.requirements_dir, requirement_id)
        else {
            return report.fail(
                format!("Requirement file not found: {}", requirement_id),
                Some(format!("Create requirements file with ID: {}", requirement_id)),
            );
        };

        let Some(doc) = frontmatter::read_frontmatter(&req_file) else {
            return report.fail(
                format!("No frontmatter in {}", req_file.display()),
                Some("Add YAML frontmatter with tested_by field".to_string()),
            );
        };

        let tested_by = match doc.links(LinkField::TestedBy) {
            Links::List(items) if !items.is_empty() => items,
            Links::NotAList => {
                return report.fail(
                    "tested_by must be a list".to_string(),
                    Some("Change tested_by to a YAML list of test files".to_string()),
                );
            }
            Links::List(_) | Links::Absent => {
                return report.fail(
                    "tested_by field is empty".to_string(),
                    Some("Add test files to tested_by field".to_string()),
                );
            }
        };

        let mut report = report;
        for test_name in &tested_by {
            match discovery::find_linked_file(&self.config.tests_dir, test_name) {
                Some(test_file) => {
                    let back_reference = frontmatter::read_back_reference(&test_file);
                    if back_reference.as_deref() == Some(requirement_id) {
                        report.backward_links_found.push(test_name.clone());
                    } else {
                        report.errors.push(format!(
                            "Test {} missing Validates: {}",
                            test_name, requirement_id
                        ));
                    }
                }
                None => {
                    report.missing_tests.push(test_name.clone());
                    report
                        .errors
                        .push(format!("Test file not found: {}", test_name));
                }
            }
        }

        report.valid =
            report.missing_tests.is_empty() && report.backward_links_found.len() == tested_by.len();
        if !report.valid {
            report.recommendation = Some(if report.missing_tests.is_empty() {
                format!("Add \"Validates: {}\" to the listed tests", requirement_id)
            } else {
                format!("Create the missing tests: {}", report.missing_tests.join(", "))
            });
        }
        report.tested_by = tested_by;

        tracing::debug!(
            "requirement {}: {} of {} tests linked back",
            requirement_id,
            report.backward_links_found.len(),
            report.tested_by.len()
        );
        report
    }

    /// Checks that a test's back-reference names an existing requirement
    pub fn validate_test(&self, test_name: &str) -> TestLinkReport {
        let mut report = TestLinkReport {
            test: test_name.to_string(),
            valid: false,
            requirement_id: None,
            requirement_found: false,
            errors: Vec::new(),
            recommendation: None,
        };

        let Some(test_file) = discovery::find_linked_file(&self.config.tests_dir, test_name) else {
            report.errors.push(format!(
                "Test file not found: {}",
                self.config.tests_dir.join(test_name).display()
            ));
            return report;
        };

        let Some(req_id) = frontmatter::read_back_reference(&test_file) else {
            report
                .errors
                .push("No Validates: or Tests: docstring found".to_string());
            report.recommendation = Some("Add \"Validates: REQ-ID\" to test docstring".to_string());
            return report;
        };

        if discovery::find_requirement_file(&self.config.requirements_dir, &req_id).is_some() {
            report.requirement_found = true;
            report.valid = true;
        } else {
            report.errors.push(format!("Requirement {} not found", req_id));
            report.recommendation = Some(format!("Create requirement file: {}", req_id));
        }
        report.requirement_id = Some(req_id);
        report
    }

    /// Validates every US/SYS/SW requirement, then every test file.
    ///
    /// Both groups are in discovery order; one bad item never stops the run.
    pub fn validate_all(&self) -> Vec<LinkReport> {
        let mut results = Vec::new();

        for req_file in discovery::requirement_files(&self.config.requirements_dir) {
            let id = frontmatter::read_frontmatter(&req_file).and_then(|doc| doc.id());
            // code-unit descriptors carry ids but declare no tests
            if let Some(id) = id.filter(|id| Level::from_id_prefix(id).is_requirement()) {
                results.push(LinkReport::Requirement(self.validate_requirement(&id)));
            }
        }

        let tests_dir = &self.config.tests_dir;
        for test_file in discovery::files_with_extension(tests_dir, &self.config.test_extension) {
            let name = relative_name(tests_dir, &test_file);
            results.push(LinkReport::Test(self.validate_test(&name)));
        }

        results
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
