//! Traceability chain resolution
//!
//! Starting from a requirement id, the resolver follows the declared links
//! down the hierarchy (US → SYS → SW → CODE/TEST) and produces a `ChainNode`
//! tree where every node carries its status, gaps and remediation.
//!
//! Cycle protection is per branch: each recursive call receives a copy of
//! the ids already on its path, so two siblings that share a descendant both
//! resolve it in full.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::TraceConfig;
use crate::discovery;
use crate::frontmatter::{self, LinkField, Links, RequirementDoc};
use crate::models::{ChainNode, ChainStatus, Level};

/// Resolves traceability chains against the roots of one configuration
pub struct ChainResolver {
    config: TraceConfig,
}

impl ChainResolver {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Resolves the chain rooted at `id`, inferring the level from its prefix
    pub fn analyze(&self, id: &str) -> ChainNode {
        self.analyze_as(id, Level::from_id_prefix(id))
    }

    /// Resolves the chain rooted at `id` at an explicit level
    pub fn analyze_as(&self, id: &str, level: Level) -> ChainNode {
        tracing::info!("resolving {} chain for {}", level, id);
        self.build_chain(id, level, &BTreeSet::new())
    }

    /// Resolves every requirement document whose id has a known prefix,
    /// ordered by id
    pub fn analyze_all(&self) -> Vec<ChainNode> {
        let ids: BTreeSet<String> = discovery::requirement_files(&self.config.requirements_dir)
            .iter()
            .filter_map(|path| frontmatter::read_frontmatter(path))
            .filter_map(|doc| doc.id())
            .filter(|id| Level::from_id_prefix(id).is_requirement())
            .collect();

        ids.iter().map(|id| self.analyze(id)).collect()
    }

    /// Builds the node for `id` at `level`.
    ///
    /// `visited` holds the ids on the path from the root to this node; it is
    /// never shared between siblings.
    pub fn build_chain(&self, id: &str, level: Level, visited: &BTreeSet<String>) -> ChainNode {
        if visited.contains(id) {
            tracing::trace!("cycle at {}, not expanding", id);
            return ChainNode::new(id, level, ChainStatus::Unknown);
        }

        let mut path = visited.clone();
        path.insert(id.to_string());

        match level {
            Level::Us | Level::Sys => self.resolve_traces(id, level, &path),
            Level::Sw => self.resolve_software(id, &path),
            Level::Code => self.resolve_code_unit(id),
            Level::Test => self.resolve_test(id),
            Level::Unknown => ChainNode::missing(
                id,
                Level::Unknown,
                format!("Unrecognized requirement prefix: {}", id),
                Some("Use an id starting with US-, SYS- or SW-".to_string()),
            ),
        }
    }

    /// Locates and parses a requirement document.
    ///
    /// Without a document the returned node is already final (MISSING).
    fn open_requirement(&self, id: &str, level: Level) -> (ChainNode, Option<RequirementDoc>) {
        let Some(path) = discovery::find_requirement_file(&self.config.requirements_dir, id) else {
            let node = ChainNode::missing(
                id,
                level,
                format!("Requirement file not found: {}", id),
                Some(format!("Create: {}", id)),
            );
            return (node, None);
        };

        let doc = frontmatter::read_frontmatter(&path);
        let mut node = match &doc {
            Some(doc) => {
                let mut node = ChainNode::new(id, level, ChainStatus::Missing);
                node.title = doc.title();
                node
            }
            None => ChainNode::missing(
                id,
                level,
                "No frontmatter found",
                Some(format!("Add a YAML header to {}", path.display())),
            ),
        };
        node.file_path = Some(path);
        (node, doc)
    }

    /// US and SYS: children are the `traces_to` targets one level down
    fn resolve_traces(&self, id: &str, level: Level, path: &BTreeSet<String>) -> ChainNode {
        let (mut node, doc) = self.open_requirement(id, level);
        let Some(doc) = doc else {
            return node;
        };
        let Some(child_level) = level.traces_to() else {
            return node;
        };

        let Some(targets) = declared_links(&doc, LinkField::TracesTo, &mut node) else {
            return node;
        };
        if targets.is_empty() {
            node.gaps.push("No traces_to links".to_string());
            node.remediation.push(format!(
                "Add {} requirements to traces_to in {}",
                child_level, id
            ));
            return node;
        }

        node.children = targets
            .iter()
            .map(|target| self.build_chain(target, child_level, path))
            .collect();
        aggregate(&mut node);
        node
    }

    /// SW: code units from `refined_in`, then tests from `tested_by`
    fn resolve_software(&self, id: &str, path: &BTreeSet<String>) -> ChainNode {
        let (mut node, doc) = self.open_requirement(id, Level::Sw);
        let Some(doc) = doc else {
            return node;
        };

        let Some(refined_in) = declared_links(&doc, LinkField::RefinedIn, &mut node) else {
            return node;
        };
        let Some(tested_by) = declared_links(&doc, LinkField::TestedBy, &mut node) else {
            return node;
        };

        if refined_in.is_empty() && tested_by.is_empty() {
            node.gaps.push("No refined_in or tested_by links".to_string());
            node.remediation
                .push("Add code files to refined_in".to_string());
            node.remediation
                .push("Add test files to tested_by".to_string());
            return node;
        }

        for unit in &refined_in {
            node.children.push(self.build_chain(unit, Level::Code, path));
        }
        for test in &tested_by {
            node.children.push(self.build_chain(test, Level::Test, path));
        }
        aggregate(&mut node);
        node
    }

    /// CODE: the unit must exist and its derived unit test must point back
    fn resolve_code_unit(&self, unit: &str) -> ChainNode {
        let Some(code_path) = discovery::find_linked_file(&self.config.code_dir, unit) else {
            return ChainNode::missing(
                unit,
                Level::Code,
                format!("Code file not found: {}", unit),
                Some(format!("Create: {}", unit)),
            );
        };

        let stem = Path::new(unit)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let descriptor = self.find_descriptor(&stem);

        let Some(descriptor) = descriptor else {
            let mut node = ChainNode::missing(
                unit,
                Level::Code,
                "No frontmatter found",
                Some(format!(
                    "Add a requirement document for {} with id and title",
                    unit
                )),
            );
            node.file_path = Some(code_path);
            return node;
        };

        let mut node = ChainNode::new(unit, Level::Code, ChainStatus::Missing);
        node.title = descriptor.title();
        node.file_path = Some(code_path);

        let descriptor_id = descriptor.id().unwrap_or_else(|| stem.clone());
        let component = match slug(&node.title) {
            s if s.is_empty() => slug(&stem),
            s => s,
        };
        let test_name = unit_test_name(&descriptor_id, &component, &self.config.test_extension);

        match discovery::find_linked_file(&self.config.tests_dir, &test_name) {
            Some(test_path) => {
                let back_reference = frontmatter::read_back_reference(&test_path);
                let matches = back_reference
                    .as_deref()
                    .is_some_and(|r| r == descriptor_id || r == unit);
                if matches {
                    node.status = ChainStatus::Complete;
                } else {
                    node.status = ChainStatus::Partial;
                    node.gaps.push(format!(
                        "Test {} missing Validates: {}",
                        test_name, descriptor_id
                    ));
                    node.remediation.push(format!(
                        "Add \"Validates: {}\" to {}",
                        descriptor_id, test_name
                    ));
                }
            }
            None => {
                node.gaps.push(format!("Test file not found: {}", test_name));
                node.remediation.push(format!(
                    "Create: {}",
                    self.config.tests_dir.join(&test_name).display()
                ));
            }
        }
        node
    }

    /// First document under the requirements root whose name contains `stem`
    /// and whose id is not a US/SYS/SW requirement
    fn find_descriptor(&self, stem: &str) -> Option<RequirementDoc> {
        if stem.is_empty() {
            return None;
        }
        discovery::collect_files(&self.config.requirements_dir, |path| {
            discovery::has_extension(path, discovery::REQUIREMENT_EXTENSION)
                && discovery::file_name(path).contains(stem)
        })
        .iter()
        .filter_map(|path| frontmatter::read_frontmatter(path))
        .find(|doc| {
            !doc.id()
                .is_some_and(|id| Level::from_id_prefix(&id).is_requirement())
        })
    }

    /// TEST: terminal, complete when the file exists
    fn resolve_test(&self, test: &str) -> ChainNode {
        match discovery::find_linked_file(&self.config.tests_dir, test) {
            Some(path) => {
                let mut node = ChainNode::new(test, Level::Test, ChainStatus::Complete);
                node.file_path = Some(path);
                node
            }
            None => ChainNode::missing(
                test,
                Level::Test,
                format!("Test file not found: {}", test),
                Some(format!(
                    "Create: {}",
                    self.config.tests_dir.join(test).display()
                )),
            ),
        }
    }
}

/// Link targets of `field`, or `None` after recording a gap when the field
/// is not a list
fn declared_links(doc: &RequirementDoc, field: LinkField, node: &mut ChainNode) -> Option<Vec<String>> {
    match doc.links(field) {
        Links::List(items) => Some(items),
        Links::Absent => Some(Vec::new()),
        Links::NotAList => {
            node.status = ChainStatus::Missing;
            node.gaps.push(format!("{} must be a list", field.key()));
            node.remediation
                .push(format!("Change {} to a YAML list", field.key()));
            None
        }
    }
}

/// Derives a parent's status from its children and explains a partial result
fn aggregate(node: &mut ChainNode) {
    node.status = ChainStatus::aggregate(node.children.iter().map(|c| c.status));
    if node.status != ChainStatus::Partial {
        return;
    }

    let incomplete: Vec<&str> = node
        .children
        .iter()
        .filter(|c| !c.is_complete())
        .map(|c| c.id.as_str())
        .collect();
    node.gaps.push(format!(
        "{} of {} linked items incomplete",
        incomplete.len(),
        node.children.len()
    ));
    node.remediation
        .push(format!("Resolve gaps in: {}", incomplete.join(", ")));
}

/// Name of the unit test expected for a code unit
fn unit_test_name(descriptor_id: &str, component: &str, extension: &str) -> String {
    let number = descriptor_id.rsplit('-').next().unwrap_or(descriptor_id);
    format!("TC-UT-{}_{}.{}", number, component, extension)
}

/// Lowercases and collapses every run of non-alphanumerics into `_`
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
