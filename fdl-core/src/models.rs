use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TraceError;

/// Level of a node in the traceability hierarchy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// User story
    Us,
    /// System requirement
    Sys,
    /// Software requirement
    Sw,
    /// Code unit refining a software requirement
    Code,
    /// Test file validating a software requirement
    Test,
    /// Unrecognized prefix or unresolved level
    Unknown,
}

impl Level {
    /// Infer the level of a root identifier from its prefix
    /// (`US-`, `SYS-`, `SW-`); anything else is `Unknown`.
    pub fn from_id_prefix(id: &str) -> Self {
        if id.starts_with("US-") {
            Level::Us
        } else if id.starts_with("SYS-") {
            Level::Sys
        } else if id.starts_with("SW-") {
            Level::Sw
        } else {
            Level::Unknown
        }
    }

    /// Level that the `traces_to` links of this level point at
    pub fn traces_to(&self) -> Option<Level> {
        match self {
            Level::Us => Some(Level::Sys),
            Level::Sys => Some(Level::Sw),
            _ => None,
        }
    }

    /// Whether nodes of this level are backed by a requirement document
    pub fn is_requirement(&self) -> bool {
        matches!(self, Level::Us | Level::Sys | Level::Sw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Us => "US",
            Level::Sys => "SYS",
            Level::Sw => "SW",
            Level::Code => "CODE",
            Level::Test => "TEST",
            Level::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completeness status of a chain node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainStatus {
    Complete,
    Partial,
    Missing,
    /// Resolution was skipped because the node was already on the path
    Unknown,
}

impl ChainStatus {
    /// Status of a node that has at least one linked child.
    ///
    /// All children complete yields `Complete`; any other mix yields `Partial`.
    pub fn aggregate<I>(children: I) -> ChainStatus
    where
        I: IntoIterator<Item = ChainStatus>,
    {
        let mut any = false;
        for status in children {
            any = true;
            if status != ChainStatus::Complete {
                return ChainStatus::Partial;
            }
        }
        if any {
            ChainStatus::Complete
        } else {
            ChainStatus::Missing
        }
    }

    /// Icon shared by every rendering of a chain
    pub fn icon(&self) -> &'static str {
        match self {
            ChainStatus::Complete => "✅",
            ChainStatus::Missing => "❌",
            ChainStatus::Partial => "⚠️",
            ChainStatus::Unknown => "❓",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainStatus::Complete => "COMPLETE",
            ChainStatus::Partial => "PARTIAL",
            ChainStatus::Missing => "MISSING",
            ChainStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Test level encoded in a test file name (`TC-{LEVEL}-...`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestLevel {
    Ut,
    It,
    St,
    At,
}

impl TestLevel {
    pub fn all() -> &'static [TestLevel] {
        &[TestLevel::Ut, TestLevel::It, TestLevel::St, TestLevel::At]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestLevel::Ut => "UT",
            TestLevel::It => "IT",
            TestLevel::St => "ST",
            TestLevel::At => "AT",
        }
    }

    /// Get display label for the test level
    pub fn label(&self) -> &'static str {
        match self {
            TestLevel::Ut => "Unit Test",
            TestLevel::It => "Integration Test",
            TestLevel::St => "System Test",
            TestLevel::At => "Acceptance Test",
        }
    }
}

impl fmt::Display for TestLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestLevel {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UT" => Ok(TestLevel::Ut),
            "IT" => Ok(TestLevel::It),
            "ST" => Ok(TestLevel::St),
            "AT" => Ok(TestLevel::At),
            _ => Err(TraceError::InvalidLevel(s.to_string())),
        }
    }
}

/// Node in a resolved traceability chain
///
/// Children keep the declaration order of the parent's links so that every
/// rendering of the same tree is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    pub id: String,
    pub level: Level,
    pub status: ChainStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub children: Vec<ChainNode>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub remediation: Vec<String>,
}

impl ChainNode {
    pub fn new(id: impl Into<String>, level: Level, status: ChainStatus) -> Self {
        Self {
            id: id.into(),
            level,
            status,
            title: String::new(),
            file_path: None,
            children: Vec::new(),
            gaps: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Node for an element that could not be resolved
    pub fn missing(
        id: impl Into<String>,
        level: Level,
        gap: impl Into<String>,
        remediation: Option<String>,
    ) -> Self {
        let mut node = Self::new(id, level, ChainStatus::Missing);
        node.gaps.push(gap.into());
        node.remediation.extend(remediation);
        node
    }

    pub fn is_complete(&self) -> bool {
        self.status == ChainStatus::Complete
    }

    /// Visit this node and all descendants in pre-order (parent before
    /// children, children in declaration order)
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ChainNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a ChainNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Per-status node counts over the whole tree
    pub fn counts(&self) -> ChainCounts {
        let mut counts = ChainCounts::default();
        self.walk(&mut |node, _| match node.status {
            ChainStatus::Complete => counts.complete += 1,
            ChainStatus::Partial => counts.partial += 1,
            ChainStatus::Missing => counts.missing += 1,
            ChainStatus::Unknown => counts.unknown += 1,
        });
        counts
    }

    /// Every remediation in the tree, in pre-order
    pub fn all_remediation(&self) -> Vec<&str> {
        let mut actions = Vec::new();
        self.walk(&mut |node, _| {
            actions.extend(node.remediation.iter().map(String::as_str));
        });
        actions
    }
}

/// Node counts grouped by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainCounts {
    pub complete: usize,
    pub partial: usize,
    pub missing: usize,
    pub unknown: usize,
}

impl ChainCounts {
    pub fn total(&self) -> usize {
        self.complete + self.partial + self.missing + self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, status: ChainStatus) -> ChainNode {
        ChainNode::new(id, Level::Test, status)
    }

    #[test]
    fn test_level_from_prefix() {
        assert_eq!(Level::from_id_prefix("US-A1"), Level::Us);
        assert_eq!(Level::from_id_prefix("SYS-REQ-001"), Level::Sys);
        assert_eq!(Level::from_id_prefix("SW-REQ-010"), Level::Sw);
        assert_eq!(Level::from_id_prefix("REQ-010"), Level::Unknown);
        // prefix match is case sensitive
        assert_eq!(Level::from_id_prefix("us-a1"), Level::Unknown);
    }

    #[test]
    fn test_traces_to_descends_one_level() {
        assert_eq!(Level::Us.traces_to(), Some(Level::Sys));
        assert_eq!(Level::Sys.traces_to(), Some(Level::Sw));
        assert_eq!(Level::Sw.traces_to(), None);
    }

    #[test]
    fn test_aggregate_all_complete() {
        let status = ChainStatus::aggregate([ChainStatus::Complete, ChainStatus::Complete]);
        assert_eq!(status, ChainStatus::Complete);
    }

    #[test]
    fn test_aggregate_any_missing_is_never_complete() {
        let status = ChainStatus::aggregate([ChainStatus::Complete, ChainStatus::Missing]);
        assert_eq!(status, ChainStatus::Partial);
        let status = ChainStatus::aggregate([ChainStatus::Missing, ChainStatus::Missing]);
        assert_eq!(status, ChainStatus::Partial);
    }

    #[test]
    fn test_aggregate_mixed_non_missing_is_partial() {
        let status = ChainStatus::aggregate([ChainStatus::Complete, ChainStatus::Partial]);
        assert_eq!(status, ChainStatus::Partial);
        let status = ChainStatus::aggregate([ChainStatus::Complete, ChainStatus::Unknown]);
        assert_eq!(status, ChainStatus::Partial);
    }

    #[test]
    fn test_aggregate_no_children_is_missing() {
        assert_eq!(ChainStatus::aggregate([]), ChainStatus::Missing);
    }

    #[test]
    fn test_test_level_parse() {
        assert_eq!("ut".parse::<TestLevel>().unwrap(), TestLevel::Ut);
        assert_eq!("AT".parse::<TestLevel>().unwrap(), TestLevel::At);
        assert!(matches!(
            "XT".parse::<TestLevel>(),
            Err(TraceError::InvalidLevel(l)) if l == "XT"
        ));
    }

    #[test]
    fn test_counts_and_remediation_order() {
        let mut root = ChainNode::new("SW-REQ-001", Level::Sw, ChainStatus::Partial);
        root.remediation.push("fix root".to_string());
        root.children.push(leaf("TC-UT-001_a.py", ChainStatus::Complete));
        let mut missing = ChainNode::missing(
            "TC-UT-002_b.py",
            Level::Test,
            "Test file not found: TC-UT-002_b.py",
            Some("Create: TC-UT-002_b.py".to_string()),
        );
        missing.remediation.push("second".to_string());
        root.children.push(missing);

        let counts = root.counts();
        assert_eq!(counts.complete, 1);
        assert_eq!(counts.partial, 1);
        assert_eq!(counts.missing, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            root.all_remediation(),
            vec!["fix root", "Create: TC-UT-002_b.py", "second"]
        );
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ChainStatus::Partial).unwrap();
        assert_eq!(json, "\"PARTIAL\"");
        let json = serde_json::to_string(&Level::Code).unwrap();
        assert_eq!(json, "\"CODE\"");
    }
}
