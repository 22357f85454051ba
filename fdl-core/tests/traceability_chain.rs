use std::fs;
use std::path::Path;

use fdl_core::{
    render_json, render_markdown, render_text, ChainNode, ChainResolver, ChainStatus, Level,
    LinkReport, LinkValidator, NamingValidator, TraceConfig,
};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small project: one story down to one software requirement with a code
/// unit and two tests, one of which is missing.
fn project() -> (TempDir, TraceConfig) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        &root.join("requirements/us/US-001_login.md"),
        "---\nid: US-001\ntitle: User can log in\ntraces_to: [SYS-REQ-001]\n---\n# Story\n",
    );
    write(
        &root.join("requirements/sys/SYS-REQ-001.md"),
        "---\nid: SYS-REQ-001\ntitle: Authentication service\ntraces_to: [SW-REQ-086]\n---\n",
    );
    write(
        &root.join("requirements/sw/SW-REQ-086.md"),
        "---\nid: SW-REQ-086\ntitle: Credential check\nrefined_in:\n  - auth/credentials.py\ntested_by:\n  - TC-UT-086_component.py\n  - TC-IT-087_login_flow.py\n---\n",
    );
    write(
        &root.join("requirements/code/CODE-086_credentials.md"),
        "---\nid: CODE-086\ntitle: Component\n---\n",
    );
    write(&root.join("src/auth/credentials.py"), "def check():\n    pass\n");
    write(
        &root.join("tests/unit/TC-UT-086_component.py"),
        "\"\"\"\nTC-UT-086: credential check\n\nValidates: CODE-086\n\"\"\"\n",
    );

    let config = TraceConfig::default().with_roots(
        Some(root.join("requirements")),
        Some(root.join("tests")),
        Some(root.join("src")),
    );
    (dir, config)
}

#[test]
fn test_story_chain_reports_missing_integration_test() {
    let (_dir, config) = project();
    let chain = ChainResolver::new(&config).analyze("US-001");

    assert_eq!(chain.level, Level::Us);
    assert_eq!(chain.status, ChainStatus::Partial);

    let sw = &chain.children[0].children[0];
    assert_eq!(sw.id, "SW-REQ-086");
    assert_eq!(sw.status, ChainStatus::Partial);
    assert_eq!(sw.children[0].level, Level::Code);
    assert_eq!(sw.children[0].status, ChainStatus::Complete);
    assert_eq!(sw.children[1].status, ChainStatus::Complete);
    assert_eq!(sw.children[2].status, ChainStatus::Missing);

    let actions = chain.all_remediation();
    assert!(actions
        .iter()
        .any(|a| a.starts_with("Create: ") && a.ends_with("TC-IT-087_login_flow.py")));

    let text = render_text(&chain);
    assert!(text.contains("GAP: Test file not found: TC-IT-087_login_flow.py"));
    assert!(text.ends_with("⚠️  Chain has gaps (see remediation above)\n"));
}

#[test]
fn test_chain_completes_once_gap_is_fixed() {
    let (dir, config) = project();
    write(
        &dir.path().join("tests/integration/TC-IT-087_login_flow.py"),
        "# Validates: SW-REQ-086\n",
    );

    let chain = ChainResolver::new(&config).analyze("US-001");
    assert!(chain.is_complete(), "{}", render_text(&chain));
    assert!(chain.all_remediation().is_empty());
    assert_eq!(chain.counts().complete, chain.counts().total());
}

#[test]
fn test_renderings_agree() {
    let (_dir, config) = project();
    let chain = ChainResolver::new(&config).analyze("SW-REQ-086");

    let parsed: ChainNode = serde_json::from_str(&render_json(&chain).unwrap()).unwrap();
    assert_eq!(parsed, chain);

    let markdown = render_markdown(&chain);
    let mut ids = Vec::new();
    chain.walk(&mut |node, _| ids.push(node.id.clone()));
    let lines: Vec<&str> = markdown.lines().collect();
    assert_eq!(lines.len(), ids.len());
    for (line, id) in lines.iter().zip(&ids) {
        assert!(line.contains(&format!("**{}**", id)), "{} vs {}", line, id);
    }
    assert!(lines[0].starts_with("- ⚠️ **SW-REQ-086**"));
}

#[test]
fn test_links_and_naming_over_the_same_tree() {
    let (dir, config) = project();
    write(&dir.path().join("tests/unit/test_legacy.py"), "def test(): pass\n");

    let naming = NamingValidator::new(&config.test_extension).unwrap();
    let reports = naming.validate_all(&config.tests_dir).unwrap();
    let invalid: Vec<_> = reports.iter().filter(|r| !r.valid).collect();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].file.ends_with("test_legacy.py"));

    let links = LinkValidator::new(&config).validate_all();
    let requirement = links
        .iter()
        .find_map(|r| match r {
            LinkReport::Requirement(r) if r.requirement == "SW-REQ-086" => Some(r),
            _ => None,
        })
        .unwrap();
    assert!(!requirement.valid);
    assert_eq!(requirement.missing_tests, vec!["TC-IT-087_login_flow.py"]);
    // the unit test points at the code descriptor, not the SW requirement
    assert!(requirement
        .errors
        .contains(&"Test TC-UT-086_component.py missing Validates: SW-REQ-086".to_string()));
}

#[test]
fn test_analyze_all_covers_every_level() {
    let (_dir, config) = project();
    let chains = ChainResolver::new(&config).analyze_all();
    let roots: Vec<_> = chains.iter().map(|c| (c.id.as_str(), c.level)).collect();
    assert_eq!(
        roots,
        vec![
            ("SW-REQ-086", Level::Sw),
            ("SYS-REQ-001", Level::Sys),
            ("US-001", Level::Us),
        ]
    );
}
