//! Renderings of a resolved chain: console tree, JSON and markdown

use crate::error::Result;
use crate::models::{ChainNode, ChainStatus};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Box-drawing tree followed by the remediation list and a summary line
pub fn render_text(node: &ChainNode) -> String {
    let mut output = String::new();
    write_tree(&mut output, node, "", "", "");

    let actions = node.all_remediation();
    if !actions.is_empty() {
        output.push_str("\nREMEDIATION:\n");
        for (i, action) in actions.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, action));
        }
    }

    let counts = node.counts();
    output.push_str(&format!(
        "\nNodes: {} complete, {} partial, {} missing, {} unknown\n",
        counts.complete, counts.partial, counts.missing, counts.unknown
    ));
    output.push_str(summary_line(node.status));
    output.push('\n');
    output
}

fn write_tree(output: &mut String, node: &ChainNode, prefix: &str, connector: &str, inner: &str) {
    output.push_str(&format!("{}{}{}\n", prefix, connector, node_label(node)));

    // gap lines and children hang off the node's own column
    let indent = format!("{}{}", prefix, inner);
    for gap in &node.gaps {
        output.push_str(&format!("{}  GAP: {}\n", indent, gap));
    }

    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        if i == last {
            write_tree(output, child, &indent, LAST_BRANCH, SPACE);
        } else {
            write_tree(output, child, &indent, BRANCH, PIPE);
        }
    }
}

fn node_label(node: &ChainNode) -> String {
    if node.title.is_empty() {
        format!("{} {}", node.status.icon(), node.id)
    } else {
        format!("{} {}: {}", node.status.icon(), node.id, node.title)
    }
}

fn summary_line(status: ChainStatus) -> &'static str {
    match status {
        ChainStatus::Complete => "✅ Chain is complete",
        ChainStatus::Missing => "❌ Chain is missing critical elements",
        ChainStatus::Partial | ChainStatus::Unknown => "⚠️  Chain has gaps (see remediation above)",
    }
}

/// Pretty JSON document; parses back into an equal `ChainNode`
pub fn render_json(node: &ChainNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(node)?)
}

/// Pretty JSON array of several chains
pub fn render_json_all(nodes: &[ChainNode]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

/// Nested markdown list, two spaces per level
pub fn render_markdown(node: &ChainNode) -> String {
    let mut output = String::new();
    node.walk(&mut |n, depth| {
        output.push_str(&format!(
            "{}- {} **{}**: {}\n",
            "  ".repeat(depth),
            n.status.icon(),
            n.id,
            n.title
        ));
    });
    output
}
