pub mod chain;
pub mod config;
pub mod discovery;
pub mod error;
pub mod frontmatter;
pub mod links;
pub mod models;
pub mod naming;
pub mod render;

// Re-export commonly used types
pub use chain::ChainResolver;
pub use config::{
    determine_config, find_config_path, get_user_config_path, TraceConfig, CONFIG_FILE_NAME,
};
pub use error::{Result, TraceError};
pub use frontmatter::{
    extract_back_reference, parse_frontmatter, read_frontmatter, LinkField, Links,
    RequirementDoc,
};
pub use links::{LinkReport, LinkValidator, RequirementLinkReport, TestLinkReport};
pub use models::{ChainCounts, ChainNode, ChainStatus, Level, TestLevel};
pub use naming::{format_test_name, NamingReport, NamingValidator};
pub use render::{render_json, render_json_all, render_markdown, render_text};
