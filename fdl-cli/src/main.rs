mod cli;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fdl_core::{
    determine_config, find_config_path, get_user_config_path, render_json, render_json_all,
    render_markdown, render_text, ChainNode, ChainResolver, Level, LinkReport, LinkValidator,
    NamingValidator, TestLevel, TraceConfig, CONFIG_FILE_NAME,
};

use crate::cli::{Cli, Command, ConfigCommand, TreeFormat};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    tracing::debug!("effective configuration: {:?}", config);

    let passed = match &cli.command {
        Command::Naming {
            file,
            level,
            all,
            directory,
            json,
        } => run_naming(
            &config,
            file.as_deref(),
            level.as_deref(),
            *all,
            directory.as_deref(),
            *json,
        )?,
        Command::Links {
            requirement,
            test,
            all,
            json,
        } => run_links(&config, requirement.as_deref(), test.as_deref(), *all, *json)?,
        Command::Tree {
            us,
            sys,
            sw,
            id,
            all,
            format,
            strict,
        } => {
            let root = if let Some(id) = us {
                Some((id.as_str(), Level::Us))
            } else if let Some(id) = sys {
                Some((id.as_str(), Level::Sys))
            } else if let Some(id) = sw {
                Some((id.as_str(), Level::Sw))
            } else {
                id.as_deref().map(|id| (id, Level::from_id_prefix(id)))
            };
            run_tree(&config, root, *all, *format, *strict)?
        }
        Command::Config(config_cmd) => {
            handle_config_command(config_cmd, &cli, &config)?;
            true
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<TraceConfig> {
    let config = determine_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let mut config = config.with_roots(
        cli.requirements_dir.clone(),
        cli.tests_dir.clone(),
        cli.code_dir.clone(),
    );
    if let Some(ext) = &cli.ext {
        config = config.with_test_extension(ext);
    }
    Ok(config)
}

fn run_naming(
    config: &TraceConfig,
    file: Option<&Path>,
    level: Option<&str>,
    all: bool,
    directory: Option<&Path>,
    json: bool,
) -> Result<bool> {
    let validator = NamingValidator::new(&config.test_extension)?;
    let directory = directory.unwrap_or(&config.tests_dir);

    let results = if let Some(file) = file {
        vec![validator.validate_filename(file)]
    } else if let Some(level) = level {
        let level: TestLevel = level.parse()?;
        validator
            .validate_by_level(level, directory)
            .with_context(|| format!("Failed to validate {} tests", level.label()))?
    } else if all {
        validator
            .validate_all(directory)
            .context("Failed to validate test names")?
    } else {
        bail!("Specify one of --file, --level or --all");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report::print_naming_results(&results, validator.extension());
    }

    Ok(results.iter().all(|r| r.valid))
}

fn run_links(
    config: &TraceConfig,
    requirement: Option<&str>,
    test: Option<&str>,
    all: bool,
    json: bool,
) -> Result<bool> {
    let validator = LinkValidator::new(config);

    let results = if let Some(id) = requirement {
        vec![LinkReport::Requirement(validator.validate_requirement(id))]
    } else if let Some(name) = test {
        vec![LinkReport::Test(validator.validate_test(name))]
    } else if all {
        validator.validate_all()
    } else {
        bail!("Specify one of --requirement, --test or --all");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report::print_link_results(&results);
    }

    Ok(results.iter().all(LinkReport::valid))
}

fn run_tree(
    config: &TraceConfig,
    root: Option<(&str, Level)>,
    all: bool,
    format: TreeFormat,
    strict: bool,
) -> Result<bool> {
    let resolver = ChainResolver::new(config);

    let chains = match root {
        Some((id, level)) => vec![resolver.analyze_as(id, level)],
        None if all => resolver.analyze_all(),
        None => bail!("Specify one of --us, --sys, --sw, --id or --all"),
    };

    if chains.is_empty() {
        println!("{}", "No requirements found.".yellow());
        return Ok(!strict);
    }

    match format {
        TreeFormat::Text => {
            for chain in &chains {
                report::print_chain_header(&chain.id);
                print!("{}", render_text(chain));
            }
        }
        TreeFormat::Json if all => println!("{}", render_json_all(&chains)?),
        TreeFormat::Json => {
            for chain in &chains {
                println!("{}", render_json(chain)?);
            }
        }
        TreeFormat::Markdown => {
            let documents: Vec<String> = chains.iter().map(render_markdown).collect();
            print!("{}", documents.join("\n"));
        }
    }

    Ok(!strict || chains.iter().all(ChainNode::is_complete))
}

fn handle_config_command(cmd: &ConfigCommand, cli: &Cli, config: &TraceConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", "Configuration:".blue().bold());
            println!();

            match find_config_path(cli.config.as_deref())? {
                Some(path) => println!("{}: {}", "Config file".cyan(), path.display()),
                None => println!("{}: {}", "Config file".cyan(), "(defaults)".dimmed()),
            }
            println!(
                "{}: {}",
                "Requirements".cyan(),
                config.requirements_dir.display()
            );
            println!("{}: {}", "Tests".cyan(), config.tests_dir.display());
            println!("{}: {}", "Code".cyan(), config.code_dir.display());
            println!("{}: {}", "Test extension".cyan(), config.test_extension);
        }
        ConfigCommand::Init { path, user } => {
            let target = if *user {
                get_user_config_path().context("Could not determine user config directory")?
            } else {
                path.clone()
                    .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
            };

            if TraceConfig::create_default(&target)
                .with_context(|| format!("Failed to write {}", target.display()))?
            {
                println!("{} Created {}", "✓".green(), target.display());
            } else {
                println!(
                    "{} {} already exists, left unchanged",
                    "!".yellow(),
                    target.display()
                );
            }
        }
    }
    Ok(())
}
