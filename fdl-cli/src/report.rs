//! Console layout of validation results

use colored::Colorize;
use fdl_core::{LinkReport, NamingReport};

const SUMMARY_LIMIT: usize = 5;

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title.bold());
    println!("{}", "=".repeat(60));
}

fn print_findings(errors: &[String], recommendation: Option<&str>) {
    for error in errors {
        println!("  - {}", error.red());
    }
    if let Some(recommendation) = recommendation {
        println!("  💡 {}", recommendation.yellow());
    }
}

fn print_overflow(shown: usize, total: usize) {
    if total > shown {
        println!("  ... and {} more", total - shown);
    }
}

pub fn print_naming_results(results: &[NamingReport], extension: &str) {
    let (valid, invalid): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.valid);

    print_header("NAMING VALIDATION RESULTS");
    println!("Total files: {}", results.len());
    println!("✅ Valid: {}", valid.len());
    println!("❌ Invalid: {}", invalid.len());
    println!();

    if !invalid.is_empty() {
        println!("{}", "❌ INVALID FILES:".red().bold());
        println!("{}", "-".repeat(60));
        for result in &invalid {
            println!("\nFile: {}", result.file);
            print_findings(&result.errors, result.recommendation.as_deref());
        }
    }

    if !valid.is_empty() {
        println!(
            "\n{}",
            format!("✅ VALID FILES ({} shown as summary):", valid.len()).green()
        );
        println!("{}", "-".repeat(60));
        for result in valid.iter().take(SUMMARY_LIMIT) {
            if let Some(name) = result.canonical_name(extension) {
                println!("  {}", name);
            }
        }
        print_overflow(SUMMARY_LIMIT, valid.len());
    }

    println!();
    if invalid.is_empty() {
        println!("{}", "✅ All files pass naming validation".green());
    } else {
        println!(
            "{}",
            format!("⚠️  {} file(s) have naming violations", invalid.len()).yellow()
        );
        println!("   Run with --json for machine-readable output");
    }
}

pub fn print_link_results(results: &[LinkReport]) {
    let (valid, invalid): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.valid());

    print_header("LINK VALIDATION RESULTS");
    println!("Total items: {}", results.len());
    println!("✅ Valid links: {}", valid.len());
    println!("❌ Missing links: {}", invalid.len());
    println!();

    if !invalid.is_empty() {
        println!("{}", "❌ INVALID LINKS:".red().bold());
        println!("{}", "-".repeat(60));
        for result in &invalid {
            println!("\n{}: {}", result.kind(), result.item_id());
            print_findings(result.errors(), result.recommendation());
        }
    }

    if !valid.is_empty() {
        println!(
            "\n{}",
            format!("✅ VALID LINKS ({} shown as summary):", valid.len()).green()
        );
        println!("{}", "-".repeat(60));
        for result in valid.iter().take(SUMMARY_LIMIT) {
            match result {
                LinkReport::Requirement(r) => {
                    println!("  Requirement {} → {} test(s)", r.requirement, r.tested_by.len())
                }
                LinkReport::Test(t) => println!(
                    "  Test {} → {}",
                    t.test,
                    t.requirement_id.as_deref().unwrap_or("?")
                ),
            }
        }
        print_overflow(SUMMARY_LIMIT, valid.len());
    }

    println!();
    if invalid.is_empty() {
        println!("{}", "✅ All bidirectional links verified".green());
    } else {
        println!(
            "{}",
            format!("⚠️  {} item(s) have missing links", invalid.len()).yellow()
        );
        println!("   Run with --json for machine-readable output");
    }
}

/// Banner printed above a text-rendered chain
pub fn print_chain_header(id: &str) {
    print_header(&format!("TRACEABILITY CHAIN: {}", id));
}
