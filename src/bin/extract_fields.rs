//! Form Field Hierarchy Extractor
//!
//! Extracts every AcroForm field from a form document, classifies fields
//! into sections, and prints a per-section summary with coverage stats.
//!
//! Usage:
//!   cargo run --release --bin extract_fields -- form.pdf
//!   cargo run --release --bin extract_fields -- form.pdf --output hierarchy.json
//!   cargo run --release --bin extract_fields -- form.pdf --verbose

use std::fs;
use std::path::PathBuf;
use std::process;

use formatlas::config::EngineConfig;
use formatlas::hierarchy;

struct ExtractorConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
}

impl ExtractorConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut output = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" => {
                    i += 1;
                    if i < args.len() {
                        output = Some(PathBuf::from(&args[i]));
                    }
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                arg if !arg.starts_with('-') => {
                    input = Some(PathBuf::from(arg));
                },
                _ => {},
            }
            i += 1;
        }

        Self { input, output, verbose }
    }
}

fn main() {
    env_logger::init();

    let config = ExtractorConfig::from_args();
    let Some(input) = config.input else {
        eprintln!("Usage: extract_fields <form.pdf> [--output hierarchy.json] [--verbose]");
        process::exit(2);
    };

    println!("Extracting field hierarchy from {}", input.display());

    let engine = EngineConfig::new();
    let run = hierarchy::extract_from_path(&input, &engine);

    if let Some(error) = &run.error {
        eprintln!("✗ Document unreadable: {error}");
        process::exit(1);
    }

    let artifact = &run.hierarchy;
    let coverage = &artifact.metadata.coverage;
    println!(
        "✓ {} fields across {} sections ({:.1}% classified, {:.1}% with coordinates)",
        coverage.total_fields,
        artifact.metadata.total_sections,
        coverage.classification_rate,
        coverage.coordinate_rate
    );

    for group in artifact.sections.values() {
        println!(
            "  section {:>2} {:<38} {:>4} fields, avg confidence {:.2}",
            group.number, group.name, group.field_count, group.confidence
        );
        if config.verbose {
            for (letter, info) in &group.subsections {
                println!(
                    "      {}{}: {} fields, patterns: {}",
                    group.number,
                    letter,
                    info.field_count,
                    info.patterns.join(", ")
                );
            }
        }
    }

    if !artifact.issues.is_empty() {
        println!("\n{} issue(s):", artifact.issues.len());
        for issue in &artifact.issues {
            println!("  [{:?}] {}: {}", issue.level, issue.subsection_id, issue.message);
            if config.verbose {
                println!("      suggestion: {}", issue.suggestion);
            }
        }
    }

    if let Some(output) = &config.output {
        match serde_json::to_string_pretty(artifact) {
            Ok(json) => match fs::write(output, json) {
                Ok(()) => println!("\n✓ Hierarchy written to {}", output.display()),
                Err(e) => {
                    eprintln!("\n✗ Could not write {}: {e}", output.display());
                    process::exit(1);
                },
            },
            Err(e) => {
                eprintln!("\n✗ Serialization failed: {e}");
                process::exit(1);
            },
        }
    }
}
