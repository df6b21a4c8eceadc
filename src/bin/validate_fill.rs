//! Fill Round-Trip Validator
//!
//! Applies structured values to a form document section by section,
//! saves each fill to a temporary file, reloads it, and reports every
//! value that did not survive the persistence cycle.
//!
//! The values file is a JSON object keyed by section number (`"13"` or
//! `"section13"`); each value is the nested structured data for that
//! section. An optional lookup file maps logical paths to field targets.
//!
//! Usage:
//!   cargo run --release --bin validate_fill -- form.pdf values.json
//!   cargo run --release --bin validate_fill -- form.pdf values.json --output report.json
//!   cargo run --release --bin validate_fill -- form.pdf values.json --lookup paths.json

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::process;

use formatlas::mapper::FieldLookup;
use formatlas::validator;
use serde_json::Value;

struct FillConfig {
    document: Option<PathBuf>,
    values: Option<PathBuf>,
    lookup: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl FillConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut positional = Vec::new();
        let mut lookup = None;
        let mut output = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" => {
                    i += 1;
                    if i < args.len() {
                        output = Some(PathBuf::from(&args[i]));
                    }
                },
                "--lookup" => {
                    i += 1;
                    if i < args.len() {
                        lookup = Some(PathBuf::from(&args[i]));
                    }
                },
                arg if !arg.starts_with('-') => {
                    positional.push(PathBuf::from(arg));
                },
                _ => {},
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        Self {
            document: positional.next(),
            values: positional.next(),
            lookup,
            output,
        }
    }
}

fn load_sections(path: &PathBuf) -> Result<BTreeMap<u16, Value>, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let parsed: Value =
        serde_json::from_str(&raw).map_err(|e| format!("parse {}: {e}", path.display()))?;
    let Value::Object(map) = parsed else {
        return Err("values file must be a JSON object keyed by section number".to_string());
    };
    let mut sections = BTreeMap::new();
    for (key, data) in map {
        let number = key
            .trim_start_matches("section")
            .parse::<u16>()
            .map_err(|_| format!("bad section key '{key}'"))?;
        sections.insert(number, data);
    }
    Ok(sections)
}

fn load_lookup(path: Option<&PathBuf>) -> Result<FieldLookup, String> {
    let Some(path) = path else {
        return Ok(FieldLookup::new());
    };
    let raw = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let pairs: HashMap<String, String> =
        serde_json::from_str(&raw).map_err(|e| format!("parse {}: {e}", path.display()))?;
    Ok(FieldLookup::from_pairs(pairs))
}

fn main() {
    env_logger::init();

    let config = FillConfig::from_args();
    let (Some(document), Some(values)) = (&config.document, &config.values) else {
        eprintln!(
            "Usage: validate_fill <form.pdf> <values.json> [--lookup paths.json] [--output report.json]"
        );
        process::exit(2);
    };

    let sections = match load_sections(values) {
        Ok(sections) => sections,
        Err(e) => {
            eprintln!("✗ {e}");
            process::exit(2);
        },
    };
    let lookup = match load_lookup(config.lookup.as_ref()) {
        Ok(lookup) => lookup,
        Err(e) => {
            eprintln!("✗ {e}");
            process::exit(2);
        },
    };

    println!("Validating {} section(s) against {}", sections.len(), document.display());

    let report = match validator::validate_batch(document, &sections, &lookup) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ Validation failed: {e}");
            process::exit(1);
        },
    };

    print!("{}", report.render_text());

    if let Some(output) = &config.output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => match fs::write(output, json) {
                Ok(()) => println!("\n✓ Report written to {}", output.display()),
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

    if report.overall_success {
        println!("\n✓ All values round-tripped");
        process::exit(0);
    } else {
        println!("\n✗ Discrepancies found");
        process::exit(1);
    }
}
