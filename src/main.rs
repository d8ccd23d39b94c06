use anyhow::Result;
use annotation_scanner::cli::{Cli, Commands, OutputFormat};
use annotation_scanner::config::{
    resolve_locale, resolve_log_filter, resolve_manifest_path, resolve_root,
};
use annotation_scanner::naming::CLASS_SUFFIX;
use annotation_scanner::{Marker, MarkerRegistry, Scanner};
use clap::Parser;
use serde::Serialize;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = parse_cli();

    tracing_subscriber::fmt()
        .with_env_filter(resolve_log_filter(&cli)?)
        .with_writer(std::io::stderr)
        .init();

    let root = resolve_root(&cli)?;
    let scanner = Scanner::new(root.clone()).with_locale(resolve_locale(&cli)?);
    tracing::debug!(root = %root.display(), locale = %scanner.locale(), "scanner configured");

    match cli.command.clone() {
        Commands::Find {
            marker,
            packages,
            format,
        } => {
            let marker = Marker::new(&marker)?;
            let manifest = resolve_manifest_path(&cli, &root);
            let registry = MarkerRegistry::load(&manifest)?;
            let result = find_marked(scanner, &registry, &marker, &packages)?;
            write_output(&result, &result.types, format)?;
        }
        Commands::Candidates { packages, format } => {
            let result = list_candidates(scanner, &packages)?;
            write_output(&result, &result.types, format)?;
        }
    }

    Ok(())
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_find(args))
}

fn rewrite_args_for_implicit_find(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["find", "candidates", "help"];
    let valued = ["--root", "--manifest", "--locale", "--log-level"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if valued.contains(&a) {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "find".to_string());
        }
    }

    args
}

#[derive(Debug, Serialize)]
struct FindResult {
    marker: String,
    root: String,
    scopes: Vec<String>,
    matched: usize,
    duration_ms: u64,
    types: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CandidatesResult {
    root: String,
    scopes: Vec<String>,
    candidates: usize,
    duration_ms: u64,
    types: Vec<String>,
}

fn apply_scopes(scanner: &mut Scanner, packages: &[String]) -> Result<()> {
    for pkg in packages {
        scanner.add_scope(pkg)?;
    }
    Ok(())
}

fn find_marked(
    mut scanner: Scanner,
    registry: &MarkerRegistry,
    marker: &Marker,
    packages: &[String],
) -> Result<FindResult> {
    let start = Instant::now();
    apply_scopes(&mut scanner, packages)?;
    let types = scanner.find_marked(registry, marker).to_vec();

    Ok(FindResult {
        marker: marker.to_string(),
        root: scanner.root().to_string_lossy().to_string(),
        scopes: scanner.scopes().map(str::to_string).collect(),
        matched: types.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        types,
    })
}

fn list_candidates(mut scanner: Scanner, packages: &[String]) -> Result<CandidatesResult> {
    let start = Instant::now();
    apply_scopes(&mut scanner, packages)?;

    let mut types: Vec<String> = Vec::new();
    for candidate in scanner.candidates() {
        if !types.contains(&candidate.identifier) {
            types.push(candidate.identifier);
        }
    }

    Ok(CandidatesResult {
        root: scanner.root().to_string_lossy().to_string(),
        scopes: scanner.scopes().map(str::to_string).collect(),
        candidates: types.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        types,
    })
}

fn write_output<T: Serialize>(result: &T, types: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            for identifier in types {
                println!("{identifier}{CLASS_SUFFIX}");
            }
        }
    }
    Ok(())
}
