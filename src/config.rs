use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::locale::Locale;
use crate::scanner::default_root;

pub const ROOT_ENV: &str = "ANNOTATION_SCANNER_ROOT";
pub const MANIFEST_ENV: &str = "ANNOTATION_SCANNER_MANIFEST";
pub const LOCALE_ENV: &str = "ANNOTATION_SCANNER_LOCALE";

const DEFAULT_LOG_FILTER: &str = "warn";

pub fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.root.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(ROOT_ENV) {
        return Ok(PathBuf::from(p));
    }

    default_root()
}

pub fn resolve_manifest_path(cli: &Cli, root: &Path) -> PathBuf {
    if let Some(p) = cli.manifest.clone() {
        return p;
    }

    if let Ok(p) = env::var(MANIFEST_ENV) {
        return PathBuf::from(p);
    }

    default_manifest_path(root)
}

pub fn default_manifest_path(root: &Path) -> PathBuf {
    root.join("META-INF").join("markers.json")
}

pub fn resolve_locale(cli: &Cli) -> Result<Locale> {
    if let Some(tag) = cli.locale.as_deref() {
        return tag
            .parse::<Locale>()
            .with_context(|| format!("Invalid --locale value: {tag}"));
    }

    if let Ok(tag) = env::var(LOCALE_ENV) {
        return tag
            .parse::<Locale>()
            .with_context(|| format!("Invalid {LOCALE_ENV} value: {tag}"));
    }

    Ok(Locale::default())
}

pub fn resolve_log_filter(cli: &Cli) -> Result<EnvFilter> {
    if let Some(directive) = cli.log_level.as_deref() {
        return EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid --log-level filter: {directive}"));
    }

    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
}
