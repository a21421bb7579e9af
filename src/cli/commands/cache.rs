//! Cache command - inspect persisted caches

use crate::cache::{CacheKind, CacheNames, CacheStorage, DiskStorage};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::Host;
use crate::config::Config;
use crate::error::{ShellCacheError, ShellCacheResult};
use console::style;
use serde::Serialize;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ShellCacheResult<()> {
    let host = Host::new(config);
    let names = CacheNames::from_config(&config.cache);
    let storage: &DiskStorage = host.storage();

    match args.action {
        CacheAction::List { format } => list_caches(storage, &names, format).await,
        CacheAction::Show { name, format } => show_cache(storage, &name, format).await,
    }
}

/// One row of `cache list`
#[derive(Debug, Serialize)]
struct CacheRow {
    name: String,
    kind: Option<CacheKind>,
    version: Option<String>,
    entries: usize,
    current: bool,
    owned: bool,
}

async fn list_caches(
    storage: &dyn CacheStorage,
    names: &CacheNames,
    format: OutputFormat,
) -> ShellCacheResult<()> {
    let mut rows = vec![];
    for name in storage.names().await? {
        let parsed = names.parse(&name);
        rows.push(CacheRow {
            entries: storage.keys(&name).await?.len(),
            kind: parsed.as_ref().map(|(kind, _)| *kind),
            version: parsed.map(|(_, version)| version),
            current: names.is_current(&name),
            owned: names.in_namespace(&name),
            name,
        });
    }

    match format {
        OutputFormat::Table => print_cache_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }

    Ok(())
}

fn print_cache_table(rows: &[CacheRow]) {
    if rows.is_empty() {
        println!("No caches found.");
        return;
    }

    println!(
        "{:<28} {:<8} {:<10} {:>8}  {}",
        "CACHE", "KIND", "VERSION", "ENTRIES", "STATE"
    );
    println!("{}", "-".repeat(68));

    for row in rows {
        let state = if row.current {
            style("current").green().to_string()
        } else if row.owned {
            style("stale").yellow().to_string()
        } else {
            style("foreign").dim().to_string()
        };
        println!(
            "{:<28} {:<8} {:<10} {:>8}  {}",
            row.name,
            row.kind.map(|k| k.to_string()).unwrap_or_else(|| "-".into()),
            row.version.as_deref().unwrap_or("-"),
            row.entries,
            state
        );
    }

    println!();
    println!("Total: {} cache(s)", rows.len());
}

/// One row of `cache show`
#[derive(Debug, Serialize)]
struct EntryRow {
    url: String,
    status: u16,
    content_type: Option<String>,
    bytes: usize,
}

async fn show_cache(
    storage: &dyn CacheStorage,
    name: &str,
    format: OutputFormat,
) -> ShellCacheResult<()> {
    if !storage.has(name).await? {
        return Err(ShellCacheError::CacheNotFound(name.to_string()));
    }

    let mut rows = vec![];
    for key in storage.keys(name).await? {
        if let Some(response) = storage.get(name, &key).await? {
            rows.push(EntryRow {
                url: key.url().to_string(),
                status: response.status,
                content_type: response.content_type().map(str::to_string),
                bytes: response.body.len(),
            });
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.url);
            }
        }
        OutputFormat::Table => {
            println!("{}", style(name).bold());
            for row in &rows {
                println!(
                    "  {} {:<60} {:>9} B  {}",
                    style(row.status).green(),
                    row.url,
                    row.bytes,
                    style(row.content_type.as_deref().unwrap_or("-")).dim()
                );
            }
            println!();
            println!("Total: {} entr{}", rows.len(), if rows.len() == 1 { "y" } else { "ies" });
        }
    }

    Ok(())
}
