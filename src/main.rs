//! Main entry point for the ruzim CLI application.
//!
//! This binary lists, extracts, and verifies the contents of local ZIM
//! archives.

use anyhow::{bail, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ruzim::{Cli, DirectoryEntry, EntryKind, Error, Namespace, ZimFile};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let cli = Cli::parse();
    let mut zim = ZimFile::open(&cli.file)?;

    if cli.check {
        return validate(&mut zim, &cli);
    }
    if cli.show_metadata {
        return show_metadata(&zim);
    }
    if let Some(prefix) = &cli.suggest {
        return suggest(&mut zim, &cli, prefix);
    }
    if cli.list || cli.verbose {
        return list_entries(&mut zim, &cli);
    }
    extract(&mut zim, &cli)
}

/// List the entries of the selected namespace in URL order.
///
/// Supports two output formats:
/// - Simple format (`-l`): just entry URLs, one per line
/// - Verbose format (`-v`): table with position, mimetype, and title
fn list_entries(zim: &mut ZimFile, cli: &Cli) -> Result<()> {
    let namespace = cli.selected_namespace();

    if cli.verbose {
        println!("{:>8}  NS  {:<28}  Name", "Position", "Mimetype");
        println!("{}", "-".repeat(72));
    }

    let mut listed = 0usize;
    for position in 0..zim.article_count() {
        let entry = zim.entry_at_url_position(position)?;
        if entry.namespace() != namespace {
            continue;
        }
        if cli.verbose {
            println!(
                "{:>8}  {}   {:<28}  {}",
                position,
                entry.namespace(),
                describe_mimetype(zim, &entry),
                String::from_utf8_lossy(entry.url()),
            );
        } else {
            println!("{}", String::from_utf8_lossy(entry.url()));
        }
        listed += 1;
    }

    if cli.verbose {
        println!("{}", "-".repeat(72));
        println!("{listed} entries");
    }

    Ok(())
}

/// Human-readable mimetype column for the verbose listing.
fn describe_mimetype(zim: &ZimFile, entry: &DirectoryEntry) -> String {
    match entry.kind() {
        EntryKind::Redirect { .. } => "-> redirect".to_string(),
        EntryKind::LinkTarget => "link target".to_string(),
        EntryKind::Deleted => "deleted".to_string(),
        EntryKind::Article { .. } => zim
            .mimetype_list()
            .get(entry.mimetype() as usize)
            .cloned()
            .unwrap_or_else(|| format!("mimetype {}", entry.mimetype())),
    }
}

/// Print the metadata map, sorted by key.
fn show_metadata(zim: &ZimFile) -> Result<()> {
    let metadata = zim.metadata();
    let mut keys: Vec<_> = metadata.keys().collect();
    keys.sort();
    for key in keys {
        println!("{key}: {}", metadata[key]);
    }
    Ok(())
}

/// Print similarity suggestions for a URL or title prefix.
fn suggest(zim: &mut ZimFile, cli: &Cli, prefix: &str) -> Result<()> {
    let entries = zim.entries_with_similarity(cli.selected_namespace(), prefix.as_bytes(), 0)?;
    for entry in &entries {
        println!(
            "{}/{}\t{}",
            entry.namespace(),
            String::from_utf8_lossy(entry.url()),
            String::from_utf8_lossy(entry.title()),
        );
    }
    Ok(())
}

/// Verify the embedded MD5 checksum against the file contents.
fn validate(zim: &mut ZimFile, cli: &Cli) -> Result<()> {
    match zim.validate_checksum() {
        Ok(()) => {
            if !cli.is_quiet() {
                println!("{}: checksum OK", cli.file);
            }
            Ok(())
        }
        Err(Error::ChecksumMismatch) => bail!("{}: checksum mismatch", cli.file),
        Err(e) => Err(e.into()),
    }
}

/// Extract the requested entries, or pipe the main page when no URLs are
/// given in pipe mode.
fn extract(zim: &mut ZimFile, cli: &Cli) -> Result<()> {
    if cli.urls.is_empty() {
        if cli.pipe {
            let entry = main_page_or_index(zim)?;
            return write_blob(zim, &entry, None);
        }
        bail!("nothing to do; pass entry URLs or one of -l, -p, -s, -m, -c");
    }

    let namespace = cli.selected_namespace();
    for url in &cli.urls {
        let (mut entry, _, found) = zim.entry_with_url(namespace, url.as_bytes())?;
        if !found {
            bail!("entry not found: {namespace}/{url}");
        }
        if entry.is_redirect() {
            entry = zim.follow_redirect(&entry)?;
        }

        if cli.pipe {
            write_blob(zim, &entry, None)?;
        } else {
            let name = String::from_utf8_lossy(entry.url()).into_owned();
            let path = match &cli.extract_dir {
                Some(dir) => PathBuf::from(dir).join(&name),
                None => PathBuf::from(&name),
            };
            if !cli.is_quiet() {
                println!("  extracting: {name}");
            }
            write_blob(zim, &entry, Some(&path))?;
        }
    }

    Ok(())
}

/// The main page, falling back to `A/index.html` when the header records
/// none.
fn main_page_or_index(zim: &mut ZimFile) -> Result<DirectoryEntry> {
    match zim.main_page() {
        Ok(entry) => Ok(entry),
        Err(Error::NoMainPage) => {
            tracing::debug!("no main page recorded; falling back to index.html");
            let (entry, _, found) = zim.entry_with_url(Namespace::ARTICLES, b"index.html")?;
            if !found {
                bail!("archive has neither a main page nor index.html");
            }
            Ok(entry)
        }
        Err(e) => Err(e.into()),
    }
}

/// Stream an entry's blob to a file, or to stdout when no path is given.
fn write_blob(zim: &mut ZimFile, entry: &DirectoryEntry, path: Option<&Path>) -> Result<()> {
    let mut reader = zim.blob_reader(entry)?;
    match path {
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            std::io::copy(&mut reader, &mut out)?;
        }
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut file = fs::File::create(path)?;
            std::io::copy(&mut reader, &mut file)?;
        }
    }
    Ok(())
}
