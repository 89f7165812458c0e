// cli.rs - CLI argument parsing and headless commands

use crate::config::{EditorConfig, ResolvedConfig};
use crate::edit::begin_edit;
use crate::entry::{entry_for, find_by_name, project, Entry, EntryKind};
use crate::manifest::Manifest;
use crate::{manifest, persist};
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "manifest-edit",
    about = "Browse and edit a repo manifest (default, remotes, projects).",
    group(ArgGroup::new("action").args(["list", "show", "set", "check"]))
)]
pub struct Cli {
    /// Manifest file to open (default: default.xml, or the configured one)
    pub manifest: Option<PathBuf>,

    /// Config file to use instead of the user config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the log to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Print every entry and exit
    #[arg(long)]
    pub list: bool,

    /// With --list, print JSON instead of text
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Print the fields of one entry (default, remote:NAME|INDEX, project:NAME|INDEX)
    #[arg(long, value_name = "ENTRY")]
    pub show: Option<EntrySelector>,

    /// Edit one entry without the TUI and save
    #[arg(long, value_name = "ENTRY", requires = "fields")]
    pub set: Option<EntrySelector>,

    /// FIELD=VALUE assignment for --set (repeatable)
    #[arg(short = 'f', long = "field", value_name = "FIELD=VALUE", requires = "set")]
    pub fields: Vec<Assignment>,

    /// Verify the manifest survives a serialize/parse round trip
    #[arg(long)]
    pub check: bool,

    /// Force interactive TUI mode
    #[arg(long, conflicts_with = "action")]
    pub interactive: bool,
}

impl Cli {
    /// Whether a headless action was requested.
    pub fn has_action(&self) -> bool {
        self.list || self.show.is_some() || self.set.is_some() || self.check
    }

    /// Config layer built from command-line flags.
    pub fn overrides(&self) -> EditorConfig {
        EditorConfig {
            manifest: self.manifest.clone(),
            log_file: self.log_file.clone(),
            log_level: self.verbose.then(|| "debug".to_string()),
            accent: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry selectors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorKey {
    Index(usize),
    Name(String),
}

/// Addresses one entry: `default`, `remote:<index|name>`, `project:<index|name>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySelector {
    pub kind: EntryKind,
    pub key: SelectorKey,
}

impl FromStr for EntrySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("default") {
            return Ok(EntrySelector {
                kind: EntryKind::Default,
                key: SelectorKey::Index(0),
            });
        }
        let (kind, key) = s
            .split_once(':')
            .ok_or_else(|| format!("expected default, remote:KEY or project:KEY, got '{}'", s))?;
        let kind = match kind.to_ascii_lowercase().as_str() {
            "remote" => EntryKind::Remote,
            "project" => EntryKind::Project,
            other => return Err(format!("unknown entry kind '{}'", other)),
        };
        if key.is_empty() {
            return Err(format!("missing name or index after '{}:'", kind.label()));
        }
        let key = match key.parse::<usize>() {
            Ok(i) => SelectorKey::Index(i),
            Err(_) => SelectorKey::Name(key.to_string()),
        };
        Ok(EntrySelector { kind, key })
    }
}

impl EntrySelector {
    /// Find the entry this selector names in the current manifest.
    pub fn resolve(&self, manifest: &Manifest) -> Result<Entry> {
        let found = match &self.key {
            SelectorKey::Index(i) => entry_for(manifest, self.kind, *i),
            SelectorKey::Name(name) => find_by_name(manifest, self.kind, name),
        };
        found.with_context(|| match &self.key {
            SelectorKey::Index(i) => format!(
                "no {} at index {} (manifest has {})",
                self.kind,
                i,
                self.kind.len_in(manifest)
            ),
            SelectorKey::Name(name) => format!("no {} named '{}'", self.kind, name),
        })
    }
}

/// A `FIELD=VALUE` pair. The value may be empty to clear the attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub label: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((label, value)) if !label.is_empty() => Ok(Assignment {
                label: label.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected FIELD=VALUE, got '{}'", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Headless commands
// ---------------------------------------------------------------------------

/// Run a headless command. Without an explicit action this lists entries.
pub fn run(args: Cli, config: &ResolvedConfig) -> Result<()> {
    let path = &config.manifest;
    let loaded = persist::load(path)?;
    let document = loaded.manifest;

    if let Some(selector) = &args.show {
        return show(&document, selector);
    }
    if let Some(selector) = &args.set {
        return set(path, &document, selector, &args.fields);
    }
    if args.check {
        return check(path, &document, &loaded.dropped);
    }
    list(&document, args.json)
}

fn list(document: &Manifest, json: bool) -> Result<()> {
    let entries = project(document);
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{:<8} {:>3}  {}", entry.kind.label(), entry.index, entry.title);
        println!("              {}", entry.summary);
    }
    Ok(())
}

fn show(document: &Manifest, selector: &EntrySelector) -> Result<()> {
    let entry = selector.resolve(document)?;
    let session = begin_edit(document, &entry)?;
    let width = session
        .fields()
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    println!("{}", entry.title);
    for field in session.fields() {
        println!("  {:<width$} = {}", field.label, field.value, width = width);
    }
    Ok(())
}

fn set(
    path: &std::path::Path,
    document: &Manifest,
    selector: &EntrySelector,
    assignments: &[Assignment],
) -> Result<()> {
    let entry = selector.resolve(document)?;
    let mut session = begin_edit(document, &entry)?;
    for assignment in assignments {
        session.set_value(&assignment.label, assignment.value.as_str())?;
    }
    if !session.is_modified() {
        println!("No changes to {}", entry.title);
        return Ok(());
    }
    let updated = session.commit(document)?;
    let saved = persist::save(path, &updated)?;
    if !saved.dropped.is_empty() {
        eprintln!("warning: dropped from {}: {}", path.display(), saved.dropped.join(", "));
    }
    if saved.differs {
        eprintln!("warning: {} reads back differently than written", path.display());
    }
    let title = entry_for(&saved.document, entry.kind, entry.index)
        .map(|e| e.title)
        .unwrap_or(entry.title);
    log::info!("headless save of {} to {}", title, path.display());
    println!("Saved {} to {}", title, path.display());
    Ok(())
}

fn check(path: &std::path::Path, document: &Manifest, dropped: &[String]) -> Result<()> {
    let text = manifest::serialize(document)?;
    let reparsed = manifest::parse(&text).context("serialized manifest does not parse")?;
    if reparsed != *document {
        anyhow::bail!("{} does not survive a round trip unchanged", path.display());
    }
    if !dropped.is_empty() {
        anyhow::bail!(
            "{} would lose content on save: {}",
            path.display(),
            dropped.join(", ")
        );
    }
    println!(
        "OK: {} round-trips ({} remotes, {} projects)",
        path.display(),
        document.remotes.len(),
        document.projects.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!(
            "default".parse::<EntrySelector>().unwrap(),
            EntrySelector {
                kind: EntryKind::Default,
                key: SelectorKey::Index(0),
            }
        );
        assert_eq!(
            "remote:2".parse::<EntrySelector>().unwrap().key,
            SelectorKey::Index(2)
        );
        assert_eq!(
            "Project:platform/build".parse::<EntrySelector>().unwrap(),
            EntrySelector {
                kind: EntryKind::Project,
                key: SelectorKey::Name("platform/build".to_string()),
            }
        );
        assert!("remote".parse::<EntrySelector>().is_err());
        assert!("remote:".parse::<EntrySelector>().is_err());
        assert!("notice:1".parse::<EntrySelector>().is_err());
    }

    #[test]
    fn test_assignment_parsing() {
        let a: Assignment = "fetch=https://x?a=b".parse().unwrap();
        assert_eq!(a.label, "fetch");
        assert_eq!(a.value, "https://x?a=b");

        let cleared: Assignment = "review=".parse().unwrap();
        assert_eq!(cleared.value, "");

        assert!("=x".parse::<Assignment>().is_err());
        assert!("novalue".parse::<Assignment>().is_err());
    }

    #[test]
    fn test_selector_resolve() {
        let m = manifest::parse(
            r#"<manifest><remote name="a"/><remote name="b"/><project name="p"/></manifest>"#,
        )
        .unwrap();
        let by_name: EntrySelector = "remote:b".parse().unwrap();
        assert_eq!(by_name.resolve(&m).unwrap().index, 1);

        let by_index: EntrySelector = "project:0".parse().unwrap();
        assert_eq!(by_index.resolve(&m).unwrap().title, "Project: p");

        let missing: EntrySelector = "project:3".parse().unwrap();
        let err = missing.resolve(&m).unwrap_err().to_string();
        assert!(err.contains("manifest has 1"));
    }

    #[test]
    fn test_cli_actions_conflict() {
        let parsed = Cli::try_parse_from(["manifest-edit", "--list", "--check"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from(["manifest-edit", "--set", "default"]);
        assert!(parsed.is_err(), "--set requires at least one --field");

        let cli = Cli::try_parse_from([
            "manifest-edit",
            "m.xml",
            "--set",
            "remote:origin",
            "-f",
            "fetch=https://y",
        ])
        .unwrap();
        assert!(cli.has_action());
        assert_eq!(cli.manifest, Some(PathBuf::from("m.xml")));
        assert_eq!(cli.fields.len(), 1);
    }
}
