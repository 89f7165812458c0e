// entry.rs - Flat projection of a manifest into addressable list entries

use crate::manifest::{DefaultBlock, Manifest, Project, Remote};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Entry kinds and their canonical schemas
// ---------------------------------------------------------------------------

pub const DEFAULT_SCHEMA: &[&str] = &["sync-j", "revision", "remote", "dest-branch"];
pub const REMOTE_SCHEMA: &[&str] = &["name", "fetch", "revision", "upstream", "review"];
pub const PROJECT_SCHEMA: &[&str] = &[
    "name",
    "path",
    "remote",
    "revision",
    "upstream",
    "groups",
    "dest-branch",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Default,
    Remote,
    Project,
}

impl EntryKind {
    /// Ordered attribute labels edited for this kind.
    pub fn schema(self) -> &'static [&'static str] {
        match self {
            EntryKind::Default => DEFAULT_SCHEMA,
            EntryKind::Remote => REMOTE_SCHEMA,
            EntryKind::Project => PROJECT_SCHEMA,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Default => "Default",
            EntryKind::Remote => "Remote",
            EntryKind::Project => "Project",
        }
    }

    /// Number of records of this kind in the manifest.
    pub fn len_in(self, manifest: &Manifest) -> usize {
        match self {
            EntryKind::Default => 1,
            EntryKind::Remote => manifest.remotes.len(),
            EntryKind::Project => manifest.projects.len(),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One list row. Only `kind` + `index` address the record; the text is derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub index: usize,
    pub title: String,
    pub summary: String,
}

/// Project the manifest: default first, then remotes, then projects.
pub fn project(manifest: &Manifest) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(1 + manifest.remotes.len() + manifest.projects.len());
    entries.push(default_entry(&manifest.default));
    entries.extend(
        manifest
            .remotes
            .iter()
            .enumerate()
            .map(|(i, r)| remote_entry(i, r)),
    );
    entries.extend(
        manifest
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| project_entry(i, p)),
    );
    entries
}

/// Re-derive the entry for one slot of the current manifest.
pub fn entry_for(manifest: &Manifest, kind: EntryKind, index: usize) -> Option<Entry> {
    match kind {
        EntryKind::Default => (index == 0).then(|| default_entry(&manifest.default)),
        EntryKind::Remote => manifest.remotes.get(index).map(|r| remote_entry(index, r)),
        EntryKind::Project => manifest.projects.get(index).map(|p| project_entry(index, p)),
    }
}

/// Look up a remote or project by its `name` attribute (first match).
pub fn find_by_name(manifest: &Manifest, kind: EntryKind, name: &str) -> Option<Entry> {
    let index = match kind {
        EntryKind::Default => return None,
        EntryKind::Remote => manifest.remotes.iter().position(|r| r.name == name)?,
        EntryKind::Project => manifest.projects.iter().position(|p| p.name == name)?,
    };
    entry_for(manifest, kind, index)
}

fn default_entry(d: &DefaultBlock) -> Entry {
    Entry {
        kind: EntryKind::Default,
        index: 0,
        title: "Default".to_string(),
        summary: format!(
            "[sync-j: {}] [revision: {}] [remote: {}] [dest-branch: {}]",
            d.sync_j, d.revision, d.remote, d.dest_branch
        ),
    }
}

fn remote_entry(index: usize, r: &Remote) -> Entry {
    Entry {
        kind: EntryKind::Remote,
        index,
        title: format!("Remote: {}", r.name),
        summary: format!(
            "[fetch: {}] [revision: {}] [upstream: {}] [review: {}]",
            r.fetch, r.revision, r.upstream, r.review
        ),
    }
}

fn project_entry(index: usize, p: &Project) -> Entry {
    Entry {
        kind: EntryKind::Project,
        index,
        title: format!("Project: {}", p.name),
        summary: format!(
            "[path: {}] [remote: {}] [revision: {}] [upstream: {}] [groups: {}] [dest-branch: {}]",
            p.path, p.remote, p.revision, p.upstream, p.groups, p.dest_branch
        ),
    }
}
