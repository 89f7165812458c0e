// tui/app.rs - Pure state machine for TUI (no terminal dependency)

use crate::edit::{begin_edit, Direction, EditSession};
use crate::entry::{project, Entry};
use crate::error::LoadError;
use crate::manifest::Manifest;
use crate::persist::{self, ReadBack, Saved};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Input classification
// ---------------------------------------------------------------------------

/// A classified input event. Key identities are decided in `events.rs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    NextItem,
    PrevItem,
    NextField,
    PrevField,
    /// Select the entry while browsing, commit while editing.
    Activate,
    Cancel,
    Quit,
    Reload,
    Input(char),
    Backspace,
    ClearField,
}

// ---------------------------------------------------------------------------
// Mode and status
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Editing(EditSession),
}

/// Outcome of the last operation, shown until the next one replaces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Info(String),
    /// The operation went through but something needs the user's attention.
    Warning(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(s) | Status::Warning(s) | Status::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct App {
    pub path: PathBuf,
    manifest: Manifest,
    entries: Vec<Entry>,
    pub cursor: usize,
    pub mode: Mode,
    pub status: Option<Status>,
    pub should_quit: bool,
    read_back: ReadBack,
}

impl App {
    pub fn new(path: PathBuf, manifest: Manifest) -> Self {
        let entries = project(&manifest);
        App {
            path,
            manifest,
            entries,
            cursor: 0,
            mode: Mode::Browsing,
            status: None,
            should_quit: false,
            read_back: persist::read_file,
        }
    }

    /// Load the manifest at `path`. Failure here is fatal for the caller.
    pub fn open(path: PathBuf) -> Result<Self, LoadError> {
        let parsed = persist::load(&path)?;
        let mut app = App::new(path, parsed.manifest);
        app.status = unsaved_content_warning(&parsed.dropped);
        Ok(app)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.mode {
            Mode::Editing(session) => Some(session),
            Mode::Browsing => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Route one action according to the current mode.
    pub fn apply(&mut self, action: Action) {
        if action == Action::Quit {
            if self.is_editing() {
                log::info!("quit with an open edit session; changes discarded");
            }
            self.should_quit = true;
            return;
        }

        if self.is_editing() {
            self.apply_editing(action);
        } else {
            self.apply_browsing(action);
        }
    }

    fn apply_browsing(&mut self, action: Action) {
        match action {
            Action::NextItem => self.move_down(),
            Action::PrevItem => self.move_up(),
            Action::Activate => self.start_edit(),
            Action::Reload => self.reload(),
            Action::Cancel => self.should_quit = true,
            _ => {}
        }
    }

    fn apply_editing(&mut self, action: Action) {
        match action {
            Action::Activate => {
                self.commit_edit();
                return;
            }
            Action::Cancel => {
                self.cancel_edit();
                return;
            }
            _ => {}
        }
        let Mode::Editing(session) = &mut self.mode else {
            return;
        };
        match action {
            Action::NextField | Action::NextItem => session.move_focus(Direction::Next),
            Action::PrevField | Action::PrevItem => session.move_focus(Direction::Previous),
            Action::Input(c) => session.insert_char(c),
            Action::Backspace => session.backspace(),
            Action::ClearField => session.clear_focused(),
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Browsing
    // -----------------------------------------------------------------------

    pub fn move_up(&mut self) {
        let count = self.entries.len();
        if count == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 {
            count - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn move_down(&mut self) {
        let count = self.entries.len();
        if count == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % count;
    }

    /// Open an edit session on the entry under the cursor.
    pub fn start_edit(&mut self) {
        let Some(entry) = self.entries.get(self.cursor) else {
            return;
        };
        match begin_edit(&self.manifest, entry) {
            Ok(session) => {
                log::debug!("editing {}", session.title());
                self.mode = Mode::Editing(session);
            }
            Err(e) => {
                log::warn!("cannot edit: {}", e);
                self.status = Some(Status::Error(e.to_string()));
                self.entries = project(&self.manifest);
            }
        }
    }

    /// Re-read the file, keeping the current document if that fails.
    pub fn reload(&mut self) {
        match persist::load(&self.path) {
            Ok(parsed) => {
                self.replace_manifest(parsed.manifest);
                self.status = unsaved_content_warning(&parsed.dropped).or_else(|| {
                    Some(Status::Info(format!("Reloaded {}", self.path.display())))
                });
            }
            Err(e) => {
                log::warn!("reload failed: {}", e);
                self.status = Some(Status::Error(format!("Reload failed: {}", e)));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Discard the session. The document is untouched.
    pub fn cancel_edit(&mut self) {
        if let Mode::Editing(session) = std::mem::replace(&mut self.mode, Mode::Browsing) {
            log::debug!("edit of {} cancelled", session.title());
        }
    }

    /// Commit the session and save. Always ends in Browsing.
    ///
    /// The document is replaced only when the save round trip succeeds.
    pub fn commit_edit(&mut self) {
        let Mode::Editing(session) = std::mem::replace(&mut self.mode, Mode::Browsing) else {
            return;
        };
        let title = session.title().to_string();
        let (kind, index) = (session.kind(), session.index());

        let updated = match session.commit(&self.manifest) {
            Ok(updated) => updated,
            Err(e) => {
                log::warn!("commit of {} aborted: {}", title, e);
                self.status = Some(Status::Error(format!("Commit aborted: {}", e)));
                return;
            }
        };

        match persist::save_with(&self.path, &updated, self.read_back) {
            Ok(saved) => {
                log::info!("saved {} #{} to {}", kind, index, self.path.display());
                let status = saved_status(&saved, &title, &self.path);
                self.replace_manifest(saved.document);
                self.status = Some(status);
            }
            Err(e) => {
                let note = if e.file_overwritten() {
                    " (file on disk may have changed)"
                } else {
                    " (file unchanged)"
                };
                self.status = Some(Status::Error(format!("Save failed: {}{}", e, note)));
            }
        }
    }

    /// Swap in a new document wholesale and re-project it.
    fn replace_manifest(&mut self, manifest: Manifest) {
        self.manifest = manifest;
        self.entries = project(&self.manifest);
        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len().saturating_sub(1);
        }
    }
}

/// Warn when the file holds content the editor does not keep.
fn unsaved_content_warning(dropped: &[String]) -> Option<Status> {
    if dropped.is_empty() {
        return None;
    }
    Some(Status::Warning(format!("Not kept on save: {}", dropped.join(", "))))
}

fn saved_status(saved: &Saved, title: &str, path: &std::path::Path) -> Status {
    let text = format!("Saved {} to {}", title, path.display());
    let mut notes = Vec::new();
    if !saved.dropped.is_empty() {
        notes.push(format!("dropped {}", saved.dropped.join(", ")));
    }
    if saved.differs {
        notes.push("file reads back differently".to_string());
    }
    if notes.is_empty() {
        Status::Info(text)
    } else {
        Status::Warning(format!("{} ({})", text, notes.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::manifest::{self as codec, DefaultBlock, Remote};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <default sync-j="4" revision="main"/>
  <remote name="origin" fetch="https://x"/>
  <project name="app" path="apps/app" remote="origin"/>
  <project name="lib" path="libs/lib" remote="origin" groups="core"/>
</manifest>
"#;

    fn make_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default.xml");
        fs::write(&path, SAMPLE).unwrap();
        let app = App::open(path).unwrap();
        (dir, app)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.apply(Action::Input(c));
        }
    }

    #[test]
    fn test_open_projects_entries() {
        let (_dir, app) = make_app();
        let kinds: Vec<_> = app.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Default,
                EntryKind::Remote,
                EntryKind::Project,
                EntryKind::Project
            ]
        );
        assert_eq!(app.mode, Mode::Browsing);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_cursor_wraps() {
        let (_dir, mut app) = make_app();
        app.apply(Action::PrevItem);
        assert_eq!(app.cursor, 3);
        app.apply(Action::NextItem);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_select_then_cancel_leaves_document() {
        let (_dir, mut app) = make_app();
        let before = app.manifest().clone();
        app.apply(Action::NextItem);
        app.apply(Action::Activate);
        assert!(app.is_editing());

        type_text(&mut app, "-changed");
        app.apply(Action::Cancel);
        assert_eq!(app.mode, Mode::Browsing);
        assert_eq!(app.manifest(), &before);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_commit_saves_and_reprojects() {
        let (_dir, mut app) = make_app();
        app.apply(Action::NextItem); // Remote: origin
        app.apply(Action::Activate);
        app.apply(Action::NextField); // fetch
        app.apply(Action::ClearField);
        type_text(&mut app, "https://y");
        app.apply(Action::Activate);

        assert_eq!(app.mode, Mode::Browsing);
        assert_eq!(app.manifest().remotes[0].fetch, "https://y");
        assert_eq!(app.manifest().remotes[0].name, "origin");
        assert!(matches!(&app.status, Some(Status::Info(s)) if s.starts_with("Saved Remote: origin")));
        assert!(app.entries()[1].summary.contains("https://y"));

        let on_disk = codec::parse(&fs::read_to_string(&app.path).unwrap()).unwrap();
        assert_eq!(&on_disk, app.manifest());
    }

    #[test]
    fn test_second_activate_after_commit_reopens_from_browsing() {
        let (_dir, mut app) = make_app();
        app.apply(Action::Activate);
        app.apply(Action::Activate);
        assert_eq!(app.mode, Mode::Browsing);
        app.apply(Action::Activate);
        assert!(app.is_editing());
    }

    #[test]
    fn test_renaming_project_updates_title() {
        let (_dir, mut app) = make_app();
        app.cursor = 3;
        app.apply(Action::Activate);
        app.apply(Action::ClearField); // name
        type_text(&mut app, "core-lib");
        app.apply(Action::Activate);

        assert_eq!(app.entries()[3].title, "Project: core-lib");
        assert_eq!(app.manifest().projects[1].groups, "core");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_save_failure_keeps_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone").join("default.xml");
        let manifest = Manifest {
            default: DefaultBlock::default(),
            remotes: vec![Remote {
                name: "origin".to_string(),
                ..Default::default()
            }],
            projects: vec![],
        };
        let mut app = App::new(path, manifest.clone());
        app.cursor = 1;
        app.apply(Action::Activate);
        type_text(&mut app, "2");
        app.apply(Action::Activate);

        assert_eq!(app.mode, Mode::Browsing);
        assert_eq!(app.manifest(), &manifest);
        let status = app.status.clone().unwrap();
        assert!(status.is_error());
        assert!(status.text().contains("file unchanged"));
    }

    /// Open the sample, edit the remote's fetch, and commit.
    fn commit_remote_edit(app: &mut App) {
        app.cursor = 1;
        app.apply(Action::Activate);
        app.apply(Action::NextField);
        type_text(app, "/next");
        app.apply(Action::Activate);
    }

    #[test]
    fn test_read_back_failure_keeps_document() {
        let (_dir, mut app) = make_app();
        let before = app.manifest().clone();
        app.read_back = |_| Err(io::Error::new(io::ErrorKind::Other, "device gone"));
        commit_remote_edit(&mut app);

        assert_eq!(app.mode, Mode::Browsing);
        assert_eq!(app.manifest(), &before);
        let status = app.status.clone().unwrap();
        assert!(status.is_error());
        assert!(status.text().contains("could not be read back"));
        assert!(status.text().contains("file on disk may have changed"));
        // The write itself went through
        assert!(fs::read_to_string(&app.path).unwrap().contains("https://x/next"));
    }

    #[test]
    fn test_reparse_failure_keeps_document() {
        let (_dir, mut app) = make_app();
        let before = app.manifest().clone();
        app.read_back = |_| Ok("garbled".to_string());
        commit_remote_edit(&mut app);

        assert_eq!(app.manifest(), &before);
        assert_eq!(app.entries()[1].summary, project(&before)[1].summary);
        let status = app.status.clone().unwrap();
        assert!(status.text().contains("does not parse back"));
        assert!(status.text().contains("file on disk may have changed"));
    }

    #[test]
    fn test_reread_difference_is_a_warning() {
        let (_dir, mut app) = make_app();
        app.read_back = |_| Ok(r#"<manifest><remote name="origin"/></manifest>"#.to_string());
        commit_remote_edit(&mut app);

        // The reread document is what the file holds, so it wins
        assert_eq!(app.manifest().remotes[0].fetch, "");
        assert!(matches!(
            &app.status,
            Some(Status::Warning(s)) if s.contains("reads back differently")
        ));
    }

    #[test]
    fn test_unsupported_content_is_flagged_on_open_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("default.xml");
        fs::write(
            &path,
            r#"<manifest>
  <remote name="origin" fetch="https://x"/>
  <project name="app" path="app" clone-depth="1"><linkfile src="a" dest="b"/></project>
</manifest>"#,
        )
        .unwrap();
        let mut app = App::open(path).unwrap();
        assert!(matches!(
            &app.status,
            Some(Status::Warning(s)) if s.contains("<linkfile> in <project>")
        ));

        commit_remote_edit(&mut app);
        let status = app.status.clone().unwrap();
        assert!(matches!(status, Status::Warning(_)));
        assert!(status.text().starts_with("Saved Remote: origin"));
        assert!(status.text().contains("clone-depth on <project>"));
        assert_eq!(app.manifest().remotes[0].fetch, "https://x/next");
    }

    #[test]
    fn test_status_survives_navigation() {
        let (_dir, mut app) = make_app();
        app.apply(Action::Activate);
        app.apply(Action::Activate);
        let status = app.status.clone();
        assert!(status.is_some());
        app.apply(Action::NextItem);
        app.apply(Action::NextItem);
        assert_eq!(app.status, status);
    }

    #[test]
    fn test_reload_picks_up_external_change() {
        let (_dir, mut app) = make_app();
        app.cursor = 3;
        fs::write(
            &app.path,
            r#"<manifest><remote name="other" fetch="https://z"/></manifest>"#,
        )
        .unwrap();
        app.apply(Action::Reload);

        assert_eq!(app.entries().len(), 2);
        assert_eq!(app.cursor, 1);
        assert_eq!(app.manifest().remotes[0].name, "other");
        assert!(matches!(app.status, Some(Status::Info(_))));
    }

    #[test]
    fn test_reload_failure_is_reported() {
        let (_dir, mut app) = make_app();
        let before = app.manifest().clone();
        fs::write(&app.path, "not a manifest").unwrap();
        app.apply(Action::Reload);

        assert_eq!(app.manifest(), &before);
        assert!(app.status.as_ref().is_some_and(Status::is_error));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_from_both_modes() {
        let (_dir, mut app) = make_app();
        app.apply(Action::Cancel);
        assert!(app.should_quit);

        let (_dir, mut app) = make_app();
        app.apply(Action::Activate);
        app.apply(Action::Cancel);
        assert!(!app.should_quit);
        app.apply(Action::Activate);
        app.apply(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_q_while_editing_is_input() {
        let (_dir, mut app) = make_app();
        app.apply(Action::Activate);
        app.apply(Action::ClearField);
        type_text(&mut app, "q");
        assert_eq!(app.session().unwrap().focused().value, "q");
        assert!(!app.should_quit);
    }
}
