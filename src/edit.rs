// edit.rs - Edit session: form state for one entry, committed back wholesale

use crate::entry::{entry_for, Entry, EntryKind};
use crate::error::EditError;
use crate::manifest::{DefaultBlock, FieldMap, Manifest, Project, Remote};

/// One editable attribute in the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    original: String,
}

impl Field {
    pub fn is_modified(&self) -> bool {
        self.value != self.original
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Transient form for a single entry. Consumed by `commit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    kind: EntryKind,
    index: usize,
    title: String,
    fields: Vec<Field>,
    focus: usize,
}

/// Open a session on `entry`, reading the current values from `manifest`.
///
/// Fails with `EntryStale` when the entry no longer describes the record at
/// its slot (the manifest changed after the entry was projected).
pub fn begin_edit(manifest: &Manifest, entry: &Entry) -> Result<EditSession, EditError> {
    let stale = EditError::EntryStale {
        kind: entry.kind,
        index: entry.index,
    };
    match entry_for(manifest, entry.kind, entry.index) {
        Some(current) if current == *entry => {}
        _ => return Err(stale),
    }

    let read = |label: &str| -> Option<String> {
        let value = match entry.kind {
            EntryKind::Default => manifest.default.get(label),
            EntryKind::Remote => manifest.remotes.get(entry.index)?.get(label),
            EntryKind::Project => manifest.projects.get(entry.index)?.get(label),
        };
        value.map(str::to_string)
    };

    let fields = entry
        .kind
        .schema()
        .iter()
        .map(|&label| {
            let value = read(label).unwrap_or_default();
            Field {
                label,
                original: value.clone(),
                value,
            }
        })
        .collect();

    Ok(EditSession {
        kind: entry.kind,
        index: entry.index,
        title: entry.title.clone(),
        fields,
        focus: 0,
    })
}

impl EditSession {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Title of the entry the session was opened on.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn is_modified(&self) -> bool {
        self.fields.iter().any(Field::is_modified)
    }

    /// Move focus one field, wrapping at either end.
    pub fn move_focus(&mut self, direction: Direction) {
        let count = self.fields.len();
        if count == 0 {
            return;
        }
        self.focus = match direction {
            Direction::Next => (self.focus + 1) % count,
            Direction::Previous => (self.focus + count - 1) % count,
        };
    }

    pub fn focused(&self) -> &Field {
        &self.fields[self.focus]
    }

    pub fn insert_char(&mut self, c: char) {
        self.fields[self.focus].value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].value.pop();
    }

    pub fn clear_focused(&mut self) {
        self.fields[self.focus].value.clear();
    }

    /// Replace a field's value by label.
    pub fn set_value(&mut self, label: &str, value: impl Into<String>) -> Result<(), EditError> {
        match self.fields.iter_mut().find(|f| f.label == label) {
            Some(field) => {
                field.value = value.into();
                Ok(())
            }
            None => Err(EditError::UnknownField {
                kind: self.kind,
                label: label.to_string(),
            }),
        }
    }

    /// Write every field into a fresh record at the session's slot.
    ///
    /// Returns the updated manifest; `manifest` itself is left untouched, also
    /// on error.
    pub fn commit(self, manifest: &Manifest) -> Result<Manifest, EditError> {
        let len = self.kind.len_in(manifest);
        if self.index >= len {
            return Err(EditError::IndexOutOfRange {
                kind: self.kind,
                index: self.index,
                len,
            });
        }

        let values: FieldMap = self
            .fields
            .into_iter()
            .map(|f| (f.label.to_string(), f.value))
            .collect();

        let mut updated = manifest.clone();
        match self.kind {
            EntryKind::Default => updated.default = DefaultBlock::from_fields(&values),
            EntryKind::Remote => updated.remotes[self.index] = Remote::from_fields(&values),
            EntryKind::Project => updated.projects[self.index] = Project::from_fields(&values),
        }
        log::debug!("committed {} #{}", self.kind, self.index);
        Ok(updated)
    }
}
