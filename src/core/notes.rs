//! Notes board business logic.

use crate::{
    errors::{Error, Result},
    models::Note,
};
use chrono::{DateTime, Utc};

/// Default color tag for new notes.
pub const DEFAULT_NOTE_COLOR: &str = "bg-yellow-100";

/// User-entered part of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    /// Heading
    pub title: String,
    /// Body text
    pub content: String,
    /// Color tag
    pub color: String,
}

/// Adds a note to the top of the board, stamping its id and timestamps.
#[must_use]
pub fn add_note(notes: &[Note], draft: NoteDraft, now: DateTime<Utc>) -> Vec<Note> {
    let note = Note {
        id: format!("note-{}", uuid::Uuid::new_v4().simple()),
        title: draft.title,
        content: draft.content,
        color: draft.color,
        created_at: now,
        updated_at: now,
    };

    std::iter::once(note).chain(notes.iter().cloned()).collect()
}

/// Replaces a note, refreshing its `updated_at`. The creation time is kept.
pub fn update_note(notes: &[Note], updated: Note, now: DateTime<Utc>) -> Result<Vec<Note>> {
    let Some(current) = notes.iter().find(|n| n.id == updated.id) else {
        return Err(Error::NoteNotFound { id: updated.id });
    };

    let replacement = Note {
        created_at: current.created_at,
        updated_at: now,
        ..updated
    };
    Ok(notes
        .iter()
        .map(|n| if n.id == replacement.id { replacement.clone() } else { n.clone() })
        .collect())
}

/// Removes a note from the board.
pub fn delete_note(notes: &[Note], note_id: &str) -> Result<Vec<Note>> {
    if !notes.iter().any(|n| n.id == note_id) {
        return Err(Error::NoteNotFound {
            id: note_id.to_string(),
        });
    }
    Ok(notes.iter().filter(|n| n.id != note_id).cloned().collect())
}
