//! Note model - a free-form sticky note.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note on the notes board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Note id
    pub id: String,
    /// Heading
    pub title: String,
    /// Body text, may contain rich-text markup
    pub content: String,
    /// Color tag, e.g. `bg-yellow-100`
    pub color: String,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// When the note was last edited
    pub updated_at: DateTime<Utc>,
}
