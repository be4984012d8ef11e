//! CV document model - a section-based profile per employee.

use serde::{Deserialize, Serialize};

/// How a section's items are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvLayout {
    /// Dated entries stacked vertically
    List,
    /// Label/value pairs in a grid
    Grid,
    /// Short tags
    Tags,
    /// Free text
    Paragraph,
}

/// Which column a section sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvSide {
    /// Main column
    Left,
    /// Side column
    Right,
}

/// A label/value pair, e.g. `Phone: 555-0100`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvField {
    /// Item id
    pub id: String,
    /// Label
    pub label: String,
    /// Value
    pub value: String,
}

/// A dated entry, e.g. a degree or a previous position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvListItem {
    /// Item id
    pub id: String,
    /// Title
    pub title: String,
    /// Subtitle, e.g. an institution
    pub subtitle: String,
    /// Free-form date range
    pub date_range: String,
    /// Optional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One item in a section; the JSON carries no tag, the shape decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CvItem {
    /// A dated entry
    Entry(CvListItem),
    /// A label/value pair
    Field(CvField),
}

impl CvItem {
    /// Id of the item, whichever shape it has
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Entry(entry) => &entry.id,
            Self::Field(field) => &field.id,
        }
    }
}

/// A titled block of the CV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSection {
    /// Section id
    pub id: String,
    /// Heading
    pub title: String,
    /// Item layout
    pub layout: CvLayout,
    /// Column
    pub side: CvSide,
    /// Items in display order
    #[serde(default)]
    pub items: Vec<CvItem>,
}

/// An employee's CV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCv {
    /// Internal id of the employee the CV belongs to
    pub employee_id: String,
    /// Free-text introduction
    #[serde(default)]
    pub about_me: String,
    /// Sections in display order
    pub sections: Vec<CvSection>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_items_deserialize_by_shape() {
        let section: CvSection = serde_json::from_str(
            r#"{
                "id": "mixed",
                "title": "MIXED",
                "layout": "grid",
                "side": "left",
                "items": [
                    {"id": "phone", "label": "Phone", "value": "555-0100"},
                    {"id": "edu-1", "title": "BSc", "subtitle": "Dhaka University", "dateRange": "2010 - 2014"}
                ]
            }"#,
        )
        .unwrap();

        assert!(matches!(&section.items[0], CvItem::Field(f) if f.label == "Phone"));
        assert!(matches!(&section.items[1], CvItem::Entry(e) if e.subtitle == "Dhaka University"));
        assert_eq!(section.items[1].id(), "edu-1");
        assert_eq!(section.layout, CvLayout::Grid);
        assert_eq!(section.side, CvSide::Left);
    }
}
