//! CV documents - defaults, legacy upgrade and section editing.
//!
//! Older CVs were flat documents with fixed fields (contact number, a list of
//! qualifications, a list of previous jobs and a handful of personal details). They are
//! recognised by the absence of a `sections` array and restructured into the
//! section-based shape once, when loaded or imported.

use crate::{
    errors::{Error, Result},
    models::{CvField, CvItem, CvLayout, CvListItem, CvSection, CvSide, EmployeeCv},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

fn empty_section(id: &str, title: &str, layout: CvLayout, side: CvSide) -> CvSection {
    CvSection {
        id: id.to_string(),
        title: title.to_string(),
        layout,
        side,
        items: Vec::new(),
    }
}

fn field(id: impl Into<String>, label: &str, value: impl Into<String>) -> CvItem {
    CvItem::Field(CvField {
        id: id.into(),
        label: label.to_string(),
        value: value.into(),
    })
}

/// The CV every employee starts with: empty work, references, education and expertise
/// sections, and a language section listing English and French.
#[must_use]
pub fn default_cv(employee_id: &str) -> EmployeeCv {
    let mut language = empty_section("language", "LANGUAGE", CvLayout::Tags, CvSide::Left);
    language.items = vec![
        field(new_id("lang"), "English", ""),
        field(new_id("lang"), "French", ""),
    ];

    EmployeeCv {
        employee_id: employee_id.to_string(),
        about_me: String::new(),
        sections: vec![
            empty_section("work", "WORK EXPERIENCE", CvLayout::List, CvSide::Right),
            empty_section("references", "REFERENCES", CvLayout::Grid, CvSide::Right),
            empty_section("education", "EDUCATION", CvLayout::List, CvSide::Left),
            empty_section("expertise", "EXPERTISE", CvLayout::Tags, CvSide::Left),
            language,
        ],
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyQualification {
    id: Option<String>,
    degree: String,
    institution: String,
    year: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyExperience {
    id: Option<String>,
    position: String,
    company: String,
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyCv {
    employee_id: String,
    contact_no: String,
    email: String,
    present_address: String,
    educational_qualifications: Option<Vec<LegacyQualification>>,
    work_experience: Option<Vec<LegacyExperience>>,
    father_name: String,
    mother_name: String,
    date_of_birth: String,
    gender: String,
    marital_status: String,
    nationality: String,
    nid: String,
    religion: String,
    permanent_address: String,
}

/// Non-empty values as grid fields.
fn present_fields(values: &[(&str, &str, &str)]) -> Vec<CvItem> {
    values
        .iter()
        .filter(|(_, _, value)| !value.is_empty())
        .map(|(id, label, value)| field(*id, label, *value))
        .collect()
}

impl LegacyCv {
    fn into_current(self) -> EmployeeCv {
        let mut cv = default_cv(&self.employee_id);

        let mut contact = empty_section("contact", "CONTACT", CvLayout::Grid, CvSide::Left);
        contact.items = present_fields(&[
            ("phone", "Phone", self.contact_no.as_str()),
            ("email", "Email", self.email.as_str()),
            ("address", "Address", self.present_address.as_str()),
        ]);
        cv.sections.insert(0, contact);

        if let (Some(qualifications), Some(section)) = (
            self.educational_qualifications,
            cv.sections.iter_mut().find(|s| s.id == "education"),
        ) {
            section.items = qualifications
                .into_iter()
                .map(|q| {
                    CvItem::Entry(CvListItem {
                        id: q.id.unwrap_or_else(|| new_id("edu")),
                        title: q.degree,
                        subtitle: q.institution,
                        date_range: q.year,
                        description: None,
                    })
                })
                .collect();
        }

        if let (Some(experience), Some(section)) = (
            self.work_experience,
            cv.sections.iter_mut().find(|s| s.id == "work"),
        ) {
            section.items = experience
                .into_iter()
                .map(|e| {
                    CvItem::Entry(CvListItem {
                        id: e.id.unwrap_or_else(|| new_id("work")),
                        title: e.position,
                        subtitle: e.company,
                        date_range: e.duration,
                        description: None,
                    })
                })
                .collect();
        }

        let personal = present_fields(&[
            ("father", "Father's Name", self.father_name.as_str()),
            ("mother", "Mother's Name", self.mother_name.as_str()),
            ("dob", "Date of Birth", self.date_of_birth.as_str()),
            ("gender", "Gender", self.gender.as_str()),
            ("marital", "Marital Status", self.marital_status.as_str()),
            ("nationality", "Nationality", self.nationality.as_str()),
            ("nid", "NID", self.nid.as_str()),
            ("religion", "Religion", self.religion.as_str()),
            ("perm-addr", "Permanent Address", self.permanent_address.as_str()),
        ]);
        if !personal.is_empty() {
            let mut section =
                empty_section("personal", "PERSONAL DETAILS", CvLayout::Grid, CvSide::Right);
            section.items = personal;
            cv.sections.push(section);
        }

        cv
    }
}

/// Removes `null` object members so they read like missing keys.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, member| !member.is_null());
            members.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Reads a stored CV document, restructuring the legacy flat shape when the document has
/// no `sections` array. Legacy fields holding `null` are treated as empty.
pub fn upgrade(mut value: Value) -> Result<EmployeeCv> {
    if value.get("sections").is_some_and(Value::is_array) {
        return Ok(serde_json::from_value(value)?);
    }

    strip_nulls(&mut value);
    let legacy: LegacyCv = serde_json::from_value(value)?;
    debug!(employee_id = %legacy.employee_id, "Upgrading legacy CV");
    Ok(legacy.into_current())
}

/// Inserts or replaces the CV of `cv.employee_id`.
///
/// A replaced CV keeps its position; a new one is appended.
#[must_use]
pub fn save_cv(cvs: &[EmployeeCv], cv: EmployeeCv) -> Vec<EmployeeCv> {
    let mut saved = cvs.to_vec();
    match saved.iter().position(|c| c.employee_id == cv.employee_id) {
        Some(index) => saved[index] = cv,
        None => saved.push(cv),
    }
    saved
}

/// The stored CV of an employee, or a fresh default one.
#[must_use]
pub fn cv_for(cvs: &[EmployeeCv], employee_id: &str) -> EmployeeCv {
    cvs.iter()
        .find(|c| c.employee_id == employee_id)
        .cloned()
        .unwrap_or_else(|| default_cv(employee_id))
}

fn section_index(cv: &EmployeeCv, section_id: &str) -> Result<usize> {
    cv.sections
        .iter()
        .position(|s| s.id == section_id)
        .ok_or_else(|| Error::validation(format!("CV section not found: {section_id}")))
}

/// Appends an empty section.
#[must_use]
pub fn add_section(cv: &EmployeeCv, title: &str, layout: CvLayout, side: CvSide) -> EmployeeCv {
    let mut edited = cv.clone();
    edited
        .sections
        .push(empty_section(&new_id("sec"), title, layout, side));
    edited
}

/// Removes a section and everything in it.
pub fn remove_section(cv: &EmployeeCv, section_id: &str) -> Result<EmployeeCv> {
    let index = section_index(cv, section_id)?;
    let mut edited = cv.clone();
    edited.sections.remove(index);
    Ok(edited)
}

/// Moves a section to `position`, shifting the ones in between.
pub fn move_section(cv: &EmployeeCv, section_id: &str, position: usize) -> Result<EmployeeCv> {
    let index = section_index(cv, section_id)?;
    if position >= cv.sections.len() {
        return Err(Error::validation(format!(
            "Section position {position} is out of range"
        )));
    }

    let mut edited = cv.clone();
    let section = edited.sections.remove(index);
    edited.sections.insert(position, section);
    Ok(edited)
}

/// Appends a placeholder item shaped for the section's layout.
pub fn add_item(cv: &EmployeeCv, section_id: &str) -> Result<EmployeeCv> {
    let index = section_index(cv, section_id)?;
    let mut edited = cv.clone();
    let section = &mut edited.sections[index];

    let item = if section.layout == CvLayout::List {
        CvItem::Entry(CvListItem {
            id: new_id("item"),
            title: "New Title".to_string(),
            subtitle: "New Subtitle".to_string(),
            date_range: "Date Range".to_string(),
            description: Some("Description".to_string()),
        })
    } else {
        field(new_id("item"), "New Label", "New Value")
    };
    section.items.push(item);
    Ok(edited)
}

/// Removes one item from a section.
pub fn remove_item(cv: &EmployeeCv, section_id: &str, item_id: &str) -> Result<EmployeeCv> {
    let index = section_index(cv, section_id)?;
    let mut edited = cv.clone();
    let items = &mut edited.sections[index].items;

    let before = items.len();
    items.retain(|item| item.id() != item_id);
    if items.len() == before {
        return Err(Error::validation(format!("CV item not found: {item_id}")));
    }
    Ok(edited)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn section_ids(cv: &EmployeeCv) -> Vec<&str> {
        cv.sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_default_cv_layout() {
        let cv = default_cv("emp-001");

        assert_eq!(
            section_ids(&cv),
            vec!["work", "references", "education", "expertise", "language"]
        );
        let language = &cv.sections[4];
        assert_eq!(language.layout, CvLayout::Tags);
        assert_eq!(language.items.len(), 2);
        assert!(matches!(&language.items[0], CvItem::Field(f) if f.label == "English"));
    }

    #[test]
    fn test_upgrade_keeps_current_shape() {
        let current = default_cv("emp-001");
        let value = serde_json::to_value(&current).unwrap();

        assert_eq!(upgrade(value).unwrap(), current);
    }

    #[test]
    fn test_upgrade_legacy_cv() {
        let legacy = json!({
            "employeeId": "emp-002",
            "contactNo": "01700-000000",
            "email": "",
            "presentAddress": "Gazipur",
            "educationalQualifications": [
                {"id": "edu-1", "degree": "SSC", "institution": "Gazipur High School", "year": "2010"}
            ],
            "workExperience": [
                {"position": "Helper", "company": "Old Mill", "duration": "2015 - 2018"}
            ],
            "fatherName": "Abdul Mia",
            "nid": "1234567890"
        });

        let cv = upgrade(legacy).unwrap();

        assert_eq!(cv.employee_id, "emp-002");
        assert_eq!(
            section_ids(&cv),
            vec!["contact", "work", "references", "education", "expertise", "language", "personal"]
        );

        let contact = &cv.sections[0];
        assert_eq!(contact.items.len(), 2);
        assert_eq!(contact.side, CvSide::Left);

        let education = &cv.sections[3];
        assert!(matches!(
            &education.items[0],
            CvItem::Entry(e) if e.id == "edu-1" && e.title == "SSC" && e.date_range == "2010"
        ));

        let work = &cv.sections[1];
        assert!(matches!(
            &work.items[0],
            CvItem::Entry(e) if e.id.starts_with("work-") && e.subtitle == "Old Mill"
        ));

        let personal = &cv.sections[6];
        assert_eq!(personal.side, CvSide::Right);
        assert_eq!(personal.items.len(), 2);
    }

    #[test]
    fn test_upgrade_legacy_without_personal_details() {
        let cv = upgrade(json!({"employeeId": "emp-003"})).unwrap();

        assert_eq!(cv.sections[0].id, "contact");
        assert!(cv.sections[0].items.is_empty());
        assert!(cv.sections.iter().all(|s| s.id != "personal"));
    }

    #[test]
    fn test_upgrade_legacy_with_null_fields() {
        let cv = upgrade(json!({
            "employeeId": "emp-001",
            "contactNo": "0170",
            "email": null,
            "presentAddress": null,
            "educationalQualifications": null,
            "workExperience": [{"position": "Helper", "company": null, "duration": null}],
            "fatherName": null
        }))
        .unwrap();

        assert_eq!(cv.sections[0].items.len(), 1);
        assert!(matches!(&cv.sections[0].items[0], CvItem::Field(f) if f.value == "0170"));
        assert!(matches!(
            &cv.sections[1].items[0],
            CvItem::Entry(e) if e.title == "Helper" && e.subtitle.is_empty()
        ));
        assert!(cv.sections.iter().all(|s| s.id != "personal"));
    }

    #[test]
    fn test_save_cv_upserts() {
        let cvs = vec![default_cv("emp-001"), default_cv("emp-002")];
        let mut edited = cvs[0].clone();
        edited.about_me = "Line supervisor".to_string();

        let saved = save_cv(&cvs, edited);
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].about_me, "Line supervisor");

        let saved = save_cv(&saved, default_cv("emp-003"));
        assert_eq!(saved.len(), 3);
        assert_eq!(cv_for(&saved, "emp-001").about_me, "Line supervisor");
        assert_eq!(cv_for(&saved, "emp-404").sections.len(), 5);
    }

    #[test]
    fn test_section_editing() {
        let cv = default_cv("emp-001");

        let cv = add_section(&cv, "AWARDS", CvLayout::List, CvSide::Right);
        assert_eq!(cv.sections.len(), 6);
        let awards_id = cv.sections[5].id.clone();

        let cv = move_section(&cv, &awards_id, 0).unwrap();
        assert_eq!(cv.sections[0].title, "AWARDS");
        assert_eq!(cv.sections[1].id, "work");

        let cv = add_item(&cv, &awards_id).unwrap();
        let cv = add_item(&cv, "expertise").unwrap();
        assert!(matches!(&cv.sections[0].items[0], CvItem::Entry(_)));
        assert!(matches!(&cv.sections[4].items[0], CvItem::Field(_)));

        let item_id = cv.sections[0].items[0].id().to_string();
        let cv = remove_item(&cv, &awards_id, &item_id).unwrap();
        assert!(cv.sections[0].items.is_empty());
        assert!(remove_item(&cv, &awards_id, &item_id).is_err());

        let cv = remove_section(&cv, &awards_id).unwrap();
        assert_eq!(cv.sections.len(), 5);
        assert!(matches!(
            remove_section(&cv, &awards_id),
            Err(Error::Validation { .. })
        ));
        assert!(move_section(&cv, "work", 5).is_err());
    }
}
