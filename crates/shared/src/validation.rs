//! Field rules for a teacher draft. Pure: no I/O, and the clock is a parameter
//! of [`validate_at`].

use std::{collections::BTreeMap, fmt, ops::RangeInclusive};

use chrono::{DateTime, Utc};

use crate::domain::TeacherDraft;

pub const CLASSES_RANGE: RangeInclusive<i64> = 1..=10;
pub const EXPERIENCE_RANGE: RangeInclusive<i64> = 0..=50;
pub const TOTAL_STUDENTS_RANGE: RangeInclusive<i64> = 0..=1000;
pub const RATING_RANGE: RangeInclusive<f64> = 0.0..=5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TeacherField {
    Name,
    Email,
    Phone,
    Subject,
    Classes,
    Experience,
    TotalStudents,
    Rating,
    JoinDate,
}

impl TeacherField {
    /// Key used in the error mapping; matches the JSON field name.
    pub fn key(self) -> &'static str {
        match self {
            TeacherField::Name => "name",
            TeacherField::Email => "email",
            TeacherField::Phone => "phone",
            TeacherField::Subject => "subject",
            TeacherField::Classes => "classes",
            TeacherField::Experience => "experience",
            TeacherField::TotalStudents => "totalStudents",
            TeacherField::Rating => "rating",
            TeacherField::JoinDate => "joinDate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeacherField::Name => "Name",
            TeacherField::Email => "Email",
            TeacherField::Phone => "Phone",
            TeacherField::Subject => "Subject",
            TeacherField::Classes => "Classes",
            TeacherField::Experience => "Experience",
            TeacherField::TotalStudents => "Total students",
            TeacherField::Rating => "Rating",
            TeacherField::JoinDate => "Join date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Required,
    Format,
    Range { min: f64, max: f64 },
    FutureDate,
}

impl FieldError {
    pub fn message_for(&self, field: TeacherField) -> String {
        let label = field.label();
        match self {
            FieldError::Required => format!("{label} is required"),
            FieldError::Format => format!("{label} is not a valid address"),
            FieldError::Range { min, max } => format!("{label} must be between {min} and {max}"),
            FieldError::FutureDate => format!("{label} cannot be in the future"),
        }
    }
}

/// Every rule violation of one draft, keyed by field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<TeacherField, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: TeacherField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn contains(&self, field: TeacherField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = TeacherField> + '_ {
        self.errors.keys().copied()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(TeacherField) -> bool) {
        self.errors.retain(|field, _| keep(*field));
    }

    /// Field key and inline message pairs, in form field order.
    pub fn messages(&self) -> Vec<(&'static str, String)> {
        self.errors
            .iter()
            .map(|(field, error)| (field.key(), error.message_for(*field)))
            .collect()
    }

    fn insert(&mut self, field: TeacherField, error: FieldError) {
        self.errors.insert(field, error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            f.write_str(&error.message_for(*field))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate(draft: &TeacherDraft) -> ValidationErrors {
    validate_at(draft, Utc::now())
}

pub fn validate_at(draft: &TeacherDraft, now: DateTime<Utc>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if draft.name.trim().is_empty() {
        errors.insert(TeacherField::Name, FieldError::Required);
    }

    if draft.email.trim().is_empty() {
        errors.insert(TeacherField::Email, FieldError::Required);
    } else if !is_email_shaped(draft.email.trim()) {
        errors.insert(TeacherField::Email, FieldError::Format);
    }

    if draft.phone.trim().is_empty() {
        errors.insert(TeacherField::Phone, FieldError::Required);
    }

    if draft.subject.is_none() {
        errors.insert(TeacherField::Subject, FieldError::Required);
    }

    if !CLASSES_RANGE.contains(&draft.classes) {
        errors.insert(TeacherField::Classes, int_range(&CLASSES_RANGE));
    }
    if !EXPERIENCE_RANGE.contains(&draft.experience) {
        errors.insert(TeacherField::Experience, int_range(&EXPERIENCE_RANGE));
    }
    if !TOTAL_STUDENTS_RANGE.contains(&draft.total_students) {
        errors.insert(TeacherField::TotalStudents, int_range(&TOTAL_STUDENTS_RANGE));
    }
    // NaN fails `contains` and lands here too.
    if !RATING_RANGE.contains(&draft.rating) {
        errors.insert(
            TeacherField::Rating,
            FieldError::Range {
                min: *RATING_RANGE.start(),
                max: *RATING_RANGE.end(),
            },
        );
    }

    match draft.join_date {
        None => errors.insert(TeacherField::JoinDate, FieldError::Required),
        Some(join_date) if join_date > now => {
            errors.insert(TeacherField::JoinDate, FieldError::FutureDate)
        }
        Some(_) => {}
    }

    errors
}

fn int_range(bounds: &RangeInclusive<i64>) -> FieldError {
    FieldError::Range {
        min: *bounds.start() as f64,
        max: *bounds.end() as f64,
    }
}

/// `local@domain.tld` with no whitespace and every segment non-empty.
pub fn is_email_shaped(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    email.match_indices('@').any(|(at, _)| {
        let domain = &email[at + 1..];
        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
