use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Subject, TeacherDraft, TeacherStatus},
    error::FetchError,
    validation::{self, TeacherField, ValidationErrors},
};

/// Fields the update call never carries. They are fixed once a teacher exists.
pub const CREATE_ONLY_FIELDS: [TeacherField; 3] = [
    TeacherField::TotalStudents,
    TeacherField::Rating,
    TeacherField::JoinDate,
];

/// `{ success, data, error }` wrapper every `/api/teachers` response uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    // A missing `Option` already decodes as `None`; `default` here would
    // demand `T: Default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: Some(true),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Best human-readable failure text the body carries.
    pub fn failure_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|text| !text.trim().is_empty())
    }

    /// `success: false` is a failure even on a 2xx status.
    pub fn into_result(self) -> Result<Option<T>, FetchError> {
        if self.success == Some(false) {
            let message = self
                .failure_message()
                .unwrap_or("request was rejected by the server")
                .to_string();
            return Err(FetchError::new(message));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub classes: i64,
    pub experience: i64,
    pub total_students: i64,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub status: TeacherStatus,
    pub join_date: DateTime<Utc>,
}

impl CreateTeacherRequest {
    /// Validates `draft` against `now` and normalizes it for transmission.
    pub fn from_draft(draft: &TeacherDraft, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let errors = validation::validate_at(draft, now);
        let (Some(subject), Some(join_date), true) =
            (draft.subject, draft.join_date, errors.is_empty())
        else {
            return Err(errors);
        };

        Ok(Self {
            name: draft.name.trim().to_string(),
            email: normalize_email(&draft.email),
            phone: draft.phone.trim().to_string(),
            subject,
            classes: draft.classes,
            experience: draft.experience,
            total_students: draft.total_students,
            rating: draft.rating,
            schedule: normalize_schedule(&draft.schedule),
            status: draft.status,
            join_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub classes: i64,
    pub experience: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub status: TeacherStatus,
}

impl UpdateTeacherRequest {
    /// Like [`CreateTeacherRequest::from_draft`], but create-only fields are
    /// neither validated nor sent.
    pub fn from_draft(draft: &TeacherDraft, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = validation::validate_at(draft, now);
        errors.retain(|field| !CREATE_ONLY_FIELDS.contains(&field));
        let (Some(subject), true) = (draft.subject, errors.is_empty()) else {
            return Err(errors);
        };

        Ok(Self {
            name: draft.name.trim().to_string(),
            email: normalize_email(&draft.email),
            phone: draft.phone.trim().to_string(),
            subject,
            classes: draft.classes,
            experience: draft.experience,
            schedule: normalize_schedule(&draft.schedule),
            status: draft.status,
        })
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalize_schedule(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
