use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_SUBJECT: Subject = Subject::Mathematics;
pub const DEFAULT_CLASSES: i64 = 1;
pub const DEFAULT_EXPERIENCE: i64 = 0;
pub const DEFAULT_TOTAL_STUDENTS: i64 = 0;
pub const DEFAULT_RATING: f64 = 4.5;
pub const DEFAULT_STATUS: TeacherStatus = TeacherStatus::Active;

/// Server-assigned identifier. Opaque to the client and never edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeacherId(pub String);

impl TeacherId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TeacherId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Subject {
    #[default]
    Mathematics,
    Science,
    English,
    History,
    Urdu,
    Islamiat,
    Biology,
    Physics,
    Chemistry,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    // Subjects outside the closed set (legacy rows) collapse here.
    #[serde(other)]
    General,
}

impl Subject {
    pub const ALL: [Subject; 11] = [
        Subject::Mathematics,
        Subject::Science,
        Subject::English,
        Subject::History,
        Subject::Urdu,
        Subject::Islamiat,
        Subject::Biology,
        Subject::Physics,
        Subject::Chemistry,
        Subject::ComputerScience,
        Subject::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Urdu => "Urdu",
            Subject::Islamiat => "Islamiat",
            Subject::Biology => "Biology",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::ComputerScience => "Computer Science",
            Subject::General => "General",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Subject {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownLabel {
                kind: "subject",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TeacherStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
    #[serde(rename = "on leave")]
    OnLeave,
}

impl TeacherStatus {
    pub const ALL: [TeacherStatus; 3] = [
        TeacherStatus::Active,
        TeacherStatus::Inactive,
        TeacherStatus::OnLeave,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeacherStatus::Active => "active",
            TeacherStatus::Inactive => "inactive",
            TeacherStatus::OnLeave => "on leave",
        }
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TeacherStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TeacherStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownLabel {
                kind: "status",
                value: s.to_string(),
            })
    }
}

// Backends are inconsistent about casing ("Active" vs "active").
impl<'de> Deserialize<'de> for TeacherStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn default_classes() -> i64 {
    DEFAULT_CLASSES
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

/// An explicit `null` is treated like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a full timestamp or a bare `YYYY-MM-DD` (midnight UTC).
fn lenient_join_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(instant) = raw.parse::<DateTime<Utc>>() {
        return Ok(Some(instant));
    }
    raw.parse::<NaiveDate>()
        .map(|day| Some(day.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| serde::de::Error::custom(format!("invalid join date: '{raw}'")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    #[serde(alias = "_id")]
    pub id: TeacherId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: Subject,
    #[serde(default = "default_classes")]
    pub classes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_students: i64,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TeacherStatus,
    #[serde(
        default,
        deserialize_with = "lenient_join_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub join_date: Option<DateTime<Utc>>,
}

/// Editable field set of a teacher held by a modal while the user types.
///
/// `Default` and [`TeacherDraft::from_record`] are the only places field
/// defaults are decided; the add and edit flows both go through them.
#[derive(Debug, Clone, PartialEq)]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `None` until a subject from the closed set is picked.
    pub subject: Option<Subject>,
    pub classes: i64,
    pub experience: i64,
    pub total_students: i64,
    pub rating: f64,
    pub schedule: String,
    pub status: TeacherStatus,
    pub join_date: Option<DateTime<Utc>>,
}

impl TeacherDraft {
    pub fn with_join_date(join_date: DateTime<Utc>) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            subject: Some(DEFAULT_SUBJECT),
            classes: DEFAULT_CLASSES,
            experience: DEFAULT_EXPERIENCE,
            total_students: DEFAULT_TOTAL_STUDENTS,
            rating: DEFAULT_RATING,
            schedule: String::new(),
            status: DEFAULT_STATUS,
            join_date: Some(join_date),
        }
    }

    pub fn from_record(record: &TeacherRecord) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            subject: Some(record.subject),
            classes: record.classes,
            experience: record.experience,
            total_students: record.total_students,
            rating: record.rating,
            schedule: record.schedule.clone().unwrap_or_default(),
            status: record.status,
            join_date: Some(record.join_date.unwrap_or_else(|| start_of_day(Utc::now()))),
        }
    }
}

impl Default for TeacherDraft {
    fn default() -> Self {
        Self::with_join_date(start_of_day(Utc::now()))
    }
}

/// Midnight UTC of the day containing `instant`.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
