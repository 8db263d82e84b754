//! Core types for student-report

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::Error;

/// Identifier of a student record, always a positive integer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(u64);

impl StudentId {
    /// Create a StudentId, rejecting zero
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StudentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(StudentId::new)
            .ok_or_else(|| Error::Validation(format!("'{s}' is not a positive integer")))
    }
}

/// Student record as returned by the upstream `/students/{id}` endpoint
///
/// Decoding requires a JSON object. Inside it, text fields tolerate absent
/// values, `null`, and non-string scalars so that a sparse upstream record
/// still renders (missing fields print as empty).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "serde_json::Map<String, serde_json::Value>"
)]
pub struct StudentDetail {
    /// Upstream record id
    pub id: u64,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Whether the student may log in to the school system
    pub system_access: bool,
    /// Contact phone
    pub phone: String,
    /// Gender as recorded upstream
    pub gender: String,
    /// Date of birth, preformatted by upstream
    pub dob: String,
    /// Class name
    pub class: String,
    /// Section within the class
    pub section: String,
    /// Roll number
    pub roll: String,
    /// Father's name
    pub father_name: String,
    /// Father's phone
    pub father_phone: String,
    /// Mother's name
    pub mother_name: String,
    /// Mother's phone
    pub mother_phone: String,
    /// Guardian's name
    pub guardian_name: String,
    /// Guardian's phone
    pub guardian_phone: String,
    /// Guardian's relation to the student
    pub relation_of_guardian: String,
    /// Current address
    pub current_address: String,
    /// Permanent address
    pub permanent_address: String,
    /// Admission date, preformatted by upstream
    pub admission_date: String,
    /// Name of the staff member the report is attributed to
    pub reporter_name: String,
}

/// Body of the upstream login request
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Admin email
    pub username: &'a str,
    /// Admin password
    pub password: &'a str,
}

/// Body of a successful upstream login response
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token echoed in the body (the cookie is authoritative)
    #[serde(default)]
    pub access_token: Option<String>,
    /// Authenticated principal
    #[serde(default)]
    pub user: LoginUser,
}

/// Identity of the principal the upstream authenticated
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginUser {
    /// Upstream user id
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Upstream role, logged only
    #[serde(default)]
    pub role: String,
}

/// Health check response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

impl TryFrom<Map<String, Value>> for StudentDetail {
    type Error = String;

    fn try_from(record: Map<String, Value>) -> Result<Self, Self::Error> {
        let text = |key: &str| lenient_text(record.get(key));

        Ok(Self {
            id: lenient_id(record.get("id"))?,
            name: text("name"),
            email: text("email"),
            system_access: matches!(record.get("systemAccess"), Some(Value::Bool(true))),
            phone: text("phone"),
            gender: text("gender"),
            dob: text("dob"),
            class: text("class"),
            section: text("section"),
            roll: text("roll"),
            father_name: text("fatherName"),
            father_phone: text("fatherPhone"),
            mother_name: text("motherName"),
            mother_phone: text("motherPhone"),
            guardian_name: text("guardianName"),
            guardian_phone: text("guardianPhone"),
            relation_of_guardian: text("relationOfGuardian"),
            current_address: text("currentAddress"),
            permanent_address: text("permanentAddress"),
            admission_date: text("admissionDate"),
            reporter_name: text("reporterName"),
        })
    }
}

fn lenient_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn lenient_id(value: Option<&Value>) -> Result<u64, String> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| format!("id {n} is not a positive integer")),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| format!("id '{s}' is not a positive integer")),
        Some(other) => Err(format!("unexpected id value {other}")),
    }
}
