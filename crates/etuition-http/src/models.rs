//! Request and response bodies of the marketplace backend.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use etuition_core::error::InvalidInputError;
use etuition_core::{Email, Error, Role};

// ============================================================================
// Statuses
// ============================================================================

/// Moderation state of a tuition post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuitionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// A tutor was hired and paid.
    Booked,
}

impl TuitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuitionStatus::Pending => "pending",
            TuitionStatus::Approved => "approved",
            TuitionStatus::Rejected => "rejected",
            TuitionStatus::Booked => "booked",
        }
    }
}

impl FromStr for TuitionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TuitionStatus::Pending),
            "approved" => Ok(TuitionStatus::Approved),
            "rejected" => Ok(TuitionStatus::Rejected),
            "booked" => Ok(TuitionStatus::Booked),
            other => Err(unknown_status(other)),
        }
    }
}

/// State of a tutor's application to a tuition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(unknown_status(other)),
        }
    }
}

fn unknown_status(value: &str) -> Error {
    InvalidInputError::Other {
        message: format!("unknown status '{value}'"),
    }
    .into()
}

// ============================================================================
// Users
// ============================================================================

/// A user record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Registration payload saved after the identity provider created the account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

/// Partial profile update; `None` fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Only honoured on the admin route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Public tutor profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters for the tutor directory.
#[derive(Debug, Clone, Default)]
pub struct TutorQuery {
    pub search: Option<String>,
    pub subject: Option<String>,
    pub min_rating: Option<f32>,
    pub experience: Option<String>,
}

impl TutorQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "search", self.search.clone());
        push(&mut pairs, "subject", self.subject.clone());
        push(&mut pairs, "minRating", self.min_rating.map(|r| r.to_string()));
        push(&mut pairs, "experience", self.experience.clone());
        pairs
    }
}

// ============================================================================
// Tuitions
// ============================================================================

/// A tuition request posted by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuition {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub class_grade: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub status: TuitionStatus,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The fields a student fills in when posting or editing a tuition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitionDetails {
    pub title: String,
    pub subject: String,
    pub class_grade: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub salary: f64,
}

/// Body of `POST /tuitions`: the details plus who posted them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TuitionSubmission<'a> {
    #[serde(flatten)]
    pub details: &'a TuitionDetails,
    pub student_name: &'a str,
    pub student_email: &'a Email,
    pub status: TuitionStatus,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /tuitions/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TuitionEdit<'a> {
    #[serde(flatten)]
    pub details: &'a TuitionDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TuitionStatus>,
}

/// Body of the status-change routes.
#[derive(Debug, Serialize)]
pub(crate) struct StatusChange<S> {
    pub status: S,
}

/// One page of the public tuition listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitionPage {
    #[serde(default)]
    pub tuitions: Vec<Tuition>,
    #[serde(default = "one")]
    pub total_pages: u32,
}

fn one() -> u32 {
    1
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters and paging for the public tuition listing.
#[derive(Debug, Clone)]
pub struct TuitionQuery {
    pub page: u32,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: String,
    pub sort_order: SortOrder,
    pub class_grade: Option<String>,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

impl Default for TuitionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: None,
            search: None,
            sort: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            class_grade: None,
            subject: None,
            location: None,
            min_salary: None,
            max_salary: None,
        }
    }
}

impl TuitionQuery {
    /// The newest `limit` tuitions, as shown on the landing page.
    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        push(&mut pairs, "limit", self.limit.map(|l| l.to_string()));
        push(&mut pairs, "search", self.search.clone());
        pairs.push(("sort", self.sort.clone()));
        pairs.push(("sortOrder", self.sort_order.as_str().to_string()));
        push(&mut pairs, "class", self.class_grade.clone());
        push(&mut pairs, "subject", self.subject.clone());
        push(&mut pairs, "location", self.location.clone());
        push(&mut pairs, "minSalary", self.min_salary.map(|s| s.to_string()));
        push(&mut pairs, "maxSalary", self.max_salary.map(|s| s.to_string()));
        pairs
    }
}

fn push(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        pairs.push((key, value));
    }
}

// ============================================================================
// Applications
// ============================================================================

/// A tutor's application to a tuition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuition_id: String,
    #[serde(default)]
    pub tutor_email: Option<String>,
    #[serde(default)]
    pub tutor_name: Option<String>,
    #[serde(default)]
    pub tutor_photo: Option<String>,
    #[serde(default)]
    pub expected_salary: f64,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Joined tuition document, when the route includes it.
    #[serde(default)]
    pub tuition_details: Option<serde_json::Value>,
}

/// What a tutor fills in when applying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub tuition_id: String,
    pub expected_salary: f64,
    pub qualifications: String,
    pub experience: String,
    /// Owner of the tuition, so the student can list applicants.
    pub student_email: String,
}

/// Body of `POST /applications`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplicationSubmission<'a> {
    #[serde(flatten)]
    pub details: &'a ApplicationDetails,
    pub tutor_email: &'a Email,
    pub tutor_name: &'a str,
}

// ============================================================================
// Payments
// ============================================================================

/// Client secret handed to the external checkout widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentIntentRequest {
    pub salary: f64,
}

/// A completed checkout to be recorded by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub tutor_email: String,
    pub tutor_name: String,
    pub tuition_id: String,
    pub application_id: String,
    pub amount: f64,
    /// Transaction id reported by the checkout widget.
    pub transaction_id: String,
}

/// Body of `POST /payments`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentSubmission<'a> {
    #[serde(flatten)]
    pub details: &'a PaymentDetails,
    pub student_email: &'a Email,
    pub student_name: &'a str,
    pub date: DateTime<Utc>,
    pub status: &'static str,
}

/// A recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub tutor_email: Option<String>,
    #[serde(default)]
    pub tutor_name: Option<String>,
    #[serde(default)]
    pub tuition_id: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `POST /payments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    #[serde(default)]
    pub payment_result: Option<WriteAck>,
}

// ============================================================================
// Admin and acknowledgements
// ============================================================================

/// Dashboard totals for admins.
///
/// Totals come from aggregation pipelines that may yield `null`, floats or
/// numeric strings; anything non-numeric counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub users: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tuitions: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub orders: u64,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()).unwrap_or(0.0))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = lenient_f64(deserializer)?;
    Ok(if n > 0.0 { n as u64 } else { 0 })
}

/// Write acknowledgement returned by mutating routes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    #[serde(default)]
    pub acknowledged: Option<bool>,
    #[serde(default)]
    pub inserted_id: Option<String>,
    #[serde(default)]
    pub modified_count: Option<u64>,
    #[serde(default)]
    pub deleted_count: Option<u64>,
}
