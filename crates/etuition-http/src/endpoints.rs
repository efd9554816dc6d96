//! Backend route paths.
//!
//! Path parameters are percent-encoded; query builders skip empty values.

use etuition_core::Email;

// ============================================================================
// Fixed Paths
// ============================================================================

pub const USERS: &str = "/users";

pub const TUITIONS: &str = "/tuitions";

/// Tuitions posted by the signed-in student.
pub const MY_TUITIONS: &str = "/tuitions/student/my-tuitions";

pub const APPLICATIONS: &str = "/applications";

pub const PAYMENTS: &str = "/payments";

/// Creates a checkout intent for the external payment widget.
pub const CREATE_PAYMENT_INTENT: &str = "/create-payment-intent";

pub const ADMIN_STATS: &str = "/admin-stats";

pub const TUTORS: &str = "/tutors";

// ============================================================================
// Parameterized Paths
// ============================================================================

fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

/// `/users/{email}`: the user record, including its role.
pub fn user(email: &Email) -> String {
    format!("{USERS}/{}", segment(email.as_str()))
}

/// `/users/{id}` for updates and deletes by record id.
pub fn user_by_id(id: &str) -> String {
    format!("{USERS}/{}", segment(id))
}

pub fn admin_user(id: &str) -> String {
    format!("{USERS}/admin/{}", segment(id))
}

pub fn tuition(id: &str) -> String {
    format!("{TUITIONS}/{}", segment(id))
}

pub fn tuition_status(id: &str) -> String {
    format!("{TUITIONS}/status/{}", segment(id))
}

/// Admin listing of every tuition, optionally filtered by status.
pub fn all_tuitions(status: Option<&str>) -> String {
    with_query(
        &format!("{TUITIONS}/all/all"),
        &[("status", status.unwrap_or("all"))],
    )
}

pub fn application(id: &str) -> String {
    format!("{APPLICATIONS}/{}", segment(id))
}

pub fn application_status(id: &str) -> String {
    format!("{APPLICATIONS}/status/{}", segment(id))
}

pub fn my_applications(email: &Email) -> String {
    format!("{APPLICATIONS}/my-applications/{}", segment(email.as_str()))
}

pub fn applications_for_tuition(tuition_id: &str) -> String {
    format!("{APPLICATIONS}/for-my-tuition/{}", segment(tuition_id))
}

pub fn my_payments(email: &Email) -> String {
    format!("{PAYMENTS}/my-payments/{}", segment(email.as_str()))
}

pub fn tutor_payments(email: &Email) -> String {
    format!("{PAYMENTS}/tutor/{}", segment(email.as_str()))
}

pub fn tutor(id: &str) -> String {
    format!("{TUTORS}/{}", segment(id))
}

/// Append `pairs` as a query string, leaving out empty values.
pub fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}
