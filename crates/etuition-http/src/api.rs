//! Typed marketplace API.
//!
//! Thin wrappers that pair each backend route with its request and response
//! types. Everything except registration and the public listings goes through
//! the [`AuthenticatedClient`], so a rejected credential logs the session out
//! no matter which call noticed it.

use chrono::Utc;
use tracing::{info, instrument};

use etuition_core::error::InvalidInputError;
use etuition_core::{Email, Result, UserIdentity};

use crate::client::{AuthenticatedClient, PublicClient};
use crate::endpoints;
use crate::models::{
    AdminStats, Application, ApplicationDetails, ApplicationStatus, ApplicationSubmission,
    NewUser, Payment, PaymentDetails, PaymentIntent, PaymentIntentRequest, PaymentReceipt,
    PaymentSubmission, StatusChange, Tuition, TuitionDetails, TuitionEdit, TuitionPage,
    TuitionQuery, TuitionStatus, TuitionSubmission, Tutor, TutorQuery, UserRecord, UserUpdate,
    WriteAck,
};

/// Marketplace operations on behalf of the session's user.
#[derive(Debug, Clone)]
pub struct MarketplaceApi {
    client: AuthenticatedClient,
    public: PublicClient,
}

impl MarketplaceApi {
    pub fn new(client: AuthenticatedClient) -> Self {
        let public = client.public();
        Self { client, public }
    }

    /// The underlying authenticated client.
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Identity of the signed-in user, for routes that stamp it into the body.
    fn signed_in(&self) -> Result<UserIdentity> {
        self.client
            .session()
            .snapshot()
            .identity()
            .cloned()
            .ok_or_else(|| {
                InvalidInputError::Other {
                    message: "no user is signed in".to_string(),
                }
                .into()
            })
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Save a freshly created account. Public: no credential exists yet.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register_user(&self, user: &NewUser) -> Result<WriteAck> {
        let ack: WriteAck = self.public.post(endpoints::USERS, user).await?;
        info!(role = %user.role, "Registered user");
        Ok(ack)
    }

    /// The user record for `email`, or `None` if the backend has none.
    pub async fn user(&self, email: &Email) -> Result<Option<UserRecord>> {
        self.client.get(&endpoints::user(email)).await
    }

    /// Admin user listing, optionally filtered by name or email.
    pub async fn users(&self, search: Option<&str>) -> Result<Vec<UserRecord>> {
        let path = endpoints::with_query(endpoints::USERS, &[("search", search.unwrap_or(""))]);
        self.client.get(&path).await
    }

    /// Update the signed-in user's own profile.
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<WriteAck> {
        let own = UserUpdate {
            role: None,
            ..update.clone()
        };
        self.client.patch(&endpoints::user_by_id(id), &own).await
    }

    /// Admin edit of any user, including the role.
    pub async fn admin_update_user(&self, id: &str, update: &UserUpdate) -> Result<WriteAck> {
        self.client.patch(&endpoints::admin_user(id), update).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<WriteAck> {
        self.client.delete(&endpoints::user_by_id(id)).await
    }

    // ========================================================================
    // Tuitions
    // ========================================================================

    /// One page of approved tuitions. Public.
    pub async fn tuitions(&self, query: &TuitionQuery) -> Result<TuitionPage> {
        let pairs = query.pairs();
        let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.public
            .get(&endpoints::with_query(endpoints::TUITIONS, &pairs))
            .await
    }

    pub async fn tuition(&self, id: &str) -> Result<Tuition> {
        self.client.get(&endpoints::tuition(id)).await
    }

    /// Every tuition regardless of status, for moderation.
    pub async fn all_tuitions(&self, status: Option<TuitionStatus>) -> Result<Vec<Tuition>> {
        self.client
            .get(&endpoints::all_tuitions(status.as_ref().map(TuitionStatus::as_str)))
            .await
    }

    pub async fn my_tuitions(&self) -> Result<Vec<Tuition>> {
        self.client.get(endpoints::MY_TUITIONS).await
    }

    /// Post a tuition as the signed-in student. New posts await moderation.
    #[instrument(skip(self, details), fields(subject = %details.subject))]
    pub async fn post_tuition(&self, details: &TuitionDetails) -> Result<WriteAck> {
        let student = self.signed_in()?;
        let body = TuitionSubmission {
            details,
            student_name: &student.display_name,
            student_email: &student.email,
            status: TuitionStatus::Pending,
            is_booked: false,
            created_at: Utc::now(),
        };
        self.client.post(endpoints::TUITIONS, &body).await
    }

    /// Edit a tuition. Edits send the post back to moderation.
    pub async fn update_tuition(&self, id: &str, details: &TuitionDetails) -> Result<WriteAck> {
        let body = TuitionEdit {
            details,
            status: Some(TuitionStatus::Pending),
        };
        self.client.put(&endpoints::tuition(id), &body).await
    }

    pub async fn set_tuition_status(&self, id: &str, status: TuitionStatus) -> Result<WriteAck> {
        self.client
            .patch(&endpoints::tuition_status(id), &StatusChange { status })
            .await
    }

    pub async fn delete_tuition(&self, id: &str) -> Result<WriteAck> {
        self.client.delete(&endpoints::tuition(id)).await
    }

    // ========================================================================
    // Applications
    // ========================================================================

    /// Apply to a tuition as the signed-in tutor.
    #[instrument(skip(self, details), fields(tuition = %details.tuition_id))]
    pub async fn apply(&self, details: &ApplicationDetails) -> Result<WriteAck> {
        let tutor = self.signed_in()?;
        let body = ApplicationSubmission {
            details,
            tutor_email: &tutor.email,
            tutor_name: &tutor.display_name,
        };
        self.client.post(endpoints::APPLICATIONS, &body).await
    }

    pub async fn my_applications(&self, email: &Email) -> Result<Vec<Application>> {
        self.client.get(&endpoints::my_applications(email)).await
    }

    pub async fn applications_for_tuition(&self, tuition_id: &str) -> Result<Vec<Application>> {
        self.client
            .get(&endpoints::applications_for_tuition(tuition_id))
            .await
    }

    pub async fn set_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<WriteAck> {
        self.client
            .patch(&endpoints::application_status(id), &StatusChange { status })
            .await
    }

    pub async fn delete_application(&self, id: &str) -> Result<WriteAck> {
        self.client.delete(&endpoints::application(id)).await
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Open a checkout for `salary`; the secret goes to the payment widget.
    pub async fn create_payment_intent(&self, salary: f64) -> Result<PaymentIntent> {
        self.client
            .post(
                endpoints::CREATE_PAYMENT_INTENT,
                &PaymentIntentRequest { salary },
            )
            .await
    }

    /// Record a completed checkout paid by the signed-in student.
    #[instrument(skip(self, details), fields(application = %details.application_id))]
    pub async fn record_payment(&self, details: &PaymentDetails) -> Result<PaymentReceipt> {
        let student = self.signed_in()?;
        let body = PaymentSubmission {
            details,
            student_email: &student.email,
            student_name: &student.display_name,
            date: Utc::now(),
            status: "success",
        };
        let receipt: PaymentReceipt = self.client.post(endpoints::PAYMENTS, &body).await?;
        info!(amount = details.amount, "Payment recorded");
        Ok(receipt)
    }

    pub async fn my_payments(&self, email: &Email) -> Result<Vec<Payment>> {
        self.client.get(&endpoints::my_payments(email)).await
    }

    pub async fn tutor_payments(&self, email: &Email) -> Result<Vec<Payment>> {
        self.client.get(&endpoints::tutor_payments(email)).await
    }

    // ========================================================================
    // Admin and tutors
    // ========================================================================

    pub async fn admin_stats(&self) -> Result<AdminStats> {
        self.client.get(endpoints::ADMIN_STATS).await
    }

    /// Tutor directory. Public.
    pub async fn tutors(&self, query: &TutorQuery) -> Result<Vec<Tutor>> {
        let pairs = query.pairs();
        let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.public
            .get(&endpoints::with_query(endpoints::TUTORS, &pairs))
            .await
    }

    /// Single tutor profile. Public.
    pub async fn tutor(&self, id: &str) -> Result<Tutor> {
        self.public.get(&endpoints::tutor(id)).await
    }
}
