//! Reaction to a rejected credential.

/// Invoked synchronously when the backend answers 401 or 403.
///
/// Runs before the error reaches the caller, so the session is already
/// cleared when the caller sees the failure. Must tolerate being called
/// several times for the same rejection (concurrent requests).
pub trait AuthRejectionHandler: Send + Sync {
    /// Called with the rejecting status code.
    fn on_auth_rejected(&self, status: u16);
}

impl<F> AuthRejectionHandler for F
where
    F: Fn(u16) + Send + Sync,
{
    fn on_auth_rejected(&self, status: u16) {
        self(status)
    }
}
