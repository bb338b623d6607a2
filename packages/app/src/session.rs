//! Login state.
//!
//! The session itself lives in the backend's cookie; this only tracks who
//! the page believes is logged in.

use realty_map_client::{ClientError, RealtyApi};
use realty_map_models::{Credentials, Registration};

use crate::notice::{Notice, ToNotice};

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Wrong email or password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The backend refused the request (e.g. the email is taken).
    #[error("{message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },

    /// Transport or decoding failure.
    #[error(transparent)]
    Client(ClientError),
}

impl From<ClientError> for SessionError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Unauthorized { .. } => Self::InvalidCredentials,
            ClientError::Status { status, message } if (400..500).contains(&status) => {
                Self::Rejected { message }
            }
            other => Self::Client(other),
        }
    }
}

impl ToNotice for SessionError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::InvalidCredentials | Self::Rejected { .. } => {
                Notice::validation(self.to_string())
            }
            Self::Client(_) => Notice::error("An error occurred. Please try again."),
        }
    }
}

/// Who is logged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    /// Display name of the logged-in user.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns `true` while a user is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] if the backend refuses the
    /// registration.
    #[allow(clippy::unused_self)]
    pub async fn register(
        &self,
        api: &dyn RealtyApi,
        registration: &Registration,
    ) -> Result<String, SessionError> {
        let message = api.register(registration).await?;
        log::info!("Registered {}", registration.email);
        Ok(message)
    }

    /// Logs in and remembers the user's name.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredentials`] on a 401.
    pub async fn login(
        &mut self,
        api: &dyn RealtyApi,
        credentials: &Credentials,
    ) -> Result<&str, SessionError> {
        let user = api.login(credentials).await.inspect_err(|e| {
            log::warn!("Login failed for {}: {e}", credentials.email);
        })?;
        log::info!("Logged in as {user}");
        Ok(self.user.insert(user).as_str())
    }

    /// Ends the session. The local state is cleared even if the request
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not be told.
    pub async fn logout(&mut self, api: &dyn RealtyApi) -> Result<String, SessionError> {
        self.user = None;
        Ok(api.logout().await?)
    }

    /// Asks the backend whether the session cookie is still valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the state is left unchanged.
    pub async fn refresh(&mut self, api: &dyn RealtyApi) -> Result<bool, SessionError> {
        let status = api.check_session().await?;
        self.user = if status.logged_in { status.user } else { None };
        Ok(self.is_logged_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::testing::FakeApi;

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "asha@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_remembers_user() {
        let api = FakeApi::new();
        api.add_account("Asha", "asha@example.com", "secret");
        let mut session = Session::default();

        assert_eq!(session.login(&api, &credentials("secret")).await.unwrap(), "Asha");
        assert_eq!(session.user(), Some("Asha"));
        assert!(session.refresh(&api).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let api = FakeApi::new();
        api.add_account("Asha", "asha@example.com", "secret");
        let mut session = Session::default();

        let err = session.login(&api, &credentials("nope")).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(err.to_notice().message, "Invalid email or password");
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn duplicate_registration_reports_server_message() {
        let api = FakeApi::new();
        api.add_account("Asha", "asha@example.com", "secret");
        let session = Session::default();
        let registration = Registration {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "other".to_string(),
        };

        let err = session.register(&api, &registration).await.unwrap_err();

        assert_eq!(err.to_string(), "User already exists");
        assert_eq!(err.to_notice().kind, NoticeKind::Validation);
    }

    #[tokio::test]
    async fn logout_clears_user() {
        let api = FakeApi::new();
        api.add_account("Asha", "asha@example.com", "secret");
        let mut session = Session::default();
        session.login(&api, &credentials("secret")).await.unwrap();

        session.logout(&api).await.unwrap();

        assert!(!session.is_logged_in());
        assert!(!session.refresh(&api).await.unwrap());
    }
}
