//! Login and logout.

use std::sync::Arc;

use inkpost_api_types::{LoginRequest, LoginResponse, User};
use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::store::AuthStore;

use super::context::AppContext;
use super::error::AppError;

const LOGIN_PATH: &str = "/api/auth/login";

pub struct AuthService {
    api: ApiClient,
    auth: Arc<AuthStore>,
}

impl AuthService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            api: ctx.api().clone(),
            auth: Arc::clone(ctx.auth()),
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Cached reads are dropped whether or not the session could be stored,
    /// so nothing fetched under a previous identity is served afterwards. A
    /// session that cannot be stored is not adopted.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required").into());
        }

        self.auth.set_loading(true);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = match self.api.post(LOGIN_PATH, &request).await {
            Ok(response) => response,
            Err(err) => {
                self.auth.set_loading(false);
                return Err(err.into());
            }
        };

        let user = response.user.clone();
        let stored = self.auth.set_credentials(response.user, response.token);
        self.api.clear_cache();
        if let Err(err) = stored {
            self.auth.set_loading(false);
            return Err(err.into());
        }
        info!(user = %user.id, "logged in");
        Ok(user)
    }

    /// End the session and forget every cached read.
    pub fn logout(&self) -> Result<(), AppError> {
        self.api.clear_cache();
        self.auth.logout()?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.user()
    }
}
