//! Authentication service: email login and session resolution.

use chrono::Utc;
use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::role::GlobalRole;
use picito_core::models::user::{CreateUser, UpdateUser, User};
use picito_core::repository::UserRepository;
use picito_core::validation::normalize_email;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::session;
use crate::token::{self, SessionIdentity};

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    /// Signed session token, to be placed in the session cookie.
    pub token: String,
    /// Session lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Log in by email, creating the user record on first sight.
    ///
    /// Addresses listed in `bootstrap_admins` are created with the
    /// global admin role; an existing record keeps its stored role.
    pub async fn login(&self, raw_email: &str) -> PicitoResult<LoginOutput> {
        let email = normalize_email(raw_email)?;
        let user = self.find_or_create(&email).await?;

        let user = self
            .user_repo
            .update(
                user.id,
                UpdateUser {
                    last_login_at: Some(Utc::now()),
                    ..UpdateUser::default()
                },
            )
            .await?;

        let token = token::issue(
            &SessionIdentity {
                email: user.email.clone(),
                role: user.role,
            },
            &self.config,
        )?;

        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutput {
            user,
            token,
            expires_in: self.config.session_lifetime_secs,
        })
    }

    /// Verify a session token and load the identity it names.
    ///
    /// The global role comes from the store, not from the token, so a
    /// role change takes effect on the next request.
    pub async fn authenticate(&self, raw_token: &str) -> PicitoResult<Identity> {
        let claims = token::verify(raw_token, &self.config)?;

        match self.user_repo.get_by_email(&claims.email).await {
            Ok(user) => Ok(Identity::from(&user)),
            Err(PicitoError::NotFound { .. }) => {
                warn!(email = %claims.email, "Session names an unknown user");
                Err(PicitoError::AuthenticationFailed {
                    reason: "session user no longer exists".into(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve the caller from a `Cookie` header.
    ///
    /// `Ok(None)` means no session was presented; a session that is
    /// present but invalid is an error.
    pub async fn resolve(&self, cookie_header: Option<&str>) -> PicitoResult<Option<Identity>> {
        match session::token_from_cookies(cookie_header, &self.config.cookie_name) {
            Some(raw) => self.authenticate(raw).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_or_create(&self, email: &str) -> PicitoResult<User> {
        match self.user_repo.get_by_email(email).await {
            Ok(user) => return Ok(user),
            Err(PicitoError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let role = if self.is_bootstrap_admin(email) {
            GlobalRole::Admin
        } else {
            GlobalRole::User
        };

        match self
            .user_repo
            .create(CreateUser {
                email: email.to_string(),
                role,
            })
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "Created user on first login");
                Ok(user)
            }
            // A concurrent first login created the record.
            Err(PicitoError::AlreadyExists { .. }) => self.user_repo.get_by_email(email).await,
            Err(e) => Err(e),
        }
    }

    fn is_bootstrap_admin(&self, email: &str) -> bool {
        self.config
            .bootstrap_admins
            .iter()
            .any(|admin| admin.trim().eq_ignore_ascii_case(email))
    }
}
