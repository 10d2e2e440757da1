use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::auth::{JwtService, PasswordService};
use crate::database::schema::types::UserRole;
use crate::database::MarketplaceStore;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::{AuthResponse, NewUser, SigninRequest, SignupRequest, User};

/// Account creation and token issuing
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn MarketplaceStore>,
    jwt: JwtService,
    passwords: PasswordService,
}

impl AuthService {
    pub fn new(store: Arc<dyn MarketplaceStore>, jwt: JwtService, passwords: PasswordService) -> Self {
        Self {
            store,
            jwt,
            passwords,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse> {
        request.validate()?;

        // Admin accounts are provisioned out of band
        if request.role == UserRole::Admin {
            return Err(ApiError::role_not_authorized("sign up as admin"));
        }

        let password_hash = self.passwords.hash_password(&request.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                email: request.email.trim().to_lowercase(),
                password_hash,
                role: request.role,
                name: request.name.trim().to_string(),
                phone: request.phone.map(|p| p.trim().to_string()),
                company: request.company.map(|c| c.trim().to_string()),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "New account created");
        metrics::counter!("auth_attempts_total", "result" => "signup").increment(1);
        self.issue(user)
    }

    pub async fn signin(&self, request: SigninRequest) -> Result<AuthResponse> {
        request.validate()?;

        let Some(credentials) = self
            .store
            .find_credentials_by_email(request.email.trim())
            .await?
        else {
            metrics::counter!("auth_attempts_total", "result" => "failure").increment(1);
            return Err(ApiError::code(ErrorCode::InvalidCredentials));
        };

        if !self
            .passwords
            .verify_password(&request.password, &credentials.password_hash)
            .await?
        {
            warn!(user_id = %credentials.id, "Failed sign-in attempt");
            metrics::counter!("auth_attempts_total", "result" => "failure").increment(1);
            return Err(ApiError::code(ErrorCode::InvalidCredentials));
        }

        let user = self
            .store
            .find_user(credentials.id)
            .await?
            .ok_or_else(|| ApiError::code(ErrorCode::InvalidCredentials))?;

        metrics::counter!("auth_attempts_total", "result" => "success").increment(1);
        self.issue(user)
    }

    fn issue(&self, user: User) -> Result<AuthResponse> {
        let token = self.jwt.issue(user.id, &user.email, user.role)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiration_secs(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    fn service() -> AuthService {
        AuthService::new(
            test_support::store(),
            JwtService::new("test-secret-that-is-long-enough-for-hs256", 3600),
            PasswordService::new(4),
        )
    }

    fn signup_request(email: &str, role: UserRole) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "s3cret-pass".to_string(),
            name: "Meera Shah".to_string(),
            role,
            phone: None,
            company: Some("Shah Exports".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_then_signin() {
        let service = service();
        let created = service
            .signup(signup_request("Meera@Example.com", UserRole::Supplier))
            .await
            .unwrap();
        assert_eq!(created.user.email, "meera@example.com");
        assert_eq!(created.user.role, UserRole::Supplier);

        let signed_in = service
            .signin(SigninRequest {
                email: "meera@example.com".to_string(),
                password: "s3cret-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.user.id, created.user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let service = service();
        service
            .signup(signup_request("b@example.com", UserRole::Buyer))
            .await
            .unwrap();

        let err = service
            .signin(SigninRequest {
                email: "b@example.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_admin_signup_refused() {
        let err = service()
            .signup(signup_request("root@example.com", UserRole::Admin))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::RoleNotAuthorized);
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let service = service();
        service
            .signup(signup_request("dup@example.com", UserRole::Buyer))
            .await
            .unwrap();
        let err = service
            .signup(signup_request("dup@example.com", UserRole::Buyer))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::AlreadyExists);
    }
}
