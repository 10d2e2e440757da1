use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::schema::types::UserRole;
use crate::error::{ApiError, ErrorCode, Result};

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use jwt::JwtService;
pub use middleware::{AuthenticatedUser, MaybeUser};
pub use password::PasswordService;
pub use roles::Permission;

/// Issuer written into every token
pub const TOKEN_ISSUER: &str = "trademart-api";

/// User claims for JWT tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: Uuid,        // Subject (user ID)
    pub email: String,
    pub role: UserRole,
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
    pub iss: String,      // Issuer
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: UserRole, ttl_secs: i64) -> Self {
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(ttl_secs);

        Self {
            sub: user_id,
            email,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn can(&self, permission: &str) -> bool {
        self.role.has_permission(&Permission::from(permission))
    }

    /// Reject with `ROLE_NOT_AUTHORIZED` unless the role grants `permission`.
    /// `action` is the human wording placed in the error details.
    pub fn authorize(&self, permission: &str, action: &str) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(ApiError::role_not_authorized(action))
        }
    }

    /// Reject with `INSUFFICIENT_PERMISSIONS` unless the role grants `permission`
    pub fn require_permission(&self, permission: &str) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(ApiError::with_details(
                ErrorCode::InsufficientPermissions,
                ErrorCode::InsufficientPermissions.message(),
                permission,
            ))
        }
    }
}
