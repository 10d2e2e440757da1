use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::auth::Claims;
use crate::database::MarketplaceStore;
use crate::error::{ApiError, Result};
use crate::models::{UpdateProfileRequest, User};

/// Profile fields shared by every role
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn MarketplaceStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, caller: &Claims) -> Result<User> {
        self.store
            .find_user(caller.sub)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }

    pub async fn update(&self, caller: &Claims, request: UpdateProfileRequest) -> Result<User> {
        request.validate()?;
        if request.is_empty() {
            return Err(ApiError::validation_error("No profile fields provided", None));
        }

        let mut user = self.get(caller).await?;
        request.apply_to(&mut user);
        let saved = self.store.update_user_profile(&user).await?;
        info!(user_id = %saved.id, "Profile updated");
        Ok(saved)
    }
}
