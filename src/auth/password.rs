use crate::error::{ApiError, Result};

/// bcrypt hashing, run on the blocking pool so request workers stay free
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("Verification task failed: {}", e)))?
            .map_err(|e| ApiError::Internal(format!("Password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let service = PasswordService::new(4);
        let hash = service.hash_password("correct horse").await.unwrap();

        assert_ne!(hash, "correct horse");
        assert!(service.verify_password("correct horse", &hash).await.unwrap());
        assert!(!service.verify_password("wrong horse", &hash).await.unwrap());
    }
}
