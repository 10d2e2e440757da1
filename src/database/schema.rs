// Postgres enum types shared by the store implementations and the wire models.

pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use utoipa::ToSchema;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
    #[sqlx(type_name = "user_role", rename_all = "lowercase")]
    #[serde(rename_all = "lowercase")]
    pub enum UserRole {
        Buyer,
        Supplier,
        Admin,
    }

    impl UserRole {
        pub fn as_str(&self) -> &'static str {
            match self {
                UserRole::Buyer => "buyer",
                UserRole::Supplier => "supplier",
                UserRole::Admin => "admin",
            }
        }
    }

    impl fmt::Display for UserRole {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl std::str::FromStr for UserRole {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_lowercase().as_str() {
                "buyer" => Ok(UserRole::Buyer),
                "supplier" => Ok(UserRole::Supplier),
                "admin" => Ok(UserRole::Admin),
                _ => Err(format!("Invalid role: {}", s)),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
    #[sqlx(type_name = "rfq_status", rename_all = "lowercase")]
    #[serde(rename_all = "lowercase")]
    pub enum RfqStatus {
        Open,
        Quoted,
        Closed,
    }

    impl fmt::Display for RfqStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                RfqStatus::Open => write!(f, "open"),
                RfqStatus::Quoted => write!(f, "quoted"),
                RfqStatus::Closed => write!(f, "closed"),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
    #[sqlx(type_name = "quote_status", rename_all = "lowercase")]
    #[serde(rename_all = "lowercase")]
    pub enum QuoteStatus {
        Pending,
        Accepted,
        Rejected,
    }

    impl fmt::Display for QuoteStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                QuoteStatus::Pending => write!(f, "pending"),
                QuoteStatus::Accepted => write!(f, "accepted"),
                QuoteStatus::Rejected => write!(f, "rejected"),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
    #[sqlx(type_name = "loan_status", rename_all = "lowercase")]
    #[serde(rename_all = "lowercase")]
    pub enum LoanStatus {
        Submitted,
        Contacted,
        Closed,
    }
}
