pub mod dashboard;
pub mod loan;
pub mod product;
pub mod quote;
pub mod rfq;
pub mod supplier;
pub mod user;

pub use dashboard::{DashboardData, DashboardItem, DashboardStats, DashboardView, ItemKind};
pub use loan::{LoanApplication, LoanApplicationRequest};
pub use product::{
    CreateProductRequest, Product, ProductFilter, ProductRow, ProductStats, UpdateProductRequest,
};
pub use quote::{CreateQuoteRequest, DecideQuoteRequest, Quote, QuoteStats};
pub use rfq::{CreateRfqRequest, Rfq, RfqFilter, RfqStats, UpdateRfqStatusRequest};
pub use supplier::{Supplier, SupplierFilter, UpsertSupplierRequest, VerifySupplierRequest};
pub use user::{
    AuthResponse, NewUser, SigninRequest, SignupRequest, UpdateProfileRequest, User,
    UserCredentials,
};
