//! Loan referral form session with draft persistence.
//!
//! Anonymous visitors may fill the form. On submit they are sent to sign in
//! and the draft is kept, so the form comes back filled when they return to
//! [`LOAN_APPLICATION_PATH`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use validator::Validate;

use super::{ClientError, TradeMartClient};
use crate::models::{LoanApplication, LoanApplicationRequest};

pub const LOAN_APPLICATION_PATH: &str = "/dashboard/loan-application";
pub const SIGN_IN_PATH: &str = "/auth/signin";

const DRAFT_KEY: &str = "loan-application";

/// Sign-in URL that returns to the loan form afterwards
pub fn sign_in_redirect() -> String {
    format!("{}?callbackUrl={}", SIGN_IN_PATH, LOAN_APPLICATION_PATH)
}

/// Where unfinished forms are kept between visits
pub trait DraftStorage: Send + Sync {
    fn save(&self, key: &str, contents: &str) -> Result<(), ClientError>;

    fn load(&self, key: &str) -> Result<Option<String>, ClientError>;

    fn clear(&self, key: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryDraftStorage {
    drafts: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryDraftStorage {
    fn save(&self, key: &str, contents: &str) -> Result<(), ClientError> {
        self.drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self
            .drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn clear(&self, key: &str) -> Result<(), ClientError> {
        self.drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// One JSON file per draft under `dir`
#[derive(Debug, Clone)]
pub struct FileDraftStorage {
    dir: PathBuf,
}

impl FileDraftStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

fn storage_error(err: std::io::Error) -> ClientError {
    ClientError::Storage(err.to_string())
}

impl DraftStorage for FileDraftStorage {
    fn save(&self, key: &str, contents: &str) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir).map_err(storage_error)?;
        std::fs::write(self.path_for(key), contents).map_err(storage_error)
    }

    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(err)),
        }
    }

    fn clear(&self, key: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(storage_error(err)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoanSubmitOutcome {
    Submitted(LoanApplication),
    /// Caller must sign in first; the draft has been saved
    RedirectToSignIn { url: String },
}

pub struct LoanFormSession {
    client: TradeMartClient,
    storage: Arc<dyn DraftStorage>,
    form: LoanApplicationRequest,
}

impl LoanFormSession {
    /// Open the form, restoring a saved draft if there is one.
    /// An unreadable draft is discarded.
    pub fn new(client: TradeMartClient, storage: Arc<dyn DraftStorage>) -> Result<Self, ClientError> {
        let form = match storage.load(DRAFT_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "Discarding unreadable loan draft");
                LoanApplicationRequest::default()
            }),
            None => LoanApplicationRequest::default(),
        };
        Ok(Self {
            client,
            storage,
            form,
        })
    }

    pub fn form(&self) -> &LoanApplicationRequest {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoanApplicationRequest {
        &mut self.form
    }

    pub fn save_draft(&self) -> Result<(), ClientError> {
        let raw = serde_json::to_string(&self.form)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        self.storage.save(DRAFT_KEY, &raw)?;
        debug!("Loan draft saved");
        Ok(())
    }

    fn redirect(&self) -> Result<LoanSubmitOutcome, ClientError> {
        self.save_draft()?;
        Ok(LoanSubmitOutcome::RedirectToSignIn {
            url: sign_in_redirect(),
        })
    }

    /// Submit the form.
    ///
    /// Without a session (or when the server says the session is gone) the
    /// draft is saved and the sign-in redirect is returned instead. Invalid
    /// input fails locally. After a successful submit the draft is cleared.
    pub async fn submit(&mut self) -> Result<LoanSubmitOutcome, ClientError> {
        if !self.client.is_authenticated() {
            return self.redirect();
        }

        self.form
            .validate()
            .map_err(|errors| ClientError::from_validation(&errors))?;

        let key = TradeMartClient::new_idempotency_key();
        match self.client.submit_loan_application(&self.form, &key).await {
            Ok(application) => {
                self.storage.clear(DRAFT_KEY)?;
                self.form = LoanApplicationRequest::default();
                info!(application_id = %application.id, "Loan application submitted");
                Ok(LoanSubmitOutcome::Submitted(application))
            }
            Err(err) if err.requires_sign_in() => self.redirect(),
            Err(err) => Err(err),
        }
    }
}
