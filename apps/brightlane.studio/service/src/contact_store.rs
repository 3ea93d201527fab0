//! JSON-file-backed store for contact form submissions.
//!
//! All submissions live behind one `RwLock`; every successful mutation
//! snapshots the state and rewrites the backing file through a temp path.
//! Without a configured path the store is memory-only, which is what the
//! tests use.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;

pub const NAME_MAX_CHARS: usize = 100;
pub const COMPANY_MAX_CHARS: usize = 100;
pub const MESSAGE_MAX_CHARS: usize = 1000;
pub const DUPLICATE_WINDOW_MINUTES: i64 = 5;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, email, and message are required fields.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const NAME_TOO_LONG_MESSAGE: &str = "Name must be less than 100 characters.";
pub const MESSAGE_TOO_LONG_MESSAGE: &str = "Message must be less than 1000 characters.";
pub const COMPANY_TOO_LONG_MESSAGE: &str = "Company name must be less than 100 characters.";

#[derive(Debug, Error)]
pub enum ContactStoreError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("duplicate submission from {email} within the cooldown window")]
    Duplicate { email: String },
    #[error("{message}")]
    Persistence { message: String },
}

/// One stored submission. `ip_address` and `user_agent` are request metadata
/// kept for abuse review and never returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
}

/// Listing projection of [`ContactRecord`] without the request metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&ContactRecord> for ContactListEntry {
    fn from(record: &ContactRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            company: record.company.clone(),
            message: record.message.clone(),
            submitted_at: record.submitted_at,
        }
    }
}

/// Trimmed, unvalidated submission input. Validation happens in
/// [`ContactStore::insert_submission`] so every write path shares it.
#[derive(Debug, Clone)]
pub struct CreateContactInput {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ContactStoreState {
    contacts: Vec<ContactRecord>,
}

#[derive(Debug, Clone)]
pub struct ContactStore {
    state: Arc<RwLock<ContactStoreState>>,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ContactPage {
    pub entries: Vec<ContactListEntry>,
    pub total: usize,
}

impl ContactStore {
    pub fn from_config(config: &Config) -> Self {
        let path = config.store_path.clone();
        let state = Self::load_state(path.as_ref());
        Self {
            state: Arc::new(RwLock::new(state)),
            path,
        }
    }

    fn load_state(path: Option<&PathBuf>) -> ContactStoreState {
        let Some(path) = path else {
            return ContactStoreState::default();
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(value) => value,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return ContactStoreState::default();
            }
            Err(error) => {
                tracing::warn!(
                    target: "brightlane.contact_store",
                    path = %path.display(),
                    error = %error,
                    "failed to read contact store; booting with empty state",
                );
                return ContactStoreState::default();
            }
        };

        match serde_json::from_str::<ContactStoreState>(&raw) {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!(
                    target: "brightlane.contact_store",
                    path = %path.display(),
                    error = %error,
                    "failed to parse contact store; booting with empty state",
                );
                ContactStoreState::default()
            }
        }
    }

    async fn persist_state(&self, snapshot: &ContactStoreState) -> Result<(), ContactStoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                ContactStoreError::Persistence {
                    message: format!("failed to prepare contact store directory: {error}"),
                }
            })?;
        }

        let payload =
            serde_json::to_vec(snapshot).map_err(|error| ContactStoreError::Persistence {
                message: format!("failed to encode contact store payload: {error}"),
            })?;

        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|error| ContactStoreError::Persistence {
                message: format!("failed to write contact store payload: {error}"),
            })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|error| {
            ContactStoreError::Persistence {
                message: format!("failed to finalize contact store payload: {error}"),
            }
        })?;

        Ok(())
    }

    /// Validates and stores one submission. The duplicate check and the
    /// insert run under the same write lock so two racing submissions from
    /// one address cannot both land inside the window.
    pub async fn insert_submission(
        &self,
        input: CreateContactInput,
    ) -> Result<ContactRecord, ContactStoreError> {
        let record = build_record(input)?;

        let snapshot = {
            let mut state = self.state.write().await;
            let window_start =
                record.submitted_at - Duration::minutes(DUPLICATE_WINDOW_MINUTES);
            if state.contacts.iter().any(|existing| {
                existing.email == record.email && existing.submitted_at > window_start
            }) {
                return Err(ContactStoreError::Duplicate {
                    email: record.email,
                });
            }
            state.contacts.push(record.clone());
            state.clone()
        };

        self.persist_state(&snapshot).await?;
        Ok(record)
    }

    /// Whether `email` already submitted within the duplicate window.
    pub async fn has_recent_submission(&self, email: &str, now: DateTime<Utc>) -> bool {
        let window_start = now - Duration::minutes(DUPLICATE_WINDOW_MINUTES);
        let state = self.state.read().await;
        state
            .contacts
            .iter()
            .any(|record| record.email == email && record.submitted_at > window_start)
    }

    /// One page of submissions, newest first. `page` is 1-based.
    pub async fn list_page(&self, page: usize, limit: usize) -> ContactPage {
        let state = self.state.read().await;
        let mut entries: Vec<&ContactRecord> = state.contacts.iter().collect();
        entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        let skip = page.saturating_sub(1).saturating_mul(limit);
        ContactPage {
            entries: entries
                .into_iter()
                .skip(skip)
                .take(limit)
                .map(ContactListEntry::from)
                .collect(),
            total: state.contacts.len(),
        }
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.contacts.len()
    }

    #[cfg(test)]
    pub async fn seed_record(&self, record: ContactRecord) {
        self.state.write().await.contacts.push(record);
    }
}

fn build_record(input: CreateContactInput) -> Result<ContactRecord, ContactStoreError> {
    let name = input.name.trim().to_string();
    let email = input.email.trim().to_lowercase();
    let company = input.company.trim().to_string();
    let message = input.message.trim().to_string();

    if name.is_empty() {
        return Err(ContactStoreError::Validation {
            field: "name",
            message: REQUIRED_FIELDS_MESSAGE,
        });
    }
    if email.is_empty() {
        return Err(ContactStoreError::Validation {
            field: "email",
            message: REQUIRED_FIELDS_MESSAGE,
        });
    }
    if message.is_empty() {
        return Err(ContactStoreError::Validation {
            field: "message",
            message: REQUIRED_FIELDS_MESSAGE,
        });
    }
    if !is_valid_email(&email) {
        return Err(ContactStoreError::Validation {
            field: "email",
            message: INVALID_EMAIL_MESSAGE,
        });
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(ContactStoreError::Validation {
            field: "name",
            message: NAME_TOO_LONG_MESSAGE,
        });
    }
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return Err(ContactStoreError::Validation {
            field: "message",
            message: MESSAGE_TOO_LONG_MESSAGE,
        });
    }
    if company.chars().count() > COMPANY_MAX_CHARS {
        return Err(ContactStoreError::Validation {
            field: "company",
            message: COMPANY_TOO_LONG_MESSAGE,
        });
    }

    Ok(ContactRecord {
        id: format!("ct_{}", Uuid::new_v4().simple()),
        name,
        email,
        company,
        message,
        submitted_at: Utc::now(),
        ip_address: input.ip_address,
        user_agent: input.user_agent,
    })
}

/// Same shape the browser-side validator accepts: one `@`, a non-empty
/// local part, and some dot in the domain with text on both sides. Dots
/// count as domain text, so a trailing dot after a full domain passes.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let domain = domain.as_bytes();
    domain.len() >= 3 && domain[1..domain.len() - 1].contains(&b'.')
}
