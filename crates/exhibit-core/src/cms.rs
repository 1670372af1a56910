//! CMS session flow, independent of the DOM and of the HTTP client.
//!
//! [`CmsController`] drives a [`CmsBackend`] (the remote API) and a
//! [`CmsView`] (the editor page). All failures end up as messages on the
//! view; nothing here is fatal to the page.

use crate::diagnostics::{check_json, JsonDiagnostic};
use crate::entries::{EntryCollection, EntryError, ModelEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use thiserror::Error;

pub const SAVE_OK: &str = "Data saved successfully!";
pub const SYNC_OK: &str = "Data synced from server!";
pub const FIX_JSON_FIRST: &str = "Please fix JSON errors first";
pub const SAVE_FAILED: &str = "Save failed";
pub const LOAD_FAILED: &str = "Failed to load data";
pub const SYNC_FAILED: &str = "Failed to sync data";

#[derive(Debug, Error, PartialEq)]
pub enum CmsError {
    #[error("invalid password")]
    Unauthorized,
    #[error("not logged in")]
    NoSession,
    #[error("{0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },
    #[error(transparent)]
    InvalidJson(#[from] JsonDiagnostic),
    #[error(transparent)]
    Entries(#[from] EntryError),
}

impl CmsError {
    /// Message for the visitor; server-provided text wins over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CmsError::Server {
                message: Some(m), ..
            } if !m.is_empty() => m.clone(),
            CmsError::Server { .. } => fallback.to_owned(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

/// Body of a rejected save, when the server sends one.
#[derive(Debug, Default, Deserialize)]
pub struct SaveFailure {
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote CMS API.
#[allow(async_fn_in_trait)]
pub trait CmsBackend {
    /// Exchange the password for an API key.
    async fn login(&self, password: &str) -> Result<String, CmsError>;
    async fn fetch_data(&self, api_key: &str, bypass_cache: bool) -> Result<Value, CmsError>;
    async fn save_data(&self, api_key: &str, data: &Value) -> Result<(), CmsError>;
}

/// Editor page as seen by the controller.
pub trait CmsView {
    fn show_login(&self);
    fn show_editor(&self);
    fn set_login_error(&self, visible: bool);
    /// Empty the password input, focusing it when `focus` is set.
    fn reset_password(&self, focus: bool);
    fn set_loading(&self, loading: bool);
    fn show_loading_error(&self, message: &str);
    fn document(&self) -> String;
    fn set_document(&self, text: &str);
    fn show_json_error(&self, diagnostic: Option<&JsonDiagnostic>);
    /// Point the visitor at the offending line.
    fn highlight_error(&self, diagnostic: &JsonDiagnostic);
    fn clear_messages(&self);
    fn show_error(&self, message: &str);
    /// Success banner; the view hides it again after a short while.
    fn show_success(&self, message: &str);
    fn set_entry_error(&self, message: Option<&str>);
    fn render_entries(&self, entries: &EntryCollection);
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Session {
    api_key: String,
}

pub struct CmsController<B, V> {
    backend: B,
    view: V,
    session: RefCell<Option<Session>>,
}

impl<B: CmsBackend, V: CmsView> CmsController<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self {
            backend,
            view,
            session: RefCell::new(None),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    fn api_key(&self) -> Result<String, CmsError> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.api_key.clone())
            .ok_or(CmsError::NoSession)
    }

    /// Returns whether a session was established.
    pub async fn login(&self, password: &str) -> bool {
        self.view.set_login_error(false);
        match self.backend.login(password).await {
            Ok(api_key) => {
                log::info!("[cms] logged in");
                *self.session.borrow_mut() = Some(Session { api_key });
                self.view.show_editor();
                self.load().await;
                true
            }
            Err(e) => {
                log::warn!("[cms] login rejected: {e}");
                self.view.set_login_error(true);
                self.view.reset_password(true);
                false
            }
        }
    }

    pub async fn load(&self) {
        self.view.set_loading(true);
        let result = match self.api_key() {
            Ok(key) => self.backend.fetch_data(&key, false).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(data) => {
                self.view.set_loading(false);
                self.set_document(&data);
            }
            Err(e) => {
                log::error!("[cms] load failed: {e}");
                self.view
                    .show_loading_error(&format!("Error loading data: {}", e.user_message(LOAD_FAILED)));
            }
        }
    }

    /// Replace the document with the server's current copy.
    pub async fn sync(&self) {
        self.view.clear_messages();
        let result = match self.api_key() {
            Ok(key) => self.backend.fetch_data(&key, true).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(data) => {
                self.set_document(&data);
                self.view.show_success(SYNC_OK);
            }
            Err(e) => {
                log::error!("[cms] sync failed: {e}");
                self.view
                    .show_error(&format!("Sync error: {}", e.user_message(SYNC_FAILED)));
            }
        }
    }

    /// Returns whether the server accepted the document.
    pub async fn save(&self) -> bool {
        self.view.clear_messages();
        let data = match check_json(&self.view.document()) {
            Ok(v) => v,
            Err(d) => {
                self.view.show_json_error(Some(&d));
                self.view.highlight_error(&d);
                self.view.show_error(FIX_JSON_FIRST);
                return false;
            }
        };
        let result = match self.api_key() {
            Ok(key) => self.backend.save_data(&key, &data).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                log::info!("[cms] saved");
                self.view.show_success(SAVE_OK);
                true
            }
            Err(e) => {
                log::error!("[cms] save failed: {e}");
                self.view
                    .show_error(&format!("Save error: {}", e.user_message(SAVE_FAILED)));
                false
            }
        }
    }

    /// Re-check the document after an edit. Returns whether it parses.
    pub fn validate(&self) -> bool {
        let text = self.view.document();
        match check_json(&text) {
            Ok(value) => {
                self.view.show_json_error(None);
                match EntryCollection::from_value(value) {
                    Ok(c) => {
                        self.view.set_entry_error(None);
                        self.view.render_entries(&c);
                    }
                    Err(e) => self.view.set_entry_error(Some(&e.to_string())),
                }
                true
            }
            Err(d) => {
                self.view.show_json_error(Some(&d));
                false
            }
        }
    }

    pub fn logout(&self) {
        *self.session.borrow_mut() = None;
        self.view.reset_password(false);
        self.view.set_document("");
        self.view.clear_messages();
        self.view.show_login();
        log::info!("[cms] logged out");
    }

    pub fn add_entry(&self, entry: ModelEntry) -> Result<(), CmsError> {
        self.edit_entries(|c| c.add(entry))
    }

    pub fn update_entry(&self, entry: ModelEntry) -> Result<(), CmsError> {
        self.edit_entries(|c| c.update(entry))
    }

    pub fn remove_entry(&self, id: &str) -> Result<(), CmsError> {
        self.edit_entries(|c| c.remove(id).map(|_| ()))
    }

    /// Apply `edit` to the parsed document and write it back. On any error the
    /// document is left exactly as it was.
    fn edit_entries<F>(&self, edit: F) -> Result<(), CmsError>
    where
        F: FnOnce(&mut EntryCollection) -> Result<(), EntryError>,
    {
        let result = check_json(&self.view.document())
            .map_err(CmsError::from)
            .and_then(|value| Ok(EntryCollection::from_value(value)?))
            .and_then(|mut c| {
                edit(&mut c)?;
                Ok(c)
            });
        match result {
            Ok(c) => {
                self.view.set_document(&c.to_pretty_json());
                self.validate();
                Ok(())
            }
            Err(e) => {
                let msg = match &e {
                    CmsError::InvalidJson(_) => FIX_JSON_FIRST.to_owned(),
                    other => other.to_string(),
                };
                self.view.set_entry_error(Some(&msg));
                Err(e)
            }
        }
    }

    fn set_document(&self, data: &Value) {
        let text = serde_json::to_string_pretty(data).unwrap_or_default();
        self.view.set_document(&text);
        self.validate();
    }
}
