// Host-side tests for the CMS session flow, driven through fake backend and view.

use exhibit_core::cms::*;
use exhibit_core::diagnostics::JsonDiagnostic;
use exhibit_core::entries::{EntryCollection, EntryId, ModelEntry};
use pollster::block_on;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};

const PASSWORD: &str = "narren";

#[derive(Default)]
struct FakeBackend {
    data: RefCell<Value>,
    fetches: RefCell<Vec<(String, bool)>>,
    saved: RefCell<Vec<Value>>,
    fetch_error: RefCell<Option<CmsError>>,
    save_error: RefCell<Option<CmsError>>,
}

impl FakeBackend {
    fn with_data(data: Value) -> Self {
        let b = Self::default();
        *b.data.borrow_mut() = data;
        b
    }
}

impl CmsBackend for FakeBackend {
    async fn login(&self, password: &str) -> Result<String, CmsError> {
        if password == PASSWORD {
            Ok("key-1".into())
        } else {
            Err(CmsError::Unauthorized)
        }
    }

    async fn fetch_data(&self, api_key: &str, bypass_cache: bool) -> Result<Value, CmsError> {
        self.fetches.borrow_mut().push((api_key.to_owned(), bypass_cache));
        match self.fetch_error.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(self.data.borrow().clone()),
        }
    }

    async fn save_data(&self, _api_key: &str, data: &Value) -> Result<(), CmsError> {
        if let Some(e) = self.save_error.borrow_mut().take() {
            return Err(e);
        }
        self.saved.borrow_mut().push(data.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeView {
    editor_visible: Cell<bool>,
    login_error: Cell<bool>,
    password: RefCell<String>,
    password_focused: Cell<bool>,
    loading: Cell<bool>,
    loading_error: RefCell<Option<String>>,
    document: RefCell<String>,
    json_error: RefCell<Option<JsonDiagnostic>>,
    highlighted_line: Cell<Option<usize>>,
    error: RefCell<Option<String>>,
    success: RefCell<Option<String>>,
    entry_error: RefCell<Option<String>>,
    rendered: Cell<usize>,
}

impl CmsView for FakeView {
    fn show_login(&self) {
        self.editor_visible.set(false);
    }
    fn show_editor(&self) {
        self.editor_visible.set(true);
    }
    fn set_login_error(&self, visible: bool) {
        self.login_error.set(visible);
    }
    fn reset_password(&self, focus: bool) {
        self.password.borrow_mut().clear();
        self.password_focused.set(focus);
    }
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }
    fn show_loading_error(&self, message: &str) {
        *self.loading_error.borrow_mut() = Some(message.to_owned());
    }
    fn document(&self) -> String {
        self.document.borrow().clone()
    }
    fn set_document(&self, text: &str) {
        *self.document.borrow_mut() = text.to_owned();
    }
    fn show_json_error(&self, diagnostic: Option<&JsonDiagnostic>) {
        *self.json_error.borrow_mut() = diagnostic.cloned();
    }
    fn highlight_error(&self, diagnostic: &JsonDiagnostic) {
        self.highlighted_line.set(Some(diagnostic.line));
    }
    fn clear_messages(&self) {
        *self.error.borrow_mut() = None;
        *self.success.borrow_mut() = None;
    }
    fn show_error(&self, message: &str) {
        *self.error.borrow_mut() = Some(message.to_owned());
    }
    fn show_success(&self, message: &str) {
        *self.success.borrow_mut() = Some(message.to_owned());
    }
    fn set_entry_error(&self, message: Option<&str>) {
        *self.entry_error.borrow_mut() = message.map(str::to_owned);
    }
    fn render_entries(&self, entries: &EntryCollection) {
        self.rendered.set(entries.len());
    }
}

fn sample() -> Value {
    json!([{"id": 1, "name": "Hirsch"}, {"id": 2, "name": "Narr"}])
}

fn logged_in() -> CmsController<FakeBackend, FakeView> {
    let c = CmsController::new(FakeBackend::with_data(sample()), FakeView::default());
    assert!(block_on(c.login(PASSWORD)));
    c
}

#[test]
fn wrong_password_shows_banner_and_fetches_nothing() {
    let c = CmsController::new(FakeBackend::with_data(sample()), FakeView::default());
    *c.view().password.borrow_mut() = "wrong".into();

    assert!(!block_on(c.login("wrong")));
    assert!(c.view().login_error.get());
    assert!(c.view().password.borrow().is_empty());
    assert!(c.view().password_focused.get());
    assert!(!c.view().editor_visible.get());
    assert!(!c.is_logged_in());
    assert!(c.backend().fetches.borrow().is_empty());
}

#[test]
fn login_loads_pretty_printed_data() {
    let c = logged_in();
    let v = c.view();
    assert!(!v.login_error.get());
    assert!(v.editor_visible.get());
    assert!(!v.loading.get());
    assert_eq!(*v.document.borrow(), serde_json::to_string_pretty(&sample()).unwrap());
    assert_eq!(v.rendered.get(), 2);
    assert!(v.json_error.borrow().is_none());
    assert_eq!(*c.backend().fetches.borrow(), vec![("key-1".to_owned(), false)]);
}

#[test]
fn load_failure_is_reported_in_the_loading_area() {
    let c = CmsController::new(FakeBackend::with_data(sample()), FakeView::default());
    *c.backend().fetch_error.borrow_mut() = Some(CmsError::Server { status: 503, message: None });
    block_on(c.login(PASSWORD));
    assert_eq!(
        c.view().loading_error.borrow().as_deref(),
        Some("Error loading data: Failed to load data")
    );
}

#[test]
fn editing_revalidates_the_document() {
    let c = logged_in();
    c.view().set_document("[\n  {\"id\": 1,}\n]");
    assert!(!c.validate());
    let err = c.view().json_error.borrow().clone().unwrap();
    assert_eq!(err.line, 2);
    // typing never moves the selection
    assert_eq!(c.view().highlighted_line.get(), None);

    c.view().set_document("[]");
    assert!(c.validate());
    assert!(c.view().json_error.borrow().is_none());
    assert_eq!(c.view().rendered.get(), 0);
}

#[test]
fn save_is_blocked_while_the_json_is_invalid() {
    let c = logged_in();
    c.view().set_document("{\n  \"items\": [\n}");
    assert!(!block_on(c.save()));
    assert_eq!(c.view().error.borrow().as_deref(), Some(FIX_JSON_FIRST));
    assert!(c.view().json_error.borrow().is_some());
    assert_eq!(c.view().highlighted_line.get(), Some(3));
    assert!(c.backend().saved.borrow().is_empty());
}

#[test]
fn save_sends_the_parsed_document() {
    let c = logged_in();
    c.view().set_document(r#"{"items": [], "version": 3}"#);
    assert!(block_on(c.save()));
    assert_eq!(c.view().success.borrow().as_deref(), Some(SAVE_OK));
    assert_eq!(*c.backend().saved.borrow(), vec![json!({"items": [], "version": 3})]);
}

#[test]
fn save_errors_prefer_the_server_message() {
    let c = logged_in();
    *c.backend().save_error.borrow_mut() = Some(CmsError::Server {
        status: 500,
        message: Some("Disk full".into()),
    });
    assert!(!block_on(c.save()));
    assert_eq!(c.view().error.borrow().as_deref(), Some("Save error: Disk full"));

    *c.backend().save_error.borrow_mut() = Some(CmsError::Server { status: 500, message: None });
    block_on(c.save());
    assert_eq!(c.view().error.borrow().as_deref(), Some("Save error: Save failed"));

    *c.backend().save_error.borrow_mut() = Some(CmsError::Network("offline".into()));
    block_on(c.save());
    assert_eq!(c.view().error.borrow().as_deref(), Some("Save error: offline"));
}

#[test]
fn save_without_a_session_is_refused() {
    let c = CmsController::new(FakeBackend::default(), FakeView::default());
    c.view().set_document("[]");
    assert!(!block_on(c.save()));
    assert_eq!(c.view().error.borrow().as_deref(), Some("Save error: not logged in"));
}

#[test]
fn sync_bypasses_the_cache_and_replaces_the_document() {
    let c = logged_in();
    c.view().set_document("[]");
    *c.backend().data.borrow_mut() = json!([{"id": 9, "name": "Neu"}]);

    block_on(c.sync());
    assert_eq!(c.backend().fetches.borrow().last(), Some(&("key-1".to_owned(), true)));
    assert_eq!(c.view().success.borrow().as_deref(), Some(SYNC_OK));
    assert_eq!(c.view().rendered.get(), 1);

    *c.backend().fetch_error.borrow_mut() = Some(CmsError::Server { status: 502, message: None });
    block_on(c.sync());
    assert_eq!(c.view().error.borrow().as_deref(), Some("Sync error: Failed to sync data"));
}

#[test]
fn logout_clears_session_and_editor() {
    let c = logged_in();
    c.view().show_error("left over");
    c.logout();
    assert!(!c.is_logged_in());
    assert!(!c.view().editor_visible.get());
    assert!(c.view().document.borrow().is_empty());
    assert!(c.view().error.borrow().is_none());
    assert!(!c.view().password_focused.get());
}

#[test]
fn entry_edits_write_the_document_back() {
    let c = logged_in();
    c.add_entry(ModelEntry::new("kuh", "Kuh").with_model_path("/models/kuh.glb")).unwrap();
    assert_eq!(c.view().rendered.get(), 3);
    assert!(c.view().document.borrow().contains("\"modelPath\": \"/models/kuh.glb\""));

    c.update_entry(ModelEntry::new(EntryId::from(1i64), "Hirsch II")).unwrap();
    c.remove_entry("2").unwrap();
    let doc: Value = serde_json::from_str(&c.view().document.borrow()).unwrap();
    assert_eq!(
        doc,
        json!([{"id": 1, "name": "Hirsch II"}, {"id": "kuh", "name": "Kuh", "modelPath": "/models/kuh.glb"}])
    );
    assert!(c.view().entry_error.borrow().is_none());
}

#[test]
fn rejected_entry_edits_leave_the_document_alone() {
    let c = logged_in();
    let before = c.view().document();

    let err = c.add_entry(ModelEntry::new("1", "Dup")).unwrap_err();
    assert!(matches!(err, CmsError::Entries(_)));
    assert_eq!(c.view().document(), before);
    assert_eq!(
        c.view().entry_error.borrow().as_deref(),
        Some("an entry with id `1` already exists")
    );

    c.view().set_document("[{");
    let err = c.remove_entry("1").unwrap_err();
    assert!(matches!(err, CmsError::InvalidJson(_)));
    assert_eq!(c.view().document(), "[{");
    assert_eq!(c.view().entry_error.borrow().as_deref(), Some(FIX_JSON_FIRST));
}

#[test]
fn user_messages() {
    assert_eq!(CmsError::Unauthorized.user_message("x"), "invalid password");
    let empty = CmsError::Server { status: 400, message: Some(String::new()) };
    assert_eq!(empty.user_message("fallback"), "fallback");
}
