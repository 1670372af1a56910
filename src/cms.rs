//! CMS page: gloo-net backend and DOM view for the editor controller.

use crate::constants::{API_ORIGIN_ATTR, SUCCESS_MESSAGE_MS};
use crate::dom::{self, Listener};
use exhibit_core::cms::{
    CmsBackend, CmsController, CmsError, CmsView, LoginRequest, LoginResponse, SaveFailure, SAVE_OK,
};
use exhibit_core::config::ApiConfig;
use exhibit_core::diagnostics::{line_span, utf16_index, JsonDiagnostic};
use exhibit_core::entries::{Coordinates, EntryCollection, EntryId, ModelEntry};
use gloo_net::http::{Request, Response};
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

fn network(e: gloo_net::Error) -> CmsError {
    CmsError::Network(e.to_string())
}

pub struct GlooBackend {
    api: ApiConfig,
}

impl GlooBackend {
    pub fn new(api: ApiConfig) -> Self {
        log::info!("[cms] API origin {}", api.origin());
        Self { api }
    }
}

fn server_error(resp: &Response, message: Option<String>) -> CmsError {
    CmsError::Server {
        status: resp.status(),
        message,
    }
}

impl CmsBackend for GlooBackend {
    async fn login(&self, password: &str) -> Result<String, CmsError> {
        let resp = Request::post(&self.api.login_url())
            .json(&LoginRequest { password })
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        if !resp.ok() {
            return Err(CmsError::Unauthorized);
        }
        let body: LoginResponse = resp.json().await.map_err(network)?;
        Ok(body.api_key)
    }

    async fn fetch_data(&self, api_key: &str, bypass_cache: bool) -> Result<Value, CmsError> {
        let mut req = Request::get(&self.api.data_url()).header("X-API-Key", api_key);
        if bypass_cache {
            req = req.cache(web::RequestCache::NoStore);
        }
        let resp = req.send().await.map_err(network)?;
        if !resp.ok() {
            return Err(server_error(&resp, None));
        }
        resp.json().await.map_err(network)
    }

    async fn save_data(&self, api_key: &str, data: &Value) -> Result<(), CmsError> {
        let resp = Request::post(&self.api.save_url())
            .header("Authorization", &format!("Bearer {api_key}"))
            .json(data)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        if resp.ok() {
            return Ok(());
        }
        let failure = resp.json::<SaveFailure>().await.unwrap_or_default();
        Err(server_error(&resp, failure.message))
    }
}

/// Form for adding, updating and deleting single entries. Optional on the page.
struct EntryForm {
    id: web::HtmlInputElement,
    name: web::HtmlInputElement,
    description: Option<web::HtmlInputElement>,
    model_path: Option<web::HtmlInputElement>,
    coordinates: Option<web::HtmlInputElement>,
    icon: Option<web::HtmlInputElement>,
    error: Option<web::HtmlElement>,
    list: Option<web::Element>,
}

impl EntryForm {
    fn find(document: &web::Document) -> Option<Self> {
        Some(Self {
            id: dom::element_by_id(document, "entry-id")?,
            name: dom::element_by_id(document, "entry-name")?,
            description: dom::element_by_id(document, "entry-description"),
            model_path: dom::element_by_id(document, "entry-model-path"),
            coordinates: dom::element_by_id(document, "entry-coordinates"),
            icon: dom::element_by_id(document, "entry-icon"),
            error: dom::element_by_id(document, "entry-error"),
            list: document.get_element_by_id("entry-list"),
        })
    }

    fn text(input: &Option<web::HtmlInputElement>) -> Option<String> {
        input
            .as_ref()
            .map(|i| i.value().trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn id(&self) -> Option<EntryId> {
        EntryId::from_input(&self.id.value())
    }

    fn entry(&self) -> Option<ModelEntry> {
        let mut entry = ModelEntry::new(self.id()?, self.name.value().trim());
        entry.description = Self::text(&self.description);
        entry.model_path = Self::text(&self.model_path);
        entry.coordinates = Self::text(&self.coordinates).and_then(|c| Coordinates::from_input(&c));
        entry.icon = Self::text(&self.icon);
        Some(entry)
    }
}

pub struct DomView {
    login_container: web::HtmlElement,
    editor_container: web::HtmlElement,
    login_error: web::HtmlElement,
    password: web::HtmlInputElement,
    loading: web::HtmlElement,
    editor_content: web::HtmlElement,
    editor: web::HtmlTextAreaElement,
    editor_wrapper: web::HtmlElement,
    json_error_bar: web::HtmlElement,
    json_error_text: web::HtmlElement,
    save_error: web::HtmlElement,
    save_success: web::HtmlElement,
    sync_modal: web::HtmlElement,
    entry_form: Option<EntryForm>,
}

/// The editor textarea: `#json-editor`, or one created in `#json-editor-container`.
fn find_editor(document: &web::Document) -> Option<web::HtmlTextAreaElement> {
    if let Some(editor) = dom::element_by_id(document, "json-editor") {
        return Some(editor);
    }
    let container = document.get_element_by_id("json-editor-container")?;
    let editor: web::HtmlTextAreaElement = document.create_element("textarea").ok()?.dyn_into().ok()?;
    editor.set_id("json-editor");
    editor.set_spellcheck(false);
    container.append_child(&editor).ok()?;
    Some(editor)
}

impl DomView {
    pub fn find(document: &web::Document) -> Option<Self> {
        Some(Self {
            login_container: dom::element_by_id(document, "login-container")?,
            editor_container: dom::element_by_id(document, "editor-container")?,
            login_error: dom::element_by_id(document, "login-error")?,
            password: dom::element_by_id(document, "password")?,
            loading: dom::element_by_id(document, "loading")?,
            editor_content: dom::element_by_id(document, "editor-content")?,
            editor: find_editor(document)?,
            editor_wrapper: dom::element_by_id(document, "editor-wrapper")?,
            json_error_bar: dom::element_by_id(document, "json-error-bar")?,
            json_error_text: dom::element_by_id(document, "json-error-text")?,
            save_error: dom::element_by_id(document, "save-error")?,
            save_success: dom::element_by_id(document, "save-success")?,
            sync_modal: dom::element_by_id(document, "sync-modal")?,
            entry_form: EntryForm::find(document),
        })
    }

    fn show_sync_modal(&self, visible: bool) {
        dom::set_class(&self.sync_modal, "hidden", !visible);
    }
}

impl CmsView for DomView {
    fn show_login(&self) {
        dom::set_class(&self.editor_container, "hidden", true);
        dom::set_class(&self.login_container, "hidden", false);
    }

    fn show_editor(&self) {
        dom::set_class(&self.login_container, "hidden", true);
        dom::set_class(&self.editor_container, "hidden", false);
    }

    fn set_login_error(&self, visible: bool) {
        dom::set_display(&self.login_error, visible);
    }

    fn reset_password(&self, focus: bool) {
        self.password.set_value("");
        if focus {
            _ = self.password.focus();
        }
    }

    fn set_loading(&self, loading: bool) {
        dom::set_class(&self.loading, "hidden", !loading);
        dom::set_class(&self.editor_content, "hidden", loading);
    }

    fn show_loading_error(&self, message: &str) {
        self.loading.set_text_content(Some(message));
    }

    fn document(&self) -> String {
        self.editor.value()
    }

    fn set_document(&self, text: &str) {
        self.editor.set_value(text);
    }

    fn show_json_error(&self, diagnostic: Option<&JsonDiagnostic>) {
        dom::set_class(&self.editor_wrapper, "has-error", diagnostic.is_some());
        dom::set_class(&self.json_error_bar, "visible", diagnostic.is_some());
        if let Some(d) = diagnostic {
            self.json_error_text.set_text_content(Some(&d.to_string()));
        }
    }

    fn highlight_error(&self, diagnostic: &JsonDiagnostic) {
        let text = self.editor.value();
        let span = line_span(&text, diagnostic.line);
        let start = utf16_index(&text, span.start);
        let end = utf16_index(&text, span.end);
        _ = self.editor.focus();
        _ = self.editor.set_selection_range(start, end);
    }

    fn clear_messages(&self) {
        dom::set_display(&self.save_error, false);
        dom::set_display(&self.save_success, false);
    }

    fn show_error(&self, message: &str) {
        self.save_error.set_text_content(Some(message));
        dom::set_display(&self.save_error, true);
    }

    fn show_success(&self, message: &str) {
        self.save_success.set_text_content(Some(message));
        dom::set_display(&self.save_success, true);
        let banner = self.save_success.clone();
        let hide = Closure::once_into_js(move || {
            dom::set_display(&banner, false);
            banner.set_text_content(Some(SAVE_OK));
        });
        if let Some(w) = web::window() {
            _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                hide.unchecked_ref(),
                SUCCESS_MESSAGE_MS,
            );
        }
    }

    fn set_entry_error(&self, message: Option<&str>) {
        if let Some(el) = self.entry_form.as_ref().and_then(|f| f.error.as_ref()) {
            el.set_text_content(message);
            dom::set_display(el, message.is_some());
        }
    }

    fn render_entries(&self, entries: &EntryCollection) {
        let Some(list) = self.entry_form.as_ref().and_then(|f| f.list.as_ref()) else {
            return;
        };
        let Some(document) = dom::window_document() else {
            return;
        };
        list.set_inner_html("");
        for entry in entries.iter() {
            if let Ok(li) = document.create_element("li") {
                li.set_text_content(Some(&format!("{} · {}", entry.key(), entry.display_name())));
                _ = li.set_attribute("data-entry-id", &entry.key());
                _ = list.append_child(&li);
            }
        }
    }
}

type Controller = CmsController<GlooBackend, DomView>;

fn api_config(document: &web::Document) -> ApiConfig {
    document
        .body()
        .and_then(|b| b.get_attribute(API_ORIGIN_ATTR))
        .filter(|o| !o.trim().is_empty())
        .map(|o| ApiConfig::with_origin(o.trim()))
        .unwrap_or_default()
}

fn on_click(document: &web::Document, id: &str, handler: impl FnMut() + 'static) {
    dom::add_click_listener(document, id, handler);
}

/// Wire the CMS page. Returns `false` when the page has no login form.
pub fn init(document: &web::Document) -> bool {
    let Some(form) = document.get_element_by_id("login-form") else {
        return false;
    };
    let Some(view) = DomView::find(document) else {
        log::error!("[cms] editor markup incomplete");
        return false;
    };
    let controller: Rc<Controller> = Rc::new(CmsController::new(
        GlooBackend::new(api_config(document)),
        view,
    ));

    {
        let c = controller.clone();
        Listener::new(&form, "submit", None, move |ev: web::Event| {
            ev.prevent_default();
            let password = c.view().password.value();
            let c = c.clone();
            spawn_local(async move {
                c.login(&password).await;
            });
        })
        .forget();
    }
    {
        let c = controller.clone();
        let editor = c.view().editor.clone();
        Listener::new(&editor, "input", None, move |_: web::Event| {
            c.validate();
        })
        .forget();
    }
    {
        let c = controller.clone();
        on_click(document, "save-btn", move || {
            let c = c.clone();
            spawn_local(async move {
                c.save().await;
            });
        });
    }
    {
        let c = controller.clone();
        on_click(document, "reload-btn", move || {
            c.view().clear_messages();
            let c = c.clone();
            spawn_local(async move { c.load().await });
        });
    }
    {
        let c = controller.clone();
        on_click(document, "sync-btn", move || c.view().show_sync_modal(true));
    }
    {
        let c = controller.clone();
        on_click(document, "sync-cancel", move || c.view().show_sync_modal(false));
    }
    {
        let c = controller.clone();
        on_click(document, "sync-confirm", move || {
            c.view().show_sync_modal(false);
            let c = c.clone();
            spawn_local(async move { c.sync().await });
        });
    }
    {
        let c = controller.clone();
        let modal = c.view().sync_modal.clone();
        Listener::new(&modal, "click", None, move |ev: web::MouseEvent| {
            let on_backdrop = ev
                .target()
                .and_then(|t| t.dyn_into::<web::Element>().ok())
                .is_some_and(|el| el.id() == "sync-modal");
            if on_backdrop {
                c.view().show_sync_modal(false);
            }
        })
        .forget();
    }
    {
        let c = controller.clone();
        on_click(document, "logout-btn", move || c.logout());
    }
    wire_entry_form(document, &controller);

    log::info!("[cms] ready");
    true
}

fn wire_entry_form(document: &web::Document, controller: &Rc<Controller>) {
    if controller.view().entry_form.is_none() {
        return;
    }
    let form_entry = |c: &Controller| c.view().entry_form.as_ref().and_then(EntryForm::entry);
    {
        let c = controller.clone();
        on_click(document, "entry-add", move || match form_entry(&c) {
            Some(entry) => {
                _ = c.add_entry(entry);
            }
            None => c.view().set_entry_error(Some("An entry needs an id")),
        });
    }
    {
        let c = controller.clone();
        on_click(document, "entry-update", move || match form_entry(&c) {
            Some(entry) => {
                _ = c.update_entry(entry);
            }
            None => c.view().set_entry_error(Some("An entry needs an id")),
        });
    }
    {
        let c = controller.clone();
        on_click(document, "entry-delete", move || {
            let id = c
                .view()
                .entry_form
                .as_ref()
                .and_then(EntryForm::id)
                .map(|id| id.key());
            match id {
                Some(id) => {
                    _ = c.remove_entry(&id);
                }
                None => c.view().set_entry_error(Some("An entry needs an id")),
            }
        });
    }
}
