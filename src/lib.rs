#![cfg(target_arch = "wasm32")]
use crate::constants::AR_LOADING_TEXT;
use exhibit_core::config::Environment;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod ar;
mod carousel;
mod cms;
mod constants;
mod dom;
mod events;
mod frame;
mod loader;
mod overlay;
mod render;
mod resize;
mod slider;
mod viewer;

pub use viewer::{dispose_viewer_controls, has_viewer, init_model_viewer, reset_viewer_view};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(Environment::current().log_level()).ok();
    log::info!("exhibit-web starting");

    // A-Frame reads component definitions when the scene parses, so this
    // cannot wait for the DOM.
    if let Err(e) = ar::register_component() {
        log::error!("[ar] register error: {:?}", e);
    }

    let document = dom::window_document().ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "loading" {
        dom::Listener::new(&document, "DOMContentLoaded", None, |_: web::Event| run_init())
            .forget();
    } else {
        run_init();
    }
    Ok(())
}

fn run_init() {
    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    if document.get_element_by_id("swipe-container").is_some() {
        init_viewer_page(&document);
    }
    if cms::init(&document) {
        return Ok(());
    }
    ar::init(&document);
    Ok(())
}

fn init_viewer_page(document: &web::Document) {
    carousel::init(document, |index| {
        init_model_viewer(index);
    });
    init_model_viewer(0);

    dom::add_click_listener(document, "ar-button", || {
        if let Some(w) = web::window() {
            _ = w.alert_with_message(AR_LOADING_TEXT);
        }
    });
}
