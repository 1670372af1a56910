use crate::constants::{ERROR_CLASS, LOAD_ERROR_TEXT, OVERLAY_CLASS, PROGRESS_CLASS, SPINNER_CLASS};
use web_sys as web;

/// Spinner and percentage shown over a viewer while its model downloads.
pub struct LoadingOverlay {
    root: web::Element,
}

impl LoadingOverlay {
    pub fn attach(document: &web::Document, container: &web::Element) -> Option<Self> {
        let root = document.create_element("div").ok()?;
        root.set_class_name(OVERLAY_CLASS);
        root.set_inner_html(&format!(
            r#"<div class="{SPINNER_CLASS}"></div><div class="{PROGRESS_CLASS}">0%</div>"#
        ));
        container.append_child(&root).ok()?;
        Some(Self { root })
    }

    #[inline]
    pub fn set_progress(&self, percent: u32) {
        if let Ok(Some(el)) = self.root.query_selector(&format!(".{PROGRESS_CLASS}")) {
            el.set_text_content(Some(&format!("{percent}%")));
        }
    }

    /// Replace spinner and progress with the load error. The overlay stays up.
    pub fn show_error(&self) {
        self.root
            .set_inner_html(&format!(r#"<div class="{ERROR_CLASS}">{LOAD_ERROR_TEXT}</div>"#));
    }

    #[inline]
    pub fn remove(&self) {
        self.root.remove();
    }
}
