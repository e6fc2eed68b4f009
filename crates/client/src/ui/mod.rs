// DOM status line
use web_sys::{Document, Element};

use crate::game::Phase;

/// The page element that shows connection and round status.
pub struct StatusLine {
    element: Option<Element>,
}

impl StatusLine {
    pub fn new(document: &Document, id: &str) -> Self {
        Self {
            element: document.get_element_by_id(id),
        }
    }

    /// Show `text` and tag the element with the phase so the page can style it.
    pub fn show(&self, text: &str, phase: Phase) {
        let Some(el) = &self.element else {
            return;
        };
        el.set_text_content(Some(text));
        el.set_attribute("data-phase", phase.as_str()).ok();
    }
}
