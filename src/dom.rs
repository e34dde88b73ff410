//! Small DOM helpers shared by the behavior modules.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// All elements matching a selector, as a plain Vec.
pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    let mut elements = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(node) = list.item(i) {
            if let Ok(el) = node.dyn_into::<Element>() {
                elements.push(el);
            }
        }
    }
    elements
}

/// "prefers-reduced-motion: reduce", sampled at call time. Callers read
/// this once at startup and never re-check.
pub fn prefers_reduced_motion() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Set an inline style property on an element, whether HTML or SVG.
pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(el) = element.dyn_ref::<web_sys::HtmlElement>() {
        let _ = el.style().set_property(property, value);
    } else if let Some(el) = element.dyn_ref::<web_sys::SvgElement>() {
        let _ = el.style().set_property(property, value);
    }
}
