//! Navigation behavior
//!
//! Mobile menu toggling, the scrolled-state class on the nav bar, active
//! link highlighting, and smooth same-page anchor scrolling. The scroll
//! math is pure and unit tested; the listeners at the bottom are plain
//! DOM wiring and live for the page lifetime.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MouseEvent, ScrollBehavior, ScrollToOptions};

use crate::dom;

/// Scroll depth past which the nav bar gets its `scrolled` class.
const SCROLLED_THRESHOLD: f64 = 50.0;
/// Offset below the viewport top used to probe which section is current.
const ACTIVE_PROBE_OFFSET: f64 = 150.0;
/// Minimum interval between scroll handler runs.
const SCROLL_THROTTLE_MS: f64 = 100.0;

/// Whether the nav bar should show its scrolled state.
pub fn nav_is_scrolled(scroll_y: f64) -> bool {
    scroll_y > SCROLLED_THRESHOLD
}

/// Index of the section containing `probe`, given `(top, height)` extents
/// in document order. When sections overlap, the later one wins.
pub fn active_section(probe: f64, sections: &[(f64, f64)]) -> Option<usize> {
    let mut active = None;
    for (i, &(top, height)) in sections.iter().enumerate() {
        if probe >= top && probe < top + height {
            active = Some(i);
        }
    }
    active
}

/// Leading-edge throttle: true when `interval` has elapsed since the last
/// accepted call, in which case the stamp advances.
pub fn throttle_ready(last_run: &Cell<f64>, now: f64, interval: f64) -> bool {
    if now - last_run.get() >= interval {
        last_run.set(now);
        true
    } else {
        false
    }
}

/// Attach all navigation behavior. Missing elements disable the
/// corresponding feature silently.
pub fn init() {
    let Some(document) = dom::document() else {
        return;
    };
    init_menu_toggle(&document);
    init_smooth_scroll(&document);
    init_scroll_effects(&document);
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn close_menu(toggle: &Element, links: &Element) {
    let _ = toggle.set_attribute("aria-expanded", "false");
    let _ = toggle.class_list().remove_1("active");
    let _ = links.class_list().remove_1("active");
}

fn init_menu_toggle(document: &Document) {
    let Some(toggle) = query(document, ".nav-toggle") else {
        return;
    };
    let Some(links) = query(document, ".nav-links") else {
        return;
    };

    let on_toggle: Closure<dyn FnMut()> = {
        let toggle = toggle.clone();
        let links = links.clone();
        Closure::new(move || {
            let expanded = toggle.get_attribute("aria-expanded").as_deref() == Some("true");
            let _ = toggle.set_attribute("aria-expanded", if expanded { "false" } else { "true" });
            let _ = toggle.class_list().toggle("active");
            let _ = links.class_list().toggle("active");
        })
    };
    let _ = toggle.add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref());
    on_toggle.forget();

    // Following a link closes the menu
    if let Ok(anchors) = links.query_selector_all("a") {
        for i in 0..anchors.length() {
            let Some(anchor) = anchors.item(i) else {
                continue;
            };
            let on_follow: Closure<dyn FnMut()> = {
                let toggle = toggle.clone();
                let links = links.clone();
                Closure::new(move || close_menu(&toggle, &links))
            };
            let _ = anchor
                .add_event_listener_with_callback("click", on_follow.as_ref().unchecked_ref());
            on_follow.forget();
        }
    }

    // So does clicking anywhere outside the toggle and the menu
    let on_outside: Closure<dyn FnMut(MouseEvent)> = {
        let toggle = toggle.clone();
        let links = links.clone();
        Closure::new(move |event: MouseEvent| {
            let target = event.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok());
            let inside = toggle.contains(target.as_ref()) || links.contains(target.as_ref());
            if !inside {
                close_menu(&toggle, &links);
            }
        })
    };
    let _ =
        document.add_event_listener_with_callback("click", on_outside.as_ref().unchecked_ref());
    on_outside.forget();
}

fn init_smooth_scroll(document: &Document) {
    let nav = query(document, ".nav");

    for anchor in dom::query_all(document, "a[href^='#']") {
        let on_click: Closure<dyn FnMut(MouseEvent)> = {
            let anchor = anchor.clone();
            let nav = nav.clone();
            Closure::new(move |event: MouseEvent| {
                let Some(href) = anchor.get_attribute("href") else {
                    return;
                };
                if href == "#" {
                    return;
                }
                let Some(window) = dom::window() else {
                    return;
                };
                let Some(document) = dom::document() else {
                    return;
                };
                let Some(target) = document.query_selector(&href).ok().flatten() else {
                    return;
                };
                event.prevent_default();

                let nav_height = nav
                    .as_ref()
                    .and_then(|n| n.dyn_ref::<HtmlElement>())
                    .map(|n| n.offset_height() as f64)
                    .unwrap_or(0.0);
                let top = target.get_bounding_client_rect().top()
                    + window.scroll_y().unwrap_or(0.0)
                    - nav_height;

                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);

                if let Ok(history) = window.history() {
                    let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&href));
                }
            })
        };
        let _ = anchor.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        on_click.forget();
    }
}

fn init_scroll_effects(document: &Document) {
    let Some(window) = dom::window() else {
        return;
    };
    let nav = query(document, ".nav");

    let last_run = Rc::new(Cell::new(f64::MIN));
    let on_scroll: Closure<dyn FnMut()> = {
        let nav = nav.clone();
        let last_run = last_run.clone();
        Closure::new(move || {
            if !throttle_ready(&last_run, js_sys::Date::now(), SCROLL_THROTTLE_MS) {
                return;
            }
            update_scroll_state(nav.as_ref());
        })
    };
    let _ = window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
    on_scroll.forget();

    // Reflect the initial scroll position without waiting for an event
    update_scroll_state(nav.as_ref());
}

fn update_scroll_state(nav: Option<&Element>) {
    let Some(window) = dom::window() else {
        return;
    };
    let Some(document) = dom::document() else {
        return;
    };
    let scroll_y = window.scroll_y().unwrap_or(0.0);

    if let Some(nav) = nav {
        if nav_is_scrolled(scroll_y) {
            let _ = nav.class_list().add_1("scrolled");
        } else {
            let _ = nav.class_list().remove_1("scrolled");
        }
    }

    highlight_active_link(&document, scroll_y);
}

/// Mark the nav link whose section contains the probe point. When no
/// section matches (above the first, between sections), the previous
/// highlight is left alone.
fn highlight_active_link(document: &Document, scroll_y: f64) {
    let mut ids = Vec::new();
    let mut extents = Vec::new();
    for section in dom::query_all(document, "section[id]") {
        if let (Some(el), Some(id)) = (section.dyn_ref::<HtmlElement>(), section.get_attribute("id"))
        {
            extents.push((el.offset_top() as f64, el.offset_height() as f64));
            ids.push(id);
        }
    }

    let Some(active) = active_section(scroll_y + ACTIVE_PROBE_OFFSET, &extents) else {
        return;
    };
    let active_href = format!("#{}", ids[active]);

    for item in dom::query_all(document, ".nav-links a") {
        let _ = item.class_list().remove_1("active");
        if item.get_attribute("href").as_deref() == Some(active_href.as_str()) {
            let _ = item.class_list().add_1("active");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolled_only_past_threshold() {
        assert!(!nav_is_scrolled(0.0));
        assert!(!nav_is_scrolled(50.0));
        assert!(nav_is_scrolled(50.1));
    }

    #[test]
    fn active_section_picks_containing_extent() {
        let sections = [(0.0, 400.0), (400.0, 600.0), (1000.0, 500.0)];
        assert_eq!(active_section(150.0, &sections), Some(0));
        assert_eq!(active_section(400.0, &sections), Some(1));
        assert_eq!(active_section(1200.0, &sections), Some(2));
    }

    #[test]
    fn active_section_none_outside_all_sections() {
        let sections = [(100.0, 200.0)];
        assert_eq!(active_section(50.0, &sections), None);
        assert_eq!(active_section(300.0, &sections), None);
        assert_eq!(active_section(0.0, &[]), None);
    }

    #[test]
    fn overlapping_sections_prefer_the_later_one() {
        let sections = [(0.0, 1000.0), (500.0, 400.0)];
        assert_eq!(active_section(600.0, &sections), Some(1));
    }

    #[test]
    fn throttle_accepts_then_blocks() {
        let last = Cell::new(f64::MIN);
        assert!(throttle_ready(&last, 1000.0, 100.0));
        assert!(!throttle_ready(&last, 1050.0, 100.0));
        assert!(throttle_ready(&last, 1100.0, 100.0));
    }
}
