//! Scroll-linked animations
//!
//! Applies reveal classes to configured element groups and flips them to
//! `visible` when they scroll into view, animates the stat counters, and
//! fades the hero content out as the page scrolls. Reveals and parallax
//! are skipped entirely under reduced motion; the counters still run
//! (they settle on the final number either way).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::dom;

/// Selector groups and the reveal class each one receives.
const REVEAL_GROUPS: &[(&str, &str, bool)] = &[
    (".about-main", "fade-in-left", false),
    (".about-visual", "fade-in-right", false),
    (".project-card", "fade-in", true),
    (".timeline-item", "fade-in", true),
    (".resume-block", "scale-in", true),
    (".featured-article", "fade-in", true),
    (".contact-link", "fade-in", true),
    (".stat-item", "fade-in", true),
];

/// Highest stagger class; later siblings all share it.
const MAX_STAGGER: usize = 5;
/// Reveal trigger fires this far above the viewport bottom.
const REVEAL_ROOT_MARGIN: &str = "0px 0px -80px 0px";
const REVEAL_THRESHOLD: f64 = 0.1;
const COUNTER_THRESHOLD: f64 = 0.5;
const COUNTER_DURATION_MS: f64 = 1500.0;
const COUNTER_FRAME_MS: f64 = 16.0;

/// Stagger class for the nth element of a group, capped at [`MAX_STAGGER`].
pub fn stagger_class(index: usize) -> String {
    format!("stagger-{}", (index + 1).min(MAX_STAGGER))
}

/// Per-frame increment that reaches `target` in the configured duration.
pub fn counter_step(target: f64) -> f64 {
    target / (COUNTER_DURATION_MS / COUNTER_FRAME_MS)
}

/// Hero content `(opacity, translate_y)` for a scroll depth, or `None`
/// once the hero has scrolled out (styles are then left untouched).
pub fn hero_parallax(scrolled: f64, hero_height: f64) -> Option<(f64, f64)> {
    if hero_height <= 0.0 || scrolled >= hero_height {
        return None;
    }
    let opacity = (1.0 - scrolled / (hero_height * 0.6)).max(0.0);
    Some((opacity, scrolled * 0.3))
}

/// The scroll indicator fades out over the first 200px of scrolling.
pub fn indicator_opacity(scrolled: f64) -> f64 {
    (1.0 - scrolled / 200.0).max(0.0)
}

/// Attach all scroll-linked behavior.
pub fn init() {
    let Some(document) = dom::document() else {
        return;
    };

    if !dom::prefers_reduced_motion() {
        init_reveals(&document);
        init_parallax(&document);
    }
    init_counters(&document);
}

fn make_observer(
    callback: &Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
    root_margin: Option<&str>,
    threshold: f64,
) -> Option<IntersectionObserver> {
    let options = IntersectionObserverInit::new();
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }
    options.set_threshold(&JsValue::from(threshold));
    IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()
}

fn init_reveals(document: &Document) {
    for &(selector, class, stagger) in REVEAL_GROUPS {
        for (i, element) in dom::query_all(document, selector).into_iter().enumerate() {
            let _ = element.class_list().add_1(class);
            if stagger {
                let _ = element.class_list().add_1(&stagger_class(i));
            }
        }
    }

    let on_reveal: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)> =
        Closure::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    let target = entry.target();
                    let _ = target.class_list().add_1("visible");
                    observer.unobserve(&target);
                }
            }
        });

    if let Some(observer) = make_observer(&on_reveal, Some(REVEAL_ROOT_MARGIN), REVEAL_THRESHOLD) {
        let animated = dom::query_all(
            document,
            ".fade-in, .fade-in-left, .fade-in-right, .scale-in",
        );
        for element in &animated {
            observer.observe(element);
        }
    }
    on_reveal.forget();
}

fn init_counters(document: &Document) {
    let stats = dom::query_all(document, ".stat-number[data-count]");
    if stats.is_empty() {
        return;
    }

    let on_stat: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)> =
        Closure::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    let target = entry.target();
                    if let Some(element) = target.dyn_ref::<HtmlElement>() {
                        animate_counter(element.clone());
                    }
                    observer.unobserve(&target);
                }
            }
        });

    if let Some(observer) = make_observer(&on_stat, None, COUNTER_THRESHOLD) {
        for element in &stats {
            observer.observe(element);
        }
    }
    on_stat.forget();
}

/// Count the element's text up from 0 to its `data-count` target, one
/// increment per animation frame.
fn animate_counter(element: HtmlElement) {
    let Some(target) = element
        .get_attribute("data-count")
        .and_then(|v| v.parse::<f64>().ok())
    else {
        return;
    };
    let step = counter_step(target);
    let current = Rc::new(Cell::new(0.0));

    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let handle = frame.clone();
    *frame.borrow_mut() = Some(Closure::new(move || {
        let next = current.get() + step;
        if next < target {
            current.set(next);
            element.set_text_content(Some(&format!("{}", next.floor() as i64)));
            request_frame(&handle);
        } else {
            element.set_text_content(Some(&format!("{}", target as i64)));
        }
    }));
    request_frame(&frame);
}

fn request_frame(frame: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(window) = dom::window() else {
        return;
    };
    if let Some(closure) = frame.borrow().as_ref() {
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

fn init_parallax(document: &Document) {
    let Some(window) = dom::window() else {
        return;
    };
    let hero = document
        .query_selector(".hero")
        .ok()
        .flatten()
        .and_then(|e| e.dyn_into::<HtmlElement>().ok());
    let content = document.query_selector(".hero-content").ok().flatten();
    let (Some(hero), Some(content)) = (hero, content) else {
        return;
    };
    let indicator = document.query_selector(".scroll-indicator").ok().flatten();

    let on_scroll: Closure<dyn FnMut()> = Closure::new(move || {
        let Some(window) = dom::window() else {
            return;
        };
        let scrolled = window.scroll_y().unwrap_or(0.0);
        let Some((opacity, translate)) = hero_parallax(scrolled, hero.offset_height() as f64)
        else {
            return;
        };
        dom::set_style(&content, "opacity", &opacity.to_string());
        dom::set_style(&content, "transform", &format!("translateY({translate}px)"));
        if let Some(indicator) = &indicator {
            dom::set_style(indicator, "opacity", &indicator_opacity(scrolled).to_string());
        }
    });
    let _ = window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
    on_scroll.forget();
}
