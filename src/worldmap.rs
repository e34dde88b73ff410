//! Interactive world map
//!
//! Injects a simplified SVG world map into the page and highlights the
//! visited countries, with a hover tooltip and a staggered color-in the
//! first time the map scrolls into view. The dataset and tooltip math
//! are pure; everything else is DOM wiring.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::dom;

/// Visited countries as ISO 3166-1 alpha-2 codes with display names.
pub const VISITED_COUNTRIES: &[(&str, &str)] = &[
    ("AT", "Austria"),
    ("BS", "Bahamas"),
    ("BQ", "Bonaire"),
    ("CA", "Canada"),
    ("US", "United States"),
    ("HR", "Croatia"),
    ("CZ", "Czechia"),
    ("SK", "Slovakia"),
    ("DO", "Dominican Republic"),
    ("EC", "Ecuador"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GR", "Greece"),
    ("HU", "Hungary"),
    ("IS", "Iceland"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("LA", "Laos"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("PE", "Peru"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("ES", "Spain"),
    ("CH", "Switzerland"),
    ("GB", "United Kingdom"),
    ("VN", "Vietnam"),
];

const WORLD_MAP_SVG: &str = include_str!("../assets/world-map.svg");

const VISITED_FILL: &str = "#5a8a6a";
const VISITED_STROKE: &str = "#4a7559";
const VISITED_FILL_HOVER: &str = "#4a7559";
const BASE_FILL: &str = "#e8e6e2";
const BASE_STROKE: &str = "#ddd9d4";

/// Interval between countries in the staggered reveal.
const STAGGER_INTERVAL_MS: i32 = 80;
/// How far above the hovered country the tooltip sits.
const TOOLTIP_RAISE_PX: f64 = 30.0;
const REVEAL_THRESHOLD: f64 = 0.3;

/// Base inline styles for the lazily created tooltip element.
const TOOLTIP_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("background", "#2d2a26"),
    ("color", "#faf9f7"),
    ("padding", "6px 12px"),
    ("border-radius", "6px"),
    ("font-size", "13px"),
    ("font-weight", "500"),
    ("pointer-events", "none"),
    ("z-index", "100"),
    ("white-space", "nowrap"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
    ("transform", "translateY(-8px)"),
    ("opacity", "0"),
    ("transition", "opacity 0.2s ease, transform 0.2s ease"),
];

/// Display name for a visited country code.
pub fn country_name(code: &str) -> Option<&'static str> {
    VISITED_COUNTRIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn is_visited(code: &str) -> bool {
    country_name(code).is_some()
}

/// Container-relative `(left, top)` for the tooltip, centered over a
/// country given as `(left, top, width)` in viewport coordinates.
pub fn tooltip_position(country: (f64, f64, f64), container: (f64, f64)) -> (f64, f64) {
    (
        country.0 - container.0 + country.2 / 2.0,
        country.1 - container.1 - TOOLTIP_RAISE_PX,
    )
}

/// Build the map inside `#world-map`. A page without that container
/// simply has no map.
pub fn init() {
    let Some(document) = dom::document() else {
        return;
    };
    let Some(container) = document.get_element_by_id("world-map") else {
        return;
    };
    container.set_inner_html(WORLD_MAP_SVG);

    let tooltip: Rc<RefCell<Option<Element>>> = Rc::new(RefCell::new(None));
    let mut visited_elements = Vec::new();

    for country in query_countries(&container) {
        let code = country.id();
        let visited = is_visited(&code);

        dom::set_style(&country, "fill", if visited { VISITED_FILL } else { BASE_FILL });
        dom::set_style(
            &country,
            "stroke",
            if visited { VISITED_STROKE } else { BASE_STROKE },
        );
        dom::set_style(&country, "stroke-width", "1");
        dom::set_style(&country, "cursor", if visited { "pointer" } else { "default" });
        dom::set_style(&country, "transition", "all 0.3s ease");

        if !visited {
            continue;
        }
        let name = country_name(&code).unwrap_or("");

        let on_enter: Closure<dyn FnMut()> = {
            let country = country.clone();
            let container = container.clone();
            let tooltip = tooltip.clone();
            let name = name.to_string();
            Closure::new(move || {
                dom::set_style(&country, "fill", VISITED_FILL_HOVER);
                dom::set_style(&country, "filter", "url(#glow)");
                dom::set_style(&country, "transform", "scale(1.05)");
                dom::set_style(&country, "transform-origin", "center");
                show_tooltip(&container, &tooltip, &country, &name);
            })
        };
        let _ = country
            .add_event_listener_with_callback("mouseenter", on_enter.as_ref().unchecked_ref());
        on_enter.forget();

        let on_leave: Closure<dyn FnMut()> = {
            let country = country.clone();
            let tooltip = tooltip.clone();
            Closure::new(move || {
                dom::set_style(&country, "fill", VISITED_FILL);
                dom::set_style(&country, "filter", "none");
                dom::set_style(&country, "transform", "scale(1)");
                hide_tooltip(&tooltip);
            })
        };
        let _ = country
            .add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref());
        on_leave.forget();

        visited_elements.push(country);
    }

    init_reveal(&container, visited_elements);
}

fn query_countries(container: &Element) -> Vec<Element> {
    let Ok(list) = container.query_selector_all(".country") else {
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

fn show_tooltip(
    container: &Element,
    slot: &Rc<RefCell<Option<Element>>>,
    country: &Element,
    text: &str,
) {
    if slot.borrow().is_none() {
        let Some(document) = dom::document() else {
            return;
        };
        if let Ok(el) = document.create_element("div") {
            let _ = el.set_attribute("class", "map-tooltip");
            for &(property, value) in TOOLTIP_STYLE {
                dom::set_style(&el, property, value);
            }
            let _ = container.append_child(&el);
            *slot.borrow_mut() = Some(el);
        }
    }

    let slot = slot.borrow();
    let Some(tooltip) = slot.as_ref() else {
        return;
    };
    tooltip.set_text_content(Some(text));

    let rect = country.get_bounding_client_rect();
    let container_rect = container.get_bounding_client_rect();
    let (left, top) = tooltip_position(
        (rect.left(), rect.top(), rect.width()),
        (container_rect.left(), container_rect.top()),
    );
    dom::set_style(tooltip, "left", &format!("{left}px"));
    dom::set_style(tooltip, "top", &format!("{top}px"));
    dom::set_style(tooltip, "transform", "translateX(-50%) translateY(0)");
    dom::set_style(tooltip, "opacity", "1");
}

fn hide_tooltip(slot: &Rc<RefCell<Option<Element>>>) {
    if let Some(tooltip) = slot.borrow().as_ref() {
        dom::set_style(tooltip, "opacity", "0");
        dom::set_style(tooltip, "transform", "translateX(-50%) translateY(-8px)");
    }
}

/// One-shot staggered color-in of the visited countries the first time
/// the map scrolls into view.
fn init_reveal(container: &Element, visited: Vec<Element>) {
    let on_view: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)> =
        Closure::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    observer.disconnect();
                    stagger_reveal(&visited);
                    break;
                }
            }
        });

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from(REVEAL_THRESHOLD));
    if let Ok(observer) =
        IntersectionObserver::new_with_options(on_view.as_ref().unchecked_ref(), &options)
    {
        observer.observe(container);
    }
    on_view.forget();
}

fn stagger_reveal(visited: &[Element]) {
    let Some(window) = dom::window() else {
        return;
    };

    // Reset to the base palette so the sweep is visible
    for element in visited {
        dom::set_style(element, "fill", BASE_FILL);
        dom::set_style(element, "stroke", BASE_STROKE);
    }

    for (i, element) in visited.iter().enumerate() {
        let element = element.clone();
        let paint = Closure::once_into_js(move || {
            dom::set_style(&element, "fill", VISITED_FILL);
            dom::set_style(&element, "stroke", VISITED_STROKE);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            paint.unchecked_ref(),
            i as i32 * STAGGER_INTERVAL_MS,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn visited_codes_are_unique() {
        let codes: HashSet<&str> = VISITED_COUNTRIES.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes.len(), VISITED_COUNTRIES.len());
    }

    #[test]
    fn every_visited_country_has_a_name() {
        for (code, name) in VISITED_COUNTRIES {
            assert_eq!(code.len(), 2, "{code} is not an alpha-2 code");
            assert!(!name.is_empty(), "{code} has no display name");
        }
    }

    #[test]
    fn every_visited_country_has_a_map_path() {
        for (code, _) in VISITED_COUNTRIES {
            assert!(
                WORLD_MAP_SVG.contains(&format!("id=\"{code}\"")),
                "{code} missing from the map SVG"
            );
        }
    }

    #[test]
    fn country_name_lookup() {
        assert_eq!(country_name("JP"), Some("Japan"));
        assert_eq!(country_name("ZZ"), None);
        assert!(is_visited("CA"));
        assert!(!is_visited("AU"));
    }

    #[test]
    fn tooltip_centers_over_the_country() {
        // Country at viewport (500, 300), 40 wide; container at (100, 200)
        let (left, top) = tooltip_position((500.0, 300.0, 40.0), (100.0, 200.0));
        assert_eq!(left, 420.0);
        assert_eq!(top, 70.0);
    }
}
