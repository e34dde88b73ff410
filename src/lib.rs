//! Interactive behavior for a static portfolio page
//!
//! Compiled to WebAssembly and attached to the host markup: a
//! mouse-reactive particle background behind the hero, navigation
//! behavior, scroll-linked reveals, and an interactive world map of
//! visited countries. The particle simulation is pure Rust with no
//! browser dependencies, so its invariants are unit tested natively;
//! the DOM glue around it stays thin.
//!
//! Every behavior degrades to a silent no-op when its hosting element is
//! missing from the page.

pub mod canvas2d;
mod dom;
pub mod hero;
pub mod nav;
pub mod reveal;
pub mod simulation;
pub mod worldmap;

pub use hero::ParticleBackground;
pub use simulation::{FieldConfig, Particle, ParticleField};

use wasm_bindgen::prelude::*;

/// Install the panic hook for readable errors in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Wire every page behavior.
///
/// Returns the particle background handle (for explicit teardown in a
/// single-page context), or `None` when the canvas is absent or the
/// user prefers reduced motion.
#[wasm_bindgen]
pub fn start() -> Option<ParticleBackground> {
    nav::init();
    reveal::init();
    worldmap::init();
    ParticleBackground::attach("particle-canvas")
}
