//! Browser glue for the hero particle background
//!
//! Owns the requestAnimationFrame loop and the DOM listeners around the
//! pure [`ParticleField`]. Everything lives on the instance (no module
//! statics), and [`ParticleBackground::destroy`] detaches all of it so a
//! single-page app can tear the view down without a reload.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlCanvasElement, MouseEvent};

use crate::canvas2d::CanvasRenderer;
use crate::simulation::{FieldConfig, ParticleField};

/// Delay after the last resize event before the field is rebuilt.
const RESIZE_DEBOUNCE_MS: i32 = 100;

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// State shared between the event closures and the frame loop.
struct Shared {
    field: ParticleField,
    renderer: CanvasRenderer,
    raf: Option<i32>,
    resize_timer: Option<i32>,
    page_visible: bool,
}

/// The running particle background: frame loop plus listeners.
#[wasm_bindgen]
pub struct ParticleBackground {
    shared: Rc<RefCell<Shared>>,
    parent: Element,
    frame: FrameClosure,
    on_mouse_move: Closure<dyn FnMut(MouseEvent)>,
    on_mouse_leave: Closure<dyn FnMut()>,
    on_resize: Closure<dyn FnMut()>,
    on_visibility: Closure<dyn FnMut()>,
    // Kept alive here because the debounce timer fires after `on_resize`
    // returns.
    _apply_resize: Rc<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl ParticleBackground {
    /// Wire the particle background to the canvas with the given id.
    ///
    /// Returns `None` when the canvas is missing from the page, or when
    /// the user prefers reduced motion (the canvas is then hidden and
    /// nothing ever runs). Both are valid, silent outcomes.
    pub fn attach(canvas_id: &str) -> Option<ParticleBackground> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)?
            .dyn_into()
            .ok()?;
        let parent = canvas.parent_element()?;

        if crate::dom::prefers_reduced_motion() {
            let _ = canvas.style().set_property("display", "none");
            return None;
        }

        let renderer = CanvasRenderer::new(canvas.clone()).ok()?;
        let mut field = ParticleField::new(FieldConfig::default(), js_sys::Date::now() as u64);

        let rect = parent.get_bounding_client_rect();
        renderer.resize(rect.width() as u32, rect.height() as u32);
        field.resize(rect.width() as f32, rect.height() as f32);

        let shared = Rc::new(RefCell::new(Shared {
            field,
            renderer,
            raf: None,
            resize_timer: None,
            page_visible: !document.hidden(),
        }));

        // Frame loop. While the page is hidden it only re-arms itself, so
        // motion resumes from the frozen state the moment visibility
        // returns, with no re-initialization.
        let frame: FrameClosure = Rc::new(RefCell::new(None));
        {
            let shared = shared.clone();
            let handle = frame.clone();
            *frame.borrow_mut() = Some(Closure::new(move || {
                {
                    let mut s = shared.borrow_mut();
                    if s.page_visible {
                        s.field.step();
                        s.renderer.render(&s.field);
                    }
                }
                shared.borrow_mut().raf = request_frame(&handle);
            }));
        }

        // Pointer tracked on the parent so the field reacts across the
        // whole hero section, in canvas-local coordinates.
        let on_mouse_move: Closure<dyn FnMut(MouseEvent)> = {
            let shared = shared.clone();
            let canvas = canvas.clone();
            Closure::new(move |event: MouseEvent| {
                let rect = canvas.get_bounding_client_rect();
                shared.borrow_mut().field.set_pointer(
                    event.client_x() as f32 - rect.left() as f32,
                    event.client_y() as f32 - rect.top() as f32,
                );
            })
        };

        let on_mouse_leave: Closure<dyn FnMut()> = {
            let shared = shared.clone();
            Closure::new(move || {
                shared.borrow_mut().field.clear_pointer();
            })
        };

        // Debounced resize: the particle set is rebuilt once, after the
        // drag settles, not on every intermediate layout pass.
        let apply_resize: Rc<Closure<dyn FnMut()>> = Rc::new({
            let shared = shared.clone();
            let parent = parent.clone();
            Closure::new(move || {
                let rect = parent.get_bounding_client_rect();
                let mut s = shared.borrow_mut();
                s.resize_timer = None;
                s.renderer.resize(rect.width() as u32, rect.height() as u32);
                s.field.resize(rect.width() as f32, rect.height() as f32);
            })
        });

        let on_resize: Closure<dyn FnMut()> = {
            let shared = shared.clone();
            let apply = apply_resize.clone();
            Closure::new(move || {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let mut s = shared.borrow_mut();
                if let Some(timer) = s.resize_timer.take() {
                    window.clear_timeout_with_handle(timer);
                }
                s.resize_timer = window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        (*apply).as_ref().unchecked_ref(),
                        RESIZE_DEBOUNCE_MS,
                    )
                    .ok();
            })
        };

        let on_visibility: Closure<dyn FnMut()> = {
            let shared = shared.clone();
            let document = document.clone();
            Closure::new(move || {
                shared.borrow_mut().page_visible = !document.hidden();
            })
        };

        let _ = window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        let _ = parent
            .add_event_listener_with_callback("mousemove", on_mouse_move.as_ref().unchecked_ref());
        let _ = parent.add_event_listener_with_callback(
            "mouseleave",
            on_mouse_leave.as_ref().unchecked_ref(),
        );
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            on_visibility.as_ref().unchecked_ref(),
        );

        shared.borrow_mut().raf = request_frame(&frame);

        Some(ParticleBackground {
            shared,
            parent,
            frame,
            on_mouse_move,
            on_mouse_leave,
            on_resize,
            on_visibility,
            _apply_resize: apply_resize,
        })
    }

    /// Cancel the pending frame request and detach every listener.
    pub fn destroy(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let mut s = self.shared.borrow_mut();
            if let Some(raf) = s.raf.take() {
                let _ = window.cancel_animation_frame(raf);
            }
            if let Some(timer) = s.resize_timer.take() {
                window.clear_timeout_with_handle(timer);
            }
        }

        let _ = window.remove_event_listener_with_callback(
            "resize",
            self.on_resize.as_ref().unchecked_ref(),
        );
        let _ = self.parent.remove_event_listener_with_callback(
            "mousemove",
            self.on_mouse_move.as_ref().unchecked_ref(),
        );
        let _ = self.parent.remove_event_listener_with_callback(
            "mouseleave",
            self.on_mouse_leave.as_ref().unchecked_ref(),
        );
        if let Some(document) = window.document() {
            let _ = document.remove_event_listener_with_callback(
                "visibilitychange",
                self.on_visibility.as_ref().unchecked_ref(),
            );
        }

        // The frame closure holds an Rc back to itself; dropping it here
        // breaks the cycle.
        self.frame.borrow_mut().take();
    }
}

/// Schedule the frame closure for the next display refresh.
fn request_frame(frame: &FrameClosure) -> Option<i32> {
    let window = web_sys::window()?;
    let cell = frame.borrow();
    let closure = cell.as_ref()?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .ok()
}
