//! Rust/WASM entrypoint for the Brightlane marketing page behaviors.
//!
//! Every page behavior has one initializer. Initializers are idempotent
//! (thread-local closure slots guard re-entry) and no-ops when their
//! elements are missing, so the same bundle serves every page of the site.
//! Pure logic lives in `brightlane-client-core`; this crate only wires it
//! to the DOM.

#![allow(clippy::needless_pass_by_value)]

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    use brightlane_client_core::counter::{COUNTER_STEP_MS, CounterAnimation};
    use brightlane_client_core::endpoint::resolve_submit_url;
    use brightlane_client_core::form::{ContactPayload, FieldValue, build_payload, validate_fields};
    use brightlane_client_core::slider::SliderState;
    use brightlane_client_core::viewport::{
        anchor_scroll_top, back_to_top_visible, header_blurred, is_mobile,
    };
    use gloo_net::http::Request;
    use gloo_timers::future::sleep;
    use serde::Deserialize;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{
        HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlImageElement, HtmlInputElement,
        HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, KeyboardEvent,
    };

    mod contact;
    mod dom;
    mod effects;
    mod nav;

    use contact::*;
    use dom::*;
    use effects::*;
    use nav::*;

    thread_local! {
        static NAV_TOGGLE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static NAV_LINK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static NAV_OUTSIDE_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static ANCHOR_CLICK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static HEADER_SCROLL_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static REVEAL_OBSERVER_HANDLER: RefCell<Option<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>> = const { RefCell::new(None) };
        static COUNTER_OBSERVER_HANDLER: RefCell<Option<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>> = const { RefCell::new(None) };
        static HOVER_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static BACK_TO_TOP_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static BACK_TO_TOP_SCROLL_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static SLIDER_STATE: RefCell<Option<SliderState>> = const { RefCell::new(None) };
        static SLIDER_CONTROL_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static CONTACT_SUBMIT_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static CONTACT_INPUT_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static IMAGE_ERROR_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static RESIZE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static KEYBOARD_TAB_HANDLER: RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>> = const { RefCell::new(None) };
        static KEYBOARD_MOUSE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static LOADER_DISMISS_STARTED: Cell<bool> = const { Cell::new(false) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        boot();
    }

    fn boot() {
        let initializers: [(&str, fn() -> Result<(), String>); 12] = [
            ("loader", init_loader),
            ("mobile-menu", init_mobile_menu),
            ("smooth-scroll", init_smooth_scroll),
            ("counters", init_counters),
            ("contact-form", init_contact_form),
            ("scroll-effects", init_scroll_effects),
            ("hover-transforms", init_hover_transforms),
            ("back-to-top", init_back_to_top),
            ("testimonial-slider", init_testimonial_slider),
            ("image-fallback", init_image_fallback),
            ("responsive-layout", init_responsive_layout),
            ("keyboard-navigation", init_keyboard_navigation),
        ];

        for (name, init) in initializers {
            if let Err(error) = init() {
                report_init_failure(name, &error);
            }
        }
    }
}
