use super::*;

const BACK_TO_TOP_CSS: &str = "position: fixed; bottom: 30px; right: 30px; \
width: 50px; height: 50px; background: var(--gradient); color: white; \
border: none; border-radius: 50%; font-size: 1.2rem; cursor: pointer; \
opacity: 0; transform: translateY(20px); transition: all 0.3s ease; \
z-index: 1000; box-shadow: 0 4px 15px rgba(0,0,0,0.2);";

const KEYBOARD_NAV_STYLE_ID: &str = "keyboard-nav-style";
const KEYBOARD_NAV_CSS: &str = "\
.keyboard-nav button:focus, .keyboard-nav a:focus,\n\
.keyboard-nav input:focus, .keyboard-nav textarea:focus {\n\
    outline: 2px solid #2563eb; outline-offset: 2px;\n\
}";

pub(super) fn init_mobile_menu() -> Result<(), String> {
    let document = document()?;
    let Some(menu_button) = query_one(&document, ".mobile-menu-btn") else {
        return Ok(());
    };
    let Some(nav_links) = query_one(&document, ".nav-links") else {
        return Ok(());
    };
    let page_body = body(&document)?;

    NAV_TOGGLE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let button = menu_button.clone();
        let links = nav_links.clone();
        let body = page_body.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let open = !links.class_list().contains("active");
            set_menu_open(&button, &links, &body, open);
        }));
        let _ = menu_button
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    NAV_LINK_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();
        for link in query_all_in(&nav_links, "a") {
            let button = menu_button.clone();
            let links = nav_links.clone();
            let body = page_body.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                set_menu_open(&button, &links, &body, false);
            }));
            let _ =
                link.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }
        *slot.borrow_mut() = handlers;
    });

    NAV_OUTSIDE_CLICK_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let button = menu_button.clone();
        let links = nav_links.clone();
        let body = page_body.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            if !links.class_list().contains("active") {
                return;
            }
            let Some(target) = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
            else {
                return;
            };
            if links.contains(Some(&target)) || button.contains(Some(&target)) {
                return;
            }
            set_menu_open(&button, &links, &body, false);
        }));
        let _ =
            document.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    Ok(())
}

fn set_menu_open(button: &HtmlElement, links: &HtmlElement, body: &HtmlElement, open: bool) {
    set_class_active(links, "active", open);
    set_class_active(button, "active", open);
    set_class_active(body, "no-scroll", open);
    if let Ok(Some(icon)) = button.query_selector("i") {
        icon.set_class_name(if open { "fas fa-times" } else { "fas fa-bars" });
    }
}

pub(super) fn init_smooth_scroll() -> Result<(), String> {
    let document = document()?;
    let anchors = query_all(&document, "a[href^='#']");
    if anchors.is_empty() {
        return Ok(());
    }

    ANCHOR_CLICK_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();
        for anchor in anchors {
            let anchor_handle = anchor.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
                event.prevent_default();
                scroll_to_anchor_target(&anchor_handle);
            }));
            let _ = anchor
                .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }
        *slot.borrow_mut() = handlers;
    });

    Ok(())
}

fn scroll_to_anchor_target(anchor: &HtmlElement) {
    let href = anchor.get_attribute("href").unwrap_or_default();
    if href == "#" {
        return;
    }
    let Ok(window) = window() else {
        return;
    };
    let Ok(document) = document() else {
        return;
    };
    let Some(target) = query_one(&document, &href) else {
        return;
    };
    let header_height = query_one(&document, "header")
        .map(|header| f64::from(header.offset_height()))
        .unwrap_or(0.0);
    scroll_window_to(
        &window,
        anchor_scroll_top(f64::from(target.offset_top()), header_height),
    );
}

/// Creates the floating button if markup does not already carry one, then
/// wires visibility to the scroll position.
pub(super) fn init_back_to_top() -> Result<(), String> {
    let document = document()?;
    let page_body = body(&document)?;
    let button = match query_one(&document, ".back-to-top") {
        Some(existing) => existing,
        None => {
            let element = document
                .create_element("button")
                .map_err(|_| "failed to create back-to-top button".to_string())?;
            element.set_class_name("back-to-top");
            let button = element
                .dyn_into::<HtmlElement>()
                .map_err(|_| "back-to-top button is not HtmlElement".to_string())?;
            button.set_inner_html("<i class=\"fas fa-chevron-up\"></i>");
            button.style().set_css_text(BACK_TO_TOP_CSS);
            page_body
                .append_child(&button)
                .map_err(|_| "failed to append back-to-top button".to_string())?;
            button
        }
    };

    BACK_TO_TOP_CLICK_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            if let Ok(window) = window() {
                scroll_window_to(&window, 0.0);
            }
        }));
        let _ =
            button.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    let window = window()?;
    BACK_TO_TOP_SCROLL_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let button_handle = button.clone();
        let window_handle = window.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let scroll_y = window_handle.page_y_offset().unwrap_or(0.0);
            let visible = back_to_top_visible(scroll_y);
            let style = button_handle.style();
            let _ = style.set_property("opacity", if visible { "1" } else { "0" });
            let _ = style.set_property(
                "transform",
                if visible {
                    "translateY(0)"
                } else {
                    "translateY(20px)"
                },
            );
        }));
        let _ =
            window.add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    Ok(())
}

pub(super) fn init_responsive_layout() -> Result<(), String> {
    apply_responsive_layout();

    let window = window()?;
    RESIZE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            apply_responsive_layout();
        }));
        let _ =
            window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    Ok(())
}

fn apply_responsive_layout() {
    let Ok(window) = window() else {
        return;
    };
    let Ok(document) = document() else {
        return;
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let mobile = is_mobile(width);
    for stats in query_all(&document, ".hero-stats") {
        let style = stats.style();
        let _ = style.set_property("flex-direction", if mobile { "column" } else { "row" });
        let _ = style.set_property("gap", if mobile { "1.5rem" } else { "3rem" });
    }
}

pub(super) fn init_keyboard_navigation() -> Result<(), String> {
    let document = document()?;
    let page_body = body(&document)?;

    if document.get_element_by_id(KEYBOARD_NAV_STYLE_ID).is_none() {
        let style = document
            .create_element("style")
            .map_err(|_| "failed to create focus style element".to_string())?;
        style.set_id(KEYBOARD_NAV_STYLE_ID);
        style.set_text_content(Some(KEYBOARD_NAV_CSS));
        let head = document
            .head()
            .ok_or_else(|| "document head is unavailable".to_string())?;
        head.append_child(&style)
            .map_err(|_| "failed to append focus style element".to_string())?;
    }

    KEYBOARD_TAB_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let body = page_body.clone();
        let callback = Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(move |event| {
            if event.key() == "Tab" {
                let _ = body.class_list().add_1("keyboard-nav");
            }
        }));
        let _ =
            document.add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    KEYBOARD_MOUSE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let body = page_body.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let _ = body.class_list().remove_1("keyboard-nav");
        }));
        let _ = document
            .add_event_listener_with_callback("mousedown", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    Ok(())
}
