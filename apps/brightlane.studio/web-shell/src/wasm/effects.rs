use super::*;

const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/600x400/2563eb/ffffff?text=Image+Placeholder";
const PLACEHOLDER_IMAGE_ALT: &str = "Placeholder image";

const LOADER_HIDE_DELAY_MS: u64 = 1500;

/// The page loader stays up for a short beat after boot, then fades via the
/// stylesheet's `hidden` class. Pages without a loader skip this entirely.
pub(super) fn init_loader() -> Result<(), String> {
    let document = document()?;
    let Some(loader) = query_one(&document, ".loader") else {
        return Ok(());
    };

    LOADER_DISMISS_STARTED.with(|started| {
        if started.replace(true) {
            return;
        }
        spawn_local(async move {
            sleep(Duration::from_millis(LOADER_HIDE_DELAY_MS)).await;
            let _ = loader.class_list().add_1("hidden");
        });
    });

    Ok(())
}

/// Stat counters ramp up once, the first time they scroll into view.
pub(super) fn init_counters() -> Result<(), String> {
    let document = document()?;
    let counters = query_all(&document, ".stat-number");
    if counters.is_empty() {
        return Ok(());
    }

    COUNTER_OBSERVER_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::wrap(Box::new(
            move |entries, observer: IntersectionObserver| {
                for element in intersecting_targets(&entries) {
                    observer.unobserve(&element);
                    let target = element
                        .get_attribute("data-count")
                        .and_then(|raw| raw.trim().parse::<u64>().ok());
                    match target {
                        Some(target) => animate_counter(element, target),
                        None => report_runtime_failure(
                            "counter animation",
                            "stat element is missing a numeric data-count",
                        ),
                    }
                }
            },
        ));
        let observer = intersection_observer(&callback, 0.5, "0px 0px -100px 0px")?;
        for counter in &counters {
            observer.observe(counter);
        }
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

fn animate_counter(element: HtmlElement, target: u64) {
    spawn_local(async move {
        let mut animation = CounterAnimation::new(target);
        loop {
            sleep(Duration::from_millis(u64::from(COUNTER_STEP_MS))).await;
            match animation.tick() {
                Some(frame) => {
                    element.set_text_content(Some(&frame.label));
                    if frame.done {
                        break;
                    }
                }
                None => break,
            }
        }
    });
}

/// Header backdrop blur past the scroll threshold, plus the one-shot
/// fade-in reveal for cards, steps and testimonials.
pub(super) fn init_scroll_effects() -> Result<(), String> {
    let document = document()?;

    if let Some(header) = query_one(&document, "header") {
        let style = header.style();
        let _ = style.set_property("background", "white");
        let _ = style.set_property("backdrop-filter", "none");

        let window = window()?;
        HEADER_SCROLL_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let window_handle = window.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                let scroll_y = window_handle.page_y_offset().unwrap_or(0.0);
                let _ = header.style().set_property(
                    "backdrop-filter",
                    if header_blurred(scroll_y) {
                        "blur(10px)"
                    } else {
                        "none"
                    },
                );
            }));
            let _ = window
                .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref());
            *slot.borrow_mut() = Some(callback);
        });
    }

    let revealables = query_all(
        &document,
        ".service-card, .portfolio-item, .process-step, .testimonial-card",
    );
    if revealables.is_empty() {
        return Ok(());
    }

    REVEAL_OBSERVER_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::wrap(Box::new(
            move |entries, observer: IntersectionObserver| {
                for element in intersecting_targets(&entries) {
                    let _ = element.class_list().add_1("animate-in");
                    observer.unobserve(&element);
                }
            },
        ));
        let observer = intersection_observer(&callback, 0.1, "0px 0px -50px 0px")?;
        for element in &revealables {
            observer.observe(element);
        }
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

pub(super) fn init_hover_transforms() -> Result<(), String> {
    let document = document()?;

    HOVER_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();

        for card in query_all(&document, ".service-card") {
            push_transform_on(&card, "mouseenter", "translateY(-10px) scale(1.02)", &mut handlers);
            push_transform_on(&card, "mouseleave", "translateY(0) scale(1)", &mut handlers);
        }

        for item in query_all(&document, ".portfolio-item") {
            let image = item
                .query_selector("img")
                .ok()
                .flatten()
                .and_then(|element| element.dyn_into::<HtmlElement>().ok());
            let content = item
                .query_selector(".portfolio-content")
                .ok()
                .flatten()
                .and_then(|element| element.dyn_into::<HtmlElement>().ok());

            let enter_image = image.clone();
            let enter_content = content.clone();
            let enter = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                if let Some(image) = &enter_image {
                    let _ = image.style().set_property("transform", "scale(1.05)");
                }
                if let Some(content) = &enter_content {
                    let _ = content.style().set_property("transform", "translateY(-5px)");
                }
            }));
            let _ = item
                .add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref());
            handlers.push(enter);

            let leave = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                if let Some(image) = &image {
                    let _ = image.style().set_property("transform", "scale(1)");
                }
                if let Some(content) = &content {
                    let _ = content.style().set_property("transform", "translateY(0)");
                }
            }));
            let _ = item
                .add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref());
            handlers.push(leave);
        }

        for button in query_all(&document, ".cta-button") {
            push_transform_on(&button, "mouseenter", "translateY(-3px) scale(1.05)", &mut handlers);
            push_transform_on(&button, "mouseleave", "translateY(0) scale(1)", &mut handlers);
            push_transform_on(&button, "mousedown", "translateY(1px) scale(0.95)", &mut handlers);
            push_transform_on(&button, "mouseup", "translateY(-3px) scale(1.05)", &mut handlers);
        }

        for link in query_all(&document, ".social-links a") {
            push_transform_on(&link, "mouseenter", "translateY(-3px) rotate(5deg)", &mut handlers);
            push_transform_on(&link, "mouseleave", "translateY(0) rotate(0)", &mut handlers);
        }

        *slot.borrow_mut() = handlers;
    });

    Ok(())
}

fn push_transform_on(
    element: &HtmlElement,
    event_name: &str,
    transform: &'static str,
    handlers: &mut Vec<Closure<dyn FnMut(web_sys::Event)>>,
) {
    let element_handle = element.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
        let _ = element_handle.style().set_property("transform", transform);
    }));
    let _ = element.add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref());
    handlers.push(callback);
}

/// Testimonial slider: the active card/dot pair tracks one [`SliderState`].
pub(super) fn init_testimonial_slider() -> Result<(), String> {
    let document = document()?;
    let cards = query_all(&document, ".testimonial-card");
    let Some(state) = SliderState::new(cards.len()) else {
        return Ok(());
    };

    SLIDER_STATE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(state);
        }
    });
    apply_slider_state();

    SLIDER_CONTROL_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();

        if let Some(prev) = query_one(&document, ".testimonial-prev") {
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                with_slider(|state| {
                    state.prev();
                });
            }));
            let _ =
                prev.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }

        if let Some(next) = query_one(&document, ".testimonial-next") {
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                with_slider(|state| {
                    state.next();
                });
            }));
            let _ =
                next.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }

        for (index, dot) in query_all(&document, ".testimonial-dots .dot")
            .into_iter()
            .enumerate()
        {
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                with_slider(|state| {
                    state.select(index);
                });
            }));
            let _ =
                dot.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }

        *slot.borrow_mut() = handlers;
    });

    Ok(())
}

fn with_slider(mutate: impl FnOnce(&mut SliderState)) {
    SLIDER_STATE.with(|slot| {
        if let Some(state) = slot.borrow_mut().as_mut() {
            mutate(state);
        }
    });
    apply_slider_state();
}

fn apply_slider_state() {
    let Some(state) = SLIDER_STATE.with(|slot| *slot.borrow()) else {
        return;
    };
    let Ok(document) = document() else {
        return;
    };
    for (index, card) in query_all(&document, ".testimonial-card")
        .into_iter()
        .enumerate()
    {
        set_class_active(&card, "active", state.is_active(index));
    }
    for (index, dot) in query_all(&document, ".testimonial-dots .dot")
        .into_iter()
        .enumerate()
    {
        set_class_active(&dot, "active", state.is_active(index));
    }
}

/// Swaps images that fail to load for a neutral placeholder.
pub(super) fn init_image_fallback() -> Result<(), String> {
    let document = document()?;

    IMAGE_ERROR_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();
        for element in query_all(&document, "img") {
            let Ok(image) = element.dyn_into::<HtmlImageElement>() else {
                continue;
            };
            let image_handle = image.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                // The placeholder itself failing must not loop.
                if image_handle.src() == PLACEHOLDER_IMAGE_URL {
                    return;
                }
                image_handle.set_src(PLACEHOLDER_IMAGE_URL);
                image_handle.set_alt(PLACEHOLDER_IMAGE_ALT);
            }));
            let _ =
                image.add_event_listener_with_callback("error", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }
        *slot.borrow_mut() = handlers;
    });

    Ok(())
}
