use super::*;

pub(super) fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}

pub(super) fn document() -> Result<web_sys::Document, String> {
    window()?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

pub(super) fn body(document: &web_sys::Document) -> Result<HtmlElement, String> {
    document
        .body()
        .ok_or_else(|| "document body is unavailable".to_string())
}

pub(super) fn query_one(
    root: &web_sys::Document,
    selector: &str,
) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub(super) fn query_all(root: &web_sys::Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    collect_elements(&list)
}

pub(super) fn query_all_in(root: &web_sys::Element, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    collect_elements(&list)
}

fn collect_elements(list: &web_sys::NodeList) -> Vec<HtmlElement> {
    let mut elements = Vec::new();
    for index in 0..list.length() {
        if let Some(node) = list.get(index)
            && let Ok(element) = node.dyn_into::<HtmlElement>()
        {
            elements.push(element);
        }
    }
    elements
}

pub(super) fn set_class_active(element: &HtmlElement, class: &str, active: bool) {
    let _ = element.class_list().toggle_with_force(class, active);
}

/// Smooth-scrolls the window to a vertical offset.
pub(super) fn scroll_window_to(window: &web_sys::Window, top: f64) {
    let options = web_sys::ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub(super) fn intersection_observer(
    callback: &Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
    threshold: f64,
    root_margin: &str,
) -> Result<IntersectionObserver, String> {
    let options = web_sys::IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    options.set_root_margin(root_margin);
    IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
        .map_err(|_| "failed to create intersection observer".to_string())
}

pub(super) fn intersecting_targets(entries: &js_sys::Array) -> Vec<HtmlElement> {
    let mut targets = Vec::new();
    for entry in entries.iter() {
        if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>()
            && entry.is_intersecting()
            && let Ok(element) = entry.target().dyn_into::<HtmlElement>()
        {
            targets.push(element);
        }
    }
    targets
}

pub(super) fn report_init_failure(behavior: &str, error: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!(
        "brightlane web shell: {behavior} init failed: {error}"
    )));
}

pub(super) fn report_runtime_failure(context: &str, error: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!(
        "brightlane web shell: {context}: {error}"
    )));
}
