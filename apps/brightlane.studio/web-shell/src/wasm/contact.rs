use super::*;

const CONTACT_API_GLOBAL: &str = "__BL_CONTACT_API__";
const SENDING_LABEL: &str = "Sending...";
const NETWORK_FAILURE_ALERT: &str = "Something went wrong. Try again later.";
const ERROR_MESSAGE_CLASS: &str = "error-message";
const ERROR_COLOR: &str = "#ef4444";

/// Server acknowledgement for a submission, success or rejection alike.
#[derive(Debug, Deserialize)]
struct SubmitAck {
    success: bool,
    message: String,
}

struct FormField {
    element: HtmlElement,
    name: String,
    value: String,
    required: bool,
    is_email: bool,
}

pub(super) fn init_contact_form() -> Result<(), String> {
    let document = document()?;
    let Some(form) = document
        .query_selector(".contact-form")
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
    else {
        return Ok(());
    };

    CONTACT_SUBMIT_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let form_handle = form.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            event.prevent_default();
            handle_submit(form_handle.clone());
        }));
        let _ = form.add_event_listener_with_callback("submit", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    CONTACT_INPUT_HANDLERS.with(|slot| {
        if !slot.borrow().is_empty() {
            return;
        }
        let mut handlers = Vec::new();
        for field in query_all_in(&form, "input, textarea") {
            let field_handle = field.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                clear_field_error(&field_handle);
            }));
            let _ =
                field.add_event_listener_with_callback("input", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }
        *slot.borrow_mut() = handlers;
    });

    Ok(())
}

fn handle_submit(form: HtmlFormElement) {
    let fields = collect_fields(&form);

    let snapshots: Vec<FieldValue<'_>> = fields
        .iter()
        .map(|field| FieldValue {
            name: &field.name,
            value: &field.value,
            required: field.required,
            is_email: field.is_email,
        })
        .collect();
    let errors = validate_fields(&snapshots);
    if !errors.is_empty() {
        for error in &errors {
            if let Some(field) = fields.iter().find(|field| field.name == error.field) {
                highlight_field_error(&field.element, error.message);
            }
        }
        return;
    }

    let value_of = |name: &str| {
        fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.clone())
            .unwrap_or_default()
    };
    let company = value_of("company");
    let payload = build_payload(
        &value_of("name"),
        &value_of("email"),
        if company.is_empty() {
            None
        } else {
            Some(company.as_str())
        },
        &value_of("message"),
    );

    let button = form
        .query_selector("button[type='submit']")
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok());
    let original_label = button
        .as_ref()
        .and_then(|button| button.text_content())
        .unwrap_or_default();
    if let Some(button) = &button {
        button.set_text_content(Some(SENDING_LABEL));
        button.set_disabled(true);
    }

    spawn_local(async move {
        match submit_payload(&payload).await {
            Ok(ack) if ack.success => {
                show_alert(&ack.message);
                form.reset();
            }
            Ok(ack) => {
                show_alert(&format!("Error: {}", ack.message));
            }
            Err(error) => {
                report_runtime_failure("contact submission", &error);
                show_alert(NETWORK_FAILURE_ALERT);
            }
        }
        // The control is restored on every path, including failures.
        if let Some(button) = &button {
            button.set_text_content(Some(&original_label));
            button.set_disabled(false);
        }
    });
}

async fn submit_payload(payload: &ContactPayload) -> Result<SubmitAck, String> {
    let url = submit_url()?;
    let body = serde_json::to_string(payload)
        .map_err(|error| format!("failed to encode payload: {error}"))?;
    let response = Request::post(&url)
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .body(body)
        .map_err(|error| format!("failed to build request: {error}"))?
        .send()
        .await
        .map_err(|error| format!("request failed: {error}"))?;

    // Rejections carry the same envelope shape, so decode regardless of
    // status and surface the server's message.
    response
        .json::<SubmitAck>()
        .await
        .map_err(|error| format!("failed to decode response: {error}"))
}

fn submit_url() -> Result<String, String> {
    let window = window()?;
    let configured = js_sys::Reflect::get(&window, &JsValue::from_str(CONTACT_API_GLOBAL))
        .ok()
        .and_then(|value| value.as_string());
    let hostname = window
        .location()
        .hostname()
        .map_err(|_| "hostname is unavailable".to_string())?;
    Ok(resolve_submit_url(configured.as_deref(), &hostname))
}

fn collect_fields(form: &HtmlFormElement) -> Vec<FormField> {
    let mut fields = Vec::new();
    for element in query_all_in(form, "input, textarea") {
        let Some(name) = element
            .get_attribute("name")
            .filter(|name| !name.is_empty())
        else {
            continue;
        };
        let (value, is_email) = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            (input.value(), input.type_() == "email")
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            (textarea.value(), false)
        } else {
            continue;
        };
        fields.push(FormField {
            required: element.has_attribute("required"),
            element,
            name,
            value,
            is_email,
        });
    }
    fields
}

fn highlight_field_error(element: &HtmlElement, message: &str) {
    clear_field_error(element);
    let Ok(document) = document() else {
        return;
    };
    let Ok(note) = document.create_element("div") else {
        return;
    };
    note.set_class_name(ERROR_MESSAGE_CLASS);
    if let Ok(note) = note.dyn_into::<HtmlElement>() {
        let style = note.style();
        let _ = style.set_property("color", ERROR_COLOR);
        let _ = style.set_property("font-size", "0.875rem");
        let _ = style.set_property("margin-top", "0.5rem");
        note.set_text_content(Some(message));
        if let Some(parent) = element.parent_element() {
            let _ = parent.append_child(&note);
        }
    }
    let _ = element.style().set_property("border-color", ERROR_COLOR);
}

fn clear_field_error(element: &HtmlElement) {
    if let Some(parent) = element.parent_element()
        && let Ok(Some(note)) = parent.query_selector(&format!(".{ERROR_MESSAGE_CLASS}"))
    {
        note.remove();
    }
    let _ = element.style().remove_property("border-color");
}

fn show_alert(message: &str) {
    if let Ok(window) = window() {
        let _ = window.alert_with_message(message);
    }
}
