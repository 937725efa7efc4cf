//! Serializes a form's controls into a [`FormPayload`].

use shared::protocol::{FormPayload, TYPE_FIELD};

use crate::dom::{Document, DomError, NodeId};

const SKIPPED_INPUT_TYPES: [&str; 5] = ["submit", "button", "reset", "image", "file"];

/// Collects the form's entries in tree order, then appends `type` when the
/// submitter is a submit control inside `form` declaring a non-empty
/// `data-type`.
pub fn collect_form_data(
    doc: &Document,
    form: NodeId,
    submitter: Option<NodeId>,
) -> Result<FormPayload, DomError> {
    if !doc.contains(form) {
        return Err(DomError::UnknownNode(form));
    }

    let mut payload = FormPayload::new();
    for control in doc.descendants(form) {
        let Some(name) = doc.attribute(control, "name").filter(|name| !name.is_empty()) else {
            continue;
        };
        if doc.has_attribute(control, "disabled") {
            continue;
        }

        match doc.tag(control).unwrap_or_default() {
            "input" => {
                if let Some(value) = input_value(doc, control) {
                    payload.append(name, value);
                }
            }
            "textarea" => {
                payload.append(name, textarea_value(doc, control));
            }
            "select" => {
                for value in selected_values(doc, control) {
                    payload.append(name, value);
                }
            }
            _ => {}
        }
    }

    if let Some(kind) = submitter
        .filter(|node| doc.is_ancestor(form, *node) && is_submit_control(doc, *node))
        .and_then(|node| submit_type(doc, node))
    {
        payload.append(TYPE_FIELD, kind);
    }

    Ok(payload)
}

/// The `data-type` designation of a submit control, if it has a usable one.
pub fn submit_type(doc: &Document, submitter: NodeId) -> Option<&str> {
    doc.attribute(submitter, "data-type")
        .filter(|value| !value.trim().is_empty())
}

pub fn is_submit_control(doc: &Document, node: NodeId) -> bool {
    let kind = doc
        .attribute(node, "type")
        .unwrap_or_default()
        .to_ascii_lowercase();
    match doc.tag(node) {
        Some("button") => kind.is_empty() || kind == "submit",
        Some("input") => kind == "submit" || kind == "image",
        _ => false,
    }
}

fn input_value(doc: &Document, input: NodeId) -> Option<String> {
    let kind = doc
        .attribute(input, "type")
        .unwrap_or("text")
        .to_ascii_lowercase();
    if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
        return None;
    }
    if kind == "checkbox" || kind == "radio" {
        if !doc.has_attribute(input, "checked") {
            return None;
        }
        return Some(doc.attribute(input, "value").unwrap_or("on").to_string());
    }
    Some(doc.attribute(input, "value").unwrap_or_default().to_string())
}

// A textarea's value is its text content; a `value` attribute is only a fallback.
fn textarea_value(doc: &Document, textarea: NodeId) -> &str {
    doc.text(textarea)
        .filter(|text| !text.is_empty())
        .or_else(|| doc.attribute(textarea, "value"))
        .unwrap_or_default()
}

fn selected_values(doc: &Document, select: NodeId) -> Vec<String> {
    let options: Vec<NodeId> = doc
        .descendants(select)
        .into_iter()
        .filter(|node| doc.is_tag(*node, "option") && !doc.has_attribute(*node, "disabled"))
        .collect();

    let selected: Vec<NodeId> = options
        .iter()
        .copied()
        .filter(|option| doc.has_attribute(*option, "selected"))
        .collect();

    // A single select shows its last `selected` option, or the first option.
    let chosen = if doc.has_attribute(select, "multiple") {
        selected
    } else if let Some(last) = selected.last() {
        vec![*last]
    } else {
        options.into_iter().take(1).collect()
    };

    chosen
        .into_iter()
        .map(|option| match doc.attribute(option, "value") {
            Some(value) => value.to_string(),
            None => collapse_whitespace(doc.text(option).unwrap_or_default()),
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "tests/form_data_tests.rs"]
mod tests;
