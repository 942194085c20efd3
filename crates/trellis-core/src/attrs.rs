//! Attribute reconciliation.
//!
//! Diffs two flat attribute bags key by key. The synthetic `style` key
//! diffs a nested property map, `on*` keys diff listeners by identity, the
//! input `value` property writes through the live DOM property, and
//! boolean values toggle attribute presence.

use crate::dom::{Dom, DomError, DomId};
use crate::vdom::{Props, PropValue, Style, StyleValue};

pub(crate) fn reconcile_attributes(
    dom: &mut dyn Dom,
    id: DomId,
    next: &Props,
    prev: &Props,
) -> Result<(), DomError> {
    for (name, prev_value) in prev.iter() {
        update_attribute(dom, id, name, next.get(name), Some(prev_value))?;
    }
    for (name, next_value) in next.iter() {
        if !prev.contains(name) {
            update_attribute(dom, id, name, Some(next_value), None)?;
        }
    }
    Ok(())
}

/// First application of a freshly created element's attributes.
pub(crate) fn set_attributes(dom: &mut dyn Dom, id: DomId, props: &Props) -> Result<(), DomError> {
    for (name, value) in props.iter() {
        update_attribute(dom, id, name, Some(value), None)?;
    }
    Ok(())
}

fn update_attribute(
    dom: &mut dyn Dom,
    id: DomId,
    name: &str,
    next: Option<&PropValue>,
    prev: Option<&PropValue>,
) -> Result<(), DomError> {
    // `children` is structure, `key` is reconciliation identity, and `ref`
    // is written during the update pass; none of them is an attribute.
    if name == "children" || name == "key" || name == "ref" {
        return Ok(());
    }
    if name == "value" {
        return update_value(dom, id, next, prev);
    }
    if name == "style" {
        return update_style(dom, id, next, prev);
    }
    if let Some(event) = name.strip_prefix("on") {
        return update_listener(dom, id, &event.to_ascii_lowercase(), next, prev);
    }
    update_other(dom, id, name, next, prev)
}

fn same(a: Option<&PropValue>, b: Option<&PropValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same(b),
        _ => false,
    }
}

fn update_value(
    dom: &mut dyn Dom,
    id: DomId,
    next: Option<&PropValue>,
    prev: Option<&PropValue>,
) -> Result<(), DomError> {
    if same(next, prev) {
        return Ok(());
    }
    match next.and_then(PropValue::as_attr_text) {
        Some(text) => dom.set_value(id, Some(&text)),
        None => dom.set_value(id, None),
    }
}

fn style_of(value: Option<&PropValue>) -> Option<&Style> {
    match value {
        None => None,
        Some(PropValue::Style(style)) => Some(style),
        Some(_) => panic!("style attribute expects a style map"),
    }
}

fn same_style_value(a: &StyleValue, b: &StyleValue) -> bool {
    match (a, b) {
        (StyleValue::Str(a), StyleValue::Str(b)) => a == b,
        (StyleValue::Num(a), StyleValue::Num(b)) => a.to_bits() == b.to_bits(),
        _ => false,
    }
}

fn update_style(
    dom: &mut dyn Dom,
    id: DomId,
    next: Option<&PropValue>,
    prev: Option<&PropValue>,
) -> Result<(), DomError> {
    let next = style_of(next);
    let prev = style_of(prev);

    if let Some(prev) = prev {
        for (name, prev_value) in prev.iter() {
            let next_value = next.and_then(|style| style.get(name));
            match next_value {
                Some(next_value) if same_style_value(next_value, prev_value) => {}
                Some(next_value) => {
                    dom.set_style_property(id, &camel_to_dash(name), &next_value.to_css())?;
                }
                None => dom.remove_style_property(id, &camel_to_dash(name))?,
            }
        }
    }
    if let Some(next) = next {
        for (name, next_value) in next.iter() {
            if prev.map_or(true, |style| style.get(name).is_none()) {
                dom.set_style_property(id, &camel_to_dash(name), &next_value.to_css())?;
            }
        }
    }
    Ok(())
}

fn update_listener(
    dom: &mut dyn Dom,
    id: DomId,
    event: &str,
    next: Option<&PropValue>,
    prev: Option<&PropValue>,
) -> Result<(), DomError> {
    if same(next, prev) {
        return Ok(());
    }
    if matches!(prev, Some(PropValue::Handler(_))) {
        dom.remove_listener(id, event)?;
    }
    if let Some(PropValue::Handler(handler)) = next {
        dom.add_listener(id, event, handler.clone())?;
    }
    Ok(())
}

fn update_other(
    dom: &mut dyn Dom,
    id: DomId,
    name: &str,
    next: Option<&PropValue>,
    prev: Option<&PropValue>,
) -> Result<(), DomError> {
    if same(next, prev) {
        return Ok(());
    }
    match next.and_then(PropValue::as_attr_text) {
        Some(text) => dom.set_attribute(id, name, &text),
        None => {
            if prev.is_some() {
                dom.remove_attribute(id, name)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn camel_to_dash(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
