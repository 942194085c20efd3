//! Declarative tree description.
//!
//! A render produces [`VNode`] values: an immutable description of the
//! desired UI, rebuilt from scratch on every pass. The reconciler compares
//! it against the mounted instance tree; nothing in this module is ever
//! mutated after construction.

use std::any::Any;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::context::ProviderSpec;
use crate::dom::{DomId, Event, EventHandler};
use crate::hooks::Ref;

/// Text payload: a string or a number, rendered the way the host prints it.
#[derive(Clone, Debug, PartialEq)]
pub enum VText {
    Str(Rc<str>),
    Num(f64),
}

impl VText {
    pub fn to_text(&self) -> String {
        match self {
            VText::Str(s) => s.to_string(),
            VText::Num(n) => format_number(*n),
        }
    }
}

impl From<&str> for VText {
    fn from(value: &str) -> Self {
        VText::Str(Rc::from(value))
    }
}

impl From<String> for VText {
    fn from(value: String) -> Self {
        VText::Str(Rc::from(value.as_str()))
    }
}

impl From<f64> for VText {
    fn from(value: f64) -> Self {
        VText::Num(value)
    }
}

impl From<i64> for VText {
    fn from(value: i64) -> Self {
        VText::Num(value as f64)
    }
}

impl From<i32> for VText {
    fn from(value: i32) -> Self {
        VText::Num(value as f64)
    }
}

impl From<usize> for VText {
    fn from(value: usize) -> Self {
        VText::Num(value as f64)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.trunc() == n && n.abs() < 9.007_199_254_740_992e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Explicit reconciliation key; untagged siblings get positional keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VKey {
    Str(Rc<str>),
    Num(i64),
}

impl From<&str> for VKey {
    fn from(value: &str) -> Self {
        VKey::Str(Rc::from(value))
    }
}

impl From<String> for VKey {
    fn from(value: String) -> Self {
        VKey::Str(Rc::from(value.as_str()))
    }
}

impl From<i64> for VKey {
    fn from(value: i64) -> Self {
        VKey::Num(value)
    }
}

impl From<i32> for VKey {
    fn from(value: i32) -> Self {
        VKey::Num(value as i64)
    }
}

impl From<usize> for VKey {
    fn from(value: usize) -> Self {
        VKey::Num(value as i64)
    }
}

/// One attribute/property value.
#[derive(Clone)]
pub enum PropValue {
    Str(Rc<str>),
    Num(f64),
    Bool(bool),
    Style(Style),
    Handler(EventHandler),
    Ref(Ref<Option<DomId>>),
}

impl PropValue {
    /// `Object.is`-style sameness: strings and booleans by value, numbers by
    /// bit pattern, handlers and refs by pointer. Styles are never "same"
    /// here; they are diffed property by property in the commit layer.
    pub fn same(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Num(a), PropValue::Num(b)) => a.to_bits() == b.to_bits(),
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Ref(a), PropValue::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Text written through `setAttribute`; `None` means the attribute is
    /// absent (missing value or `false`).
    pub fn as_attr_text(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.to_string()),
            PropValue::Num(n) => Some(format_number(*n)),
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Bool(false) => None,
            PropValue::Style(_) | PropValue::Handler(_) | PropValue::Ref(_) => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value.as_str()))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Num(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Num(value as f64)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Num(value as f64)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Num(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

/// Nested style map carried under the synthetic `style` key.
#[derive(Clone, Default)]
pub struct Style {
    properties: IndexMap<String, StyleValue>,
}

#[derive(Clone, PartialEq)]
pub enum StyleValue {
    Str(Rc<str>),
    Num(f64),
}

impl StyleValue {
    pub fn to_css(&self) -> String {
        match self {
            StyleValue::Str(s) => s.to_string(),
            StyleValue::Num(n) => format_number(*n),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(Rc::from(value))
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(Rc::from(value.as_str()))
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Num(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Num(value as f64)
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.properties.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Attribute/property bag. Insertion-ordered so attribute application is
/// deterministic. Component children travel here; element children live on
/// the element node itself.
#[derive(Clone, Default)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
    children: Option<Rc<VChildren>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Registers an event handler under the `on`-prefixed key the commit
    /// layer diffs by identity, e.g. `on("click", ..)` becomes `onclick`.
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.handler(event, EventHandler::new(f))
    }

    pub fn handler(mut self, event: &str, handler: EventHandler) -> Self {
        self.entries
            .insert(format!("on{event}"), PropValue::Handler(handler));
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.entries.insert("style".into(), PropValue::Style(style));
        self
    }

    pub fn node_ref(mut self, node_ref: Ref<Option<DomId>>) -> Self {
        self.entries.insert("ref".into(), PropValue::Ref(node_ref));
        self
    }

    pub fn with_children(mut self, children: impl Into<VChildren>) -> Self {
        self.children = Some(Rc::new(children.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    pub fn children(&self) -> Option<&VChildren> {
        self.children.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Component render function. Identity (the function pointer) doubles as
/// the reconciliation type of the component.
pub type RenderFn = fn(&Props) -> VChildren;

#[derive(Clone)]
pub struct VElement {
    pub tag: &'static str,
    pub key: Option<VKey>,
    pub props: Props,
    pub children: Rc<VChildren>,
}

#[derive(Clone)]
pub struct VFragment {
    pub key: Option<VKey>,
    pub children: Rc<VChildren>,
}

#[derive(Clone)]
pub struct VComponent {
    pub key: Option<VKey>,
    pub render: RenderFn,
    pub props: Props,
}

impl VComponent {
    pub fn same_render(&self, other: &VComponent) -> bool {
        self.render as usize == other.render as usize
    }
}

#[derive(Clone)]
pub struct VProvider {
    pub key: Option<VKey>,
    pub context: ProviderSpec,
    pub value: Rc<dyn Any>,
    pub children: Rc<VChildren>,
}

/// Closed set of declarative node kinds.
#[derive(Clone)]
pub enum VNode {
    Text(VText),
    Element(VElement),
    Fragment(VFragment),
    Component(VComponent),
    Provider(VProvider),
}

impl VNode {
    pub fn key(&self) -> Option<&VKey> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(el) => el.key.as_ref(),
            VNode::Fragment(fragment) => fragment.key.as_ref(),
            VNode::Component(component) => component.key.as_ref(),
            VNode::Provider(provider) => provider.key.as_ref(),
        }
    }

    /// Attaches an explicit reconciliation key. Text nodes cannot carry
    /// keys; wrap them in a keyed fragment instead.
    pub fn keyed(mut self, key: impl Into<VKey>) -> Self {
        let key = Some(key.into());
        match &mut self {
            VNode::Text(_) => {}
            VNode::Element(el) => el.key = key,
            VNode::Fragment(fragment) => fragment.key = key,
            VNode::Component(component) => component.key = key,
            VNode::Provider(provider) => provider.key = key,
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            VNode::Text(_) => "text",
            VNode::Element(_) => "element",
            VNode::Fragment(_) => "fragment",
            VNode::Component(_) => "component",
            VNode::Provider(_) => "provider",
        }
    }
}

/// Child position value: a node, a hole, or a nested list. Holes let
/// conditional rendering return nothing; [`sanitize`] flattens the rest.
#[derive(Clone, Default)]
pub enum VChildren {
    #[default]
    None,
    Node(VNode),
    Many(Vec<VChildren>),
}

impl From<VNode> for VChildren {
    fn from(node: VNode) -> Self {
        VChildren::Node(node)
    }
}

impl From<Option<VNode>> for VChildren {
    fn from(node: Option<VNode>) -> Self {
        match node {
            Some(node) => VChildren::Node(node),
            None => VChildren::None,
        }
    }
}

impl From<&str> for VChildren {
    fn from(value: &str) -> Self {
        VChildren::Node(text(value))
    }
}

impl From<String> for VChildren {
    fn from(value: String) -> Self {
        VChildren::Node(text(value))
    }
}

impl From<Vec<VNode>> for VChildren {
    fn from(nodes: Vec<VNode>) -> Self {
        VChildren::Many(nodes.into_iter().map(VChildren::Node).collect())
    }
}

impl From<Vec<VChildren>> for VChildren {
    fn from(children: Vec<VChildren>) -> Self {
        VChildren::Many(children)
    }
}

impl FromIterator<VNode> for VChildren {
    fn from_iter<I: IntoIterator<Item = VNode>>(iter: I) -> Self {
        VChildren::Many(iter.into_iter().map(VChildren::Node).collect())
    }
}

impl<const N: usize> From<[VNode; N]> for VChildren {
    fn from(nodes: [VNode; N]) -> Self {
        VChildren::Many(nodes.into_iter().map(VChildren::Node).collect())
    }
}

/// Flattens arbitrarily nested children and drops holes, yielding the flat
/// declarative array the reconciler diffs.
pub fn sanitize(children: &VChildren) -> Vec<VNode> {
    let mut clean = Vec::new();
    collect(children, &mut clean);
    clean
}

fn collect(children: &VChildren, clean: &mut Vec<VNode>) {
    match children {
        VChildren::None => {}
        VChildren::Node(node) => clean.push(node.clone()),
        VChildren::Many(nested) => {
            for child in nested {
                collect(child, clean);
            }
        }
    }
}

pub fn text(value: impl Into<VText>) -> VNode {
    VNode::Text(value.into())
}

pub fn element(tag: &'static str, props: Props, children: impl Into<VChildren>) -> VNode {
    VNode::Element(VElement {
        tag,
        key: None,
        props,
        children: Rc::new(children.into()),
    })
}

pub fn fragment(children: impl Into<VChildren>) -> VNode {
    VNode::Fragment(VFragment {
        key: None,
        children: Rc::new(children.into()),
    })
}

pub fn component(render: RenderFn, props: Props) -> VNode {
    VNode::Component(VComponent {
        key: None,
        render,
        props,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_flattens_and_drops_holes() {
        let children = VChildren::Many(vec![
            VChildren::None,
            VChildren::Node(text("a")),
            VChildren::Many(vec![
                VChildren::Node(text("b")),
                VChildren::None,
                VChildren::Node(text("c")),
            ]),
        ]);
        let flat = sanitize(&children);
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn numbers_format_like_the_host() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(-0.5), "-0.5");
    }

    #[test]
    fn prop_sameness_follows_identity_rules() {
        let a = PropValue::from("x");
        let b = PropValue::from("x");
        assert!(a.same(&b));

        let h1 = PropValue::Handler(EventHandler::new(|_| {}));
        let h2 = h1.clone();
        let h3 = PropValue::Handler(EventHandler::new(|_| {}));
        assert!(h1.same(&h2));
        assert!(!h1.same(&h3));

        let nan = PropValue::Num(f64::NAN);
        assert!(nan.same(&nan.clone()));
        assert!(!PropValue::Num(0.0).same(&PropValue::Num(-0.0)));
    }
}
