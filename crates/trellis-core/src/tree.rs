//! Mounted instance tree.
//!
//! Instances live in an arena addressed by [`NodeId`]; parent, child and
//! sibling relationships are handle fields, never references. Slots are not
//! reused after removal, so a stale id fails loudly instead of aliasing a
//! newer instance.

use crate::dom::{Dom, DomId};
use crate::hooks::{self, Hook};
use crate::schedule::RuntimeHandle;
use crate::vdom::{sanitize, VComponent, VElement, VFragment, VNode, VProvider, VText};

pub type NodeId = usize;

pub struct Instance {
    pub parent: Option<NodeId>,
    /// Target position among siblings. Consistent with the parent's child
    /// array at all times outside an in-progress reconciliation pass.
    pub index: usize,
    pub mounted: bool,
    pub needs_update: bool,
    pub needs_commit: bool,
    pub kind: InstanceKind,
}

pub enum InstanceKind {
    Root(RootInstance),
    Text(TextInstance),
    Element(ElementInstance),
    Fragment(FragmentInstance),
    Component(ComponentInstance),
    Provider(ProviderInstance),
}

pub struct RootInstance {
    pub dom: DomId,
    pub children: Vec<NodeId>,
    pub pending_children: Option<Vec<VNode>>,
}

pub struct TextInstance {
    pub dom: DomId,
    pub value: VText,
    pub pending: Option<VText>,
}

pub struct ElementInstance {
    pub dom: DomId,
    pub vdom: VElement,
    pub pending: Option<VElement>,
    pub children: Vec<NodeId>,
    pub pending_children: Option<Vec<VNode>>,
}

pub struct FragmentInstance {
    pub vdom: VFragment,
    pub pending: Option<VFragment>,
    pub children: Vec<NodeId>,
    pub pending_children: Option<Vec<VNode>>,
}

pub struct ComponentInstance {
    pub vdom: VComponent,
    pub pending: Option<VComponent>,
    pub children: Vec<NodeId>,
    pub pending_children: Option<Vec<VNode>>,
    pub hooks: Vec<Hook>,
    pub unmounting: bool,
}

pub struct ProviderInstance {
    pub vdom: VProvider,
    pub pending: Option<VProvider>,
    pub children: Vec<NodeId>,
    pub pending_children: Option<Vec<VNode>>,
    pub consumers: Vec<NodeId>,
}

impl Instance {
    fn new(parent: Option<NodeId>, index: usize, kind: InstanceKind) -> Self {
        Self {
            parent,
            index,
            mounted: false,
            needs_update: true,
            needs_commit: true,
            kind,
        }
    }

    /// The live host node this instance exclusively controls, if any.
    /// Fragment, Component and Provider instances delegate DOM identity to
    /// their descendants.
    pub fn dom_id(&self) -> Option<DomId> {
        match &self.kind {
            InstanceKind::Root(root) => Some(root.dom),
            InstanceKind::Text(text) => Some(text.dom),
            InstanceKind::Element(el) => Some(el.dom),
            InstanceKind::Fragment(_) | InstanceKind::Component(_) | InstanceKind::Provider(_) => {
                None
            }
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            InstanceKind::Root(root) => &root.children,
            InstanceKind::Element(el) => &el.children,
            InstanceKind::Fragment(fragment) => &fragment.children,
            InstanceKind::Component(component) => &component.children,
            InstanceKind::Provider(provider) => &provider.children,
            InstanceKind::Text(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match &mut self.kind {
            InstanceKind::Root(root) => &mut root.children,
            InstanceKind::Element(el) => &mut el.children,
            InstanceKind::Fragment(fragment) => &mut fragment.children,
            InstanceKind::Component(component) => &mut component.children,
            InstanceKind::Provider(provider) => &mut provider.children,
            InstanceKind::Text(_) => panic!("text instances own no children"),
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.kind, InstanceKind::Text(_))
    }

    pub fn take_pending_children(&mut self) -> Option<Vec<VNode>> {
        match &mut self.kind {
            InstanceKind::Root(root) => root.pending_children.take(),
            InstanceKind::Element(el) => el.pending_children.take(),
            InstanceKind::Fragment(fragment) => fragment.pending_children.take(),
            InstanceKind::Component(component) => component.pending_children.take(),
            InstanceKind::Provider(provider) => provider.pending_children.take(),
            InstanceKind::Text(_) => None,
        }
    }

    pub fn set_pending_children(&mut self, pending: Vec<VNode>) {
        match &mut self.kind {
            InstanceKind::Root(root) => root.pending_children = Some(pending),
            InstanceKind::Element(el) => el.pending_children = Some(pending),
            InstanceKind::Fragment(fragment) => fragment.pending_children = Some(pending),
            InstanceKind::Component(component) => component.pending_children = Some(pending),
            InstanceKind::Provider(provider) => provider.pending_children = Some(pending),
            InstanceKind::Text(_) => panic!("text instances own no children"),
        }
    }

    pub fn as_component(&self) -> &ComponentInstance {
        match &self.kind {
            InstanceKind::Component(component) => component,
            _ => panic!("instance is not a component"),
        }
    }

    pub fn as_component_mut(&mut self) -> &mut ComponentInstance {
        match &mut self.kind {
            InstanceKind::Component(component) => component,
            _ => panic!("instance is not a component"),
        }
    }

    pub fn as_provider(&self) -> &ProviderInstance {
        match &self.kind {
            InstanceKind::Provider(provider) => provider,
            _ => panic!("instance is not a provider"),
        }
    }

    pub fn as_provider_mut(&mut self) -> &mut ProviderInstance {
        match &mut self.kind {
            InstanceKind::Provider(provider) => provider,
            _ => panic!("instance is not a provider"),
        }
    }

    /// Reconciliation key of the committed declarative node.
    pub fn key(&self) -> Option<&crate::vdom::VKey> {
        match &self.kind {
            InstanceKind::Element(el) => el.vdom.key.as_ref(),
            InstanceKind::Fragment(fragment) => fragment.vdom.key.as_ref(),
            InstanceKind::Component(component) => component.vdom.key.as_ref(),
            InstanceKind::Provider(provider) => provider.vdom.key.as_ref(),
            InstanceKind::Root(_) | InstanceKind::Text(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            InstanceKind::Root(_) => "root",
            InstanceKind::Text(_) => "text",
            InstanceKind::Element(_) => "element",
            InstanceKind::Fragment(_) => "fragment",
            InstanceKind::Component(_) => "component",
            InstanceKind::Provider(_) => "provider",
        }
    }
}

#[derive(Default)]
pub struct Tree {
    nodes: Vec<Option<Instance>>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(instance));
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> &Instance {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .expect("instance missing")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Instance {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .expect("instance missing")
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Drops the instance and its whole subtree from the arena. Slots stay
    /// vacant; ids are never handed out twice.
    pub fn remove_subtree(&mut self, id: NodeId) {
        let Some(Some(instance)) = self.nodes.get_mut(id).map(Option::take) else {
            return;
        };
        for child in instance.children() {
            self.remove_subtree(*child);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// DOM node of the nearest DOM-backed instance at or above `id`.
    pub fn closest_dom_ancestor(&self, id: NodeId) -> DomId {
        let mut current = id;
        loop {
            let node = self.node(current);
            if let Some(dom) = node.dom_id() {
                return dom;
            }
            current = node.parent.expect("no dom ancestor found");
        }
    }

    /// First DOM node in document order inside the subtree at `id`.
    pub fn closest_dom_descendant(&self, id: NodeId) -> Option<DomId> {
        let node = self.node(id);
        if let Some(dom) = node.dom_id() {
            return Some(dom);
        }
        for child in node.children() {
            if let Some(dom) = self.closest_dom_descendant(*child) {
                return Some(dom);
            }
        }
        None
    }

    /// Insertion anchor for `id`: the DOM node of the nearest following
    /// sibling, searching forward through DOM-transparent containers and
    /// then up through ancestors that own no DOM node themselves.
    pub fn next_dom_sibling(&self, id: NodeId) -> Option<DomId> {
        let mut current = id;
        loop {
            let node = self.node(current);
            let parent = node.parent?;
            let siblings = self.children_of(parent);
            for sibling in siblings.iter().skip(node.index + 1) {
                if let Some(dom) = self.closest_dom_descendant(*sibling) {
                    return Some(dom);
                }
            }
            if self.node(parent).dom_id().is_some() {
                return None;
            }
            current = parent;
        }
    }
}

/// Creates the root instance for a freshly resolved mount anchor.
pub(crate) fn create_root(tree: &mut Tree, anchor: DomId, pending: Vec<VNode>) -> NodeId {
    let id = tree.insert(Instance::new(
        None,
        0,
        InstanceKind::Root(RootInstance {
            dom: anchor,
            children: Vec::new(),
            pending_children: Some(pending),
        }),
    ));
    tree.set_root(id);
    id
}

/// Instantiates a declarative node that has no previous counterpart.
/// Text and element instances get their backing DOM node here (created
/// detached; attachment happens in the commit pass). Components render once
/// through the hook engine.
pub(crate) fn create_child(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    runtime: &RuntimeHandle,
    vnode: VNode,
    parent: NodeId,
    index: usize,
) -> NodeId {
    match vnode {
        VNode::Text(value) => {
            let dom_id = dom.create_text(&value.to_text());
            tree.insert(Instance::new(
                Some(parent),
                index,
                InstanceKind::Text(TextInstance {
                    dom: dom_id,
                    value,
                    pending: None,
                }),
            ))
        }
        VNode::Element(vdom) => {
            let dom_id = dom.create_element(vdom.tag);
            let pending_children = sanitize(&vdom.children);
            tree.insert(Instance::new(
                Some(parent),
                index,
                InstanceKind::Element(ElementInstance {
                    dom: dom_id,
                    vdom,
                    pending: None,
                    children: Vec::new(),
                    pending_children: Some(pending_children),
                }),
            ))
        }
        VNode::Fragment(vdom) => {
            let pending_children = sanitize(&vdom.children);
            tree.insert(Instance::new(
                Some(parent),
                index,
                InstanceKind::Fragment(FragmentInstance {
                    vdom,
                    pending: None,
                    children: Vec::new(),
                    pending_children: Some(pending_children),
                }),
            ))
        }
        VNode::Provider(vdom) => {
            let pending_children = sanitize(&vdom.children);
            tree.insert(Instance::new(
                Some(parent),
                index,
                InstanceKind::Provider(ProviderInstance {
                    vdom,
                    pending: None,
                    children: Vec::new(),
                    pending_children: Some(pending_children),
                    consumers: Vec::new(),
                }),
            ))
        }
        VNode::Component(vdom) => {
            let id = tree.insert(Instance::new(
                Some(parent),
                index,
                InstanceKind::Component(ComponentInstance {
                    vdom,
                    pending: None,
                    children: Vec::new(),
                    pending_children: None,
                    hooks: Vec::new(),
                    unmounting: false,
                }),
            ));
            let children = hooks::render_with_hooks(tree, id, runtime, true);
            let pending = sanitize(&children);
            tree.node_mut(id).set_pending_children(pending);
            id
        }
    }
}
