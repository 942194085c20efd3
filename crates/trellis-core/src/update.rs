//! Diff engine: expands dirty nodes and reconciles child lists.
//!
//! The dirty stack drains LIFO, so a component that dirties another during
//! its own render processes the newly dirty one before siblings queued
//! earlier. Child reconciliation is a keyed three-phase merge: removal,
//! matching, insertion. DOM detachment is only recorded here; the actual
//! document mutation happens at the start of the commit sweep.

use std::collections::VecDeque;

use crate::collections::{HashMap, HashSet};
use crate::dom::{Dom, DomId};
use crate::hooks;
use crate::schedule::{PendingRemoval, RuntimeHandle, Update};
use crate::tree::{create_child, InstanceKind, NodeId, Tree};
use crate::vdom::{sanitize, PropValue, VKey, VNode};

/// Reconciliation identity of one child: its explicit key, or a positional
/// key scoped to the run of unkeyed siblings so implicit keys never collide
/// with reordered explicit ones.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum ChildKey {
    Explicit(VKey),
    Implicit(usize),
}

fn vnode_keys(children: &[VNode]) -> Vec<ChildKey> {
    let mut implicit = 0;
    let mut seen: HashSet<ChildKey> = HashSet::default();
    let mut keys = Vec::with_capacity(children.len());
    for child in children {
        let key = match child.key() {
            Some(key) => ChildKey::Explicit(key.clone()),
            None => {
                let key = ChildKey::Implicit(implicit);
                implicit += 1;
                key
            }
        };
        assert!(
            seen.insert(key.clone()),
            "keys must be unique among siblings, found duplicate {key:?}"
        );
        keys.push(key);
    }
    keys
}

fn instance_keys(tree: &Tree, children: &[NodeId]) -> Vec<ChildKey> {
    let mut implicit = 0;
    let mut seen: HashSet<ChildKey> = HashSet::default();
    let mut keys = Vec::with_capacity(children.len());
    for child in children {
        let key = match tree.node(*child).key() {
            Some(key) => ChildKey::Explicit(key.clone()),
            None => {
                let key = ChildKey::Implicit(implicit);
                implicit += 1;
                key
            }
        };
        assert!(
            seen.insert(key.clone()),
            "keys must be unique among siblings, found duplicate {key:?}"
        );
        keys.push(key);
    }
    keys
}

/// Drains the dirty stack: re-renders components through the hook engine,
/// re-expands pending declarative children, and recursively re-diffs.
pub(crate) fn perform_updates(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    update: &mut Update,
    runtime: &RuntimeHandle,
) {
    while let Some(id) = update.needs_update.pop() {
        if !tree.contains(id) || !tree.node(id).needs_update {
            continue;
        }
        log::debug!("updating {} node {id}", tree.node(id).kind_name());
        {
            let instance = tree.node_mut(id);
            instance.needs_update = false;
            instance.needs_commit = true;
        }
        update.needs_commit.push(id);

        match &tree.node(id).kind {
            InstanceKind::Root(_) | InstanceKind::Text(_) => {}
            InstanceKind::Fragment(_) => {
                let children = {
                    let InstanceKind::Fragment(fragment) = &tree.node(id).kind else {
                        unreachable!()
                    };
                    fragment
                        .pending
                        .as_ref()
                        .map(|pending| sanitize(&pending.children))
                };
                if let Some(children) = children {
                    tree.node_mut(id).set_pending_children(children);
                }
            }
            InstanceKind::Element(_) => {
                let expanded = {
                    let InstanceKind::Element(el) = &tree.node(id).kind else {
                        unreachable!()
                    };
                    el.pending.as_ref().map(|pending| {
                        let node_ref = match pending.props.get("ref") {
                            Some(PropValue::Ref(node_ref)) => Some((node_ref.clone(), el.dom)),
                            _ => None,
                        };
                        (node_ref, sanitize(&pending.children))
                    })
                };
                if let Some((node_ref, children)) = expanded {
                    if let Some((node_ref, dom_id)) = node_ref {
                        node_ref.set(Some(dom_id));
                    }
                    tree.node_mut(id).set_pending_children(children);
                }
            }
            InstanceKind::Component(_) => {
                let children = hooks::render_with_hooks(tree, id, runtime, false);
                let pending = sanitize(&children);
                tree.node_mut(id).set_pending_children(pending);
            }
            InstanceKind::Provider(_) => {
                let (consumers, pending_children) = {
                    let instance = tree.node_mut(id);
                    let InstanceKind::Provider(provider) = &mut instance.kind else {
                        unreachable!()
                    };
                    match &provider.pending {
                        Some(pending) => {
                            let changed = !pending
                                .context
                                .values_equal(provider.vdom.value.as_ref(), pending.value.as_ref());
                            let consumers = if changed {
                                provider.consumers.clone()
                            } else {
                                Vec::new()
                            };
                            (consumers, Some(sanitize(&pending.children)))
                        }
                        None => (Vec::new(), None),
                    }
                };
                if let Some(children) = pending_children {
                    tree.node_mut(id).set_pending_children(children);
                }
                // subscribers re-render in this same pass, after the
                // provider's own subtree settles
                for consumer in consumers {
                    if tree.contains(consumer) && !tree.node(consumer).needs_update {
                        log::debug!("scheduling context consumer {consumer}");
                        tree.node_mut(consumer).needs_update = true;
                        update.needs_update.insert(0, consumer);
                    }
                }
            }
        }

        update_children(tree, dom, update, runtime, id);
    }
}

/// Reconciles a container's live child array against its freshly computed
/// declarative children.
pub(crate) fn update_children(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    update: &mut Update,
    runtime: &RuntimeHandle,
    parent: NodeId,
) {
    let Some(pending) = tree.node_mut(parent).take_pending_children() else {
        return;
    };
    let live_count = tree.children_of(parent).len();

    // Single matching child skips the keyed merge.
    if pending.len() == 1
        && live_count == 1
        && tree.node(tree.children_of(parent)[0]).key() == pending[0].key()
    {
        let child = tree.children_of(parent)[0];
        let vnode = pending.into_iter().next().expect("checked length");
        update_child(tree, dom, update, runtime, child, vnode);
        return;
    }

    // Empty next list: unmount everything, no key matching needed.
    if pending.is_empty() {
        let children: Vec<NodeId> = tree.children_of(parent).to_vec();
        for child in children {
            teardown_child(tree, update, child);
        }
        tree.node_mut(parent).children_mut().clear();
        return;
    }

    // Empty live list: every declarative child is a first mount.
    if live_count == 0 {
        vnode_keys(&pending);
        let mut created = Vec::with_capacity(pending.len());
        for (index, vnode) in pending.into_iter().enumerate() {
            let child = create_child(tree, dom, runtime, vnode, parent, index);
            update.needs_update.push(child);
            created.push(child);
        }
        *tree.node_mut(parent).children_mut() = created;
        return;
    }

    let next_keys = vnode_keys(&pending);
    let live: Vec<NodeId> = tree.children_of(parent).to_vec();
    let live_keys = instance_keys(tree, &live);
    let next_set: HashSet<ChildKey> = next_keys.iter().cloned().collect();

    // Removal phase: live children with no next counterpart go away.
    let mut prev_map: HashMap<ChildKey, NodeId> = HashMap::default();
    let mut kept = Vec::with_capacity(live.len());
    for (child, key) in live.into_iter().zip(live_keys) {
        if next_set.contains(&key) {
            prev_map.insert(key, child);
            kept.push(child);
        } else {
            teardown_child(tree, update, child);
        }
    }
    *tree.node_mut(parent).children_mut() = kept;

    // Matching phase re-indexes survivors in place; insertion phase creates
    // the rest at their ordinal positions. Physical reordering is left to
    // the commit sweep.
    for (index, (vnode, key)) in pending.into_iter().zip(next_keys).enumerate() {
        match prev_map.get(&key) {
            Some(&existing) => {
                tree.node_mut(existing).index = index;
                update_child(tree, dom, update, runtime, existing, vnode);
            }
            None => {
                let child = create_child(tree, dom, runtime, vnode, parent, index);
                update.needs_update.push(child);
                let children = tree.node_mut(parent).children_mut();
                let at = index.min(children.len());
                children.insert(at, child);
            }
        }
    }
}

/// Attaches the pending declarative node to a kind-compatible instance, or
/// tears the instance down and rebuilds in place when the kind changed:
/// the existing DOM node or hook state cannot be reused across a type
/// change.
pub(crate) fn update_child(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    update: &mut Update,
    runtime: &RuntimeHandle,
    child: NodeId,
    vnode: VNode,
) {
    if should_replace(tree, child, &vnode) {
        log::debug!(
            "replacing {} node {child} with {} node",
            tree.node(child).kind_name(),
            vnode.kind_name()
        );
        let parent = tree.node(child).parent.expect("detached child");
        let index = tree.node(child).index;
        let position = tree
            .children_of(parent)
            .iter()
            .position(|id| *id == child)
            .expect("child not in parent");
        teardown_child(tree, update, child);
        let replacement = create_child(tree, dom, runtime, vnode, parent, index);
        tree.node_mut(parent).children_mut()[position] = replacement;
        update.needs_update.push(replacement);
        return;
    }

    {
        let instance = tree.node_mut(child);
        match (&mut instance.kind, vnode) {
            (InstanceKind::Text(text), VNode::Text(vnode)) => text.pending = Some(vnode),
            (InstanceKind::Element(el), VNode::Element(vnode)) => el.pending = Some(vnode),
            (InstanceKind::Fragment(fragment), VNode::Fragment(vnode)) => {
                fragment.pending = Some(vnode)
            }
            (InstanceKind::Component(component), VNode::Component(vnode)) => {
                component.pending = Some(vnode)
            }
            (InstanceKind::Provider(provider), VNode::Provider(vnode)) => {
                provider.pending = Some(vnode)
            }
            _ => unreachable!("kind compatibility checked before attach"),
        }
        instance.needs_update = true;
    }
    update.needs_update.push(child);
}

fn should_replace(tree: &Tree, child: NodeId, vnode: &VNode) -> bool {
    match (&tree.node(child).kind, vnode) {
        (InstanceKind::Text(_), VNode::Text(_)) => false,
        (InstanceKind::Element(el), VNode::Element(vnode)) => el.vdom.tag != vnode.tag,
        (InstanceKind::Fragment(_), VNode::Fragment(_)) => false,
        (InstanceKind::Component(component), VNode::Component(vnode)) => {
            !component.vdom.same_render(vnode)
        }
        (InstanceKind::Provider(provider), VNode::Provider(vnode)) => {
            provider.vdom.context.id != vnode.context.id
        }
        _ => true,
    }
}

/// Runs cleanups, records the DOM detachments for the commit sweep, and
/// drops the subtree from the arena. The caller maintains the parent's
/// child array.
pub(crate) fn teardown_child(tree: &mut Tree, update: &mut Update, child: NodeId) {
    log::debug!("unmounting {} node {child}", tree.node(child).kind_name());
    prepare_to_unmount(tree, child);
    let parent = tree.node(child).parent.expect("detached child");
    let dom_parent = tree.closest_dom_ancestor(parent);
    collect_dom_removals(tree, update, child, dom_parent);
    tree.remove_subtree(child);
}

/// Clears dirty flags, resets element refs and runs component cleanups for
/// the whole subtree, breadth-first, before any DOM node is detached.
pub(crate) fn prepare_to_unmount(tree: &mut Tree, child: NodeId) {
    let mut queue = VecDeque::new();
    queue.push_back(child);
    while let Some(id) = queue.pop_front() {
        {
            let instance = tree.node_mut(id);
            instance.needs_update = false;
            instance.needs_commit = false;
        }
        match &tree.node(id).kind {
            InstanceKind::Element(el) => {
                if let Some(PropValue::Ref(node_ref)) = el.vdom.props.get("ref") {
                    node_ref.set(None);
                }
            }
            InstanceKind::Component(_) => {
                hooks::run_component_cleanups(tree, id);
            }
            _ => {}
        }
        queue.extend(tree.children_of(id).iter().copied());
    }
}

/// Records removal of every topmost DOM node in the subtree. Nested DOM
/// nodes leave the document together with their detached parent.
fn collect_dom_removals(tree: &Tree, update: &mut Update, child: NodeId, dom_parent: DomId) {
    let mut stack = vec![child];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        if let Some(dom) = node.dom_id() {
            update.removals.push(PendingRemoval {
                parent: dom_parent,
                node: dom,
            });
        } else {
            stack.extend(node.children().iter().copied());
        }
    }
}
