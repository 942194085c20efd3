//! Commit layer: the one synchronous sweep that touches the live document.
//!
//! Queued removals apply first, then each committed node's text/attribute
//! writes, then child arrays are physically reordered against their target
//! indices and unplaced or reordered children are inserted before the DOM
//! node of their next sibling.

use crate::attrs::{reconcile_attributes, set_attributes};
use crate::collections::HashSet;
use crate::dom::{Dom, DomError, DomId};
use crate::schedule::Update;
use crate::tree::{InstanceKind, NodeId, Tree};

pub(crate) fn perform_commits(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    update: &mut Update,
) -> Result<(), DomError> {
    for removal in update.removals.drain(..) {
        dom.remove_child(removal.parent, removal.node)?;
    }

    for position in 0..update.needs_commit.len() {
        let id = update.needs_commit[position];
        if !tree.contains(id) || !tree.node(id).needs_commit {
            continue;
        }
        log::debug!("committing {} node {id}", tree.node(id).kind_name());

        match &tree.node(id).kind {
            InstanceKind::Text(text) => {
                if let Some(pending) = &text.pending {
                    if *pending != text.value {
                        dom.set_text(text.dom, &pending.to_text())?;
                    }
                }
            }
            InstanceKind::Element(el) => {
                if let Some(pending) = &el.pending {
                    reconcile_attributes(dom, el.dom, &pending.props, &el.vdom.props)?;
                }
            }
            InstanceKind::Component(_) => update.needs_effects.push(id),
            InstanceKind::Root(_) | InstanceKind::Fragment(_) | InstanceKind::Provider(_) => {}
        }

        if tree.node(id).is_container() {
            commit_children(tree, dom, id)?;
        }

        promote(tree, id);
        tree.node_mut(id).needs_commit = false;
    }
    Ok(())
}

/// Makes the pending declarative node the committed one.
fn promote(tree: &mut Tree, id: NodeId) {
    match &mut tree.node_mut(id).kind {
        InstanceKind::Root(_) => {}
        InstanceKind::Text(text) => {
            if let Some(pending) = text.pending.take() {
                text.value = pending;
            }
        }
        InstanceKind::Element(el) => {
            if let Some(pending) = el.pending.take() {
                el.vdom = pending;
            }
        }
        InstanceKind::Fragment(fragment) => {
            if let Some(pending) = fragment.pending.take() {
                fragment.vdom = pending;
            }
        }
        InstanceKind::Component(component) => {
            if let Some(pending) = component.pending.take() {
                component.vdom = pending;
            }
        }
        InstanceKind::Provider(provider) => {
            if let Some(pending) = provider.pending.take() {
                provider.vdom = pending;
            }
        }
    }
}

/// Swap-sorts the child array to match the target indices assigned during
/// reconciliation, placing any child that is unmounted or took part in a
/// swap. Walking from the end keeps every anchor lookup inside the already
/// settled suffix.
fn commit_children(tree: &mut Tree, dom: &mut dyn Dom, parent: NodeId) -> Result<(), DomError> {
    let len = tree.children_of(parent).len();
    if len == 0 {
        return Ok(());
    }
    let dom_parent = tree.closest_dom_ancestor(parent);

    let mut position_of = vec![0usize; len];
    for (position, child) in tree.children_of(parent).iter().enumerate() {
        position_of[tree.node(*child).index] = position;
    }

    let mut reordered: HashSet<NodeId> = HashSet::default();
    for target in (0..len).rev() {
        let position = position_of[target];
        let child = tree.children_of(parent)[position];
        if position != target {
            let other = tree.children_of(parent)[target];
            position_of[tree.node(other).index] = position;
            tree.node_mut(parent).children_mut().swap(position, target);
            reordered.insert(child);
            reordered.insert(other);
        }
        if !tree.node(child).mounted || reordered.contains(&child) {
            place_child(tree, dom, child, dom_parent)?;
        }
    }
    Ok(())
}

/// Inserts (or moves) the DOM subtree roots under `child` in front of the
/// next DOM sibling, walking container children back to front so each
/// placed node becomes the anchor for the one before it.
fn place_child(
    tree: &mut Tree,
    dom: &mut dyn Dom,
    child: NodeId,
    dom_parent: DomId,
) -> Result<(), DomError> {
    let mut anchor = tree.next_dom_sibling(child);
    let mut stack: Vec<NodeId> = Vec::new();
    let mut current = Some(child);

    while let Some(id) = current {
        if let Some(dom_id) = tree.node(id).dom_id() {
            if let InstanceKind::Element(el) = &tree.node(id).kind {
                if !tree.node(id).mounted {
                    set_attributes(dom, dom_id, &el.vdom.props)?;
                }
            }
            dom.insert_before(dom_parent, dom_id, anchor)?;
            tree.node_mut(id).mounted = true;
            anchor = Some(dom_id);
        } else {
            tree.node_mut(id).mounted = true;
            stack.extend(tree.children_of(id).iter().copied());
        }
        current = stack.pop();
    }
    Ok(())
}
