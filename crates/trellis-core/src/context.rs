//! Ambient values passed down the instance tree without prop threading.
//!
//! A [`Context`] carries a default value; `provide` wraps a subtree in a
//! Provider node and `use_context` resolves the nearest enclosing provider
//! at render time, subscribing the consumer so provider value changes
//! re-render it in the same update pass.

use std::any::Any;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::hooks::{with_render_frame, ContextSlot, Hook};
use crate::tree::{InstanceKind, NodeId, Tree};
use crate::vdom::{VChildren, VNode, VProvider};

pub type ContextId = usize;

static NEXT_CONTEXT_ID: AtomicUsize = AtomicUsize::new(1);

fn next_context_id() -> ContextId {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Type-erased context identity plus the value-equality check providers use
/// to decide whether subscribers must re-render.
#[derive(Clone)]
pub struct ProviderSpec {
    pub id: ContextId,
    eq: Rc<dyn Fn(&dyn Any, &dyn Any) -> bool>,
}

impl ProviderSpec {
    pub(crate) fn values_equal(&self, previous: &dyn Any, next: &dyn Any) -> bool {
        (self.eq)(previous, next)
    }
}

struct ContextInner<T> {
    id: ContextId,
    default: T,
}

pub struct Context<T> {
    inner: Rc<ContextInner<T>>,
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Context<T> {
    pub fn new(default: T) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id: next_context_id(),
                default,
            }),
        }
    }

    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Provider node: `context.provide(value, children)`.
    pub fn provide(&self, value: T, children: impl Into<VChildren>) -> VNode {
        VNode::Provider(VProvider {
            key: None,
            context: ProviderSpec {
                id: self.inner.id,
                eq: Rc::new(|previous: &dyn Any, next: &dyn Any| {
                    match (previous.downcast_ref::<T>(), next.downcast_ref::<T>()) {
                        (Some(previous), Some(next)) => previous == next,
                        _ => false,
                    }
                }),
            },
            value: Rc::new(value),
            children: Rc::new(children.into()),
        })
    }
}

fn find_provider(tree: &Tree, from: NodeId, context: ContextId) -> Option<NodeId> {
    let mut current = tree.node(from).parent;
    while let Some(id) = current {
        if let InstanceKind::Provider(provider) = &tree.node(id).kind {
            if provider.vdom.context.id == context {
                return Some(id);
            }
        }
        current = tree.node(id).parent;
    }
    None
}

fn subscribe(tree: &mut Tree, provider: NodeId, consumer: NodeId) {
    let consumers = &mut tree.node_mut(provider).as_provider_mut().consumers;
    if !consumers.contains(&consumer) {
        consumers.push(consumer);
    }
}

fn unsubscribe(tree: &mut Tree, provider: NodeId, consumer: NodeId) {
    if tree.contains(provider) {
        tree.node_mut(provider)
            .as_provider_mut()
            .consumers
            .retain(|id| *id != consumer);
    }
}

/// Consumes the nearest enclosing provider's value, or the context default
/// when no provider is mounted above the component.
pub fn use_context<T: Clone + 'static>(context: &Context<T>) -> T {
    with_render_frame(|frame| {
        let component = frame.component;
        let id = context.inner.id;
        let tree = unsafe { &mut *frame.tree };

        let index = frame.cursor;
        if index >= frame.hooks.len() {
            assert!(frame.initial, "hooks changed between renders");
            let provider = find_provider(tree, component, id);
            if let Some(provider) = provider {
                subscribe(tree, provider, component);
            }
            frame.hooks.push(Hook::Context(ContextSlot {
                context: id,
                provider,
            }));
        }
        let provider = match &mut frame.hooks[index] {
            Hook::Context(slot) => {
                if slot.context != id {
                    // same slot bound to a different context this render:
                    // move the subscription over
                    if let Some(previous) = slot.provider.take() {
                        unsubscribe(tree, previous, component);
                    }
                    let provider = find_provider(tree, component, id);
                    if let Some(provider) = provider {
                        subscribe(tree, provider, component);
                    }
                    slot.context = id;
                    slot.provider = provider;
                }
                slot.provider
            }
            _ => panic!("hooks changed between renders"),
        };
        frame.cursor += 1;

        match provider {
            Some(provider) => {
                let instance = tree.node(provider).as_provider();
                let value = instance
                    .pending
                    .as_ref()
                    .map(|pending| &pending.value)
                    .unwrap_or(&instance.vdom.value);
                value
                    .downcast_ref::<T>()
                    .cloned()
                    .expect("context value type mismatch")
            }
            None => context.inner.default.clone(),
        }
    })
}

#[allow(non_snake_case)]
pub fn useContext<T: Clone + 'static>(context: &Context<T>) -> T {
    use_context(context)
}
