//! Hook engine.
//!
//! Each component instance owns an ordered slot vector; a thread-local
//! render frame records which component is rendering and a cursor over its
//! slots. The frame is installed strictly for the duration of one render
//! call. Call order and slot count must match between any two consecutive
//! renders of the same instance; any divergence is a hard error raised
//! before that render's DOM mutations are committed.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use crate::dom::{Event, EventHandler};
use crate::tree::{NodeId, Tree};
use crate::schedule::RuntimeHandle;
use crate::vdom::VChildren;

const HOOKS_CHANGED: &str = "hooks changed between renders";
const HOOKS_OUTSIDE_RENDER: &str = "hooks may only be called during render";

/// Cleanup returned by an effect, run before the next effect or at unmount.
pub type Cleanup = Box<dyn FnOnce()>;
pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// Dependency value compared with `Object.is` semantics: strings and
/// booleans by value, numbers by bit pattern, pointers by address.
#[derive(Clone, Debug)]
pub enum Dep {
    Unit,
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(Rc<str>),
    Ptr(usize),
}

impl Dep {
    pub fn same(&self, other: &Dep) -> bool {
        match (self, other) {
            (Dep::Unit, Dep::Unit) => true,
            (Dep::Bool(a), Dep::Bool(b)) => a == b,
            (Dep::Int(a), Dep::Int(b)) => a == b,
            (Dep::Num(a), Dep::Num(b)) => a.to_bits() == b.to_bits(),
            (Dep::Str(a), Dep::Str(b)) => a == b,
            (Dep::Ptr(a), Dep::Ptr(b)) => a == b,
            _ => false,
        }
    }

    /// Identity of a shared allocation, for dependencies that should
    /// compare by pointer.
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Dep {
        Dep::Ptr(Rc::as_ptr(rc) as *const () as usize)
    }
}

impl From<bool> for Dep {
    fn from(value: bool) -> Self {
        Dep::Bool(value)
    }
}

impl From<i32> for Dep {
    fn from(value: i32) -> Self {
        Dep::Int(value as i64)
    }
}

impl From<i64> for Dep {
    fn from(value: i64) -> Self {
        Dep::Int(value)
    }
}

impl From<u32> for Dep {
    fn from(value: u32) -> Self {
        Dep::Int(value as i64)
    }
}

impl From<usize> for Dep {
    fn from(value: usize) -> Self {
        Dep::Int(value as i64)
    }
}

impl From<f64> for Dep {
    fn from(value: f64) -> Self {
        Dep::Num(value)
    }
}

impl From<&str> for Dep {
    fn from(value: &str) -> Self {
        Dep::Str(Rc::from(value))
    }
}

impl From<String> for Dep {
    fn from(value: String) -> Self {
        Dep::Str(Rc::from(value.as_str()))
    }
}

/// Pairwise shallow comparison; differing lengths always count as changed.
pub fn deps_changed(prev: &[Dep], next: &[Dep]) -> bool {
    prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| !a.same(b))
}

/// Builds a dependency list: `deps![count, name.clone()]`.
#[macro_export]
macro_rules! deps {
    () => { ::std::vec::Vec::<$crate::hooks::Dep>::new() };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::hooks::Dep::from($value)),+]
    };
}

/// Stable mutable box whose identity never changes across renders.
pub struct Ref<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Ref<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn ptr_eq(&self, other: &Ref<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Ref<T> {
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Handle returned by [`use_state`]. Invoking it schedules an update for
/// the owning component; the new value only becomes observable on the next
/// render pass.
pub struct SetState<T> {
    value: Rc<RefCell<T>>,
    unmounting: Rc<Cell<bool>>,
    owner: NodeId,
    runtime: RuntimeHandle,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            unmounting: Rc::clone(&self.unmounting),
            owner: self.owner,
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: PartialEq + 'static> SetState<T> {
    pub fn set(&self, next: T) {
        self.apply(move |_| next);
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.apply(f);
    }

    fn apply(&self, f: impl FnOnce(&T) -> T + 'static) {
        assert!(
            !self.unmounting.get(),
            "state update on unmounting component"
        );
        log::trace!("state update dispatched for node {}", self.owner);
        let value = Rc::clone(&self.value);
        let unmounting = Rc::clone(&self.unmounting);
        let owner = self.owner;
        self.runtime.dispatch(Box::new(move |tree, _dom, update| {
            if unmounting.get() {
                return;
            }
            let next = f(&value.borrow());
            if *value.borrow() == next {
                return;
            }
            *value.borrow_mut() = next;
            tree.node_mut(owner).needs_update = true;
            update.needs_update.push(owner);
        }));
    }
}

pub(crate) struct StateSlot {
    pub value: Rc<dyn Any>,
    pub unmounting: Rc<Cell<bool>>,
}

pub(crate) struct EffectSlot {
    pub deps: Vec<Dep>,
    pub pending: Option<EffectFn>,
    pub cleanup: Option<Cleanup>,
}

pub(crate) struct RefSlot {
    pub value: Rc<dyn Any>,
}

pub(crate) struct MemoSlot {
    pub deps: Vec<Dep>,
    pub value: Rc<dyn Any>,
}

pub(crate) struct CallbackSlot {
    pub deps: Vec<Dep>,
    pub handler: EventHandler,
}

pub(crate) struct ContextSlot {
    pub context: crate::context::ContextId,
    pub provider: Option<NodeId>,
}

/// One positional slot of a component instance.
pub enum Hook {
    State(StateSlot),
    Effect(EffectSlot),
    Ref(RefSlot),
    Memo(MemoSlot),
    Callback(CallbackSlot),
    Context(ContextSlot),
}

pub(crate) struct RenderFrame {
    pub(crate) component: NodeId,
    pub(crate) tree: *mut Tree,
    pub(crate) runtime: RuntimeHandle,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) cursor: usize,
    pub(crate) initial: bool,
}

thread_local! {
    static RENDER_FRAME: RefCell<Option<RenderFrame>> = RefCell::new(None);
}

pub(crate) fn with_render_frame<R>(f: impl FnOnce(&mut RenderFrame) -> R) -> R {
    RENDER_FRAME.with(|slot| {
        let mut slot = slot.borrow_mut();
        let frame = slot.as_mut().expect(HOOKS_OUTSIDE_RENDER);
        f(frame)
    })
}

/// Runs a component's render function with its hook slots installed in the
/// thread-local frame, then validates that the slot walk consumed exactly
/// the recorded slots.
pub(crate) fn render_with_hooks(
    tree: &mut Tree,
    id: NodeId,
    runtime: &RuntimeHandle,
    initial: bool,
) -> VChildren {
    let (render, props) = {
        let component = tree.node(id).as_component();
        let vdom = component.pending.as_ref().unwrap_or(&component.vdom);
        (vdom.render, vdom.props.clone())
    };
    let hooks = mem::take(&mut tree.node_mut(id).as_component_mut().hooks);
    let frame = RenderFrame {
        component: id,
        tree: tree as *mut Tree,
        runtime: runtime.clone(),
        hooks,
        cursor: 0,
        initial,
    };
    RENDER_FRAME.with(|slot| {
        let mut slot = slot.borrow_mut();
        assert!(slot.is_none(), "render already in progress");
        *slot = Some(frame);
    });

    let children = render(&props);

    let frame = RENDER_FRAME
        .with(|slot| slot.borrow_mut().take())
        .expect("render frame lost");
    assert!(frame.cursor == frame.hooks.len(), "{HOOKS_CHANGED}");
    tree.node_mut(id).as_component_mut().hooks = frame.hooks;
    children
}

/// Claims the next slot: appends on the first render, validates on
/// re-renders, and advances the cursor.
fn claim_slot<'a>(frame: &'a mut RenderFrame, create: impl FnOnce() -> Hook) -> &'a mut Hook {
    let index = frame.cursor;
    if index >= frame.hooks.len() {
        assert!(frame.initial, "{HOOKS_CHANGED}");
        frame.hooks.push(create());
    }
    frame.cursor += 1;
    &mut frame.hooks[index]
}

pub fn use_state<T: Clone + PartialEq + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    with_render_frame(|frame| {
        let owner = frame.component;
        let runtime = frame.runtime.clone();
        let slot = claim_slot(frame, || {
            Hook::State(StateSlot {
                value: Rc::new(RefCell::new(init())),
                unmounting: Rc::new(Cell::new(false)),
            })
        });
        let Hook::State(slot) = slot else {
            panic!("{HOOKS_CHANGED}")
        };
        let value = Rc::clone(&slot.value)
            .downcast::<RefCell<T>>()
            .unwrap_or_else(|_| panic!("{HOOKS_CHANGED}"));
        let current = value.borrow().clone();
        let setter = SetState {
            value,
            unmounting: Rc::clone(&slot.unmounting),
            owner,
            runtime,
        };
        (current, setter)
    })
}

/// Effect return values: either nothing or a cleanup closure.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl<F: FnOnce() + 'static> IntoCleanup for F {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(Box::new(self))
    }
}

pub fn use_effect<C: IntoCleanup>(effect: impl FnOnce() -> C + 'static, deps: Vec<Dep>) {
    with_render_frame(|frame| {
        let wrapped: EffectFn = Box::new(move || effect().into_cleanup());
        let mut created = false;
        let slot = claim_slot(frame, || {
            created = true;
            Hook::Effect(EffectSlot {
                deps: Vec::new(),
                pending: None,
                cleanup: None,
            })
        });
        let Hook::Effect(slot) = slot else {
            panic!("{HOOKS_CHANGED}")
        };
        if created || deps_changed(&slot.deps, &deps) {
            slot.pending = Some(wrapped);
            slot.deps = deps;
        }
    })
}

pub fn use_memo<T: 'static>(factory: impl FnOnce() -> T, deps: Vec<Dep>) -> Rc<T> {
    with_render_frame(|frame| {
        let mut created = false;
        let slot = claim_slot(frame, || {
            created = true;
            Hook::Memo(MemoSlot {
                deps: Vec::new(),
                value: Rc::new(()),
            })
        });
        let Hook::Memo(slot) = slot else {
            panic!("{HOOKS_CHANGED}")
        };
        if created || deps_changed(&slot.deps, &deps) {
            slot.value = Rc::new(factory());
            slot.deps = deps;
        }
        Rc::clone(&slot.value)
            .downcast::<T>()
            .unwrap_or_else(|_| panic!("{HOOKS_CHANGED}"))
    })
}

/// Memoized event handler: identity survives re-renders until a dependency
/// changes, so listener diffing in the commit layer leaves the DOM alone.
pub fn use_callback(f: impl Fn(&Event) + 'static, deps: Vec<Dep>) -> EventHandler {
    with_render_frame(|frame| {
        let handler = EventHandler::new(f);
        let mut created = false;
        let slot = claim_slot(frame, || {
            created = true;
            Hook::Callback(CallbackSlot {
                deps: Vec::new(),
                handler: handler.clone(),
            })
        });
        let Hook::Callback(slot) = slot else {
            panic!("{HOOKS_CHANGED}")
        };
        if !created && deps_changed(&slot.deps, &deps) {
            slot.handler = handler;
        }
        slot.deps = deps;
        slot.handler.clone()
    })
}

pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> Ref<T> {
    with_render_frame(|frame| {
        let slot = claim_slot(frame, || {
            Hook::Ref(RefSlot {
                value: Rc::new(RefCell::new(init())),
            })
        });
        let Hook::Ref(slot) = slot else {
            panic!("{HOOKS_CHANGED}")
        };
        let inner = Rc::clone(&slot.value)
            .downcast::<RefCell<T>>()
            .unwrap_or_else(|_| panic!("{HOOKS_CHANGED}"));
        Ref { inner }
    })
}

/// Marks the component as unmounting, runs its effect cleanups in slot
/// order and detaches its context subscriptions. Called exactly once per
/// instance, before its DOM is detached.
pub(crate) fn run_component_cleanups(tree: &mut Tree, id: NodeId) {
    let mut cleanups: Vec<Cleanup> = Vec::new();
    let mut subscriptions: Vec<NodeId> = Vec::new();
    {
        let component = tree.node_mut(id).as_component_mut();
        component.unmounting = true;
        for hook in &mut component.hooks {
            match hook {
                Hook::State(slot) => slot.unmounting.set(true),
                Hook::Effect(slot) => {
                    slot.pending = None;
                    if let Some(cleanup) = slot.cleanup.take() {
                        cleanups.push(cleanup);
                    }
                }
                Hook::Context(slot) => {
                    if let Some(provider) = slot.provider.take() {
                        subscriptions.push(provider);
                    }
                }
                _ => {}
            }
        }
    }
    for provider in subscriptions {
        if tree.contains(provider) {
            tree.node_mut(provider)
                .as_provider_mut()
                .consumers
                .retain(|consumer| *consumer != id);
        }
    }
    for cleanup in cleanups {
        cleanup();
    }
}

/// Effects phase: for every component committed in this pass, run each
/// pending effect's previous cleanup and then the effect, in slot order.
pub(crate) fn perform_effects(tree: &mut Tree, pending: Vec<NodeId>) {
    for id in pending {
        if !tree.contains(id) {
            continue;
        }
        log::trace!("running effects for node {id}");
        let slots: Vec<usize> = {
            let component = tree.node(id).as_component();
            component
                .hooks
                .iter()
                .enumerate()
                .filter_map(|(index, hook)| match hook {
                    Hook::Effect(slot) if slot.pending.is_some() => Some(index),
                    _ => None,
                })
                .collect()
        };
        for index in slots {
            let (effect, cleanup) = {
                let component = tree.node_mut(id).as_component_mut();
                match &mut component.hooks[index] {
                    Hook::Effect(slot) => (slot.pending.take(), slot.cleanup.take()),
                    _ => (None, None),
                }
            };
            let Some(effect) = effect else { continue };
            if let Some(cleanup) = cleanup {
                cleanup();
            }
            let next_cleanup = effect();
            if let Hook::Effect(slot) = &mut tree.node_mut(id).as_component_mut().hooks[index] {
                slot.cleanup = next_cleanup;
            }
        }
    }
}

#[allow(non_snake_case)]
pub fn useState<T: Clone + PartialEq + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    use_state(init)
}

#[allow(non_snake_case)]
pub fn useEffect<C: IntoCleanup>(effect: impl FnOnce() -> C + 'static, deps: Vec<Dep>) {
    use_effect(effect, deps)
}

#[allow(non_snake_case)]
pub fn useMemo<T: 'static>(factory: impl FnOnce() -> T, deps: Vec<Dep>) -> Rc<T> {
    use_memo(factory, deps)
}

#[allow(non_snake_case)]
pub fn useCallback(f: impl Fn(&Event) + 'static, deps: Vec<Dep>) -> EventHandler {
    use_callback(f, deps)
}

#[allow(non_snake_case)]
pub fn useRef<T: 'static>(init: impl FnOnce() -> T) -> Ref<T> {
    use_ref(init)
}
