//! Update scheduling and batching.
//!
//! All state changes funnel through [`RuntimeHandle::dispatch`] as queued
//! mutations. The driver drains the queue in passes: fold every queued
//! mutation into one in-flight [`Update`], re-render until the dirty stack
//! settles, commit once, then hand the effect list to the host's flush
//! point. Effects never run on the dispatching call stack; the host
//! scheduler's flush request is the cooperative yield between commit and
//! effects.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::dom::{Dom, DomId};
use crate::tree::{NodeId, Tree};

/// Host callback deciding when the deferred effect flush runs.
pub trait HostScheduler {
    fn schedule_flush(&self);
}

/// Scheduler for hosts that poll `App::effects_pending` themselves.
#[derive(Default)]
pub struct DefaultScheduler;

impl HostScheduler for DefaultScheduler {
    fn schedule_flush(&self) {}
}

/// One queued state mutation, applied against the tree at drain time.
pub(crate) type Mutation = Box<dyn FnOnce(&mut Tree, &mut dyn Dom, &mut Update) + 'static>;

/// DOM detachment recorded during the diff pass, applied at the start of
/// the commit sweep so the live document only changes during commit.
pub(crate) struct PendingRemoval {
    pub parent: DomId,
    pub node: DomId,
}

/// The shared in-flight update record.
#[derive(Default)]
pub struct Update {
    /// Dirty nodes, drained as a stack.
    pub(crate) needs_update: Vec<NodeId>,
    /// Nodes with pending DOM/attribute mutations, walked once in order.
    pub(crate) needs_commit: Vec<NodeId>,
    /// Components whose effects must run after the commit yield.
    pub(crate) needs_effects: Vec<NodeId>,
    pub(crate) removals: Vec<PendingRemoval>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Updating,
    Committing,
    EffectsPending,
}

struct RuntimeInner {
    queue: RefCell<VecDeque<Mutation>>,
    phase: Cell<Phase>,
    pending_effects: RefCell<Vec<NodeId>>,
    scheduler: Rc<dyn HostScheduler>,
}

#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Rc<dyn HostScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                queue: RefCell::new(VecDeque::new()),
                phase: Cell::new(Phase::Idle),
                pending_effects: RefCell::new(Vec::new()),
                scheduler,
            }),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn has_queued(&self) -> bool {
        !self.inner.queue.borrow().is_empty()
    }

    pub fn effects_pending(&self) -> bool {
        self.inner.phase.get() == Phase::EffectsPending
    }

    /// Transitions Idle → Updating when there is queued work.
    pub(crate) fn begin_update(&self) -> bool {
        if self.inner.phase.get() != Phase::Idle || !self.has_queued() {
            return false;
        }
        self.inner.phase.set(Phase::Updating);
        true
    }

    pub(crate) fn pop_mutation(&self) -> Option<Mutation> {
        self.inner.queue.borrow_mut().pop_front()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.inner.phase.set(phase);
    }

    /// Stashes the effect list after the commit sweep. With no effects and
    /// no queued work the runtime goes straight back to idle; otherwise the
    /// host is asked to schedule the flush point.
    pub(crate) fn finish_commit(&self, effects: Vec<NodeId>) {
        if effects.is_empty() && !self.has_queued() {
            self.inner.phase.set(Phase::Idle);
            return;
        }
        self.inner.pending_effects.borrow_mut().extend(effects);
        self.inner.phase.set(Phase::EffectsPending);
        self.inner.scheduler.schedule_flush();
    }

    /// Transitions EffectsPending → Idle, yielding the stashed components.
    pub(crate) fn begin_effects(&self) -> Option<Vec<NodeId>> {
        if self.inner.phase.get() != Phase::EffectsPending {
            return None;
        }
        self.inner.phase.set(Phase::Idle);
        Some(self.inner.pending_effects.borrow_mut().drain(..).collect())
    }
}

#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    /// Enqueues a state mutation. Outside an active drain this marks a
    /// brand-new top-level update and asks the host to schedule a pass;
    /// during a drain or the effects phase the mutation folds into the
    /// in-flight update. Dispatch during the synchronous commit sweep is a
    /// programmer error.
    pub(crate) fn dispatch(&self, mutation: Mutation) {
        let Some(inner) = self.0.upgrade() else {
            return;
        };
        assert!(
            inner.phase.get() != Phase::Committing,
            "dispatch during commit"
        );
        inner.queue.borrow_mut().push_back(mutation);
        log::trace!("mutation queued in phase {:?}", inner.phase.get());
        if inner.phase.get() == Phase::Idle {
            inner.scheduler.schedule_flush();
        }
    }

    pub fn phase(&self) -> Phase {
        self.0
            .upgrade()
            .map(|inner| inner.phase.get())
            .unwrap_or(Phase::Idle)
    }

    pub fn has_queued(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| !inner.queue.borrow().is_empty())
            .unwrap_or(false)
    }
}
