//! Virtual-DOM reconciler with a hooks-based component model.
//!
//! A render produces an immutable declarative tree ([`vdom`]); the
//! reconciler diffs it against the mounted instance tree ([`tree`]),
//! drains dirty nodes depth-first through the hook engine ([`hooks`]),
//! applies all pending document mutations in one synchronous commit sweep
//! through the [`dom`] seam, and then runs effects after yielding back to
//! the host ([`schedule`]).

pub mod collections;
pub mod context;
pub mod dom;
pub mod hash;
pub mod hooks;
pub mod memory;
pub mod schedule;
pub mod tree;
pub mod vdom;

mod attrs;
mod commit;
mod update;

pub use context::{use_context, useContext, Context};
pub use dom::{Dom, DomError, DomId, Event, EventHandler};
pub use hooks::{
    deps_changed, use_callback, use_effect, use_memo, use_ref, use_state, useCallback, useEffect,
    useMemo, useRef, useState, Cleanup, Dep, IntoCleanup, Ref, SetState,
};
pub use memory::MemoryDom;
pub use schedule::{DefaultScheduler, HostScheduler, Phase, Runtime, RuntimeHandle};
pub use tree::{Instance, InstanceKind, NodeId, Tree};
pub use vdom::{
    component, element, fragment, sanitize, text, Props, PropValue, RenderFn, Style, StyleValue,
    VChildren, VElement, VKey, VNode, VText,
};

use std::mem;
use std::rc::Rc;

use crate::commit::perform_commits;
use crate::schedule::Update;
use crate::update::perform_updates;

/// One render target: the instance tree, its host document and the runtime
/// that batches updates against them.
pub struct App<D: Dom> {
    tree: Tree,
    dom: D,
    runtime: Runtime,
}

impl<D: Dom + 'static> App<D> {
    pub fn new(dom: D) -> Self {
        Self::with_scheduler(dom, Rc::new(DefaultScheduler))
    }

    pub fn with_scheduler(dom: D, scheduler: Rc<dyn HostScheduler>) -> Self {
        Self {
            tree: Tree::new(),
            dom,
            runtime: Runtime::new(scheduler),
        }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Schedules mounting of a declarative tree. The anchor resolver runs
    /// when the scheduled update does, so the host document only has to be
    /// ready by the first [`App::process`] call. Rendering again against a
    /// mounted root re-renders it in place.
    pub fn render(
        &mut self,
        get_anchor: impl FnOnce(&mut dyn Dom) -> DomId + 'static,
        children: impl Into<VChildren>,
    ) {
        let children = children.into();
        self.runtime
            .handle()
            .dispatch(Box::new(move |tree, dom, update| {
                let pending = vdom::sanitize(&children);
                match tree.root() {
                    Some(root) => {
                        tree.node_mut(root).set_pending_children(pending);
                        tree.node_mut(root).needs_update = true;
                        update.needs_update.push(root);
                    }
                    None => {
                        let anchor = get_anchor(dom);
                        let root = tree::create_root(tree, anchor, pending);
                        update.needs_update.push(root);
                    }
                }
            }));
    }

    /// Drains queued mutations into one update pass and commits it.
    /// Mutations dispatched while the pass runs fold into the same pass,
    /// so synchronous bursts of state changes produce one re-render.
    /// Effects are left pending for [`App::flush_effects`].
    pub fn process(&mut self) -> Result<(), DomError> {
        if !self.runtime.begin_update() {
            return Ok(());
        }
        log::debug!("update pass starting");
        let handle = self.runtime.handle();
        let mut update = Update::default();
        loop {
            while let Some(mutation) = self.runtime.pop_mutation() {
                mutation(&mut self.tree, &mut self.dom, &mut update);
            }
            perform_updates(&mut self.tree, &mut self.dom, &mut update, &handle);
            if !self.runtime.has_queued() {
                break;
            }
        }
        self.runtime.set_phase(Phase::Committing);
        let result = perform_commits(&mut self.tree, &mut self.dom, &mut update);
        self.runtime.finish_commit(mem::take(&mut update.needs_effects));
        log::debug!("update pass finished");
        result
    }

    /// The deferred flush point: runs pending effect cleanups and setups in
    /// hook slot order, then starts a new pass if effects queued more work.
    pub fn flush_effects(&mut self) -> Result<(), DomError> {
        let Some(pending) = self.runtime.begin_effects() else {
            return Ok(());
        };
        hooks::perform_effects(&mut self.tree, pending);
        if self.runtime.has_queued() {
            self.process()?;
        }
        Ok(())
    }

    pub fn should_process(&self) -> bool {
        self.runtime.phase() == Phase::Idle && self.runtime.has_queued()
    }

    pub fn effects_pending(&self) -> bool {
        self.runtime.effects_pending()
    }
}

pub mod prelude {
    pub use crate::context::{use_context, Context};
    pub use crate::dom::{Event, EventHandler};
    pub use crate::hooks::{use_callback, use_effect, use_memo, use_ref, use_state, Ref, SetState};
    pub use crate::memory::MemoryDom;
    pub use crate::vdom::{
        component, element, fragment, text, Props, Style, VChildren, VNode,
    };
    pub use crate::{deps, App};
}
