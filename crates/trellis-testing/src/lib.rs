//! Test host for driving a Trellis app deterministically.
//!
//! Wraps an [`App`] over the in-memory document with a scheduler whose
//! flush requests are recorded instead of deferred, so tests can pump
//! update, commit and effect phases synchronously and observe every
//! intermediate state.

use std::cell::Cell;
use std::rc::Rc;

use trellis_core::dom::{Dom, DomId, Event};
use trellis_core::memory::MemoryDom;
use trellis_core::schedule::HostScheduler;
use trellis_core::vdom::VChildren;
use trellis_core::App;

/// Records flush requests; the host decides when to act on them.
#[derive(Default)]
pub struct TestScheduler {
    requested: Cell<bool>,
}

impl TestScheduler {
    pub fn take_request(&self) -> bool {
        self.requested.replace(false)
    }
}

impl HostScheduler for TestScheduler {
    fn schedule_flush(&self) {
        self.requested.set(true);
    }
}

pub struct TestHost {
    app: App<MemoryDom>,
    scheduler: Rc<TestScheduler>,
    root: DomId,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    pub fn new() -> Self {
        let mut dom = MemoryDom::new();
        let root = dom.create_element("root");
        let scheduler = Rc::new(TestScheduler::default());
        let app = App::with_scheduler(dom, scheduler.clone());
        Self {
            app,
            scheduler,
            root,
        }
    }

    pub fn root(&self) -> DomId {
        self.root
    }

    pub fn app(&self) -> &App<MemoryDom> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App<MemoryDom> {
        &mut self.app
    }

    pub fn dom(&self) -> &MemoryDom {
        self.app.dom()
    }

    /// Mounts (or re-renders) the declarative tree and settles.
    pub fn render(&mut self, children: impl Into<VChildren>) {
        let root = self.root;
        self.app.render(move |_| root, children);
        self.settle();
    }

    /// Pumps update/commit/effect phases until no work remains. Each
    /// iteration is one scheduler turn: a drain-and-commit pass followed by
    /// the deferred effect flush.
    pub fn settle(&mut self) {
        for _ in 0..64 {
            self.scheduler.take_request();
            self.app.process().expect("update pass failed");
            self.app.flush_effects().expect("effect flush failed");
            if !self.app.should_process() && !self.app.effects_pending() {
                return;
            }
        }
        panic!("render did not settle after 64 passes");
    }

    /// Runs only the drain-and-commit pass, leaving effects pending.
    pub fn process_only(&mut self) {
        self.app.process().expect("update pass failed");
    }

    pub fn flush_requested(&self) -> bool {
        self.scheduler.requested.get()
    }

    /// Fires a synthetic event at a DOM node and settles the resulting
    /// updates, like one host event turn.
    pub fn fire(&mut self, target: DomId, event: &str) {
        self.dispatch_event(Event::new(event, target));
    }

    pub fn fire_input(&mut self, target: DomId, value: &str) {
        self.dispatch_event(Event::new("input", target).with_value(value));
    }

    pub fn dispatch_event(&mut self, event: Event) {
        log::debug!("dispatching {} at {}", event.name, event.target);
        self.app.dom().fire(&event);
        self.settle();
    }

    /// Concatenated text under the mount anchor.
    pub fn text(&self) -> String {
        self.dom().text_content(self.root)
    }

    pub fn dump(&self) -> String {
        self.dom().dump(self.root)
    }

    /// Child element handles under the mount anchor, document order.
    pub fn root_children(&self) -> Vec<DomId> {
        self.dom()
            .children(self.root)
            .expect("root is an element")
            .to_vec()
    }
}
