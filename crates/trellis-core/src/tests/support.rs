use std::rc::Rc;

use crate::dom::{Dom, DomId, Event};
use crate::memory::MemoryDom;
use crate::schedule::{DefaultScheduler, HostScheduler};
use crate::vdom::VChildren;
use crate::App;

pub struct Host {
    pub app: App<MemoryDom>,
    pub root: DomId,
}

impl Host {
    pub fn new() -> Self {
        let mut dom = MemoryDom::new();
        let root = dom.create_element("root");
        let scheduler: Rc<dyn HostScheduler> = Rc::new(DefaultScheduler);
        let app = App::with_scheduler(dom, scheduler);
        Self { app, root }
    }

    pub fn render(&mut self, children: impl Into<VChildren>) {
        let root = self.root;
        self.app.render(move |_| root, children);
        self.settle();
    }

    pub fn settle(&mut self) {
        for _ in 0..64 {
            self.app.process().expect("update pass failed");
            self.app.flush_effects().expect("effect flush failed");
            if !self.app.should_process() && !self.app.effects_pending() {
                return;
            }
        }
        panic!("render did not settle");
    }

    pub fn fire(&mut self, target: DomId, event: &str) {
        self.app.dom().fire(&Event::new(event, target));
        self.settle();
    }

    pub fn dom(&self) -> &MemoryDom {
        self.app.dom()
    }

    pub fn text(&self) -> String {
        self.dom().text_content(self.root)
    }

    pub fn root_children(&self) -> Vec<DomId> {
        self.dom().children(self.root).expect("root element").to_vec()
    }
}
