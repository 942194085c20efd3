//! Host document abstraction the commit layer drives.
//!
//! The reconciler never talks to a concrete document type; it issues
//! operations through [`Dom`] against opaque [`DomId`] handles. The
//! in-memory implementation lives in [`crate::memory`].

use std::fmt;
use std::rc::Rc;

/// Opaque handle to one live host node.
pub type DomId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    Missing { id: DomId },
    NotAnElement { id: DomId },
    NotText { id: DomId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::Missing { id } => write!(f, "dom node {id} missing"),
            DomError::NotAnElement { id } => write!(f, "dom node {id} is not an element"),
            DomError::NotText { id } => write!(f, "dom node {id} is not a text node"),
        }
    }
}

impl std::error::Error for DomError {}

/// Payload delivered to event listeners.
#[derive(Clone, Debug)]
pub struct Event {
    pub name: String,
    pub target: DomId,
    /// Current input value for form-control events.
    pub value: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>, target: DomId) -> Self {
        Self {
            name: name.into(),
            target,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Identity-compared event callback.
///
/// Listener diffing in the commit layer compares handlers by pointer, so a
/// handler that should survive re-renders must keep its identity (see
/// `use_callback`).
pub struct EventHandler {
    inner: Rc<dyn Fn(&Event)>,
}

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    pub fn call(&self, event: &Event) {
        (self.inner)(event);
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Clone for EventHandler {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.inner))
    }
}

/// Mutation surface of the host document.
///
/// `insert_before` with a `None` anchor appends. Inserting a node that is
/// already attached elsewhere moves it, mirroring document semantics.
pub trait Dom {
    fn create_element(&mut self, tag: &str) -> DomId;
    fn create_text(&mut self, value: &str) -> DomId;
    fn set_text(&mut self, id: DomId, value: &str) -> Result<(), DomError>;
    fn set_attribute(&mut self, id: DomId, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_attribute(&mut self, id: DomId, name: &str) -> Result<(), DomError>;
    fn set_style_property(&mut self, id: DomId, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_style_property(&mut self, id: DomId, name: &str) -> Result<(), DomError>;
    fn add_listener(&mut self, id: DomId, name: &str, handler: EventHandler)
        -> Result<(), DomError>;
    fn remove_listener(&mut self, id: DomId, name: &str) -> Result<(), DomError>;
    /// Writes through the live `value` property of a form control instead of
    /// the attribute, so controlled inputs stay correct.
    fn set_value(&mut self, id: DomId, value: Option<&str>) -> Result<(), DomError>;
    fn insert_before(
        &mut self,
        parent: DomId,
        child: DomId,
        anchor: Option<DomId>,
    ) -> Result<(), DomError>;
    fn remove_child(&mut self, parent: DomId, child: DomId) -> Result<(), DomError>;
}
