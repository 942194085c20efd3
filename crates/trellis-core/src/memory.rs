//! Arena-backed in-memory document.
//!
//! Reference implementation of [`Dom`] used by the test harness and the
//! benches. Nodes live in a `Vec<Option<_>>` arena and are never reused, so
//! stale handles fail loudly instead of aliasing a new node.

use indexmap::IndexMap;

use crate::dom::{Dom, DomError, DomId, Event, EventHandler};

pub enum MemoryNode {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        style: IndexMap<String, String>,
        listeners: IndexMap<String, EventHandler>,
        value: Option<String>,
        parent: Option<DomId>,
        children: Vec<DomId>,
    },
    Text {
        value: String,
        parent: Option<DomId>,
    },
}

#[derive(Default)]
pub struct MemoryDom {
    nodes: Vec<Option<MemoryNode>>,
    /// Count of attribute/style/text writes, for idempotence assertions.
    mutations: usize,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: DomId) -> Result<&MemoryNode, DomError> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(DomError::Missing { id })
    }

    fn node_mut(&mut self, id: DomId) -> Result<&mut MemoryNode, DomError> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or(DomError::Missing { id })
    }

    fn element_mut(
        &mut self,
        id: DomId,
    ) -> Result<
        (
            &mut IndexMap<String, String>,
            &mut IndexMap<String, String>,
            &mut IndexMap<String, EventHandler>,
            &mut Option<String>,
        ),
        DomError,
    > {
        match self.node_mut(id)? {
            MemoryNode::Element {
                attributes,
                style,
                listeners,
                value,
                ..
            } => Ok((attributes, style, listeners, value)),
            MemoryNode::Text { .. } => Err(DomError::NotAnElement { id }),
        }
    }

    fn detach(&mut self, child: DomId) -> Result<(), DomError> {
        let parent = match self.node(child)? {
            MemoryNode::Element { parent, .. } | MemoryNode::Text { parent, .. } => *parent,
        };
        if let Some(parent) = parent {
            if let MemoryNode::Element { children, .. } = self.node_mut(parent)? {
                children.retain(|id| *id != child);
            }
        }
        match self.node_mut(child)? {
            MemoryNode::Element { parent, .. } | MemoryNode::Text { parent, .. } => *parent = None,
        }
        Ok(())
    }

    pub fn tag(&self, id: DomId) -> Result<&str, DomError> {
        match self.node(id)? {
            MemoryNode::Element { tag, .. } => Ok(tag),
            MemoryNode::Text { .. } => Err(DomError::NotAnElement { id }),
        }
    }

    pub fn attribute(&self, id: DomId, name: &str) -> Option<&str> {
        match self.node(id).ok()? {
            MemoryNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            MemoryNode::Text { .. } => None,
        }
    }

    pub fn style_property(&self, id: DomId, name: &str) -> Option<&str> {
        match self.node(id).ok()? {
            MemoryNode::Element { style, .. } => style.get(name).map(String::as_str),
            MemoryNode::Text { .. } => None,
        }
    }

    pub fn value(&self, id: DomId) -> Option<&str> {
        match self.node(id).ok()? {
            MemoryNode::Element { value, .. } => value.as_deref(),
            MemoryNode::Text { .. } => None,
        }
    }

    pub fn children(&self, id: DomId) -> Result<&[DomId], DomError> {
        match self.node(id)? {
            MemoryNode::Element { children, .. } => Ok(children),
            MemoryNode::Text { .. } => Err(DomError::NotAnElement { id }),
        }
    }

    pub fn parent(&self, id: DomId) -> Option<DomId> {
        match self.node(id).ok()? {
            MemoryNode::Element { parent, .. } | MemoryNode::Text { parent, .. } => *parent,
        }
    }

    /// Concatenated text of the subtree, document order.
    pub fn text_content(&self, id: DomId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: DomId, out: &mut String) {
        match self.node(id) {
            Ok(MemoryNode::Text { value, .. }) => out.push_str(value),
            Ok(MemoryNode::Element { children, .. }) => {
                for child in children {
                    self.collect_text(*child, out);
                }
            }
            Err(_) => {}
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Invokes the matching listener, if any. The handler is cloned out of
    /// the arena first so it may freely dispatch state updates.
    pub fn fire(&self, event: &Event) {
        let handler = match self.node(event.target) {
            Ok(MemoryNode::Element { listeners, .. }) => listeners.get(&event.name).cloned(),
            _ => None,
        };
        if let Some(handler) = handler {
            handler.call(event);
        }
    }

    pub fn dump(&self, root: DomId) -> String {
        let mut out = String::new();
        self.dump_node(&mut out, root, 0);
        out
    }

    fn dump_node(&self, out: &mut String, id: DomId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id) {
            Ok(MemoryNode::Text { value, .. }) => {
                out.push_str(&format!("{indent}[{id}] {value:?}\n"));
            }
            Ok(MemoryNode::Element {
                tag,
                attributes,
                children,
                ..
            }) => {
                out.push_str(&format!("{indent}[{id}] <{tag}"));
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}={value:?}"));
                }
                out.push_str(">\n");
                for child in children {
                    self.dump_node(out, *child, depth + 1);
                }
            }
            Err(_) => out.push_str(&format!("{indent}[{id}] (missing)\n")),
        }
    }
}

impl Dom for MemoryDom {
    fn create_element(&mut self, tag: &str) -> DomId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode::Element {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            listeners: IndexMap::new(),
            value: None,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn create_text(&mut self, value: &str) -> DomId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode::Text {
            value: value.to_string(),
            parent: None,
        }));
        id
    }

    fn set_text(&mut self, id: DomId, value: &str) -> Result<(), DomError> {
        match self.node_mut(id)? {
            MemoryNode::Text { value: slot, .. } => {
                *slot = value.to_string();
            }
            MemoryNode::Element { .. } => return Err(DomError::NotText { id }),
        }
        self.mutations += 1;
        Ok(())
    }

    fn set_attribute(&mut self, id: DomId, name: &str, value: &str) -> Result<(), DomError> {
        let (attributes, ..) = self.element_mut(id)?;
        attributes.insert(name.to_string(), value.to_string());
        self.mutations += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, id: DomId, name: &str) -> Result<(), DomError> {
        let (attributes, ..) = self.element_mut(id)?;
        attributes.shift_remove(name);
        self.mutations += 1;
        Ok(())
    }

    fn set_style_property(&mut self, id: DomId, name: &str, value: &str) -> Result<(), DomError> {
        let (_, style, ..) = self.element_mut(id)?;
        style.insert(name.to_string(), value.to_string());
        self.mutations += 1;
        Ok(())
    }

    fn remove_style_property(&mut self, id: DomId, name: &str) -> Result<(), DomError> {
        let (_, style, ..) = self.element_mut(id)?;
        style.shift_remove(name);
        self.mutations += 1;
        Ok(())
    }

    fn add_listener(
        &mut self,
        id: DomId,
        name: &str,
        handler: EventHandler,
    ) -> Result<(), DomError> {
        let (_, _, listeners, _) = self.element_mut(id)?;
        listeners.insert(name.to_string(), handler);
        Ok(())
    }

    fn remove_listener(&mut self, id: DomId, name: &str) -> Result<(), DomError> {
        let (_, _, listeners, _) = self.element_mut(id)?;
        listeners.shift_remove(name);
        Ok(())
    }

    fn set_value(&mut self, id: DomId, value: Option<&str>) -> Result<(), DomError> {
        let (_, _, _, slot) = self.element_mut(id)?;
        *slot = value.map(str::to_string);
        self.mutations += 1;
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: DomId,
        child: DomId,
        anchor: Option<DomId>,
    ) -> Result<(), DomError> {
        self.detach(child)?;
        let position = match (self.node(parent)?, anchor) {
            (MemoryNode::Element { children, .. }, Some(anchor)) => {
                children.iter().position(|id| *id == anchor)
            }
            (MemoryNode::Element { .. }, None) => None,
            (MemoryNode::Text { .. }, _) => return Err(DomError::NotAnElement { id: parent }),
        };
        match self.node_mut(parent)? {
            MemoryNode::Element { children, .. } => match position {
                Some(at) => children.insert(at, child),
                None => children.push(child),
            },
            MemoryNode::Text { .. } => unreachable!(),
        }
        match self.node_mut(child)? {
            MemoryNode::Element { parent: slot, .. } | MemoryNode::Text { parent: slot, .. } => {
                *slot = Some(parent)
            }
        }
        Ok(())
    }

    fn remove_child(&mut self, parent: DomId, child: DomId) -> Result<(), DomError> {
        match self.node_mut(parent)? {
            MemoryNode::Element { children, .. } => {
                children.retain(|id| *id != child);
            }
            MemoryNode::Text { .. } => return Err(DomError::NotAnElement { id: parent }),
        }
        match self.node_mut(child)? {
            MemoryNode::Element { parent, .. } | MemoryNode::Text { parent, .. } => *parent = None,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_before_moves_attached_nodes() {
        let mut dom = MemoryDom::new();
        let root = dom.create_element("div");
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        dom.insert_before(root, a, None).unwrap();
        dom.insert_before(root, b, None).unwrap();
        assert_eq!(dom.text_content(root), "ab");

        dom.insert_before(root, b, Some(a)).unwrap();
        assert_eq!(dom.text_content(root), "ba");
    }

    #[test]
    fn remove_child_detaches() {
        let mut dom = MemoryDom::new();
        let root = dom.create_element("div");
        let a = dom.create_text("a");
        dom.insert_before(root, a, None).unwrap();
        dom.remove_child(root, a).unwrap();
        assert_eq!(dom.text_content(root), "");
        assert_eq!(dom.parent(a), None);
    }
}
