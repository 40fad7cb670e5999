//! Element tree management
//!
//! A minimal retained element tree: parent/child structure, bounds in
//! document coordinates, focusability, visibility and text direction. It is
//! the containment oracle overlays use to decide which surface an element
//! belongs to.

use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;

use crate::error::{CoreError, Result};
use crate::geometry::Rect;

new_key_type! {
    pub struct ElementId;
}

impl ElementId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Text direction of an element subtree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Clone, Debug, Default)]
struct ElementNode {
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
    bounds: Rect,
    is_root: bool,
    focusable: bool,
    hidden: bool,
    direction: Option<Direction>,
    name: Option<String>,
}

/// Element tree
#[derive(Debug, Default)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementNode>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document root
    pub fn create_root(&mut self, bounds: Rect) -> ElementId {
        self.nodes.insert(ElementNode {
            bounds,
            is_root: true,
            ..Default::default()
        })
    }

    /// Create a detached element
    pub fn create_element(&mut self) -> ElementId {
        self.nodes.insert(ElementNode::default())
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.node(parent)?;
        let node = self.node(child)?;
        if node.parent.is_some() || node.is_root {
            return Err(CoreError::AlreadyAttached(child));
        }
        if self.contains(child, parent) {
            return Err(CoreError::WouldCreateCycle { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Detach an element (and its subtree) from its parent
    pub fn detach(&mut self, id: ElementId) -> Result<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
        Ok(())
    }

    /// Remove an element and its whole subtree, returning the removed ids
    pub fn remove_subtree(&mut self, id: ElementId) -> Vec<ElementId> {
        if self.detach(id).is_err() {
            return Vec::new();
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(current) {
                pending.extend(node.children.iter().copied());
                removed.push(current);
            }
        }
        removed
    }

    pub fn exists(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(id)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.children.first().copied())
    }

    pub fn last_child(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.children.last().copied())
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let siblings = &self.nodes.get(self.parent(id)?)?.children;
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    pub fn prev_sibling(&self, id: ElementId) -> Option<ElementId> {
        let siblings = &self.nodes.get(self.parent(id)?)?.children;
        let index = siblings.iter().position(|c| *c == id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }

    /// Inclusive containment: an element contains itself
    pub fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        if !self.exists(ancestor) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether the element is connected to a document root
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            match self.nodes.get(current) {
                Some(node) if node.is_root => return true,
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return false,
                },
                None => return false,
            }
        }
    }

    /// Ancestors from the element itself up to its root
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.filter(|n| self.exists(*n)) {
            path.push(node);
            current = self.parent(node);
        }
        path
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<()> {
        self.node_mut(id)?.bounds = bounds;
        Ok(())
    }

    pub fn is_focusable(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.focusable)
    }

    pub fn set_focusable(&mut self, id: ElementId, focusable: bool) -> Result<()> {
        self.node_mut(id)?.focusable = focusable;
        Ok(())
    }

    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) -> Result<()> {
        self.node_mut(id)?.hidden = hidden;
        Ok(())
    }

    /// Whether the element itself is marked hidden
    pub fn is_hidden(&self, id: ElementId) -> bool {
        self.nodes.get(id).map_or(true, |n| n.hidden)
    }

    /// Attached and neither the element nor any ancestor is hidden
    pub fn is_rendered(&self, id: ElementId) -> bool {
        self.is_attached(id) && self.ancestors(id).iter().all(|a| !self.is_hidden(*a))
    }

    /// Effective direction, inherited from the nearest ancestor that sets one
    pub fn direction(&self, id: ElementId) -> Direction {
        self.ancestors(id)
            .into_iter()
            .find_map(|a| self.nodes.get(a).and_then(|n| n.direction))
            .unwrap_or_default()
    }

    pub fn set_direction(&mut self, id: ElementId, direction: Direction) -> Result<()> {
        self.node_mut(id)?.direction = Some(direction);
        Ok(())
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.name.as_deref())
    }

    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    /// Whether the element can currently take focus
    pub fn can_focus(&self, id: ElementId) -> bool {
        self.is_focusable(id) && self.is_rendered(id)
    }

    /// First focusable descendant in document order, excluding the element itself
    pub fn first_focusable_descendant(&self, id: ElementId) -> Option<ElementId> {
        let mut pending: Vec<ElementId> = self.children(id).into_iter().rev().collect();
        while let Some(current) = pending.pop() {
            if self.can_focus(current) {
                return Some(current);
            }
            pending.extend(self.children(current).into_iter().rev());
        }
        None
    }

    /// Focusable descendants in document order, excluding the element itself
    pub fn focusable_descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut pending: Vec<ElementId> = self.children(id).into_iter().rev().collect();
        while let Some(current) = pending.pop() {
            if self.can_focus(current) {
                found.push(current);
            }
            pending.extend(self.children(current).into_iter().rev());
        }
        found
    }

    fn node(&self, id: ElementId) -> Result<&ElementNode> {
        self.nodes.get(id).ok_or(CoreError::ElementNotFound(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        self.nodes.get_mut(id).ok_or(CoreError::ElementNotFound(id))
    }
}
