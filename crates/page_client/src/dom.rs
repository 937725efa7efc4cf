//! In-memory page model: an arena of elements addressed by [`NodeId`].
//!
//! Only the parts of a document the card page relies on are modelled:
//! tags, attributes, inline style, text and the parent/child structure.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("cannot append {child} under {parent}: {child} is an ancestor of {parent}")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("node {0} has no parent")]
    Detached(NodeId),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose root is an empty `body` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Creates an element with the given attributes and appends it under `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        self.get(parent)?;
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value)?;
        }
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// current parent first. Appending an existing child moves it to the end.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.get(parent)?;
        self.get(child)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|element| element.tag.as_str())
    }

    pub fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag(node)
            .is_some_and(|actual| actual.eq_ignore_ascii_case(tag))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.get_mut(node)?;
        let name = name.to_ascii_lowercase();
        match element.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let element = self.get_mut(node)?;
        element
            .attributes
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node.0)?
            .attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.get_mut(node)?.text = text.to_string();
        Ok(())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|element| element.text.as_str())
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(node)?
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(node.0)?.style.get(property).map(String::as_str)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// All descendants of `node` in tree order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Elements with the given tag reachable from the root, in tree order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        if self.is_tag(self.root, tag) {
            found.push(self.root);
        }
        found.extend(
            self.descendants(self.root)
                .into_iter()
                .filter(|node| self.is_tag(*node, tag)),
        );
        found
    }

    /// Nearest inclusive ancestor of `node` matching `predicate`.
    pub fn closest<F>(&self, node: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        let mut current = self.contains(node).then_some(node);
        while let Some(candidate) = current {
            if predicate(self, candidate) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    fn get(&self, node: NodeId) -> Result<&Element, DomError> {
        self.nodes.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
