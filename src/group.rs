//! Groups: ordered children under one local transform.

use std::cell::Cell;

use crate::errors::{ContractViolation, RenderError};
use crate::render::Renderer;
use crate::scene::Node;
use crate::shapes::Shape;
use crate::types::{Bounds, Transform};

/// A container node.
///
/// Children draw and receive events in insertion order. Structural changes
/// bump [`Group::revision`], which is how an in-flight interaction notices
/// that the list it was routed through changed under it.
#[derive(Clone, Debug, Default)]
pub struct Group {
    children: Vec<Node>,
    transform: Transform,
    revision: u64,
    /// Last `(transform, bounds)` pair computed by `bounds_under`.
    cached_bounds: Cell<Option<(Transform, Bounds)>>,
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children && self.transform == other.transform
    }
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.add_children(children);
        self
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.cached_bounds.set(None);
    }

    pub fn add_children(&mut self, children: impl IntoIterator<Item = Node>) {
        let before = self.children.len();
        self.children.extend(children);
        if self.children.len() != before {
            self.touch();
        }
    }

    /// Append one child and return its index.
    pub fn push(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.touch();
        self.children.len() - 1
    }

    pub fn remove_child(&mut self, index: usize) -> Result<Node, ContractViolation> {
        let len = self.children.len();
        if index >= len {
            return Err(ContractViolation::IndexOutOfRange { index, len });
        }
        let child = self.children.remove(index);
        self.touch();
        Ok(child)
    }

    pub fn clear(&mut self) {
        if !self.children.is_empty() {
            self.children.clear();
            self.touch();
        }
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to the children without changing their number.
    pub fn children_mut(&mut self) -> &mut [Node] {
        self.cached_bounds.set(None);
        &mut self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.cached_bounds.set(None);
        self.children.get_mut(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Counter bumped on every structural change of the child list.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop cached bounds here and in every nested group.
    pub fn invalidate_bounds(&self) {
        self.cached_bounds.set(None);
        for child in &self.children {
            if let Some(g) = child.item().as_group() {
                g.invalidate_bounds();
            }
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.cached_bounds.set(None);
    }
}

impl Shape for Group {
    fn kind(&self) -> &'static str {
        "group"
    }

    fn component_arity(&self) -> usize {
        0
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        if let Some((t, b)) = self.cached_bounds.get() {
            if t == *transform {
                return b;
            }
        }
        let b = self
            .children
            .iter()
            .fold(Bounds::EMPTY, |acc, child| acc.union(&child.bounds_under(transform)));
        self.cached_bounds.set(Some((*transform, b)));
        b
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for child in &self.children {
            renderer.draw_node(child)?;
        }
        Ok(())
    }
}
