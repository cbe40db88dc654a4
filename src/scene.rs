//! Scene tree and pointer dispatch.
//!
//! A [`Scene`] owns a root group. Pointer events walk the tree depth-first:
//! at every visible node the behaviors' pre-order hooks run in attachment
//! order, then the children in insertion order, then the behaviors' post-order
//! hooks in reverse. The first behavior that claims a pointer-down receives
//! every following move and the release directly, without a walk.

use glam::DVec2;

use crate::behavior::{Behavior, ClaimKind, Visit};
use crate::errors::{CompositionError, ContractViolation};
use crate::group::Group;
use crate::log::{debug, trace};
use crate::pointer::{PointerPhase, PointerSample};
use crate::shapes::{Drawable, Shape};
use crate::types::{Bounds, Rgba, Transform};

/// A drawable with its behaviors.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    item: Drawable,
    behaviors: Vec<Behavior>,
    visible: bool,
    /// Bumped when the behavior list changes.
    revision: u64,
}

impl Node {
    pub fn new(item: impl Into<Drawable>) -> Self {
        Self {
            item: item.into(),
            behaviors: Vec::new(),
            visible: true,
            revision: 0,
        }
    }

    /// Attach a behavior, builder style.
    pub fn with(mut self, behavior: Behavior) -> Result<Self, CompositionError> {
        self.add_behavior(behavior)?;
        Ok(self)
    }

    pub fn stroke(self, color: Rgba) -> Self {
        self.styled(Behavior::Stroke(color))
    }

    pub fn fill(self, color: Rgba) -> Self {
        self.styled(Behavior::Fill(Some(color)))
    }

    pub fn stroke_width(self, width: f64) -> Self {
        self.styled(Behavior::StrokeWidth(width))
    }

    pub fn font(self, family: impl Into<String>) -> Self {
        self.styled(Behavior::Font(family.into()))
    }

    pub fn marker(self, on: bool) -> Self {
        self.styled(Behavior::Marker(on))
    }

    pub fn point_radius(self, radius: f64) -> Self {
        self.styled(Behavior::PointRadius(radius))
    }

    /// Style behaviors fit every drawable.
    fn styled(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self.revision = self.revision.wrapping_add(1);
        self
    }

    pub fn add_behavior(&mut self, behavior: Behavior) -> Result<(), CompositionError> {
        behavior.check_target(&self.item)?;
        self.behaviors.push(behavior);
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    pub fn remove_behavior(&mut self, index: usize) -> Result<Behavior, ContractViolation> {
        let len = self.behaviors.len();
        if index >= len {
            return Err(ContractViolation::IndexOutOfRange { index, len });
        }
        self.revision = self.revision.wrapping_add(1);
        Ok(self.behaviors.remove(index))
    }

    #[inline]
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    #[inline]
    pub fn item(&self) -> &Drawable {
        &self.item
    }

    #[inline]
    pub fn item_mut(&mut self) -> &mut Drawable {
        &mut self.item
    }

    pub fn group(&self) -> Option<&Group> {
        self.item.as_group()
    }

    pub fn group_mut(&mut self) -> Option<&mut Group> {
        self.item.as_group_mut()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hidden nodes neither draw, nor count toward bounds, nor see events.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Transform from this node's frame into its parent's.
    pub fn local_transform(&self) -> Transform {
        self.item
            .as_group()
            .map_or(Transform::IDENTITY, Group::transform)
    }

    /// Bounds of this node in the frame `parent` maps to.
    pub fn bounds_under(&self, parent: &Transform) -> Bounds {
        if !self.visible {
            return Bounds::EMPTY;
        }
        self.item
            .bounds_under(&parent.compose(&self.local_transform()))
    }

    /// Drop captured gesture state of every behavior in this subtree.
    pub(crate) fn release_interactions(&mut self) {
        for behavior in &mut self.behaviors {
            behavior.release();
        }
        if let Some(group) = self.item.as_group_mut() {
            for child in group.children_mut() {
                child.release_interactions();
            }
        }
    }
}

/// A pointer sequence owned by one behavior from press to release.
#[derive(Clone, Debug, PartialEq)]
pub struct Claim {
    pub kind: ClaimKind,
    /// Child indices from the root to the claiming node.
    path: Vec<usize>,
    /// Revision of each group along `path`, root first.
    group_revisions: Vec<u64>,
    behavior: usize,
    behavior_revision: u64,
}

/// The root of everything drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    root: Node,
    claim: Option<Claim>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            root: Node::new(Group::new()),
            claim: None,
        }
    }

    /// Scene whose root node is `root`, e.g. a group with behaviors.
    pub fn with_root(root: Node) -> Self {
        Self { root, claim: None }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Append children to the root group. A non-group root is replaced by a
    /// group holding it first.
    pub fn add_children(&mut self, children: impl IntoIterator<Item = Node>) {
        if self.root.group().is_none() {
            let old = std::mem::replace(&mut self.root, Node::new(Group::new()));
            if let Some(g) = self.root.group_mut() {
                g.push(old);
            }
        }
        if let Some(g) = self.root.group_mut() {
            g.add_children(children);
        }
    }

    /// World bounds of every visible node.
    pub fn bounds(&self) -> Bounds {
        self.root.bounds_under(&Transform::IDENTITY)
    }

    pub fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }

    pub(crate) fn invalidate_bounds(&self) {
        if let Some(g) = self.root.group() {
            g.invalidate_bounds();
        }
    }

    /// Deliver one pointer event.
    ///
    /// While a claim is active every event goes to the claiming behavior and
    /// the release ends the claim. `sample.viewport_transform` must hold the
    /// current view; a pan writes the new view back into it.
    pub fn dispatch(
        &mut self,
        phase: PointerPhase,
        sample: &mut PointerSample,
    ) -> Result<(), ContractViolation> {
        self.invalidate_bounds();
        if let Some(claim) = self.claim.take() {
            let routed = Self::route(&mut self.root, &claim, phase, sample);
            if routed.is_ok() && phase != PointerPhase::Up {
                self.claim = Some(claim);
            } else {
                debug!(kind = ?claim.kind, ok = routed.is_ok(), "claim released");
            }
            return routed;
        }

        let mut walk = Walk {
            phase,
            sample,
            path: Vec::new(),
            group_revisions: Vec::new(),
            claim: None,
        };
        let view = walk.sample.viewport_transform;
        walk.visit(&mut self.root, view);
        if let Some(claim) = walk.claim {
            if self.claim.is_none() {
                debug!(kind = ?claim.kind, path = ?claim.path, "claim taken");
                self.claim = Some(claim);
            }
        }
        Ok(())
    }

    /// Drop any active claim, e.g. when the host loses pointer capture.
    pub fn cancel_claim(&mut self) {
        if let Some(claim) = self.claim.take() {
            self.root.release_interactions();
            debug!(kind = ?claim.kind, "claim cancelled");
        }
    }

    /// The view changed to `view` in the middle of a claimed gesture; restart
    /// the gesture at the pointer's device position (y up).
    pub(crate) fn rebase_claim(
        &mut self,
        view: Transform,
        device_up: DVec2,
    ) -> Result<(), ContractViolation> {
        let Some(claim) = self.claim.take() else {
            return Ok(());
        };
        let (node, parent) = Self::resolve_or_release(&mut self.root, &claim, view)?;
        let Node {
            item, behaviors, ..
        } = node;
        if let Some(behavior) = behaviors.get_mut(claim.behavior) {
            behavior.rebase(item, &parent, view, device_up);
        }
        debug!(kind = ?claim.kind, "claim rebased");
        self.claim = Some(claim);
        Ok(())
    }

    fn route(
        root: &mut Node,
        claim: &Claim,
        phase: PointerPhase,
        sample: &mut PointerSample,
    ) -> Result<(), ContractViolation> {
        let view = sample.viewport_transform;
        let (node, parent) = Self::resolve_or_release(root, claim, view)?;
        sample.world_transform = parent.compose(&node.local_transform());
        let Node {
            item, behaviors, ..
        } = node;
        let behavior = behaviors
            .get_mut(claim.behavior)
            .ok_or(ContractViolation::StaleClaim)?;
        let mut visit = Visit {
            phase,
            sample,
            parent,
        };
        let result = behavior.pointer_claimed(item, &mut visit);
        if result.is_err() {
            behavior.release();
        }
        result
    }

    /// [`Scene::resolve`], releasing every captured gesture in the tree when
    /// the claim no longer resolves.
    fn resolve_or_release<'n>(
        root: &'n mut Node,
        claim: &Claim,
        view: Transform,
    ) -> Result<(&'n mut Node, Transform), ContractViolation> {
        let failed = Self::resolve(root, claim, view).err();
        if let Some(e) = failed {
            root.release_interactions();
            return Err(e);
        }
        Self::resolve(root, claim, view)
    }

    /// Walk `claim.path` down from `root`, checking that nothing on the way
    /// changed structurally since the claim was taken.
    fn resolve<'n>(
        root: &'n mut Node,
        claim: &Claim,
        view: Transform,
    ) -> Result<(&'n mut Node, Transform), ContractViolation> {
        let mut node = root;
        let mut parent = view;
        for (depth, &index) in claim.path.iter().enumerate() {
            let local = node.local_transform();
            let group = node
                .item
                .as_group_mut()
                .ok_or(ContractViolation::StaleClaim)?;
            if claim.group_revisions.get(depth) != Some(&group.revision()) {
                return Err(ContractViolation::ConcurrentModification { list: "child" });
            }
            parent = parent.compose(&local);
            node = group
                .child_mut(index)
                .ok_or(ContractViolation::StaleClaim)?;
        }
        if node.revision != claim.behavior_revision {
            return Err(ContractViolation::ConcurrentModification { list: "behavior" });
        }
        Ok((node, parent))
    }
}

/// One depth-first pass of an unclaimed event.
struct Walk<'s> {
    phase: PointerPhase,
    sample: &'s mut PointerSample,
    path: Vec<usize>,
    group_revisions: Vec<u64>,
    claim: Option<Claim>,
}

impl Walk<'_> {
    fn visit(&mut self, node: &mut Node, parent: Transform) {
        if !node.visible {
            return;
        }
        let local = parent.compose(&node.local_transform());
        let Node {
            item,
            behaviors,
            revision,
            ..
        } = node;

        for index in 0..behaviors.len() {
            self.sample.world_transform = local;
            let mut visit = Visit {
                phase: self.phase,
                sample: &mut *self.sample,
                parent,
            };
            if let Some(kind) = behaviors[index].pointer_enter(item, &mut visit) {
                self.record(kind, index, *revision);
            }
        }

        if let Drawable::Group(group) = &mut *item {
            self.group_revisions.push(group.revision());
            for (i, child) in group.children_mut().iter_mut().enumerate() {
                self.path.push(i);
                self.visit(child, local);
                self.path.pop();
            }
            self.group_revisions.pop();
        }

        for index in (0..behaviors.len()).rev() {
            self.sample.world_transform = local;
            let mut visit = Visit {
                phase: self.phase,
                sample: &mut *self.sample,
                parent,
            };
            if let Some(kind) = behaviors[index].pointer_exit(item, &mut visit) {
                self.record(kind, index, *revision);
            }
        }
        trace!(path = ?self.path, consumed = self.sample.consumed, "node visited");
    }

    fn record(&mut self, kind: ClaimKind, behavior: usize, behavior_revision: u64) {
        if self.claim.is_some() {
            return;
        }
        self.claim = Some(Claim {
            kind,
            path: self.path.clone(),
            group_revisions: self.group_revisions.clone(),
            behavior,
            behavior_revision,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec2;

    use super::*;
    use crate::pointer::Modifiers;
    use crate::shapes::PointBatch;

    fn press(view: Transform, x: f64, y: f64) -> PointerSample {
        PointerSample::new(Bounds::from_size(100.0, 100.0), view, dvec2(x, y), 0, Modifiers::NONE)
    }

    fn draggable_square() -> Node {
        Node::new(
            Group::new().with_children([Node::new(PointBatch::new(&[0.0, 0.0, 10.0, 10.0]).unwrap())]),
        )
        .with(Behavior::draggable())
        .unwrap()
    }

    #[test]
    fn drag_beats_pan_on_overlap() {
        let root = Node::new(Group::new().with_children([draggable_square()]))
            .with(Behavior::viewport_pan())
            .unwrap();
        let mut scene = Scene::with_root(root);
        let mut s = press(Transform::IDENTITY, 5.0, 95.0);
        scene.dispatch(PointerPhase::Down, &mut s).unwrap();
        assert_eq!(scene.claim().map(|c| c.kind), Some(ClaimKind::Drag));
    }

    #[test]
    fn background_press_pans() {
        let root = Node::new(Group::new().with_children([draggable_square()]))
            .with(Behavior::viewport_pan())
            .unwrap();
        let mut scene = Scene::with_root(root);
        let mut s = press(Transform::IDENTITY, 50.0, 20.0);
        scene.dispatch(PointerPhase::Down, &mut s).unwrap();
        assert_eq!(scene.claim().map(|c| c.kind), Some(ClaimKind::Pan));

        let mut m = press(Transform::IDENTITY, 60.0, 10.0);
        scene.dispatch(PointerPhase::Move, &mut m).unwrap();
        assert_eq!(m.viewport_transform.translate, dvec2(10.0, 10.0));
        assert!(m.needs_redraw);

        let mut u = press(Transform::IDENTITY, 60.0, 10.0);
        scene.dispatch(PointerPhase::Up, &mut u).unwrap();
        assert!(scene.claim().is_none());
    }

    #[test]
    fn hidden_nodes_do_not_count() {
        let mut hidden = Node::new(PointBatch::new(&[100.0, 100.0]).unwrap());
        hidden.set_visible(false);
        let mut scene = Scene::new();
        scene.add_children([Node::new(PointBatch::new(&[1.0, 2.0]).unwrap()), hidden]);
        assert_eq!(scene.bounds().max, dvec2(1.0, 2.0));
    }

    #[test]
    fn structural_change_mid_drag_is_reported() {
        let mut scene = Scene::new();
        scene.add_children([draggable_square()]);
        let mut s = press(Transform::IDENTITY, 5.0, 95.0);
        scene.dispatch(PointerPhase::Down, &mut s).unwrap();
        assert!(scene.claim().is_some());

        scene.add_children([Node::new(PointBatch::default())]);
        let mut m = press(Transform::IDENTITY, 8.0, 95.0);
        assert_eq!(
            scene.dispatch(PointerPhase::Move, &mut m),
            Err(ContractViolation::ConcurrentModification { list: "child" })
        );
        assert!(scene.claim().is_none());
        let square = &scene.root().group().unwrap().children()[0];
        assert!(!square.behaviors()[0].is_engaged());
    }

    #[test]
    fn behavior_change_mid_drag_is_reported() {
        let mut scene = Scene::new();
        scene.add_children([draggable_square()]);
        let mut s = press(Transform::IDENTITY, 5.0, 95.0);
        scene.dispatch(PointerPhase::Down, &mut s).unwrap();

        let square = scene
            .root_mut()
            .group_mut()
            .and_then(|g| g.child_mut(0))
            .unwrap();
        square.add_behavior(Behavior::stroke(Rgba::RED)).unwrap();
        let mut m = press(Transform::IDENTITY, 8.0, 95.0);
        assert_eq!(
            scene.dispatch(PointerPhase::Move, &mut m),
            Err(ContractViolation::ConcurrentModification { list: "behavior" })
        );
        let square = &scene.root().group().unwrap().children()[0];
        assert!(square.behaviors().iter().all(|b| !b.is_engaged()));
    }

    #[test]
    fn view_change_rebases_an_active_pan() {
        let root = Node::new(Group::new()).with(Behavior::viewport_pan()).unwrap();
        let mut scene = Scene::with_root(root);
        let mut s = press(Transform::IDENTITY, 50.0, 50.0);
        scene.dispatch(PointerPhase::Down, &mut s).unwrap();

        let zoomed = Transform::uniform(10.0, -450.0, -450.0);
        scene.rebase_claim(zoomed, dvec2(50.0, 50.0)).unwrap();
        let mut m = press(zoomed, 60.0, 40.0);
        scene.dispatch(PointerPhase::Move, &mut m).unwrap();
        assert_eq!(m.viewport_transform, Transform::uniform(10.0, -440.0, -440.0));
    }
}
