//! Gizmo widgets and the rig that keeps them mutually exclusive.
//!
//! The rig owns three manipulation widgets (translate/rotate/scale) behind
//! the [`Gizmo`] capability trait, so the coordination logic never touches a
//! concrete rendering engine. All widgets are forced to world-space
//! orientation and world-space drag axes: translation stays predictable even
//! when the selected object is rotated.

use crate::scene::NodeId;
use crate::transform::TransformMode;

#[derive(Debug, thiserror::Error)]
pub enum GizmoError {
    #[error("widget backend error: {0}")]
    Backend(String),
}

/// Which of the three widgets is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoKind {
    Translate,
    Rotate,
    Scale,
}

/// Capability surface of one manipulation widget.
pub trait Gizmo {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Bind the widget to a node, or detach it. Backends may reset
    /// orientation locks when a new target is attached.
    fn attach(&mut self, target: Option<NodeId>);
    fn target(&self) -> Option<NodeId>;
    /// Align the widget to global axes instead of the target's rotation.
    fn set_world_orientation(&mut self, world: bool);
    /// Drag along global axes instead of the target's local axes.
    fn set_world_drag_axes(&mut self, world: bool);
    /// Release backend resources. Failures are logged by the rig, never
    /// propagated.
    fn dispose(&mut self) -> std::result::Result<(), GizmoError>;
}

fn mode_widget(mode: TransformMode) -> Option<GizmoKind> {
    match mode {
        TransformMode::Position => Some(GizmoKind::Translate),
        TransformMode::Rotation => Some(GizmoKind::Rotate),
        TransformMode::Scale => Some(GizmoKind::Scale),
        TransformMode::None => None,
    }
}

/// Owns the three widgets and the drag critical section.
pub struct GizmoRig {
    translate: Box<dyn Gizmo>,
    rotate: Box<dyn Gizmo>,
    scale: Box<dyn Gizmo>,
    active_drag: Option<GizmoKind>,
    disposed: bool,
}

impl GizmoRig {
    pub fn new(
        translate: Box<dyn Gizmo>,
        rotate: Box<dyn Gizmo>,
        scale: Box<dyn Gizmo>,
    ) -> Self {
        let mut rig = Self {
            translate,
            rotate,
            scale,
            active_drag: None,
            disposed: false,
        };
        for widget in rig.widgets_mut() {
            widget.set_enabled(false);
            widget.set_world_orientation(true);
            widget.set_world_drag_axes(true);
        }
        rig
    }

    /// Rig backed by state-only widgets, for headless hosts and tests.
    pub fn headless() -> Self {
        Self::new(
            Box::new(HeadlessGizmo::new(GizmoKind::Translate)),
            Box::new(HeadlessGizmo::new(GizmoKind::Rotate)),
            Box::new(HeadlessGizmo::new(GizmoKind::Scale)),
        )
    }

    fn widgets_mut(&mut self) -> [&mut dyn Gizmo; 3] {
        [
            self.translate.as_mut(),
            self.rotate.as_mut(),
            self.scale.as_mut(),
        ]
    }

    fn widget_mut(&mut self, kind: GizmoKind) -> &mut dyn Gizmo {
        match kind {
            GizmoKind::Translate => self.translate.as_mut(),
            GizmoKind::Rotate => self.rotate.as_mut(),
            GizmoKind::Scale => self.scale.as_mut(),
        }
    }

    fn widget(&self, kind: GizmoKind) -> &dyn Gizmo {
        match kind {
            GizmoKind::Translate => self.translate.as_ref(),
            GizmoKind::Rotate => self.rotate.as_ref(),
            GizmoKind::Scale => self.scale.as_ref(),
        }
    }

    /// Re-align widget state with the active mode and selection: disable all
    /// three, then bind and enable exactly the one matching the mode. The
    /// world-space flags are re-applied after attach because attaching a new
    /// target can reset them to the backend default.
    pub fn sync(&mut self, mode: TransformMode, selected: Option<NodeId>) {
        for widget in self.widgets_mut() {
            widget.set_enabled(false);
        }
        let Some(node) = selected else {
            for widget in self.widgets_mut() {
                widget.attach(None);
            }
            return;
        };
        for widget in self.widgets_mut() {
            widget.attach(Some(node));
        }
        let Some(kind) = mode_widget(mode) else {
            return;
        };
        let widget = self.widget_mut(kind);
        widget.set_world_orientation(true);
        widget.set_world_drag_axes(true);
        widget.set_enabled(true);
    }

    /// Enter the drag critical section. Only the currently enabled widget
    /// may start a drag, and only one drag runs at a time.
    pub fn begin_drag(&mut self, kind: GizmoKind) -> bool {
        if self.active_drag.is_some() {
            log::debug!("drag on {:?} ignored: another drag is active", kind);
            return false;
        }
        if !self.widget(kind).is_enabled() {
            log::debug!("drag on {:?} ignored: widget not enabled", kind);
            return false;
        }
        self.active_drag = Some(kind);
        true
    }

    pub fn end_drag(&mut self) -> Option<GizmoKind> {
        self.active_drag.take()
    }

    pub fn drag_active(&self) -> bool {
        self.active_drag.is_some()
    }

    /// The widget currently shown, if any.
    pub fn enabled_kind(&self) -> Option<GizmoKind> {
        [GizmoKind::Translate, GizmoKind::Rotate, GizmoKind::Scale]
            .into_iter()
            .find(|&kind| self.widget(kind).is_enabled())
    }

    /// Release all widgets. Idempotent; disposal failures are logged so
    /// teardown always completes.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.active_drag = None;
        for widget in self.widgets_mut() {
            if let Err(err) = widget.dispose() {
                log::warn!("gizmo widget disposal failed: {}", err);
            }
        }
    }
}

/// State-only widget: tracks the flags a real backend would. Attaching a
/// target resets the orientation locks, mirroring engines that re-derive
/// them from the new target.
pub struct HeadlessGizmo {
    kind: GizmoKind,
    enabled: bool,
    target: Option<NodeId>,
    world_orientation: bool,
    world_drag_axes: bool,
}

impl HeadlessGizmo {
    pub fn new(kind: GizmoKind) -> Self {
        Self {
            kind,
            enabled: false,
            target: None,
            world_orientation: false,
            world_drag_axes: false,
        }
    }

    pub fn kind(&self) -> GizmoKind {
        self.kind
    }

    pub fn world_orientation(&self) -> bool {
        self.world_orientation
    }

    pub fn world_drag_axes(&self) -> bool {
        self.world_drag_axes
    }
}

impl Gizmo for HeadlessGizmo {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn attach(&mut self, target: Option<NodeId>) {
        if target.is_some() && target != self.target {
            // backend default after re-attach: local orientation
            self.world_orientation = false;
            self.world_drag_axes = false;
        }
        self.target = target;
    }

    fn target(&self) -> Option<NodeId> {
        self.target
    }

    fn set_world_orientation(&mut self, world: bool) {
        self.world_orientation = world;
    }

    fn set_world_drag_axes(&mut self, world: bool) {
        self.world_drag_axes = world;
    }

    fn dispose(&mut self) -> std::result::Result<(), GizmoError> {
        self.enabled = false;
        self.target = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn graph_with_node() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let id = graph.add_node("mesh");
        (graph, id)
    }

    #[test]
    fn at_most_one_widget_enabled() {
        let (_, id) = graph_with_node();
        let mut rig = GizmoRig::headless();

        rig.sync(TransformMode::Position, Some(id));
        assert_eq!(rig.enabled_kind(), Some(GizmoKind::Translate));

        rig.sync(TransformMode::Rotation, Some(id));
        assert_eq!(rig.enabled_kind(), Some(GizmoKind::Rotate));
        assert!(!rig.widget(GizmoKind::Translate).is_enabled());
        assert!(!rig.widget(GizmoKind::Scale).is_enabled());

        rig.sync(TransformMode::None, Some(id));
        assert_eq!(rig.enabled_kind(), None);
    }

    #[test]
    fn mode_without_selection_shows_nothing() {
        let mut rig = GizmoRig::headless();
        rig.sync(TransformMode::Scale, None);
        assert_eq!(rig.enabled_kind(), None);
        assert_eq!(rig.widget(GizmoKind::Scale).target(), None);
    }

    /// Delegating handle so a test can inspect widget state the rig owns.
    struct SharedGizmo(Rc<RefCell<HeadlessGizmo>>);

    impl Gizmo for SharedGizmo {
        fn set_enabled(&mut self, enabled: bool) {
            self.0.borrow_mut().set_enabled(enabled);
        }
        fn is_enabled(&self) -> bool {
            self.0.borrow().is_enabled()
        }
        fn attach(&mut self, target: Option<NodeId>) {
            self.0.borrow_mut().attach(target);
        }
        fn target(&self) -> Option<NodeId> {
            self.0.borrow().target()
        }
        fn set_world_orientation(&mut self, world: bool) {
            self.0.borrow_mut().set_world_orientation(world);
        }
        fn set_world_drag_axes(&mut self, world: bool) {
            self.0.borrow_mut().set_world_drag_axes(world);
        }
        fn dispose(&mut self) -> std::result::Result<(), GizmoError> {
            self.0.borrow_mut().dispose()
        }
    }

    #[test]
    fn world_flags_survive_reattach() {
        let mut graph = SceneGraph::new();
        let first = graph.add_node("a");
        let second = graph.add_node("b");

        let translate = Rc::new(RefCell::new(HeadlessGizmo::new(GizmoKind::Translate)));
        let mut rig = GizmoRig::new(
            Box::new(SharedGizmo(Rc::clone(&translate))),
            Box::new(HeadlessGizmo::new(GizmoKind::Rotate)),
            Box::new(HeadlessGizmo::new(GizmoKind::Scale)),
        );

        rig.sync(TransformMode::Position, Some(first));
        assert!(translate.borrow().world_orientation());
        assert!(translate.borrow().world_drag_axes());

        // attaching a different node resets the backend flags; sync must
        // re-force them on the enabled widget
        rig.sync(TransformMode::Position, Some(second));
        assert!(translate.borrow().is_enabled());
        assert_eq!(translate.borrow().target(), Some(second));
        assert!(translate.borrow().world_orientation());
        assert!(translate.borrow().world_drag_axes());
    }

    #[test]
    fn drag_requires_enabled_widget() {
        let (_, id) = graph_with_node();
        let mut rig = GizmoRig::headless();
        assert!(!rig.begin_drag(GizmoKind::Translate));

        rig.sync(TransformMode::Position, Some(id));
        assert!(rig.begin_drag(GizmoKind::Translate));
        assert!(rig.drag_active());
        // second drag while one is active
        assert!(!rig.begin_drag(GizmoKind::Translate));
        assert_eq!(rig.end_drag(), Some(GizmoKind::Translate));
        assert!(!rig.drag_active());
        assert_eq!(rig.end_drag(), None);
    }

    struct FailingGizmo {
        dispose_calls: Rc<RefCell<u32>>,
    }

    impl Gizmo for FailingGizmo {
        fn set_enabled(&mut self, _enabled: bool) {}
        fn is_enabled(&self) -> bool {
            false
        }
        fn attach(&mut self, _target: Option<NodeId>) {}
        fn target(&self) -> Option<NodeId> {
            None
        }
        fn set_world_orientation(&mut self, _world: bool) {}
        fn set_world_drag_axes(&mut self, _world: bool) {}
        fn dispose(&mut self) -> std::result::Result<(), GizmoError> {
            *self.dispose_calls.borrow_mut() += 1;
            Err(GizmoError::Backend("handle already released".into()))
        }
    }

    #[test]
    fn dispose_swallows_widget_failures_and_is_idempotent() {
        let _ = env_logger::builder().is_test(true).try_init();
        let calls = Rc::new(RefCell::new(0));
        let mut rig = GizmoRig::new(
            Box::new(FailingGizmo {
                dispose_calls: Rc::clone(&calls),
            }),
            Box::new(HeadlessGizmo::new(GizmoKind::Rotate)),
            Box::new(HeadlessGizmo::new(GizmoKind::Scale)),
        );
        rig.dispose();
        rig.dispose();
        assert_eq!(*calls.borrow(), 1);
    }
}
