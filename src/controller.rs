//! The editor-facing controller: selection, mode switching, gizmo drags,
//! keyboard shortcuts, and change notification behind one facade.
//!
//! Everything runs on the UI thread. The scene host is shared with the
//! render loop through `Rc<RefCell<_>>`; the controller borrows it only for
//! the duration of one operation, and listeners are invoked after all
//! interior borrows are released. Listeners must not call back into
//! mutating controller methods from inside a callback.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::gizmo::{GizmoKind, GizmoRig};
use crate::input::{shortcut_action, KeyEventBus, KeySubscription, ShortcutAction};
use crate::notify::{ChangeNotifier, ListenerId};
use crate::scene::{NodeId, PickResult, SceneHost};
use crate::transform::engine::TransformEngine;
use crate::transform::{
    NormalizeMethod, ScaleNormalization, TransformMode, TransformSnapshot,
};

struct EditorState<H: SceneHost> {
    host: Rc<RefCell<H>>,
    engine: TransformEngine,
    rig: GizmoRig,
}

/// Coordinates pointer picking, transform modes, gizmo widgets, and change
/// notification for one editor session.
pub struct TransformController<H: SceneHost + 'static> {
    state: Rc<RefCell<EditorState<H>>>,
    notifier: Rc<ChangeNotifier>,
    keyboard: Option<KeySubscription>,
}

impl<H: SceneHost + 'static> TransformController<H> {
    /// Wire a controller to a shared scene host and a key-event bus. The
    /// keyboard subscription lives until [`dispose`](Self::dispose) (or
    /// drop); the normalization policy is fixed for the session.
    pub fn new(
        host: Rc<RefCell<H>>,
        keyboard: &KeyEventBus,
        rig: GizmoRig,
        policy: ScaleNormalization,
    ) -> Self {
        let state = Rc::new(RefCell::new(EditorState {
            host,
            engine: TransformEngine::new(policy),
            rig,
        }));
        let notifier = Rc::new(ChangeNotifier::new());

        let subscription = {
            let state = Rc::clone(&state);
            let notifier = Rc::clone(&notifier);
            keyboard.subscribe(move |event| {
                if event.from_text_input {
                    return;
                }
                match shortcut_action(&event.key) {
                    Some(ShortcutAction::SetMode(mode)) => {
                        apply_mode(&state, &notifier, mode);
                    }
                    Some(ShortcutAction::ClearSelection) => {
                        apply_clear(&state, &notifier);
                    }
                    None => {}
                }
            })
        };

        log::info!("transform controller initialized");
        Self {
            state,
            notifier,
            keyboard: Some(subscription),
        }
    }

    /// Resolve a pointer pick: a hit selects the topmost transform-bearing
    /// ancestor and switches to Position mode, a miss deselects. Returns
    /// the resolved target.
    pub fn handle_pick(&mut self, pick: &PickResult) -> Option<NodeId> {
        let (outcome, snapshot, mode) = {
            let EditorState { host, engine, rig } = &mut *self.state.borrow_mut();
            let host = &mut *host.borrow_mut();
            let outcome = engine.select_by_pick(host, rig, pick);
            (outcome, engine.snapshot(host), engine.mode())
        };
        if outcome.applied {
            self.notifier.emit_mode(mode);
            self.notifier.emit_transform(snapshot.as_ref());
        }
        outcome.target
    }

    /// Programmatic selection (e.g. a just-imported object); keeps the
    /// current mode.
    pub fn select(&mut self, node: Option<NodeId>) {
        let (applied, snapshot) = {
            let EditorState { host, engine, rig } = &mut *self.state.borrow_mut();
            let host = &mut *host.borrow_mut();
            let applied = engine.select_direct(host, rig, node);
            (applied, engine.snapshot(host))
        };
        if applied {
            self.notifier.emit_transform(snapshot.as_ref());
        }
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        apply_mode(&self.state, &self.notifier, mode);
    }

    /// Deselect and hide the gizmo (the Escape action).
    pub fn clear_selection(&mut self) {
        apply_clear(&self.state, &self.notifier);
    }

    pub fn mode(&self) -> TransformMode {
        self.state.borrow().engine.mode()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.state.borrow().engine.selected()
    }

    /// Copy of the selected node's transform, or `None` without selection.
    pub fn transform(&self) -> Option<TransformSnapshot> {
        let state = self.state.borrow();
        let host = state.host.borrow();
        state.engine.snapshot(&*host)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.mutate(|engine, host| engine.set_position(host, position));
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.mutate(|engine, host| engine.set_rotation(host, rotation));
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.mutate(|engine, host| engine.set_scale(host, scale));
    }

    /// Manually collapse the selection's scale to a uniform value. Returns
    /// whether anything changed.
    pub fn normalize_scale_to_uniform(&mut self, method: Option<NormalizeMethod>) -> bool {
        let mut changed = false;
        self.mutate(|engine, host| {
            changed = engine.normalize_scale(host, method);
            changed
        });
        changed
    }

    /// Enter the gizmo drag critical section; mode and selection changes
    /// are ignored until the drag ends.
    pub fn begin_gizmo_drag(&mut self, kind: GizmoKind) -> bool {
        self.state.borrow_mut().rig.begin_drag(kind)
    }

    /// Leave the drag critical section and publish the dragged transform.
    pub fn end_gizmo_drag(&mut self) {
        let snapshot = {
            let EditorState { host, engine, rig } = &mut *self.state.borrow_mut();
            if rig.end_drag().is_none() {
                return;
            }
            let host = host.borrow();
            engine.snapshot(&*host)
        };
        self.notifier.emit_transform(snapshot.as_ref());
    }

    /// Tell the controller the host destroyed a node. Resets selection and
    /// mode if the deleted node was selected.
    pub fn node_removed(&mut self, node: NodeId) {
        let cleared = {
            let EditorState { engine, rig, .. } = &mut *self.state.borrow_mut();
            engine.node_removed(rig, node)
        };
        if cleared {
            self.notifier.emit_mode(TransformMode::None);
            self.notifier.emit_transform(None);
        }
    }

    pub fn on_transform_changed(
        &self,
        listener: impl FnMut(Option<&TransformSnapshot>) + 'static,
    ) -> ListenerId {
        self.notifier.on_transform_changed(listener)
    }

    pub fn on_mode_changed(&self, listener: impl FnMut(TransformMode) + 'static) -> ListenerId {
        self.notifier.on_mode_changed(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove(id)
    }

    /// Release the gizmo widgets and the keyboard subscription. Safe to
    /// call repeatedly; also runs on drop.
    pub fn dispose(&mut self) {
        if let Some(mut subscription) = self.keyboard.take() {
            subscription.close();
            self.state.borrow_mut().rig.dispose();
            log::info!("transform controller disposed");
        }
    }

    /// Run a transform mutation and notify once if it changed anything.
    fn mutate(&mut self, op: impl FnOnce(&mut TransformEngine, &mut dyn SceneHost) -> bool) {
        let snapshot = {
            let EditorState { host, engine, .. } = &mut *self.state.borrow_mut();
            let host = &mut *host.borrow_mut();
            if !op(engine, host) {
                return;
            }
            engine.snapshot(host)
        };
        self.notifier.emit_transform(snapshot.as_ref());
    }
}

impl<H: SceneHost + 'static> Drop for TransformController<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn apply_mode<H: SceneHost>(
    state: &Rc<RefCell<EditorState<H>>>,
    notifier: &ChangeNotifier,
    mode: TransformMode,
) {
    let (change, snapshot) = {
        let EditorState { host, engine, rig } = &mut *state.borrow_mut();
        let host = &mut *host.borrow_mut();
        let change = engine.set_mode(host, rig, mode);
        let snapshot = if change.normalized.is_some() {
            engine.snapshot(host)
        } else {
            None
        };
        (change, snapshot)
    };
    if !change.applied {
        return;
    }
    notifier.emit_mode(mode);
    if change.normalized.is_some() {
        // the policy rewrote the node's scale; publish the new transform
        notifier.emit_transform(snapshot.as_ref());
    }
}

fn apply_clear<H: SceneHost>(state: &Rc<RefCell<EditorState<H>>>, notifier: &ChangeNotifier) {
    let cleared = {
        let EditorState { engine, rig, .. } = &mut *state.borrow_mut();
        engine.clear(rig)
    };
    if cleared {
        notifier.emit_mode(TransformMode::None);
        notifier.emit_transform(None);
    }
}
