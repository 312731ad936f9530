//! Stagehand: selection, transform-mode, and gizmo coordination for a 3D
//! scene editor.
//!
//! The crate is backend-agnostic. A rendering engine exposes its scene
//! through the [`Transformable`]/[`Pickable`] capability traits and its
//! manipulation widgets through the [`Gizmo`] trait; [`TransformController`]
//! then drives picking, keyboard shortcuts, mode switching, drag critical
//! sections, and change notification on top of them. [`SceneGraph`] is a
//! self-contained host implementation used both standalone and as the test
//! double.
//!
//! All types are single-threaded; share the host with the controller via
//! `Rc<RefCell<_>>`.

pub mod controller;
pub mod gizmo;
pub mod input;
pub mod notify;
pub mod panel;
pub mod scene;
pub mod transform;

pub use controller::TransformController;
pub use gizmo::{Gizmo, GizmoError, GizmoKind, GizmoRig, HeadlessGizmo};
pub use input::{shortcut_action, KeyEvent, KeyEventBus, KeySubscription, ShortcutAction};
pub use notify::{ChangeNotifier, ListenerId};
pub use panel::{PanelState, PanelTransform};
pub use scene::{
    NodeId, PickResult, Pickable, SceneGraph, SceneHost, SceneNode, Transformable,
};
pub use transform::{
    NormalizeMethod, ScaleNormalization, TransformMode, TransformSnapshot,
    UNIFORM_SCALE_TOLERANCE,
};
