//! Selection and transform-mode state machine.
//!
//! Tracks the selected node and active mode, applies the scale-normalization
//! policy on entry into rotation mode, and keeps the gizmo rig in sync.
//! Operations report what actually changed so the caller can notify
//! listeners exactly once per call.

use glam::Vec3;

use crate::gizmo::GizmoRig;
use crate::scene::{NodeId, PickResult, SceneHost};
use crate::transform::{
    is_non_uniform, uniform_scale, NormalizeMethod, ScaleNormalization, TransformMode,
    TransformSnapshot,
};

/// Cap on parent-chain walks, against malformed cyclic links from a
/// misbehaving host.
const MAX_PARENT_DEPTH: usize = 256;

/// Outcome of a pick-driven selection request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickOutcome {
    /// False when the request was ignored (drag in progress).
    pub applied: bool,
    /// The resolved selection after the request.
    pub target: Option<NodeId>,
}

/// Outcome of a mode-change request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeChange {
    /// False when the request was ignored (drag in progress).
    pub applied: bool,
    /// The uniform scale written by the auto-normalize policy, if it fired.
    pub normalized: Option<Vec3>,
    /// Whether a policy warning was emitted.
    pub warned: bool,
}

impl ModeChange {
    fn rejected() -> Self {
        Self {
            applied: false,
            normalized: None,
            warned: false,
        }
    }
}

pub struct TransformEngine {
    selected: Option<NodeId>,
    mode: TransformMode,
    policy: ScaleNormalization,
}

impl TransformEngine {
    pub fn new(policy: ScaleNormalization) -> Self {
        Self {
            selected: None,
            mode: TransformMode::None,
            policy,
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn policy(&self) -> ScaleNormalization {
        self.policy
    }

    /// Resolve a pointer pick. A hit selects the topmost transform-bearing
    /// ancestor and auto-switches to Position so the object can be moved
    /// immediately; a miss (or a stale/non-pickable id) clears selection and
    /// mode.
    pub fn select_by_pick(
        &mut self,
        host: &mut dyn SceneHost,
        rig: &mut GizmoRig,
        pick: &PickResult,
    ) -> PickOutcome {
        if rig.drag_active() {
            log::debug!("pick ignored during active drag");
            return PickOutcome {
                applied: false,
                target: self.selected,
            };
        }
        let hit = pick
            .picked
            .filter(|&node| host.contains(node) && host.is_pickable(node));
        match hit {
            Some(node) => {
                let target = resolve_target(host, node);
                self.selected = Some(target);
                self.mode = TransformMode::Position;
                rig.sync(self.mode, self.selected);
                PickOutcome {
                    applied: true,
                    target: Some(target),
                }
            }
            None => {
                self.selected = None;
                self.mode = TransformMode::None;
                rig.sync(self.mode, self.selected);
                PickOutcome {
                    applied: true,
                    target: None,
                }
            }
        }
    }

    /// Programmatic selection; keeps the current mode. Unknown ids
    /// deselect.
    pub fn select_direct(
        &mut self,
        host: &mut dyn SceneHost,
        rig: &mut GizmoRig,
        node: Option<NodeId>,
    ) -> bool {
        if rig.drag_active() {
            log::debug!("selection change ignored during active drag");
            return false;
        }
        let resolved = match node {
            Some(id) if host.contains(id) => Some(id),
            Some(id) => {
                log::warn!("select_direct: unknown node {:?}, clearing selection", id);
                None
            }
            None => None,
        };
        self.selected = resolved;
        rig.sync(self.mode, self.selected);
        true
    }

    /// Change the active mode. Entering Rotation with a non-uniformly
    /// scaled selection runs the normalization policy; without
    /// auto-normalize the scale is left untouched and rotation-gizmo
    /// behavior is unreliable (documented caveat, not corrected).
    pub fn set_mode(
        &mut self,
        host: &mut dyn SceneHost,
        rig: &mut GizmoRig,
        mode: TransformMode,
    ) -> ModeChange {
        if rig.drag_active() {
            log::debug!("mode change to {:?} ignored during active drag", mode);
            return ModeChange::rejected();
        }

        let mut normalized = None;
        let mut warned = false;
        if mode == TransformMode::Rotation && self.mode != TransformMode::Rotation {
            if let Some((node, scale)) = self
                .selected
                .and_then(|node| host.scale(node).map(|scale| (node, scale)))
            {
                if is_non_uniform(scale) {
                    if self.policy.auto_normalize {
                        let uniform = Vec3::splat(uniform_scale(scale, self.policy.method));
                        host.set_scale(node, uniform);
                        normalized = Some(uniform);
                        if self.policy.warn {
                            warned = true;
                            log::warn!(
                                "non-uniform scale {:?} normalized to {:.3} before rotation",
                                scale,
                                uniform.x
                            );
                        }
                    } else if self.policy.warn {
                        warned = true;
                        log::warn!(
                            "rotation gizmo on non-uniformly scaled node {:?}; \
                             behavior may be unreliable",
                            scale
                        );
                    }
                }
            }
        }

        self.mode = mode;
        rig.sync(self.mode, self.selected);
        ModeChange {
            applied: true,
            normalized,
            warned,
        }
    }

    /// Deselect and drop back to no mode (the Escape path). Returns false
    /// when there was nothing to clear or a drag is in progress.
    pub fn clear(&mut self, rig: &mut GizmoRig) -> bool {
        if rig.drag_active() {
            log::debug!("clear ignored during active drag");
            return false;
        }
        if self.selected.is_none() && self.mode == TransformMode::None {
            return false;
        }
        self.selected = None;
        self.mode = TransformMode::None;
        rig.sync(self.mode, self.selected);
        true
    }

    /// Copy of the selected node's transform, or `None` without selection.
    pub fn snapshot(&self, host: &dyn SceneHost) -> Option<TransformSnapshot> {
        let node = self.selected?;
        Some(TransformSnapshot {
            name: host.name(node)?.to_string(),
            position: host.position(node)?,
            rotation: host.rotation(node)?,
            scale: host.scale(node)?,
        })
    }

    pub fn set_position(&mut self, host: &mut dyn SceneHost, position: Vec3) -> bool {
        match self.selected {
            Some(node) => host.set_position(node, position),
            None => false,
        }
    }

    pub fn set_rotation(&mut self, host: &mut dyn SceneHost, rotation: Vec3) -> bool {
        match self.selected {
            Some(node) => host.set_rotation(node, rotation),
            None => false,
        }
    }

    pub fn set_scale(&mut self, host: &mut dyn SceneHost, scale: Vec3) -> bool {
        match self.selected {
            Some(node) => host.set_scale(node, scale),
            None => false,
        }
    }

    /// One-shot manual normalization. The method is an explicit parameter
    /// defaulting to the configured one; the policy itself is never
    /// mutated. Returns false when no selection or already uniform.
    pub fn normalize_scale(
        &mut self,
        host: &mut dyn SceneHost,
        method: Option<NormalizeMethod>,
    ) -> bool {
        let Some(node) = self.selected else {
            return false;
        };
        let Some(scale) = host.scale(node) else {
            return false;
        };
        if !is_non_uniform(scale) {
            return false;
        }
        let method = method.unwrap_or(self.policy.method);
        host.set_scale(node, Vec3::splat(uniform_scale(scale, method)))
    }

    /// Called when the host destroyed a node. Clears selection and mode if
    /// the deleted node was selected.
    pub fn node_removed(&mut self, rig: &mut GizmoRig, node: NodeId) -> bool {
        if self.selected != Some(node) {
            return false;
        }
        self.selected = None;
        self.mode = TransformMode::None;
        rig.sync(self.mode, self.selected);
        true
    }
}

/// Walk to the topmost transform-bearing ancestor.
fn resolve_target(host: &dyn SceneHost, node: NodeId) -> NodeId {
    let mut current = node;
    for _ in 0..MAX_PARENT_DEPTH {
        match host.parent(current) {
            Some(parent) if parent != current => current = parent,
            _ => return current,
        }
    }
    log::warn!("parent chain exceeds {} levels; using last node", MAX_PARENT_DEPTH);
    current
}
