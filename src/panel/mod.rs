//! Property-panel projection of the selected node's transform.
//!
//! The panel shows display-friendly values: positions and scales rounded to
//! three decimals, rotations in degrees rounded to one. The live model stays
//! in radians and full precision.

use serde::Serialize;

use crate::transform::{TransformMode, TransformSnapshot};

fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// Display form of one transform snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelTransform {
    pub name: String,
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
}

impl PanelTransform {
    pub fn from_snapshot(snapshot: &TransformSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            position: snapshot.position.to_array().map(|v| round_to(v, 3)),
            rotation_deg: snapshot
                .rotation
                .to_array()
                .map(|v| round_to(v.to_degrees(), 1)),
            scale: snapshot.scale.to_array().map(|v| round_to(v, 3)),
        }
    }
}

/// UI-side state fed by the controller's change listeners.
#[derive(Debug, Default)]
pub struct PanelState {
    transform: Option<PanelTransform>,
    mode: TransformMode,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire as a transform-changed listener. `None` clears the panel.
    pub fn apply_snapshot(&mut self, snapshot: Option<&TransformSnapshot>) {
        self.transform = snapshot.map(PanelTransform::from_snapshot);
    }

    /// Wire as a mode-changed listener.
    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn transform(&self) -> Option<&PanelTransform> {
        self.transform.as_ref()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }
}
