//! Named one-click looks.
//!
//! Applying a preset replaces the whole [`AdjustmentState`]; geometry is
//! part of the state, so a preset also clears rotation and flips.

use serde::Serialize;

use super::AdjustmentState;

/// A named, fully specified adjustment snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterPreset {
    pub name: &'static str,
    pub adjustments: AdjustmentState,
}

/// Built-in presets in the order the filter strip shows them.
pub fn builtin_presets() -> Vec<FilterPreset> {
    let base = AdjustmentState::default();
    vec![
        FilterPreset {
            name: "Original",
            adjustments: base.clone(),
        },
        FilterPreset {
            name: "Showroom",
            adjustments: AdjustmentState {
                brightness: 108.0,
                contrast: 115.0,
                saturation: 120.0,
                sharpen: 20.0,
                clarity: 25.0,
                vignette: 15.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Vivid",
            adjustments: AdjustmentState {
                contrast: 120.0,
                saturation: 150.0,
                clarity: 30.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Vintage",
            adjustments: AdjustmentState {
                contrast: 90.0,
                saturation: 80.0,
                sepia: 40.0,
                vignette: 40.0,
                noise: 20.0,
                temperature: 20.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Noir",
            adjustments: AdjustmentState {
                contrast: 140.0,
                grayscale: 100.0,
                vignette: 35.0,
                noise: 10.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Neon Night",
            adjustments: AdjustmentState {
                brightness: 90.0,
                contrast: 125.0,
                saturation: 170.0,
                hue_rotate: 280.0,
                vignette: 30.0,
                temperature: -30.0,
                tint: 25.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Golden Hour",
            adjustments: AdjustmentState {
                brightness: 105.0,
                saturation: 115.0,
                highlights: 10.0,
                vignette: 20.0,
                temperature: 40.0,
                ..base.clone()
            },
        },
        FilterPreset {
            name: "Arctic",
            adjustments: AdjustmentState {
                brightness: 105.0,
                saturation: 85.0,
                clarity: 15.0,
                temperature: -35.0,
                ..base
            },
        },
    ]
}

/// Look up a built-in preset by name, ignoring case and surrounding space.
pub fn find_preset(name: &str) -> Option<FilterPreset> {
    let wanted = name.trim();
    builtin_presets()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
}
