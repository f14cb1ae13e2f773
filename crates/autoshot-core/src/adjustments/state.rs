//! The flat adjustment record edited by the sliders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All visual knobs of the editor.
///
/// Multipliers are percentages (100 = unchanged), offsets are centered on 0.
/// Values may be out of range while stored; every renderer goes through
/// [`AdjustmentState::clamped`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustmentState {
    /// Brightness (0 to 200 %)
    pub brightness: f32,
    /// Contrast (0 to 200 %)
    pub contrast: f32,
    /// Saturation (0 to 200 %)
    pub saturation: f32,
    /// Exposure (50 to 150 %), multiplies brightness
    pub exposure: f32,
    /// Shadows (-50 to 50)
    pub shadows: f32,
    /// Highlights (-50 to 50)
    pub highlights: f32,
    /// Sharpen (0 to 100)
    pub sharpen: f32,
    /// Hue rotation (0 to 360 degrees)
    pub hue_rotate: f32,
    /// Grayscale (0 to 100 %)
    pub grayscale: f32,
    /// Sepia (0 to 100 %)
    pub sepia: f32,
    /// Vignette strength (0 to 100)
    pub vignette: f32,
    /// Film grain (0 to 100)
    pub noise: f32,
    /// Warm (+) / cool (-) cast (-50 to 50)
    pub temperature: f32,
    /// Magenta (+) / green (-) cast (-50 to 50)
    pub tint: f32,
    /// Local contrast (0 to 100)
    pub clarity: f32,
    /// Gaussian blur radius in pixels (0 to 20)
    pub blur: f32,
    /// Rotation in degrees, clockwise, applied mod 360
    pub rotate: i32,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            exposure: 100.0,
            shadows: 0.0,
            highlights: 0.0,
            sharpen: 0.0,
            hue_rotate: 0.0,
            grayscale: 0.0,
            sepia: 0.0,
            vignette: 0.0,
            noise: 0.0,
            temperature: 0.0,
            tint: 0.0,
            clarity: 0.0,
            blur: 0.0,
            rotate: 0,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl AdjustmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        self.clamped() == Self::default()
    }

    /// The documented default record.
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Read one numeric knob.
    pub fn get(&self, knob: Adjustment) -> f32 {
        match knob {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Exposure => self.exposure,
            Adjustment::Shadows => self.shadows,
            Adjustment::Highlights => self.highlights,
            Adjustment::Sharpen => self.sharpen,
            Adjustment::HueRotate => self.hue_rotate,
            Adjustment::Grayscale => self.grayscale,
            Adjustment::Sepia => self.sepia,
            Adjustment::Vignette => self.vignette,
            Adjustment::Noise => self.noise,
            Adjustment::Temperature => self.temperature,
            Adjustment::Tint => self.tint,
            Adjustment::Clarity => self.clarity,
            Adjustment::Blur => self.blur,
            Adjustment::Rotate => self.rotate as f32,
        }
    }

    fn slot(&mut self, knob: Adjustment) -> Option<&mut f32> {
        Some(match knob {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Exposure => &mut self.exposure,
            Adjustment::Shadows => &mut self.shadows,
            Adjustment::Highlights => &mut self.highlights,
            Adjustment::Sharpen => &mut self.sharpen,
            Adjustment::HueRotate => &mut self.hue_rotate,
            Adjustment::Grayscale => &mut self.grayscale,
            Adjustment::Sepia => &mut self.sepia,
            Adjustment::Vignette => &mut self.vignette,
            Adjustment::Noise => &mut self.noise,
            Adjustment::Temperature => &mut self.temperature,
            Adjustment::Tint => &mut self.tint,
            Adjustment::Clarity => &mut self.clarity,
            Adjustment::Blur => &mut self.blur,
            Adjustment::Rotate => return None,
        })
    }

    /// Set one knob, clamping into its range.
    pub fn set(&mut self, knob: Adjustment, value: f32) {
        let value = knob.clamp(value);
        match self.slot(knob) {
            Some(slot) => *slot = value,
            None => self.rotate = normalize_rotation(value.round() as i32),
        }
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.rotate = normalize_rotation(normalize_rotation(self.rotate) - 90);
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_right(&mut self) {
        self.rotate = normalize_rotation(normalize_rotation(self.rotate) + 90);
    }

    /// Rotation normalized into 0..360.
    pub fn rotation_degrees(&self) -> u32 {
        normalize_rotation(self.rotate) as u32
    }

    /// A copy with every knob pulled into its valid range.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for knob in Adjustment::ALL {
            if let Some(slot) = out.slot(knob) {
                *slot = knob.clamp(*slot);
            }
        }
        out.rotate = normalize_rotation(self.rotate);
        out
    }
}

fn normalize_rotation(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Error returned for an unknown adjustment name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown adjustment: {0}")]
pub struct UnknownAdjustment(pub String);

/// Names of the numeric knobs in [`AdjustmentState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Exposure,
    Shadows,
    Highlights,
    Sharpen,
    HueRotate,
    Grayscale,
    Sepia,
    Vignette,
    Noise,
    Temperature,
    Tint,
    Clarity,
    Blur,
    Rotate,
}

impl Adjustment {
    pub const ALL: [Adjustment; 17] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Saturation,
        Adjustment::Exposure,
        Adjustment::Shadows,
        Adjustment::Highlights,
        Adjustment::Sharpen,
        Adjustment::HueRotate,
        Adjustment::Grayscale,
        Adjustment::Sepia,
        Adjustment::Vignette,
        Adjustment::Noise,
        Adjustment::Temperature,
        Adjustment::Tint,
        Adjustment::Clarity,
        Adjustment::Blur,
        Adjustment::Rotate,
    ];

    /// Valid (min, max) range. Rotation is unbounded and wraps instead.
    pub fn range(self) -> (f32, f32) {
        match self {
            Adjustment::Brightness | Adjustment::Contrast | Adjustment::Saturation => (0.0, 200.0),
            Adjustment::Exposure => (50.0, 150.0),
            Adjustment::Shadows
            | Adjustment::Highlights
            | Adjustment::Temperature
            | Adjustment::Tint => (-50.0, 50.0),
            Adjustment::Sharpen
            | Adjustment::Grayscale
            | Adjustment::Sepia
            | Adjustment::Vignette
            | Adjustment::Noise
            | Adjustment::Clarity => (0.0, 100.0),
            Adjustment::HueRotate => (0.0, 360.0),
            Adjustment::Blur => (0.0, 20.0),
            Adjustment::Rotate => (f32::MIN, f32::MAX),
        }
    }

    /// Default value of the knob.
    pub fn default_value(self) -> f32 {
        AdjustmentState::default().get(self)
    }

    /// Clamp into range; NaN maps to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// camelCase name used by the page.
    pub fn name(self) -> &'static str {
        match self {
            Adjustment::Brightness => "brightness",
            Adjustment::Contrast => "contrast",
            Adjustment::Saturation => "saturation",
            Adjustment::Exposure => "exposure",
            Adjustment::Shadows => "shadows",
            Adjustment::Highlights => "highlights",
            Adjustment::Sharpen => "sharpen",
            Adjustment::HueRotate => "hueRotate",
            Adjustment::Grayscale => "grayscale",
            Adjustment::Sepia => "sepia",
            Adjustment::Vignette => "vignette",
            Adjustment::Noise => "noise",
            Adjustment::Temperature => "temperature",
            Adjustment::Tint => "tint",
            Adjustment::Clarity => "clarity",
            Adjustment::Blur => "blur",
            Adjustment::Rotate => "rotate",
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Adjustment {
    type Err = UnknownAdjustment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['_', '-'], "").to_ascii_lowercase();
        Adjustment::ALL
            .into_iter()
            .find(|knob| knob.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| UnknownAdjustment(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_default() {
        assert!(AdjustmentState::new().is_default());
    }

    #[test]
    fn test_not_default() {
        let mut adj = AdjustmentState::new();
        adj.vignette = 10.0;
        assert!(!adj.is_default());
    }

    #[test]
    fn test_full_turn_is_default() {
        let mut adj = AdjustmentState::new();
        adj.rotate = 720;
        assert!(adj.is_default());
    }

    #[test]
    fn test_set_clamps() {
        let mut adj = AdjustmentState::new();
        adj.set(Adjustment::Brightness, 500.0);
        adj.set(Adjustment::Temperature, -80.0);
        adj.set(Adjustment::Exposure, 10.0);
        assert_eq!(adj.brightness, 200.0);
        assert_eq!(adj.temperature, -50.0);
        assert_eq!(adj.exposure, 50.0);
    }

    #[test]
    fn test_set_nan_uses_default() {
        let mut adj = AdjustmentState::new();
        adj.set(Adjustment::Contrast, f32::NAN);
        assert_eq!(adj.contrast, 100.0);
    }

    #[test]
    fn test_set_rotate_wraps() {
        let mut adj = AdjustmentState::new();
        adj.set(Adjustment::Rotate, -90.0);
        assert_eq!(adj.rotate, 270);
        adj.set(Adjustment::Rotate, 450.0);
        assert_eq!(adj.rotate, 90);
    }

    #[test]
    fn test_rotate_steps() {
        let mut adj = AdjustmentState::new();
        adj.rotate_left();
        assert_eq!(adj.rotation_degrees(), 270);
        adj.rotate_right();
        adj.rotate_right();
        assert_eq!(adj.rotation_degrees(), 90);
    }

    #[test]
    fn test_clamped_pulls_everything_in() {
        let mut adj = AdjustmentState::new();
        adj.saturation = -4.0;
        adj.hue_rotate = 400.0;
        adj.blur = 99.0;
        adj.rotate = -450;
        let c = adj.clamped();
        assert_eq!(c.saturation, 0.0);
        assert_eq!(c.hue_rotate, 360.0);
        assert_eq!(c.blur, 20.0);
        assert_eq!(c.rotate, 270);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("hueRotate".parse::<Adjustment>().unwrap(), Adjustment::HueRotate);
        assert_eq!("hue_rotate".parse::<Adjustment>().unwrap(), Adjustment::HueRotate);
        assert_eq!(" Tint ".parse::<Adjustment>().unwrap(), Adjustment::Tint);
        assert!("sparkle".parse::<Adjustment>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for knob in Adjustment::ALL {
            assert_eq!(knob.to_string().parse::<Adjustment>().unwrap(), knob);
        }
    }

    #[test]
    fn test_serde_camel_case() {
        let mut adj = AdjustmentState::new();
        adj.flip_x = true;
        adj.hue_rotate = 45.0;
        let json = serde_json::to_string(&adj).unwrap();
        assert!(json.contains("\"flipX\":true"));
        assert!(json.contains("\"hueRotate\":45.0"));

        let partial: AdjustmentState = serde_json::from_str(r#"{"sepia": 30}"#).unwrap();
        assert_eq!(partial.sepia, 30.0);
        assert_eq!(partial.brightness, 100.0);
    }
}
