//! Editor session: the working image, the adjustment state and the active
//! tool, driven by [`Action`]s through [`reduce`].
//!
//! Destructive actions (upload, segmentation commit, chroma key, background
//! color, crop, blur) replace the working image wholesale and report the
//! superseded [`ImageHandle`] so the page can release its object URL. They
//! run under a single-flight guard: while an [`OperationToken`] is held,
//! further destructive actions fail with [`EditorError::Busy`].

mod reduce;

pub use reduce::reduce;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::adjustments::{compute_filter_descriptor, Adjustment, AdjustmentState, FilterDescriptor};
use crate::config::EngineConfig;
use crate::crop::CropError;
use crate::decode::{DecodeError, ImageFormat, SourceImage};
use crate::encode::EncodeError;
use crate::export::{DeliveryMethod, DownloadCapabilities, ExportError, ExportedImage};
use crate::raster::{PixelRect, Rgb, RgbaBuffer};
use crate::region::{BlurRegion, CropRegion, DisplayGeometry};
use crate::segment::{SegmentationError, ThresholdPreview};

/// Errors returned by [`reduce`]. The input state is never modified.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Another operation is in progress")]
    Busy,

    #[error("No image loaded")]
    NoImage,

    #[error("No {0} session is active")]
    NoActiveTool(&'static str),

    #[error("Display geometry {displayed_width}x{displayed_height} ({natural_width}x{natural_height} natural) does not match the {width}x{height} working image")]
    GeometryMismatch {
        displayed_width: f64,
        displayed_height: f64,
        natural_width: u32,
        natural_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Identity of one working image. Every replacement gets a fresh handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ImageHandle(pub u64);

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Proof that the holder owns the single destructive-operation slot.
///
/// Not `Clone`: only the holder can give the slot back.
#[derive(Debug, PartialEq, Eq)]
pub struct OperationToken {
    id: u64,
}

impl OperationToken {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// The raster currently shown and exported.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingImage {
    pub handle: ImageHandle,
    pub buffer: RgbaBuffer,
    /// Format the last destructive step produced.
    pub format: ImageFormat,
    pub has_transparency: bool,
}

impl WorkingImage {
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }
}

/// The interactive tool currently open, if any. Only one at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveTool {
    #[default]
    None,
    Segmentation {
        preview: ThresholdPreview,
        threshold: f32,
    },
    Crop {
        region: CropRegion,
        geometry: DisplayGeometry,
    },
    Blur {
        region: BlurRegion,
        geometry: DisplayGeometry,
    },
}

impl ActiveTool {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveTool::None => "none",
            ActiveTool::Segmentation { .. } => "segmentation",
            ActiveTool::Crop { .. } => "crop",
            ActiveTool::Blur { .. } => "blur",
        }
    }
}

/// Everything the page can ask the editor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Decode an upload and make it the working image.
    Load {
        bytes: Vec<u8>,
        file_name: Option<String>,
    },
    SetAdjustment(Adjustment, f32),
    SetFlipX(bool),
    SetFlipY(bool),
    RotateLeft,
    RotateRight,
    ApplyPreset(String),
    ResetAdjustments,

    /// Detect the background and render a preview at the default threshold.
    BeginSegmentation,
    PreviewThreshold(f32),
    CommitSegmentation(f32),
    CancelSegmentation,
    ChromaKeyFallback,
    ApplyBackgroundColor(Rgb),

    StartCrop(DisplayGeometry),
    MoveCrop { x: f64, y: f64 },
    ResizeCrop { width: f64, height: f64 },
    ApplyCrop,
    CancelCrop,

    StartBlur(DisplayGeometry),
    MoveBlur { x: f64, y: f64 },
    ResizeBlur { width: f64, height: f64 },
    ApplyBlur,
    CancelBlur,

    Export(DownloadCapabilities),
}

impl Action {
    /// Whether this action replaces the working image.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Action::Load { .. }
                | Action::CommitSegmentation(_)
                | Action::ChromaKeyFallback
                | Action::ApplyBackgroundColor(_)
                | Action::ApplyCrop
                | Action::ApplyBlur
        )
    }
}

/// Side effect the page must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show `encoded`, then release the object URL of `previous`.
    ImageReplaced {
        previous: Option<ImageHandle>,
        current: ImageHandle,
        encoded: Vec<u8>,
        mime: &'static str,
    },
    /// Show a segmentation preview (PNG). The working image is unchanged.
    PreviewRendered {
        encoded: Vec<u8>,
        background: Rgb,
        threshold: f32,
        transparent_pixels: usize,
    },
    /// Deliver the exported file.
    Exported {
        image: ExportedImage,
        delivery: DeliveryMethod,
    },
}

/// Result of a successful [`reduce`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: EditorState,
    pub effect: Option<Effect>,
}

/// Complete editor session.
#[derive(Debug, Clone)]
pub struct EditorState {
    /// The upload as decoded, never mutated.
    pub source: Option<SourceImage>,
    /// Name of the uploaded file, used to name the export.
    pub file_name: Option<String>,
    pub working: Option<WorkingImage>,
    pub adjustments: AdjustmentState,
    pub tool: ActiveTool,
    /// Applied blur regions in working-image pixels, re-applied on export.
    pub committed_blurs: Vec<PixelRect>,
    busy: Option<u64>,
    next_handle: u64,
    next_token: u64,
    config: EngineConfig,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EditorState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            source: None,
            file_name: None,
            working: None,
            adjustments: AdjustmentState::default(),
            tool: ActiveTool::None,
            committed_blurs: Vec::new(),
            busy: None,
            next_handle: 1,
            next_token: 1,
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Claim the destructive-operation slot.
    pub fn begin_operation(&mut self) -> Result<OperationToken, EditorError> {
        if self.busy.is_some() {
            log::warn!("Rejected operation: another one is in progress");
            return Err(EditorError::Busy);
        }
        let id = self.next_token;
        self.next_token += 1;
        self.busy = Some(id);
        Ok(OperationToken { id })
    }

    /// Release the slot. Returns false if `token` is not the current holder.
    pub fn finish_operation(&mut self, token: OperationToken) -> bool {
        if self.busy == Some(token.id) {
            self.busy = None;
            true
        } else {
            false
        }
    }

    pub fn working(&self) -> Result<&WorkingImage, EditorError> {
        self.working.as_ref().ok_or(EditorError::NoImage)
    }

    /// Descriptor of the current adjustments, for the live preview.
    pub fn descriptor(&self) -> FilterDescriptor {
        compute_filter_descriptor(&self.adjustments)
    }

    /// Install a new working image and return the effect announcing it.
    fn replace_working(&mut self, buffer: RgbaBuffer, format: ImageFormat, encoded: Vec<u8>) -> Effect {
        let previous = self.working.as_ref().map(|w| w.handle);
        let current = ImageHandle(self.next_handle);
        self.next_handle += 1;

        log::info!(
            "Working image {} replaced by {} ({}x{} {})",
            previous.map_or_else(|| "-".to_string(), |h| h.to_string()),
            current,
            buffer.width,
            buffer.height,
            format.mime_type()
        );

        self.tool = ActiveTool::None;
        self.working = Some(WorkingImage {
            handle: current,
            has_transparency: buffer.has_transparency(),
            buffer,
            format,
        });

        Effect::ImageReplaced {
            previous,
            current,
            encoded,
            mime: format.mime_type(),
        }
    }
}
