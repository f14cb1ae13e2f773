//! Crate-level error type.

use thiserror::Error;

use crate::crop::CropError;
use crate::decode::DecodeError;
use crate::editor::EditorError;
use crate::encode::EncodeError;
use crate::export::ExportError;
use crate::raster::ParseColorError;
use crate::segment::SegmentationError;

/// Any error the engine can report.
#[derive(Debug, Error)]
pub enum Error {
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

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Color(#[from] ParseColorError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
