//! Image upload and insertion.
//!
//! # Responsibility
//! - Validate image input, upload it, probe its size and insert it.
//! - Fit inserted images to the width available at the selection.
//!
//! # Invariants
//! - Nothing is inserted unless upload and dimension probing both succeed.
//! - Clamping keeps the aspect ratio and never enlarges an image.

use crate::editor::engine::{EditorEngine, EditorError, ImageAttributes};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IMAGE_MIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image/[A-Za-z0-9.+-]+$").expect("valid image mime regex"));

/// Raw image picked from disk or pasted from the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One clipboard entry offered by a paste event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime_type: String,
    /// File payload, when the entry can be read as a file.
    pub file: Option<ImageBlob>,
}

#[derive(Debug)]
pub enum UploadError {
    NotAnImage(String),
    Upload(String),
    EmptyUrl,
    Probe(String),
    Editor(EditorError),
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnImage(mime) => write!(f, "not an image: `{mime}`"),
            Self::Upload(message) => write!(f, "image upload failed: {message}"),
            Self::EmptyUrl => write!(f, "image upload returned an empty url"),
            Self::Probe(message) => write!(f, "image dimension probe failed: {message}"),
            Self::Editor(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Editor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EditorError> for UploadError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value)
    }
}

/// Image hosting collaborator.
pub trait ImageUploadService {
    /// Uploads the blob and returns its public URL.
    fn upload(&self, image: &ImageBlob) -> Result<String, UploadError>;

    /// Returns the natural `(width, height)` of the image at `url`.
    fn probe_dimensions(&self, url: &str) -> Result<(u32, u32), UploadError>;
}

pub fn is_image_mime(mime_type: &str) -> bool {
    IMAGE_MIME_RE.is_match(mime_type.trim())
}

/// First clipboard entry that is a readable image file.
pub fn first_image_item(items: &[ClipboardItem]) -> Option<&ImageBlob> {
    items
        .iter()
        .filter(|item| is_image_mime(&item.mime_type))
        .find_map(|item| item.file.as_ref())
}

/// Scales `(width, height)` down to `max_width`, keeping the aspect ratio.
///
/// A missing or zero `max_width`, or an image already narrow enough, is
/// returned unchanged.
pub fn clamp_to_max_width(width: u32, height: u32, max_width: Option<u32>) -> (u32, u32) {
    match max_width {
        Some(max) if max > 0 && width > max => {
            let scaled = (f64::from(height) * f64::from(max) / f64::from(width)).round();
            (max, (scaled as u32).max(1))
        }
        _ => (width, height),
    }
}

/// Width an image may take in `editor`: the selection width, else the
/// viewport width minus `padding`.
pub fn max_image_width(editor: &dyn EditorEngine, padding: u32) -> Option<u32> {
    editor
        .selection_width()
        .or_else(|| editor.viewport_width().map(|width| width.saturating_sub(padding)))
}

/// Uploads `image` and inserts it into `editor` at the current selection.
pub fn upload_and_insert(
    editor: &dyn EditorEngine,
    image: &ImageBlob,
    uploader: &dyn ImageUploadService,
    padding: u32,
) -> Result<ImageAttributes, UploadError> {
    if !is_image_mime(&image.mime_type) {
        return Err(UploadError::NotAnImage(image.mime_type.clone()));
    }

    let result = upload_inner(editor, image, uploader, padding);
    match &result {
        Ok(attributes) => info!(
            "event=image_insert module=images status=ok slot={} width={:?} height={:?}",
            editor.config().slot,
            attributes.width,
            attributes.height
        ),
        Err(err) => error!(
            "event=image_insert module=images status=error slot={} error={err}",
            editor.config().slot
        ),
    }
    result
}

fn upload_inner(
    editor: &dyn EditorEngine,
    image: &ImageBlob,
    uploader: &dyn ImageUploadService,
    padding: u32,
) -> Result<ImageAttributes, UploadError> {
    let url = uploader.upload(image)?;
    if url.trim().is_empty() {
        return Err(UploadError::EmptyUrl);
    }
    let (width, height) = uploader.probe_dimensions(&url)?;
    let (width, height) = clamp_to_max_width(width, height, max_image_width(editor, padding));
    let attributes = ImageAttributes {
        src: url,
        width: Some(width),
        height: Some(height),
    };
    editor.focus()?;
    editor.insert_image(&attributes)?;
    Ok(attributes)
}
