//! Per-file transform: one staged source in, one thumbnail per width out

use super::calculations::target_dimensions;
use super::codec;
use crate::error::TransformError;
use crate::types::{Event, ProcessedImage};
use crate::utils::thumbnail_filename;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// A thumbnail written under its temporary name, waiting to be published
struct PendingOutput {
    temp_path: PathBuf,
    final_path: PathBuf,
    width: u32,
    height: u32,
}

/// Derive every thumbnail for `filename` and remove the source on success
///
/// Blocking: decodes, resizes and writes synchronously. Outputs are first
/// written under hidden temporary names and only renamed into place once
/// every width succeeded; the source is removed last. On failure the
/// temporaries and any thumbnails already renamed are removed, and the
/// source is left in the staging area.
pub(crate) fn transform_file(
    filename: &str,
    staging_dir: &Path,
    output_dir: &Path,
    target_sizes: &[u32],
    event_tx: &broadcast::Sender<Event>,
) -> Result<ProcessedImage, TransformError> {
    let source_path = staging_dir.join(filename);
    debug!(source = %source_path.display(), "resizing image");

    let bytes = std::fs::read(&source_path).map_err(|e| TransformError::Io {
        path: source_path.clone(),
        source: e,
    })?;
    let image = codec::decode(&bytes, &source_path)?;
    let format = codec::output_format(&bytes, &source_path)?;

    let mut pending = Vec::with_capacity(target_sizes.len());
    if let Err(e) = render_all(
        &image,
        format,
        filename,
        &source_path,
        output_dir,
        target_sizes,
        &mut pending,
    ) {
        discard(&pending);
        return Err(e);
    }

    let mut outputs = Vec::with_capacity(pending.len());
    for (index, output) in pending.iter().enumerate() {
        if let Err(e) = std::fs::rename(&output.temp_path, &output.final_path) {
            unpublish(&pending[..index]);
            discard(&pending[index..]);
            return Err(TransformError::Io {
                path: output.final_path.clone(),
                source: e,
            });
        }
        event_tx
            .send(Event::ThumbnailCreated {
                source: filename.to_string(),
                path: output.final_path.clone(),
                width: output.width,
                height: output.height,
            })
            .ok();
        outputs.push(output.final_path.clone());
    }

    std::fs::remove_file(&source_path).map_err(|e| TransformError::Io {
        path: source_path.clone(),
        source: e,
    })?;
    event_tx
        .send(Event::SourceRemoved {
            source: filename.to_string(),
        })
        .ok();

    Ok(ProcessedImage {
        source: filename.to_string(),
        outputs,
    })
}

fn render_all(
    image: &image::DynamicImage,
    format: image::ImageFormat,
    filename: &str,
    source_path: &Path,
    output_dir: &Path,
    target_sizes: &[u32],
    pending: &mut Vec<PendingOutput>,
) -> Result<(), TransformError> {
    let (width, height) = (image.width(), image.height());

    for &target_width in target_sizes {
        let (w, h) = target_dimensions(width, height, target_width).ok_or_else(|| {
            TransformError::InvalidDimensions {
                path: source_path.to_path_buf(),
                width,
                height,
                target_width,
            }
        })?;

        let output_name = thumbnail_filename(filename, target_width);
        let final_path = output_dir.join(&output_name);
        let temp_path = output_dir.join(format!(".{output_name}.part"));

        let resized = codec::resize(image, w, h);
        let encoded = codec::encode(&resized, format, &final_path)?;
        std::fs::write(&temp_path, encoded).map_err(|e| TransformError::Io {
            path: temp_path.clone(),
            source: e,
        })?;

        pending.push(PendingOutput {
            temp_path,
            final_path,
            width: w,
            height: h,
        });
    }

    Ok(())
}

fn discard(pending: &[PendingOutput]) {
    for output in pending {
        if let Err(e) = std::fs::remove_file(&output.temp_path) {
            warn!(path = %output.temp_path.display(), error = %e, "failed to remove temporary thumbnail");
        }
    }
}

fn unpublish(published: &[PendingOutput]) {
    for output in published {
        if let Err(e) = std::fs::remove_file(&output.final_path) {
            warn!(path = %output.final_path.display(), error = %e, "failed to remove thumbnail of failed source");
        }
    }
}
