//! Frame sources feeding the capture loop.

use image::DynamicImage;
use log::debug;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The source could not be opened at all.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("failed to read frame {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Supplier of frames. `Ok(None)` is end-of-stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        (**self).next_frame()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        (**self).next_frame()
    }
}

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files from a directory, yielded in file-name order.
#[derive(Debug)]
pub struct ImageDirSource {
    paths: VecDeque<PathBuf>,
}

impl ImageDirSource {
    /// Fails with [`SourceError::CameraUnavailable`] when the directory cannot
    /// be listed or holds no image files.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            SourceError::CameraUnavailable(format!("cannot open {}: {e}", dir.display()))
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        if paths.is_empty() {
            return Err(SourceError::CameraUnavailable(format!(
                "no image files in {}",
                dir.display()
            )));
        }
        paths.sort();
        debug!("{} frames queued from {}", paths.len(), dir.display());
        Ok(Self {
            paths: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        image::open(&path)
            .map(Some)
            .map_err(|source| SourceError::Frame { path, source })
    }
}

/// In-memory frames, yielded in order.
#[derive(Debug, Default)]
pub struct VecFrameSource {
    frames: VecDeque<DynamicImage>,
}

impl VecFrameSource {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        Ok(self.frames.pop_front())
    }
}
