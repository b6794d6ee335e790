use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use glob::glob;
use image::{ImageReader, RgbImage};

use crate::error::MarkerError;

/// One captured frame. Consumed by the detector and then dropped.
pub struct Frame {
    pub idx: usize,
    pub time_ns: i64,
    pub image: RgbImage,
}

/// Supplies one color frame per call until exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;

    /// Number of frames left, when known up front.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg", ".jpeg"] {
            if p.as_os_str().to_string_lossy().to_lowercase().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Frames read from the images of a folder, in path order.
///
/// Files named `<nanoseconds>.png` keep their timestamp, anything else gets
/// one synthesised from its index at 10 Hz. Files that fail to decode are
/// skipped with a warning.
pub struct ImageFolderSource {
    paths: VecDeque<PathBuf>,
    next_idx: usize,
}

impl ImageFolderSource {
    pub fn open(root_folder: &str, start_idx: usize, step: usize) -> Result<Self, MarkerError> {
        if !Path::new(root_folder).is_dir() {
            return Err(MarkerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a folder", root_folder),
            )));
        }
        let img_paths = glob(format!("{}/**/*", root_folder).as_str())?;
        let mut sorted_path: Vec<PathBuf> = img_paths.into_iter().filter_map(img_filter).collect();
        sorted_path.sort();
        let paths: VecDeque<PathBuf> = sorted_path
            .into_iter()
            .skip(start_idx)
            .step_by(step.max(1))
            .collect();
        if paths.is_empty() {
            return Err(MarkerError::NoFrames(root_folder.to_string()));
        }
        log::trace!("{} frames under {}", paths.len(), root_folder);
        Ok(ImageFolderSource { paths, next_idx: 0 })
    }
}

impl FrameSource for ImageFolderSource {
    fn next_frame(&mut self) -> Option<Frame> {
        while let Some(path) = self.paths.pop_front() {
            let idx = self.next_idx;
            self.next_idx += 1;
            let decoded = ImageReader::open(&path)
                .map_err(MarkerError::from)
                .and_then(|r| r.decode().map_err(MarkerError::from));
            match decoded {
                Ok(img) => {
                    let time_ns = path_to_timestamp(&path).unwrap_or(idx as i64 * 100_000_000);
                    return Some(Frame {
                        idx,
                        time_ns,
                        image: img.to_rgb8(),
                    });
                }
                Err(e) => log::warn!("skip {}: {}", path.display(), e),
            }
        }
        None
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.paths.len())
    }
}

/// Frames already in memory, e.g. produced by a capture thread or a test.
#[derive(Default)]
pub struct InMemorySource {
    frames: VecDeque<RgbImage>,
    next_idx: usize,
}

impl InMemorySource {
    pub fn new(frames: Vec<RgbImage>) -> InMemorySource {
        InMemorySource {
            frames: frames.into(),
            next_idx: 0,
        }
    }
}

impl FrameSource for InMemorySource {
    fn next_frame(&mut self) -> Option<Frame> {
        let image = self.frames.pop_front()?;
        let idx = self.next_idx;
        self.next_idx += 1;
        Some(Frame {
            idx,
            time_ns: idx as i64 * 100_000_000,
            image,
        })
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}
