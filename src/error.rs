/// Startup and resource failures. A frame without a marker is never one of
/// these.
#[derive(thiserror::Error, Debug)]
pub enum MarkerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    #[error("no frames found under {0}")]
    NoFrames(String),
    #[error("invalid calibration: {0}")]
    Calibration(String),
    #[error("rerun: {0}")]
    Rerun(String),
}
