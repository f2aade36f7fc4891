use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Onset, duration and description must be equal in sizes (got {onset}, {duration}, {description})")]
    LengthMismatch {
        onset: usize,
        duration: usize,
        description: usize,
    },

    #[error("Semicolons in descriptions not supported")]
    SemicolonInDescription,

    #[error("Annotation index {0} out of range (len {1})")]
    IndexOutOfRange(usize, usize),

    #[error("orig_time should be the same to concatenate two annotation sets (got {0:?} != {1:?})")]
    OrigTimeMismatch(Option<f64>, Option<f64>),

    #[error("Invalid crop window: {0}")]
    CropBounds(String),

    #[error("Invalid file name: {0}")]
    BadFileName(String),

    #[error("No annotation data found in file \"{0}\"")]
    NoAnnotationData(String),

    #[error("Could not find any of the events you specified")]
    NoMatchingEvents,

    #[error("Invalid description pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Annotation block is corrupt: onset, end and description counts disagree")]
    CorruptAnnotations,

    #[error("Event export parse error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnnotError>;
