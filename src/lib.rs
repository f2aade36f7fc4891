//! # sigannot
//!
//! Time-interval annotations for sampled physiological recordings (EEG,
//! ECG, EMG and friends): labeled segments with an onset, a duration and a
//! free-text description, anchored to an optional absolute reference time.
//! The crate covers the annotation bookkeeping around a recording: merging
//! the annotation sets of concatenated recordings, cropping to a time
//! window, serializing to a tagged binary container, and deriving discrete
//! marker events aligned to the sample axis.
//!
//! The sampled data itself stays outside the crate: anything that can answer
//! four questions about its clock (see [`Recording`]) plugs in.
//!
//! ## Quick start
//!
//! ```rust
//! use sigannot::{Annotations, MeasDate, read_annotations};
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("run1-annot.fif");
//! let mut annot = Annotations::new(
//!     vec![12.5, 60.0],
//!     vec![0.5, 30.0],
//!     vec!["bad blink".to_string(), "sleep stage 2".to_string()],
//!     MeasDate::Absent,
//! )?;
//!
//! // Keep the window of interest; rows outside are dropped or clipped.
//! annot.crop(Some(10.0), Some(70.0), false)?;
//!
//! annot.save(&path)?;
//! let reloaded = read_annotations(&path)?;
//! assert_eq!(reloaded.len(), annot.len());
//! # Ok::<(), sigannot::AnnotError>(())
//! ```
//!
//! ## Deriving events
//!
//! Epoch-based analysis wants discrete markers, not intervals. Each unique
//! description is resolved to an integer code (from an explicit map, a
//! resolver callback, or auto-assigned) and each onset lands on a sample
//! index of the recording:
//!
//! ```rust
//! use sigannot::{events_from_annotations, Annotations, EventMap, MeasDate};
//! # use sigannot::doctest_utils::DemoRecording;
//!
//! let raw = DemoRecording::new(250.0, 0, 25_000);
//! let annot = Annotations::new_uniform(vec![4.0, 36.0], vec![0.0, 0.0], "stim", MeasDate::Absent)?;
//!
//! let (events, codes) = events_from_annotations(&raw, &annot, EventMap::Auto, None, true)?;
//! assert_eq!(events[0].sample, 1000);
//! assert_eq!(codes["stim"], 1);
//! # Ok::<(), sigannot::AnnotError>(())
//! ```
//!
//! ## Concatenating recordings
//!
//! When two recordings are joined, their annotation sets live in different
//! time frames: each may carry its own absolute origin, and each recording
//! has its own first-sample offset. [`combine_annotations`] computes the
//! single shift that re-expresses the trailing set in the leading set's
//! frame; see its docs for the four origin-presence cases.

pub mod annotations;
pub mod error;
pub mod events;
pub mod reader;
pub mod recording;
pub mod tags;
pub mod time;
pub mod writer;

#[doc(hidden)]
pub mod doctest_utils;

// Re-export main types for convenience
pub use annotations::{combine_annotations, Annotations, CropStats};
pub use error::{AnnotError, Result};
pub use events::{annotation_windows, events_from_annotations, Event, EventMap};
pub use reader::{read_annotations, read_exported_events};
pub use recording::{sync_onset, Recording};
pub use time::MeasDate;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
