//! Helpers for doc examples. Not part of the public API.

use crate::recording::Recording;
use crate::time::MeasDate;

/// Minimal in-memory recording clock for examples and tests.
pub struct DemoRecording {
    sfreq: f64,
    first_samp: i64,
    n_samples: usize,
    meas_date: MeasDate,
}

impl DemoRecording {
    pub fn new(sfreq: f64, first_samp: i64, n_samples: usize) -> Self {
        DemoRecording {
            sfreq,
            first_samp,
            n_samples,
            meas_date: MeasDate::Absent,
        }
    }

    pub fn with_meas_date(mut self, meas_date: impl Into<MeasDate>) -> Self {
        self.meas_date = meas_date.into();
        self
    }
}

impl Recording for DemoRecording {
    fn sample_rate(&self) -> f64 {
        self.sfreq
    }

    fn first_samp(&self) -> i64 {
        self.first_samp
    }

    fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn meas_date(&self) -> MeasDate {
        self.meas_date
    }
}
