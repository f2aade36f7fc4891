use crate::annotations::Annotations;
use crate::time::MeasDate;

/// The sampled-recording collaborator.
///
/// This crate never stores sample data itself; it only needs the recording's
/// clock. Implementors provide the four required accessors and get the
/// time-to-index conversion for free.
///
/// # Examples
///
/// ```rust
/// use sigannot::{MeasDate, Recording};
///
/// struct Sine { n: usize }
///
/// impl Recording for Sine {
///     fn sample_rate(&self) -> f64 { 100.0 }
///     fn first_samp(&self) -> i64 { 0 }
///     fn n_samples(&self) -> usize { self.n }
///     fn meas_date(&self) -> MeasDate { MeasDate::Absent }
/// }
///
/// let raw = Sine { n: 1000 };
/// assert_eq!(raw.time_as_index(&[0.5], true, &MeasDate::Absent), vec![50]);
/// ```
pub trait Recording {
    /// Sampling frequency in Hz.
    fn sample_rate(&self) -> f64;

    /// Position of sample index 0 of the stored data on the recording's
    /// absolute sample axis.
    fn first_samp(&self) -> i64;

    /// Number of stored samples.
    fn n_samples(&self) -> usize;

    /// Absolute start time of the recording, possibly absent.
    fn meas_date(&self) -> MeasDate;

    /// Time of the first stored sample, in seconds.
    fn first_time(&self) -> f64 {
        self.first_samp() as f64 / self.sample_rate()
    }

    /// Converts times in seconds to sample indices.
    ///
    /// With `use_rounding` the nearest index is taken, otherwise the value is
    /// truncated; rounding helps avoid non-unique indices. When `origin` is
    /// present, `times` are interpreted as relative to it rather than to the
    /// start of the data, and are re-anchored against this recording's
    /// [`meas_date`](Recording::meas_date) and first-sample offset.
    fn time_as_index(&self, times: &[f64], use_rounding: bool, origin: &MeasDate) -> Vec<i64> {
        let delta = match origin {
            MeasDate::Absent => 0.0,
            origin => origin.normalize() - self.meas_date().normalize() - self.first_time(),
        };
        times
            .iter()
            .map(|t| {
                let sample = (t + delta) * self.sample_rate();
                if use_rounding {
                    sample.round() as i64
                } else {
                    sample.trunc() as i64
                }
            })
            .collect()
    }
}

/// Re-expresses annotation onsets relative to the recording data start.
///
/// When the set has no `orig_time` the onsets already are relative to the
/// data start and pass through unchanged. Otherwise each onset is shifted by
/// the difference between the set's origin and the recording's absolute
/// start, minus the first-sample offset. With `inverse` the sign of the
/// first-sample term flips, which maps data-relative times back out to the
/// set's origin frame (the write path).
pub fn sync_onset<R: Recording>(
    raw: &R,
    annotations: &Annotations,
    onset: &[f64],
    inverse: bool,
) -> Vec<f64> {
    let orig_time = match annotations.orig_time() {
        None => return onset.to_vec(),
        Some(orig_time) => orig_time,
    };
    let meas_date = raw.meas_date().normalize();
    let offset = if inverse {
        -raw.first_time()
    } else {
        raw.first_time()
    };
    onset
        .iter()
        .map(|o| (orig_time - meas_date) - offset + o)
        .collect()
}
