use std::fmt;

use crate::error::{AnnotError, Result};
use crate::time::MeasDate;

/// Character reserved by the on-disk description encoding.
const FIELD_SEPARATOR: char = ';';

/// A set of labeled time intervals over a recording.
///
/// Each annotation is an (onset, duration, description) triple. Onsets are
/// seconds relative to [`orig_time`](Annotations::orig_time) when the set has
/// one, otherwise relative to the start of the recording data. A single
/// optional `orig_time` is shared by the whole set.
///
/// Downstream epoch rejection conventionally treats descriptions starting
/// with the keyword `bad` (case-insensitive) as segments to reject. Nothing
/// in this crate enforces that; it only matters to consumers such as
/// [`annotation_windows`](crate::annotation_windows).
///
/// # Examples
///
/// ```rust
/// use sigannot::{Annotations, MeasDate};
///
/// let mut annot = Annotations::new(
///     vec![1.0, 4.5],
///     vec![0.5, 2.0],
///     vec!["bad blink".to_string(), "stimulus".to_string()],
///     MeasDate::Absent,
/// )?;
///
/// assert_eq!(annot.len(), 2);
/// annot.append(9.0, 0.0, "button press")?;
/// assert_eq!(annot.len(), 3);
///
/// // Rows stay aligned across the three sequences
/// let rows: Vec<_> = annot.iter().collect();
/// assert_eq!(rows[2], (9.0, 0.0, "button press"));
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
///
/// Mutate-in-place versus copy-then-mutate is always the caller's choice:
///
/// ```rust
/// use sigannot::{Annotations, MeasDate};
///
/// let annot = Annotations::new_uniform(vec![0.0], vec![10.0], "bad span", MeasDate::Absent)?;
/// let mut cropped = annot.clone();
/// cropped.crop(Some(2.0), Some(5.0), false)?;
///
/// assert_eq!(annot.onset(), &[0.0]);      // original untouched
/// assert_eq!(cropped.onset(), &[2.0]);
/// assert_eq!(cropped.duration(), &[3.0]);
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    onset: Vec<f64>,
    duration: Vec<f64>,
    description: Vec<String>,
    orig_time: Option<f64>,
}

/// Row counts reported by [`Annotations::crop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropStats {
    /// Rows dropped because they fell entirely outside the window.
    pub n_omitted: usize,
    /// Clip operations applied; a row clipped on both sides counts twice.
    pub n_limited: usize,
}

impl Annotations {
    /// Creates an annotation set from three equally sized sequences.
    ///
    /// # Errors
    ///
    /// * [`AnnotError::LengthMismatch`] if the sequences differ in length
    /// * [`AnnotError::SemicolonInDescription`] if any description contains
    ///   the `;` character reserved by the on-disk encoding
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigannot::{Annotations, AnnotError, MeasDate};
    ///
    /// let annot = Annotations::new(
    ///     vec![2.0],
    ///     vec![1.5],
    ///     vec!["sleep spindle".to_string()],
    ///     MeasDate::from(1_500_000_000.0),
    /// )?;
    /// assert_eq!(annot.orig_time(), Some(1_500_000_000.0));
    ///
    /// let err = Annotations::new(vec![1.0, 2.0], vec![0.0], vec![], MeasDate::Absent);
    /// assert!(matches!(err, Err(AnnotError::LengthMismatch { .. })));
    /// # Ok::<(), sigannot::AnnotError>(())
    /// ```
    pub fn new(
        onset: Vec<f64>,
        duration: Vec<f64>,
        description: Vec<String>,
        orig_time: impl Into<MeasDate>,
    ) -> Result<Self> {
        if onset.len() != duration.len() || onset.len() != description.len() {
            return Err(AnnotError::LengthMismatch {
                onset: onset.len(),
                duration: duration.len(),
                description: description.len(),
            });
        }
        if description.iter().any(|d| d.contains(FIELD_SEPARATOR)) {
            return Err(AnnotError::SemicolonInDescription);
        }
        Ok(Annotations {
            onset,
            duration,
            description,
            orig_time: orig_time.into().origin(),
        })
    }

    /// Creates a set where every row carries the same description.
    pub fn new_uniform(
        onset: Vec<f64>,
        duration: Vec<f64>,
        description: &str,
        orig_time: impl Into<MeasDate>,
    ) -> Result<Self> {
        let description = vec![description.to_string(); onset.len()];
        Self::new(onset, duration, description, orig_time)
    }

    /// Onsets in seconds, one per annotation.
    pub fn onset(&self) -> &[f64] {
        &self.onset
    }

    /// Durations in seconds, one per annotation.
    pub fn duration(&self) -> &[f64] {
        &self.duration
    }

    /// Free-text labels, one per annotation.
    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// Absolute reference time of the set, or `None` when onsets are
    /// relative to the start of the recording data.
    pub fn orig_time(&self) -> Option<f64> {
        self.orig_time
    }

    pub fn len(&self) -> usize {
        self.duration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_empty()
    }

    /// Iterates rows as `(onset, duration, description)`.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, &str)> {
        self.onset
            .iter()
            .zip(&self.duration)
            .zip(&self.description)
            .map(|((&o, &d), s)| (o, d, s.as_str()))
    }

    /// Appends one annotated segment in place.
    ///
    /// Returns `&mut Self` so calls can be chained.
    ///
    /// # Errors
    ///
    /// [`AnnotError::SemicolonInDescription`] if the description contains `;`.
    pub fn append(
        &mut self,
        onset: f64,
        duration: f64,
        description: impl Into<String>,
    ) -> Result<&mut Self> {
        let description = description.into();
        if description.contains(FIELD_SEPARATOR) {
            return Err(AnnotError::SemicolonInDescription);
        }
        self.onset.push(onset);
        self.duration.push(duration);
        self.description.push(description);
        Ok(self)
    }

    /// Batched [`append`](Annotations::append): adds one row per element of
    /// three equally sized slices.
    ///
    /// # Errors
    ///
    /// [`AnnotError::LengthMismatch`] on unequal slice lengths,
    /// [`AnnotError::SemicolonInDescription`] on a reserved separator; the
    /// set is unchanged on error.
    pub fn append_batch(
        &mut self,
        onset: &[f64],
        duration: &[f64],
        description: &[String],
    ) -> Result<&mut Self> {
        if onset.len() != duration.len() || onset.len() != description.len() {
            return Err(AnnotError::LengthMismatch {
                onset: onset.len(),
                duration: duration.len(),
                description: description.len(),
            });
        }
        if description.iter().any(|d| d.contains(FIELD_SEPARATOR)) {
            return Err(AnnotError::SemicolonInDescription);
        }
        self.onset.extend_from_slice(onset);
        self.duration.extend_from_slice(duration);
        self.description.extend_from_slice(description);
        Ok(self)
    }

    /// Removes the annotation at `idx`, keeping the remaining rows in order.
    pub fn delete(&mut self, idx: usize) -> Result<()> {
        if idx >= self.len() {
            return Err(AnnotError::IndexOutOfRange(idx, self.len()));
        }
        self.onset.remove(idx);
        self.duration.remove(idx);
        self.description.remove(idx);
        Ok(())
    }

    /// Removes the annotations at all given indices (duplicates allowed),
    /// preserving the relative order of the remaining rows.
    pub fn delete_many(&mut self, indices: &[usize]) -> Result<()> {
        let len = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(AnnotError::IndexOutOfRange(bad, len));
        }
        let mut keep = vec![true; len];
        for &i in indices {
            keep[i] = false;
        }
        let mut onset = Vec::with_capacity(len);
        let mut duration = Vec::with_capacity(len);
        let mut description = Vec::with_capacity(len);
        for i in 0..len {
            if keep[i] {
                onset.push(self.onset[i]);
                duration.push(self.duration[i]);
                description.push(std::mem::take(&mut self.description[i]));
            }
        }
        self.onset = onset;
        self.duration = duration;
        self.description = description;
        Ok(())
    }

    /// Appends all rows of `other` in place.
    ///
    /// Both sets must share the same `orig_time`; as the one exception, an
    /// empty set adopts the other set's `orig_time` first. This is a pure
    /// structural append that assumes both sets already live in the same
    /// time frame. To merge annotations belonging to two *different*
    /// recordings being concatenated, use
    /// [`combine_annotations`] instead, which computes the sample-rate-aware
    /// shift.
    ///
    /// # Errors
    ///
    /// [`AnnotError::OrigTimeMismatch`] if the origins differ.
    pub fn try_extend(&mut self, other: &Annotations) -> Result<()> {
        if self.is_empty() {
            self.orig_time = other.orig_time;
        }
        if self.orig_time != other.orig_time {
            return Err(AnnotError::OrigTimeMismatch(self.orig_time, other.orig_time));
        }
        self.onset.extend_from_slice(&other.onset);
        self.duration.extend_from_slice(&other.duration);
        self.description.extend_from_slice(&other.description);
        Ok(())
    }

    /// Returns a new set holding the rows of `self` followed by the rows of
    /// `other`. Same origin rules as [`Annotations::try_extend`].
    pub fn concat(&self, other: &Annotations) -> Result<Annotations> {
        let mut out = self.clone();
        out.try_extend(other)?;
        Ok(out)
    }

    /// Removes or clips all annotations outside of `[tmin, tmax]`.
    ///
    /// Bounds are absolute times, i.e. already offset by `orig_time` when the
    /// set has one. A missing `tmin` defaults to the smallest absolute onset,
    /// a missing `tmax` to the largest absolute end. Rows entirely outside
    /// the window are dropped; rows straddling a bound are clipped so they
    /// fit, possibly on both sides. Operates in place.
    ///
    /// The returned [`CropStats`] carries the drop/clip counts. When
    /// `emit_warning` is set, nonzero counts are additionally reported
    /// through [`log::warn!`]; they are never an error.
    ///
    /// # Errors
    ///
    /// [`AnnotError::CropBounds`] if the resolved `tmin` exceeds `tmax` or is
    /// negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigannot::{Annotations, MeasDate};
    ///
    /// let mut annot = Annotations::new_uniform(vec![0.0], vec![10.0], "bad span", MeasDate::Absent)?;
    /// let stats = annot.crop(Some(2.0), Some(5.0), false)?;
    ///
    /// assert_eq!(annot.onset(), &[2.0]);
    /// assert_eq!(annot.duration(), &[3.0]);
    /// assert_eq!(stats.n_limited, 2); // clipped on both sides
    /// # Ok::<(), sigannot::AnnotError>(())
    /// ```
    pub fn crop(
        &mut self,
        tmin: Option<f64>,
        tmax: Option<f64>,
        emit_warning: bool,
    ) -> Result<CropStats> {
        let offset = self.orig_time.unwrap_or(0.0);
        let absolute_onset: Vec<f64> = self.onset.iter().map(|o| o + offset).collect();
        let absolute_end: Vec<f64> = absolute_onset
            .iter()
            .zip(&self.duration)
            .map(|(o, d)| o + d)
            .collect();

        if self.is_empty() {
            // Nothing to default the bounds from; still validate explicit ones.
            if let (Some(tmin), Some(tmax)) = (tmin, tmax) {
                if tmin > tmax {
                    return Err(AnnotError::CropBounds(
                        "tmax should be greater than tmin".to_string(),
                    ));
                }
            }
            if tmin.map_or(false, |t| t < 0.0) {
                return Err(AnnotError::CropBounds("tmin should be positive".to_string()));
            }
            return Ok(CropStats::default());
        }

        let tmin = tmin.unwrap_or_else(|| absolute_onset.iter().fold(f64::INFINITY, |a, &b| a.min(b)));
        let tmax = tmax.unwrap_or_else(|| absolute_end.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)));

        if tmin > tmax {
            return Err(AnnotError::CropBounds(
                "tmax should be greater than tmin".to_string(),
            ));
        }
        if tmin < 0.0 {
            return Err(AnnotError::CropBounds("tmin should be positive".to_string()));
        }

        let mut onset = Vec::with_capacity(self.len());
        let mut duration = Vec::with_capacity(self.len());
        let mut description = Vec::with_capacity(self.len());
        let mut stats = CropStats::default();

        for (i, desc) in self.description.iter().enumerate() {
            let out_of_bounds = absolute_onset[i] > tmax || absolute_end[i] < tmin;
            if out_of_bounds {
                stats.n_omitted += 1;
                continue;
            }
            let mut row_onset = self.onset[i];
            let mut row_duration = self.duration[i];
            if absolute_onset[i] < tmin {
                row_duration -= tmin - absolute_onset[i];
                row_onset = tmin - offset;
                stats.n_limited += 1;
            }
            if absolute_end[i] > tmax {
                row_duration -= absolute_end[i] - tmax;
                stats.n_limited += 1;
            }
            onset.push(row_onset);
            duration.push(row_duration);
            description.push(desc.clone());
        }

        self.onset = onset;
        self.duration = duration;
        self.description = description;

        if emit_warning {
            if stats.n_omitted > 0 {
                log::warn!(
                    "Omitted {} annotation(s) that were outside data range.",
                    stats.n_omitted
                );
            }
            if stats.n_limited > 0 {
                log::warn!(
                    "Limited {} annotation(s) that were expanding outside the data range.",
                    stats.n_limited
                );
            }
        }

        Ok(stats)
    }
}

impl fmt::Display for Annotations {
    /// Summary line: segment count plus up to three `kind (count)` entries
    /// keyed by the first word of each description, lowercased.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self
            .description
            .iter()
            .map(|d| {
                d.split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_lowercase()
            })
            .collect();
        kinds.sort();
        kinds.dedup();
        let counts: Vec<String> = kinds
            .iter()
            .map(|kind| {
                let n = self
                    .description
                    .iter()
                    .filter(|d| d.to_lowercase().starts_with(kind.as_str()))
                    .count();
                format!("{} ({})", kind, n)
            })
            .collect();
        let ellipsis = if counts.len() > 3 { "..." } else { "" };
        let listing = if counts.is_empty() {
            String::new()
        } else {
            format!(": {}", counts[..counts.len().min(3)].join(", "))
        };
        let plural = if self.len() == 1 { "" } else { "s" };
        write!(
            f,
            "<Annotations | {} segment{}{}{}>",
            self.len(),
            plural,
            listing,
            ellipsis
        )
    }
}

/// Merges the annotation sets of two recordings being concatenated.
///
/// `one` belongs to the leading recording (`one_n_samples` samples starting
/// at sample offset `one_first_samp`), `two` to the trailing one. The
/// trailing set's onsets are shifted by the duration of the leading data,
/// corrected for each set's own absolute origin against the recording-level
/// `meas_date`, so both become expressible in the leading set's frame.
///
/// Returns `None` when both inputs are absent, the present one verbatim when
/// exactly one is absent, and the merged set otherwise. The merged set keeps
/// `one`'s origin (or none, when `one` was absent).
///
/// # Examples
///
/// ```rust
/// use sigannot::{combine_annotations, Annotations, MeasDate};
///
/// // 1000 samples at 100 Hz in front: the second set moves 10 s forward.
/// let one = Annotations::new_uniform(vec![1.0], vec![0.5], "stim", MeasDate::Absent)?;
/// let two = Annotations::new_uniform(vec![0.5], vec![0.5], "stim", MeasDate::Absent)?;
/// let merged = combine_annotations(Some(one), Some(two), 1000, 0, 0, 100.0, MeasDate::Absent)
///     .unwrap();
///
/// assert_eq!(merged.onset(), &[1.0, 10.5]);
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
pub fn combine_annotations(
    one: Option<Annotations>,
    two: Option<Annotations>,
    one_n_samples: usize,
    one_first_samp: i64,
    two_first_samp: i64,
    sfreq: f64,
    meas_date: MeasDate,
) -> Option<Annotations> {
    let (one, two) = match (one, two) {
        (None, None) => return None,
        (one, None) => return one,
        (None, Some(two)) => (Annotations::default(), two),
        (Some(one), Some(two)) => (one, two),
    };

    // The shift (in time) due to concatenation, then the corrections for
    // each set's own origin against the recording start.
    let meas_date = meas_date.normalize();
    let mut shift = one_n_samples as f64 / sfreq;
    if let Some(orig_time) = one.orig_time {
        shift += one_first_samp as f64 / sfreq;
        shift += meas_date - orig_time;
    }
    if let Some(orig_time) = two.orig_time {
        shift -= two_first_samp as f64 / sfreq;
        shift -= meas_date - orig_time;
    }

    let Annotations {
        mut onset,
        mut duration,
        mut description,
        orig_time,
    } = one;
    onset.extend(two.onset.iter().map(|o| o + shift));
    duration.extend_from_slice(&two.duration);
    description.extend_from_slice(&two.description);

    Some(Annotations {
        onset,
        duration,
        description,
        orig_time,
    })
}
