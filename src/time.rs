use chrono::{DateTime, NaiveDateTime, Utc};

/// Absolute reference time of an annotation set or a recording.
///
/// All cross-set time arithmetic in this crate goes through this type so the
/// "origin present / origin absent" cases are decided once, at the boundary,
/// instead of being re-checked at every call site.
///
/// # Examples
///
/// ```rust
/// use sigannot::MeasDate;
///
/// assert_eq!(MeasDate::Absent.normalize(), 0.0);
/// assert_eq!(MeasDate::from(5.0).normalize(), 5.0);
/// // (seconds, microseconds) pair, e.g. from a measurement header
/// assert_eq!(MeasDate::from((2, 500_000)).normalize(), 2.5);
///
/// assert_eq!(MeasDate::Absent.origin(), None);
/// assert_eq!(MeasDate::from(5.0).origin(), Some(5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasDate {
    /// No absolute anchor; times are relative to the start of the data.
    Absent,
    /// POSIX timestamp in seconds.
    EpochSeconds(f64),
    /// POSIX timestamp split into whole seconds and microseconds.
    SecondsAndMicros(i64, i64),
}

impl MeasDate {
    /// Collapses the variant into a single seconds-since-epoch value.
    ///
    /// `Absent` maps to `0.0`, which is what every arithmetic context in this
    /// crate needs when no concrete anchor exists. Use [`MeasDate::origin`]
    /// where "absent" must stay distinct from a zero timestamp.
    pub fn normalize(&self) -> f64 {
        match *self {
            MeasDate::Absent => 0.0,
            MeasDate::EpochSeconds(secs) => secs,
            MeasDate::SecondsAndMicros(secs, micros) => secs as f64 + micros as f64 / 1_000_000.0,
        }
    }

    /// Like [`MeasDate::normalize`], but keeps absence observable.
    pub fn origin(&self) -> Option<f64> {
        match self {
            MeasDate::Absent => None,
            _ => Some(self.normalize()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, MeasDate::Absent)
    }
}

impl From<f64> for MeasDate {
    fn from(secs: f64) -> Self {
        MeasDate::EpochSeconds(secs)
    }
}

impl From<(i64, i64)> for MeasDate {
    fn from((secs, micros): (i64, i64)) -> Self {
        MeasDate::SecondsAndMicros(secs, micros)
    }
}

impl From<[i64; 2]> for MeasDate {
    fn from(pair: [i64; 2]) -> Self {
        MeasDate::SecondsAndMicros(pair[0], pair[1])
    }
}

impl From<Option<f64>> for MeasDate {
    fn from(secs: Option<f64>) -> Self {
        match secs {
            None => MeasDate::Absent,
            Some(secs) => MeasDate::EpochSeconds(secs),
        }
    }
}

/// Calendar datetimes are truncated to whole seconds.
impl From<NaiveDateTime> for MeasDate {
    fn from(dt: NaiveDateTime) -> Self {
        MeasDate::EpochSeconds(dt.and_utc().timestamp() as f64)
    }
}

impl From<DateTime<Utc>> for MeasDate {
    fn from(dt: DateTime<Utc>) -> Self {
        MeasDate::EpochSeconds(dt.timestamp() as f64)
    }
}
