use std::collections::HashMap;

use regex::Regex;

use crate::annotations::Annotations;
use crate::error::{AnnotError, Result};
use crate::recording::{sync_onset, Recording};
use crate::time::MeasDate;

/// A discrete marker derived from an annotation: the sample index it lands
/// on, a previous-value column kept at zero, and the resolved integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub sample: i64,
    pub prior: i64,
    pub code: i64,
}

/// How [`events_from_annotations`] resolves descriptions to integer codes.
///
/// The variant is inspected once, up front, rather than per row.
pub enum EventMap {
    /// Assign fresh codes 1, 2, 3, … to novel descriptions in
    /// first-occurrence order.
    Auto,
    /// Keep only descriptions present as keys; others are silently ignored.
    Map(HashMap<String, i64>),
    /// Ask a callback per description; `None` drops the description without
    /// an error.
    Resolver(Box<dyn Fn(&str) -> Option<i64>>),
}

/// Derives discrete marker events from an annotation set.
///
/// Every onset is mapped onto `raw`'s sample axis (honoring the set's
/// `orig_time` and the recording's first-sample offset) and each unique
/// description is resolved to an integer code per `event_map`. `regexp`
/// filters descriptions by an anchored-at-start match before any code
/// lookup; it defaults to match-everything. Surviving rows come back in
/// their original order together with the resolved description-to-code map.
///
/// # Errors
///
/// * [`AnnotError::Pattern`] if `regexp` does not compile
/// * [`AnnotError::NoMatchingEvents`] if `regexp` was explicitly supplied
///   and no row survived both filters
///
/// # Examples
///
/// ```rust
/// use sigannot::{events_from_annotations, Annotations, EventMap, MeasDate};
/// # use sigannot::doctest_utils::DemoRecording;
///
/// let raw = DemoRecording::new(100.0, 0, 3000);
/// let annot = Annotations::new(
///     vec![1.0, 2.0, 3.0],
///     vec![0.0; 3],
///     vec!["a".to_string(), "b".to_string(), "a".to_string()],
///     MeasDate::Absent,
/// )?;
///
/// let (events, codes) =
///     events_from_annotations(&raw, &annot, EventMap::Auto, None, true)?;
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[0].code, events[2].code); // both "a"
/// assert_eq!(codes.len(), 2);
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
pub fn events_from_annotations<R: Recording>(
    raw: &R,
    annotations: &Annotations,
    event_map: EventMap,
    regexp: Option<&str>,
    use_rounding: bool,
) -> Result<(Vec<Event>, HashMap<String, i64>)> {
    if annotations.is_empty() {
        let resolved = match event_map {
            EventMap::Map(map) => map,
            _ => HashMap::new(),
        };
        return Ok((Vec::new(), resolved));
    }

    let origin = MeasDate::from(annotations.orig_time());
    let inds: Vec<i64> = raw
        .time_as_index(annotations.onset(), use_rounding, &origin)
        .into_iter()
        .map(|i| i + raw.first_samp())
        .collect();

    // Anchored so the pattern must match from the start of the description;
    // an absent pattern matches everything.
    let matcher = Regex::new(&format!("^(?:{})", regexp.unwrap_or(".*")))?;

    let mut resolved: HashMap<String, i64> = HashMap::new();
    let mut dropped: Vec<&str> = Vec::new();
    let mut next_code = 1i64;
    for desc in annotations.description() {
        if resolved.contains_key(desc.as_str()) {
            continue;
        }
        if !matcher.is_match(desc) {
            continue;
        }
        match &event_map {
            EventMap::Map(map) => {
                if let Some(&code) = map.get(desc.as_str()) {
                    resolved.insert(desc.clone(), code);
                }
            }
            EventMap::Resolver(resolver) => match resolver(desc) {
                Some(code) => {
                    resolved.insert(desc.clone(), code);
                }
                None => dropped.push(desc),
            },
            EventMap::Auto => {
                resolved.insert(desc.clone(), next_code);
                next_code += 1;
            }
        }
    }
    if !dropped.is_empty() {
        log::debug!("Dropped descriptions with no event code: {:?}", dropped);
    }

    let events: Vec<Event> = annotations
        .description()
        .iter()
        .enumerate()
        .filter_map(|(i, desc)| {
            resolved.get(desc.as_str()).map(|&code| Event {
                sample: inds[i],
                prior: 0,
                code,
            })
        })
        .collect();

    if events.is_empty() && regexp.is_some() {
        return Err(AnnotError::NoMatchingEvents);
    }

    let mut used: Vec<&String> = resolved.keys().collect();
    used.sort();
    log::info!("Used Annotations descriptions: {:?}", used);

    Ok((events, resolved))
}

/// Locates annotated intervals on the sample axis.
///
/// Descriptions are matched case-insensitively by prefix against `kinds`
/// (the usual call passes `&["bad"]`). Matching intervals come back as
/// paired, inclusive `(starts, stops)` index arrays sorted by start. With
/// `invert` the complement over `[0, n_samples]` is returned instead, so the
/// result covers exactly the samples *not* inside a matching interval.
pub fn annotation_windows<R: Recording>(
    raw: &R,
    annotations: &Annotations,
    kinds: &[&str],
    invert: bool,
) -> (Vec<i64>, Vec<i64>) {
    let (mut starts, mut stops) = if annotations.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let upper: Vec<String> = kinds.iter().map(|k| k.to_uppercase()).collect();
        let idxs: Vec<usize> = annotations
            .description()
            .iter()
            .enumerate()
            .filter(|(_, desc)| {
                let desc = desc.to_uppercase();
                upper.iter().any(|kind| desc.starts_with(kind.as_str()))
            })
            .map(|(i, _)| i)
            .collect();

        let onsets: Vec<f64> = idxs.iter().map(|&i| annotations.onset()[i]).collect();
        let onsets = sync_onset(raw, annotations, &onsets, false);
        let ends: Vec<f64> = onsets
            .iter()
            .zip(idxs.iter().map(|&i| annotations.duration()[i]))
            .map(|(o, d)| o + d)
            .collect();

        let mut order: Vec<usize> = (0..onsets.len()).collect();
        order.sort_by(|&a, &b| onsets[a].total_cmp(&onsets[b]));
        let onsets: Vec<f64> = order.iter().map(|&i| onsets[i]).collect();
        let ends: Vec<f64> = order.iter().map(|&i| ends[i]).collect();

        (
            raw.time_as_index(&onsets, true, &MeasDate::Absent),
            raw.time_as_index(&ends, true, &MeasDate::Absent),
        )
    };

    if invert {
        // Treat matches as holes and return the gaps between them, padding
        // with zero-length boundaries so the complement spans [0, n_samples].
        let n = raw.n_samples() as i64;
        if starts.first() != Some(&0) {
            starts.insert(0, 0);
            stops.insert(0, 0);
        }
        if stops.len() == 1 || stops.last() != Some(&n) {
            starts.push(n);
            stops.push(n);
        }
        let inverted_starts = stops[..stops.len() - 1].to_vec();
        let inverted_stops = starts[1..].to_vec();
        return (inverted_starts, inverted_stops);
    }

    (starts, stops)
}
