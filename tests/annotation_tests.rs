use sigannot::{combine_annotations, AnnotError, Annotations, MeasDate};

// Helper building a small mixed set
fn blink_and_stim() -> Annotations {
    Annotations::new(
        vec![1.0, 4.5],
        vec![0.5, 2.0],
        vec!["bad blink".to_string(), "stim onset".to_string()],
        MeasDate::Absent,
    )
    .unwrap()
}

#[test]
fn test_construction_preserves_order_and_length() {
    let annot = blink_and_stim();
    assert_eq!(annot.len(), 2);
    assert_eq!(annot.onset(), &[1.0, 4.5]);
    assert_eq!(annot.duration(), &[0.5, 2.0]);
    assert_eq!(annot.description()[0], "bad blink");
    assert_eq!(annot.description()[1], "stim onset");
    assert_eq!(annot.orig_time(), None);
}

#[test]
fn test_construction_rejects_length_mismatch() {
    let err = Annotations::new(
        vec![1.0, 2.0],
        vec![0.5],
        vec!["a".to_string(), "b".to_string()],
        MeasDate::Absent,
    );
    assert!(matches!(err, Err(AnnotError::LengthMismatch { .. })));

    let err = Annotations::new(
        vec![1.0],
        vec![0.5],
        vec!["a".to_string(), "b".to_string()],
        MeasDate::Absent,
    );
    assert!(matches!(err, Err(AnnotError::LengthMismatch { .. })));
}

#[test]
fn test_construction_rejects_semicolon() {
    let err = Annotations::new(
        vec![1.0],
        vec![0.5],
        vec!["bad;worse".to_string()],
        MeasDate::Absent,
    );
    assert!(matches!(err, Err(AnnotError::SemicolonInDescription)));
}

#[test]
fn test_uniform_description_broadcast() {
    let annot =
        Annotations::new_uniform(vec![0.0, 1.0, 2.0], vec![0.1; 3], "bad seg", MeasDate::Absent)
            .unwrap();
    assert_eq!(annot.len(), 3);
    assert!(annot.description().iter().all(|d| d == "bad seg"));
}

#[test]
fn test_orig_time_normalization() {
    let annot =
        Annotations::new_uniform(vec![0.0], vec![0.0], "x", MeasDate::from((2, 500_000))).unwrap();
    assert_eq!(annot.orig_time(), Some(2.5));

    // Explicit absence stays distinct from a zero timestamp
    let annot = Annotations::new_uniform(vec![0.0], vec![0.0], "x", MeasDate::Absent).unwrap();
    assert_eq!(annot.orig_time(), None);
    let annot = Annotations::new_uniform(vec![0.0], vec![0.0], "x", 0.0).unwrap();
    assert_eq!(annot.orig_time(), Some(0.0));
}

#[test]
fn test_append_then_delete_restores_content() {
    let original = blink_and_stim();
    let mut annot = original.clone();

    annot.append(9.0, 0.0, "button press").unwrap();
    annot.append(11.0, 1.0, "bad jump").unwrap();
    assert_eq!(annot.len(), 4);

    annot.delete(3).unwrap();
    annot.delete(2).unwrap();
    assert_eq!(annot, original);
}

#[test]
fn test_append_rejects_semicolon() {
    let mut annot = blink_and_stim();
    let err = annot.append(1.0, 0.0, "a;b");
    assert!(matches!(err, Err(AnnotError::SemicolonInDescription)));
    // Nothing was partially appended
    assert_eq!(annot.len(), 2);
    assert_eq!(annot, blink_and_stim());
}

#[test]
fn test_append_batch() {
    let mut annot = blink_and_stim();
    annot
        .append_batch(
            &[8.0, 9.0],
            &[0.0, 1.0],
            &["x".to_string(), "y".to_string()],
        )
        .unwrap();
    assert_eq!(annot.len(), 4);
    assert_eq!(annot.onset(), &[1.0, 4.5, 8.0, 9.0]);

    let err = annot.append_batch(&[1.0], &[], &[]);
    assert!(matches!(err, Err(AnnotError::LengthMismatch { .. })));
    assert_eq!(annot.len(), 4);
}

#[test]
fn test_delete_many_preserves_order() {
    let mut annot = Annotations::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![0.0; 5],
        vec!["a", "b", "c", "d", "e"]
            .into_iter()
            .map(String::from)
            .collect(),
        MeasDate::Absent,
    )
    .unwrap();
    annot.delete_many(&[3, 1]).unwrap();
    assert_eq!(annot.onset(), &[0.0, 2.0, 4.0]);
    assert_eq!(annot.description(), &["a", "c", "e"]);
}

#[test]
fn test_delete_out_of_range() {
    let mut annot = blink_and_stim();
    assert!(matches!(
        annot.delete(2),
        Err(AnnotError::IndexOutOfRange(2, 2))
    ));
    assert!(matches!(
        annot.delete_many(&[0, 7]),
        Err(AnnotError::IndexOutOfRange(7, 2))
    ));
    // Failed deletes leave the set untouched
    assert_eq!(annot.len(), 2);
}

#[test]
fn test_copy_is_independent() {
    let original = blink_and_stim();
    let mut copy = original.clone();
    copy.append(100.0, 1.0, "late event").unwrap();
    copy.crop(Some(99.0), Some(200.0), false).unwrap();

    assert_eq!(original.len(), 2);
    assert_eq!(original.onset(), &[1.0, 4.5]);
    assert_eq!(copy.len(), 1);
}

#[test]
fn test_concat_requires_same_orig_time() {
    let a = Annotations::new_uniform(vec![1.0], vec![0.0], "x", 10.0).unwrap();
    let b = Annotations::new_uniform(vec![2.0], vec![0.0], "x", 20.0).unwrap();
    assert!(matches!(
        a.concat(&b),
        Err(AnnotError::OrigTimeMismatch(Some(_), Some(_)))
    ));

    let c = Annotations::new_uniform(vec![2.0], vec![0.0], "x", MeasDate::Absent).unwrap();
    assert!(matches!(a.concat(&c), Err(AnnotError::OrigTimeMismatch(..))));
}

#[test]
fn test_concat_empty_left_adopts_origin() {
    let empty = Annotations::default();
    let b = Annotations::new_uniform(vec![2.0], vec![0.5], "x", 20.0).unwrap();
    let merged = empty.concat(&b).unwrap();
    assert_eq!(merged.orig_time(), Some(20.0));
    assert_eq!(merged.onset(), &[2.0]);
}

#[test]
fn test_concat_content_associative() {
    let a = Annotations::new_uniform(vec![1.0], vec![0.1], "a", MeasDate::Absent).unwrap();
    let b = Annotations::new_uniform(vec![2.0], vec![0.2], "b", MeasDate::Absent).unwrap();
    let c = Annotations::new_uniform(vec![3.0], vec![0.3], "c", MeasDate::Absent).unwrap();

    let left = a.concat(&b).unwrap().concat(&c).unwrap();
    let right = a.concat(&b.concat(&c).unwrap()).unwrap();
    assert_eq!(left, right);
    assert_eq!(left.onset(), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_try_extend_in_place() {
    let mut a = blink_and_stim();
    let b = Annotations::new_uniform(vec![8.0], vec![0.0], "x", MeasDate::Absent).unwrap();
    a.try_extend(&b).unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.onset(), &[1.0, 4.5, 8.0]);
}

#[test]
fn test_crop_clips_and_drops() {
    let mut annot = Annotations::new(
        vec![0.0, 20.0],
        vec![10.0, 1.0],
        vec!["bad span".to_string(), "outside".to_string()],
        MeasDate::Absent,
    )
    .unwrap();

    let stats = annot.crop(Some(2.0), Some(5.0), true).unwrap();

    assert_eq!(annot.len(), 1);
    assert_eq!(annot.onset(), &[2.0]);
    assert_eq!(annot.duration(), &[3.0]);
    assert_eq!(annot.description(), &["bad span"]);
    assert_eq!(stats.n_omitted, 1);
    assert_eq!(stats.n_limited, 2); // clipped on both sides
}

#[test]
fn test_crop_single_sided_clips() {
    // clip-left only
    let mut annot = Annotations::new_uniform(vec![0.0], vec![4.0], "x", MeasDate::Absent).unwrap();
    let stats = annot.crop(Some(1.0), Some(10.0), false).unwrap();
    assert_eq!(annot.onset(), &[1.0]);
    assert_eq!(annot.duration(), &[3.0]);
    assert_eq!(stats.n_limited, 1);
    assert_eq!(stats.n_omitted, 0);

    // clip-right only
    let mut annot = Annotations::new_uniform(vec![2.0], vec![4.0], "x", MeasDate::Absent).unwrap();
    let stats = annot.crop(Some(1.0), Some(5.0), false).unwrap();
    assert_eq!(annot.onset(), &[2.0]);
    assert_eq!(annot.duration(), &[3.0]);
    assert_eq!(stats.n_limited, 1);
}

#[test]
fn test_crop_default_bounds_keep_everything() {
    let mut annot = blink_and_stim();
    let stats = annot.crop(None, None, false).unwrap();
    assert_eq!(annot, blink_and_stim());
    assert_eq!(stats, sigannot::CropStats::default());
}

#[test]
fn test_crop_bounds_are_absolute_when_origin_set() {
    // orig_time 100: onsets are relative, crop bounds absolute
    let mut annot = Annotations::new(
        vec![5.0, 50.0],
        vec![10.0, 1.0],
        vec!["keep".to_string(), "drop".to_string()],
        100.0,
    )
    .unwrap();
    let stats = annot.crop(Some(107.0), Some(112.0), false).unwrap();
    assert_eq!(annot.len(), 1);
    assert_eq!(annot.onset(), &[7.0]);
    assert_eq!(annot.duration(), &[5.0]);
    assert_eq!(stats.n_omitted, 1);
    assert_eq!(stats.n_limited, 2);
}

#[test]
fn test_crop_rejects_bad_bounds() {
    let mut annot = blink_and_stim();
    assert!(matches!(
        annot.crop(Some(5.0), Some(2.0), false),
        Err(AnnotError::CropBounds(_))
    ));
    assert!(matches!(
        annot.crop(Some(-1.0), Some(2.0), false),
        Err(AnnotError::CropBounds(_))
    ));
    // Failed crops leave the set untouched
    assert_eq!(annot, blink_and_stim());
}

// combine_annotations must reduce correctly over all four origin cases.
// Shared geometry: 1000 samples at 100 Hz in front, so the base shift is 10 s.

#[test]
fn test_combine_both_origins_absent() {
    let one = Annotations::new_uniform(vec![1.0], vec![0.5], "a", MeasDate::Absent).unwrap();
    let two = Annotations::new_uniform(vec![0.5], vec![0.5], "b", MeasDate::Absent).unwrap();
    let merged =
        combine_annotations(Some(one), Some(two), 1000, 0, 0, 100.0, MeasDate::Absent).unwrap();
    assert_eq!(merged.onset(), &[1.0, 10.5]);
    assert_eq!(merged.duration(), &[0.5, 0.5]);
    assert_eq!(merged.orig_time(), None);
}

#[test]
fn test_combine_only_first_origin_set() {
    let one = Annotations::new_uniform(vec![1.0], vec![0.5], "a", 50.0).unwrap();
    let two = Annotations::new_uniform(vec![0.5], vec![0.5], "b", MeasDate::Absent).unwrap();
    // shift = 10 + 100/100 + (60 - 50) = 21
    let merged = combine_annotations(
        Some(one),
        Some(two),
        1000,
        100,
        0,
        100.0,
        MeasDate::EpochSeconds(60.0),
    )
    .unwrap();
    assert_eq!(merged.onset(), &[1.0, 21.5]);
    assert_eq!(merged.orig_time(), Some(50.0));
}

#[test]
fn test_combine_only_second_origin_set() {
    let one = Annotations::new_uniform(vec![1.0], vec![0.5], "a", MeasDate::Absent).unwrap();
    let two = Annotations::new_uniform(vec![0.5], vec![0.5], "b", 55.0).unwrap();
    // shift = 10 - (200/100 + 60 - 55) = 3
    let merged = combine_annotations(
        Some(one),
        Some(two),
        1000,
        0,
        200,
        100.0,
        MeasDate::EpochSeconds(60.0),
    )
    .unwrap();
    assert_eq!(merged.onset(), &[1.0, 3.5]);
    assert_eq!(merged.orig_time(), None);
}

#[test]
fn test_combine_both_origins_set() {
    let one = Annotations::new_uniform(vec![1.0], vec![0.5], "a", 50.0).unwrap();
    let two = Annotations::new_uniform(vec![0.5], vec![0.5], "b", 55.0).unwrap();
    // shift = 10 + 1 + (60 - 50) - 2 - (60 - 55) = 14
    let merged = combine_annotations(
        Some(one),
        Some(two),
        1000,
        100,
        200,
        100.0,
        MeasDate::EpochSeconds(60.0),
    )
    .unwrap();
    assert_eq!(merged.onset(), &[1.0, 14.5]);
    assert_eq!(merged.orig_time(), Some(50.0));
}

#[test]
fn test_combine_absent_inputs() {
    assert!(combine_annotations(None, None, 1000, 0, 0, 100.0, MeasDate::Absent).is_none());

    let one = blink_and_stim();
    let merged =
        combine_annotations(Some(one.clone()), None, 1000, 0, 0, 100.0, MeasDate::Absent).unwrap();
    assert_eq!(merged, one);

    // Absent first set: the second is still shifted into the joint frame
    let two = Annotations::new_uniform(vec![0.5], vec![0.5], "b", MeasDate::Absent).unwrap();
    let merged =
        combine_annotations(None, Some(two), 1000, 0, 0, 100.0, MeasDate::Absent).unwrap();
    assert_eq!(merged.onset(), &[10.5]);
    assert_eq!(merged.orig_time(), None);
}

#[test]
fn test_display_summary_counts() {
    let annot = blink_and_stim();
    assert_eq!(annot.to_string(), "<Annotations | 2 segments: bad (1), stim (1)>");
}
