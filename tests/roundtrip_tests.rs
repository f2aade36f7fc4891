use sigannot::tags;
use sigannot::writer::TagWriter;
use sigannot::{read_annotations, read_exported_events, AnnotError, Annotations, MeasDate};

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        // Onsets and ends are stored in single precision
        assert!((a - e).abs() < 1e-4, "expected {}, got {}", e, a);
    }
}

#[test]
fn test_round_trip_plain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run1-annot.fif");

    let annot = Annotations::new(
        vec![1.5, 3.25, 100.0],
        vec![0.5, 1.0, 0.0],
        vec![
            "bad blink".to_string(),
            "stim A".to_string(),
            "button press".to_string(),
        ],
        MeasDate::Absent,
    )
    .unwrap();
    annot.save(&path).unwrap();

    let back = read_annotations(&path).unwrap();
    assert_close(back.onset(), annot.onset());
    assert_close(back.duration(), annot.duration());
    assert_eq!(back.description(), annot.description());
    assert_eq!(back.orig_time(), None);
}

#[test]
fn test_round_trip_gzip_with_orig_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run2_annot.fif.gz");

    let annot =
        Annotations::new_uniform(vec![10.0, 20.0], vec![1.0, 2.0], "apnea", 1_234_567_890.5)
            .unwrap();
    annot.save(&path).unwrap();

    let back = read_annotations(&path).unwrap();
    assert_close(back.onset(), annot.onset());
    assert_close(back.duration(), annot.duration());
    // The origin travels as a double: exact
    assert_eq!(back.orig_time(), Some(1_234_567_890.5));
}

#[test]
fn test_round_trip_descriptions_with_colons() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colons-annot.fif");

    let annot = Annotations::new(
        vec![1.0, 2.0],
        vec![0.0, 0.0],
        vec!["bad: EOG".to_string(), "stage: N2: deep".to_string()],
        MeasDate::Absent,
    )
    .unwrap();
    annot.save(&path).unwrap();

    let back = read_annotations(&path).unwrap();
    assert_eq!(back.description(), &["bad: EOG", "stage: N2: deep"]);
}

#[test]
fn test_round_trip_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty-annot.fif");

    Annotations::default().save(&path).unwrap();
    let back = read_annotations(&path).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.orig_time(), None);
}

#[test]
fn test_save_rejects_bad_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotations.fif");

    let err = Annotations::default().save(&path);
    assert!(matches!(err, Err(AnnotError::BadFileName(_))));
    // Checked before any I/O
    assert!(!path.exists());
}

#[test]
fn test_read_distinguishes_missing_block_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    // A well-formed container with some other block is "no data", not "bad file"
    let path = dir.path().join("other-annot.fif");
    let mut writer = TagWriter::create(&path).unwrap();
    writer.start_block(999).unwrap();
    writer.write_double(1000, 42.0).unwrap();
    writer.end_block(999).unwrap();
    writer.finish().unwrap();
    assert!(matches!(
        read_annotations(&path),
        Err(AnnotError::NoAnnotationData(_))
    ));

    assert!(matches!(
        read_annotations(dir.path().join("nope-annot.fif")),
        Err(AnnotError::FileNotFound(_))
    ));
}

#[test]
fn test_read_rejects_corrupt_block() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt-annot.fif");

    // Two onsets but only one end time
    let mut writer = TagWriter::create(&path).unwrap();
    writer.start_block(tags::BLOCK_ANNOTATIONS).unwrap();
    writer
        .write_float_array(tags::TAG_ANNOT_ONSET, &[1.0, 2.0])
        .unwrap();
    writer
        .write_float_array(tags::TAG_ANNOT_END, &[1.5])
        .unwrap();
    writer
        .write_name_list(tags::TAG_ANNOT_DESCRIPTION, &["a".to_string(), "b".to_string()])
        .unwrap();
    writer.end_block(tags::BLOCK_ANNOTATIONS).unwrap();
    writer.finish().unwrap();

    assert!(matches!(
        read_annotations(&path),
        Err(AnnotError::CorruptAnnotations)
    ));
}

#[test]
fn test_read_rejects_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trunc-annot.fif");
    std::fs::write(&path, [0u8; 10]).unwrap();

    assert!(matches!(
        read_annotations(&path),
        Err(AnnotError::InvalidFormat(_))
    ));
}

#[test]
fn test_read_exported_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.csv");
    std::fs::write(&path, "stim,1.5\nbad span,2.0,4.5\nstim,6.25\n").unwrap();

    let annot = read_exported_events(&path, MeasDate::Absent).unwrap();
    assert_eq!(annot.onset(), &[1.5, 2.0, 6.25]);
    assert_eq!(annot.duration(), &[0.0, 2.5, 0.0]);
    assert_eq!(annot.description(), &["stim", "bad span", "stim"]);
    assert_eq!(annot.orig_time(), None);

    // A caller-supplied origin anchors the set
    let annot = read_exported_events(&path, 100.0).unwrap();
    assert_eq!(annot.orig_time(), Some(100.0));
}

#[test]
fn test_read_exported_events_rejects_bad_rows() {
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("no_times.csv");
    std::fs::write(&path, "stim\n").unwrap();
    assert!(matches!(
        read_exported_events(&path, MeasDate::Absent),
        Err(AnnotError::InvalidFormat(_))
    ));

    let path = dir.path().join("bad_value.csv");
    std::fs::write(&path, "stim,abc\n").unwrap();
    assert!(matches!(
        read_exported_events(&path, MeasDate::Absent),
        Err(AnnotError::InvalidFormat(_))
    ));
}
