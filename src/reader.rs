use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::annotations::Annotations;
use crate::error::{AnnotError, Result};
use crate::tags::{
    BLOCK_ANNOTATIONS, DTYPE_DOUBLE, DTYPE_FLOAT, DTYPE_INT32, DTYPE_STRING, TAG_ANNOT_DESCRIPTION,
    TAG_ANNOT_END, TAG_ANNOT_ONSET, TAG_ANNOT_ORIG_TIME, TAG_BLOCK_END, TAG_BLOCK_START,
};
use crate::time::MeasDate;

/// Gzip stream magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Position of one non-structural tag inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub kind: i32,
    pub pos: u64,
}

/// One block of the parsed container, with its nested blocks.
///
/// The root node has block kind `0` and holds everything outside any block.
#[derive(Debug, Default)]
pub struct TagTree {
    pub block: i32,
    pub directory: Vec<TagEntry>,
    pub children: Vec<TagTree>,
}

/// A tag read back from the container.
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    Int32(i32),
    FloatArray(Vec<f32>),
    Double(f64),
    String(String),
}

/// Opens a container file into a seekable buffer plus its parse tree.
///
/// Gzip-compressed files are detected by magic bytes and inflated into
/// memory, so random access works the same on both. The file handle is
/// released before this returns; all later reads go to the buffer.
pub fn open<P: AsRef<Path>>(path: P) -> Result<(Cursor<Vec<u8>>, TagTree)> {
    let mut file = File::open(&path)
        .map_err(|e| AnnotError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;

    let bytes = if raw.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut inflated)?;
        inflated
    } else {
        raw
    };

    let mut cursor = Cursor::new(bytes);
    let tree = parse_tree(&mut cursor)?;
    Ok((cursor, tree))
}

/// Collects every block of the given kind, depth first.
pub fn find_blocks(tree: &TagTree, block: i32) -> Vec<&TagTree> {
    let mut found = Vec::new();
    if tree.block == block {
        found.push(tree);
    }
    for child in &tree.children {
        found.extend(find_blocks(child, block));
    }
    found
}

/// Reads the tag starting at `pos`.
pub fn read_tag_at(cursor: &mut Cursor<Vec<u8>>, pos: u64) -> Result<(i32, TagData)> {
    cursor.seek(SeekFrom::Start(pos))?;
    let kind = read_i32(cursor)?;
    let dtype = read_i32(cursor)?;
    let size = read_i32(cursor)?;
    let _next = read_i32(cursor)?;
    if size < 0 {
        return Err(AnnotError::InvalidFormat(format!(
            "negative tag size {} at position {}",
            size, pos
        )));
    }
    let mut payload = vec![0u8; size as usize];
    cursor.read_exact(&mut payload)?;

    let data = match dtype {
        DTYPE_INT32 => {
            if payload.len() != 4 {
                return Err(AnnotError::InvalidFormat(format!(
                    "int32 tag {} has size {}",
                    kind,
                    payload.len()
                )));
            }
            TagData::Int32(i32::from_be_bytes([
                payload[0], payload[1], payload[2], payload[3],
            ]))
        }
        DTYPE_FLOAT => {
            if payload.len() % 4 != 0 {
                return Err(AnnotError::InvalidFormat(format!(
                    "float tag {} has size {}",
                    kind,
                    payload.len()
                )));
            }
            TagData::FloatArray(
                payload
                    .chunks_exact(4)
                    .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            )
        }
        DTYPE_DOUBLE => {
            if payload.len() != 8 {
                return Err(AnnotError::InvalidFormat(format!(
                    "double tag {} has size {}",
                    kind,
                    payload.len()
                )));
            }
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&payload);
            TagData::Double(f64::from_be_bytes(bytes))
        }
        DTYPE_STRING => TagData::String(String::from_utf8_lossy(&payload).into_owned()),
        other => {
            return Err(AnnotError::InvalidFormat(format!(
                "unknown tag data type {} (tag {})",
                other, kind
            )))
        }
    };
    Ok((kind, data))
}

/// Reads annotations from a standalone container file.
///
/// # Errors
///
/// [`AnnotError::NoAnnotationData`] when the file parses but holds no
/// annotation block, a different condition from a malformed file, so
/// callers can tell "wrong file" from "corrupt file".
///
/// # Examples
///
/// ```rust
/// use sigannot::{read_annotations, Annotations, MeasDate};
///
/// # let dir = tempfile::tempdir().unwrap();
/// # let path = dir.path().join("sleep_annot.fif.gz");
/// let annot = Annotations::new_uniform(vec![30.0], vec![120.0], "apnea", 1.5e9)?;
/// annot.save(&path)?;
///
/// let back = read_annotations(&path)?;
/// assert_eq!(back.len(), 1);
/// assert_eq!(back.orig_time(), Some(1.5e9));
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<Annotations> {
    let (mut cursor, tree) = open(&path)?;
    match read_annotations_from_tree(&mut cursor, &tree)? {
        Some(annotations) => Ok(annotations),
        None => Err(AnnotError::NoAnnotationData(
            path.as_ref().display().to_string(),
        )),
    }
}

/// Reads annotations out of an already-parsed container tree.
///
/// Returns `Ok(None)` when the tree holds no annotation block; whether that
/// is an error is the caller's call (a larger measurement file legitimately
/// may carry none).
pub fn read_annotations_from_tree(
    cursor: &mut Cursor<Vec<u8>>,
    tree: &TagTree,
) -> Result<Option<Annotations>> {
    let blocks = find_blocks(tree, BLOCK_ANNOTATIONS);
    let block = match blocks.first() {
        None => return Ok(None),
        Some(block) => block,
    };

    let mut onset: Vec<f64> = Vec::new();
    let mut ends: Vec<f64> = Vec::new();
    let mut description: Vec<String> = Vec::new();
    let mut orig_time: Option<f64> = None;

    for entry in &block.directory {
        let (_, data) = read_tag_at(cursor, entry.pos)?;
        match (entry.kind, data) {
            (TAG_ANNOT_ONSET, TagData::FloatArray(values)) => {
                onset = values.into_iter().map(f64::from).collect();
            }
            (TAG_ANNOT_END, TagData::FloatArray(values)) => {
                ends = values.into_iter().map(f64::from).collect();
            }
            (TAG_ANNOT_DESCRIPTION, TagData::String(joined)) => {
                description = if joined.is_empty() {
                    Vec::new()
                } else {
                    joined.split(':').map(|d| d.replace(';', ":")).collect()
                };
            }
            (TAG_ANNOT_ORIG_TIME, TagData::Double(value)) => {
                orig_time = Some(value);
            }
            _ => {}
        }
    }

    if onset.len() != ends.len() || onset.len() != description.len() {
        return Err(AnnotError::CorruptAnnotations);
    }
    let duration: Vec<f64> = onset.iter().zip(&ends).map(|(o, e)| e - o).collect();

    Annotations::new(onset, duration, description, MeasDate::from(orig_time)).map(Some)
}

/// Reads annotations from a third-party tabular event export.
///
/// One row per event occurrence, no header: a label column followed by one
/// or two time columns in seconds. With two times the duration is their
/// difference, otherwise zero. `orig_time` anchors the resulting set; pass
/// [`MeasDate::Absent`] to keep it relative to the recording start.
pub fn read_exported_events<P: AsRef<Path>>(
    path: P,
    orig_time: impl Into<MeasDate>,
) -> Result<Annotations> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|e| AnnotError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;

    let mut onset = Vec::new();
    let mut duration = Vec::new();
    let mut description = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let label = record
            .get(0)
            .ok_or_else(|| AnnotError::InvalidFormat(format!("row {}: missing label", row + 1)))?
            .to_string();
        let mut times = Vec::with_capacity(2);
        for field in record.iter().skip(1).filter(|f| !f.is_empty()) {
            let value: f64 = field.parse().map_err(|_| {
                AnnotError::InvalidFormat(format!("row {}: bad time value \"{}\"", row + 1, field))
            })?;
            times.push(value);
        }
        match times.as_slice() {
            [start] => {
                onset.push(*start);
                duration.push(0.0);
            }
            [start, end] => {
                onset.push(*start);
                duration.push(end - start);
            }
            _ => {
                return Err(AnnotError::InvalidFormat(format!(
                    "row {}: expected one or two time values, got {}",
                    row + 1,
                    times.len()
                )))
            }
        }
        description.push(label);
    }

    Annotations::new(onset, duration, description, orig_time)
}

fn read_i32(cursor: &mut Cursor<Vec<u8>>) -> Result<i32> {
    let mut bytes = [0u8; 4];
    cursor.read_exact(&mut bytes)?;
    Ok(i32::from_be_bytes(bytes))
}

/// Scans the whole buffer into a block tree.
fn parse_tree(cursor: &mut Cursor<Vec<u8>>) -> Result<TagTree> {
    let len = cursor.get_ref().len() as u64;
    cursor.seek(SeekFrom::Start(0))?;

    let mut stack: Vec<TagTree> = vec![TagTree::default()];
    let mut pos = 0u64;
    while pos + 16 <= len {
        cursor.seek(SeekFrom::Start(pos))?;
        let kind = read_i32(cursor)?;
        let dtype = read_i32(cursor)?;
        let size = read_i32(cursor)?;
        let _next = read_i32(cursor)?;
        if size < 0 || pos + 16 + size as u64 > len {
            return Err(AnnotError::InvalidFormat(format!(
                "truncated tag {} at position {}",
                kind, pos
            )));
        }

        match kind {
            TAG_BLOCK_START => {
                if dtype != DTYPE_INT32 || size != 4 {
                    return Err(AnnotError::InvalidFormat(
                        "malformed block start tag".to_string(),
                    ));
                }
                let block = read_i32(cursor)?;
                stack.push(TagTree {
                    block,
                    ..TagTree::default()
                });
            }
            TAG_BLOCK_END => {
                let closed = match stack.pop() {
                    // The root is not closable; only pushed blocks are.
                    Some(node) if !stack.is_empty() => node,
                    _ => {
                        return Err(AnnotError::InvalidFormat(
                            "block end without matching block start".to_string(),
                        ))
                    }
                };
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(closed);
                }
            }
            _ => {
                if let Some(current) = stack.last_mut() {
                    current.directory.push(TagEntry { kind, pos });
                }
            }
        }
        pos += 16 + size as u64;
    }

    if pos != len {
        return Err(AnnotError::InvalidFormat(format!(
            "trailing bytes after position {}",
            pos
        )));
    }
    let root = match stack.pop() {
        Some(root) if stack.is_empty() => root,
        _ => {
            return Err(AnnotError::InvalidFormat(
                "unterminated block at end of file".to_string(),
            ))
        }
    };
    Ok(root)
}
