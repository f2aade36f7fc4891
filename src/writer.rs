use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::annotations::Annotations;
use crate::error::{AnnotError, Result};
use crate::tags::{
    BLOCK_ANNOTATIONS, DTYPE_DOUBLE, DTYPE_FLOAT, DTYPE_INT32, DTYPE_STRING, NEXT_SEQUENTIAL,
    TAG_ANNOT_DESCRIPTION, TAG_ANNOT_END, TAG_ANNOT_ONSET, TAG_ANNOT_ORIG_TIME, TAG_BLOCK_END,
    TAG_BLOCK_START,
};

/// Accepted suffixes for standalone annotation files.
const ANNOT_SUFFIXES: [&str; 4] = ["-annot.fif", "-annot.fif.gz", "_annot.fif", "_annot.fif.gz"];

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

/// Writer for the tagged binary container.
///
/// Emits a flat sequence of tagged records (16-byte big-endian header
/// `(kind, dtype, size, next)` plus payload, see [`crate::tags`]). Files
/// whose name ends in `.gz` are gzip-compressed transparently.
///
/// # Examples
///
/// ```rust
/// use sigannot::writer::TagWriter;
/// use sigannot::tags;
///
/// # let dir = tempfile::tempdir().unwrap();
/// # let path = dir.path().join("block.fif");
/// let mut writer = TagWriter::create(&path)?;
/// writer.start_block(tags::BLOCK_ANNOTATIONS)?;
/// writer.write_float_array(tags::TAG_ANNOT_ONSET, &[1.0, 2.0])?;
/// writer.end_block(tags::BLOCK_ANNOTATIONS)?;
/// writer.finish()?;
/// # Ok::<(), sigannot::AnnotError>(())
/// ```
pub struct TagWriter {
    sink: Sink,
}

impl TagWriter {
    /// Creates (or truncates) the file at `path`.
    ///
    /// A `.gz` suffix selects gzip compression for the whole stream.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path)
            .map_err(|e| AnnotError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
        let buffered = BufWriter::new(file);
        let gzip = path
            .as_ref()
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
        let sink = if gzip {
            Sink::Gzip(GzEncoder::new(buffered, Compression::default()))
        } else {
            Sink::Plain(buffered)
        };
        Ok(TagWriter { sink })
    }

    fn write_header(&mut self, kind: i32, dtype: i32, size: usize) -> Result<()> {
        self.sink.write_all(&kind.to_be_bytes())?;
        self.sink.write_all(&dtype.to_be_bytes())?;
        self.sink.write_all(&(size as i32).to_be_bytes())?;
        self.sink.write_all(&NEXT_SEQUENTIAL.to_be_bytes())?;
        Ok(())
    }

    /// Opens a block of the given kind.
    pub fn start_block(&mut self, block: i32) -> Result<()> {
        self.write_header(TAG_BLOCK_START, DTYPE_INT32, 4)?;
        self.sink.write_all(&block.to_be_bytes())?;
        Ok(())
    }

    /// Closes a block of the given kind.
    pub fn end_block(&mut self, block: i32) -> Result<()> {
        self.write_header(TAG_BLOCK_END, DTYPE_INT32, 4)?;
        self.sink.write_all(&block.to_be_bytes())?;
        Ok(())
    }

    /// Writes a float array tag. Values are stored in single precision.
    pub fn write_float_array(&mut self, kind: i32, values: &[f64]) -> Result<()> {
        self.write_header(kind, DTYPE_FLOAT, values.len() * 4)?;
        for &value in values {
            self.sink.write_all(&(value as f32).to_be_bytes())?;
        }
        Ok(())
    }

    /// Writes a double-precision scalar tag.
    pub fn write_double(&mut self, kind: i32, value: f64) -> Result<()> {
        self.write_header(kind, DTYPE_DOUBLE, 8)?;
        self.sink.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    /// Writes a name-list tag: entries joined by `:` into one string payload.
    /// Entries must not themselves contain `:`; escape beforehand.
    pub fn write_name_list(&mut self, kind: i32, names: &[String]) -> Result<()> {
        let joined = names.join(":");
        self.write_header(kind, DTYPE_STRING, joined.len())?;
        self.sink.write_all(joined.as_bytes())?;
        Ok(())
    }

    /// Flushes and closes the stream. Dropping the writer also finalizes the
    /// stream, but only `finish` surfaces late I/O errors.
    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Plain(mut writer) => writer.flush()?,
            Sink::Gzip(encoder) => {
                encoder.finish()?.flush()?;
            }
        }
        Ok(())
    }
}

/// Appends one annotation block to an already-open writer.
///
/// Layout: onset array, end-time array (onset + duration), the colon-joined
/// description list with literal colons escaped as semicolons, and the origin
/// scalar only when the set has one.
pub fn write_annotations(writer: &mut TagWriter, annotations: &Annotations) -> Result<()> {
    writer.start_block(BLOCK_ANNOTATIONS)?;
    writer.write_float_array(TAG_ANNOT_ONSET, annotations.onset())?;
    let ends: Vec<f64> = annotations
        .onset()
        .iter()
        .zip(annotations.duration())
        .map(|(o, d)| o + d)
        .collect();
    writer.write_float_array(TAG_ANNOT_END, &ends)?;
    // Descriptions may contain ':', the list separator; they can never
    // contain ';' (rejected at construction), so it is free as the escape.
    let escaped: Vec<String> = annotations
        .description()
        .iter()
        .map(|d| d.replace(':', ";"))
        .collect();
    writer.write_name_list(TAG_ANNOT_DESCRIPTION, &escaped)?;
    if let Some(orig_time) = annotations.orig_time() {
        writer.write_double(TAG_ANNOT_ORIG_TIME, orig_time)?;
    }
    writer.end_block(BLOCK_ANNOTATIONS)?;
    Ok(())
}

impl Annotations {
    /// Saves the set to a standalone annotation file.
    ///
    /// Annotations usually travel inside a larger measurement container;
    /// this writes them to their own file. The name must end in one of
    /// `-annot.fif`, `-annot.fif.gz`, `_annot.fif` or `_annot.fif.gz`, which
    /// is checked before any I/O happens.
    ///
    /// # Errors
    ///
    /// [`AnnotError::BadFileName`] on a suffix violation, otherwise any I/O
    /// error from creating or writing the file.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigannot::{read_annotations, Annotations, MeasDate};
    ///
    /// # let dir = tempfile::tempdir().unwrap();
    /// # let path = dir.path().join("rest-annot.fif");
    /// let annot = Annotations::new_uniform(vec![1.0], vec![2.0], "bad EOG", MeasDate::Absent)?;
    /// annot.save(&path)?;
    ///
    /// let back = read_annotations(&path)?;
    /// assert_eq!(back.description(), annot.description());
    /// # Ok::<(), sigannot::AnnotError>(())
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let name = path.as_ref().to_string_lossy();
        if !ANNOT_SUFFIXES.iter().any(|sfx| name.ends_with(sfx)) {
            return Err(AnnotError::BadFileName(format!(
                "filename should end with {} or {}, got \"{}\"",
                ANNOT_SUFFIXES[..ANNOT_SUFFIXES.len() - 1].join(", "),
                ANNOT_SUFFIXES[ANNOT_SUFFIXES.len() - 1],
                name
            )));
        }
        let mut writer = TagWriter::create(&path)?;
        write_annotations(&mut writer, self)?;
        writer.finish()
    }
}
