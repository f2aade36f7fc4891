//! Tag and block identifiers of the on-disk container format.
//!
//! The container is a flat sequence of tagged records. Each record starts
//! with a 16-byte big-endian header `(kind, dtype, size, next)` followed by
//! `size` bytes of payload. Blocks are delimited by [`TAG_BLOCK_START`] /
//! [`TAG_BLOCK_END`] records whose payload is the block kind.

/// Opens a block; payload is the block kind as int32.
pub const TAG_BLOCK_START: i32 = 104;
/// Closes a block; payload is the block kind as int32.
pub const TAG_BLOCK_END: i32 = 105;

/// Block holding one annotation set.
pub const BLOCK_ANNOTATIONS: i32 = 360;

/// Annotation onsets in seconds, float array.
pub const TAG_ANNOT_ONSET: i32 = 361;
/// Annotation end times (onset + duration) in seconds, float array.
pub const TAG_ANNOT_END: i32 = 362;
/// Colon-joined description list, string.
pub const TAG_ANNOT_DESCRIPTION: i32 = 363;
/// Absolute reference time of the set, double. Omitted when the set has none.
pub const TAG_ANNOT_ORIG_TIME: i32 = 364;

/// Payload type codes.
pub const DTYPE_INT32: i32 = 3;
pub const DTYPE_FLOAT: i32 = 4;
pub const DTYPE_DOUBLE: i32 = 5;
pub const DTYPE_STRING: i32 = 10;

/// `next` pointer meaning "the following record starts right after this one".
pub const NEXT_SEQUENTIAL: i32 = 0;
