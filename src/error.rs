use thiserror::Error;

/// The single error type surfaced by `.SKIN` decoding.
///
/// The decode is fail-fast: the first error anywhere in the linear pass
/// aborts the whole decode. No partial model is ever produced, nothing is
/// retried, and no default is ever substituted for malformed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("input truncated at offset 0x{offset:X}: need {need} byte(s), have {have}")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },
    #[error("submesh {submesh}: {violation}")]
    StructuralViolation {
        submesh: usize,
        violation: Violation,
    },
}

/// A cross-field consistency rule broken by bit-valid data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("face count {count} is not a multiple of 3")]
    NonTriangleFaceCount { count: u32 },
    #[error("face index {value} (entry {index}) out of range for {vertex_count} vertices")]
    FaceIndexOutOfRange {
        index: usize,
        value: u32,
        vertex_count: u32,
    },
    #[error("material id {value} (entry {index}) out of range for {material_count} material(s)")]
    MaterialIdOutOfRange {
        index: usize,
        value: u16,
        material_count: usize,
    },
}

/// Common result type for `.SKIN` decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
