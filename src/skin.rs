//! Parser for `.SKIN` multi-submesh model container files.
//!
//! A `.SKIN` file is a single linear sequence of length-prefixed records:
//! a small opaque header followed by `submesh_count` submeshes, each with
//! its own vertex/face data, optional UV and normal layers, embedded
//! materials and a per-face material-id table.
//!
//! Binary layout (all integers little-endian; every count precedes its
//! array):
//!
//! ```text
//! file_t     := header_byte:u8 header_val1:u32 header_val2:u32 header_val3:u32
//!               submesh_count:u32 submesh_t[submesh_count]
//!
//! submesh_t  := name_len:u32 name:u8[name_len]
//!               vertex_count:u32 vertex:f32[3][vertex_count]
//!               face_count:u32 face_index:u32[face_count]    // face_count % 3 == 0
//!               uv_flag:u8 uv_count:u32 uv:f32[2][uv_count]
//!               normal_flag:u8 normal_count:u32 normal:f32[3][normal_count]
//!               extra_flag:u8 unknown_int3:u32
//!               material_count:u32 material_t[material_count]
//!               matid_count:u32 matid:u16[matid_count]
//!               unknown_tail:u32[4]
//!
//! material_t := color1:u32 color2:u32 alpha:f32 color3:u32 color4:u32 flag:u8
//!               tex1_len:u32 tex1:u8[tex1_len]
//!               tex2_len:u32 tex2:u8[tex2_len]
//!               tex3_len:u32 tex3:u8[tex3_len]
//!               matname_len:u32 matname:u8[matname_len]
//! ```
//!
//! Decoding is a single forward pass with no backtracking. The first
//! truncation or structural failure aborts the whole decode; a partially
//! valid model is never returned.

use tracing::debug;

use crate::cursor::ByteCursor;
use crate::error::{DecodeError, DecodeResult, Violation};

const VEC2_SIZE: usize = 8;
const VEC3_SIZE: usize = 12;
/// Byte count of a submesh whose every variable-length field is empty.
/// Used to reject absurd `submesh_count` values before allocating.
const SUBMESH_MIN_SIZE: usize = 51;
/// Byte count of a material whose four name fields are all empty.
const MATERIAL_MIN_SIZE: usize = 37;

/// A fully decoded, validated `.SKIN` model.
///
/// Immutable once constructed; submeshes appear in file order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinModel {
    pub header: FileHeader,
    pub submeshes: Vec<Submesh>,
}

/// Opaque file header. No semantics are known for any field; all four are
/// preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    pub flag: u8,
    pub val1: u32,
    pub val2: u32,
    pub val3: u32,
}

/// One independently-named mesh fragment within a `.SKIN` file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Submesh {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    /// Flat triangle index list; always a multiple of 3 entries, each
    /// `< vertices.len()`. Consumed in triples to form triangles.
    pub face_indices: Vec<u32>,
    /// Presence flag stored separately from `uvs` in the file. Whether a
    /// zero count with a set flag (or the reverse) is meaningful is
    /// undocumented, so both are preserved and left to the consumer.
    pub uv_flag: bool,
    pub uvs: Vec<[f32; 2]>,
    pub normal_flag: bool,
    pub normals: Vec<[f32; 3]>,
    /// Unknown byte at the end of the normal block; purpose unclear.
    pub extra_flag: bool,
    /// Unknown u32 following `extra_flag`; purpose unclear.
    pub unknown_int3: u32,
    pub materials: Vec<Material>,
    /// Per-face (or face-group) indices into `materials`; every entry is
    /// `< materials.len()`.
    pub material_ids: Vec<u16>,
    /// Four trailing u32 values of unknown purpose, preserved verbatim.
    pub unknown_tail: [u32; 4],
}

/// A named shading definition referencing up to three texture names.
///
/// The color fields are packed values with an unspecified bit layout and
/// are preserved verbatim rather than decomposed. An empty texture name
/// means "no texture".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub color1: u32,
    pub color2: u32,
    pub alpha: f32,
    pub color3: u32,
    pub color4: u32,
    pub flag: u8,
    pub texture1_name: String,
    pub texture2_name: String,
    pub texture3_name: String,
    pub material_name: String,
}

/// Decode a complete `.SKIN` buffer into a [`SkinModel`].
///
/// This is the sole public entry point: a pure function of its input, with
/// no I/O and no shared state. Identical bytes always produce an identical
/// model. Trailing bytes after the last submesh are ignored.
pub fn decode(data: &[u8]) -> DecodeResult<SkinModel> {
    let cursor = &mut ByteCursor::new(data);

    let header = FileHeader {
        flag: cursor.read_u8()?,
        val1: cursor.read_u32()?,
        val2: cursor.read_u32()?,
        val3: cursor.read_u32()?,
    };

    let submesh_count = cursor.read_u32()? as usize;
    cursor.ensure_array(submesh_count, SUBMESH_MIN_SIZE)?;
    let mut submeshes = Vec::with_capacity(submesh_count);
    for index in 0..submesh_count {
        submeshes.push(decode_submesh(cursor, index)?);
    }

    if cursor.remaining() > 0 {
        debug!(
            trailing = cursor.remaining(),
            "ignoring trailing bytes after last submesh"
        );
    }

    Ok(SkinModel { header, submeshes })
}

/// Decode one `submesh_t` record and check its cross-field invariants.
fn decode_submesh(cursor: &mut ByteCursor<'_>, submesh: usize) -> DecodeResult<Submesh> {
    let name = cursor.read_string()?;

    let vertex_count = cursor.read_u32()?;
    cursor.ensure_array(vertex_count as usize, VEC3_SIZE)?;
    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for _ in 0..vertex_count {
        vertices.push(cursor.read_vec3()?);
    }

    let face_count = cursor.read_u32()?;
    // The stream stores flat triangle-index triples; a count that cannot
    // form whole triangles means the record is already broken.
    if face_count % 3 != 0 {
        return Err(DecodeError::StructuralViolation {
            submesh,
            violation: Violation::NonTriangleFaceCount { count: face_count },
        });
    }
    cursor.ensure_array(face_count as usize, 4)?;
    let mut face_indices = Vec::with_capacity(face_count as usize);
    for _ in 0..face_count {
        face_indices.push(cursor.read_u32()?);
    }
    for (index, &value) in face_indices.iter().enumerate() {
        if value >= vertex_count {
            return Err(DecodeError::StructuralViolation {
                submesh,
                violation: Violation::FaceIndexOutOfRange {
                    index,
                    value,
                    vertex_count,
                },
            });
        }
    }

    let uv_flag = cursor.read_u8()? != 0;
    let uv_count = cursor.read_u32()?;
    cursor.ensure_array(uv_count as usize, VEC2_SIZE)?;
    let mut uvs = Vec::with_capacity(uv_count as usize);
    for _ in 0..uv_count {
        uvs.push(cursor.read_vec2()?);
    }

    let normal_flag = cursor.read_u8()? != 0;
    let normal_count = cursor.read_u32()?;
    cursor.ensure_array(normal_count as usize, VEC3_SIZE)?;
    let mut normals = Vec::with_capacity(normal_count as usize);
    for _ in 0..normal_count {
        normals.push(cursor.read_vec3()?);
    }

    let extra_flag = cursor.read_u8()? != 0;
    let unknown_int3 = cursor.read_u32()?;

    let material_count = cursor.read_u32()? as usize;
    cursor.ensure_array(material_count, MATERIAL_MIN_SIZE)?;
    let mut materials = Vec::with_capacity(material_count);
    for _ in 0..material_count {
        materials.push(decode_material(cursor)?);
    }

    let matid_count = cursor.read_u32()? as usize;
    cursor.ensure_array(matid_count, 2)?;
    let mut material_ids = Vec::with_capacity(matid_count);
    for _ in 0..matid_count {
        material_ids.push(cursor.read_u16()?);
    }
    for (index, &value) in material_ids.iter().enumerate() {
        if value as usize >= materials.len() {
            return Err(DecodeError::StructuralViolation {
                submesh,
                violation: Violation::MaterialIdOutOfRange {
                    index,
                    value,
                    material_count: materials.len(),
                },
            });
        }
    }

    let unknown_tail = [
        cursor.read_u32()?,
        cursor.read_u32()?,
        cursor.read_u32()?,
        cursor.read_u32()?,
    ];

    debug!(
        submesh,
        name = %name,
        vertices = vertices.len(),
        triangles = face_indices.len() / 3,
        materials = materials.len(),
        "decoded submesh"
    );

    Ok(Submesh {
        name,
        vertices,
        face_indices,
        uv_flag,
        uvs,
        normal_flag,
        normals,
        extra_flag,
        unknown_int3,
        materials,
        material_ids,
        unknown_tail,
    })
}

/// Decode one `material_t` record. Purely sequential; no validation beyond
/// the cursor's own bounds checks.
fn decode_material(cursor: &mut ByteCursor<'_>) -> DecodeResult<Material> {
    let color1 = cursor.read_u32()?;
    let color2 = cursor.read_u32()?;
    let alpha = cursor.read_f32()?;
    let color3 = cursor.read_u32()?;
    let color4 = cursor.read_u32()?;
    let flag = cursor.read_u8()?;
    let texture1_name = cursor.read_string()?;
    let texture2_name = cursor.read_string()?;
    let texture3_name = cursor.read_string()?;
    let material_name = cursor.read_string()?;
    Ok(Material {
        color1,
        color2,
        alpha,
        color3,
        color4,
        flag,
        texture1_name,
        texture2_name,
        texture3_name,
        material_name,
    })
}
