//! Resolve face indices into GPU-ready, non-interleaved float blocks.

use corelib::{Attribute, FLOAT_SIZE, FLOATS_PER_VERTEX};

use crate::{
    error::{AssetError, AssetResult},
    mesh::{Mesh, VertexRef},
};

/// Positions, then texture coordinates, then normals, one entry per
/// face-vertex. Block boundaries are derived from the length, never stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedBuffer {
    floats: Vec<f32>,
}

/// Where each attribute block lives inside a [`FlattenedBuffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockLayout {
    pub vertex_count: usize,
    pub position_len: usize,
    pub texcoord_len: usize,
    pub normal_len: usize,
    pub position_offset: usize,
    pub texcoord_offset: usize,
    pub normal_offset: usize,
    pub byte_len: usize,
}

impl BlockLayout {
    /// Layout for `vertex_count` face-vertices. Offsets are in bytes.
    pub fn for_vertices(vertex_count: usize) -> Self {
        let position_len = vertex_count * Attribute::Position.components();
        let texcoord_len = vertex_count * Attribute::TexCoord.components();
        let normal_len = vertex_count * Attribute::Normal.components();
        let texcoord_offset = position_len * FLOAT_SIZE;
        let normal_offset = texcoord_offset + texcoord_len * FLOAT_SIZE;
        Self {
            vertex_count,
            position_len,
            texcoord_len,
            normal_len,
            position_offset: 0,
            texcoord_offset,
            normal_offset,
            byte_len: normal_offset + normal_len * FLOAT_SIZE,
        }
    }

    /// Byte range of one attribute block.
    pub fn byte_range(&self, attribute: Attribute) -> std::ops::Range<usize> {
        let (offset, len) = match attribute {
            Attribute::Position => (self.position_offset, self.position_len),
            Attribute::TexCoord => (self.texcoord_offset, self.texcoord_len),
            Attribute::Normal => (self.normal_offset, self.normal_len),
        };
        offset..offset + len * FLOAT_SIZE
    }

    fn float_range(&self, attribute: Attribute) -> std::ops::Range<usize> {
        let bytes = self.byte_range(attribute);
        bytes.start / FLOAT_SIZE..bytes.end / FLOAT_SIZE
    }
}

impl FlattenedBuffer {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.floats
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.floats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.floats.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.floats.len() / FLOATS_PER_VERTEX
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn layout(&self) -> BlockLayout {
        BlockLayout::for_vertices(self.vertex_count())
    }

    pub fn block(&self, attribute: Attribute) -> &[f32] {
        &self.floats[self.layout().float_range(attribute)]
    }

    pub fn positions(&self) -> &[f32] {
        self.block(Attribute::Position)
    }

    pub fn texcoords(&self) -> &[f32] {
        self.block(Attribute::TexCoord)
    }

    pub fn normals(&self) -> &[f32] {
        self.block(Attribute::Normal)
    }
}

/// Flatten a parsed mesh. Faces are walked in file order, corners in the
/// order they were written. Any out-of-range reference aborts the whole call.
pub fn flatten(mesh: &Mesh) -> AssetResult<FlattenedBuffer> {
    let layout = BlockLayout::for_vertices(mesh.vertex_count());
    let mut positions = Vec::with_capacity(layout.position_len);
    let mut texcoords = Vec::with_capacity(layout.texcoord_len);
    let mut normals = Vec::with_capacity(layout.normal_len);

    for (face_no, face) in mesh.faces().iter().enumerate() {
        for (corner, &VertexRef { position, texcoord, normal }) in face.corners().iter().enumerate()
        {
            let lookup = Lookup { face: face_no, corner };
            positions.extend_from_slice(lookup.get(mesh.positions(), position, Attribute::Position)?);
            texcoords.extend_from_slice(lookup.get(mesh.texcoords(), texcoord, Attribute::TexCoord)?);
            normals.extend_from_slice(lookup.get(mesh.normals(), normal, Attribute::Normal)?);
        }
    }

    let mut floats = positions;
    floats.reserve_exact(texcoords.len() + normals.len());
    floats.extend_from_slice(&texcoords);
    floats.extend_from_slice(&normals);

    log::debug!(
        "Flattened {} faces into {} floats ({} bytes)",
        mesh.face_count(),
        floats.len(),
        layout.byte_len
    );
    Ok(FlattenedBuffer { floats })
}

struct Lookup {
    face: usize,
    corner: usize,
}

impl Lookup {
    fn get<'m, const N: usize>(
        &self,
        pool: &'m [[f32; N]],
        index: usize,
        attribute: Attribute,
    ) -> AssetResult<&'m [f32; N]> {
        pool.get(index)
            .ok_or(AssetError::IndexOutOfRange {
                face: self.face,
                corner: self.corner,
                attribute,
                index,
                len: pool.len(),
            })
            .inspect_err(|err| log::warn!("Failed to flatten mesh: {}", err))
    }
}
