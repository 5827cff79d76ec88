//! CPU-side mesh representation used by loaders.

/// Object-space position.
pub type Position = [f32; 3];
/// Texture coordinate (u, v).
pub type TexCoord = [f32; 2];
/// Vertex normal, as written in the source (not renormalised).
pub type Normal = [f32; 3];

/// 0-based references of one face corner into the three pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexRef {
    pub position: usize,
    pub texcoord: usize,
    pub normal: usize,
}

impl VertexRef {
    pub fn new(position: usize, texcoord: usize, normal: usize) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// One triangle: exactly three corners, in file order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceIndexTriple(pub [VertexRef; 3]);

impl FaceIndexTriple {
    #[inline]
    pub fn corners(&self) -> &[VertexRef; 3] {
        &self.0
    }
}

/// Attribute pools plus the faces indexing into them.
///
/// Indices stored in faces are not bounds-checked here: a face may reference
/// a pool entry that appears later in the file, so resolution happens in
/// [`crate::flatten::flatten`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub(crate) positions: Vec<Position>,
    pub(crate) texcoords: Vec<TexCoord>,
    pub(crate) normals: Vec<Normal>,
    pub(crate) faces: Vec<FaceIndexTriple>,
}

impl Mesh {
    pub fn new(
        positions: Vec<Position>,
        texcoords: Vec<TexCoord>,
        normals: Vec<Normal>,
        faces: Vec<FaceIndexTriple>,
    ) -> Self {
        Self {
            positions,
            texcoords,
            normals,
            faces,
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[TexCoord] {
        &self.texcoords
    }

    pub fn normals(&self) -> &[Normal] {
        &self.normals
    }

    pub fn faces(&self) -> &[FaceIndexTriple] {
        &self.faces
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face-vertex occurrences; shared corners are counted once per face.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.faces.len() * 3
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_is_three_per_face() {
        let face = FaceIndexTriple([VertexRef::default(); 3]);
        let mesh = Mesh::new(vec![[0.0; 3]], vec![[0.0; 2]], vec![[0.0; 3]], vec![face, face]);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert!(!mesh.is_empty());
        assert!(Mesh::default().is_empty());
    }
}
