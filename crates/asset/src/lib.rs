//! Asset loading/parsers (meshes, shaders).
//! OBJ text is parsed into attribute pools and triangle faces, then flattened
//! into one float buffer ready for upload. Shader sources are read verbatim.

pub mod error;
pub mod flatten;
pub mod mesh;
pub mod obj;
pub mod shader;

pub use error::{AssetError, AssetResult, FaceDefect};
pub use flatten::{BlockLayout, FlattenedBuffer, flatten};
pub use mesh::{FaceIndexTriple, Mesh, VertexRef};
pub use obj::{load_obj_from_path, load_obj_from_reader, load_obj_from_str};
pub use shader::ShaderSource;
