//! Converts PLY (Polygon File Format) meshes and point clouds into Wavefront OBJ.
//!
//! PLY files have a variable header structure that defines the data format,
//! so we parse the header first and use that schema to drive decoding of the
//! ASCII, binary little endian or binary big endian body. The decoded
//! [`Mesh`] is then written out in OBJ's fixed per-line grammar, with
//! polygons fan-triangulated and missing per-vertex attributes filled with
//! placeholders so every `f` reference stays valid.
//!
//! # Example
//!
//! ```rust
//! let ply_data = "ply
//! format ascii 1.0
//! element vertex 3
//! property float x
//! property float y
//! property float z
//! element face 1
//! property list uchar int vertex_indices
//! end_header
//! 0 0 0
//! 1 0 0
//! 0 1 0
//! 3 0 1 2
//! ";
//!
//! let mesh = ply2obj::from_str(ply_data).unwrap();
//! assert_eq!(mesh.vertices.len(), 3);
//! assert_eq!(mesh.triangles.len(), 1);
//!
//! let obj = ply2obj::to_string(&mesh).unwrap();
//! assert!(obj.contains("f 1 2 3"));
//! ```

pub mod de;
mod error;
pub mod header;
pub mod mesh;
pub mod ser;

use std::path::Path;

pub use de::{from_reader, from_str, read_ply};
pub use error::Error;
pub use header::{
    ElementSchema, Endianness, Field, PlyFormat, PlyHeader, PropertyDescriptor, PropertyKind,
    ScalarType,
};
pub use mesh::{Attributes, Mesh, Triangle, Vertex};
pub use ser::{to_string, to_writer, write_obj};

/// Reads the PLY file at `input` and writes it as OBJ to `output`.
///
/// Nothing is written unless decoding succeeds completely. The decoded mesh
/// is returned so callers can report on it.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Mesh, Error> {
    let mesh = read_ply(input)?;
    write_obj(&mesh, output)?;
    Ok(mesh)
}
