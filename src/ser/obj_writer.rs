use std::io::Write;

use crate::{
    mesh::{Attributes, Mesh, Vertex},
    Error,
};

/// Texture coordinate written for vertices that have none.
const PLACEHOLDER_TEX_COORD: [f32; 2] = [0.0, 0.0];
/// Normal written for vertices that have none. A zero normal would be
/// degenerate, so this points up the Z axis.
const PLACEHOLDER_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// How each corner of an `f` line references the attribute blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceFormat {
    /// `f v`
    Position,
    /// `f v/vt`
    PositionTexture,
    /// `f v//vn`
    PositionNormal,
    /// `f v/vt/vn`
    PositionTextureNormal,
}

impl FaceFormat {
    pub fn for_attributes(attributes: Attributes) -> Self {
        match (attributes.tex_coords, attributes.normals) {
            (false, false) => FaceFormat::Position,
            (true, false) => FaceFormat::PositionTexture,
            (false, true) => FaceFormat::PositionNormal,
            (true, true) => FaceFormat::PositionTextureNormal,
        }
    }

    /// Writes one 1-based corner reference. Every vertex owns exactly one
    /// `vt` and one `vn` slot, so all three indices are the same.
    fn write_corner<W: Write>(&self, writer: &mut W, index: u64) -> Result<(), Error> {
        match self {
            FaceFormat::Position => write!(writer, " {index}")?,
            FaceFormat::PositionTexture => write!(writer, " {index}/{index}")?,
            FaceFormat::PositionNormal => write!(writer, " {index}//{index}")?,
            FaceFormat::PositionTextureNormal => write!(writer, " {index}/{index}/{index}")?,
        }
        Ok(())
    }
}

/// Serializes a [`Mesh`] as an OBJ document.
///
/// Output is written strictly in block order: header comments, `v`, `vt`,
/// `vn`, then `f`.
pub struct ObjWriter<W: Write> {
    writer: W,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_mesh(&mut self, mesh: &Mesh) -> Result<(), Error> {
        self.write_preamble(mesh)?;
        self.write_positions(&mesh.vertices)?;
        if mesh.has_tex_coords() {
            self.write_tex_coords(&mesh.vertices)?;
        }
        if mesh.has_normals() {
            self.write_normals(&mesh.vertices)?;
        }
        self.write_faces(mesh)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_preamble(&mut self, mesh: &Mesh) -> Result<(), Error> {
        let w = &mut self.writer;
        writeln!(w, "# Converted from PLY to OBJ by ply2obj")?;
        writeln!(w, "# Vertices: {}", mesh.vertices.len())?;
        writeln!(w, "# Faces: {}", mesh.triangles.len())?;
        if mesh.has_normals() {
            writeln!(w, "# Has Normals")?;
        }
        if mesh.has_colors() {
            writeln!(w, "# Has Vertex Colors (appended to 'v' lines as r g b)")?;
        }
        if mesh.has_tex_coords() {
            writeln!(w, "# Has Texture Coordinates")?;
        }
        writeln!(w)?;
        Ok(())
    }

    fn write_positions(&mut self, vertices: &[Vertex]) -> Result<(), Error> {
        for vertex in vertices {
            let [x, y, z] = vertex.position;
            write!(self.writer, "v {x} {y} {z}")?;
            // Color follows the vertex itself, not the mesh-wide flag.
            if let Some([r, g, b]) = vertex.color {
                write!(self.writer, " {r} {g} {b}")?;
            }
            writeln!(self.writer)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_tex_coords(&mut self, vertices: &[Vertex]) -> Result<(), Error> {
        for vertex in vertices {
            let [u, v] = vertex.tex_coord.unwrap_or(PLACEHOLDER_TEX_COORD);
            writeln!(self.writer, "vt {u} {v}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_normals(&mut self, vertices: &[Vertex]) -> Result<(), Error> {
        for vertex in vertices {
            let [x, y, z] = vertex.normal.unwrap_or(PLACEHOLDER_NORMAL);
            writeln!(self.writer, "vn {x} {y} {z}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_faces(&mut self, mesh: &Mesh) -> Result<(), Error> {
        let format = FaceFormat::for_attributes(mesh.attributes);
        for triangle in &mesh.triangles {
            self.writer.write_all(b"f")?;
            for index in triangle.indices() {
                format.write_corner(&mut self.writer, u64::from(index) + 1)?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }
}
