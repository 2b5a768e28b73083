//! OBJ encoding.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{mesh::Mesh, Error};

pub mod obj_writer;

pub use obj_writer::{FaceFormat, ObjWriter};

/// Write `mesh` as an OBJ document into `writer`
pub fn to_writer(mesh: &Mesh, writer: impl Write) -> Result<(), Error> {
    ObjWriter::new(writer).write_mesh(mesh)
}

/// Serializes `mesh` into an OBJ string
pub fn to_string(mesh: &Mesh) -> Result<String, Error> {
    let mut buf = Vec::new();
    to_writer(mesh, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Create (or truncate) the file at `path` and write `mesh` into it
pub fn write_obj(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let file = File::create(path)?;
    to_writer(mesh, BufWriter::new(file))?;
    info!(
        "Wrote {} vertices and {} triangles to {}",
        mesh.vertices.len(),
        mesh.triangles.len(),
        path.display()
    );
    Ok(())
}
