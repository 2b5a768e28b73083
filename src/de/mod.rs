//! PLY payload decoding.
//!
//! The header is parsed first; its schema then drives either the ASCII or
//! the binary record decoder. Both produce the same [`Mesh`].

mod ascii;
mod binary;

pub mod val_reader;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info, warn};

use crate::{
    header::{Endianness, Field, PlyHeader, PropertyDescriptor},
    mesh::{triangulate_fan, Mesh, Vertex},
    Error,
};
use ascii::AsciiDecoder;
use binary::BinaryDecoder;
use val_reader::ScalarValue;

/// Cap on up-front reservation. Element counts come straight from the header.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Record-level decoding for one body encoding.
pub(crate) trait RecordDecoder {
    fn read_vertex(
        &mut self,
        index: usize,
        properties: &[PropertyDescriptor],
    ) -> Result<Vertex, Error>;

    /// Reads one face record into `polygon`. Degenerate faces leave it empty.
    fn read_face(
        &mut self,
        index: usize,
        properties: &[PropertyDescriptor],
        polygon: &mut Vec<i64>,
    ) -> Result<(), Error>;
}

/// Stores a decoded value into the vertex slot named by `field`.
pub(crate) fn apply_field(vertex: &mut Vertex, field: Field, value: ScalarValue) {
    match field {
        Field::PositionX => vertex.position[0] = value.as_f32(),
        Field::PositionY => vertex.position[1] = value.as_f32(),
        Field::PositionZ => vertex.position[2] = value.as_f32(),
        Field::NormalX => vertex.normal.get_or_insert_with(Default::default)[0] = value.as_f32(),
        Field::NormalY => vertex.normal.get_or_insert_with(Default::default)[1] = value.as_f32(),
        Field::NormalZ => vertex.normal.get_or_insert_with(Default::default)[2] = value.as_f32(),
        Field::Red => vertex.color.get_or_insert_with(Default::default)[0] = value.as_color(),
        Field::Green => vertex.color.get_or_insert_with(Default::default)[1] = value.as_color(),
        Field::Blue => vertex.color.get_or_insert_with(Default::default)[2] = value.as_color(),
        Field::TexU => vertex.tex_coord.get_or_insert_with(Default::default)[0] = value.as_f32(),
        Field::TexV => vertex.tex_coord.get_or_insert_with(Default::default)[1] = value.as_f32(),
        Field::Alpha | Field::VertexIndices | Field::Other => {}
    }
}

/// Decode a whole PLY document from a reader
pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Mesh, Error> {
    let header = PlyHeader::parse(&mut reader)?;
    decode_body(reader, &header)
}

/// Convenience function for decoding an ASCII PLY document held in a string
pub fn from_str(ply: &str) -> Result<Mesh, Error> {
    from_reader(ply.as_bytes())
}

/// Open and decode the PLY file at `path`
pub fn read_ply(path: impl AsRef<Path>) -> Result<Mesh, Error> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Decode the records following an already parsed header.
///
/// `reader` must be positioned on the first byte after `end_header`.
pub fn decode_body<R: BufRead>(reader: R, header: &PlyHeader) -> Result<Mesh, Error> {
    let mesh = match header.format.endianness() {
        None => decode_elements(AsciiDecoder::new(reader), header)?,
        Some(file) => decode_elements(
            BinaryDecoder::new(reader, file, Endianness::host()),
            header,
        )?,
    };

    let declared = header.declared;
    if declared.normals && !mesh.has_normals() {
        warn!("Header declares normals, but no vertex carries one");
    }
    if declared.colors && !mesh.has_colors() {
        warn!("Header declares colors, but no vertex carries one");
    }
    if declared.tex_coords && !mesh.has_tex_coords() {
        warn!("Header declares texture coordinates, but no vertex carries one");
    }

    info!(
        "Decoded {} PLY: {} vertices, {} triangles",
        header.format,
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

fn decode_elements<D: RecordDecoder>(mut decoder: D, header: &PlyHeader) -> Result<Mesh, Error> {
    let vertex_count = header.vertex_count();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    let mut pending = header
        .elements
        .iter()
        .filter(|e| e.name == "vertex" || e.name == "face")
        .count();

    for element in &header.elements {
        if pending == 0 {
            break;
        }

        match element.name.as_str() {
            "vertex" => {
                vertices.reserve(element.count.min(MAX_PREALLOCATION));
                for i in 0..element.count {
                    let vertex = decoder
                        .read_vertex(i, &element.properties)
                        .map_err(|e| e.in_record("vertex", i))?;
                    vertices.push(vertex);
                }
                pending -= 1;
            }
            "face" => {
                triangles.reserve(element.count.min(MAX_PREALLOCATION));
                let mut polygon = Vec::new();
                let mut corners = Vec::new();
                for i in 0..element.count {
                    decoder
                        .read_face(i, &element.properties, &mut polygon)
                        .map_err(|e| e.in_record("face", i))?;
                    if polygon.len() < 3 {
                        debug!("Skipping degenerate face {i}");
                        continue;
                    }
                    check_indices(i, &polygon, vertex_count, &mut corners)?;
                    triangulate_fan(&corners, &mut triangles);
                }
                pending -= 1;
            }
            _ if element.count == 0 => {}
            other => return Err(Error::UnsupportedElement(other.to_string())),
        }
    }

    Ok(Mesh::new(vertices, triangles))
}

/// Converts raw indices into vertex indices, rejecting any that do not
/// name an existing vertex.
fn check_indices(
    face: usize,
    polygon: &[i64],
    vertex_count: usize,
    corners: &mut Vec<u32>,
) -> Result<(), Error> {
    corners.clear();
    for &index in polygon {
        let corner = u32::try_from(index)
            .ok()
            .filter(|&c| (c as usize) < vertex_count)
            .ok_or(Error::IndexOutOfRange {
                face,
                index,
                vertex_count,
            })?;
        corners.push(corner);
    }
    Ok(())
}
