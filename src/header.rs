//! PLY header parsing.
//!
//! The header is always line oriented text, even when the body that follows
//! it is binary. Parsing turns it into an ordered list of element schemas
//! whose properties are resolved to a [`Field`] once, so the decoders never
//! have to compare property names per record.

use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use log::{debug, warn};

use crate::{mesh::Attributes, Error};

/// PLY body encoding (ascii or binary)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    /// Byte order of the body, or `None` for ASCII bodies.
    pub fn endianness(&self) -> Option<Endianness> {
        match self {
            PlyFormat::Ascii => None,
            PlyFormat::BinaryLittleEndian => Some(Endianness::Little),
            PlyFormat::BinaryBigEndian => Some(Endianness::Big),
        }
    }
}

impl fmt::Display for PlyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyFormat::Ascii => write!(f, "ascii"),
            PlyFormat::BinaryLittleEndian => write!(f, "binary_little_endian"),
            PlyFormat::BinaryBigEndian => write!(f, "binary_big_endian"),
        }
    }
}

/// Byte order of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the machine we are running on.
    pub fn host() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }
}

/// PLY scalar data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "char" | "int8" => Ok(ScalarType::Char),
            "uchar" | "uint8" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" => Ok(ScalarType::UInt),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            _ => Err(Error::UnsupportedType(format!("Unknown scalar type: {s}"))),
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        };
        f.write_str(name)
    }
}

/// Shape of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// A scalar property with a single value
    Scalar(ScalarType),
    /// A list property with variable length, prefixed by its own count
    List {
        count_type: ScalarType,
        item_type: ScalarType,
    },
}

/// What a property means to the converter, resolved once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PositionX,
    PositionY,
    PositionZ,
    NormalX,
    NormalY,
    NormalZ,
    Red,
    Green,
    Blue,
    Alpha,
    TexU,
    TexV,
    /// The polygon index list of the face element.
    VertexIndices,
    /// Anything else. Consumed and discarded.
    Other,
}

impl Field {
    /// Resolves a property declared under `element`. Only `vertex` scalars
    /// and the `face` index list carry meaning.
    pub fn resolve(element: &str, name: &str, kind: &PropertyKind) -> Self {
        match (element, kind) {
            ("vertex", PropertyKind::Scalar(_)) => match name {
                "x" => Field::PositionX,
                "y" => Field::PositionY,
                "z" => Field::PositionZ,
                "nx" => Field::NormalX,
                "ny" => Field::NormalY,
                "nz" => Field::NormalZ,
                "red" => Field::Red,
                "green" => Field::Green,
                "blue" => Field::Blue,
                "alpha" => Field::Alpha,
                "u" | "s" | "texture_u" => Field::TexU,
                "v" | "t" | "texture_v" => Field::TexV,
                _ => Field::Other,
            },
            ("face", PropertyKind::List { .. }) => match name {
                "vertex_indices" | "vertex_index" => Field::VertexIndices,
                _ => Field::Other,
            },
            _ => Field::Other,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Field::NormalX | Field::NormalY | Field::NormalZ)
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Field::Red | Field::Green | Field::Blue | Field::Alpha)
    }

    pub fn is_tex_coord(&self) -> bool {
        matches!(self, Field::TexU | Field::TexV)
    }
}

/// One property of one element, as declared in the header.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
    /// Position within the element's property list. For elements without
    /// list properties this is also the ASCII column.
    pub ordinal: usize,
    pub field: Field,
}

/// PLY element definition (e.g., vertex, face)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSchema {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDescriptor>,
}

impl ElementSchema {
    fn has_field(&self, field: Field) -> bool {
        self.properties.iter().any(|p| p.field == field)
    }
}

/// PLY header containing format information and element definitions
#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub elements: Vec<ElementSchema>,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
    /// Attributes whose properties appear in the vertex element. The mesh
    /// decides its own flags from the decoded data.
    pub declared: Attributes,
}

impl PlyHeader {
    /// Parse a PLY header from a reader, leaving it positioned on the first
    /// byte after the `end_header` line.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let mut format = None;
        let mut version = String::new();
        let mut elements: Vec<ElementSchema> = Vec::new();
        let mut comments = Vec::new();
        let mut obj_info = Vec::new();
        let mut declared = Attributes::default();
        let mut saw_magic = false;
        let mut saw_end = false;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            // Free text lines may carry any encoding.
            let text = String::from_utf8_lossy(buf.trim_ascii());
            let line: &str = &text;

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };

            if !saw_magic && keyword != "ply" {
                warn!("PLY header does not start with 'ply'");
            }
            saw_magic = true;

            if let Some(comment) = line.strip_prefix("comment") {
                comments.push(comment.trim().to_string());
                continue;
            }
            if keyword == "obj_info" {
                obj_info.push(parts.collect::<Vec<_>>().join(" "));
                continue;
            }
            if let Cow::Owned(_) = text {
                return Err(Error::InvalidHeader(format!("Line is not valid UTF-8: {line}")));
            }

            match keyword {
                "ply" => {}
                "format" => {
                    let encoding = parts
                        .next()
                        .ok_or_else(|| Error::InvalidHeader("Invalid format line".to_string()))?;
                    format = Some(match encoding {
                        "ascii" => PlyFormat::Ascii,
                        "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                        "binary_big_endian" => PlyFormat::BinaryBigEndian,
                        _ => return Err(Error::UnsupportedFormat(encoding.to_string())),
                    });
                    version = parts.next().unwrap_or_default().to_string();
                }
                "element" => {
                    let (Some(name), Some(count)) = (parts.next(), parts.next()) else {
                        return Err(Error::InvalidHeader("Invalid element line".to_string()));
                    };
                    let count = count.parse::<usize>().map_err(|_| {
                        Error::InvalidHeader(format!("Invalid element count: {count}"))
                    })?;
                    elements.push(ElementSchema {
                        name: name.to_string(),
                        count,
                        properties: Vec::new(),
                    });
                }
                "property" => {
                    let Some(element) = elements.last_mut() else {
                        warn!("Ignoring property declared before any element: {line}");
                        continue;
                    };
                    let tokens: Vec<&str> = parts.collect();
                    let (kind, name) = match tokens.as_slice() {
                        ["list", count_type, item_type, name, ..] => (
                            PropertyKind::List {
                                count_type: ScalarType::parse(count_type)?,
                                item_type: ScalarType::parse(item_type)?,
                            },
                            *name,
                        ),
                        ["list", ..] => {
                            return Err(Error::InvalidHeader(
                                "Invalid list property line".to_string(),
                            ))
                        }
                        [data_type, name, ..] => {
                            (PropertyKind::Scalar(ScalarType::parse(data_type)?), *name)
                        }
                        _ => {
                            return Err(Error::InvalidHeader("Invalid property line".to_string()))
                        }
                    };

                    let mut field = Field::resolve(&element.name, name, &kind);
                    if field == Field::VertexIndices && element.has_field(Field::VertexIndices) {
                        warn!("Ignoring additional face index list '{name}'");
                        field = Field::Other;
                    }
                    if field == Field::Other {
                        debug!("Property '{name}' of element '{}' is not used", element.name);
                    }

                    declared.normals |= field.is_normal();
                    declared.colors |= field.is_color();
                    declared.tex_coords |= field.is_tex_coord();

                    element.properties.push(PropertyDescriptor {
                        name: name.to_string(),
                        kind,
                        ordinal: element.properties.len(),
                        field,
                    });
                }
                "end_header" => {
                    saw_end = true;
                    break;
                }
                _ => debug!("Ignoring unknown header line: {line}"),
            }
        }

        if !saw_end {
            return Err(Error::InvalidHeader("No end_header found".to_string()));
        }

        let format = format.unwrap_or_else(|| {
            warn!("PLY header has no format line, assuming ascii");
            PlyFormat::Ascii
        });

        let header = PlyHeader {
            format,
            version,
            elements,
            comments,
            obj_info,
            declared,
        };

        if header.face_count() > 0 && header.face_indices().is_none() {
            return Err(Error::MissingFaceIndices);
        }

        Ok(header)
    }

    /// Get element definition by name
    pub fn get_element(&self, name: &str) -> Option<&ElementSchema> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn vertex_count(&self) -> usize {
        self.get_element("vertex").map_or(0, |e| e.count)
    }

    pub fn face_count(&self) -> usize {
        self.get_element("face").map_or(0, |e| e.count)
    }

    /// Ordered vertex property list.
    pub fn vertex_properties(&self) -> &[PropertyDescriptor] {
        self.get_element("vertex")
            .map_or(&[], |e| e.properties.as_slice())
    }

    /// The face index list property, if one was declared.
    pub fn face_indices(&self) -> Option<&PropertyDescriptor> {
        self.get_element("face")?
            .properties
            .iter()
            .find(|p| p.field == Field::VertexIndices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn parse(text: &str) -> Result<PlyHeader, Error> {
        PlyHeader::parse(&mut BufReader::new(Cursor::new(text)))
    }

    #[test]
    fn test_parse_simple_header() {
        let header = parse(
            r#"ply
format ascii 1.0
comment A simple PLY file
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
"#,
        )
        .unwrap();

        assert_eq!(header.format, PlyFormat::Ascii);
        assert_eq!(header.version, "1.0");
        assert_eq!(header.elements.len(), 2);
        assert_eq!(header.comments, vec!["A simple PLY file".to_string()]);
        assert_eq!(header.vertex_count(), 3);
        assert_eq!(header.face_count(), 1);

        let fields: Vec<Field> = header.vertex_properties().iter().map(|p| p.field).collect();
        assert_eq!(
            fields,
            vec![Field::PositionX, Field::PositionY, Field::PositionZ]
        );

        let indices = header.face_indices().unwrap();
        assert_eq!(
            indices.kind,
            PropertyKind::List {
                count_type: ScalarType::UChar,
                item_type: ScalarType::Int
            }
        );
        assert_eq!(header.declared, Attributes::default());
    }

    #[test]
    fn test_header_leaves_reader_after_end_header() {
        let data = b"ply\r\nformat binary_little_endian 1.0\r\nelement vertex 0\r\nend_header\r\n\x01\x02";
        let mut reader = BufReader::new(Cursor::new(&data[..]));
        let header = PlyHeader::parse(&mut reader).unwrap();
        assert_eq!(header.format, PlyFormat::BinaryLittleEndian);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![1, 2]);
    }

    #[test]
    fn test_declared_attributes_and_ordinals() {
        let header = parse(
            r#"ply
format binary_big_endian 1.0
element vertex 1
property double x
property double y
property double z
property float nx
property float ny
property float nz
property uchar red
property uchar green
property uchar blue
property uchar alpha
property float texture_u
property float texture_v
property int confidence
end_header
"#,
        )
        .unwrap();

        assert_eq!(header.format.endianness(), Some(Endianness::Big));
        assert!(header.declared.normals);
        assert!(header.declared.colors);
        assert!(header.declared.tex_coords);

        let props = header.vertex_properties();
        assert_eq!(props.len(), 13);
        for (i, prop) in props.iter().enumerate() {
            assert_eq!(prop.ordinal, i);
        }
        assert_eq!(props[9].field, Field::Alpha);
        assert_eq!(props[10].field, Field::TexU);
        assert_eq!(props[12].field, Field::Other);
        assert_eq!(props[12].kind, PropertyKind::Scalar(ScalarType::Int));
    }

    #[test]
    fn test_alpha_alone_declares_colors() {
        let header = parse(
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty uchar alpha\nend_header\n",
        )
        .unwrap();
        assert!(header.declared.colors);
        assert!(!header.declared.normals);
    }

    #[test]
    fn test_unsupported_format() {
        let err = parse("ply\nformat binary_middle_endian 1.0\nend_header\n").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(f) if f == "binary_middle_endian"));
    }

    #[test]
    fn test_missing_end_header() {
        let err = parse("ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn test_face_without_index_list() {
        let err = parse(
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nelement face 1\nproperty list uchar int corners\nend_header\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingFaceIndices));
    }

    #[test]
    fn test_empty_face_element_needs_no_index_list() {
        let header = parse(
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nelement face 0\nend_header\n",
        )
        .unwrap();
        assert_eq!(header.face_count(), 0);
        assert!(header.face_indices().is_none());
    }

    #[test]
    fn test_vertex_index_alias_and_duplicates() {
        let header = parse(
            r#"ply
format ascii 1.0
element face 2
property uchar flags
property list ushort uint vertex_index
property list uchar int vertex_indices
end_header
"#,
        )
        .unwrap();

        let face = header.get_element("face").unwrap();
        let fields: Vec<Field> = face.properties.iter().map(|p| p.field).collect();
        assert_eq!(fields, vec![Field::Other, Field::VertexIndices, Field::Other]);
        assert_eq!(header.face_indices().unwrap().name, "vertex_index");
    }

    #[test]
    fn test_tolerated_header_lines() {
        let header = parse(
            r#"ply

format ascii 1.0
obj_info scanned by something
element vertex 1
property float x
frobnicate 12
comment trailing comment
end_header
"#,
        )
        .unwrap();
        assert_eq!(header.obj_info, vec!["scanned by something".to_string()]);
        assert_eq!(header.comments.len(), 1);
        assert_eq!(header.vertex_properties().len(), 1);
    }

    #[test]
    fn test_comment_prefix_and_encoding() {
        let header = parse("ply\nformat ascii 1.0\ncomment:exported\nelement vertex 0\nend_header\n")
            .unwrap();
        assert_eq!(header.comments, vec![":exported".to_string()]);

        let mut data = b"ply\nformat ascii 1.0\ncomment \xc9\xa8\xc3\xe8\nobj_info \xff\n".to_vec();
        data.extend_from_slice(b"element vertex 0\nend_header\n");
        let header = PlyHeader::parse(&mut Cursor::new(data)).unwrap();
        assert_eq!(header.comments.len(), 1);
        assert_eq!(header.obj_info, vec!["\u{fffd}".to_string()]);

        let data = b"ply\nformat ascii 1.0\nelement vert\xe9x 0\nend_header\n".to_vec();
        assert!(matches!(
            PlyHeader::parse(&mut Cursor::new(data)).unwrap_err(),
            Error::InvalidHeader(_)
        ));
    }

    #[test]
    fn test_missing_format_defaults_to_ascii() {
        let header = parse("ply\nelement vertex 0\nend_header\n").unwrap();
        assert_eq!(header.format, PlyFormat::Ascii);
    }

    #[test]
    fn test_invalid_lines() {
        assert!(matches!(
            parse("ply\nformat ascii 1.0\nelement vertex many\nend_header\n").unwrap_err(),
            Error::InvalidHeader(_)
        ));
        assert!(matches!(
            parse("ply\nformat ascii 1.0\nelement vertex 1\nproperty quad x\nend_header\n")
                .unwrap_err(),
            Error::UnsupportedType(_)
        ));
        assert!(matches!(
            parse("ply\nformat ascii 1.0\nelement face 1\nproperty list uchar vertex_indices\nend_header\n")
                .unwrap_err(),
            Error::InvalidHeader(_)
        ));
    }

    #[test]
    fn test_scalar_type_parsing() {
        assert_eq!(ScalarType::parse("float").unwrap(), ScalarType::Float);
        assert_eq!(ScalarType::parse("float32").unwrap(), ScalarType::Float);
        assert_eq!(ScalarType::parse("double").unwrap(), ScalarType::Double);
        assert_eq!(ScalarType::parse("int").unwrap(), ScalarType::Int);
        assert_eq!(ScalarType::parse("uchar").unwrap(), ScalarType::UChar);
        assert_eq!("uint16".parse::<ScalarType>().unwrap(), ScalarType::UShort);

        assert_eq!(ScalarType::Char.size_bytes(), 1);
        assert_eq!(ScalarType::UShort.size_bytes(), 2);
        assert_eq!(ScalarType::Float.size_bytes(), 4);
        assert_eq!(ScalarType::Double.size_bytes(), 8);

        assert!(ScalarType::parse("invalid_type").is_err());
    }
}
