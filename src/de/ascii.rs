use std::io::{self, BufRead};

use log::warn;

use super::{apply_field, val_reader::ScalarValue, RecordDecoder};
use crate::{
    header::{Field, PropertyDescriptor, PropertyKind, ScalarType},
    mesh::Vertex,
    Error,
};

/// Decodes ASCII records, one element per line.
pub(crate) struct AsciiDecoder<R> {
    reader: R,
    buf: Vec<u8>,
    line: String,
}

impl<R: BufRead> AsciiDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: String::new(),
        }
    }

    /// Reads the next non-blank line and splits it into tokens. Bytes that
    /// are not UTF-8 become U+FFFD, so only the tokens holding them fail.
    fn next_record(&mut self) -> Result<Vec<&str>, Error> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            if !self.buf.trim_ascii().is_empty() {
                break;
            }
        }
        self.line.clear();
        self.line.push_str(&String::from_utf8_lossy(&self.buf));
        Ok(self.line.split_whitespace().collect())
    }
}

impl<R: BufRead> RecordDecoder for AsciiDecoder<R> {
    fn read_vertex(
        &mut self,
        index: usize,
        properties: &[PropertyDescriptor],
    ) -> Result<Vertex, Error> {
        let tokens = self.next_record()?;
        let mut vertex = Vertex::default();
        let mut column = 0;

        for prop in properties {
            let data_type = match prop.kind {
                PropertyKind::Scalar(data_type) => data_type,
                PropertyKind::List { .. } => {
                    match tokens.get(column).and_then(|t| t.parse::<usize>().ok()) {
                        Some(count) => column += 1 + count,
                        None => {
                            warn!("Vertex {index}: unreadable list '{}', ignoring rest of line", prop.name);
                            break;
                        }
                    }
                    continue;
                }
            };

            // Short lines leave the remaining fields at their defaults.
            let Some(token) = tokens.get(column) else {
                break;
            };
            column += 1;

            let parse_as = match prop.field {
                Field::Alpha | Field::VertexIndices | Field::Other => continue,
                field if field.is_color() && data_type.is_integer() => data_type,
                _ => ScalarType::Float,
            };

            match ScalarValue::parse(token, parse_as) {
                Ok(value) => apply_field(&mut vertex, prop.field, value),
                Err(e) => warn!("Vertex {index}: ignoring property '{}': {e}", prop.name),
            }
        }

        Ok(vertex)
    }

    fn read_face(
        &mut self,
        index: usize,
        properties: &[PropertyDescriptor],
        polygon: &mut Vec<i64>,
    ) -> Result<(), Error> {
        let tokens = self.next_record()?;
        let integer_at = |column: usize| -> Result<i64, Error> {
            let token = tokens.get(column).copied().unwrap_or_default();
            token.parse::<i64>().map_err(|_| Error::InvalidFace {
                face: index,
                token: token.to_string(),
            })
        };

        polygon.clear();
        let mut column = 0;
        for prop in properties {
            if let PropertyKind::Scalar(_) = prop.kind {
                column += 1;
                continue;
            }

            let count = usize::try_from(integer_at(column)?).unwrap_or(0);
            column += 1;
            if prop.field == Field::VertexIndices && count >= 3 {
                for i in 0..count {
                    polygon.push(integer_at(column + i)?);
                }
            }
            column += count;
        }

        Ok(())
    }
}
