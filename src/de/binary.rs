use std::io::Read;

use super::{apply_field, val_reader::BinValReader, RecordDecoder, MAX_PREALLOCATION};
use crate::{
    header::{Endianness, Field, PropertyDescriptor, PropertyKind},
    mesh::Vertex,
    Error,
};

/// Decodes binary records. Properties are read strictly in declared order,
/// each consuming exactly the width of its declared type.
pub(crate) struct BinaryDecoder<R: Read> {
    reader: BinValReader<R>,
}

impl<R: Read> BinaryDecoder<R> {
    pub fn new(reader: R, file: Endianness, host: Endianness) -> Self {
        Self {
            reader: BinValReader::new(reader, file, host),
        }
    }

    /// Consumes a list value without keeping it.
    fn skip_list(&mut self, kind: PropertyKind) -> Result<(), Error> {
        if let PropertyKind::List {
            count_type,
            item_type,
        } = kind
        {
            let count = self.reader.read_integer(count_type)?;
            self.reader
                .skip(item_type, usize::try_from(count).unwrap_or(0))?;
        }
        Ok(())
    }
}

impl<R: Read> RecordDecoder for BinaryDecoder<R> {
    fn read_vertex(
        &mut self,
        _index: usize,
        properties: &[PropertyDescriptor],
    ) -> Result<Vertex, Error> {
        let mut vertex = Vertex::default();

        for prop in properties {
            match (prop.kind, prop.field) {
                (PropertyKind::List { .. }, _) => self.skip_list(prop.kind)?,
                (PropertyKind::Scalar(data_type), Field::Alpha | Field::Other) => {
                    self.reader.skip(data_type, 1)?
                }
                (PropertyKind::Scalar(data_type), field) => {
                    let value = self.reader.read_scalar(data_type)?;
                    apply_field(&mut vertex, field, value);
                }
            }
        }

        Ok(vertex)
    }

    fn read_face(
        &mut self,
        _index: usize,
        properties: &[PropertyDescriptor],
        polygon: &mut Vec<i64>,
    ) -> Result<(), Error> {
        polygon.clear();

        for prop in properties {
            let (count_type, item_type) = match prop.kind {
                PropertyKind::Scalar(data_type) => {
                    self.reader.skip(data_type, 1)?;
                    continue;
                }
                PropertyKind::List {
                    count_type,
                    item_type,
                } if prop.field == Field::VertexIndices => (count_type, item_type),
                PropertyKind::List { .. } => {
                    self.skip_list(prop.kind)?;
                    continue;
                }
            };

            let count = usize::try_from(self.reader.read_integer(count_type)?).unwrap_or(0);
            if count < 3 {
                // Degenerate, but its bytes still have to go.
                self.reader.skip(item_type, count)?;
                continue;
            }

            polygon.reserve(count.min(MAX_PREALLOCATION));
            for _ in 0..count {
                polygon.push(self.reader.read_integer(item_type)?);
            }
        }

        Ok(())
    }
}
