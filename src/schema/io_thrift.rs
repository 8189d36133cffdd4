use parquet_format_safe::SchemaElement;

use super::types::ParquetType;
use crate::error::{Error, Result};
use crate::parquet_bridge::Repetition;
use crate::schema::types::{FieldInfo, PrimitiveType};

impl ParquetType {
    /// Method to convert to Thrift.
    pub(crate) fn to_thrift(&self) -> Vec<SchemaElement> {
        let mut elements: Vec<SchemaElement> = Vec::new();
        to_thrift_helper(self, &mut elements, true);
        elements
    }

    /// Method to convert from Thrift. The first element must be the root of
    /// the schema.
    pub(crate) fn try_from_thrift(elements: &[SchemaElement]) -> Result<ParquetType> {
        let mut index = 0;
        let root = from_thrift_helper(elements, &mut index, true)?;
        if index != elements.len() {
            return Err(Error::oos(
                "the schema elements contain fields not reachable from the root",
            ));
        }
        Ok(root)
    }
}

/// Constructs a list of `SchemaElement` from the schema using depth-first
/// traversal. The schema is assumed valid and to start with a group type.
fn to_thrift_helper(schema: &ParquetType, elements: &mut Vec<SchemaElement>, is_root: bool) {
    match schema {
        ParquetType::PrimitiveType(PrimitiveType {
            field_info,
            physical_type,
        }) => {
            let (type_, type_length) = (*physical_type).into();

            let element = SchemaElement {
                type_: Some(type_),
                type_length,
                repetition_type: Some(field_info.repetition.into()),
                name: field_info.name.clone(),
                num_children: None,
                converted_type: None,
                precision: None,
                scale: None,
                field_id: field_info.id,
                logical_type: None,
            };

            elements.push(element);
        },
        ParquetType::GroupType { field_info, fields } => {
            // the root of the schema carries no repetition
            let repetition_type = if is_root {
                None
            } else {
                Some(field_info.repetition)
            };

            let element = SchemaElement {
                type_: None,
                type_length: None,
                repetition_type: repetition_type.map(|x| x.into()),
                name: field_info.name.clone(),
                num_children: Some(fields.len() as i32),
                converted_type: None,
                precision: None,
                scale: None,
                field_id: field_info.id,
                logical_type: None,
            };

            elements.push(element);

            // Add child elements for a group
            for field in fields {
                to_thrift_helper(field, elements, false);
            }
        },
    }
}

/// Reads the next field (and, for groups, its children) from `elements`,
/// advancing `index` past everything consumed.
fn from_thrift_helper(
    elements: &[SchemaElement],
    index: &mut usize,
    is_root: bool,
) -> Result<ParquetType> {
    let element = elements
        .get(*index)
        .ok_or_else(|| Error::oos("the schema ended while a field was expected"))?;
    *index += 1;

    let repetition = match element.repetition_type {
        Some(repetition) => repetition.try_into()?,
        // only the root may omit its repetition
        None if is_root => Repetition::Required,
        None => {
            return Err(Error::oos(format!(
                "field \"{}\" has no repetition",
                element.name
            )))
        },
    };
    let field_info = FieldInfo {
        name: element.name.clone(),
        repetition,
        id: element.field_id,
    };

    match element.num_children {
        None | Some(0) => {
            let type_ = element
                .type_
                .ok_or_else(|| Error::oos(format!("leaf \"{}\" has no type", element.name)))?;
            let physical_type = (type_, element.type_length).try_into()?;
            Ok(ParquetType::PrimitiveType(PrimitiveType {
                field_info,
                physical_type,
            }))
        },
        Some(num_children) => {
            let fields = (0..num_children)
                .map(|_| from_thrift_helper(elements, index, false))
                .collect::<Result<Vec<_>>>()?;
            Ok(ParquetType::GroupType { field_info, fields })
        },
    }
}
