use parquet_format_safe::SchemaElement;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::column_descriptor::{ColumnDescriptor, Descriptor};
use crate::error::{Error, Result};
use crate::parquet_bridge::Repetition;
use crate::schema::types::ParquetType;

/// A schema descriptor: the named root group of fields, flattened into leaf
/// [`ColumnDescriptor`]s in depth-first order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<ParquetType>,
    // derived from `fields`
    leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    /// Creates new schema descriptor from its fields.
    pub fn new(name: String, fields: Vec<ParquetType>) -> Self {
        let mut leaves = vec![];
        for f in &fields {
            let mut path = vec![];
            build_tree(f, f, 0, 0, &mut leaves, &mut path);
        }

        Self {
            name,
            fields,
            leaves,
        }
    }

    /// The schema's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The [`ColumnDescriptor`] (leaves) of this schema.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    /// The number of leaf columns of this schema.
    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    /// The schemas' fields.
    pub fn fields(&self) -> &[ParquetType] {
        &self.fields
    }

    pub(crate) fn to_thrift(&self) -> Vec<SchemaElement> {
        ParquetType::from_group(
            self.name.clone(),
            Repetition::Required,
            self.fields.clone(),
            None,
        )
        .to_thrift()
    }

    /// Reconstructs the descriptor from the schema elements of a decoded
    /// footer.
    pub fn try_from_thrift(elements: &[SchemaElement]) -> Result<Self> {
        match ParquetType::try_from_thrift(elements)? {
            ParquetType::GroupType { field_info, fields } => {
                Ok(Self::new(field_info.name, fields))
            },
            _ => Err(Error::oos("the root of the schema must be a group type")),
        }
    }
}

fn build_tree<'a>(
    tree: &'a ParquetType,
    base_tree: &ParquetType,
    mut max_rep_level: i16,
    mut max_def_level: i16,
    leaves: &mut Vec<ColumnDescriptor>,
    path_so_far: &mut Vec<&'a str>,
) {
    path_so_far.push(tree.name());
    match tree.get_field_info().repetition {
        Repetition::Optional => {
            max_def_level += 1;
        },
        Repetition::Repeated => {
            max_def_level += 1;
            max_rep_level += 1;
        },
        Repetition::Required => {},
    }

    match tree {
        ParquetType::PrimitiveType(p) => {
            let path_in_schema = path_so_far.iter().map(|x| x.to_string()).collect::<Vec<_>>();
            leaves.push(ColumnDescriptor::new(
                Descriptor {
                    primitive_type: p.clone(),
                    max_def_level,
                    max_rep_level,
                },
                path_in_schema,
                base_tree.clone(),
            ));
        },
        ParquetType::GroupType { fields, .. } => {
            for f in fields {
                build_tree(
                    f,
                    base_tree,
                    max_rep_level,
                    max_def_level,
                    leaves,
                    path_so_far,
                );
                path_so_far.pop();
            }
        },
    }
}
