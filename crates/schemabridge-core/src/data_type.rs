//! Schema trees: simple fields and structs of fields

use crate::error::{ModelError, ModelResult};
use crate::named_type::NamedType;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a schema node. Only structs carry children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Simple,
    Struct(Vec<DataField>),
}

/// Fieldless view of [`Shape`], handy for matching two nodes against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    SimpleField,
    Struct,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::SimpleField => write!(f, "SimpleField"),
            DataKind::Struct => write!(f, "Struct"),
        }
    }
}

/// Root of a schema tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub named: NamedType,
    pub shape: Shape,
}

/// A [`DataType`] together with the field's name inside its parent struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub field_name: String,
    #[serde(flatten)]
    pub data: DataType,
}

impl DataType {
    pub fn simple(named: NamedType) -> Self {
        Self {
            named,
            shape: Shape::Simple,
        }
    }

    pub fn new_struct(named: NamedType, fields: Vec<DataField>) -> Self {
        Self {
            named,
            shape: Shape::Struct(fields),
        }
    }

    pub fn kind(&self) -> DataKind {
        match self.shape {
            Shape::Simple => DataKind::SimpleField,
            Shape::Struct(_) => DataKind::Struct,
        }
    }

    pub fn is_struct(&self) -> bool {
        self.kind() == DataKind::Struct
    }

    /// Children in declaration order. Empty for simple fields.
    pub fn fields(&self) -> &[DataField] {
        match &self.shape {
            Shape::Simple => &[],
            Shape::Struct(fields) => fields,
        }
    }

    /// Attach the backing built-in type.
    ///
    /// # Panics
    ///
    /// Panics on a struct-kind node. Use [`DataType::try_with_primitive`] when
    /// the kind is not known statically.
    pub fn with_primitive(self, primitive: impl Into<Type>) -> Self {
        match self.try_with_primitive(primitive) {
            Ok(data) => data,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_primitive(mut self, primitive: impl Into<Type>) -> ModelResult<Self> {
        let primitive = primitive.into();
        if self.is_struct() {
            return Err(ModelError::PrimitiveOnStruct {
                name: self.named.name,
                primitive: primitive.to_string(),
            });
        }
        self.named = self.named.with_primitive(primitive);
        Ok(self)
    }

    /// The same node with one more level of optionality.
    pub fn into_pointer(mut self) -> Self {
        self.named = self.named.pointer();
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.named.name = name.into();
        self
    }

    /// Remove the `pkg` module prefix from every type in the tree.
    ///
    /// Struct nodes also lose the `<pkg base>_` prefix from their synthesized
    /// names; simple field names are left alone.
    pub fn strip_local_package(&self, pkg: &str) -> DataType {
        match &self.shape {
            Shape::Simple => DataType::simple(self.named.strip_package(pkg)),
            Shape::Struct(fields) => DataType::new_struct(
                self.named.strip_package_and_name(pkg),
                fields
                    .iter()
                    .map(|field| DataField::from_data(&field.field_name, field.data.strip_local_package(pkg)))
                    .collect(),
            ),
        }
    }
}

impl DataField {
    /// A leaf field whose binding name equals the field name.
    pub fn simple(name: impl Into<String>, ty: impl Into<Type>) -> Self {
        let name = name.into();
        Self {
            data: DataType::simple(NamedType::new(name.clone(), ty)),
            field_name: name,
        }
    }

    pub fn new_struct(field_name: impl Into<String>, named: NamedType, fields: Vec<DataField>) -> Self {
        Self {
            field_name: field_name.into(),
            data: DataType::new_struct(named, fields),
        }
    }

    pub fn from_data(field_name: impl Into<String>, data: DataType) -> Self {
        Self {
            field_name: field_name.into(),
            data,
        }
    }

    /// See [`DataType::with_primitive`].
    pub fn with_primitive(self, primitive: impl Into<Type>) -> Self {
        Self {
            field_name: self.field_name,
            data: self.data.with_primitive(primitive),
        }
    }

    pub fn into_pointer(self) -> Self {
        Self {
            field_name: self.field_name,
            data: self.data.into_pointer(),
        }
    }

    pub fn named(&self) -> &NamedType {
        &self.data.named
    }

    pub fn kind(&self) -> DataKind {
        self.data.kind()
    }

    pub fn is_struct(&self) -> bool {
        self.data.is_struct()
    }

    pub fn fields(&self) -> &[DataField] {
        self.data.fields()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} Kind={} {} fields]",
            self.named,
            self.kind(),
            self.fields().len()
        )
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field_name, self.data)
    }
}

/// Comma-separated rendering of a field list, used in error messages.
pub fn describe_fields(fields: &[&DataField]) -> String {
    let parts: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
