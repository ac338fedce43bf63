//! Data model shared by the binder engine and its callers: typed elements,
//! raw input values, bound field values, field descriptors and record shapes.

pub mod container;
pub mod element;
pub mod error;
pub mod field;
pub mod record;
pub mod schema;
pub mod value;

pub use container::{Container, ContainerCatalog, ContainerCtor, CtorKind, ElementMap, ElementSet};
pub use element::{Element, ElementType};
pub use error::{BindError, ErrorKind};
pub use field::FieldValue;
pub use record::{DocumentRecord, Record, WriteRefused};
pub use schema::{
    ContainerKind, FieldDescriptor, FieldHandle, FieldKind, FieldSpec, RecordShape, ShapeSchema,
    Storage, TargetKind,
};
pub use value::{PrimitiveArray, Value};
