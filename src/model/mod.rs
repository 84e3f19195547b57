pub mod project;
pub mod property;
pub mod table;

pub use project::{IfcModel, ModelInfo};
pub use property::{PropertyMap, PropertyValue};
pub use table::{ParameterRow, ParameterTable};
