pub mod ifc;
pub mod schema;
pub mod step;

pub use crate::error::ParseError;
pub use ifc::{build_model, load_ifc_file};
pub use step::{StepEntity, StepFile, StepValue};
