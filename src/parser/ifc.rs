use crate::error::ParseError;
use crate::model::IfcModel;
use crate::parser::step::{StepFile, StepValue};
use std::collections::HashMap;
use std::path::Path;

/// Parses an IFC file into a queryable model.
///
/// Supports both IFC2x3 and IFC4 schemas. Besides the STEP entities the model
/// indexes:
/// - element → property definitions (`IfcRelDefinesByProperties`)
/// - element → type object (`IfcRelDefinesByType`)
///
/// # Errors
///
/// Returns [`ParseError::FileRead`] if the file cannot be read.
/// Returns [`ParseError::InvalidStep`] if the STEP format is malformed.
///
/// # Example
///
/// ```no_run
/// use ifc_params::parser::load_ifc_file;
/// use ifc_params::query::ModelQuery;
///
/// let model = load_ifc_file("model.ifc")?;
/// let walls = model.entities_of_type("IfcWall").unwrap_or_default();
/// println!("{} walls in {}", walls.len(), model.schema());
/// # Ok::<(), ifc_params::error::ParseError>(())
/// ```
pub fn load_ifc_file<P: AsRef<Path>>(path: P) -> Result<IfcModel, ParseError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file_size = content.len() as u64;

    let step = StepFile::parse(&content)?;
    tracing::info!(
        path = %path.display(),
        schema = %step.schema,
        entities = step.entities.len(),
        "parsed IFC file"
    );

    Ok(build_model(step, path, file_size))
}

/// Builds the relationship indexes over an already parsed STEP file.
#[must_use]
pub fn build_model(step: StepFile, path: &Path, file_size: u64) -> IfcModel {
    let (occurrence_psets, defined_by) = extract_property_relationships(&step);
    let element_type = extract_type_relationships(&step);

    IfcModel {
        step,
        file_path: path.to_path_buf(),
        file_size,
        occurrence_psets,
        element_type,
        defined_by,
    }
}

/// Index 4 = RelatedObjects, index 5 = RelatingPropertyDefinition.
///
/// Returns the single-reference attachments and, separately, every relationship
/// each element takes part in.
fn extract_property_relationships(step: &StepFile) -> (HashMap<u64, Vec<u64>>, HashMap<u64, Vec<u64>>) {
    let mut occurrence_psets: HashMap<u64, Vec<u64>> = HashMap::new();
    let mut defined_by: HashMap<u64, Vec<u64>> = HashMap::new();

    for rel in step.get_entities_by_type("IFCRELDEFINESBYPROPERTIES") {
        let elements = rel.attribute(4).map(StepValue::references).unwrap_or_default();
        let single_definition = rel.attribute(5).and_then(StepValue::as_reference);

        for element in elements {
            defined_by.entry(element).or_default().push(rel.id);
            if let Some(def) = single_definition {
                occurrence_psets.entry(element).or_default().push(def);
            }
        }
    }

    (occurrence_psets, defined_by)
}

/// Index 4 = RelatedObjects, index 5 = RelatingType.
fn extract_type_relationships(step: &StepFile) -> HashMap<u64, u64> {
    let mut element_type = HashMap::new();

    for rel in step.get_entities_by_type("IFCRELDEFINESBYTYPE") {
        let Some(type_id) = rel.attribute(5).and_then(StepValue::as_reference) else {
            continue;
        };
        for element in rel.attribute(4).map(StepValue::references).unwrap_or_default() {
            element_type.insert(element, type_id);
        }
    }

    element_type
}
