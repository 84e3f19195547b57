use serde::Serialize;

/// Rendered in place of an absent or empty value.
pub const EMPTY: &str = "Empty";
/// Rendered in every entity-derived cell of a row whose extraction faulted.
pub const ERROR: &str = "ERROR";
/// Display name of an entity without a name.
pub const UNNAMED: &str = "Unnamed";

/// Identity columns that precede the parameter columns.
pub const IDENTITY_HEADERS: [&str; 5] = ["No", "IfcCategory", "PredefinedType", "IfcElementName", "PsetName"];
/// Column that follows the parameter columns.
pub const GUID_HEADER: &str = "GUID";

/// One element of the requested category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRow {
    /// 1-based position in the category listing.
    pub index: usize,
    pub category: String,
    pub predefined_type: String,
    pub name: String,
    pub pset: String,
    /// One value per table parameter name, in the same order.
    pub values: Vec<String>,
    pub global_id: String,
    /// Description of the fault that turned this row into an error row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl ParameterRow {
    /// Row standing in for an element whose extraction faulted.
    #[must_use]
    pub fn error(index: usize, pset: &str, width: usize, fault: impl Into<String>) -> Self {
        Self {
            index,
            category: ERROR.to_string(),
            predefined_type: ERROR.to_string(),
            name: ERROR.to_string(),
            pset: pset.to_string(),
            values: vec![ERROR.to_string(); width],
            global_id: ERROR.to_string(),
            fault: Some(fault.into()),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.fault.is_some()
    }

    /// The fixed-width cell sequence: identity columns, values, GUID.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(IDENTITY_HEADERS.len() + self.values.len() + 1);
        cells.push(self.index.to_string());
        cells.push(self.category.clone());
        cells.push(self.predefined_type.clone());
        cells.push(self.name.clone());
        cells.push(self.pset.clone());
        cells.extend(self.values.iter().cloned());
        cells.push(self.global_id.clone());
        cells
    }
}

/// Normalized view of one property set across every element of a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterTable {
    /// Union of the property names found, sorted.
    pub parameter_names: Vec<String>,
    pub rows: Vec<ParameterRow>,
}

impl ParameterTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells in every row.
    #[must_use]
    pub fn width(&self) -> usize {
        IDENTITY_HEADERS.len() + self.parameter_names.len() + 1
    }

    #[must_use]
    pub fn header(&self) -> Vec<String> {
        IDENTITY_HEADERS
            .iter()
            .map(ToString::to_string)
            .chain(self.parameter_names.iter().cloned())
            .chain(std::iter::once(GUID_HEADER.to_string()))
            .collect()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_error()).count()
    }
}
