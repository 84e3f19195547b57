use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::{PropertyMap, PropertyValue};
use crate::error::QueryError;
use crate::parser::schema;
use crate::parser::step::{StepEntity, StepFile, StepValue};
use crate::query::{EntityId, ModelQuery};

/// A loaded IFC model with the relationship indexes property lookups need.
///
/// Built by [`load_ifc_file`](crate::parser::load_ifc_file); never mutated afterwards.
#[derive(Debug)]
pub struct IfcModel {
    pub(crate) step: StepFile,
    pub(crate) file_path: PathBuf,
    pub(crate) file_size: u64,
    /// element → property definitions attached through a single-reference relationship
    pub(crate) occurrence_psets: HashMap<u64, Vec<u64>>,
    /// element → type object
    pub(crate) element_type: HashMap<u64, u64>,
    /// entity → `IFCRELDEFINESBYPROPERTIES` relationships that list it
    pub(crate) defined_by: HashMap<u64, Vec<u64>>,
}

/// Summary shown when a model is opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub file_name: String,
    pub file_size_mb: f64,
    pub schema: String,
    pub product_count: usize,
}

impl IfcModel {
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.step.schema
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[must_use]
    pub fn info(&self) -> ModelInfo {
        let file_name = self
            .file_path
            .file_name()
            .map_or_else(|| "-".to_string(), |n| n.to_string_lossy().to_string());

        ModelInfo {
            file_name,
            file_size_mb: self.file_size as f64 / (1024.0 * 1024.0),
            schema: self.step.schema.clone(),
            product_count: self.product_ids().len(),
        }
    }

    fn product_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .step
            .entity_types()
            .filter(|keyword| schema::is_product(keyword))
            .flat_map(|keyword| self.step.get_entities_by_type(keyword))
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn entity(&self, id: EntityId) -> Result<&StepEntity, QueryError> {
        self.step
            .get_entity(id.0)
            .ok_or(QueryError::UnknownEntity { id: id.0 })
    }

    fn resolve(&self, from: u64, to: u64) -> Result<&StepEntity, QueryError> {
        self.step
            .get_entity(to)
            .ok_or(QueryError::DanglingReference { from, to })
    }

    fn string_attribute(&self, id: EntityId, index: usize) -> Result<Option<String>, QueryError> {
        let entity = self.entity(id)?;
        Ok(entity
            .attribute(index)
            .and_then(StepValue::as_str)
            .map(ToString::to_string))
    }

    /// Reads an `IfcPropertySet` or `IfcElementQuantity`; other definitions yield `None`.
    fn read_definition(&self, from: u64, def_id: u64) -> Result<Option<(String, PropertyMap)>, QueryError> {
        let def = self.resolve(from, def_id)?;
        let members_slot = match def.entity_type.as_str() {
            "IFCPROPERTYSET" => 4,
            "IFCELEMENTQUANTITY" => 5,
            _ => return Ok(None),
        };

        let name = def
            .attribute(2)
            .and_then(StepValue::as_str)
            .ok_or_else(|| QueryError::Malformed {
                id: def.id,
                message: "property set without a name".to_string(),
            })?
            .to_string();

        let mut props = PropertyMap::new();
        for member in def.attribute(members_slot).map(StepValue::references).unwrap_or_default() {
            if let Some((prop_name, value)) = self.read_property(def.id, member)? {
                props.insert(prop_name, value);
            }
        }

        Ok(Some((name, props)))
    }

    fn read_property(&self, from: u64, prop_id: u64) -> Result<Option<(String, PropertyValue)>, QueryError> {
        let prop = self.resolve(from, prop_id)?;
        let value_slot = match prop.entity_type.as_str() {
            "IFCPROPERTYSINGLEVALUE" | "IFCPROPERTYENUMERATEDVALUE" | "IFCPROPERTYLISTVALUE" => 2,
            "IFCQUANTITYLENGTH" | "IFCQUANTITYAREA" | "IFCQUANTITYVOLUME" | "IFCQUANTITYCOUNT"
            | "IFCQUANTITYWEIGHT" | "IFCQUANTITYTIME" => 3,
            "IFCPROPERTYBOUNDEDVALUE" => return Ok(Some(read_bounded(prop)?)),
            _ => return Ok(None),
        };

        let name = property_name(prop)?;
        let value = prop
            .attribute(value_slot)
            .map_or(PropertyValue::Null, PropertyValue::from_step);
        Ok(Some((name, value)))
    }

    /// Property sets inherited from the entity's type object, in declaration order.
    fn type_definitions(&self, element: u64) -> Result<Vec<(u64, u64)>, QueryError> {
        let Some(&type_id) = self.element_type.get(&element) else {
            return Ok(Vec::new());
        };
        let type_object = self.resolve(element, type_id)?;
        Ok(type_object
            .attribute(5)
            .map(StepValue::references)
            .unwrap_or_default()
            .into_iter()
            .map(|def| (type_id, def))
            .collect())
    }

    /// Merges every named definition in `defs` whose name equals `pset` (later wins).
    fn merge_named(&self, defs: &[(u64, u64)], pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        let mut merged: Option<PropertyMap> = None;
        for &(from, def) in defs {
            if let Some((name, props)) = self.read_definition(from, def)? {
                if name == pset {
                    merged.get_or_insert_with(PropertyMap::new).extend(props);
                }
            }
        }
        Ok(merged)
    }

    /// Definitions reachable through the entity's own `IFCRELDEFINESBYPROPERTIES`
    /// relationships, including the IFC4 set form of the relating definition.
    fn relationship_definitions(&self, element: u64) -> Result<Vec<(u64, u64)>, QueryError> {
        let mut defs = Vec::new();
        for &rel_id in self.defined_by.get(&element).map(Vec::as_slice).unwrap_or_default() {
            let rel = self.resolve(element, rel_id)?;
            if rel.entity_type == "IFCRELDEFINESBYPROPERTIES" {
                let relating = rel.attribute(5).map(StepValue::references).unwrap_or_default();
                defs.extend(relating.into_iter().map(|d| (rel_id, d)));
            }
        }
        Ok(defs)
    }
}

fn property_name(prop: &StepEntity) -> Result<String, QueryError> {
    prop.attribute(0)
        .and_then(StepValue::as_str)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| QueryError::Malformed {
            id: prop.id,
            message: "property without a name".to_string(),
        })
}

fn read_bounded(prop: &StepEntity) -> Result<(String, PropertyValue), QueryError> {
    let name = property_name(prop)?;
    let upper = prop.attribute(2).map_or(PropertyValue::Null, PropertyValue::from_step);
    let lower = prop.attribute(3).map_or(PropertyValue::Null, PropertyValue::from_step);

    let value = match (lower.is_empty(), upper.is_empty()) {
        (true, true) => PropertyValue::Null,
        (false, true) => PropertyValue::Text(format!(">= {lower}")),
        (true, false) => PropertyValue::Text(format!("<= {upper}")),
        (false, false) => PropertyValue::Text(format!("{lower} - {upper}")),
    };
    Ok((name, value))
}

impl ModelQuery for IfcModel {
    fn entities_of_type(&self, category: &str) -> Result<Vec<EntityId>, QueryError> {
        let keyword = schema::normalize_category(category)?;
        let mut ids: Vec<u64> = schema::expand_subtypes(&keyword)
            .iter()
            .flat_map(|k| self.step.get_entities_by_type(k))
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.into_iter().map(EntityId).collect())
    }

    fn products(&self) -> Result<Vec<EntityId>, QueryError> {
        Ok(self.product_ids().into_iter().map(EntityId).collect())
    }

    fn type_name(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        let e = self.entity(entity)?;
        Ok(Some(schema::display_name(&e.entity_type)))
    }

    fn name(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        self.string_attribute(entity, 2)
    }

    fn predefined_type(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        let e = self.entity(entity)?;
        let Some(slot) = schema::predefined_type_slot(&self.step.schema, &e.entity_type) else {
            return Ok(None);
        };
        Ok(match e.attribute(slot) {
            Some(StepValue::Enum(tag)) => Some(tag.clone()),
            _ => None,
        })
    }

    fn global_id(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        self.string_attribute(entity, 0)
    }

    fn property_set(&self, entity: EntityId, pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        self.entity(entity)?;
        let mut defs = self.type_definitions(entity.0)?;
        if let Some(own) = self.occurrence_psets.get(&entity.0) {
            defs.extend(own.iter().map(|&d| (entity.0, d)));
        }
        self.merge_named(&defs, pset)
    }

    fn defining_property_set(&self, entity: EntityId, pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        self.entity(entity)?;
        let mut defs = self.type_definitions(entity.0)?;
        defs.extend(self.relationship_definitions(entity.0)?);
        self.merge_named(&defs, pset)
    }

    fn indexed_property_set(&self, entity: EntityId, pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        self.entity(entity)?;
        let mut merged: Option<PropertyMap> = None;

        for rel in self.step.get_entities_by_type("IFCRELDEFINESBYPROPERTIES") {
            let related = rel.attribute(4).map(StepValue::references).unwrap_or_default();
            if !related.contains(&entity.0) {
                continue;
            }
            for def in rel.attribute(5).map(StepValue::references).unwrap_or_default() {
                // Broken definitions elsewhere in the model must not hide the ones that read.
                match self.read_definition(rel.id, def) {
                    Ok(Some((name, props))) if name == pset => {
                        merged.get_or_insert_with(PropertyMap::new).extend(props);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(rel = rel.id, error = %e, "skipping unreadable definition"),
                }
            }
        }

        Ok(merged)
    }

    fn all_property_sets(&self, entity: EntityId) -> Result<BTreeMap<String, PropertyMap>, QueryError> {
        self.entity(entity)?;
        let mut defs = self.type_definitions(entity.0)?;
        defs.extend(self.relationship_definitions(entity.0)?);

        let mut sets: BTreeMap<String, PropertyMap> = BTreeMap::new();
        for (from, def) in defs {
            if let Some((name, props)) = self.read_definition(from, def)? {
                sets.entry(name).or_default().extend(props);
            }
        }
        Ok(sets)
    }
}
