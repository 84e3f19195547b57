//! The model-query seam the extraction engine is written against.
//!
//! [`IfcModel`](crate::model::IfcModel) implements it over a parsed IFC file; tests
//! implement it with in-memory fakes to inject faults.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::QueryError;
use crate::model::PropertyMap;

/// Handle of one entity inside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only queries over a loaded building model.
///
/// Every method may fault. For property-set lookups `Ok(None)` means "not found";
/// the fallback lookups default to [`QueryError::Unsupported`] so a model only
/// implements what it can answer.
pub trait ModelQuery: Send + Sync {
    /// Entities of `category` (subtypes included), in a stable model order.
    fn entities_of_type(&self, category: &str) -> Result<Vec<EntityId>, QueryError>;

    /// Every product entity of the model.
    fn products(&self) -> Result<Vec<EntityId>, QueryError> {
        Err(QueryError::Unsupported { lookup: "products" })
    }

    /// Concrete entity type, e.g. `IfcWallStandardCase`.
    fn type_name(&self, entity: EntityId) -> Result<Option<String>, QueryError>;

    fn name(&self, entity: EntityId) -> Result<Option<String>, QueryError>;

    fn predefined_type(&self, entity: EntityId) -> Result<Option<String>, QueryError>;

    fn global_id(&self, entity: EntityId) -> Result<Option<String>, QueryError>;

    /// Primary lookup of a named property set.
    fn property_set(&self, entity: EntityId, pset: &str) -> Result<Option<PropertyMap>, QueryError>;

    /// Lookup through the relationships that define this entity.
    fn defining_property_set(&self, _entity: EntityId, _pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        Err(QueryError::Unsupported {
            lookup: "defining relationships",
        })
    }

    /// Lookup by scanning the relationship index of the whole model.
    fn indexed_property_set(&self, _entity: EntityId, _pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        Err(QueryError::Unsupported {
            lookup: "relationship index",
        })
    }

    /// Every property set attached to the entity, keyed by set name.
    fn all_property_sets(&self, _entity: EntityId) -> Result<BTreeMap<String, PropertyMap>, QueryError> {
        Err(QueryError::Unsupported {
            lookup: "all property sets",
        })
    }
}

/// One way of finding a named property set for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    Primary,
    DefiningRelations,
    RelationshipIndex,
    AllPropertySets,
}

impl LookupStrategy {
    /// The full chain, cheapest first.
    pub const CHAIN: [LookupStrategy; 4] = [
        LookupStrategy::Primary,
        LookupStrategy::DefiningRelations,
        LookupStrategy::RelationshipIndex,
        LookupStrategy::AllPropertySets,
    ];

    pub fn lookup<Q: ModelQuery + ?Sized>(
        self,
        model: &Q,
        entity: EntityId,
        pset: &str,
    ) -> Result<Option<PropertyMap>, QueryError> {
        match self {
            LookupStrategy::Primary => model.property_set(entity, pset),
            LookupStrategy::DefiningRelations => model.defining_property_set(entity, pset),
            LookupStrategy::RelationshipIndex => model.indexed_property_set(entity, pset),
            LookupStrategy::AllPropertySets => {
                let wanted = pset.trim();
                Ok(model
                    .all_property_sets(entity)?
                    .into_iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
                    .map(|(_, props)| props))
            }
        }
    }
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupStrategy::Primary => "primary",
            LookupStrategy::DefiningRelations => "defining relationships",
            LookupStrategy::RelationshipIndex => "relationship index",
            LookupStrategy::AllPropertySets => "all property sets",
        };
        f.write_str(label)
    }
}
