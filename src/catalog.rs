//! Browsing helpers: which categories a model has and which property sets a
//! category carries.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ExtractError, QueryError};
use crate::query::ModelQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Product categories with their entity counts, most populated first.
pub fn list_categories<Q: ModelQuery + ?Sized>(model: &Q) -> Result<Vec<CategoryCount>, QueryError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in model.products()? {
        match model.type_name(entity) {
            Ok(Some(name)) => *counts.entry(name).or_insert(0) += 1,
            Ok(None) => {}
            Err(error) => tracing::debug!(%entity, %error, "skipping product without a type"),
        }
    }

    let mut categories: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect();
    categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    tracing::debug!(categories = categories.len(), "listed product categories");
    Ok(categories)
}

/// Sorted, de-duplicated property-set names over every entity of `category`.
///
/// Entities whose property sets cannot be read are skipped.
pub fn list_property_sets<Q: ModelQuery + ?Sized>(model: &Q, category: &str) -> Result<Vec<String>, ExtractError> {
    let entities = model
        .entities_of_type(category)
        .map_err(|source| ExtractError::Listing {
            category: category.to_string(),
            source,
        })?;

    let mut names = BTreeSet::new();
    for entity in entities {
        match model.all_property_sets(entity) {
            Ok(sets) => names.extend(sets.into_keys()),
            Err(error) => tracing::debug!(%entity, category, %error, "skipping property sets of element"),
        }
    }

    tracing::debug!(category, psets = names.len(), "listed property sets");
    Ok(names.into_iter().collect())
}
