//! Parameter extraction: one property set across every element of a category,
//! normalized into a [`ParameterTable`].

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

use crate::error::{ExtractError, QueryError};
use crate::model::table::{EMPTY, UNNAMED};
use crate::model::{ParameterRow, ParameterTable, PropertyMap};
use crate::query::{EntityId, LookupStrategy, ModelQuery};

/// Trailing element id some authoring tools append to names: `Door:1234`, `Beam#77`.
static NAME_ID_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:#]\d+$").expect("name suffix pattern is valid"));

/// Outcome of the lookup chain for one entity.
#[derive(Debug, Clone)]
enum Lookup {
    Found(PropertyMap),
    Missing,
    Fault(QueryError),
}

/// Builds parameter tables from a [`ModelQuery`].
#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    strategies: Vec<LookupStrategy>,
    strip_name_ids: bool,
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self {
            strategies: LookupStrategy::CHAIN.to_vec(),
            strip_name_ids: true,
        }
    }
}

impl ParameterExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the property-set lookup chain. Strategies run in the given order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<LookupStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Whether `:1234` / `#1234` suffixes are removed from element names.
    #[must_use]
    pub fn with_name_id_stripping(mut self, strip: bool) -> Self {
        self.strip_name_ids = strip;
        self
    }

    /// Extracts `pset` for every entity of `category`.
    ///
    /// Only a failure to list the category aborts; per-entity faults become
    /// error rows at the entity's position.
    pub fn extract<Q: ModelQuery + ?Sized>(
        &self,
        model: &Q,
        category: &str,
        pset: &str,
    ) -> Result<ParameterTable, ExtractError> {
        self.run(model, category, pset, None)
    }

    /// Like [`extract`](Self::extract), but gives up with [`ExtractError::Cancelled`]
    /// once `cancel` fires. The token is checked between entities.
    pub fn extract_with_cancel<Q: ModelQuery + ?Sized>(
        &self,
        model: &Q,
        category: &str,
        pset: &str,
        cancel: &CancellationToken,
    ) -> Result<ParameterTable, ExtractError> {
        self.run(model, category, pset, Some(cancel))
    }

    fn run<Q: ModelQuery + ?Sized>(
        &self,
        model: &Q,
        category: &str,
        pset: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<ParameterTable, ExtractError> {
        let listed = model
            .entities_of_type(category)
            .map_err(|source| ExtractError::Listing {
                category: category.to_string(),
                source,
            })?;

        let mut seen = HashSet::with_capacity(listed.len());
        let entities: Vec<EntityId> = listed.into_iter().filter(|e| seen.insert(*e)).collect();
        if entities.is_empty() {
            tracing::info!(category, pset, "no elements in category");
            return Ok(ParameterTable::default());
        }

        let cancelled = || ExtractError::Cancelled {
            category: category.to_string(),
            pset: pset.to_string(),
        };

        let mut names = BTreeSet::new();
        let mut lookups = Vec::with_capacity(entities.len());
        for &entity in &entities {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(cancelled());
            }
            let lookup = self.lookup(model, entity, pset);
            if let Lookup::Found(props) = &lookup {
                names.extend(props.keys().cloned());
            }
            lookups.push(lookup);
        }
        let parameter_names: Vec<String> = names.into_iter().collect();

        let mut rows = Vec::with_capacity(entities.len());
        for (position, (&entity, lookup)) in entities.iter().zip(&lookups).enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(cancelled());
            }
            let index = position + 1;
            let row = self
                .build_row(model, entity, index, pset, lookup, &parameter_names)
                .unwrap_or_else(|error| {
                    tracing::warn!(%entity, index, category, pset, %error, "element extraction failed");
                    ParameterRow::error(index, pset, parameter_names.len(), error.to_string())
                });
            rows.push(row);
        }

        let table = ParameterTable { parameter_names, rows };
        tracing::info!(
            category,
            pset,
            rows = table.rows.len(),
            parameters = table.parameter_names.len(),
            errors = table.error_count(),
            "extracted parameters"
        );
        Ok(table)
    }

    /// Runs the strategy chain; the first non-empty property set wins.
    ///
    /// The entity counts as faulted only when no strategy answered cleanly and at
    /// least one raised an error.
    fn lookup<Q: ModelQuery + ?Sized>(&self, model: &Q, entity: EntityId, pset: &str) -> Lookup {
        let mut answered = false;
        let mut fault = None;

        for &strategy in &self.strategies {
            match strategy.lookup(model, entity, pset) {
                Ok(Some(props)) if !props.is_empty() => return Lookup::Found(props),
                Ok(_) => answered = true,
                Err(QueryError::Unsupported { .. }) => {}
                Err(error) => {
                    tracing::debug!(%entity, pset, %strategy, %error, "property-set lookup failed");
                    fault = Some(error);
                }
            }
        }

        match fault {
            Some(error) if !answered => Lookup::Fault(error),
            _ => Lookup::Missing,
        }
    }

    fn build_row<Q: ModelQuery + ?Sized>(
        &self,
        model: &Q,
        entity: EntityId,
        index: usize,
        pset: &str,
        lookup: &Lookup,
        parameter_names: &[String],
    ) -> Result<ParameterRow, QueryError> {
        let props = match lookup {
            Lookup::Found(props) => Some(props),
            Lookup::Missing => None,
            Lookup::Fault(error) => return Err(error.clone()),
        };

        let category = or_sentinel(model.type_name(entity)?, EMPTY);
        let predefined_type = or_sentinel(model.predefined_type(entity)?, EMPTY);
        let name = model
            .name(entity)?
            .map(|n| self.clean_name(&n))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED.to_string());
        let global_id = or_sentinel(model.global_id(entity)?, EMPTY);

        let values = parameter_names
            .iter()
            .map(|param| {
                props
                    .and_then(|p| p.get(param))
                    .filter(|v| !v.is_empty())
                    .map_or_else(|| EMPTY.to_string(), ToString::to_string)
            })
            .collect();

        Ok(ParameterRow {
            index,
            category,
            predefined_type,
            name,
            pset: pset.to_string(),
            values,
            global_id,
            fault: None,
        })
    }

    fn clean_name(&self, name: &str) -> String {
        if self.strip_name_ids {
            NAME_ID_SUFFIX.replace(name, "").trim().to_string()
        } else {
            name.trim().to_string()
        }
    }
}

fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

/// Extracts with the default lookup chain.
pub fn extract_parameters<Q: ModelQuery + ?Sized>(
    model: &Q,
    category: &str,
    pset: &str,
) -> Result<ParameterTable, ExtractError> {
    ParameterExtractor::default().extract(model, category, pset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_trailing_element_ids() {
        let extractor = ParameterExtractor::default();
        assert_eq!(extractor.clean_name("Basic Wall:Generic 200mm:348621"), "Basic Wall:Generic 200mm");
        assert_eq!(extractor.clean_name("Beam#77"), "Beam");
        assert_eq!(extractor.clean_name("Level 2"), "Level 2");
        assert_eq!(extractor.clean_name(":123"), "");
    }

    #[test]
    fn keeps_ids_when_stripping_is_off() {
        let extractor = ParameterExtractor::default().with_name_id_stripping(false);
        assert_eq!(extractor.clean_name(" Door:1234 "), "Door:1234");
    }

    #[test]
    fn blank_values_fall_back_to_sentinel() {
        assert_eq!(or_sentinel(None, EMPTY), "Empty");
        assert_eq!(or_sentinel(Some("  ".to_string()), EMPTY), "Empty");
        assert_eq!(or_sentinel(Some("NOTDEFINED".to_string()), EMPTY), "NOTDEFINED");
    }
}
