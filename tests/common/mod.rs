//! In-memory model for exercising the engine and session without an IFC file.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use ifc_params::error::QueryError;
use ifc_params::model::{PropertyMap, PropertyValue};
use ifc_params::query::{EntityId, ModelQuery};

#[derive(Debug, Clone, Default)]
pub struct FakeEntity {
    pub type_name: Option<String>,
    pub name: Option<String>,
    pub predefined_type: Option<String>,
    pub global_id: Option<String>,
    /// Sets answered by the primary lookup.
    pub psets: BTreeMap<String, PropertyMap>,
    /// Sets only the aggregate lookup sees.
    pub hidden_psets: BTreeMap<String, PropertyMap>,
    pub fail_primary: bool,
    pub fail_aggregate: bool,
    pub fail_name: bool,
}

impl FakeEntity {
    pub fn new(type_name: &str, name: &str, guid: &str) -> Self {
        Self {
            type_name: Some(type_name.to_string()),
            name: Some(name.to_string()),
            global_id: Some(guid.to_string()),
            ..Self::default()
        }
    }

    pub fn predefined(mut self, tag: &str) -> Self {
        self.predefined_type = Some(tag.to_string());
        self
    }

    pub fn pset(mut self, name: &str, props: &[(&str, PropertyValue)]) -> Self {
        self.psets.insert(name.to_string(), props_of(props));
        self
    }

    pub fn hidden_pset(mut self, name: &str, props: &[(&str, PropertyValue)]) -> Self {
        self.hidden_psets.insert(name.to_string(), props_of(props));
        self
    }

    pub fn failing_primary(mut self) -> Self {
        self.fail_primary = true;
        self
    }

    /// Every property-set lookup faults.
    pub fn failing_lookups(mut self) -> Self {
        self.fail_primary = true;
        self.fail_aggregate = true;
        self
    }

    pub fn failing_name(mut self) -> Self {
        self.fail_name = true;
        self
    }
}

fn props_of(props: &[(&str, PropertyValue)]) -> PropertyMap {
    props.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

/// Blocks `entities_of_type` until released, to keep an extraction in flight.
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    signal: Condvar,
}

impl Gate {
    pub fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.signal.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.signal.wait(open).unwrap();
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeModel {
    pub categories: HashMap<String, Vec<EntityId>>,
    pub entities: HashMap<EntityId, FakeEntity>,
    /// Categories whose listing faults.
    pub broken_categories: Vec<String>,
    /// Whether the aggregate lookup is offered.
    pub aggregate: bool,
    pub gates: HashMap<String, Arc<Gate>>,
    pub listings: AtomicUsize,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            aggregate: true,
            ..Self::default()
        }
    }

    /// Adds `entity` to `category` under the next free id.
    pub fn with(mut self, category: &str, entity: FakeEntity) -> Self {
        let id = EntityId(self.entities.len() as u64 + 1);
        self.entities.insert(id, entity);
        self.categories.entry(category.to_string()).or_default().push(id);
        self
    }

    /// Lists an already added entity a second time.
    pub fn with_repeat(mut self, category: &str, id: u64) -> Self {
        self.categories.entry(category.to_string()).or_default().push(EntityId(id));
        self
    }

    pub fn with_broken_category(mut self, category: &str) -> Self {
        self.broken_categories.push(category.to_string());
        self
    }

    pub fn with_gate(mut self, category: &str, gate: Arc<Gate>) -> Self {
        self.gates.insert(category.to_string(), gate);
        self
    }

    pub fn without_aggregate(mut self) -> Self {
        self.aggregate = false;
        self
    }

    fn entity(&self, id: EntityId) -> Result<&FakeEntity, QueryError> {
        self.entities.get(&id).ok_or(QueryError::UnknownEntity { id: id.0 })
    }
}

impl ModelQuery for FakeModel {
    fn entities_of_type(&self, category: &str) -> Result<Vec<EntityId>, QueryError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(category) {
            gate.wait();
        }
        if self.broken_categories.iter().any(|c| c == category) {
            return Err(QueryError::InvalidCategory {
                category: category.to_string(),
            });
        }
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    fn products(&self) -> Result<Vec<EntityId>, QueryError> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn type_name(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        Ok(self.entity(entity)?.type_name.clone())
    }

    fn name(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        let e = self.entity(entity)?;
        if e.fail_name {
            return Err(QueryError::Malformed {
                id: entity.0,
                message: "name attribute unreadable".to_string(),
            });
        }
        Ok(e.name.clone())
    }

    fn predefined_type(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        Ok(self.entity(entity)?.predefined_type.clone())
    }

    fn global_id(&self, entity: EntityId) -> Result<Option<String>, QueryError> {
        Ok(self.entity(entity)?.global_id.clone())
    }

    fn property_set(&self, entity: EntityId, pset: &str) -> Result<Option<PropertyMap>, QueryError> {
        let e = self.entity(entity)?;
        if e.fail_primary {
            return Err(QueryError::DanglingReference { from: entity.0, to: 999 });
        }
        Ok(e.psets.get(pset).cloned())
    }

    fn all_property_sets(&self, entity: EntityId) -> Result<BTreeMap<String, PropertyMap>, QueryError> {
        if !self.aggregate {
            return Err(QueryError::Unsupported {
                lookup: "all property sets",
            });
        }
        let e = self.entity(entity)?;
        if e.fail_aggregate {
            return Err(QueryError::DanglingReference { from: entity.0, to: 999 });
        }
        let mut sets = e.psets.clone();
        sets.extend(e.hidden_psets.clone());
        Ok(sets)
    }
}

pub fn text(value: &str) -> PropertyValue {
    PropertyValue::from(value)
}

/// Scenario model: two walls sharing `Pset_WallCommon`, with differing properties.
pub fn walls() -> FakeModel {
    FakeModel::new()
        .with(
            "IfcWall",
            FakeEntity::new("IfcWall", "Wall-A:1201", "2O2Fr$t4X7Zf8NOew3FLOH")
                .predefined("STANDARD")
                .pset(
                    "Pset_WallCommon",
                    &[("FireRating", text("REI60")), ("IsExternal", PropertyValue::Boolean(true))],
                ),
        )
        .with(
            "IfcWall",
            FakeEntity::new("IfcWall", "Wall-B", "1kTvXnbbzCWw8lcMd1dR4o").pset(
                "Pset_WallCommon",
                &[("LoadBearing", PropertyValue::Boolean(false)), ("FireRating", text(""))],
            ),
        )
}

/// A test IFC file with walls, a door and their property sets.
pub const IFC_MODEL: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('building.ifc','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#10=IFCWALL('0wall000000000000000001',$,'Basic Wall:Generic 200mm:1234',$,$,$,$,$,.STANDARD.);
#11=IFCWALLSTANDARDCASE('0wall000000000000000002',$,'Basic Wall:Exterior',$,$,$,$,$,$);
#12=IFCDOOR('0door000000000000000001',$,'Door',$,$,$,$,$,2100.,900.,.DOOR.,$,$);
#13=IFCWINDOW('0wind000000000000000001',$,$,$,$,$,$,$,1200.,900.,$,$,$);
#20=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('REI60'),$);
#21=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.F.),$);
#22=IFCPROPERTYSET('0pset000000000000000001',$,'Pset_WallCommon',$,(#20,#21));
#23=IFCRELDEFINESBYPROPERTIES('0rel0000000000000000001',$,$,$,(#10),#22);
#30=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#31=IFCPROPERTYSINGLEVALUE('LoadBearing',$,IFCBOOLEAN(.T.),$);
#32=IFCPROPERTYSET('0pset000000000000000002',$,'Pset_WallCommon',$,(#30,#31));
#33=IFCWALLTYPE('0type000000000000000001',$,'Exterior',$,$,(#32),$,$,$,.STANDARD.);
#34=IFCRELDEFINESBYTYPE('0rel0000000000000000002',$,$,$,(#10,#11),#33);
#40=IFCQUANTITYLENGTH('Width',$,$,0.2,$);
#41=IFCELEMENTQUANTITY('0qto0000000000000000001',$,'Qto_WallBaseQuantities',$,$,(#40));
#42=IFCRELDEFINESBYPROPERTIES('0rel0000000000000000003',$,$,$,(#11),(#41));
#50=IFCPROPERTYSINGLEVALUE('FireExit',$,IFCBOOLEAN(.T.),$);
#51=IFCPROPERTYSET('0pset000000000000000003',$,'Pset_DoorCommon',$,(#50));
#52=IFCRELDEFINESBYPROPERTIES('0rel0000000000000000004',$,$,$,(#12),#51);
ENDSEC;
END-ISO-10303-21;
";
