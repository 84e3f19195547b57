mod common;

use common::{text, walls, FakeEntity, FakeModel};
use ifc_params::engine::{extract_parameters, ParameterExtractor};
use ifc_params::error::ExtractError;
use ifc_params::model::table::{EMPTY, ERROR, UNNAMED};
use ifc_params::model::PropertyValue;
use ifc_params::query::LookupStrategy;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn three_walls_one_without_pset() -> FakeModel {
    let wall_common = |fire: &str, external: bool| {
        vec![("FireRating", text(fire)), ("IsExternal", PropertyValue::Boolean(external))]
    };
    FakeModel::new()
        .with(
            "Wall",
            FakeEntity::new("IfcWall", "W1", "guid-1").pset("Pset_WallCommon", &wall_common("REI60", true)),
        )
        .with(
            "Wall",
            FakeEntity::new("IfcWall", "W2", "guid-2").pset("Pset_WallCommon", &wall_common("REI30", false)),
        )
        .with("Wall", FakeEntity::new("IfcWall", "W3", "guid-3"))
}

#[test]
fn missing_pset_still_produces_a_row() {
    let table = extract_parameters(&three_walls_one_without_pset(), "Wall", "Pset_WallCommon").unwrap();

    assert_eq!(table.parameter_names, vec!["FireRating", "IsExternal"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].values, vec!["REI60", "True"]);
    assert_eq!(table.rows[1].values, vec!["REI30", "False"]);
    assert_eq!(table.rows[2].values, vec![EMPTY, EMPTY]);
    assert_eq!(table.rows[2].name, "W3");
    assert_eq!(table.rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn empty_category_gives_empty_table() {
    let table = extract_parameters(&walls(), "IfcSlab", "Pset_SlabCommon").unwrap();
    assert!(table.parameter_names.is_empty());
    assert!(table.rows.is_empty());
}

#[test]
fn pset_absent_everywhere_keeps_identity_rows() {
    let table = extract_parameters(&walls(), "IfcWall", "Pset_Nonexistent").unwrap();

    assert!(table.parameter_names.is_empty());
    assert_eq!(table.rows.len(), 2);
    for row in &table.rows {
        assert!(row.values.is_empty());
        assert_eq!(row.cells().len(), 6);
        assert_eq!(row.pset, "Pset_Nonexistent");
    }
}

#[test]
fn parameter_names_are_a_sorted_union() {
    let table = extract_parameters(&walls(), "IfcWall", "Pset_WallCommon").unwrap();
    assert_eq!(table.parameter_names, vec!["FireRating", "IsExternal", "LoadBearing"]);

    let again = extract_parameters(&walls(), "IfcWall", "Pset_WallCommon").unwrap();
    assert_eq!(table, again);
}

#[test]
fn every_row_has_the_header_width() {
    let table = extract_parameters(&walls(), "IfcWall", "Pset_WallCommon").unwrap();
    for row in &table.rows {
        assert_eq!(row.cells().len(), 5 + table.parameter_names.len() + 1);
        assert_eq!(row.cells().len(), table.header().len());
    }
}

#[test]
fn absent_and_blank_values_render_as_empty() {
    let table = extract_parameters(&walls(), "IfcWall", "Pset_WallCommon").unwrap();

    let first = &table.rows[0];
    assert_eq!(first.values, vec!["REI60", "True", EMPTY]);
    assert_eq!(first.predefined_type, "STANDARD");
    assert_eq!(first.name, "Wall-A");
    assert_eq!(first.global_id, "2O2Fr$t4X7Zf8NOew3FLOH");

    let second = &table.rows[1];
    assert_eq!(second.values, vec![EMPTY, EMPTY, "False"]);
    assert_eq!(second.predefined_type, EMPTY);
}

#[test]
fn faulting_element_becomes_one_error_row_in_place() {
    let model = FakeModel::new()
        .with(
            "IfcDoor",
            FakeEntity::new("IfcDoor", "D1", "g1").pset("Pset_DoorCommon", &[("FireExit", PropertyValue::Boolean(true))]),
        )
        .with("IfcDoor", FakeEntity::new("IfcDoor", "D2", "g2").failing_lookups())
        .with(
            "IfcDoor",
            FakeEntity::new("IfcDoor", "D3", "g3").pset("Pset_DoorCommon", &[("HandicapAccessible", PropertyValue::Boolean(false))]),
        );

    let table = extract_parameters(&model, "IfcDoor", "Pset_DoorCommon").unwrap();

    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.error_count(), 1);

    let broken = &table.rows[1];
    assert!(broken.is_error());
    assert_eq!(broken.index, 2);
    assert_eq!(broken.name, ERROR);
    assert_eq!(broken.pset, "Pset_DoorCommon");
    assert_eq!(broken.values, vec![ERROR, ERROR]);
    assert_eq!(broken.global_id, ERROR);
    assert!(broken.fault.as_deref().unwrap_or_default().contains("#2"));

    assert_eq!(table.rows[0].values, vec!["True", EMPTY]);
    assert_eq!(table.rows[2].values, vec![EMPTY, "False"]);
    assert!(!table.rows[0].is_error() && !table.rows[2].is_error());
}

#[test]
fn identity_fault_becomes_error_row() {
    let model = FakeModel::new()
        .with("IfcBeam", FakeEntity::new("IfcBeam", "B1", "g1"))
        .with("IfcBeam", FakeEntity::new("IfcBeam", "B2", "g2").failing_name());

    let table = extract_parameters(&model, "IfcBeam", "Pset_BeamCommon").unwrap();
    assert!(!table.rows[0].is_error());
    assert!(table.rows[1].is_error());
    assert_eq!(table.rows[1].category, ERROR);
}

#[test]
fn fallback_finds_sets_the_primary_lookup_misses() {
    let model = FakeModel::new().with(
        "IfcSlab",
        FakeEntity::new("IfcSlab", "Floor", "g1").hidden_pset("Pset_SlabCommon", &[("AcousticRating", text("B"))]),
    );

    let table = extract_parameters(&model, "IfcSlab", " pset_slabcommon ").unwrap();
    assert_eq!(table.parameter_names, vec!["AcousticRating"]);
    assert_eq!(table.rows[0].values, vec!["B"]);

    let primary_only = ParameterExtractor::default().with_strategies(vec![LookupStrategy::Primary]);
    let table = primary_only.extract(&model, "IfcSlab", "Pset_SlabCommon").unwrap();
    assert!(table.parameter_names.is_empty());
    assert!(!table.rows[0].is_error());
}

#[test]
fn unsupported_fallbacks_do_not_mask_a_fault() {
    let model = FakeModel::new()
        .without_aggregate()
        .with("IfcColumn", FakeEntity::new("IfcColumn", "C1", "g1").failing_primary());

    let table = extract_parameters(&model, "IfcColumn", "Pset_ColumnCommon").unwrap();
    assert!(table.rows[0].is_error());
}

#[test]
fn clean_answer_from_a_later_strategy_wins_over_fault() {
    let model = FakeModel::new().with(
        "IfcColumn",
        FakeEntity::new("IfcColumn", "C1", "g1").failing_primary(),
    );

    let table = extract_parameters(&model, "IfcColumn", "Pset_ColumnCommon").unwrap();
    assert!(!table.rows[0].is_error());
    assert_eq!(table.rows[0].name, "C1");
}

#[test]
fn listing_fault_aborts_the_extraction() {
    let model = walls().with_broken_category("IfcWall");
    let err = extract_parameters(&model, "IfcWall", "Pset_WallCommon").unwrap_err();
    assert!(matches!(err, ExtractError::Listing { ref category, .. } if category == "IfcWall"));
}

#[test]
fn repeated_entities_are_listed_once() {
    let model = walls().with_repeat("IfcWall", 1);
    let table = extract_parameters(&model, "IfcWall", "Pset_WallCommon").unwrap();
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn unnamed_and_suffixed_names() {
    let mut nameless = FakeEntity::new("IfcStair", "", "g1");
    nameless.name = None;
    let model = FakeModel::new()
        .with("IfcStair", nameless)
        .with("IfcStair", FakeEntity::new("IfcStair", "Stair:Main#4711", "g2"));

    let table = extract_parameters(&model, "IfcStair", "Pset_StairCommon").unwrap();
    assert_eq!(table.rows[0].name, UNNAMED);
    assert_eq!(table.rows[1].name, "Stair:Main");

    let raw = ParameterExtractor::default()
        .with_name_id_stripping(false)
        .extract(&model, "IfcStair", "Pset_StairCommon")
        .unwrap();
    assert_eq!(raw.rows[1].name, "Stair:Main#4711");
}

#[test]
fn cancelled_token_stops_the_extraction() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = ParameterExtractor::default()
        .extract_with_cancel(&walls(), "IfcWall", "Pset_WallCommon", &cancel)
        .unwrap_err();
    assert!(matches!(err, ExtractError::Cancelled { .. }));
}
