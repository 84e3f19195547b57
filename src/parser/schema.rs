//! Slices of the IFC schema the loader needs without a full EXPRESS model:
//! entity-name casing, subtype groups, the product family and the position
//! of the `PredefinedType` attribute.

use crate::error::QueryError;

/// Product entities in schema casing (IFC2x3 and IFC4).
const PRODUCT_ENTITIES: &[&str] = &[
    // Spatial structure
    "IfcSite",
    "IfcBuilding",
    "IfcBuildingStorey",
    "IfcSpace",
    "IfcExternalSpatialElement",
    // Building elements
    "IfcWall",
    "IfcWallStandardCase",
    "IfcWallElementedCase",
    "IfcCurtainWall",
    "IfcSlab",
    "IfcSlabStandardCase",
    "IfcSlabElementedCase",
    "IfcRoof",
    "IfcBeam",
    "IfcBeamStandardCase",
    "IfcColumn",
    "IfcColumnStandardCase",
    "IfcMember",
    "IfcMemberStandardCase",
    "IfcPlate",
    "IfcPlateStandardCase",
    "IfcDoor",
    "IfcDoorStandardCase",
    "IfcWindow",
    "IfcWindowStandardCase",
    "IfcStair",
    "IfcStairFlight",
    "IfcRamp",
    "IfcRampFlight",
    "IfcRailing",
    "IfcCovering",
    "IfcFooting",
    "IfcPile",
    "IfcChimney",
    "IfcShadingDevice",
    "IfcBuildingElementProxy",
    "IfcBuildingElementPart",
    // Furnishing and fixtures
    "IfcFurnishingElement",
    "IfcFurniture",
    "IfcSystemFurnitureElement",
    "IfcFlowTerminal",
    "IfcFlowFixture",
    "IfcSanitaryTerminal",
    "IfcLightFixture",
    "IfcAirTerminal",
    "IfcElectricAppliance",
    "IfcOutlet",
    // Distribution
    "IfcFlowSegment",
    "IfcDuctSegment",
    "IfcPipeSegment",
    "IfcCableCarrierSegment",
    "IfcCableSegment",
    "IfcFlowFitting",
    "IfcDuctFitting",
    "IfcPipeFitting",
    "IfcFlowController",
    "IfcValve",
    "IfcDamper",
    "IfcSwitchingDevice",
    "IfcFlowMovingDevice",
    "IfcPump",
    "IfcFan",
    "IfcEnergyConversionDevice",
    "IfcBoiler",
    "IfcDistributionControlElement",
    "IfcSensor",
    "IfcDistributionPort",
    // Openings, assemblies and misc
    "IfcOpeningElement",
    "IfcOpeningStandardCase",
    "IfcElementAssembly",
    "IfcDiscreteAccessory",
    "IfcMechanicalFastener",
    "IfcReinforcingBar",
    "IfcReinforcingMesh",
    "IfcTransportElement",
    "IfcVirtualElement",
    "IfcGeographicElement",
    "IfcAnnotation",
    "IfcGrid",
    "IfcProxy",
];

/// Abstract or parent types and the concrete keywords a query for them includes.
const SUBTYPES: &[(&str, &[&str])] = &[
    ("IFCWALL", &["IFCWALLSTANDARDCASE", "IFCWALLELEMENTEDCASE"]),
    ("IFCSLAB", &["IFCSLABSTANDARDCASE", "IFCSLABELEMENTEDCASE"]),
    ("IFCBEAM", &["IFCBEAMSTANDARDCASE"]),
    ("IFCCOLUMN", &["IFCCOLUMNSTANDARDCASE"]),
    ("IFCMEMBER", &["IFCMEMBERSTANDARDCASE"]),
    ("IFCPLATE", &["IFCPLATESTANDARDCASE"]),
    ("IFCDOOR", &["IFCDOORSTANDARDCASE"]),
    ("IFCWINDOW", &["IFCWINDOWSTANDARDCASE"]),
    ("IFCOPENINGELEMENT", &["IFCOPENINGSTANDARDCASE"]),
    ("IFCFURNISHINGELEMENT", &["IFCFURNITURE", "IFCSYSTEMFURNITUREELEMENT"]),
    (
        "IFCFLOWTERMINAL",
        &["IFCSANITARYTERMINAL", "IFCLIGHTFIXTURE", "IFCAIRTERMINAL", "IFCELECTRICAPPLIANCE", "IFCOUTLET"],
    ),
    ("IFCFLOWSEGMENT", &["IFCDUCTSEGMENT", "IFCPIPESEGMENT", "IFCCABLECARRIERSEGMENT", "IFCCABLESEGMENT"]),
    ("IFCFLOWFITTING", &["IFCDUCTFITTING", "IFCPIPEFITTING"]),
    ("IFCFLOWCONTROLLER", &["IFCVALVE", "IFCDAMPER", "IFCSWITCHINGDEVICE"]),
    ("IFCFLOWMOVINGDEVICE", &["IFCPUMP", "IFCFAN"]),
];

/// `PredefinedType` positions for IFC4 (and later) entities.
const IFC4_PREDEFINED_SLOTS: &[(&str, usize)] = &[
    ("IFCWALL", 8),
    ("IFCWALLSTANDARDCASE", 8),
    ("IFCWALLELEMENTEDCASE", 8),
    ("IFCCURTAINWALL", 8),
    ("IFCSLAB", 8),
    ("IFCSLABSTANDARDCASE", 8),
    ("IFCSLABELEMENTEDCASE", 8),
    ("IFCROOF", 8),
    ("IFCBEAM", 8),
    ("IFCBEAMSTANDARDCASE", 8),
    ("IFCCOLUMN", 8),
    ("IFCCOLUMNSTANDARDCASE", 8),
    ("IFCMEMBER", 8),
    ("IFCMEMBERSTANDARDCASE", 8),
    ("IFCPLATE", 8),
    ("IFCPLATESTANDARDCASE", 8),
    ("IFCDOOR", 10),
    ("IFCDOORSTANDARDCASE", 10),
    ("IFCWINDOW", 10),
    ("IFCWINDOWSTANDARDCASE", 10),
    ("IFCSTAIR", 8),
    ("IFCSTAIRFLIGHT", 12),
    ("IFCRAMP", 8),
    ("IFCRAMPFLIGHT", 8),
    ("IFCRAILING", 8),
    ("IFCCOVERING", 8),
    ("IFCFOOTING", 8),
    ("IFCPILE", 8),
    ("IFCCHIMNEY", 8),
    ("IFCSHADINGDEVICE", 8),
    ("IFCBUILDINGELEMENTPROXY", 8),
    ("IFCBUILDINGELEMENTPART", 8),
    ("IFCFURNITURE", 8),
    ("IFCSYSTEMFURNITUREELEMENT", 8),
    ("IFCSANITARYTERMINAL", 8),
    ("IFCLIGHTFIXTURE", 8),
    ("IFCAIRTERMINAL", 8),
    ("IFCELECTRICAPPLIANCE", 8),
    ("IFCOUTLET", 8),
    ("IFCDUCTSEGMENT", 8),
    ("IFCPIPESEGMENT", 8),
    ("IFCDUCTFITTING", 8),
    ("IFCPIPEFITTING", 8),
    ("IFCVALVE", 8),
    ("IFCDAMPER", 8),
    ("IFCPUMP", 8),
    ("IFCFAN", 8),
    ("IFCSENSOR", 8),
    ("IFCOPENINGELEMENT", 8),
    ("IFCOPENINGSTANDARDCASE", 8),
    ("IFCELEMENTASSEMBLY", 9),
    ("IFCSPACE", 9),
];

/// IFC2x3 entities that already carried a predefined type (or its shape-type ancestor).
const IFC2X3_PREDEFINED_SLOTS: &[(&str, usize)] = &[
    ("IFCSLAB", 8),
    ("IFCROOF", 8),
    ("IFCSTAIR", 8),
    ("IFCRAMP", 8),
    ("IFCRAILING", 8),
    ("IFCCOVERING", 8),
    ("IFCFOOTING", 8),
    ("IFCPILE", 8),
];

/// Normalizes a user-facing category (`Wall`, `IfcWall`, `IFCWALL`) to its STEP keyword.
pub fn normalize_category(category: &str) -> Result<String, QueryError> {
    let trimmed = category.trim();
    let valid = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(QueryError::InvalidCategory {
            category: category.to_string(),
        });
    }

    let upper = trimmed.to_ascii_uppercase();
    if upper.starts_with("IFC") {
        Ok(upper)
    } else {
        Ok(format!("IFC{upper}"))
    }
}

/// Keywords a query for `keyword` must cover, the keyword itself first.
#[must_use]
pub fn expand_subtypes(keyword: &str) -> Vec<String> {
    let mut keywords = vec![keyword.to_string()];

    match keyword {
        "IFCPRODUCT" | "IFCELEMENT" => {
            keywords.extend(PRODUCT_ENTITIES.iter().map(|e| e.to_ascii_uppercase()));
        }
        _ => {
            if let Some((_, subs)) = SUBTYPES.iter().find(|(parent, _)| *parent == keyword) {
                keywords.extend(subs.iter().map(ToString::to_string));
            }
        }
    }

    keywords.dedup();
    keywords
}

#[must_use]
pub fn is_product(keyword: &str) -> bool {
    PRODUCT_ENTITIES.iter().any(|e| e.eq_ignore_ascii_case(keyword))
}

/// Schema casing for an upper-case STEP keyword, e.g. `IFCWALLSTANDARDCASE` → `IfcWallStandardCase`.
#[must_use]
pub fn display_name(keyword: &str) -> String {
    if let Some(known) = PRODUCT_ENTITIES.iter().find(|e| e.eq_ignore_ascii_case(keyword)) {
        return (*known).to_string();
    }

    match keyword.strip_prefix("IFC") {
        Some(rest) if !rest.is_empty() => {
            let mut chars = rest.chars();
            let first = chars.next().map(|c| c.to_ascii_uppercase());
            let tail: String = chars.map(|c| c.to_ascii_lowercase()).collect();
            format!("Ifc{}{tail}", first.unwrap_or_default())
        }
        _ => keyword.to_string(),
    }
}

/// Attribute index holding `PredefinedType` for `keyword` under `schema`, if any.
#[must_use]
pub fn predefined_type_slot(schema: &str, keyword: &str) -> Option<usize> {
    let table = if is_ifc2x3(schema) {
        IFC2X3_PREDEFINED_SLOTS
    } else {
        IFC4_PREDEFINED_SLOTS
    };

    table
        .iter()
        .find(|(entity, _)| *entity == keyword)
        .map(|(_, slot)| *slot)
}

fn is_ifc2x3(schema: &str) -> bool {
    schema.to_ascii_uppercase().starts_with("IFC2X")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_category_spellings() {
        assert_eq!(normalize_category("Wall").unwrap(), "IFCWALL");
        assert_eq!(normalize_category("IfcWall").unwrap(), "IFCWALL");
        assert_eq!(normalize_category(" IFCDOOR ").unwrap(), "IFCDOOR");
        assert!(normalize_category("").is_err());
        assert!(normalize_category("Wall; DROP").is_err());
    }

    #[test]
    fn expands_subtypes() {
        assert_eq!(
            expand_subtypes("IFCWALL"),
            vec!["IFCWALL", "IFCWALLSTANDARDCASE", "IFCWALLELEMENTEDCASE"]
        );
        assert_eq!(expand_subtypes("IFCSPACE"), vec!["IFCSPACE"]);
        assert!(expand_subtypes("IFCPRODUCT").contains(&"IFCDOOR".to_string()));
    }

    #[test]
    fn renders_schema_casing() {
        assert_eq!(display_name("IFCWALLSTANDARDCASE"), "IfcWallStandardCase");
        assert_eq!(display_name("IFCFOOBAR"), "IfcFoobar");
        assert_eq!(display_name("CUSTOM"), "CUSTOM");
    }

    #[test]
    fn predefined_slots_depend_on_schema() {
        assert_eq!(predefined_type_slot("IFC4", "IFCWALL"), Some(8));
        assert_eq!(predefined_type_slot("IFC4", "IFCDOOR"), Some(10));
        assert_eq!(predefined_type_slot("IFC2X3", "IFCWALL"), None);
        assert_eq!(predefined_type_slot("IFC2X3", "IFCSLAB"), Some(8));
        assert_eq!(predefined_type_slot("IFC2X3", "IFCBEAM"), None);
    }
}
