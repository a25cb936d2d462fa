//! Factory functions for creating test data.
//!
//! Provides IFC STEP text, fragments bundles and PLY bytes shaped like the
//! Duplex sample assets, used by tests and by the headless harness.

use std::fmt::Write as _;

use shared::*;

use crate::assets::MemoryAssetSource;
use crate::viewport::mesh::box_element;

pub const DUPLEX_IFC: &str = "/Duplex_A_20110907.ifc";
pub const DUPLEX_PLY: &str = "/Duplex_A_20110907.ply";
pub const DUPLEX_FRAG: &str = "/Duplex_A_20110907.frag";

// ── IFC ─────────────────────────────────────────────────────────

/// Small IFC2X3 file with extruded walls, a slab and reinforcement:
/// - walls 42 and 43, 2 x 0.3 x 3 boxes centered at (10, 0) and (10, 4)
/// - slab 7, an 8 x 10 x 0.3 plate below the walls
/// - reinforcing bar 99 and tendon anchor 120
/// - window 130 without a body representation
pub fn ifc_step_text() -> String {
    r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('Duplex_A_20110907.ifc','2011-09-07T12:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1= IFCPROJECT('0KTDBxRO59sBJDhY4WbJjB',$,'Duplex',$,$,$,$,$,$);
#10= IFCCARTESIANPOINT((0.,0.,0.));
#11= IFCDIRECTION((0.,0.,1.));
#12= IFCDIRECTION((1.,0.,0.));
#13= IFCAXIS2PLACEMENT3D(#10,#11,#12);
#20= IFCRECTANGLEPROFILEDEF(.AREA.,$,$,2.,0.3);
#21= IFCEXTRUDEDAREASOLID(#20,#13,#11,3.);
#22= IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#21));
#23= IFCPRODUCTDEFINITIONSHAPE($,$,(#22));
#30= IFCCARTESIANPOINT((10.,0.,0.));
#31= IFCAXIS2PLACEMENT3D(#30,#11,#12);
#32= IFCLOCALPLACEMENT($,#31);
#33= IFCCARTESIANPOINT((10.,4.,0.));
#34= IFCAXIS2PLACEMENT3D(#33,#11,#12);
#35= IFCLOCALPLACEMENT($,#34);
/* walls; two of them */
#42= IFCWALLSTANDARDCASE('2O2Fr$t4X7Zf8NOew3FLOH',$,'Basic Wall:Exterior',$,$,#32,#23,'186062');
#43= IFCWALLSTANDARDCASE('2O2Fr$t4X7Zf8NOew3FLKr',$,'Basic Wall:Interior',$,$,#35,#23,'186063');
#50= IFCRECTANGLEPROFILEDEF(.AREA.,$,$,8.,10.);
#51= IFCEXTRUDEDAREASOLID(#50,#13,#11,0.3);
#52= IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#51));
#53= IFCPRODUCTDEFINITIONSHAPE($,$,(#52));
#54= IFCCARTESIANPOINT((12.,2.,-0.3));
#55= IFCAXIS2PLACEMENT3D(#54,#11,#12);
#56= IFCLOCALPLACEMENT($,#55);
#7= IFCSLAB('1pPHnf7cXCpPsNEnQf4ZJ_',$,'Floor:Slab',$,$,#56,#53,'187450',.FLOOR.);
#60= IFCRECTANGLEPROFILEDEF(.AREA.,$,$,0.1,0.1);
#61= IFCEXTRUDEDAREASOLID(#60,#13,#11,2.);
#62= IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#61));
#63= IFCPRODUCTDEFINITIONSHAPE($,$,(#62));
#99= IFCREINFORCINGBAR('3cUkl32yn9qRSPvBJVyWYp',$,'Rebar',$,$,#32,#63,$,$,12.,113.1,2400.,.MAIN.,.PLAIN.);
#120= IFCTENDONANCHOR('0u4wgLe6n0ABVaiXyikbkA',$,'Anchor',$,$,#35,#63,$,$);
#130= IFCWINDOW('0LV8Pq3$HCuAhJkfHy5VAj',$,'Window;Fixed',$,$,#32,$,'190000',1.2,0.9);
ENDSEC;
END-ISO-10303-21;
"#
    .to_string()
}

// ── Fragments ───────────────────────────────────────────────────

/// Duplex-like model away from the origin:
/// - `F1` wall with element 42
/// - `F2` slab with element 7
/// - `F3` reinforcing bar with element 99
/// - `F4` covering that shares element 7 with the slab
pub fn fragments_model() -> LoadedModel {
    LoadedModel {
        name: "duplex".to_string(),
        schema: Some("IFC2X3".to_string()),
        fragments: vec![
            Fragment {
                id: "F1".to_string(),
                ifc_type: IfcType::new("IFCWALL"),
                elements: vec![box_element(42, [10.0, 0.0, 0.0], [12.0, 3.0, 0.3])],
            },
            Fragment {
                id: "F2".to_string(),
                ifc_type: IfcType::new("IFCSLAB"),
                elements: vec![box_element(7, [8.0, -0.3, -5.0], [16.0, 0.0, 5.0])],
            },
            Fragment {
                id: "F3".to_string(),
                ifc_type: IfcType::REINFORCING_BAR,
                elements: vec![box_element(99, [10.5, 0.5, 0.1], [10.6, 2.5, 0.2])],
            },
            Fragment {
                id: "F4".to_string(),
                ifc_type: IfcType::new("IFCCOVERING"),
                elements: vec![box_element(7, [8.0, -0.35, -5.0], [16.0, -0.3, 5.0])],
            },
        ],
        coordination_offset: [0.0; 3],
    }
}

/// [`fragments_model`] serialized as a bundle
pub fn fragments_json() -> Vec<u8> {
    serde_json::to_vec(&FragmentsBundle::new(vec![fragments_model()]))
        .expect("fixture serializes")
}

// ── PLY ─────────────────────────────────────────────────────────

/// ASCII PLY with one vertex per point. Colors are written when the first
/// point has them.
pub fn ply_ascii(points: &[([f32; 3], Option<[u8; 3]>)]) -> Vec<u8> {
    let colored = points.first().is_some_and(|(_, c)| c.is_some());
    let mut out = String::new();
    out.push_str("ply\nformat ascii 1.0\ncomment bimview fixture\n");
    let _ = writeln!(out, "element vertex {}", points.len());
    out.push_str("property float x\nproperty float y\nproperty float z\n");
    if colored {
        out.push_str("property uchar red\nproperty uchar green\nproperty uchar blue\n");
    }
    out.push_str("end_header\n");
    for (p, c) in points {
        let _ = write!(out, "{} {} {}", p[0], p[1], p[2]);
        if colored {
            let [r, g, b] = c.unwrap_or([0, 0, 0]);
            let _ = write!(out, " {r} {g} {b}");
        }
        out.push('\n');
    }
    out.into_bytes()
}

/// A handful of colored points around a corner of the building
pub fn duplex_ply() -> Vec<u8> {
    ply_ascii(&[
        ([0.0, 0.0, 0.0], Some([120, 110, 100])),
        ([1.0, 0.0, 0.0], Some([130, 120, 110])),
        ([0.0, 1.0, 0.0], Some([140, 130, 120])),
        ([0.0, 0.0, 3.0], Some([200, 200, 210])),
        ([1.0, 1.0, 3.0], Some([210, 210, 220])),
    ])
}

// ── Asset sources ───────────────────────────────────────────────

/// In-memory server with the IFC, fragments and PLY sample assets
pub fn duplex_assets() -> MemoryAssetSource {
    let mut source = MemoryAssetSource::new();
    source.insert(DUPLEX_IFC, ifc_step_text());
    source.insert(DUPLEX_FRAG, fragments_json());
    source.insert(DUPLEX_PLY, duplex_ply());
    source
}
