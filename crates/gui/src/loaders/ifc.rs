//! IFC STEP loader.
//!
//! Scans the DATA section with `ifc-lite-core`, tessellates every product that
//! carries a body representation with `ifc-lite-geometry` and groups the
//! resulting meshes into one fragment per IFC type. Openings are cut from
//! their host elements.

use std::collections::BTreeMap;
use std::sync::Arc;

use ifc_lite_core::{build_entity_index, has_geometry_by_name, EntityDecoder, EntityScanner};
use ifc_lite_geometry::{GeometryRouter, Mesh};
use rustc_hash::FxHashMap;
use shared::{AssetFormat, ElementGeometry, ExpressId, Fragment, IfcType, LoadedModel, LoaderSettings};

use super::{prepare_fragments, ModelLoader};
use crate::error::{LoadError, Result};

pub const STEP_MAGIC: &str = "ISO-10303-21;";

/// Products that only exist to be subtracted from their hosts
const VOID_TYPES: &[&str] = &["IFCOPENINGELEMENT", "IFCOPENINGSTANDARDCASE"];

#[derive(Debug, Clone, Copy, Default)]
pub struct IfcStepLoader;

/// Per-load counters, logged once the scan is done
#[derive(Debug, Default)]
struct ScanStats {
    entities: usize,
    excluded: usize,
    without_geometry: usize,
}

impl ModelLoader for IfcStepLoader {
    fn load(&self, bytes: &[u8], name: &str, settings: &LoaderSettings) -> Result<LoadedModel> {
        let content = String::from_utf8_lossy(bytes);
        let content = content.trim_start_matches('\u{feff}').trim_start();
        if !content.starts_with(STEP_MAGIC) {
            return Err(LoadError::format(AssetFormat::Ifc, "missing ISO-10303-21 header"));
        }
        if !content.contains("DATA;") {
            return Err(LoadError::format(AssetFormat::Ifc, "missing DATA section"));
        }

        let schema = file_schema(content);
        let index = Arc::new(build_entity_index(content));
        let mut decoder = EntityDecoder::with_arc_index(content, index);
        let router = GeometryRouter::with_units(content, &mut decoder);

        let mut stats = ScanStats::default();
        let mut products: Vec<(ExpressId, IfcType, usize, usize)> = Vec::new();
        let mut faceted_breps: Vec<u32> = Vec::new();
        let mut voids: FxHashMap<u32, Vec<u32>> = FxHashMap::default();

        let mut scanner = EntityScanner::new(content);
        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            stats.entities += 1;
            match type_name {
                "IFCFACETEDBREP" => faceted_breps.push(id),
                "IFCRELVOIDSELEMENT" => {
                    if let Ok(rel) = decoder.decode_at(start, end) {
                        if let (Some(host), Some(opening)) = (rel.get_ref(4), rel.get_ref(5)) {
                            voids.entry(host).or_default().push(opening);
                        }
                    }
                }
                _ => {}
            }

            if !has_geometry_by_name(type_name) || VOID_TYPES.contains(&type_name) {
                continue;
            }
            let ifc_type = IfcType::new(type_name);
            if settings.is_excluded(&ifc_type) {
                stats.excluded += 1;
                continue;
            }
            products.push((id, ifc_type, start, end));
        }

        if !faceted_breps.is_empty() {
            router.preprocess_faceted_breps(&faceted_breps, &mut decoder);
        }

        let mut by_type: BTreeMap<IfcType, Vec<ElementGeometry>> = BTreeMap::new();
        for (id, ifc_type, start, end) in products {
            let mesh = decoder
                .decode_at(start, end)
                .map_err(|e| e.to_string())
                .and_then(|entity| {
                    if !entity.get(6).is_some_and(|a| !a.is_null()) {
                        return Ok(Mesh::new());
                    }
                    router
                        .process_element_with_voids(&entity, &mut decoder, &voids)
                        .map_err(|e| e.to_string())
                });

            match mesh {
                Ok(mesh) if !mesh.is_empty() => {
                    by_type.entry(ifc_type).or_default().push(element_geometry(id, mesh));
                }
                Ok(_) => stats.without_geometry += 1,
                Err(e) => {
                    tracing::debug!("Skipping #{id} ({ifc_type}): {e}");
                    stats.without_geometry += 1;
                }
            }
        }

        let mut fragments: Vec<Fragment> = by_type
            .into_iter()
            .map(|(ifc_type, elements)| Fragment {
                id: format!("{}-{}", name, ifc_type.as_str().to_ascii_lowercase()),
                ifc_type,
                elements,
            })
            .collect();

        let offset = prepare_fragments(&mut fragments, name, settings, [0.0; 3]);

        tracing::debug!(
            "Tessellated IFC '{}': {} entities, {} fragments, {} excluded, {} without geometry",
            name,
            stats.entities,
            fragments.len(),
            stats.excluded,
            stats.without_geometry
        );

        Ok(LoadedModel {
            name: name.to_string(),
            schema,
            fragments,
            coordination_offset: offset,
        })
    }
}

/// Flat xyz positions into per-vertex triples
fn element_geometry(express_id: ExpressId, mesh: Mesh) -> ElementGeometry {
    ElementGeometry {
        express_id,
        positions: mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect(),
        indices: mesh.indices,
    }
}

/// First schema name in the `FILE_SCHEMA` header entry
fn file_schema(content: &str) -> Option<String> {
    let rest = &content[content.find("FILE_SCHEMA")?..];
    let start = rest.find('\'')? + 1;
    let len = rest[start..].find('\'')?;
    Some(rest[start..start + len].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::viewport::mesh::elements_bounds;

    fn load(settings: &LoaderSettings) -> LoadedModel {
        IfcStepLoader
            .load(fixtures::ifc_step_text().as_bytes(), "duplex", settings)
            .unwrap()
    }

    #[test]
    fn test_file_schema() {
        assert_eq!(file_schema("FILE_SCHEMA(('IFC4'));").as_deref(), Some("IFC4"));
        assert_eq!(file_schema("HEADER;ENDSEC;"), None);
    }

    #[test]
    fn test_load_tessellates_elements_by_type() {
        let model = load(&LoaderSettings::default());
        assert_eq!(model.schema.as_deref(), Some("IFC2X3"));

        let walls = model.fragment("duplex-ifcwallstandardcase").unwrap();
        assert_eq!(walls.express_ids().collect::<Vec<_>>(), vec![42, 43]);
        for wall in &walls.elements {
            assert!(!wall.indices.is_empty());
            assert_eq!(wall.indices.len() % 3, 0);
        }

        // Wall 42 is a 2 x 0.3 x 3 extrusion placed at x = 10
        let bounds = elements_bounds(&walls.elements[..1]).unwrap();
        assert!((bounds.min.x - 9.0).abs() < 1e-4);
        assert!((bounds.max.x - 11.0).abs() < 1e-4);
        assert!((bounds.max.z - 3.0).abs() < 1e-4);

        assert!(model.fragment("duplex-ifcslab").is_some());
        assert!(model.fragments.iter().all(|f| f.ifc_type.as_str() != "IFCPROJECT"));
    }

    #[test]
    fn test_elements_without_representation_are_skipped() {
        let model = load(&LoaderSettings::default());
        // The window has no body representation
        assert!(model.fragment("duplex-ifcwindow").is_none());
        assert!(model.fragments.iter().all(|f| !f.elements.is_empty()));
    }

    #[test]
    fn test_load_skips_excluded_categories() {
        let mut settings = LoaderSettings::default();
        let all = load(&settings);
        assert!(all.fragment("duplex-ifcreinforcingbar").is_some());

        settings.exclude(IfcType::REINFORCING_BAR);
        settings.exclude(IfcType::TENDON_ANCHOR);
        let model = load(&settings);
        assert!(model.fragment("duplex-ifcreinforcingbar").is_none());
        assert!(model.fragment("duplex-ifctendonanchor").is_none());
        assert!(model.fragment("duplex-ifcslab").is_some());
    }

    #[test]
    fn test_coordinate_to_origin_recenters_ifc() {
        let settings = LoaderSettings {
            coordinate_to_origin: true,
            optimize_profiles: true,
            ..Default::default()
        };
        let model = load(&settings);
        let bounds = elements_bounds(model.fragments.iter().flat_map(|f| &f.elements)).unwrap();
        assert!(bounds.center().length() < 1e-4);
        assert!(model.coordination_offset[0] > 0.0);
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let err = IfcStepLoader
            .load(b"DATA;\n#1= IFCWALL('a');\nENDSEC;", "m", &LoaderSettings::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Format { format: AssetFormat::Ifc, .. }));
    }

    #[test]
    fn test_missing_data_section_is_format_error() {
        let err = IfcStepLoader
            .load(b"ISO-10303-21;\nHEADER;\nENDSEC;\nEND-ISO-10303-21;", "m", &LoaderSettings::default())
            .unwrap_err();
        assert!(err.to_string().contains("DATA"));
    }
}
