//! Fragments bundle loader and exporter.

use shared::{AssetFormat, Fragment, FragmentsBundle, LoadedModel, LoaderSettings};

use super::{prepare_fragments, ModelLoader};
use crate::error::{LoadError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentsLoader;

impl ModelLoader for FragmentsLoader {
    fn load(&self, bytes: &[u8], name: &str, settings: &LoaderSettings) -> Result<LoadedModel> {
        let bundle: FragmentsBundle = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::format(AssetFormat::Fragments, e.to_string()))?;

        let schema = bundle.models.iter().find_map(|m| m.schema.clone());
        let offset = bundle
            .models
            .first()
            .map(|m| m.coordination_offset)
            .unwrap_or_default();

        let mut fragments: Vec<Fragment> = bundle
            .models
            .into_iter()
            .flat_map(|m| m.fragments)
            .filter(|f| !settings.is_excluded(&f.ifc_type))
            .collect();

        let offset = prepare_fragments(&mut fragments, name, settings, offset);

        Ok(LoadedModel {
            name: name.to_string(),
            schema,
            fragments,
            coordination_offset: offset,
        })
    }
}

/// Serialize models into a fragments bundle
pub fn export_bundle<'a>(models: impl IntoIterator<Item = &'a LoadedModel>) -> Result<Vec<u8>> {
    let bundle = FragmentsBundle::new(models.into_iter().cloned().collect());
    serde_json::to_vec_pretty(&bundle)
        .map_err(|e| LoadError::format(AssetFormat::Fragments, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::viewport::mesh::elements_bounds;
    use crate::viewport::picking::Aabb;
    use shared::IfcType;

    #[test]
    fn test_load_bundle_merges_models() {
        let bytes = fixtures::fragments_json();
        let model = FragmentsLoader
            .load(&bytes, "duplex", &LoaderSettings::default())
            .unwrap();
        assert_eq!(model.name, "duplex");
        assert_eq!(model.fragments.len(), 4);
        assert_eq!(model.coordination_offset, [0.0; 3]);
    }

    #[test]
    fn test_excluded_fragments_are_dropped() {
        let mut settings = LoaderSettings::default();
        settings.exclude(IfcType::REINFORCING_BAR);
        let model = FragmentsLoader
            .load(&fixtures::fragments_json(), "duplex", &settings)
            .unwrap();
        assert!(model.fragments.iter().all(|f| f.ifc_type != IfcType::REINFORCING_BAR));
        assert_eq!(model.fragments.len(), 3);
    }

    #[test]
    fn test_coordinate_to_origin_recenters() {
        let settings = LoaderSettings {
            coordinate_to_origin: true,
            ..Default::default()
        };
        let model = FragmentsLoader
            .load(&fixtures::fragments_json(), "duplex", &settings)
            .unwrap();
        let bounds = elements_bounds(model.fragments.iter().flat_map(|f| &f.elements)).unwrap();
        assert!(bounds.center().length() < 1e-4);
        assert!(model.coordination_offset[0] > 0.0);
    }

    #[test]
    fn test_optimize_profiles_welds() {
        let settings = LoaderSettings {
            optimize_profiles: true,
            ..Default::default()
        };
        let model = FragmentsLoader
            .load(&fixtures::fragments_json(), "duplex", &settings)
            .unwrap();
        let element = &model.fragment("F1").unwrap().elements[0];
        assert_eq!(element.positions.len(), 8);
        assert!(Aabb::from_positions(&element.positions).is_some());
    }

    #[test]
    fn test_export_then_load() {
        let model = FragmentsLoader
            .load(&fixtures::fragments_json(), "duplex", &LoaderSettings::default())
            .unwrap();
        let bytes = export_bundle([&model]).unwrap();
        let again = FragmentsLoader
            .load(&bytes, "duplex", &LoaderSettings::default())
            .unwrap();
        assert_eq!(again, model);
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = FragmentsLoader
            .load(b"{not json", "m", &LoaderSettings::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Format { format: AssetFormat::Fragments, .. }));
    }
}
