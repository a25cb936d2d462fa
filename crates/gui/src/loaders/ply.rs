//! PLY point cloud decoding

use std::io::Cursor;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use shared::{AssetFormat, PointCloud};

use crate::error::{LoadError, Result};

/// Decode the `vertex` element of a PLY buffer (ascii or binary).
///
/// Colors are read from `red`/`green`/`blue` and normalized to 0..1. A cloud
/// carries colors only when every vertex has all three channels.
pub fn decode_point_cloud(bytes: &[u8]) -> Result<PointCloud> {
    let mut reader = Cursor::new(bytes);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| LoadError::format(AssetFormat::Ply, e.to_string()))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| LoadError::format(AssetFormat::Ply, "no vertex element"))?;

    let mut positions = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());
    let mut has_colors = true;

    for vertex in vertices {
        let x = scalar(vertex, "x")?;
        let y = scalar(vertex, "y")?;
        let z = scalar(vertex, "z")?;
        positions.push([x, y, z]);

        if has_colors {
            match (channel(vertex, "red"), channel(vertex, "green"), channel(vertex, "blue")) {
                (Some(r), Some(g), Some(b)) => colors.push([r, g, b]),
                _ => has_colors = false,
            }
        }
    }

    Ok(PointCloud {
        positions,
        colors: (has_colors && !colors.is_empty()).then_some(colors),
    })
}

/// Extract a numeric scalar property as f32. List properties are rejected.
fn scalar(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Char(v)) => Ok(*v as f32),
        Some(Property::UChar(v)) => Ok(*v as f32),
        Some(Property::Float(v)) => Ok(*v),
        Some(Property::Double(v)) => Ok(*v as f32),
        Some(Property::Int(v)) => Ok(*v as f32),
        Some(Property::UInt(v)) => Ok(*v as f32),
        Some(Property::Short(v)) => Ok(*v as f32),
        Some(Property::UShort(v)) => Ok(*v as f32),
        _ => Err(LoadError::format(
            AssetFormat::Ply,
            format!("property '{name}' not found or invalid type"),
        )),
    }
}

/// Color channel normalized to 0..1
fn channel(element: &DefaultElement, name: &str) -> Option<f32> {
    match element.get(name)? {
        Property::UChar(v) => Some(*v as f32 / 255.0),
        Property::UShort(v) => Some(*v as f32 / 65535.0),
        Property::Float(v) => Some(v.clamp(0.0, 1.0)),
        Property::Double(v) => Some((*v as f32).clamp(0.0, 1.0)),
        _ => None,
    }
}
