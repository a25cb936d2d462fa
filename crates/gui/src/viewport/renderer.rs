//! Wireframe and point rendering for the viewport

use egui::{Color32, Rect, Stroke, Ui};
use glam::{Mat4, Vec3};
use shared::{ElementGeometry, LoadedModel, PointCloud, PointsMaterial};

use super::camera::ArcBallCamera;
use super::mesh::{node_matrix, LineMeshData};
use crate::highlight::DEFAULT_STYLE;
use crate::state::scene::NodeKind;
use crate::state::settings::{AxisSettings, GridSettings};
use crate::state::AppState;

/// Paint the 3D viewport using egui's painter
pub fn paint_viewport(ui: &Ui, rect: Rect, camera: &ArcBallCamera, state: &AppState) {
    let painter = ui.painter_at(rect);

    // Background
    let bg = &state.settings.viewport.background_color;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(bg[0], bg[1], bg[2]));

    if state.settings.grid.visible {
        draw_grid(&painter, rect, camera, &state.settings.grid);
    }

    if state.settings.axes.visible {
        draw_axes(&painter, rect, camera, &state.settings.axes);
    }

    for node in state.scene.nodes() {
        if !node.visible {
            continue;
        }
        let matrix = node_matrix(&node.transform);
        match &node.kind {
            NodeKind::Model(model) => draw_model(&painter, rect, camera, model, &matrix, state),
            NodeKind::Points { cloud, material } => {
                draw_points(&painter, rect, camera, cloud, material, &matrix, state)
            }
            _ => {}
        }
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, settings: &GridSettings) {
    let alpha = (settings.opacity * 255.0) as u8;
    let grid_color = Color32::from_rgba_premultiplied(60, 60, 60, alpha);
    let stroke = Stroke::new(0.5, grid_color);

    let range = settings.range;
    let step = settings.size;

    for i in -range..=range {
        let f = i as f32 * step;
        let extent = range as f32 * step;

        // Lines along X
        if let (Some(a), Some(b)) = (
            camera.project([f, 0.0, -extent], rect),
            camera.project([f, 0.0, extent], rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
        // Lines along Z
        if let (Some(a), Some(b)) = (
            camera.project([-extent, 0.0, f], rect),
            camera.project([extent, 0.0, f], rect),
        ) {
            if rect.contains(a) || rect.contains(b) {
                painter.line_segment([a, b], stroke);
            }
        }
    }
}

fn draw_axes(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, settings: &AxisSettings) {
    let len = settings.length;
    let axes = [
        ([len, 0.0, 0.0], "X", Color32::from_rgb(220, 50, 50)),
        ([0.0, len, 0.0], "Y", Color32::from_rgb(50, 200, 50)),
        ([0.0, 0.0, len], "Z", Color32::from_rgb(50, 100, 220)),
    ];

    let Some(o) = camera.project([0.0; 3], rect) else {
        return;
    };
    for (end, label, color) in axes {
        if let Some(p) = camera.project(end, rect) {
            painter.line_segment([o, p], Stroke::new(settings.thickness, color));
            if settings.show_labels {
                painter.text(p, egui::Align2::LEFT_BOTTOM, label, egui::FontId::monospace(10.0), color);
            }
        }
    }
}

fn draw_model(
    painter: &egui::Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    model: &LoadedModel,
    matrix: &Mat4,
    state: &AppState,
) {
    let base = state.settings.viewport.model_color;
    let base_stroke = Stroke::new(0.6, Color32::from_rgb(base[0], base[1], base[2]));

    let highlighter = &state.highlighter;
    let style = highlighter.style(DEFAULT_STYLE);
    let highlight_stroke = style.map(|s| {
        let alpha = (s.opacity * 255.0) as u8;
        Stroke::new(
            1.5,
            Color32::from_rgba_unmultiplied(s.color[0], s.color[1], s.color[2], alpha),
        )
    });
    let outline = highlighter.outline_color;
    let outline_stroke = Stroke::new(2.5, Color32::from_rgb(outline[0], outline[1], outline[2]));

    for fragment in &model.fragments {
        for element in &fragment.elements {
            let highlighted = highlighter.is_highlighted(&fragment.id, element.express_id);
            match (highlighted, highlight_stroke) {
                (true, Some(stroke)) => {
                    if highlighter.outlines_enabled {
                        draw_element_edges(painter, rect, camera, element, matrix, outline_stroke);
                    }
                    draw_element_edges(painter, rect, camera, element, matrix, stroke);
                }
                _ => draw_element_edges(painter, rect, camera, element, matrix, base_stroke),
            }
        }
    }
}

fn draw_element_edges(
    painter: &egui::Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    element: &ElementGeometry,
    matrix: &Mat4,
    stroke: Stroke,
) {
    let world = |i: u32| -> Option<[f32; 3]> {
        let p = element.positions.get(i as usize)?;
        Some(matrix.transform_point3(Vec3::from(*p)).to_array())
    };
    for tri in element.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (world(tri[0]), world(tri[1]), world(tri[2])) else {
            continue;
        };
        draw_line_3d(painter, rect, camera, a, b, stroke);
        draw_line_3d(painter, rect, camera, b, c, stroke);
        draw_line_3d(painter, rect, camera, c, a, stroke);
    }
}

fn draw_points(
    painter: &egui::Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    cloud: &PointCloud,
    material: &PointsMaterial,
    matrix: &Mat4,
    state: &AppState,
) {
    let fallback = state.settings.viewport.point_color;
    let fallback = Color32::from_rgb(fallback[0], fallback[1], fallback[2]);
    let colors = cloud.colors.as_deref().filter(|_| material.vertex_colors);
    let radius = (material.size * 10.0).max(1.0);
    // Thin out very large clouds
    let step = (cloud.len() / state.settings.viewport.max_points.max(1)).max(1);

    for (i, p) in cloud.positions.iter().enumerate().step_by(step) {
        let world = matrix.transform_point3(Vec3::from(*p));
        let Some(screen) = camera.project(world.to_array(), rect) else {
            continue;
        };
        if !rect.contains(screen) {
            continue;
        }
        let color = colors
            .and_then(|c| c.get(i))
            .map(|c| {
                Color32::from_rgb(
                    (c[0] * 255.0) as u8,
                    (c[1] * 255.0) as u8,
                    (c[2] * 255.0) as u8,
                )
            })
            .unwrap_or(fallback);
        painter.circle_filled(screen, radius, color);
    }
}

/// Draw a line mesh (e.g. the gizmo) segment by segment
pub fn draw_lines(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, lines: &LineMeshData, width: f32) {
    for (a, b, c) in lines.segments() {
        let color = Color32::from_rgba_unmultiplied(
            (c[0] * 255.0) as u8,
            (c[1] * 255.0) as u8,
            (c[2] * 255.0) as u8,
            (c[3] * 255.0) as u8,
        );
        draw_line_3d(painter, rect, camera, a.to_array(), b.to_array(), Stroke::new(width, color));
    }
}

fn draw_line_3d(
    painter: &egui::Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    a: [f32; 3],
    b: [f32; 3],
    stroke: Stroke,
) {
    if let (Some(pa), Some(pb)) = (camera.project(a, rect), camera.project(b, rect)) {
        painter.line_segment([pa, pb], stroke);
    }
}
