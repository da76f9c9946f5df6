//! # Preview
//!
//! Wireframe view of the triangulated surface, drawn as an isometric
//! projection into an svg.

use crate::mesh::Mesh;
use log::info;
use simplesvg::{Attr, ColorAttr, ColorAttr::Color, Fig, Svg};
use std::{
    collections::HashSet,
    fs,
    path::Path,
};

/// Canvas size of the preview in pixels
pub const PREVIEW_SIZE: u32 = 800;

const MARGIN: f32 = 20.;

// lightblue
const EDGE_COLOR: ColorAttr = Color(0xad, 0xd8, 0xe6);

/// Isometric projection, x to the right and down, y to the left and down,
/// z straight up
fn project(p: [f32; 3]) -> (f32, f32) {
    let cos30 = 3_f32.sqrt() / 2.;
    ((p[0] - p[1]) * cos30, (p[0] + p[1]) * 0.5 - p[2])
}

/// Unique undirected edges of the mesh
fn edges(mesh: &Mesh) -> Vec<(u32, u32)> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for face in &mesh.faces {
        for (a, b) in &[(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
            let key = if a < b { (*a, *b) } else { (*b, *a) };
            if seen.insert(key) {
                edges.push(key);
            }
        }
    }
    edges
}

/// Render every edge of the mesh, scaled to fit a `size` square canvas
pub fn render_svg(mesh: &Mesh, size: u32) -> String {
    let points: Vec<(f32, f32)> = mesh.vertices.iter().map(|v| project((*v).into())).collect();
    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
        |acc, p| (acc.0.min(p.0), acc.1.max(p.0), acc.2.min(p.1), acc.3.max(p.1)),
    );
    let span = (max_x - min_x).max(max_y - min_y);
    let scale = if span > 0. { (size as f32 - 2. * MARGIN) / span } else { 1. };
    let to_canvas = |p: (f32, f32)| ((p.0 - min_x) * scale + MARGIN, (p.1 - min_y) * scale + MARGIN);

    let lines: Vec<Fig> = edges(mesh)
        .iter()
        .map(|(a, b)| {
            let (x1, y1) = to_canvas(points[*a as usize]);
            let (x2, y2) = to_canvas(points[*b as usize]);
            Fig::Line(x1, y1, x2, y2).styled(Attr::default().stroke(EDGE_COLOR).stroke_width(1.0))
        })
        .collect();
    Svg(lines, size, size).to_string()
}

/// Write the preview svg to `path`
pub fn write_preview<P: AsRef<Path>>(mesh: &Mesh, path: P) -> std::io::Result<()> {
    fs::write(&path, render_svg(mesh, PREVIEW_SIZE))?;
    info!("wrote preview to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cuboid;

    #[test]
    fn cube_has_eighteen_edges() {
        let mesh = Mesh::from_triangles(&cuboid((0., 0., 0.), (1., 1., 1.)));
        // 12 box edges plus one diagonal per face
        assert_eq!(edges(&mesh).len(), 18);
        let svg = render_svg(&mesh, PREVIEW_SIZE);
        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<line").count(), 18);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.svg");
        let mesh = Mesh::from_triangles(&cuboid((0., 0., 0.), (2., 1., 1.)));
        write_preview(&mesh, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<line"));
    }
}
