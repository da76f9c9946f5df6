//! # Mesh
//!
//! Indexed triangle mesh built from an STL triangle soup, with the physical
//! properties reported for each analyzed file.

use crate::{
    geo::*,
    stl::{stl_to_tri, StlError},
};
use log::{debug, warn};
use std::{collections::HashMap, path::Path};

/// Density used when no material is chosen
pub const DEFAULT_DENSITY: f64 = 1.0;

/// Triangulated surface, vertices are merged so shared corners are stored once
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[u32; 3]>,
}

/// Physical properties of a closed mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassProperties {
    pub volume: f64,
    pub area: f64,
    pub density: f64,
    pub mass: f64,
}

fn vertex_key(p: [f32; 3]) -> [u32; 3] {
    // -0.0 and 0.0 have different bits but are the same corner
    let bits = |v: f32| if v == 0. { 0 } else { v.to_bits() };
    [bits(p[0]), bits(p[1]), bits(p[2])]
}

impl Mesh {
    /// Build a mesh from a triangle soup, merging identical vertices
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_inspect::{geo::Triangle3d, mesh::Mesh};
    /// let tris = vec![
    ///     Triangle3d::new((0., 0., 0.), (1., 0., 0.), (0., 1., 0.)),
    ///     Triangle3d::new((1., 0., 0.), (1., 1., 0.), (0., 1., 0.)),
    /// ];
    /// let mesh = Mesh::from_triangles(&tris);
    /// assert_eq!(mesh.faces.len(), 2);
    /// assert_eq!(mesh.vertices.len(), 4);
    /// ```
    pub fn from_triangles(tris: &[Triangle3d]) -> Mesh {
        let mut index: HashMap<[u32; 3], u32> = HashMap::new();
        let mut vertices = Vec::new();
        let faces = tris
            .iter()
            .map(|tri| {
                let mut face = [0_u32; 3];
                for (slot, point) in face.iter_mut().zip(&[tri.p1, tri.p2, tri.p3]) {
                    let p: [f32; 3] = (*point).into();
                    *slot = *index.entry(vertex_key(p)).or_insert_with(|| {
                        vertices.push(*point);
                        (vertices.len() - 1) as u32
                    });
                }
                face
            })
            .collect();
        Mesh { vertices, faces }
    }

    /// Load and index an STL file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh, StlError> {
        let tris = stl_to_tri(&path)?;
        let mesh = Mesh::from_triangles(&tris);
        debug!(
            "loaded {}: {} faces, {} vertices",
            path.as_ref().display(),
            mesh.faces.len(),
            mesh.vertices.len()
        );
        Ok(mesh)
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle3d> + '_ {
        self.faces.iter().map(move |face| Triangle3d {
            p1: self.vertices[face[0] as usize],
            p2: self.vertices[face[1] as usize],
            p3: self.vertices[face[2] as usize],
        })
    }

    pub fn to_triangles(&self) -> Triangles3d { self.triangles().collect() }

    pub fn bounds(&self) -> Line3d { get_bounds(&self.to_triangles()) }

    pub fn extents(&self) -> [f32; 3] { self.bounds().extents() }

    /// Signed volume from the tetrahedra each face forms with the origin,
    /// positive when faces wind counter clockwise seen from outside
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|tri| {
                let [a, b, c] = [to_f64(tri.p1), to_f64(tri.p2), to_f64(tri.p3)];
                let cross = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]
            })
            .sum::<f64>()
            / 6.
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|tri| {
                let [a, b, c] = [to_f64(tri.p1), to_f64(tri.p2), to_f64(tri.p3)];
                let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
                let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
                let n = [
                    u[1] * v[2] - u[2] * v[1],
                    u[2] * v[0] - u[0] * v[2],
                    u[0] * v[1] - u[1] * v[0],
                ];
                (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() / 2.
            })
            .sum()
    }

    pub fn mass_properties(&self, density: f64) -> MassProperties {
        let signed = self.signed_volume();
        if signed < 0. {
            warn!("mesh faces point inward, using absolute volume");
        }
        let volume = signed.abs();
        MassProperties {
            volume,
            area: self.area(),
            density,
            mass: volume * density,
        }
    }
}

fn to_f64(p: Point3d) -> [f64; 3] { [f64::from(p.pos.x), f64::from(p.pos.y), f64::from(p.pos.z)] }

/// Closed axis aligned box from `min` to `max`, faces wound outward
pub fn cuboid(min: (f32, f32, f32), max: (f32, f32, f32)) -> Triangles3d {
    let (x0, y0, z0) = min;
    let (x1, y1, z1) = max;
    let quads = [
        // bottom
        [(x0, y0, z0), (x0, y1, z0), (x1, y1, z0), (x1, y0, z0)],
        // top
        [(x0, y0, z1), (x1, y0, z1), (x1, y1, z1), (x0, y1, z1)],
        // front
        [(x0, y0, z0), (x1, y0, z0), (x1, y0, z1), (x0, y0, z1)],
        // back
        [(x0, y1, z0), (x0, y1, z1), (x1, y1, z1), (x1, y1, z0)],
        // left
        [(x0, y0, z0), (x0, y0, z1), (x0, y1, z1), (x0, y1, z0)],
        // right
        [(x1, y0, z0), (x1, y1, z0), (x1, y1, z1), (x1, y0, z1)],
    ];
    quads
        .iter()
        .flat_map(|q| {
            vec![
                Triangle3d::new(q[0], q[1], q[2]),
                Triangle3d::new(q[0], q[2], q[3]),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn cube_properties() {
        let mesh = Mesh::from_triangles(&cuboid((0., 0., 0.), (10., 10., 10.)));
        assert_eq!(mesh.faces.len(), 12);
        assert_eq!(mesh.vertices.len(), 8);
        assert!(approx_eq!(f64, mesh.signed_volume(), 1000., epsilon = 1e-9));
        assert!(approx_eq!(f64, mesh.area(), 600., epsilon = 1e-9));
        assert_eq!(mesh.extents(), [10., 10., 10.]);
    }

    #[test]
    fn mass_uses_density() {
        let mesh = Mesh::from_triangles(&cuboid((0., 0., 0.), (1., 2., 3.)));
        let props = mesh.mass_properties(2.5);
        assert!(approx_eq!(f64, props.volume, 6., epsilon = 1e-9));
        assert!(approx_eq!(f64, props.mass, 15., epsilon = 1e-9));
        assert!(approx_eq!(f64, props.area, 22., epsilon = 1e-9));
        assert_eq!(props.density, 2.5);
    }

    #[test]
    fn inverted_mesh_has_positive_volume() {
        let tris: Vec<_> = cuboid((0., 0., 0.), (2., 2., 2.))
            .into_iter()
            .map(|t| Triangle3d { p1: t.p1, p2: t.p3, p3: t.p2 })
            .collect();
        let mesh = Mesh::from_triangles(&tris);
        assert!(mesh.signed_volume() < 0.);
        assert!(approx_eq!(f64, mesh.mass_properties(DEFAULT_DENSITY).volume, 8., epsilon = 1e-9));
    }

    #[test]
    fn negative_zero_merges() {
        let tris = vec![
            Triangle3d::new((0., 0., 0.), (1., 0., 0.), (0., 1., 0.)),
            Triangle3d::new((-0., 0., 0.), (0., 1., 0.), (-1., 0., 0.)),
        ];
        assert_eq!(Mesh::from_triangles(&tris).vertices.len(), 4);
    }
}
