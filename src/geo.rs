//! # Geo
//!
//! Geometric types shared by the mesh, voxel and preview code.
//! Mostly wraps ultraviolet types with some additional functionality

use float_cmp::approx_eq;
use rayon::prelude::*;
use std::cmp::PartialEq;
use ultraviolet::Vec3;

#[derive(Clone, Copy, Debug, Default)]
pub struct Point3d {
    pub pos: Vec3,
}

impl Point3d {
    pub fn new(x: f32, y: f32, z: f32) -> Point3d {
        Point3d {
            pos: Vec3::new(x, y, z),
        }
    }
}

impl From<[f32; 3]> for Point3d {
    fn from(p: [f32; 3]) -> Self { Point3d::new(p[0], p[1], p[2]) }
}

impl From<Point3d> for [f32; 3] {
    fn from(p: Point3d) -> Self { [p.pos.x, p.pos.y, p.pos.z] }
}

impl Eq for Point3d {}

impl PartialEq for Point3d {
    fn eq(&self, other: &Self) -> bool {
        approx_eq!(f32, self.pos.x, other.pos.x, ulps = 3)
            && approx_eq!(f32, self.pos.y, other.pos.y, ulps = 3)
            && approx_eq!(f32, self.pos.z, other.pos.z, ulps = 3)
    }
}

/// Axis aligned box, `p1` is the minimum corner and `p2` the maximum
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Line3d {
    pub p1: Point3d,
    pub p2: Point3d,
}

impl Line3d {
    pub fn new(p1: (f32, f32, f32), p2: (f32, f32, f32)) -> Line3d {
        Line3d {
            p1: Point3d::new(p1.0, p1.1, p1.2),
            p2: Point3d::new(p2.0, p2.1, p2.2),
        }
    }

    /// Size of the box along each axis
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_inspect::geo::Line3d;
    /// let bounds = Line3d::new((-1., 0., 2.), (1., 4., 3.));
    /// assert_eq!(bounds.extents(), [2., 4., 1.]);
    /// ```
    pub fn extents(&self) -> [f32; 3] {
        [
            self.p2.pos.x - self.p1.pos.x,
            self.p2.pos.y - self.p1.pos.y,
            self.p2.pos.z - self.p1.pos.z,
        ]
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Triangle3d {
    pub p1: Point3d,
    pub p2: Point3d,
    pub p3: Point3d,
}

pub type Triangles3d = Vec<Triangle3d>;

impl Triangle3d {
    pub fn new(p1: (f32, f32, f32), p2: (f32, f32, f32), p3: (f32, f32, f32)) -> Triangle3d {
        Triangle3d {
            p1: Point3d::new(p1.0, p1.1, p1.2),
            p2: Point3d::new(p2.0, p2.1, p2.2),
            p3: Point3d::new(p3.0, p3.1, p3.2),
        }
    }

    pub fn bbox(self) -> Line3d {
        Line3d {
            p1: Point3d::new(self.min_x(), self.min_y(), self.min_z()),
            p2: Point3d::new(self.max_x(), self.max_y(), self.max_z()),
        }
    }

    pub fn min_x(self) -> f32 { self.p1.pos.x.min(self.p2.pos.x).min(self.p3.pos.x) }

    pub fn min_y(self) -> f32 { self.p1.pos.y.min(self.p2.pos.y).min(self.p3.pos.y) }

    pub fn min_z(self) -> f32 { self.p1.pos.z.min(self.p2.pos.z).min(self.p3.pos.z) }

    pub fn max_x(self) -> f32 { self.p1.pos.x.max(self.p2.pos.x).max(self.p3.pos.x) }

    pub fn max_y(self) -> f32 { self.p1.pos.y.max(self.p2.pos.y).max(self.p3.pos.y) }

    pub fn max_z(self) -> f32 { self.p1.pos.z.max(self.p2.pos.z).max(self.p3.pos.z) }
}

/// Get bounds for list of triangles
pub fn get_bounds(tris: &[Triangle3d]) -> Line3d {
    tris.par_iter().map(|tri| tri.bbox()).reduce(
        || Line3d {
            p1: Point3d::new(f32::MAX, f32::MAX, f32::MAX),
            p2: Point3d::new(f32::MIN, f32::MIN, f32::MIN),
        },
        |mut acc, bbox| {
            if bbox.p1.pos.x < acc.p1.pos.x {
                acc.p1.pos.x = bbox.p1.pos.x;
            }
            if bbox.p1.pos.y < acc.p1.pos.y {
                acc.p1.pos.y = bbox.p1.pos.y;
            }
            if bbox.p1.pos.z < acc.p1.pos.z {
                acc.p1.pos.z = bbox.p1.pos.z;
            }
            if bbox.p2.pos.x > acc.p2.pos.x {
                acc.p2.pos.x = bbox.p2.pos.x;
            }
            if bbox.p2.pos.y > acc.p2.pos.y {
                acc.p2.pos.y = bbox.p2.pos.y;
            }
            if bbox.p2.pos.z > acc.p2.pos.z {
                acc.p2.pos.z = bbox.p2.pos.z;
            }
            acc
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_triangles() {
        let tris = vec![
            Triangle3d::new((0., 0., 0.), (1., 0., 0.), (0., 1., 0.)),
            Triangle3d::new((-2., 3., 1.), (1., 5., 0.), (0., 1., 7.)),
        ];
        let bounds = get_bounds(&tris);
        assert_eq!(bounds, Line3d::new((-2., 0., 0.), (1., 5., 7.)));
        assert_eq!(bounds.extents(), [3., 5., 7.]);
    }
}
