//! # Voxel
//!
//! Solid voxelization of a closed mesh into a boolean occupancy grid.
//!
//! Every `(x, y)` column of the grid casts a vertical ray through its cell
//! centers. The ray's crossings with the surface pair up into inside
//! intervals, and each cell whose z-range overlaps an interval is filled.

use crate::{geo::Point3d, mesh::Mesh};
use log::debug;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxelError {
    #[error("voxel pitch must be positive and finite, got {0}")]
    InvalidPitch(f64),
    #[error("resolution must be at least 1")]
    Resolution,
    #[error("voxel grid {shape:?} exceeds {max} cells", max = MAX_CELLS)]
    TooLarge { shape: [usize; 3] },
}

/// Upper bound on the number of cells a single grid may hold
pub const MAX_CELLS: usize = 1 << 31;

/// 3d boolean grid, `true` cells are inside the solid
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    shape: [usize; 3],
    origin: [f64; 3],
    pitch: f64,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Grid with all cells set to `value`
    pub fn new(shape: [usize; 3], value: bool) -> OccupancyGrid {
        OccupancyGrid {
            shape,
            origin: [0.; 3],
            pitch: 1.,
            cells: vec![value; shape[0] * shape[1] * shape[2]],
        }
    }

    /// Build a grid from a closure over `(x, y, z)`
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_inspect::voxel::OccupancyGrid;
    /// let grid = OccupancyGrid::from_fn([2, 3, 4], |x, _, z| x == z);
    /// assert!(grid.get(1, 2, 1));
    /// assert!(!grid.get(1, 2, 3));
    /// assert_eq!(grid.filled_count(), 6);
    /// ```
    pub fn from_fn<F: Fn(usize, usize, usize) -> bool>(shape: [usize; 3], f: F) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(shape, false);
        for x in 0..shape[0] {
            for y in 0..shape[1] {
                for z in 0..shape[2] {
                    let idx = grid.index(x, y, z);
                    grid.cells[idx] = f(x, y, z);
                }
            }
        }
        grid
    }

    pub fn shape(&self) -> [usize; 3] { self.shape }

    /// Minimum corner of the grid in mesh units
    pub fn origin(&self) -> [f64; 3] { self.origin }

    pub fn pitch(&self) -> f64 { self.pitch }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.shape[1] + y) * self.shape[2] + z
    }

    /// Panics if the index is outside the grid
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        assert!(x < self.shape[0] && y < self.shape[1] && z < self.shape[2]);
        self.cells[self.index(x, y, z)]
    }

    pub fn filled_count(&self) -> usize { self.cells.iter().filter(|x| **x).count() }

    pub fn is_empty(&self) -> bool { self.cells.is_empty() }
}

/// Edge length of a voxel, the shortest side of the bounding box split
/// into `resolution` cells
pub fn pitch_for(mesh: &Mesh, resolution: u32) -> Result<f64, VoxelError> {
    if resolution == 0 {
        return Err(VoxelError::Resolution);
    }
    let extents = mesh.extents();
    let shortest = extents.iter().cloned().fold(f32::INFINITY, f32::min);
    let pitch = f64::from(shortest) / f64::from(resolution);
    if pitch.is_finite() && pitch > 0. {
        Ok(pitch)
    } else {
        Err(VoxelError::InvalidPitch(pitch))
    }
}

/// Triangle projected onto the xy plane, wound counter clockwise
struct Projected {
    a: [f64; 3],
    b: [f64; 3],
    c: [f64; 3],
    area: f64,
    min: [f64; 2],
    max: [f64; 2],
}

fn edge(a: &[f64; 3], b: &[f64; 3], p: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Top-left rule, an edge point belongs to exactly one of the two faces
/// sharing that edge
fn is_top_left(a: &[f64; 3], b: &[f64; 3]) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    dy < 0. || (dy == 0. && dx < 0.)
}

fn covers(w: f64, a: &[f64; 3], b: &[f64; 3]) -> bool { w > 0. || (w == 0. && is_top_left(a, b)) }

impl Projected {
    fn new(p1: Point3d, p2: Point3d, p3: Point3d) -> Option<Projected> {
        let f = |p: Point3d| [f64::from(p.pos.x), f64::from(p.pos.y), f64::from(p.pos.z)];
        let (a, mut b, mut c) = (f(p1), f(p2), f(p3));
        let mut area = edge(&a, &b, [c[0], c[1]]);
        if area == 0. {
            // vertical faces never cross a vertical ray
            return None;
        }
        if area < 0. {
            std::mem::swap(&mut b, &mut c);
            area = -area;
        }
        Some(Projected {
            min: [a[0].min(b[0]).min(c[0]), a[1].min(b[1]).min(c[1])],
            max: [a[0].max(b[0]).max(c[0]), a[1].max(b[1]).max(c[1])],
            a,
            b,
            c,
            area,
        })
    }

    /// Height where a vertical ray through `p` crosses the face
    fn crossing(&self, p: [f64; 2]) -> Option<f64> {
        if p[0] < self.min[0] || p[0] > self.max[0] || p[1] < self.min[1] || p[1] > self.max[1] {
            return None;
        }
        let wa = edge(&self.b, &self.c, p);
        let wb = edge(&self.c, &self.a, p);
        let wc = edge(&self.a, &self.b, p);
        if covers(wa, &self.b, &self.c) && covers(wb, &self.c, &self.a) && covers(wc, &self.a, &self.b) {
            Some((wa * self.a[2] + wb * self.b[2] + wc * self.c[2]) / self.area)
        } else {
            None
        }
    }
}

/// Voxelize a closed mesh with cubic cells of edge `pitch`
pub fn voxelize(mesh: &Mesh, pitch: f64) -> Result<OccupancyGrid, VoxelError> {
    if !(pitch.is_finite() && pitch > 0.) {
        return Err(VoxelError::InvalidPitch(pitch));
    }
    let bounds = mesh.bounds();
    let origin = [
        f64::from(bounds.p1.pos.x),
        f64::from(bounds.p1.pos.y),
        f64::from(bounds.p1.pos.z),
    ];
    let mut shape = [0_usize; 3];
    for (size, extent) in shape.iter_mut().zip(&bounds.extents()) {
        *size = ((f64::from(*extent) / pitch).ceil() as usize).max(1);
    }
    let cell_count = shape
        .iter()
        .try_fold(1_usize, |acc, n| acc.checked_mul(*n))
        .filter(|count| *count <= MAX_CELLS)
        .ok_or(VoxelError::TooLarge { shape })?;
    let [nx, ny, nz] = shape;
    debug!("voxelizing at pitch {} into {:?}", pitch, shape);

    let faces: Vec<Projected> = mesh
        .triangles()
        .filter_map(|tri| Projected::new(tri.p1, tri.p2, tri.p3))
        .collect();

    // bucket faces by the x columns they can reach
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); nx];
    for (i, face) in faces.iter().enumerate() {
        let lo = ((face.min[0] - origin[0]) / pitch - 0.5).floor().max(0.) as usize;
        let hi = ((face.max[0] - origin[0]) / pitch - 0.5).ceil().max(0.) as usize;
        for row in rows.iter_mut().take(hi.min(nx - 1) + 1).skip(lo) {
            row.push(i);
        }
    }

    let center = |axis: usize, i: usize| origin[axis] + (i as f64 + 0.5) * pitch;
    let mut cells = vec![false; cell_count];
    cells.par_chunks_mut(nz).enumerate().for_each(|(column, out)| {
        let (x, y) = (column / ny, column % ny);
        let p = [center(0, x), center(1, y)];
        let mut hits: Vec<f64> = rows[x]
            .iter()
            .filter_map(|i| faces[*i].crossing(p))
            .collect();
        hits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        // an odd crossing count means the surface is open, the last one is dropped
        for pair in hits.chunks_exact(2) {
            let (bottom, top) = (pair[0], pair[1]);
            for (z, cell) in out.iter_mut().enumerate() {
                let zc = center(2, z);
                if bottom < zc + pitch / 2. && top > zc - pitch / 2. {
                    *cell = true;
                }
            }
        }
    });

    Ok(OccupancyGrid {
        shape,
        origin,
        pitch,
        cells,
    })
}
