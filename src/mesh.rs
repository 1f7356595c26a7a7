//! Terrain mesh construction from a square height field.
//!
//! Grid vertices are placed in normalized Mercator inside the tile's
//! sub-extent, converted to geodetic and then to WGS84 geocentric
//! coordinates, and stored relative to the first vertex. A curtain (skirt)
//! hangs below the border so neighbouring tiles at different heights leave
//! no gaps.
//!
//! Vertex layout for an `N × N` grid:
//!
//! ```text
//! 0 .. N*N                 grid, row-major, row 0 = north
//! N*N .. N*N+4             curtain corners: NW, NE, SE, SW
//! N*N+4 ..                 curtain edges: north (W→E), east (N→S),
//!                          south (E→W), west (S→N), N-2 each
//! ```

use crate::error::{Error, Result};
use crate::geometry::geodesy::{geodetic_to_geocentric, mercator_to_geodetic, Geodetic};
use crate::geometry::Extent;

/// Depth of the curtain below each border vertex
pub const CURTAIN_HEIGHT: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position relative to [`HeightFieldMesh::offset`]
    pub position: [f64; 3],
    pub texcoord: [f64; 2],
}

/// Axis-aligned box in geocentric coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox3 {
    fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    fn add(&mut self, p: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightFieldMesh {
    pub grid_size: usize,
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Geocentric position of vertex 0
    pub offset: [f64; 3],
    /// Bounds of the grid vertices, before the offset is subtracted
    pub bounding_box: BoundingBox3,
    /// Lowest and highest grid elevation
    pub height_range: [f64; 2],
    /// Index of the first curtain vertex (equals the vertex count without a
    /// curtain)
    pub curtain_index: usize,
    /// Height samples the mesh was built from
    pub heights: Vec<f32>,
}

impl HeightFieldMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds [`HeightFieldMesh`]es
#[derive(Debug, Clone, Copy)]
pub struct MeshBuilder {
    curtain: bool,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self { curtain: true }
    }
}

impl MeshBuilder {
    #[must_use]
    pub fn with_curtain(mut self, curtain: bool) -> Self {
        self.curtain = curtain;
        self
    }

    /// Build the mesh of an `n × n` height field covering `sub_extent`
    /// (normalized Mercator, `[-1, 1]` spans the Web Mercator square).
    ///
    /// # Errors
    /// [`Error::Format`] if `n < 2` or `heights` does not hold `n * n`
    /// samples.
    pub fn build(&self, heights: &[f32], n: usize, sub_extent: &Extent) -> Result<HeightFieldMesh> {
        if n < 2 {
            return Err(Error::Format(format!("grid size {n} is too small for a mesh")));
        }
        if heights.len() != n * n {
            return Err(Error::Format(format!(
                "expected {} heights for grid size {n}, got {}",
                n * n,
                heights.len()
            )));
        }

        let step = (n - 1) as f64;
        let texcoord = |x: usize, y: usize| [x as f64 / step, y as f64 / step];
        let geocentric = |x: usize, y: usize, height: f64| {
            let mx = sub_extent.minx + sub_extent.width() * x as f64 / step;
            let my = sub_extent.maxy - sub_extent.height() * y as f64 / step;
            let (lng, lat) = mercator_to_geodetic(mx, my);
            geodetic_to_geocentric(Geodetic { lng, lat, height })
        };

        let mut bounding_box = BoundingBox3::empty();
        let mut height_range = [f64::INFINITY, f64::NEG_INFINITY];
        let mut absolute = Vec::with_capacity(n * n + 4 * (n - 1));
        let mut texcoords = Vec::with_capacity(absolute.capacity());

        for y in 0..n {
            for x in 0..n {
                let h = f64::from(heights[y * n + x]);
                let p = geocentric(x, y, h);
                bounding_box.add(p);
                height_range[0] = height_range[0].min(h);
                height_range[1] = height_range[1].max(h);
                absolute.push(p);
                texcoords.push(texcoord(x, y));
            }
        }

        let mut indices = grid_indices(n);
        let curtain_index = absolute.len();

        if self.curtain {
            for (x, y) in curtain_sources(n) {
                let h = f64::from(heights[y * n + x]) - CURTAIN_HEIGHT;
                absolute.push(geocentric(x, y, h));
                texcoords.push(texcoord(x, y));
            }
            indices.extend(curtain_indices(n));
        }

        let offset = absolute[0];
        let vertices = absolute
            .iter()
            .zip(texcoords)
            .map(|(p, texcoord)| Vertex {
                position: [p[0] - offset[0], p[1] - offset[1], p[2] - offset[2]],
                texcoord,
            })
            .collect();

        Ok(HeightFieldMesh {
            grid_size: n,
            vertices,
            indices,
            offset,
            bounding_box,
            height_range,
            curtain_index,
            heights: heights.to_vec(),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index(n: usize, x: usize, y: usize) -> u32 {
    (y * n + x) as u32
}

/// Two triangles per grid cell
fn grid_indices(n: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i00 = index(n, x, y);
            let i10 = index(n, x + 1, y);
            let i01 = index(n, x, y + 1);
            let i11 = index(n, x + 1, y + 1);
            indices.extend_from_slice(&[i00, i01, i10, i10, i01, i11]);
        }
    }
    indices
}

/// Grid positions the curtain vertices hang from, in curtain vertex order
fn curtain_sources(n: usize) -> Vec<(usize, usize)> {
    let last = n - 1;
    let mut sources = vec![(0, 0), (last, 0), (last, last), (0, last)];
    sources.extend((1..last).map(|x| (x, 0)));
    sources.extend((1..last).map(|y| (last, y)));
    sources.extend((1..last).rev().map(|x| (x, last)));
    sources.extend((1..last).rev().map(|y| (0, y)));
    sources
}

/// Border positions walked clockwise from the north-west corner, closed
fn border_loop(n: usize) -> Vec<(usize, usize)> {
    let last = n - 1;
    let mut path = Vec::with_capacity(4 * last + 1);
    path.extend((0..last).map(|x| (x, 0)));
    path.extend((0..last).map(|y| (last, y)));
    path.extend((1..=last).rev().map(|x| (x, last)));
    path.extend((1..=last).rev().map(|y| (0, y)));
    path.push((0, 0));
    path
}

/// Curtain vertex index hanging from border position `(x, y)`
#[allow(clippy::cast_possible_truncation)]
fn curtain_vertex(n: usize, x: usize, y: usize) -> u32 {
    let last = n - 1;
    let base = n * n;
    let edges = base + 4;
    let inner = last.saturating_sub(1);
    let i = match (x, y) {
        (0, 0) => base,
        (x, 0) if x == last => base + 1,
        (x, y) if x == last && y == last => base + 2,
        (0, y) if y == last => base + 3,
        (x, 0) => edges + (x - 1),
        (x, y) if x == last => edges + inner + (y - 1),
        (x, _) if y == last => edges + 2 * inner + (last - 1 - x),
        (_, y) => edges + 3 * inner + (last - 1 - y),
    };
    i as u32
}

/// Two triangles per border segment joining it to its curtain
fn curtain_indices(n: usize) -> Vec<u32> {
    let path = border_loop(n);
    let mut indices = Vec::with_capacity(path.len() * 6);
    for pair in path.windows(2) {
        let (ax, ay) = pair[0];
        let (bx, by) = pair[1];
        let a = index(n, ax, ay);
        let b = index(n, bx, by);
        let ca = curtain_vertex(n, ax, ay);
        let cb = curtain_vertex(n, bx, by);
        indices.extend_from_slice(&[a, ca, b, b, ca, cb]);
    }
    indices
}
