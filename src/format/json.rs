//! Terrain JSON: an elevation tile as a mesh with curtain.
//!
//! Vertices interleave position and texture coordinate (`"pt"`):
//! `x, y, z, u, v, x, y, z, u, v, ...`.

use serde::{Deserialize, Serialize};

use crate::compositor::RasterTile;
use crate::error::{Error, Result};
use crate::geometry::Extent;
use crate::mesh::{HeightFieldMesh, MeshBuilder};

pub const VERSION: &str = "1.1";

/// Serialized terrain document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerrainDocument {
    pub version: String,
    pub triangulation: String,
    pub grid_size: usize,
    pub vertex_semantic: String,
    pub vertices: Vec<f64>,
    pub indices: Vec<u32>,
    pub index_semantic: String,
    pub offset: [f64; 3],
    pub bounding_box: [[f64; 3]; 2],
    pub curtain_index: usize,
    pub height_map: Vec<f32>,
}

impl From<&HeightFieldMesh> for TerrainDocument {
    fn from(mesh: &HeightFieldMesh) -> Self {
        let vertices = mesh
            .vertices
            .iter()
            .flat_map(|v| {
                [
                    v.position[0],
                    v.position[1],
                    v.position[2],
                    v.texcoord[0],
                    v.texcoord[1],
                ]
            })
            .collect();
        Self {
            version: VERSION.to_string(),
            triangulation: "grid".to_string(),
            grid_size: mesh.grid_size,
            vertex_semantic: "pt".to_string(),
            vertices,
            indices: mesh.indices.clone(),
            index_semantic: "TRIANGLES".to_string(),
            offset: mesh.offset,
            bounding_box: [mesh.bounding_box.min, mesh.bounding_box.max],
            curtain_index: mesh.curtain_index,
            height_map: mesh.heights.clone(),
        }
    }
}

/// Build the document of an elevation tile.
///
/// A tile without a sub-extent is placed over the whole normalized square.
///
/// # Errors
/// [`Error::Format`] for image tiles, non-square tiles and grids too small
/// for a mesh.
pub fn to_document(tile: &RasterTile) -> Result<TerrainDocument> {
    if !tile.is_elevation() {
        return Err(Error::Format("can't convert non elevation data to json".to_string()));
    }
    if tile.width != tile.height {
        return Err(Error::Format(format!(
            "terrain tiles must be square, got {}x{}",
            tile.width, tile.height
        )));
    }
    let sub_extent = tile.sub_extent.unwrap_or(Extent::new(-1.0, -1.0, 1.0, 1.0));
    let mesh = MeshBuilder::default().build(&tile.heights(), tile.width, &sub_extent)?;
    Ok(TerrainDocument::from(&mesh))
}

/// # Errors
/// See [`to_document`].
pub fn encode(tile: &RasterTile) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&to_document(tile)?)?)
}

/// Rebuild an elevation tile from `GridSize` and `HeightMap`.
///
/// The mesh is not read back, so the tile has no sub-extent; encoding it
/// again places the mesh over the whole normalized square.
///
/// # Errors
/// [`Error::Format`] on malformed JSON or a height map of the wrong length.
pub fn decode(bytes: &[u8]) -> Result<RasterTile> {
    let doc: TerrainDocument = serde_json::from_slice(bytes)?;
    RasterTile::from_heights(doc.grid_size, doc.grid_size, &doc.height_map, None)
}

/// Flat terrain of `size × size` zero heights
///
/// # Errors
/// See [`to_document`].
pub fn create_empty(size: usize) -> Result<Vec<u8>> {
    encode(&RasterTile::flat(size, size, None))
}
