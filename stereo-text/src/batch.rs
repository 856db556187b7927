//! Batch emitter: turns laid-out tiles into per-texture vertex arrays.
//!
//! Each tile becomes two triangles (6 vertices) with matching UVs.
//! Tiles are grouped by texture in first-seen order so the renderer can
//! issue one draw call per texture page.

use crate::geometry::{TextureId, Tile, Vec2};

/// Vertices and UVs of every glyph sampled from one texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureBatch {
    pub texture: TextureId,
    /// Pixel positions, floored to whole pixels.
    pub vertices: Vec<Vec2>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<Vec2>,
}

impl TextureBatch {
    fn new(texture: TextureId) -> Self {
        Self {
            texture,
            vertices: Vec::new(),
            uvs: Vec::new(),
        }
    }

    /// Number of glyph quads in this batch.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Vertex data as raw bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// UV data as raw bytes for buffer upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    fn push(&mut self, tile: &Tile) {
        // floor positions so glyphs are not blurred across pixels
        let px = &tile.rect;
        self.vertices.extend_from_slice(&[
            px.bottom_left().floor(),
            px.top_left().floor(),
            px.top_right().floor(),
            px.bottom_left().floor(),
            px.top_right().floor(),
            px.bottom_right().floor(),
        ]);

        let uv = &tile.uv;
        self.uvs.extend_from_slice(&[
            uv.bottom_left(),
            uv.top_left(),
            uv.top_right(),
            uv.bottom_left(),
            uv.top_right(),
            uv.bottom_right(),
        ]);
    }
}

/// Formatting result: one batch per texture page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormattedText {
    pub batches: Vec<TextureBatch>,
}

impl FormattedText {
    /// Texture ids in batch order.
    pub fn texture_ids(&self) -> Vec<TextureId> {
        self.batches.iter().map(|b| b.texture).collect()
    }

    pub fn batch(&self, texture: TextureId) -> Option<&TextureBatch> {
        self.batches.iter().find(|b| b.texture == texture)
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of glyph quads across all batches.
    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(TextureBatch::quad_count).sum()
    }
}

/// Group `tiles` by texture, preserving iteration order inside each batch.
pub fn emit<I>(tiles: I) -> FormattedText
where
    I: IntoIterator<Item = Tile>,
{
    let mut batches: Vec<TextureBatch> = Vec::new();
    for tile in tiles {
        // a handful of textures at most, linear search is fine
        let index = match batches.iter().position(|b| b.texture == tile.texture) {
            Some(index) => index,
            None => {
                batches.push(TextureBatch::new(tile.texture));
                batches.len() - 1
            }
        };
        batches[index].push(&tile);
    }
    FormattedText { batches }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn tile(texture: u32, left: f32) -> Tile {
        Tile {
            rect: Rect::new(left, left + 8.0, 10.0, 0.0),
            uv: Rect::new(0.0, 0.5, 0.0, 0.25),
            texture: TextureId(texture),
        }
    }

    #[test]
    fn test_emit_empty() {
        let result = emit(Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.quad_count(), 0);
    }

    #[test]
    fn test_emit_groups_by_first_seen_texture() {
        let result = emit(vec![tile(7, 0.0), tile(3, 10.0), tile(7, 20.0)]);
        assert_eq!(result.texture_ids(), vec![TextureId(7), TextureId(3)]);
        assert_eq!(result.batch(TextureId(7)).map(|b| b.vertices.len()), Some(12));
        assert_eq!(result.batch(TextureId(3)).map(|b| b.vertices.len()), Some(6));
        assert_eq!(result.quad_count(), 3);
    }

    #[test]
    fn test_emit_triangle_order() {
        let result = emit(vec![tile(1, 0.0)]);
        let batch = &result.batches[0];
        assert_eq!(
            batch.vertices,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(8.0, 10.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(8.0, 10.0),
                Vec2::new(8.0, 0.0),
            ]
        );
        assert_eq!(batch.uvs[0], Vec2::new(0.0, 0.25));
        assert_eq!(batch.uvs[1], Vec2::new(0.0, 0.0));
        assert_eq!(batch.uvs[5], Vec2::new(0.5, 0.25));
    }

    #[test]
    fn test_emit_floors_positions_not_uvs() {
        let mut t = tile(1, 0.0);
        t.rect = Rect::new(1.6, 9.4, -0.5, -10.2);
        t.uv = Rect::new(0.125, 0.375, 0.5, 0.75);
        let result = emit(vec![t]);
        let batch = &result.batches[0];
        assert_eq!(batch.vertices[0], Vec2::new(1.0, -11.0));
        assert_eq!(batch.vertices[2], Vec2::new(9.0, -1.0));
        assert_eq!(batch.uvs[2], Vec2::new(0.375, 0.5));
    }

    #[test]
    fn test_emit_deterministic() {
        let tiles = vec![tile(2, 0.0), tile(1, 5.0), tile(2, 9.0)];
        assert_eq!(emit(tiles.clone()), emit(tiles));
    }

    #[test]
    fn test_byte_views() {
        let result = emit(vec![tile(1, 0.0)]);
        let batch = &result.batches[0];
        assert_eq!(batch.vertex_bytes().len(), 6 * 8);
        assert_eq!(batch.uv_bytes().len(), 6 * 8);
    }
}
