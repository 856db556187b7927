//! Geometry primitives shared by the formatter and glyph sources.
//!
//! Pixel rectangles use a Y-up convention: `top >= bottom`, the baseline
//! sits at `y = 0` and successive lines move towards negative Y.
//! UV rectangles reuse the same type with texture-space values.

use bytemuck::{Pod, Zeroable};

/// 2D vector / point. `Pod` so vertex arrays can be uploaded as bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise floor.
    pub fn floor(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
        }
    }
}

/// Axis-aligned rectangle stored by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height in a Y-up space (`top - bottom`).
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn move_by(&mut self, delta: Vec2) {
        self.move_x(delta.x);
        self.move_y(delta.y);
    }

    pub fn move_x(&mut self, dx: f32) {
        self.left += dx;
        self.right += dx;
    }

    pub fn move_y(&mut self, dy: f32) {
        self.top += dy;
        self.bottom += dy;
    }

    /// Same rectangle translated by `delta`.
    pub fn translated(mut self, delta: Vec2) -> Self {
        self.move_by(delta);
        self
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right, self.bottom)
    }
}

/// Identifier of a texture page holding glyph bitmaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One rendered character: where to draw it and where to sample it from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    /// Pixel rectangle, relative to the formatter's coordinate space.
    pub rect: Rect,
    /// UV rectangle inside the texture page.
    pub uv: Rect,
    /// Texture page holding the glyph bitmap.
    pub texture: TextureId,
}

// ===================================================================
// Tests
// ===================================================================
