//! Glyph atlas: CPU-side texture pages for glyph bitmaps.
//!
//! Each page is a square RGBA texture packed with a row-based "shelf"
//! algorithm: a shelf is as tall as the tallest glyph placed on it, and a
//! glyph that fits no shelf starts a new one below. When the current page
//! has no room left a new page (with a new texture id) is opened.
//!
//! Pages carry a dirty flag so the renderer only re-uploads what changed.

use stereo_text::{Rect, TextureId};

/// Where a glyph landed: its page texture and normalized UV rectangle.
///
/// `uv.top` is the V coordinate of the bitmap's first row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasSlot {
    pub texture: TextureId,
    pub uv: Rect,
}

/// Pixel-space rectangle within a page.
#[derive(Clone, Copy, Debug)]
struct PixelRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Shelf (row) in a page.
#[derive(Debug)]
struct Shelf {
    y: u32,
    /// Tallest padded glyph on this shelf.
    height: u32,
    /// Next free X position.
    cursor_x: u32,
}

/// One square RGBA texture.
#[derive(Debug)]
pub struct AtlasPage {
    pub texture: TextureId,
    /// RGBA pixel data (size * size * 4 bytes).
    pub data: Vec<u8>,
    /// Whether data changed since the last upload.
    pub dirty: bool,
    shelves: Vec<Shelf>,
    glyphs: usize,
}

impl AtlasPage {
    fn new(texture: TextureId, size: u32) -> Self {
        Self {
            texture,
            data: vec![0u8; (size as usize) * (size as usize) * 4],
            dirty: false,
            shelves: Vec::new(),
            glyphs: 0,
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs
    }

    /// Shelf packing inside this page.
    fn allocate(&mut self, size: u32, width: u32, height: u32, padding: u32) -> Option<PixelRect> {
        let padded_w = width + padding;
        let padded_h = height + padding;

        for shelf in &mut self.shelves {
            if shelf.height >= padded_h && shelf.cursor_x + padded_w <= size {
                let rect = PixelRect {
                    x: shelf.cursor_x,
                    y: shelf.y,
                    width,
                    height,
                };
                shelf.cursor_x += padded_w;
                return Some(rect);
            }
        }

        let shelf_y = self.shelves.last().map(|s| s.y + s.height).unwrap_or(0);
        if shelf_y + padded_h > size || padded_w > size {
            return None;
        }

        self.shelves.push(Shelf {
            y: shelf_y,
            height: padded_h,
            cursor_x: padded_w,
        });
        Some(PixelRect {
            x: 0,
            y: shelf_y,
            width,
            height,
        })
    }

    /// Copy a bitmap into the page, expanding alpha-only data to white RGBA.
    fn blit(&mut self, size: u32, rect: &PixelRect, bitmap: &[u8]) {
        let (width, height) = (rect.width, rect.height);
        let is_rgba = bitmap.len() >= (width * height * 4) as usize;
        let is_alpha = !is_rgba && bitmap.len() >= (width * height) as usize;
        if !is_rgba && !is_alpha {
            log::warn!("glyph bitmap too short for {width}x{height}, left blank");
            return;
        }

        for row in 0..height {
            for col in 0..width {
                let dst = (((rect.y + row) * size + rect.x + col) * 4) as usize;
                let Some(pixel) = self.data.get_mut(dst..dst + 4) else {
                    continue;
                };
                if is_rgba {
                    let src = ((row * width + col) * 4) as usize;
                    pixel.copy_from_slice(&bitmap[src..src + 4]);
                } else {
                    let alpha = bitmap[(row * width + col) as usize];
                    pixel.copy_from_slice(&[255, 255, 255, alpha]);
                }
            }
        }
        self.glyphs += 1;
        self.dirty = true;
    }
}

/// Multi-page glyph atlas.
#[derive(Debug)]
pub struct GlyphAtlas {
    /// Page width and height in pixels.
    page_size: u32,
    /// Padding between glyphs in pixels.
    padding: u32,
    first_texture: u32,
    next_texture: u32,
    pages: Vec<AtlasPage>,
}

impl GlyphAtlas {
    /// Atlas whose pages are `page_size` square, texture ids starting at 1.
    ///
    /// Common sizes: 512, 1024, 2048.
    pub fn new(page_size: u32) -> Self {
        Self::with_first_texture(page_size, TextureId(1))
    }

    /// Atlas allocating texture ids upward from `first`.
    pub fn with_first_texture(page_size: u32, first: TextureId) -> Self {
        Self {
            page_size,
            padding: 1,
            first_texture: first.0,
            next_texture: first.0,
            pages: Vec::new(),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    pub fn page(&self, texture: TextureId) -> Option<&AtlasPage> {
        self.pages.iter().find(|p| p.texture == texture)
    }

    pub fn glyph_count(&self) -> usize {
        self.pages.iter().map(AtlasPage::glyph_count).sum()
    }

    /// Texture of the page new glyphs currently go to, opening one if needed.
    pub fn current_texture(&mut self) -> TextureId {
        match self.pages.last() {
            Some(page) => page.texture,
            None => self.open_page(),
        }
    }

    /// Pack a glyph bitmap, returning its slot.
    ///
    /// Returns `None` for empty bitmaps and for glyphs larger than a page.
    pub fn insert(&mut self, width: u32, height: u32, bitmap: &[u8]) -> Option<AtlasSlot> {
        if width == 0 || height == 0 {
            return None;
        }
        if width + self.padding > self.page_size || height + self.padding > self.page_size {
            log::warn!(
                "glyph {width}x{height} does not fit a {0}x{0} atlas page",
                self.page_size
            );
            return None;
        }

        let size = self.page_size;
        let padding = self.padding;
        let slot = self
            .pages
            .last_mut()
            .and_then(|page| page.allocate(size, width, height, padding).map(|r| (page.texture, r)));
        let (texture, rect) = match slot {
            Some(slot) => slot,
            None => {
                let texture = self.open_page();
                let page = self.pages.last_mut()?;
                (texture, page.allocate(size, width, height, padding)?)
            }
        };

        let page = self.pages.last_mut()?;
        page.blit(size, &rect, bitmap);
        Some(AtlasSlot {
            texture,
            uv: self.uv_of(&rect),
        })
    }

    /// Pages changed since their last upload.
    pub fn dirty_pages(&self) -> impl Iterator<Item = &AtlasPage> {
        self.pages.iter().filter(|p| p.dirty)
    }

    pub fn mark_clean(&mut self, texture: TextureId) {
        if let Some(page) = self.pages.iter_mut().find(|p| p.texture == texture) {
            page.dirty = false;
        }
    }

    /// Drop every page. Texture ids restart from the first one.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.next_texture = self.first_texture;
    }

    fn open_page(&mut self) -> TextureId {
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        log::debug!("opening atlas page {} ({}px)", texture.0, self.page_size);
        self.pages.push(AtlasPage::new(texture, self.page_size));
        texture
    }

    fn uv_of(&self, rect: &PixelRect) -> Rect {
        let inv = 1.0 / self.page_size as f32;
        Rect::new(
            rect.x as f32 * inv,
            (rect.x + rect.width) as f32 * inv,
            rect.y as f32 * inv,
            (rect.y + rect.height) as f32 * inv,
        )
    }
}

// ===================================================================
// Tests
// ===================================================================
