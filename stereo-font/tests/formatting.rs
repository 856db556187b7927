//! End-to-end layout through textured fonts and the shared atlas.

use std::cell::RefCell;
use std::rc::Rc;

use stereo_font::{FaceMetrics, GlyphAtlas, GlyphRasterizer, RasterGlyph, SharedAtlas, TexturedFont};
use stereo_text::{
    AlignX, AlignY, FontSet, FontStyle, LayoutConfig, Subset, TextFormatter, TextureId, Tile,
};

/// Block glyphs: `size - 2` wide, `size` tall, one pixel of left bearing,
/// advancing `size` pixels.
struct BlockFace {
    size: u32,
}

impl GlyphRasterizer for BlockFace {
    fn metrics(&self) -> FaceMetrics {
        FaceMetrics {
            ascender: self.size as f32,
            line_spacing: self.size as f32 + 4.0,
        }
    }

    fn advance(&mut self, _ch: char, _next: Option<char>) -> f32 {
        self.size as f32
    }

    fn rasterize(&mut self, _ch: char) -> Option<RasterGlyph> {
        let width = self.size - 2;
        Some(RasterGlyph {
            width,
            height: self.size,
            left: 1,
            top: self.size as i32,
            data: vec![255; (width * self.size) as usize],
        })
    }
}

fn atlas(page: u32, first: u32) -> SharedAtlas {
    Rc::new(RefCell::new(GlyphAtlas::with_first_texture(page, TextureId(first))))
}

fn block_font(atlas: &SharedAtlas) -> TexturedFont<BlockFace> {
    TexturedFont::new(BlockFace { size: 10 }, atlas.clone())
}

fn laid_out(text: &str, align: AlignX, width: f32) -> (TextFormatter, Vec<Tile>) {
    let atlas = atlas(256, 1);
    let mut fonts = FontSet::new(block_font(&atlas));
    let mut formatter = TextFormatter::new();
    formatter.set_alignment(align, AlignY::Top);
    formatter.append(text, FontStyle::Regular, &mut fonts);
    formatter.format(width, 0.0);
    let tiles = formatter.tiles().collect();
    (formatter, tiles)
}

fn y_bands(tiles: &[Tile]) -> usize {
    let mut bottoms: Vec<f32> = tiles.iter().map(|t| t.rect.bottom).collect();
    bottoms.sort_by(f32::total_cmp);
    bottoms.dedup();
    bottoms.len()
}

#[test]
fn test_hello_world_single_line() {
    let (formatter, tiles) = laid_out("Hello World", AlignX::Left, -1.0);
    assert_eq!(formatter.line_count(), 1);
    assert_eq!(tiles.len(), 10);
    assert!(tiles.windows(2).all(|w| w[0].rect.left < w[1].rect.left));
    // the space leaves one empty advance between "o" and "W"
    assert_eq!(tiles[5].rect.left - tiles[4].rect.left, 20.0);
    assert_eq!(y_bands(&tiles), 1);
}

#[test]
fn test_wrap_at_word_width() {
    let (hello, _) = laid_out("Hello", AlignX::Left, -1.0);
    let width = hello.result_width();

    let (formatter, tiles) = laid_out("Hello World", AlignX::Left, width);
    assert_eq!(formatter.line_count(), 2);
    for i in 0..5 {
        assert_eq!(tiles[i + 5].rect.bottom - tiles[i].rect.bottom, -14.0);
        assert_eq!(tiles[i + 5].rect.left, tiles[i].rect.left);
    }
}

fn longest_word(text: &str) -> f32 {
    text.split(' ')
        .map(|word| laid_out(word, AlignX::Left, -1.0).0.result_width())
        .fold(0.0, f32::max)
}

fn assert_within_width(text: &str, widths: &[f32]) {
    let longest = longest_word(text);
    for align in [AlignX::Left, AlignX::Center, AlignX::Right] {
        for &width in widths {
            let (formatter, tiles) = laid_out(text, align, width);
            let bound = f32::max(width, longest);
            assert!(
                tiles.iter().all(|t| t.rect.right <= bound),
                "{align:?}: line wider than {bound} at width {width}"
            );
            assert_eq!(y_bands(&tiles), formatter.line_count(), "{align:?} at width {width}");
        }
    }
}

#[test]
fn test_lines_stay_within_width() {
    assert_within_width("the quick brown fox jumps over the lazy dog", &[30.0, 55.0, 80.0, 200.0]);
}

#[test]
fn test_arabic_lines_stay_within_width() {
    // wraps land on tiles that also close an Arabic run or a number
    assert_within_width(
        "\u{0627}\u{0628} 12 \u{062A}\u{062B}x \u{062C}3.5 ab",
        &[30.0, 45.0, 65.0, 120.0],
    );
    assert_within_width("\u{0627}\u{0628} \u{062A}\u{062B}x", &[35.0, 55.0]);
    assert_within_width("\u{0627}12 34\u{0628}", &[35.0, 65.0]);
}

#[test]
fn test_wrapped_arabic_words_keep_line_order() {
    let (formatter, tiles) = laid_out("\u{0627}\u{0628} \u{062A}\u{062B}x", AlignX::Left, 55.0);
    assert_eq!(formatter.line_count(), 2);
    // visual order: BEH ALEF on the first line, THEH TEH x on the second
    let bottoms: Vec<f32> = tiles.iter().map(|t| t.rect.bottom).collect();
    assert_eq!(bottoms[0], bottoms[1]);
    assert!(bottoms[2] < bottoms[1]);
    assert_eq!(bottoms[2], bottoms[4]);
    assert_eq!(tiles[0].rect.left, 0.0);
    assert_eq!(tiles[2].rect.left, 0.0);
    assert!(tiles[1].uv.left < tiles[0].uv.left, "BEH was packed after ALEF");
}

#[test]
fn test_explicit_and_forced_breaks_count_bands() {
    let (formatter, tiles) = laid_out("aaa bbb\nccc ddd", AlignX::Left, 50.0);
    // one explicit break, two forced ones
    assert_eq!(formatter.line_count(), 4);
    assert_eq!(y_bands(&tiles), 4);
}

#[test]
fn test_right_alignment_with_config() {
    let atlas = atlas(256, 1);
    let mut fonts = FontSet::new(block_font(&atlas));
    let config = LayoutConfig::from_json(r#"{ "align_x": "right", "max_width": 100 }"#).unwrap();
    let mut formatter = TextFormatter::from_config(&config);
    formatter.append("ab", FontStyle::Regular, &mut fonts);
    formatter.format_with(&config);
    let tiles: Vec<Tile> = formatter.tiles().collect();
    assert_eq!(tiles[1].rect.right, 100.0);
    assert_eq!(formatter.bounding_box().right, 100.0);
}

#[test]
fn test_two_fonts_two_buckets() {
    let latin = atlas(256, 1);
    let hangul = atlas(256, 10);
    let mut fonts = FontSet::new(block_font(&latin)).with(Subset::Korean, block_font(&hangul));
    let mut formatter = TextFormatter::new();
    formatter.append("ab 한글 c", FontStyle::Regular, &mut fonts);
    formatter.format(-1.0, 0.0);

    let result = formatter.result();
    assert_eq!(result.texture_ids(), vec![TextureId(1), TextureId(10)]);
    assert_eq!(result.batch(TextureId(1)).map(|b| b.vertices.len()), Some(6 * 3));
    assert_eq!(result.batch(TextureId(10)).map(|b| b.vertices.len()), Some(6 * 2));
    assert!(result.batches.iter().all(|b| b.uvs.len() == b.vertices.len()));
}

#[test]
fn test_atlas_overflow_splits_batches() {
    // 8x10 glyphs on a 32px page: three per shelf, two shelves
    let shared = atlas(32, 1);
    let mut fonts = FontSet::new(block_font(&shared));
    let mut formatter = TextFormatter::new();
    formatter.append("abcdefgh", FontStyle::Regular, &mut fonts);
    formatter.format(-1.0, 0.0);

    let result = formatter.result();
    assert_eq!(result.texture_ids(), vec![TextureId(1), TextureId(2)]);
    assert_eq!(result.quad_count(), 8);
    assert_eq!(shared.borrow().dirty_pages().count(), 2);
}

#[test]
fn test_repeated_glyph_packed_once() {
    let shared = atlas(64, 1);
    let mut fonts = FontSet::new(block_font(&shared));
    let mut formatter = TextFormatter::new();
    formatter.append("aaaa", FontStyle::Regular, &mut fonts);
    formatter.append("aaaa", FontStyle::Bold, &mut fonts);
    assert_eq!(shared.borrow().glyph_count(), 1);
    assert_eq!(formatter.glyph_count(), 8);
}

#[test]
fn test_arabic_reversed() {
    let (_, tiles) = laid_out("\u{0627}\u{0628}\u{062A}", AlignX::Left, -1.0);
    // glyphs were packed left to right in input order, so visual order
    // shows them with decreasing U
    assert!(tiles.windows(2).all(|w| w[0].uv.left > w[1].uv.left));
    assert!(tiles.windows(2).all(|w| w[0].rect.left < w[1].rect.left));
}

#[test]
fn test_arabic_keeps_number_order() {
    let (_, tiles) = laid_out("\u{0627}\u{0627}12\u{0627}\u{0627}", AlignX::Left, -1.0);
    let slot = |u: f32| {
        tiles
            .iter()
            .find(|t| t.uv.left == u)
            .map(|t| t.rect.left)
            .unwrap()
    };
    // packed: alef at 0, "1" at 9, "2" at 18
    let one = slot(9.0 / 256.0);
    let two = slot(18.0 / 256.0);
    assert!(one < two);
    let alefs: Vec<f32> = tiles
        .iter()
        .filter(|t| t.uv.left == 0.0)
        .map(|t| t.rect.left)
        .collect();
    assert_eq!(alefs.len(), 4);
    assert!(alefs[1] < one && two < alefs[2]);
}

#[test]
fn test_bold_markup_uses_bold_face() {
    let shared = atlas(256, 1);
    let font = block_font(&shared).with_style(FontStyle::Bold, BlockFace { size: 14 });
    let mut fonts = FontSet::new(font);
    let mut formatter = TextFormatter::new();
    formatter.append_markup("a<b>a</b>", &mut fonts);
    formatter.format(-1.0, 0.0);

    let tiles: Vec<Tile> = formatter.tiles().collect();
    assert_eq!(tiles[0].rect.width(), 8.0);
    assert_eq!(tiles[1].rect.width(), 12.0);
    // bold face has the larger ascender and spacing
    assert_eq!(formatter.ascender(), 14.0);
    assert_eq!(formatter.line_spacing(), 18.0);
}

#[test]
fn test_vertical_center_box() {
    let shared = atlas(256, 1);
    let mut fonts = FontSet::new(block_font(&shared));
    let mut formatter = TextFormatter::new();
    formatter.set_alignment(AlignX::Center, AlignY::Center);
    formatter.append("ab\ncd", FontStyle::Regular, &mut fonts);
    formatter.format(100.0, 60.0);

    let bbox = formatter.bounding_box();
    assert_eq!(bbox.top, 0.5 * (28.0 - 60.0));
    assert_eq!(bbox.height(), 28.0);
    assert_eq!(bbox.right, 100.0);
}
