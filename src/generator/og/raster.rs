//! SVG → PNG: parse with usvg, rasterize with resvg, encode with image.

use super::OgError;
use super::layout::{HEIGHT, WIDTH};
use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia;
use std::io::Cursor;

pub fn render_png(svg: &str, options: &usvg::Options) -> Result<Vec<u8>, OgError> {
    let tree = usvg::Tree::from_str(svg, options).map_err(|e| OgError::Svg(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(WIDTH, HEIGHT).ok_or(OgError::Raster)?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // Premultiplied, but every card is opaque so the values are unchanged
    let image = RgbaImage::from_raw(WIDTH, HEIGHT, pixmap.take()).ok_or(OgError::Raster)?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shapes() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630"><rect width="1200" height="630" fill="#0b0c0e"/></svg>"##;
        let png = render_png(svg, &usvg::Options::default()).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(decoded.get_pixel(10, 10).0, [0x0b, 0x0c, 0x0e, 0xff]);
    }

    #[test]
    fn test_invalid_svg() {
        let err = render_png("<svg", &usvg::Options::default()).unwrap_err();
        assert!(matches!(err, OgError::Svg(_)));
    }
}
