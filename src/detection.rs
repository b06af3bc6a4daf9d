use image::{GrayImage, Luma, RgbaImage};
use tracing::debug;

use crate::geometry::BoundingBox;

/// Default sum of neighbour differences above which a pixel is an edge
pub const EDGE_THRESHOLD: u32 = 100;

/// Default margin added around the detected edges
pub const BOUNDARY_PADDING: u32 = 10;

/// Value marking an edge pixel in an [`EdgeMap`]
pub const EDGE: u8 = 255;

/// Binary edge classification, one byte per source pixel (0 or 255)
pub type EdgeMap = GrayImage;

/// Offsets of the eight neighbours around a pixel
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Classify interior pixels by local intensity discontinuity.
pub fn build_edge_map(img: &RgbaImage) -> EdgeMap {
    build_edge_map_with_threshold(img, EDGE_THRESHOLD)
}

/// Classify interior pixels, marking those whose summed absolute difference
/// to their eight neighbours exceeds `threshold`.
///
/// Only the red channel is inspected. Border pixels are never edges.
pub fn build_edge_map_with_threshold(img: &RgbaImage, threshold: u32) -> EdgeMap {
    let (width, height) = img.dimensions();
    let mut edges = GrayImage::new(width, height);

    if width < 3 || height < 3 {
        return edges;
    }

    let data = img.as_raw();
    let stride = width as i64 * 4;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y as i64 * stride + x as i64 * 4;
            let center = data[idx as usize] as i32;

            let strength: u32 = NEIGHBOURS
                .iter()
                .map(|&(dx, dy)| {
                    let neighbour = data[(idx + dy * stride + dx * 4) as usize] as i32;
                    (center - neighbour).unsigned_abs()
                })
                .sum();

            if strength > threshold {
                edges.put_pixel(x, y, Luma([EDGE]));
            }
        }
    }

    edges
}

/// Find the padded bounding box of all edge pixels.
///
/// When the map holds no edge at all the inverted box
/// `{min: (W, H), max: (0, 0)}` is returned unpadded; callers detect it with
/// [`BoundingBox::is_degenerate`].
pub fn locate_boundary(edges: &EdgeMap, padding: u32) -> BoundingBox {
    let (width, height) = edges.dimensions();
    let mut bounds = BoundingBox::inverted(width, height);
    let mut count = 0usize;

    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] == EDGE {
            bounds.min_x = bounds.min_x.min(x);
            bounds.max_x = bounds.max_x.max(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_y = bounds.max_y.max(y);
            count += 1;
        }
    }

    if count == 0 {
        debug!(width, height, "No edge pixels found");
        return bounds;
    }

    debug!(
        edge_pixels = count,
        min_x = bounds.min_x,
        min_y = bounds.min_y,
        max_x = bounds.max_x,
        max_y = bounds.max_y,
        "Edge extent"
    );

    bounds.pad_and_clamp(padding, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn split_raster(width: u32, height: u32, split: u32, left: u8, right: u8) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            let v = if x < split { left } else { right };
            Rgba([v, v, v, 255])
        })
    }

    fn edge_columns(edges: &EdgeMap) -> Vec<u32> {
        let mut columns: Vec<u32> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == EDGE)
            .map(|(x, _, _)| x)
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    #[test]
    fn test_flat_raster_has_no_edges() {
        let img = RgbaImage::from_pixel(20, 15, Rgba([120, 40, 200, 255]));
        let edges = build_edge_map(&img);
        assert_eq!(edges.dimensions(), (20, 15));
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_vertical_boundary_edges() {
        let img = split_raster(100, 100, 50, 255, 0);
        let edges = build_edge_map(&img);

        assert_eq!(edge_columns(&edges), vec![49, 50]);
        for y in 1..99 {
            assert_eq!(edges.get_pixel(49, y)[0], EDGE);
            assert_eq!(edges.get_pixel(50, y)[0], EDGE);
        }
    }

    #[test]
    fn test_border_pixels_never_edges() {
        // Checkerboard: every interior pixel is an edge
        let img = RgbaImage::from_fn(12, 9, |x, y| {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            Rgba([v, 0, 0, 255])
        });
        let edges = build_edge_map(&img);
        let (w, h) = edges.dimensions();

        for (x, y, p) in edges.enumerate_pixels() {
            let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            assert_eq!(p[0] == EDGE, !border, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_only_red_channel_is_inspected() {
        let img = RgbaImage::from_fn(10, 10, |x, _| {
            let v = if x < 5 { 255 } else { 0 };
            Rgba([0, v, v, 255])
        });
        assert!(build_edge_map(&img).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_threshold_is_strict() {
        // Center differs by 25 from 4 neighbours: strength exactly 100
        let img = RgbaImage::from_fn(3, 3, |x, y| {
            let v = if x == 1 && y == 1 {
                25
            } else if x == 1 || y == 1 {
                0
            } else {
                25
            };
            Rgba([v, 0, 0, 255])
        });
        assert_eq!(build_edge_map(&img).get_pixel(1, 1)[0], 0);
        assert_eq!(build_edge_map_with_threshold(&img, 99).get_pixel(1, 1)[0], EDGE);
    }

    #[test]
    fn test_tiny_raster_has_no_interior() {
        let img = RgbaImage::from_fn(2, 5, |x, _| Rgba([x as u8 * 255, 0, 0, 255]));
        assert!(build_edge_map(&img).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_boundary_scenario() {
        let img = split_raster(100, 100, 50, 255, 0);
        let bounds = locate_boundary(&build_edge_map(&img), BOUNDARY_PADDING);
        assert_eq!(bounds, BoundingBox::new(39, 0, 60, 100));
    }

    #[test]
    fn test_boundary_encloses_all_edges() {
        let img = RgbaImage::from_fn(60, 40, |x, y| {
            let inside = (15..45).contains(&x) && (10..30).contains(&y);
            let v = if inside { 230 } else { 20 };
            Rgba([v, v, v, 255])
        });
        let edges = build_edge_map(&img);
        let raw = locate_boundary(&edges, 0);

        for (x, y, p) in edges.enumerate_pixels() {
            if p[0] == EDGE {
                assert!(raw.min_x <= x && x <= raw.max_x);
                assert!(raw.min_y <= y && y <= raw.max_y);
            }
        }
        assert_eq!(raw, BoundingBox::new(14, 9, 45, 30));
    }

    #[test]
    fn test_single_edge_pixel_clamps_to_frame() {
        let mut edges = GrayImage::new(5, 5);
        edges.put_pixel(2, 2, Luma([EDGE]));
        let bounds = locate_boundary(&edges, BOUNDARY_PADDING);
        assert_eq!(bounds, BoundingBox::full_frame(5, 5));
    }

    #[test]
    fn test_padding_never_leaves_raster() {
        for (w, h) in [(3, 3), (7, 4), (25, 12), (64, 64)] {
            let img = RgbaImage::from_fn(w, h, |x, y| Rgba([((x * 37 + y * 91) % 256) as u8, 0, 0, 255]));
            let bounds = locate_boundary(&build_edge_map(&img), BOUNDARY_PADDING);
            if !bounds.is_degenerate() {
                assert!(bounds.fits_within(w, h));
            }
        }
    }

    #[test]
    fn test_no_edges_gives_inverted_box() {
        let img = RgbaImage::from_pixel(8, 6, Rgba([255, 255, 255, 255]));
        let bounds = locate_boundary(&build_edge_map(&img), BOUNDARY_PADDING);
        assert_eq!(bounds, BoundingBox::inverted(8, 6));
        assert!(bounds.max_x < bounds.min_x);
        assert!(bounds.is_degenerate());
    }
}
