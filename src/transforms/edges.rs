//! Edge-emphasis transform.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;

/// Canny edge map thickened by one dilation pass.
///
/// On severely faded prints the module boundaries sometimes survive where
/// the fill does not; the dilation rejoins broken edge fragments into
/// strokes wide enough for a decoder to lock onto.
pub fn edge_map(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let edges = canny(image, low, high);
    dilate(&edges, Norm::LInf, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_map_marks_boundary_not_fill() {
        let image = GrayImage::from_fn(40, 40, |x, y| {
            image::Luma([if (10..30).contains(&x) && (10..30).contains(&y) {
                0
            } else {
                255
            }])
        });
        let out = edge_map(&image, 50.0, 150.0);
        assert_eq!(out.dimensions(), (40, 40));
        // The square's border shows up, its interior and the far
        // background stay empty.
        assert_eq!(out.get_pixel(10, 20)[0], 255);
        assert_eq!(out.get_pixel(20, 20)[0], 0);
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn test_edge_map_flat_image_is_empty() {
        let image = GrayImage::from_pixel(30, 30, image::Luma([128]));
        let out = edge_map(&image, 50.0, 150.0);
        assert!(out.pixels().all(|p| p[0] == 0));
    }
}
