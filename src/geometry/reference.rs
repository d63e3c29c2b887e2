//! Reference coordinate space
//!
//! All section geometry, drawn regions and detector output are compared in a
//! single fixed-size pixel frame: 1080x1440 portrait, matching the aspect
//! ratio of the shelf photographs the detector is tuned for. An image of any
//! size maps into this frame by uniform scale-to-fit plus centering offsets
//! (letterboxing), so geometry stays comparable across image sizes.

use super::{BoundingBox, Point};

/// Width of the reference frame in pixels
pub const REFERENCE_WIDTH: u32 = 1080;
/// Height of the reference frame in pixels
pub const REFERENCE_HEIGHT: u32 = 1440;

/// Transformation between an image's native pixel space and the reference frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceTransform {
    /// Uniform scale applied to the original image
    pub scale: f32,
    /// Horizontal centering offset in reference pixels
    pub offset_x: f32,
    /// Vertical centering offset in reference pixels
    pub offset_y: f32,
    /// Original width after scaling
    pub scaled_width: u32,
    /// Original height after scaling
    pub scaled_height: u32,
}

impl ReferenceTransform {
    /// Compute the transform for an image of the given native size.
    ///
    /// The caller guarantees non-degenerate dimensions; the engine rejects
    /// zero-sized images before any geometry work.
    pub fn for_image(width: u32, height: u32) -> Self {
        let scale_w = REFERENCE_WIDTH as f32 / width as f32;
        let scale_h = REFERENCE_HEIGHT as f32 / height as f32;
        // Uniform scale preserving aspect ratio
        let scale = scale_w.min(scale_h);

        // Rounding can land exactly on the frame edge; never past it.
        let scaled_width = ((width as f32 * scale).round() as u32).min(REFERENCE_WIDTH);
        let scaled_height = ((height as f32 * scale).round() as u32).min(REFERENCE_HEIGHT);

        let offset_x = ((REFERENCE_WIDTH - scaled_width) / 2) as f32;
        let offset_y = ((REFERENCE_HEIGHT - scaled_height) / 2) as f32;

        Self {
            scale,
            offset_x,
            offset_y,
            scaled_width,
            scaled_height,
        }
    }

    /// Map a point from original image space into the reference frame
    pub fn point_to_reference(&self, point: Point) -> Point {
        Point::new(
            (point.x * self.scale).round() + self.offset_x,
            (point.y * self.scale).round() + self.offset_y,
        )
    }

    /// Map a point from the reference frame back into original image space
    pub fn point_to_original(&self, point: Point) -> Point {
        Point::new(
            ((point.x - self.offset_x) / self.scale).round(),
            ((point.y - self.offset_y) / self.scale).round(),
        )
    }

    /// Map a bounding box from original image space into the reference frame
    pub fn to_reference(&self, bbox: BoundingBox) -> BoundingBox {
        let p1 = self.point_to_reference(Point::new(bbox.x1, bbox.y1));
        let p2 = self.point_to_reference(Point::new(bbox.x2, bbox.y2));
        BoundingBox::new(p1.x, p1.y, p2.x, p2.y)
    }

    /// Map a bounding box from the reference frame back into original image space
    pub fn to_original(&self, bbox: BoundingBox) -> BoundingBox {
        let p1 = self.point_to_original(Point::new(bbox.x1, bbox.y1));
        let p2 = self.point_to_original(Point::new(bbox.x2, bbox.y2));
        BoundingBox::new(p1.x, p1.y, p2.x, p2.y)
    }
}

/// Convert a box drawn on a display canvas into reference coordinates.
///
/// Two stages: canvas pixels rescale linearly to original-image pixels, then
/// the ordinary image-to-reference transform applies. Used when section
/// regions are drawn on a resized display surface.
pub fn canvas_to_reference(
    canvas_box: BoundingBox,
    canvas_size: (u32, u32),
    image_size: (u32, u32),
) -> BoundingBox {
    let (canvas_w, canvas_h) = canvas_size;
    let (image_w, image_h) = image_size;

    let scale_x = image_w as f32 / canvas_w as f32;
    let scale_y = image_h as f32 / canvas_h as f32;

    let original = BoundingBox::new(
        canvas_box.x1 * scale_x,
        canvas_box.y1 * scale_y,
        canvas_box.x2 * scale_x,
        canvas_box.y2 * scale_y,
    );

    ReferenceTransform::for_image(image_w, image_h).to_reference(original)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sized_image_is_identity() {
        let t = ReferenceTransform::for_image(REFERENCE_WIDTH, REFERENCE_HEIGHT);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.offset_x, 0.0);
        assert_eq!(t.offset_y, 0.0);

        let bbox = BoundingBox::new(100.0, 200.0, 300.0, 400.0);
        assert_eq!(t.to_reference(bbox), bbox);
    }

    #[test]
    fn test_wide_image_letterboxes_vertically() {
        // 2160x1440 scales by 0.5 to 1080x720, centered vertically
        let t = ReferenceTransform::for_image(2160, 1440);
        assert!((t.scale - 0.5).abs() < 1e-6);
        assert_eq!(t.scaled_width, 1080);
        assert_eq!(t.scaled_height, 720);
        assert_eq!(t.offset_x, 0.0);
        assert_eq!(t.offset_y, 360.0);
    }

    #[test]
    fn test_tall_image_letterboxes_horizontally() {
        // 540x1440 keeps height, centers horizontally
        let t = ReferenceTransform::for_image(540, 1440);
        assert!((t.scale - 1.0).abs() < 1e-6);
        assert_eq!(t.offset_x, 270.0);
        assert_eq!(t.offset_y, 0.0);
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let sizes = [(640, 480), (1920, 1080), (1080, 1440), (3024, 4032), (333, 777)];
        let bbox = BoundingBox::new(17.0, 23.0, 311.0, 457.0);

        for (w, h) in sizes {
            let t = ReferenceTransform::for_image(w, h);
            let back = t.to_original(t.to_reference(bbox));
            assert!((back.x1 - bbox.x1).abs() <= 1.0, "{}x{} x1: {}", w, h, back.x1);
            assert!((back.y1 - bbox.y1).abs() <= 1.0, "{}x{} y1: {}", w, h, back.y1);
            assert!((back.x2 - bbox.x2).abs() <= 1.0, "{}x{} x2: {}", w, h, back.x2);
            assert!((back.y2 - bbox.y2).abs() <= 1.0, "{}x{} y2: {}", w, h, back.y2);
        }
    }

    #[test]
    fn test_canvas_to_reference_half_size_canvas() {
        // Canvas at half the image size: canvas coords double before the
        // image-to-reference transform applies.
        let canvas_box = BoundingBox::new(10.0, 20.0, 110.0, 220.0);
        let result = canvas_to_reference(canvas_box, (540, 720), (1080, 1440));
        assert_eq!(result, BoundingBox::new(20.0, 40.0, 220.0, 440.0));
    }
}
