//! Annotated image rendering
//!
//! Thin presentation layer: draws detection and section rectangles onto a
//! copy of the analyzed image. Section geometry translates from reference
//! coordinates back into the image's native space; detections draw at the
//! positions the detector reported.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::analysis::misplacement::MisplacedItem;
use crate::detect::DetectedItem;
use crate::geometry::{BoundingBox, ReferenceTransform};
use crate::planogram::PlanogramSection;

const CORRECT_COLOR: Rgba<u8> = Rgba([0, 200, 0, 255]);
const MISPLACED_COLOR: Rgba<u8> = Rgba([220, 0, 0, 255]);
const SECTION_COLOR: Rgba<u8> = Rgba([0, 80, 220, 255]);

/// Draw detections and section boundaries onto a copy of the image.
///
/// Correctly placed items draw in green, misplaced items in red with a
/// heavier border, section regions in blue.
pub fn annotate(
    image: &DynamicImage,
    items: &[DetectedItem],
    misplaced: &[MisplacedItem],
    sections: &[PlanogramSection],
) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let transform = ReferenceTransform::for_image(image.width(), image.height());

    for section in sections {
        let region = transform.to_original(section.region);
        draw_box(&mut canvas, region, SECTION_COLOR, 1);
    }

    for item in items {
        let is_misplaced = misplaced
            .iter()
            .any(|m| m.item.original_bbox == item.original_bbox && m.item.class_name == item.class_name);
        if is_misplaced {
            draw_box(&mut canvas, item.original_bbox, MISPLACED_COLOR, 3);
        } else {
            draw_box(&mut canvas, item.original_bbox, CORRECT_COLOR, 2);
        }
    }

    canvas
}

/// Draw a hollow rectangle with the given border thickness, clipped to the
/// canvas.
fn draw_box(canvas: &mut RgbaImage, bbox: BoundingBox, color: Rgba<u8>, thickness: u32) {
    let (w, h) = canvas.dimensions();
    let x1 = bbox.x1.max(0.0) as i32;
    let y1 = bbox.y1.max(0.0) as i32;
    let x2 = (bbox.x2.min(w as f32 - 1.0)) as i32;
    let y2 = (bbox.y2.min(h as f32 - 1.0)) as i32;

    if x2 <= x1 || y2 <= y1 {
        return;
    }

    for t in 0..thickness as i32 {
        let width = x2 - x1 - 2 * t;
        let height = y2 - y1 - 2 * t;
        if width < 1 || height < 1 {
            break;
        }
        let rect = Rect::at(x1 + t, y1 + t).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
    use crate::planogram::PlanogramConfig;

    fn item(bbox: BoundingBox) -> DetectedItem {
        DetectedItem {
            class_id: 0,
            class_name: "cereal_box".to_string(),
            confidence: 0.9,
            bbox,
            original_bbox: bbox,
            polygon: None,
            original_polygon: None,
            mask: None,
            section_id: None,
        }
    }

    #[test]
    fn test_annotate_draws_item_border() {
        let image = DynamicImage::new_rgb8(REFERENCE_WIDTH, REFERENCE_HEIGHT);
        let items = vec![item(BoundingBox::new(100.0, 100.0, 200.0, 200.0))];

        let canvas = annotate(&image, &items, &[], &[]);
        assert_eq!(canvas.get_pixel(150, 100), &CORRECT_COLOR);
        // Interior untouched
        assert_eq!(canvas.get_pixel(150, 150).0[3], 255);
        assert_ne!(canvas.get_pixel(150, 150), &CORRECT_COLOR);
    }

    #[test]
    fn test_annotate_marks_misplaced_red() {
        let image = DynamicImage::new_rgb8(REFERENCE_WIDTH, REFERENCE_HEIGHT);
        let items = vec![item(BoundingBox::new(100.0, 100.0, 200.0, 200.0))];
        let misplaced = vec![MisplacedItem {
            item: items[0].clone(),
            expected_section: "S1".to_string(),
            actual_section: None,
            distance: 10.0,
        }];

        let canvas = annotate(&image, &items, &misplaced, &[]);
        assert_eq!(canvas.get_pixel(150, 100), &MISPLACED_COLOR);
    }

    #[test]
    fn test_annotate_sections_and_offscreen_boxes() {
        // A small image: section regions in reference space translate back,
        // and boxes falling outside the canvas are skipped without panicking
        let image = DynamicImage::new_rgb8(200, 200);
        let items = vec![item(BoundingBox::new(500.0, 500.0, 600.0, 600.0))];
        let config = PlanogramConfig::sample();

        let canvas = annotate(&image, &items, &[], &config.sections);
        assert_eq!(canvas.dimensions(), (200, 200));
    }
}
