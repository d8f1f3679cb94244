use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a circle outline as a closed polyline
pub fn draw_circle_outline(canvas: &mut BrailleCanvas, cx: f64, cy: f64, radius: f64) {
    // Enough segments that each spans roughly two pixels
    let segments = ((radius * std::f64::consts::TAU / 2.0).ceil() as usize).clamp(16, 2048);
    let point = |i: usize| {
        let angle = i as f64 / segments as f64 * std::f64::consts::TAU;
        (
            (cx + angle.cos() * radius).round() as i32,
            (cy + angle.sin() * radius).round() as i32,
        )
    };

    let mut prev = point(0);
    for i in 1..=segments {
        let next = point(i);
        draw_line(canvas, prev.0, prev.1, next.0, next.1);
        prev = next;
    }
}

/// Even-odd ray casting test in the lon/lat plane
#[inline]
pub fn point_in_ring(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_circle_outline_leaves_centre_empty() {
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_circle_outline(&mut canvas, 20.0, 20.0, 16.0);
        assert_eq!(canvas.cell_bits(10, 5), 0);
        assert_ne!(canvas.cell_bits(2, 5), 0);
    }

    #[test]
    fn test_point_in_ring() {
        let triangle = [(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (0.0, 0.0)];
        assert!(point_in_ring(&triangle, 5.0, 3.0));
        assert!(!point_in_ring(&triangle, 9.0, 9.0));
        assert!(!point_in_ring(&triangle, -1.0, 1.0));
    }

    #[test]
    fn test_degenerate_ring_contains_nothing() {
        assert!(!point_in_ring(&[(0.0, 0.0), (1.0, 1.0)], 0.5, 0.5));
    }
}
