use glam::DVec3;
use std::time::Duration;

/// Orbit-control rotation: degrees per second for one unit of speed
const DEGREES_PER_SEC_PER_SPEED: f64 = 6.0;

/// Polar limit for the camera latitude
const MAX_CAMERA_LAT: f64 = 85.0;

/// Fraction of the smaller canvas half-extent covered by the globe at the
/// initial altitude
const FIT: f64 = 0.9;

/// Where the camera looks from: latitude/longitude of the point under the
/// centre of the view, and altitude in globe radii above the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointOfView {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

impl PointOfView {
    pub const INITIAL: Self = Self {
        lat: 20.0,
        lon: 0.0,
        altitude: 2.5,
    };
}

/// Animated transition between two points of view
#[derive(Clone, Debug)]
struct Flight {
    from: PointOfView,
    to: PointOfView,
    elapsed: Duration,
    duration: Duration,
}

/// Camera state: current point of view, auto-rotation and fly-to animation
#[derive(Clone, Debug)]
pub struct Camera {
    pov: PointOfView,
    pub auto_rotate: bool,
    rotate_speed: f64,
    flight: Option<Flight>,
    dragging: bool,
}

impl Camera {
    pub fn new(rotate_speed: f64, auto_rotate: bool) -> Self {
        Self {
            pov: PointOfView::INITIAL,
            auto_rotate,
            rotate_speed,
            flight: None,
            dragging: false,
        }
    }

    pub fn pov(&self) -> PointOfView {
        self.pov
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Animate towards `target` over `duration`
    pub fn fly_to(&mut self, target: PointOfView, duration: Duration) {
        let to = PointOfView {
            lat: target.lat.clamp(-MAX_CAMERA_LAT, MAX_CAMERA_LAT),
            ..target
        };
        if duration.is_zero() {
            self.pov = to;
            self.flight = None;
            return;
        }
        self.flight = Some(Flight {
            from: self.pov,
            to,
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// Back to the initial point of view, immediately
    pub fn reset(&mut self) {
        self.flight = None;
        self.pov = PointOfView::INITIAL;
    }

    /// Advance animations by `dt`
    pub fn tick(&mut self, dt: Duration) {
        if let Some(flight) = &mut self.flight {
            flight.elapsed += dt;
            let t = (flight.elapsed.as_secs_f64() / flight.duration.as_secs_f64()).min(1.0);
            let e = ease_cubic_in_out(t);
            let (from, to) = (flight.from, flight.to);

            self.pov = PointOfView {
                lat: from.lat + (to.lat - from.lat) * e,
                lon: wrap_lon(from.lon + shortest_lon_delta(from.lon, to.lon) * e),
                altitude: from.altitude + (to.altitude - from.altitude) * e,
            };

            if t >= 1.0 {
                self.flight = None;
            }
            return;
        }

        if self.auto_rotate && !self.dragging {
            let step = self.rotate_speed * DEGREES_PER_SEC_PER_SPEED * dt.as_secs_f64();
            self.pov.lon = wrap_lon(self.pov.lon - step);
        }
    }

    /// Start a pointer drag; any flight in progress is abandoned
    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.flight = None;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Rotate by a pixel drag so the surface follows the pointer
    pub fn drag(&mut self, dx: i32, dy: i32, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        self.pov.lon = wrap_lon(self.pov.lon - (dx as f64 / radius).to_degrees());
        self.pov.lat =
            (self.pov.lat + (dy as f64 / radius).to_degrees()).clamp(-MAX_CAMERA_LAT, MAX_CAMERA_LAT);
    }
}

/// Globe viewport using orthographic projection of a rotating sphere.
/// Orientation stored as a rotation matrix (3 column vectors) for
/// efficient point transformation.
#[derive(Clone)]
pub struct GlobeViewport {
    /// Forward direction (what points at the camera)
    forward: DVec3,
    /// Right direction
    right: DVec3,
    /// Up direction
    up: DVec3,
    /// Sphere radius in braille pixels
    pub radius: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl GlobeViewport {
    /// Build a globe viewport centered on (lon, lat) with given radius.
    pub fn new(center_lon: f64, center_lat: f64, radius: f64, width: usize, height: usize) -> Self {
        let lon_rad = center_lon.to_radians();
        let lat_rad = center_lat.to_radians();

        // Forward = direction from origin to (lon, lat) on unit sphere
        let forward = lonlat_to_vec3(center_lon, center_lat);

        // Up = derivative of forward w.r.t. latitude (points north on sphere)
        let raw_up = DVec3::new(
            -lat_rad.sin() * lon_rad.cos(),
            -lat_rad.sin() * lon_rad.sin(),
            lat_rad.cos(),
        );

        // Right = up × forward (points east), then re-orthogonalize up
        let right = raw_up.cross(forward).normalize();
        let up = forward.cross(right).normalize();

        Self { forward, right, up, radius, width, height }
    }

    /// Viewport for a camera point of view on a canvas of the given pixel size.
    /// Lower altitude means a larger globe.
    pub fn for_camera(pov: PointOfView, width: usize, height: usize) -> Self {
        let fit = width.min(height) as f64 / 2.0 * FIT;
        let scale = (1.0 + PointOfView::INITIAL.altitude) / (1.0 + pov.altitude.max(0.01));
        Self::new(pov.lon, pov.lat, fit * scale, width, height)
    }

    /// Screen position of the sphere centre
    pub fn center_px(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Project a geographic point to screen pixels.
    /// Returns `None` for back-face points (behind the visible hemisphere).
    pub fn project(&self, lon: f64, lat: f64) -> Option<(i32, i32)> {
        let p = lonlat_to_vec3(lon, lat);

        // Dot with forward: positive = front-facing
        let depth = p.dot(self.forward);
        if depth < 0.0 {
            return None;
        }

        // Orthographic: project onto right/up plane
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);

        let px = (self.width as f64 / 2.0 + sx * self.radius) as i32;
        let py = (self.height as f64 / 2.0 - sy * self.radius) as i32;

        Some((px, py))
    }

    /// Unproject screen pixels back to lon/lat.
    /// Returns `None` if the point is outside the sphere disk.
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let sx = (px as f64 - self.width as f64 / 2.0) / self.radius;
        let sy = -(py as f64 - self.height as f64 / 2.0) / self.radius;

        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }

        // Reconstruct 3D point on unit sphere
        let sz = (1.0 - r2).sqrt();
        Some(vec3_to_lonlat(self.right * sx + self.up * sy + self.forward * sz))
    }

    /// Check if a line segment might be visible (rough bounding box check).
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Unit sphere vector back to (lon, lat) in degrees
#[inline(always)]
fn vec3_to_lonlat(p: DVec3) -> (f64, f64) {
    (p.y.atan2(p.x).to_degrees(), p.z.clamp(-1.0, 1.0).asin().to_degrees())
}

/// Visit points along the great circle from (lon0, lat0) to (lon1, lat1),
/// excluding the start, in ~2° steps.
#[inline]
pub fn walk_great_circle(
    lon0: f64, lat0: f64,
    lon1: f64, lat1: f64,
    mut visitor: impl FnMut(f64, f64),
) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos(); // angular distance in radians

    // ~2° segments
    let steps = ((angle.to_degrees() / 2.0).ceil() as usize).max(1);

    if steps == 1 {
        // Short segment, just emit endpoint
        visitor(lon1, lat1);
        return;
    }

    let sin_angle = angle.sin();
    if sin_angle.abs() < 1e-10 {
        // Points are nearly identical or antipodal
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let (lon, lat) = vec3_to_lonlat(a * sa + b * sb);
        visitor(lon, lat);
    }
}

/// Shortest signed longitude change from `from` to `to`, in (-180, 180]
#[inline]
fn shortest_lon_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Wrap longitude into [-180, 180)
#[inline]
fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[inline]
fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_project_center() {
        let vp = GlobeViewport::new(0.0, 20.0, 40.0, 100, 100);
        let (x, y) = vp.project(0.0, 20.0).unwrap();
        assert!((x - 50).abs() <= 1 && (y - 50).abs() <= 1);
    }

    #[test]
    fn test_back_face_hidden() {
        let vp = GlobeViewport::new(0.0, 0.0, 40.0, 100, 100);
        assert_eq!(vp.project(180.0, 0.0), None);
        assert!(vp.project(90.0, 0.0).is_some());
    }

    #[test]
    fn test_east_is_right_north_is_up() {
        let vp = GlobeViewport::new(0.0, 0.0, 40.0, 100, 100);
        let (ex, ey) = vp.project(30.0, 0.0).unwrap();
        let (nx, ny) = vp.project(0.0, 30.0).unwrap();
        assert!(ex > 60 && (ey - 50).abs() <= 1);
        assert!(ny < 40 && (nx - 50).abs() <= 1);
    }

    #[test]
    fn test_east_of_centre_unprojects_east() {
        let vp = GlobeViewport::new(0.0, 0.0, 40.0, 100, 100);
        let (lon, lat) = vp.unproject(70, 50).unwrap();
        assert!(lon > 0.0, "pixel right of centre gave lon {lon}");
        assert!(lat.abs() < 1.0);
        let (_, lat) = vp.unproject(50, 30).unwrap();
        assert!(lat > 0.0);
    }

    #[test]
    fn test_project_unproject_agree() {
        let vp = GlobeViewport::new(15.0, 25.0, 60.0, 200, 200);
        for (lon, lat) in [(30.0, 40.0), (-10.0, 10.0), (50.0, 0.0)] {
            let (px, py) = vp.project(lon, lat).unwrap();
            let (ulon, ulat) = vp.unproject(px, py).unwrap();
            assert!((ulon - lon).abs() < 3.0 && (ulat - lat).abs() < 3.0, "{lon},{lat} -> {ulon},{ulat}");
        }
    }

    #[test]
    fn test_unproject_center_and_outside() {
        let vp = GlobeViewport::new(10.0, -20.0, 40.0, 100, 100);
        let (lon, lat) = vp.unproject(50, 50).unwrap();
        assert!((lon - 10.0).abs() < 0.01 && (lat + 20.0).abs() < 0.01);
        assert_eq!(vp.unproject(0, 0), None);
    }

    #[test]
    fn test_lower_altitude_is_bigger() {
        let far = GlobeViewport::for_camera(PointOfView::INITIAL, 200, 100);
        let near = GlobeViewport::for_camera(
            PointOfView { altitude: 1.5, ..PointOfView::INITIAL },
            200,
            100,
        );
        assert!(approx(far.radius, 45.0));
        assert!(near.radius > far.radius);
    }

    #[test]
    fn test_fly_to_reaches_target() {
        let mut camera = Camera::new(0.25, true);
        let target = PointOfView { lat: -10.0, lon: 40.0, altitude: 1.5 };
        camera.fly_to(target, Duration::from_millis(1200));
        camera.tick(Duration::from_millis(600));
        assert!(camera.is_flying());
        let mid = camera.pov();
        assert!(mid.lon > 0.0 && mid.lon < 40.0);
        camera.tick(Duration::from_millis(700));
        assert!(!camera.is_flying());
        assert_eq!(camera.pov(), target);
    }

    #[test]
    fn test_fly_to_takes_short_way_round() {
        let mut camera = Camera::new(0.0, false);
        camera.fly_to(PointOfView { lat: 0.0, lon: 170.0, altitude: 2.5 }, Duration::ZERO);
        camera.fly_to(PointOfView { lat: 0.0, lon: -170.0, altitude: 2.5 }, Duration::from_secs(1));
        camera.tick(Duration::from_millis(500));
        let lon = camera.pov().lon;
        assert!(lon >= 170.0 || lon <= -170.0, "went the long way: {lon}");
    }

    #[test]
    fn test_auto_rotate_moves_and_pauses_while_dragging() {
        let mut camera = Camera::new(0.25, true);
        camera.tick(Duration::from_secs(2));
        assert!(approx(camera.pov().lon, -3.0));

        camera.begin_drag();
        camera.tick(Duration::from_secs(2));
        assert!(approx(camera.pov().lon, -3.0));
        camera.end_drag();

        camera.auto_rotate = false;
        camera.tick(Duration::from_secs(2));
        assert!(approx(camera.pov().lon, -3.0));
    }

    #[test]
    fn test_drag_moves_surface_with_pointer() {
        let mut camera = Camera::new(0.0, false);
        let grabbed = camera.pov();
        camera.begin_drag();
        camera.drag(10, -8, 40.0);
        let pov = camera.pov();
        let vp = GlobeViewport::new(pov.lon, pov.lat, 40.0, 100, 100);
        let (x, y) = vp.project(grabbed.lon, grabbed.lat).unwrap();
        assert!(x > 55, "grabbed point at x={x}");
        assert!(y < 45, "grabbed point at y={y}");
    }

    #[test]
    fn test_drag_clamps_latitude() {
        let mut camera = Camera::new(0.0, false);
        camera.begin_drag();
        camera.drag(0, 10_000, 10.0);
        assert!(approx(camera.pov().lat, MAX_CAMERA_LAT));
        camera.reset();
        assert_eq!(camera.pov(), PointOfView::INITIAL);
    }

    #[test]
    fn test_wrap_and_delta() {
        assert!(approx(wrap_lon(190.0), -170.0));
        assert!(approx(wrap_lon(-181.0), 179.0));
        assert!(approx(shortest_lon_delta(170.0, -170.0), 20.0));
        assert!(approx(shortest_lon_delta(-170.0, 170.0), -20.0));
    }
}
