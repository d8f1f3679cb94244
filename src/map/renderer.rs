use rayon::prelude::*;

use crate::braille::BrailleCanvas;
use crate::country::CountryFeature;
use crate::map::geometry::{draw_circle_outline, draw_line};
use crate::map::globe::{walk_great_circle, GlobeViewport};
use crate::map::palette;
use crate::map::spatial::CountryIndex;

/// Graticule spacing in degrees
const GRATICULE_STEP: i32 = 30;

/// Fraction of background cells that carry a star
const STAR_DENSITY: f64 = 0.015;

/// Rendered globe, one canvas per color layer
pub struct GlobeLayers {
    pub stars: BrailleCanvas,
    pub graticule: BrailleCanvas,
    pub sphere: BrailleCanvas,
    /// Country fills; each cell's tint is a palette slot
    pub fills: BrailleCanvas,
    pub borders: BrailleCanvas,
}

/// A click that landed on a country
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonClick {
    /// Position of the country in the rendered list
    pub country: usize,
    pub lat: f64,
    pub lon: f64,
}

/// Draws countries on the globe and resolves clicks back to countries.
///
/// Borrows the loaded country list; an empty list renders the bare globe.
pub struct GlobeRenderer<'a> {
    countries: &'a [CountryFeature],
    index: Option<&'a CountryIndex>,
}

impl<'a> GlobeRenderer<'a> {
    pub fn new(countries: &'a [CountryFeature], index: &'a CountryIndex) -> Self {
        Self {
            countries,
            index: Some(index),
        }
    }

    /// Globe with no polygons
    pub fn empty() -> Self {
        Self {
            countries: &[],
            index: None,
        }
    }

    /// Number of country polygons this renderer draws
    pub fn polygon_count(&self) -> usize {
        self.countries.len()
    }

    /// Position of the country under a geographic point
    #[inline]
    pub fn country_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.index?.locate(self.countries, lon, lat)
    }

    /// Resolve a braille pixel to the country drawn there
    pub fn pick(&self, viewport: &GlobeViewport, px: i32, py: i32) -> Option<PolygonClick> {
        let (lon, lat) = viewport.unproject(px, py)?;
        let country = self.country_at(lon, lat)?;
        Some(PolygonClick { country, lat, lon })
    }

    /// Render all layers for a canvas of `width` x `height` characters
    pub fn render(&self, width: usize, height: usize, viewport: &GlobeViewport) -> GlobeLayers {
        let mut layers = GlobeLayers {
            stars: BrailleCanvas::new(width, height),
            graticule: BrailleCanvas::new(width, height),
            sphere: BrailleCanvas::new(width, height),
            fills: BrailleCanvas::new(width, height),
            borders: BrailleCanvas::new(width, height),
        };

        self.draw_stars(&mut layers.stars, viewport);
        draw_graticule(&mut layers.graticule, viewport);
        let (cx, cy) = viewport.center_px();
        draw_circle_outline(&mut layers.sphere, cx, cy, viewport.radius);

        if !self.countries.is_empty() {
            self.draw_fills(&mut layers.fills, viewport);
            self.draw_borders(&mut layers.borders, viewport);
        }

        layers
    }

    /// Hit-test every pixel inside the disk; rows run in parallel
    fn draw_fills(&self, canvas: &mut BrailleCanvas, viewport: &GlobeViewport) {
        let width = (canvas.width() * 2).min(viewport.width);
        let height = (canvas.height() * 4).min(viewport.height);

        let rows: Vec<Vec<(usize, u8)>> = (0..height)
            .into_par_iter()
            .map(|py| {
                let mut row = Vec::new();
                for px in 0..width {
                    if let Some(click) = self.pick(viewport, px as i32, py as i32) {
                        row.push((px, palette::slot(click.country)));
                    }
                }
                row
            })
            .collect();

        for (py, row) in rows.into_iter().enumerate() {
            for (px, slot) in row {
                canvas.set_pixel_tinted(px, py, slot);
            }
        }
    }

    fn draw_borders(&self, canvas: &mut BrailleCanvas, viewport: &GlobeViewport) {
        for country in self.countries {
            for ring in country.rings() {
                draw_ring(canvas, ring, viewport);
            }
        }
    }

    /// Deterministic starfield outside the globe disk
    fn draw_stars(&self, canvas: &mut BrailleCanvas, viewport: &GlobeViewport) {
        let (cx, cy) = viewport.center_px();
        let r2 = viewport.radius * viewport.radius;
        for row in 0..canvas.height() {
            for col in 0..canvas.width() {
                let seed = cell_seed(col as u64, row as u64);
                if unit_interval(seed) >= STAR_DENSITY {
                    continue;
                }
                // Pick one of the 8 dots in the cell
                let dot = (seed >> 8) as usize % 8;
                let px = col * 2 + dot % 2;
                let py = row * 4 + dot / 2;
                let dx = px as f64 - cx;
                let dy = py as f64 - cy;
                if dx * dx + dy * dy > r2 {
                    canvas.set_pixel(px, py);
                }
            }
        }
    }
}

/// Stable per-cell seed so the starfield does not flicker between frames
#[inline(always)]
fn cell_seed(col: u64, row: u64) -> u64 {
    let mut h = col.wrapping_mul(0x9e37_79b9).rotate_left(17) ^ row.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 15;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 13)
}

/// splitmix64 finaliser mapped to [0, 1)
#[inline(always)]
fn unit_interval(seed: u64) -> f64 {
    let mut x = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64
}

/// Draw a ring along great-circle subdivisions, skipping hidden segments
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(f64, f64)], viewport: &GlobeViewport) {
    for pair in ring.windows(2) {
        let (lon0, lat0) = pair[0];
        let (lon1, lat1) = pair[1];

        // Antimeridian cut edges are not real borders
        if lon0.abs() >= 179.99 && lon1.abs() >= 179.99 {
            continue;
        }

        let mut prev = viewport.project(lon0, lat0);
        walk_great_circle(lon0, lat0, lon1, lat1, |lon, lat| {
            let next = viewport.project(lon, lat);
            if let (Some(a), Some(b)) = (prev, next) {
                if viewport.line_might_be_visible(a, b) {
                    draw_line(canvas, a.0, a.1, b.0, b.1);
                }
            }
            prev = next;
        });
    }
}

/// Meridians and parallels every `GRATICULE_STEP` degrees
fn draw_graticule(canvas: &mut BrailleCanvas, viewport: &GlobeViewport) {
    for lon in (-180..180).step_by(GRATICULE_STEP as usize) {
        let lon = lon as f64;
        let meridian: Vec<(f64, f64)> = (-80..=80).step_by(10).map(|lat| (lon, lat as f64)).collect();
        draw_ring(canvas, &meridian, viewport);
    }
    for lat in (-60..=60).step_by(GRATICULE_STEP as usize) {
        let lat = lat as f64;
        let parallel: Vec<(f64, f64)> = (-180..=180).step_by(10).map(|lon| (lon as f64, lat)).collect();
        draw_ring(canvas, &parallel, viewport);
    }
}
