use std::time::Duration;

use crate::country::{CountryFeature, CountryId};
use crate::data::LoadResult;
use crate::error::LoadError;
use crate::map::{Camera, CountryIndex, GlobeRenderer, GlobeViewport, PointOfView, PolygonClick};

/// Length of the selection overlay's entrance animation
pub const ENTRANCE: Duration = Duration::from_millis(500);

/// Camera re-centre after a click
const FOCUS_FLIGHT: Duration = Duration::from_millis(1200);
const FOCUS_ALTITUDE: f64 = 1.5;

/// Loading lifecycle of the country data
pub enum LoadState {
    /// Waiting for the one load attempt
    Loading,
    /// Countries available for display and selection
    Loaded {
        countries: Vec<CountryFeature>,
        index: CountryIndex,
    },
    /// The load attempt failed; the globe is shown without countries
    Failed { reason: LoadError },
}

/// The country whose name is shown in the overlay
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub id: CountryId,
    pub name: String,
    /// App clock when this selection first appeared
    pub shown_at: Duration,
}

impl Selection {
    fn of(country: &CountryFeature, now: Duration) -> Self {
        Self {
            id: country.id.clone(),
            name: country.name.clone(),
            shown_at: now,
        }
    }

    /// 0.0 when just shown, 1.0 once the entrance has finished
    pub fn entrance_progress(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.shown_at);
        (elapsed.as_secs_f64() / ENTRANCE.as_secs_f64()).min(1.0)
    }
}

/// Application state
pub struct App {
    pub state: LoadState,
    pub selection: Option<Selection>,
    pub camera: Camera,
    pub should_quit: bool,
    /// Globe canvas size in braille pixels
    pub width: usize,
    pub height: usize,
    /// Time since start, advanced by `tick`
    pub clock: Duration,
    /// Current mouse position for the hover tooltip
    pub mouse_pos: Option<(u16, u16)>,
    /// Where the left button went down
    press: Option<(u16, u16)>,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    dragged: bool,
}

impl App {
    pub fn new(width: usize, height: usize, camera: Camera) -> Self {
        let mut app = Self {
            state: LoadState::Loading,
            selection: None,
            camera,
            should_quit: false,
            width: 0,
            height: 0,
            clock: Duration::ZERO,
            mouse_pos: None,
            press: None,
            last_mouse: None,
            dragged: false,
        };
        app.resize(width, height);
        app
    }

    /// Update canvas size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        // Braille gives 2x4 resolution per character
        // Account for border (2 chars horizontal, 2 chars vertical plus status bar)
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.width = inner_width * 2;
        self.height = inner_height * 4;
    }

    /// Take the result of the load attempt. Only the first result counts.
    pub fn finish_loading(&mut self, result: LoadResult) {
        if !self.is_loading() {
            tracing::warn!("ignoring load result that arrived after loading finished");
            return;
        }

        self.state = match result {
            Ok(countries) => {
                tracing::info!(countries = countries.len(), "globe ready");
                let index = CountryIndex::build(&countries);
                LoadState::Loaded { countries, index }
            }
            Err(reason) => {
                tracing::error!(error = %reason, "showing globe without countries");
                LoadState::Failed { reason }
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Loaded countries; empty while loading or after a failure
    pub fn countries(&self) -> &[CountryFeature] {
        match &self.state {
            LoadState::Loaded { countries, .. } => countries,
            _ => &[],
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Renderer over the current country list
    pub fn renderer(&self) -> GlobeRenderer<'_> {
        match &self.state {
            LoadState::Loaded { countries, index } => GlobeRenderer::new(countries, index),
            _ => GlobeRenderer::empty(),
        }
    }

    pub fn viewport(&self) -> GlobeViewport {
        GlobeViewport::for_camera(self.camera.pov(), self.width, self.height)
    }

    /// Advance clocks and camera animation
    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;
        self.camera.tick(dt);
    }

    /// Show `country` in the overlay.
    ///
    /// Selecting the country that is already shown keeps its entrance time,
    /// so the animation only replays when the selection actually changes.
    pub fn select_country(&mut self, country: &CountryFeature) {
        self.apply_selection(Selection::of(country, self.clock));
    }

    fn apply_selection(&mut self, selection: Selection) {
        if self.selection.as_ref().is_some_and(|s| s.id == selection.id) {
            return;
        }
        tracing::debug!(id = %selection.id, name = %selection.name, "country selected");
        self.selection = Some(selection);
    }

    /// Select the clicked country and re-centre the camera on the click
    pub fn handle_polygon_click(&mut self, click: PolygonClick) {
        let selection = match self.countries().get(click.country) {
            Some(country) => Selection::of(country, self.clock),
            None => return,
        };
        self.apply_selection(selection);
        self.camera.fly_to(
            PointOfView {
                lat: click.lat,
                lon: click.lon,
                altitude: FOCUS_ALTITUDE,
            },
            FOCUS_FLIGHT,
        );
    }

    /// Click at a terminal position
    pub fn click(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixel(col, row);
        let click = self.renderer().pick(&self.viewport(), px, py);
        if let Some(click) = click {
            self.handle_polygon_click(click);
        }
    }

    /// Left button down
    pub fn press(&mut self, col: u16, row: u16) {
        self.press = Some((col, row));
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Mouse drag - rotates the globe so the surface follows the pointer
    pub fn drag_to(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            if (last_col, last_row) != (col, row) {
                if !self.dragged {
                    self.camera.begin_drag();
                    self.dragged = true;
                }
                let dx = (col as i32 - last_col as i32) * 2;
                let dy = (row as i32 - last_row as i32) * 4;
                let radius = self.viewport().radius;
                self.camera.drag(dx, dy, radius);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Left button up; a press without movement is a click
    pub fn release(&mut self, col: u16, row: u16) {
        let was_click = self.press.is_some() && !self.dragged;
        self.camera.end_drag();
        self.press = None;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row);
        }
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Country under the mouse, for the hover tooltip
    pub fn hovered_country(&self) -> Option<&CountryFeature> {
        if self.dragged {
            return None;
        }
        let (col, row) = self.mouse_pos?;
        let (px, py) = to_pixel(col, row);
        let click = self.renderer().pick(&self.viewport(), px, py)?;
        self.countries().get(click.country)
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.camera.auto_rotate = !self.camera.auto_rotate;
    }

    /// Back to the initial point of view; the data is not reloaded
    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let pov = self.camera.pov();
        format!(
            "{:.1}°{}, {:.1}°{}",
            pov.lat.abs(),
            if pov.lat >= 0.0 { "N" } else { "S" },
            pov.lon.abs(),
            if pov.lon >= 0.0 { "E" } else { "W" }
        )
    }
}

/// Terminal cell to the braille pixel at its centre.
/// Account for border (1 cell offset)
fn to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2 + 1;
    let py = (row.saturating_sub(1) as i32) * 4 + 2;
    (px, py)
}
