use crate::app::App;
use crate::braille::{glyph, BrailleCanvas};
use crate::map::{palette, GlobeLayers, GlobeViewport};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
    Frame,
};

const TITLE: &str = "Interactive 3D Globe";
const SUBTITLE: &str = "Click on a country to see its name.";
const LOADING: &str = "Loading Globe...";

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Nothing but the placeholder until the load attempt finishes
    if app.is_loading() {
        render_loading(frame, app, area);
        return;
    }

    // Split into globe area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let inner = render_globe(frame, app, chunks[0]);
    render_header(frame, inner);
    render_tooltip(frame, app, inner);
    render_selection(frame, app, inner);
    render_status_bar(frame, app, chunks[1]);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1), Constraint::Fill(1)])
        .split(area);

    // Pulse once a second
    let mut style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    if (app.clock.as_millis() / 1000) % 2 == 1 {
        style = style.add_modifier(Modifier::DIM);
    }

    let placeholder = Paragraph::new(Span::styled(LOADING, style)).alignment(Alignment::Center);
    frame.render_widget(placeholder, rows[1]);
}

/// Draw the bordered globe and return the inner area
fn render_globe(frame: &mut Frame, app: &App, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World Globe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let viewport = GlobeViewport::for_camera(
        app.camera.pov(),
        inner.width as usize * 2,
        inner.height as usize * 4,
    );
    let layers = app
        .renderer()
        .render(inner.width as usize, inner.height as usize, &viewport);

    frame.render_widget(GlobeWidget { layers }, inner);
    inner
}

/// Custom widget that renders the braille globe layers
struct GlobeWidget {
    layers: GlobeLayers,
}

impl GlobeWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        Self::render_cells(canvas, area, buf, |bits, _, _| (bits, color));
    }

    /// Visit every non-empty cell of `canvas` that fits in `area`
    fn render_cells(
        canvas: &BrailleCanvas,
        area: Rect,
        buf: &mut Buffer,
        mut style: impl FnMut(u8, usize, usize) -> (u8, Color),
    ) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                let bits = canvas.cell_bits(col, row);
                // Skip empty braille characters (U+2800)
                if bits == 0 {
                    continue;
                }
                let (bits, color) = style(bits, col, row);
                let x = area.x + col as u16;
                let y = area.y + row as u16;
                buf[(x, y)].set_char(glyph(bits)).set_fg(color);
            }
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layers = &self.layers;

        // Back to front: sky, grid, rim, countries, borders
        Self::render_layer(&layers.stars, palette::STARS, area, buf);
        Self::render_layer(&layers.graticule, palette::GRATICULE, area, buf);
        Self::render_layer(&layers.sphere, palette::SPHERE, area, buf);

        Self::render_cells(&layers.fills, area, buf, |bits, col, row| {
            (bits, palette::slot_color(layers.fills.tint(col, row)))
        });

        // Borders keep the fill's dots so cells stay solid
        Self::render_cells(&layers.borders, area, buf, |bits, col, row| {
            (bits | layers.fills.cell_bits(col, row), palette::STROKE)
        });
    }
}

/// Fixed title in the top-left corner of the globe
fn render_header(frame: &mut Frame, inner: Rect) {
    let width = (SUBTITLE.len() as u16 + 1).min(inner.width);
    let height = 2.min(inner.height);
    let area = Rect::new(inner.x, inner.y, width, height);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(header, area);
}

/// Name of the hovered country next to the pointer
fn render_tooltip(frame: &mut Frame, app: &App, inner: Rect) {
    let (Some(country), Some((col, row))) = (app.hovered_country(), app.mouse_pos) else {
        return;
    };

    let text = format!(" {} ", country.name);
    let width = (Line::from(text.as_str()).width() as u16).min(inner.width);
    let x = (col + 2).min(inner.right().saturating_sub(width)).max(inner.x);
    let y = row.clamp(inner.y, inner.bottom().saturating_sub(1));
    let area = Rect::new(x, y, width, 1);

    let style = Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(0x1f, 0x29, 0x37))
        .add_modifier(Modifier::BOLD);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
}

/// Overlay with the selected country's name, bottom-left
fn render_selection(frame: &mut Frame, app: &App, inner: Rect) {
    let Some(selection) = &app.selection else {
        return;
    };
    if inner.height < 5 || inner.width < 6 {
        return;
    }

    let progress = selection.entrance_progress(app.clock);

    // Entrance: starts one row low and dim, then settles
    let offset = if progress < 0.5 { 1 } else { 0 };
    let mut style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    if progress < 0.6 {
        style = style.add_modifier(Modifier::DIM);
    }

    let name_width = Line::from(selection.name.as_str()).width() as u16;
    let width = (name_width + 4).min(inner.width - 2);
    let y = inner.bottom() - 4 + offset;
    let area = Rect::new(inner.x + 2, y, width, 3);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Span::styled(selection.name.as_str(), style)).block(block),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Countries: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.renderer().polygon_count().to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
    ];

    // Failure replaces the coordinates so it is never cut off
    if let Some(error) = app.load_error() {
        spans.push(Span::styled(
            error.user_message(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(
            app.center_coords(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let rotate_color = if app.camera.auto_rotate {
        Color::Green
    } else {
        Color::DarkGray
    };
    spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled("a:rotate", Style::default().fg(rotate_color)));
    spans.push(Span::styled(
        " drag:spin r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app, three_countries, CENTRE, TERM};
    use crate::error::LoadError;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(TERM.0 as u16, TERM.1 as u16)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_loading_shows_only_placeholder() {
        let screen = draw(&app());
        assert!(screen.contains(LOADING));
        assert!(!screen.contains(TITLE));
        assert!(!screen.contains("Countries:"));
    }

    #[test]
    fn test_loaded_shows_globe_and_header() {
        let mut app = app();
        app.finish_loading(Ok(three_countries()));
        let screen = draw(&app);
        assert!(!screen.contains(LOADING));
        assert!(screen.contains(TITLE));
        assert!(screen.contains(SUBTITLE));
        assert!(screen.contains("Countries: 3"));
        assert!(screen.contains('⣿'));
    }

    #[test]
    fn test_fill_uses_cap_color_of_position() {
        let mut app = app();
        app.finish_loading(Ok(three_countries()));
        let mut terminal = Terminal::new(TestBackend::new(TERM.0 as u16, TERM.1 as u16)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        // Centre cell of the globe is inside Borea, position 1
        let cell = &terminal.backend().buffer()[(CENTRE.0, CENTRE.1)];
        assert_eq!(cell.fg, palette::cap_color(1));
    }

    #[test]
    fn test_clicked_country_name_in_overlay() {
        let mut app = app();
        app.finish_loading(Ok(three_countries()));
        app.press(CENTRE.0, CENTRE.1);
        app.release(CENTRE.0, CENTRE.1);
        app.tick(Duration::from_secs(1));
        let screen = draw(&app);
        assert!(screen.contains("Borea"));
        assert!(!screen.contains("Alba"));
    }

    #[test]
    fn test_new_selection_replaces_overlay() {
        let mut app = app();
        let countries = three_countries();
        app.finish_loading(Ok(countries.clone()));
        app.select_country(&countries[0]);
        app.select_country(&countries[2]);
        let screen = draw(&app);
        assert!(screen.contains("Cresh"));
        assert!(!screen.contains("Alba"));
    }

    #[test]
    fn test_failed_load_shows_empty_globe_without_overlay() {
        let mut app = app();
        app.finish_loading(Err(LoadError::Status(500)));
        app.press(CENTRE.0, CENTRE.1);
        app.release(CENTRE.0, CENTRE.1);
        let screen = draw(&app);
        assert!(!screen.contains(LOADING));
        assert!(screen.contains(TITLE));
        assert!(screen.contains("Countries: 0"));
        assert!(screen.contains("Could not download country data."));
        assert!(!screen.contains("Borea"));
    }

    #[test]
    fn test_malformed_data_looks_like_failed_download() {
        let mut app = app();
        app.finish_loading(Err(LoadError::Parse("expected value".into())));
        let screen = draw(&app);
        assert!(screen.contains("Countries: 0"));
        assert!(screen.contains("Country data could not be read."));
    }

    #[test]
    fn test_hover_tooltip() {
        let mut app = app();
        app.finish_loading(Ok(three_countries()));
        app.set_mouse_pos(CENTRE.0, CENTRE.1);
        let screen = draw(&app);
        assert!(screen.contains(" Borea "));
    }
}
