use std::collections::HashMap;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use heatmap_cat_core::{
    Cell, CellDetails, ClickOutcome, Grid, HeatmapSelector, Navigator, SelectionPhase, TimeRange,
};
use heatmap_cat_protocol::{Fill, OverlayId, Rect, RenderCommand, SharedStr, ThemeToken};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect as TermRect,
    style::{Color, Style},
    widgets::{Block, Paragraph},
};

/// Terminal columns per heatmap cell; two keeps cells roughly square.
const COLS_PER_CELL: i32 = 2;

/// Navigator that just keeps the committed range for `main` to print.
#[derive(Debug, Default)]
pub struct Picked(Option<TimeRange>);

impl Navigator for Picked {
    fn navigate(&mut self, range: TimeRange) {
        self.0 = Some(range);
    }
}

/// Retained copy of what the selector has drawn.
#[derive(Default)]
struct Scene {
    fills: HashMap<SharedStr, Fill>,
    overlays: HashMap<OverlayId, (Rect, ThemeToken, f32)>,
}

impl Scene {
    fn apply(&mut self, commands: Vec<RenderCommand>) {
        for cmd in commands {
            match cmd {
                RenderCommand::DrawOverlay {
                    id,
                    rect,
                    color,
                    opacity,
                } => {
                    self.overlays.insert(id, (rect, color, opacity));
                }
                RenderCommand::RemoveOverlay { id } => {
                    self.overlays.remove(&id);
                }
                RenderCommand::SetFill { cell, fill } => {
                    self.fills.insert(cell, fill);
                }
            }
        }
    }
}

/// Maps heatmap pixels to terminal cells: one heatmap cell becomes
/// `COLS_PER_CELL` columns by one row.
struct Projection {
    origin_x: i32,
    origin_y: i32,
    unit_w: i32,
    unit_h: i32,
    area: TermRect,
}

impl Projection {
    fn new(grid: &Grid, area: TermRect) -> Self {
        let cells: Vec<_> = grid.selectable().collect();
        let min = |f: fn(&Cell) -> i32| cells.iter().map(|&c| f(c)).min();
        Self {
            origin_x: min(|c| c.x).unwrap_or(0),
            origin_y: min(|c| c.y).unwrap_or(0),
            unit_w: min(|c| c.width).unwrap_or(1).max(1),
            unit_h: min(|c| c.height).unwrap_or(1).max(1),
            area,
        }
    }

    /// Terminal rectangle covering a pixel rectangle, clipped to the area.
    ///
    /// Widened to `i64` so far-off cells clip instead of overflowing.
    fn to_term(&self, rect: Rect) -> Option<TermRect> {
        let (x, w) = (i64::from(rect.x), i64::from(rect.w));
        let (y, h) = (i64::from(rect.y), i64::from(rect.h));
        let (origin_x, origin_y) = (i64::from(self.origin_x), i64::from(self.origin_y));
        let cols = i64::from(COLS_PER_CELL);
        let (unit_w, unit_h) = (i64::from(self.unit_w), i64::from(self.unit_h));

        let col0 = (x - origin_x) * cols / unit_w;
        let col1 = (x + w - origin_x) * cols / unit_w;
        let row0 = (y - origin_y) / unit_h;
        let row1 = (y + h - origin_y) / unit_h;
        let clip_w = i64::from(self.area.width);
        let clip_h = i64::from(self.area.height);
        let (col0, col1) = (col0.clamp(0, clip_w), col1.clamp(0, clip_w));
        let (row0, row1) = (row0.clamp(0, clip_h), row1.clamp(0, clip_h));
        if col1 <= col0 || row1 <= row0 {
            return None;
        }
        Some(TermRect::new(
            self.area.x + col0 as u16,
            self.area.y + row0 as u16,
            (col1 - col0) as u16,
            (row1 - row0) as u16,
        ))
    }

    /// Heatmap pixel under a terminal position. `None` past the right or
    /// bottom edge of pixel space.
    fn to_pixel(&self, column: u16, row: u16) -> Option<(i32, i32)> {
        if !self.area.contains((column, row).into()) {
            return None;
        }
        let col = i64::from(column - self.area.x);
        let row = i64::from(row - self.area.y);
        let x = i64::from(self.origin_x)
            + col * i64::from(self.unit_w) / i64::from(COLS_PER_CELL);
        let y = i64::from(self.origin_y) + row * i64::from(self.unit_h);
        Some((i32::try_from(x).ok()?, i32::try_from(y).ok()?))
    }
}

fn term_color(fill: Fill) -> Color {
    let c = fill.resolve();
    Color::Rgb(c.r, c.g, c.b)
}

fn blend(under: Color, token: ThemeToken, opacity: f32) -> Color {
    let Color::Rgb(r, g, b) = under else {
        return under;
    };
    let over = token.color();
    let mix = |a: u8, b: u8| {
        (f32::from(a) * (1.0 - opacity) + f32::from(b) * opacity).round() as u8
    };
    Color::Rgb(mix(r, over.r), mix(g, over.g), mix(b, over.b))
}

/// Status line state shown under the heatmap.
enum Status {
    Hint,
    Error(String),
}

pub fn run(mut selector: HeatmapSelector<Picked>) -> Result<Option<TimeRange>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut selector);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    selector: &mut HeatmapSelector<Picked>,
) -> Result<Option<TimeRange>> {
    let mut scene = Scene::default();
    let mut status = Status::Hint;

    loop {
        let size = terminal.size()?;
        let content = TermRect::new(0, 1, size.width, size.height.saturating_sub(2));
        let projection = Projection::new(selector.grid(), content);
        let status_line = match &status {
            Status::Error(msg) => Paragraph::new(format!(" {msg}"))
                .style(Style::default().fg(term_color(ThemeToken::ErrorText.into()))),
            Status::Hint => Paragraph::new(hint(selector)),
        };

        terminal.draw(|frame| {
            let area = frame.area();
            let header = Block::default()
                .title(" heatmap.cat | click start, click end | Esc reset | q quit ")
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, TermRect::new(0, 0, area.width, 1));

            let buf = frame.buffer_mut();
            for cell in selector.grid().selectable() {
                let Some(target) = projection.to_term(cell.rect()) else {
                    continue;
                };
                let fill = scene.fills.get(&cell.id).copied().unwrap_or(cell.fill);
                buf.set_style(target, Style::default().bg(term_color(fill)));
            }
            for (rect, token, opacity) in scene.overlays.values() {
                let Some(target) = projection.to_term(*rect) else {
                    continue;
                };
                for y in target.top()..target.bottom() {
                    for x in target.left()..target.right() {
                        let cell = &mut buf[(x, y)];
                        let bg = blend(cell.bg, *token, *opacity);
                        cell.set_bg(bg);
                    }
                }
            }

            let status_area = TermRect::new(0, area.height.saturating_sub(1), area.width, 1);
            frame.render_widget(status_line, status_area);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => return Ok(None),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(None);
                }
                KeyCode::Esc => {
                    selector.reset();
                    status = Status::Hint;
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                let hit = projection
                    .to_pixel(mouse.column, mouse.row)
                    .and_then(|(x, y)| selector.grid().hit_test(x, y))
                    .map(|c| c.id.clone());
                match (mouse.kind, hit) {
                    (MouseEventKind::Moved, Some(id)) => {
                        if selector.hovered().map(|c| &c.id) != Some(&id) {
                            selector.on_hover(&id)?;
                        }
                    }
                    (MouseEventKind::Moved, None) => selector.on_hover_exit(),
                    (MouseEventKind::Down(MouseButton::Left), Some(id)) => {
                        match selector.on_click(&id, None) {
                            Ok(ClickOutcome::Committed(range)) => {
                                log::info!("selected {range}");
                                return Ok(selector.navigator().0);
                            }
                            Ok(_) => status = Status::Hint,
                            Err(e) => status = Status::Error(e.to_string()),
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        scene.apply(selector.take_commands());
    }
}

fn hint(selector: &HeatmapSelector<Picked>) -> String {
    let hovered = selector
        .hovered()
        .and_then(|c| c.details.as_deref())
        .and_then(|d| CellDetails::parse(d).ok())
        .map(|d| format!(" | {d}"))
        .unwrap_or_default();
    match selector.phase() {
        SelectionPhase::Idle => format!(" click a start cell{hovered}"),
        SelectionPhase::StartSelected { start_time, .. } => {
            format!(" start {start_time}, click an end cell{hovered}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_cat_core::SelectorOptions;
    use heatmap_cat_protocol::Color as Rgb;

    fn grid() -> Grid {
        let cell = |id: &str, x: i32, y: i32| Cell {
            id: id.into(),
            x,
            y,
            width: 8,
            height: 8,
            fill: Fill::Color(Rgb::rgb(255, 231, 212)),
            details: None,
        };
        match Grid::new(
            vec![cell("a", 10, 20), cell("b", 18, 20), cell("c", 10, 28)],
            SelectorOptions::default(),
        ) {
            Ok(grid) => grid,
            Err(e) => unreachable!("{e}"),
        }
    }

    #[test]
    fn cells_map_to_two_columns_one_row() {
        let p = Projection::new(&grid(), TermRect::new(0, 1, 80, 20));
        assert_eq!(p.to_term(Rect::new(18, 28, 8, 8)), Some(TermRect::new(2, 2, 2, 1)));
        // Zero-height overlays are not drawn.
        assert_eq!(p.to_term(Rect::new(10, 20, 8, 0)), None);
    }

    #[test]
    fn terminal_positions_hit_the_right_cell() {
        let g = grid();
        let p = Projection::new(&g, TermRect::new(0, 1, 80, 20));
        let hit = |col, row| {
            p.to_pixel(col, row)
                .and_then(|(x, y)| g.hit_test(x, y))
                .map(|c| c.id.to_string())
        };
        assert_eq!(hit(0, 1).as_deref(), Some("a"));
        assert_eq!(hit(3, 1).as_deref(), Some("b"));
        assert_eq!(hit(1, 2).as_deref(), Some("c"));
        assert_eq!(hit(0, 0), None);
    }

    #[test]
    fn far_off_cells_clip_instead_of_overflowing() {
        let far = Cell {
            id: "far".into(),
            x: i32::MAX - 8,
            y: i32::MAX - 8,
            width: 8,
            height: 8,
            fill: Fill::Color(Rgb::rgb(255, 231, 212)),
            details: None,
        };
        let mut cells = grid().cells;
        cells.push(far);
        let g = match Grid::new(cells, SelectorOptions::default()) {
            Ok(g) => g,
            Err(e) => unreachable!("{e}"),
        };
        let p = Projection::new(&g, TermRect::new(0, 1, 80, 20));
        assert_eq!(p.to_term(Rect::new(i32::MAX - 8, i32::MAX - 8, 8, 8)), None);

        // A single cell of huge units: terminal positions past i32 range miss.
        let huge = Cell {
            id: "huge".into(),
            x: 0,
            y: 0,
            width: i32::MAX,
            height: i32::MAX,
            fill: Fill::Color(Rgb::rgb(255, 231, 212)),
            details: None,
        };
        let g = match Grid::new(vec![huge], SelectorOptions::default()) {
            Ok(g) => g,
            Err(e) => unreachable!("{e}"),
        };
        let p = Projection::new(&g, TermRect::new(0, 1, 80, 20));
        assert_eq!(p.to_pixel(0, 1), Some((0, 0)));
        assert_eq!(p.to_pixel(0, 3), None);
    }

    #[test]
    fn overlay_tints_toward_token() {
        let tinted = blend(Color::Rgb(255, 255, 255), ThemeToken::SelectionOverlay, 0.2);
        assert_eq!(tinted, Color::Rgb(234, 204, 234));
        assert_eq!(blend(Color::Reset, ThemeToken::SelectionOverlay, 0.2), Color::Reset);
    }
}
