//! Text rendering and stdin commands for the terminal client.

use client::render::{Brush, Surface, grid_size};
use glam::{IVec2, UVec2, Vec2};
use protocol::AdminCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// A [`Surface`] that rasterizes onto a character grid, one character per
/// game cell.
pub struct TextSurface {
    size: UVec2,
    cell_size: f32,
    grid: UVec2,
    cells: Vec<char>,
}

impl TextSurface {
    pub const EMPTY: char = ' ';

    pub fn new(size: UVec2, cell_size: f32) -> Self {
        let grid = grid_size(size, cell_size);
        Self {
            size,
            cell_size,
            grid,
            cells: vec![Self::EMPTY; (grid.x * grid.y) as usize],
        }
    }

    /// Grid dimensions in cells.
    pub fn grid(&self) -> UVec2 {
        self.grid
    }

    /// Character at grid cell `(x, y)`, if inside the grid.
    pub fn at(&self, x: i32, y: i32) -> Option<char> {
        self.index(IVec2::new(x, y)).map(|i| self.cells[i])
    }

    /// The whole grid, framed.
    pub fn frame(&self) -> String {
        let width = self.grid.x as usize;
        let border = format!("+{}+", "-".repeat(width));
        let mut out = String::with_capacity((width + 3) * (self.grid.y as usize + 2));
        out.push_str(&border);
        out.push('\n');
        for row in self.cells.chunks(width.max(1)) {
            out.push('|');
            out.extend(row.iter());
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        let in_grid = cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.grid.x && (cell.y as u32) < self.grid.y;
        in_grid.then(|| (cell.y as u32 * self.grid.x + cell.x as u32) as usize)
    }

    fn to_cell(&self, p: Vec2) -> IVec2 {
        (p / self.cell_size).floor().as_ivec2()
    }

    fn plot(&mut self, cell: IVec2, glyph: char) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = glyph;
        }
    }
}

fn body_glyph(brush: Brush) -> char {
    match brush {
        Brush::Item => '*',
        Brush::Own => 'o',
        Brush::Other => '+',
    }
}

fn head_glyph(brush: Brush) -> char {
    match brush {
        Brush::Item => '*',
        Brush::Own => '@',
        Brush::Other => 'X',
    }
}

/// Grid cells on the segment from `a` to `b`, both ends included, that fall
/// inside a `grid`-sized area. Only the steps that can reach the grid are
/// walked, so distant endpoints cost no more than a short segment.
fn line_cells(a: IVec2, b: IVec2, grid: UVec2) -> Vec<IVec2> {
    let start = a.as_i64vec2();
    let delta = b.as_i64vec2() - start;
    let steps = delta.x.abs().max(delta.y.abs());

    let (mut lo, mut hi) = (0_i64, steps);
    if steps > 0 {
        for (origin, d, len) in [(start.x, delta.x, grid.x), (start.y, delta.y, grid.y)] {
            if d == 0 {
                if !(0..i64::from(len)).contains(&origin) {
                    return Vec::new();
                }
                continue;
            }
            // Steps at which this axis crosses the outer half-cell edges of
            // the grid, in half cells, widened by one for rounding.
            let edge = |twice_c: i64| {
                (i128::from(twice_c - 2 * origin) * i128::from(steps)).div_euclid(2 * i128::from(d))
            };
            let (e0, e1) = (edge(-1), edge(2 * i64::from(len) - 1));
            let first = i64::try_from(e0.min(e1) - 1).unwrap_or(i64::MIN);
            let last = i64::try_from(e0.max(e1) + 1).unwrap_or(i64::MAX);
            lo = lo.max(first);
            hi = hi.min(last);
        }
    }

    let in_grid = |x: i64, y: i64| (0..i64::from(grid.x)).contains(&x) && (0..i64::from(grid.y)).contains(&y);
    (lo..=hi)
        .filter_map(|i| {
            let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
            let x = start.x + (delta.x as f64 * t).round() as i64;
            let y = start.y + (delta.y as f64 * t).round() as i64;
            in_grid(x, y).then(|| IVec2::new(x as i32, y as i32))
        })
        .collect()
}

impl Surface for TextSurface {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn clear(&mut self) {
        self.cells.fill(Self::EMPTY);
    }

    fn fill_cell(&mut self, origin: Vec2, _size: f32, brush: Brush) {
        // Nudge inside the cell so float error cannot push it to a neighbour
        let cell = self.to_cell(origin + Vec2::splat(self.cell_size / 2.0));
        self.plot(cell, body_glyph(brush));
    }

    fn stroke_path(&mut self, points: &[Vec2], _width: f32, brush: Brush) {
        let cells: Vec<IVec2> = points.iter().map(|&p| self.to_cell(p)).collect();
        let glyph = body_glyph(brush);
        match cells.as_slice() {
            [] => {}
            [only] => self.plot(*only, glyph),
            _ => {
                for pair in cells.windows(2) {
                    for cell in line_cells(pair[0], pair[1], self.grid) {
                        self.plot(cell, glyph);
                    }
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, _radius: f32, brush: Brush) {
        let cell = self.to_cell(center);
        self.plot(cell, head_glyph(brush));
    }
}

/// A line typed on stdin, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A key name as the input router understands it.
    Key(String),
    Admin(AdminCommand),
    Quit,
}

/// Parse one stdin line.
///
/// `:spawn`, `:reset`, `:kick` send admin commands and `:q` quits. The words
/// `up`, `down`, `left`, `right` stand for the arrow keys. Anything else is
/// taken character by character, so `wwd` is three key presses.
pub fn parse_line(line: &str) -> Vec<Command> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(':') {
        return match rest.trim() {
            "q" | "quit" => vec![Command::Quit],
            name => AdminCommand::from_name(name).map(Command::Admin).into_iter().collect(),
        };
    }

    line.split_whitespace()
        .flat_map(|word| match word {
            "up" => vec![Command::Key("ArrowUp".to_string())],
            "down" => vec![Command::Key("ArrowDown".to_string())],
            "left" => vec![Command::Key("ArrowLeft".to_string())],
            "right" => vec![Command::Key("ArrowRight".to_string())],
            _ => word.chars().map(|c| Command::Key(c.to_string())).collect(),
        })
        .collect()
}

/// Read stdin lines on a background task. The channel closes at end of input.
pub fn spawn_command_reader() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            for command in parse_line(&line) {
                if tx.send(command).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::game::Synchronizer;
    use client::render::Renderer;

    #[test]
    fn test_scenario_frame() {
        let mut sync = Synchronizer::new();
        sync.apply_text(r#"{"type":"init","playerId":"p1"}"#).unwrap();
        sync.apply_text(
            r#"{"type":"update","snakes":{"p1":{"cells":[{"x":5,"y":5},{"x":4,"y":5},{"x":4,"y":6}]},"p2":{"cells":[{"x":20,"y":3},{"x":20,"y":4}]},"p3":{"cells":[]}},"food":[{"x":10,"y":10}],"state":"active"}"#,
        )
        .unwrap();

        let mut surface = TextSurface::new(UVec2::new(900, 540), 18.0);
        assert_eq!(surface.grid(), UVec2::new(50, 30));
        let stats = Renderer::new(18.0).render(sync.world(), &mut surface);
        assert_eq!(stats.creatures, 2);

        assert_eq!(surface.at(5, 5), Some('@'));
        assert_eq!(surface.at(4, 5), Some('o'));
        assert_eq!(surface.at(4, 6), Some('o'));
        assert_eq!(surface.at(20, 3), Some('X'));
        assert_eq!(surface.at(20, 4), Some('+'));
        assert_eq!(surface.at(10, 10), Some('*'));
        assert_eq!(surface.at(0, 0), Some(' '));
        assert_eq!(surface.at(50, 0), None);

        let frame = surface.frame();
        assert_eq!(frame.lines().count(), 32);
        assert!(frame.lines().all(|l| l.chars().count() == 52));
    }

    #[test]
    fn test_clear_between_frames() {
        let mut surface = TextSurface::new(UVec2::new(90, 90), 18.0);
        surface.fill_cell(Vec2::new(18.0, 18.0), 18.0, Brush::Item);
        assert_eq!(surface.at(1, 1), Some('*'));
        surface.clear();
        assert_eq!(surface.at(1, 1), Some(' '));
    }

    #[test]
    fn test_line_cells_fill_gaps() {
        let grid = UVec2::new(10, 10);
        let cells = line_cells(IVec2::new(0, 0), IVec2::new(3, 0), grid);
        assert_eq!(cells, [IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(2, 0), IVec2::new(3, 0)]);
        assert_eq!(line_cells(IVec2::new(2, 2), IVec2::new(2, 2), grid), [IVec2::new(2, 2)]);
        assert!(line_cells(IVec2::new(12, 2), IVec2::new(12, 2), grid).is_empty());
    }

    #[test]
    fn test_line_cells_clip_distant_segments() {
        let grid = UVec2::new(50, 30);
        let cells = line_cells(IVec2::new(0, 3), IVec2::new(100_000_000, 3), grid);
        assert_eq!(cells.len(), 50);
        assert_eq!(cells.first(), Some(&IVec2::new(0, 3)));
        assert_eq!(cells.last(), Some(&IVec2::new(49, 3)));

        let cells = line_cells(IVec2::new(i32::MAX, 0), IVec2::new(i32::MIN, 0), grid);
        assert_eq!(cells.len(), 50);
        assert!(cells.iter().all(|c| c.y == 0));

        assert!(line_cells(IVec2::new(-5, -5), IVec2::new(-5, -2_000_000_000), grid).is_empty());
        assert!(line_cells(IVec2::new(60, 0), IVec2::new(2_000_000_000, 0), grid).is_empty());
    }

    #[test]
    fn test_far_apart_cells_render() {
        let mut sync = Synchronizer::new();
        sync.apply_text(r#"{"type":"init","playerId":"p1"}"#).unwrap();
        sync.apply_text(
            r#"{"type":"update","snakes":{"p1":{"cells":[{"x":-2000000000,"y":0},{"x":2000000000,"y":0}]},"p2":{"cells":[{"x":3,"y":-2000000000},{"x":3,"y":2000000000}]}},"food":[],"state":"active"}"#,
        )
        .unwrap();

        let mut surface = TextSurface::new(UVec2::new(900, 540), 18.0);
        Renderer::new(18.0).render(sync.world(), &mut surface);
        assert_eq!(surface.at(0, 0), Some('o'));
        assert_eq!(surface.at(49, 0), Some('o'));
        assert_eq!(surface.at(3, 29), Some('+'));
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("wd"),
            [Command::Key("w".into()), Command::Key("d".into())]
        );
        assert_eq!(parse_line(" up left "), [Command::Key("ArrowUp".into()), Command::Key("ArrowLeft".into())]);
        assert_eq!(parse_line(":spawn"), [Command::Admin(AdminCommand::SpawnFood)]);
        assert_eq!(parse_line(":resetGame"), [Command::Admin(AdminCommand::ResetGame)]);
        assert_eq!(parse_line(":q"), [Command::Quit]);
        assert!(parse_line(":nope").is_empty());
        assert!(parse_line("").is_empty());
    }
}
