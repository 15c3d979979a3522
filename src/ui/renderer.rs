/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The world is continuous, the terminal is not: every terminal cell samples
/// the world at its own center. One map cell spans `CELL_W` terminal columns
/// and one terminal row. Rendering only reads the world.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::block::{Block, BlockKind};
use crate::domain::entity::Facing;
use crate::domain::tile::CellKind;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── What to draw ──

pub enum Screen<'a> {
    Title { stage: &'a str, last_error: Option<&'a str> },
    Game(&'a WorldState),
}

// ── Renderer ──

/// Terminal columns per map cell.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force a full repaint on the next frame (scene changes).
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, screen: Screen) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        match screen {
            Screen::Title { stage, last_error } => self.compose_title(stage, last_error),
            Screen::Game(world) => self.compose_game(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move || x == 0 {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_title(&mut self, stage: &str, last_error: Option<&str>) {
        let mid = self.front.height / 3;
        self.front.put_str(4, mid, "B L O C K   R U N N E R", Color::Yellow, Color::Reset);
        self.front.put_str(4, mid + 2, &format!("Stage: {stage}"), Color::White, Color::Reset);
        self.front.put_str(4, mid + 4, "[Enter] Start    [Esc] Quit", Color::DarkGrey, Color::Reset);
        if let Some(err) = last_error {
            self.front.put_str(4, mid + 6, &format!("Last load failed: {err}"), Color::Red, Color::Reset);
        }
    }

    fn compose_game(&mut self, w: &WorldState) {
        let buf_w = self.front.width;
        let chip = w.grid.chip_size();

        // ── HUD row ──
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        let hud = format!(" {}  {} ", w.stage_name, inventory_label(w));
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map (camera viewport) ──
        let view_cols = (w.camera.view_w / chip).ceil() as usize * CELL_W;
        let view_rows = (w.camera.view_h / chip).ceil() as usize;
        let sub_w = chip / CELL_W as f32;
        for vy in 0..view_rows {
            let row = MAP_ROW + vy;
            if row >= self.front.height { break; }
            let wy = w.camera.y + (vy as f32 + 0.5) * chip;
            for vx in 0..view_cols {
                if vx >= buf_w { break; }
                let wx = w.camera.x + (vx as f32 + 0.5) * sub_w;
                let cell = if player_covers(w, wx, wy) {
                    player_cell(w)
                } else {
                    map_cell(w, wx, wy, vx % CELL_W)
                };
                self.front.set(vx, row, cell);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + view_rows + 1;
        if w.at_goal() {
            let msg = if w.goal_ready() {
                " GOAL!  [Esc] Back to title "
            } else {
                " GOAL! "
            };
            self.front.put_str(0, msg_row, msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }

        // ── Help bar ──
        let help = " ←→:Move  Space:Jump  Z:Attack  X:Place  Shift+dir:Diagonal  Tab:Item";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }
}

fn inventory_label(w: &WorldState) -> String {
    let inv = &w.player.inventory;
    if inv.is_empty() {
        return "[empty]".to_string();
    }
    inv.iter()
        .map(|(kind, stack)| {
            if inv.selected() == Some(kind) {
                format!("[{}x{}]", kind.name(), stack.count)
            } else {
                format!(" {}x{} ", kind.name(), stack.count)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn player_covers(w: &WorldState, wx: f32, wy: f32) -> bool {
    let p = &w.player;
    wx >= p.left() && wx < p.right() && wy >= p.top() && wy < p.bottom()
}

fn player_cell(w: &WorldState) -> Cell {
    let ch = match w.player.facing {
        Facing::Left => '◀',
        Facing::Right => '▶',
    };
    let fg = if w.player.is_attacking() { Color::Yellow } else { Color::Cyan };
    Cell::new(ch, fg, Color::Reset)
}

fn map_cell(w: &WorldState, wx: f32, wy: f32, half: usize) -> Cell {
    let pos = w.grid.cell_of(wx, wy);
    if !w.grid.in_bounds(pos) {
        return Cell::BLANK;
    }
    if let Some(b) = w.grid.block_at(wx, wy) {
        return block_cell(b);
    }
    match w.grid.cell_at(wx, wy) {
        CellKind::Solid => Cell::new('█', Color::Grey, Color::Reset),
        CellKind::Goal => {
            Cell::new(if half == 0 { '[' } else { ']' }, Color::Green, Color::Reset)
        }
        CellKind::Empty | CellKind::Block => Cell::BLANK,
    }
}

fn block_cell(b: &Block) -> Cell {
    let fg = match b.kind() {
        BlockKind::Dirt => Color::Rgb { r: 150, g: 100, b: 50 },
        BlockKind::Wood => Color::Rgb { r: 190, g: 140, b: 70 },
        BlockKind::Stone => Color::Rgb { r: 140, g: 140, b: 150 },
        BlockKind::Iron => Color::Rgb { r: 200, g: 210, b: 230 },
    };
    if b.is_broken() {
        return Cell::new('·', fg, Color::Reset);
    }
    let ch = match b.crack_stage() {
        0 => '▓',
        1 => '▒',
        _ => '░',
    };
    Cell::new(ch, fg, Color::Reset)
}
