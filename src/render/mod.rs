use std::io::{self, Write};

use bracket_geometry::prelude::Point;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::{ecs::EcsWorld, map::Occupant};

pub const PROMPT: &str = "Player's turn. Enter a command (e.g., move, attack):";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub symbol: char,
    pub color: Color,
}

impl Glyph {
    const fn new(symbol: char, color: Color) -> Self {
        Self { symbol, color }
    }
}

/// One full redraw: header line, the room top row first, then the log lines
/// drained for this turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub header: String,
    pub rows: Vec<Vec<Glyph>>,
    pub log: Vec<String>,
    pub prompt: Option<&'static str>,
}

impl Frame {
    pub fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

#[cfg(test)]
impl Frame {
    /// The room as bare text, each glyph followed by a space.
    pub fn map_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            for glyph in row {
                text.push(glyph.symbol);
                text.push(' ');
            }
            text.push('\n');
        }
        text
    }

    pub fn to_plain_text(&self) -> String {
        let mut text = format!("{}\n", self.header);
        text.push_str(&self.map_text());
        for line in &self.log {
            text.push_str(line);
            text.push('\n');
        }
        if let Some(prompt) = self.prompt {
            text.push_str(prompt);
            text.push('\n');
        }
        text
    }
}

/// Snapshot the room into a frame. Rows run from y = height-1 down to 0.
pub fn compose(world: &EcsWorld, header: String, log: Vec<String>) -> Frame {
    let room = world.room();
    let mut rows = Vec::with_capacity(room.height.max(0) as usize);
    for y in (0..room.height).rev() {
        let mut row = Vec::with_capacity(room.width.max(0) as usize);
        for x in 0..room.width {
            let glyph = match room.occupant_at(Point::new(x, y)) {
                Some(Occupant::Empty) => Glyph::new('.', Color::DarkGrey),
                Some(Occupant::Wall) => Glyph::new('#', Color::Grey),
                Some(Occupant::Actor { entity, .. }) => match world.appearance(entity) {
                    Some((_, true)) => Glyph::new('x', Color::DarkRed),
                    Some((renderable, false)) => Glyph::new(renderable.glyph, renderable.color),
                    None => Glyph::new('?', Color::Magenta),
                },
                None => Glyph::new('?', Color::Magenta),
            };
            row.push(glyph);
        }
        rows.push(row);
    }
    Frame {
        header,
        rows,
        log,
        prompt: None,
    }
}

pub trait Screen {
    fn present(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Line-oriented terminal output: clear, redraw everything, leave the cursor
/// under the prompt for the next line of input.
pub struct TerminalScreen<W: Write> {
    out: W,
}

impl TerminalScreen<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(&frame.header),
            Print("\n")
        )?;

        let mut last_color = None;
        for row in &frame.rows {
            for glyph in row {
                if last_color != Some(glyph.color) {
                    queue!(self.out, SetForegroundColor(glyph.color))?;
                    last_color = Some(glyph.color);
                }
                queue!(self.out, Print(glyph.symbol), Print(' '))?;
            }
            queue!(self.out, Print("\n"))?;
        }
        queue!(self.out, ResetColor)?;

        for line in &frame.log {
            queue!(self.out, Print(line), Print("\n"))?;
        }
        if let Some(prompt) = frame.prompt {
            queue!(self.out, Print(prompt), Print("\n"))?;
        }
        self.out.flush()
    }
}
