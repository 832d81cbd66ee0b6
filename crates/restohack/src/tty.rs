//! Plain stdout/stdin front end
//!
//! Messages are printed as they come. The map is drawn from the remembered
//! symbols of the resident level whenever the core asked for a redraw since
//! the last prompt.

use std::io::{self, BufRead, Write};

use rh_core::consts::{COLNO, PLAYER_SYM, ROWNO};
use rh_core::world::Interface;
use rh_core::{Pos, WorldState};

/// Direction of a movement key
pub fn direction_of(key: char) -> Option<(i32, i32)> {
    Some(match key {
        'h' => (-1, 0),
        'j' => (0, 1),
        'k' => (0, -1),
        'l' => (1, 0),
        'y' => (-1, -1),
        'u' => (1, -1),
        'b' => (-1, 1),
        'n' => (1, 1),
        _ => return None,
    })
}

pub struct Tty<R: BufRead, W: Write> {
    input: R,
    out: W,
    map_dirty: bool,
    status_dirty: bool,
    eof: bool,
}

impl Tty<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Tty::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Tty<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            map_dirty: true,
            status_dirty: true,
            eof: false,
        }
    }

    /// Input is exhausted (hangup on a pipe or terminal)
    pub fn at_eof(&self) -> bool {
        self.eof
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn print(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
    }

    /// Read one line without the newline. `None` at end of input.
    pub fn read_raw(&mut self, prompt: &str) -> Option<String> {
        if !prompt.is_empty() {
            let _ = write!(self.out, "{prompt}");
            let _ = self.out.flush();
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.eof = true;
                None
            }
            Ok(_) => {
                let len = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(len);
                Some(line)
            }
        }
    }

    /// Redraw what the core marked stale
    pub fn refresh(&mut self, world: &WorldState) {
        if self.map_dirty {
            self.draw_map(world);
            self.map_dirty = false;
        }
        if self.status_dirty {
            let line = status_line(world);
            self.print(&line);
            self.status_dirty = false;
        }
        let _ = self.out.flush();
    }

    fn draw_map(&mut self, world: &WorldState) {
        for y in 0..ROWNO as i32 {
            let mut row = String::with_capacity(COLNO);
            for x in 0..COLNO as i32 {
                let Ok(pos) = Pos::checked(x, y) else {
                    continue;
                };
                if pos == world.you.pos && !world.you.invisible() {
                    row.push(PLAYER_SYM);
                } else {
                    row.push(world.level.cell(pos).scrsym);
                }
            }
            let row = row.trim_end();
            self.print(row);
        }
    }
}

/// The bottom line
pub fn status_line(world: &WorldState) -> String {
    let you = &world.you;
    let mut line = format!(
        "Level {}  Gold {}  Hp {}({})  Ac {}  Str {}  Exp {}",
        world.dlevel, you.ugold, you.uhp, you.uhpmax, you.uac, you.ustr, you.ulevel
    );
    let hunger = you.uhs.to_string();
    if !hunger.is_empty() {
        line.push_str("  ");
        line.push_str(&hunger);
    }
    if world.flags.time {
        line.push_str(&format!("  T:{}", world.moves));
    }
    line
}

impl<R: BufRead, W: Write> Interface for Tty<R, W> {
    fn pline(&mut self, msg: &str) {
        self.print(msg);
    }

    fn redraw_screen(&mut self) {
        self.map_dirty = true;
    }

    fn redraw_region(&mut self, _from: Pos, _to: Pos) {
        self.map_dirty = true;
    }

    fn status_dirty(&mut self) {
        self.status_dirty = true;
    }

    fn recompute_vision(&mut self) {
        self.map_dirty = true;
    }

    fn read_direction(&mut self) -> Option<(i32, i32)> {
        let line = self.read_raw("In what direction? ")?;
        line.trim().chars().next().and_then(direction_of)
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.read_raw(prompt)
    }
}
