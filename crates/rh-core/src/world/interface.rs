//! The boundary to the rendering and input layer
//!
//! The core never paints or reads the terminal itself. It reports what
//! changed and asks for input through [`Interface`].

use std::collections::VecDeque;

use crate::dungeon::Pos;

/// Services the core consumes from the display/input layer
pub trait Interface {
    /// Show a message on the top line
    fn pline(&mut self, msg: &str);

    fn redraw_screen(&mut self);

    /// Redraw the rectangle spanned by two corners
    fn redraw_region(&mut self, from: Pos, to: Pos);

    /// The bottom status line needs refreshing
    fn status_dirty(&mut self);

    /// What the player can see changed
    fn recompute_vision(&mut self);

    /// Read one direction key as a step
    fn read_direction(&mut self) -> Option<(i32, i32)>;

    /// Read a line of free text
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Notifications recorded by [`Transcript`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    RedrawScreen,
    RedrawRegion(Pos, Pos),
    StatusDirty,
    RecomputeVision,
}

/// An in-memory interface: records output and replays scripted input
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    pub messages: Vec<String>,
    pub events: Vec<UiEvent>,
    pub directions: VecDeque<(i32, i32)>,
    pub lines: VecDeque<String>,
}

impl Transcript {
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn saw(&self, event: UiEvent) -> bool {
        self.events.contains(&event)
    }

    pub fn said(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m == msg)
    }
}

impl Interface for Transcript {
    fn pline(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn redraw_screen(&mut self) {
        self.events.push(UiEvent::RedrawScreen);
    }

    fn redraw_region(&mut self, from: Pos, to: Pos) {
        self.events.push(UiEvent::RedrawRegion(from, to));
    }

    fn status_dirty(&mut self) {
        self.events.push(UiEvent::StatusDirty);
    }

    fn recompute_vision(&mut self) {
        self.events.push(UiEvent::RecomputeVision);
    }

    fn read_direction(&mut self) -> Option<(i32, i32)> {
        self.directions.pop_front()
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.messages.push(prompt.to_string());
        self.lines.pop_front()
    }
}
