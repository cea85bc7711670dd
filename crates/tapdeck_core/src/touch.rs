//! Multi-pointer touch events
//!
//! Platform layers convert native motion events into [`TouchEvent`]s. Each
//! event carries a millisecond timestamp so recognizers never read a clock.

use smallvec::SmallVec;

use crate::geometry::Point;

/// What produced a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolType {
    #[default]
    Finger,
    Stylus,
    Mouse,
}

/// Touch pointer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPointer {
    /// Pointer ID (stable for the lifetime of one contact)
    pub id: i32,
    /// X coordinate in view space
    pub x: f32,
    /// Y coordinate in view space
    pub y: f32,
    /// Pressure (0.0 - 1.0)
    pub pressure: f32,
    /// Touch size
    pub size: f32,
    pub tool: ToolType,
    /// Secondary (barrel) button held on a stylus or mouse
    pub secondary_button: bool,
}

impl TouchPointer {
    /// A finger contact at `(x, y)`
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            pressure: 1.0,
            size: 0.0,
            tool: ToolType::Finger,
            secondary_button: false,
        }
    }

    pub fn with_tool(mut self, tool: ToolType) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_secondary_button(mut self, held: bool) -> Self {
        self.secondary_button = held;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Pointers present in one event; most gestures use at most four
pub type Pointers = SmallVec<[TouchPointer; 4]>;

/// Touch event types.
///
/// `pointers` lists every contact present at the time of the event. For
/// `Down` and `Up` that includes the pointer the action refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    /// A new touch started
    Down {
        pointer: TouchPointer,
        pointers: Pointers,
        time_ms: u64,
    },
    /// Touch positions changed
    Move { pointers: Pointers, time_ms: u64 },
    /// Touch ended
    Up {
        pointer: TouchPointer,
        pointers: Pointers,
        time_ms: u64,
    },
    /// Touch cancelled (e.g., system gesture)
    Cancel { time_ms: u64 },
}

impl TouchEvent {
    pub fn time_ms(&self) -> u64 {
        match self {
            TouchEvent::Down { time_ms, .. }
            | TouchEvent::Move { time_ms, .. }
            | TouchEvent::Up { time_ms, .. }
            | TouchEvent::Cancel { time_ms } => *time_ms,
        }
    }

    pub fn pointers(&self) -> &[TouchPointer] {
        match self {
            TouchEvent::Down { pointers, .. }
            | TouchEvent::Move { pointers, .. }
            | TouchEvent::Up { pointers, .. } => pointers,
            TouchEvent::Cancel { .. } => &[],
        }
    }

    /// The pointer a down/up action refers to
    pub fn action_pointer(&self) -> Option<&TouchPointer> {
        match self {
            TouchEvent::Down { pointer, .. } | TouchEvent::Up { pointer, .. } => Some(pointer),
            _ => None,
        }
    }

    pub fn find(&self, id: i32) -> Option<&TouchPointer> {
        self.pointers().iter().find(|p| p.id == id)
    }

    /// Tool of the action pointer, or of the first pointer for moves
    pub fn tool(&self) -> ToolType {
        self.action_pointer()
            .or_else(|| self.pointers().first())
            .map(|p| p.tool)
            .unwrap_or_default()
    }
}
