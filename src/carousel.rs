//! Index/direction state machine behind the carousel.
//!
//! The cursor moves over a fixed number of slots and wraps at both ends, so
//! every navigation call is total. The direction only tells the view which
//! way to animate the transition.

use serde::{Serialize, Serializer};

/// Minimum swipe power (`|offset| * velocity`) that counts as a navigation.
pub const SWIPE_CONFIDENCE_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Backward,
    #[default]
    Initial,
    Forward,
}

impl Direction {
    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Backward => -1,
            Direction::Initial => 0,
            Direction::Forward => 1,
        }
    }
}

// Serialized as -1 / 0 / 1 so the page can feed it straight into the transition.
impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

/// Keys bound to navigation while the main view is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
}

impl NavKey {
    /// Maps a DOM `KeyboardEvent.key` value. Unbound keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(NavKey::ArrowLeft),
            "ArrowRight" => Some(NavKey::ArrowRight),
            _ => None,
        }
    }
}

pub fn swipe_power(offset: f64, velocity: f64) -> f64 {
    offset.abs() * velocity
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current_index: usize,
    direction: Direction,
}

impl Carousel {
    /// Panics if `len` is zero; a catalog is never empty.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "carousel needs at least one item");
        Self {
            len,
            current_index: 0,
            direction: Direction::Initial,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next(&mut self) -> usize {
        self.direction = Direction::Forward;
        if self.current_index < self.len - 1 {
            self.current_index += 1;
        } else {
            self.current_index = 0;
        }
        self.current_index
    }

    pub fn previous(&mut self) -> usize {
        self.direction = Direction::Backward;
        if self.current_index > 0 {
            self.current_index -= 1;
        } else {
            self.current_index = self.len - 1;
        }
        self.current_index
    }

    /// Moves straight to `index`. The caller validates the index: an
    /// out-of-range value is a programming error and panics.
    pub fn jump_to(&mut self, index: usize) -> usize {
        assert!(
            index < self.len,
            "jump_to index {} out of range for {} items",
            index,
            self.len
        );
        self.direction = if index > self.current_index {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.current_index = index;
        self.current_index
    }

    pub fn handle_key(&mut self, key: NavKey) -> usize {
        match key {
            NavKey::ArrowLeft => self.previous(),
            NavKey::ArrowRight => self.next(),
        }
    }

    /// Applies a drag gesture. A strong leftward swipe advances, a strong
    /// rightward swipe goes back, anything weaker is ignored.
    pub fn handle_swipe(&mut self, offset: f64, velocity: f64) -> Option<usize> {
        let power = swipe_power(offset, velocity);
        if power < -SWIPE_CONFIDENCE_THRESHOLD {
            Some(self.next())
        } else if power > SWIPE_CONFIDENCE_THRESHOLD {
            Some(self.previous())
        } else {
            None
        }
    }
}
