use std::fmt::Display;

use chunkalloc::log::debug;

/// A value that reports its construction and destruction, so the demo shows
/// when the allocator runs constructors and destructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        debug!("Point::new({}, {})", x, y);
        Self { x, y }
    }
}

impl Drop for Point {
    fn drop(&mut self) {
        debug!("drop Point({}, {})", self.x, self.y);
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}
