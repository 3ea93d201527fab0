/// Cyclic position of the testimonial slider. Exactly one card and one dot
/// are active at any time; the active index always satisfies
/// `0 <= index < count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    index: usize,
    count: usize,
}

impl SliderState {
    /// Returns `None` for an empty slider; the behavior is a no-op then.
    pub fn new(count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self { index: 0, count })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Advances one card, wrapping past the end.
    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.count;
        self.index
    }

    /// Steps one card back, wrapping below zero.
    pub fn prev(&mut self) -> usize {
        self.index = (self.index + self.count - 1) % self.count;
        self.index
    }

    /// Jumps straight to a dot's index; out-of-range requests keep the
    /// current position.
    pub fn select(&mut self, index: usize) -> usize {
        if index < self.count {
            self.index = index;
        }
        self.index
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.index == index
    }
}
