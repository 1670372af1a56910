/// Fraction of the container width a swipe must travel to change slides.
pub const SWIPE_THRESHOLD: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    start_x: f64,
    current_x: f64,
}

/// Index bookkeeping for the horizontal slide carousel.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideTrack {
    count: usize,
    current: usize,
    drag: Option<Drag>,
}

impl SlideTrack {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            current: 0,
            drag: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Jump to `index`, clamped to the available slides.
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.count.saturating_sub(1));
        self.current
    }

    pub fn begin_drag(&mut self, x: f64) {
        self.drag = Some(Drag {
            start_x: x,
            current_x: x,
        });
    }

    /// Follow the finger; returns the live `translateX` offset in percent.
    pub fn drag_to(&mut self, x: f64, container_width: f64) -> Option<f64> {
        let drag = self.drag.as_mut()?;
        drag.current_x = x;
        let diff = drag.current_x - drag.start_x;
        let width = if container_width > 0.0 { container_width } else { 1.0 };
        Some(-(self.current as f64) * 100.0 + diff / width * 100.0)
    }

    /// Finish the drag and settle on the neighbouring slide if it went far enough.
    /// Returns `None` when no drag was in progress.
    pub fn release(&mut self, container_width: f64) -> Option<usize> {
        let drag = self.drag.take()?;
        let diff = drag.current_x - drag.start_x;
        let threshold = container_width * SWIPE_THRESHOLD;
        let target = if diff > threshold && self.current > 0 {
            self.current - 1
        } else if diff < -threshold && self.current + 1 < self.count {
            self.current + 1
        } else {
            self.current
        };
        Some(self.go_to(target))
    }

    /// Abandon the drag and stay on the current slide.
    pub fn cancel(&mut self) -> Option<usize> {
        self.drag.take().map(|_| self.current)
    }
}

pub fn slide_transform(index: usize) -> String {
    format!("translateX(-{}%)", index * 100)
}

pub fn drag_transform(offset_percent: f64) -> String {
    format!("translateX({offset_percent}%)")
}
