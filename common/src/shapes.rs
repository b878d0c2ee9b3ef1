use rand::Rng;

/// Axis-aligned rectangle with a top-left origin.
///
/// A rectangle with a negative width or height is empty. Infinite widths and
/// heights are allowed and mean "unbounded on that side", see
/// [`Rectangle::INFINITE`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const EMPTY: Rectangle = Rectangle {
        x: f64::INFINITY,
        y: f64::INFINITY,
        width: f64::NEG_INFINITY,
        height: f64::NEG_INFINITY,
    };

    pub const INFINITE: Rectangle = Rectangle {
        x: f64::NEG_INFINITY,
        y: f64::NEG_INFINITY,
        width: f64::INFINITY,
        height: f64::INFINITY,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        // -inf + inf would be NaN for an unbounded rectangle.
        if self.width == f64::INFINITY {
            f64::INFINITY
        } else {
            self.x + self.width
        }
    }

    pub fn bottom(&self) -> f64 {
        if self.height == f64::INFINITY {
            f64::INFINITY
        } else {
            self.y + self.height
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.width.is_nan() || self.height.is_nan()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Non-negative size, a left/top below `+inf`, and a `-inf` left/top
    /// only when paired with an infinite width/height.
    pub fn is_defined(&self) -> bool {
        self.width >= 0.0
            && self.height >= 0.0
            && self.y < f64::INFINITY
            && self.x < f64::INFINITY
            && (self.y > f64::NEG_INFINITY || self.height == f64::INFINITY)
            && (self.x > f64::NEG_INFINITY || self.width == f64::INFINITY)
    }

    /// Closed-interval overlap on both axes. An empty rectangle intersects
    /// everything.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.is_empty()
            || other.is_empty()
            || (self.right() >= other.left()
                && other.right() >= self.left()
                && self.bottom() >= other.top()
                && other.bottom() >= self.top())
    }

    /// Whether `inner` lies fully inside `self`. Empty rectangles are never
    /// contained and never contain anything.
    pub fn contains(&self, inner: &Rectangle) -> bool {
        !self.is_empty()
            && !inner.is_empty()
            && self.left() <= inner.left()
            && self.top() <= inner.top()
            && self.right() >= inner.right()
            && self.bottom() >= inner.bottom()
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        !self.is_empty() && x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    /// Splits into top-left, top-right, bottom-left and bottom-right halves.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        [
            Rectangle::new(self.x, self.y, half_w, half_h),
            Rectangle::new(self.x + half_w, self.y, half_w, half_h),
            Rectangle::new(self.x, self.y + half_h, half_w, half_h),
            Rectangle::new(self.x + half_w, self.y + half_h, half_w, half_h),
        ]
    }

    /// Random rectangle of at most `max_size` per side, placed fully inside
    /// `self`. Sizes are clamped to the rectangle when it is too small.
    pub fn get_random_rect_inside<R: Rng>(&self, max_size: f64, rng: &mut R) -> Rectangle {
        let width = self._safe_randf64(rng, 0.0, max_size.min(self.width));
        let height = self._safe_randf64(rng, 0.0, max_size.min(self.height));
        Rectangle::new(
            self._safe_randf64(rng, self.left(), self.right() - width),
            self._safe_randf64(rng, self.top(), self.bottom() - height),
            width,
            height,
        )
    }

    fn _safe_randf64<R: Rng>(&self, rng: &mut R, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}
