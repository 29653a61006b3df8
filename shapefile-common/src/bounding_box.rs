/// An axis-aligned bounding box over x and y.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// A bounding box that contains nothing; the identity element for
    /// [`BoundingBox::expand_to`].
    pub fn empty() -> BoundingBox {
        BoundingBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grows this box, in place, to also cover `other`.
    pub fn expand_to(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Grows this box, in place, to also cover a single point.
    pub fn expand_to_point(&mut self, x: f64, y: f64) {
        if self.is_empty() {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
            return;
        }
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.max_x >= other.max_x
                && self.min_y <= other.min_y
                && self.max_y >= other.max_y)
    }
}
