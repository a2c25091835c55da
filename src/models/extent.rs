/// Axis-aligned rectangle in projected (planar) coordinates, min/max normalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Extent {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Smallest extent covering every point, or `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Extent>, (x, y)| {
            Some(match acc {
                None => Extent::new(x, y, x, y),
                Some(e) => Extent {
                    min_x: e.min_x.min(x),
                    min_y: e.min_y.min(y),
                    max_x: e.max_x.max(x),
                    max_y: e.max_y.max(y),
                },
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `fraction` of the span on every side, keeping each half-span
    /// at least `min_half`.
    pub fn padded(&self, fraction: f64, min_half: f64) -> Extent {
        let (cx, cy) = self.center();
        let half_w = (self.width() / 2.0 * (1.0 + 2.0 * fraction)).max(min_half);
        let half_h = (self.height() / 2.0 * (1.0 + 2.0 * fraction)).max(min_half);
        Extent {
            min_x: cx - half_w,
            min_y: cy - half_h,
            max_x: cx + half_w,
            max_y: cy + half_h,
        }
    }

    /// Widen the shorter axis so the extent has the aspect ratio of a
    /// `width_px` x `height_px` canvas and the map is not stretched.
    pub fn fit_aspect(&self, width_px: u32, height_px: u32) -> Extent {
        let target = f64::from(width_px) / f64::from(height_px);
        let (cx, cy) = self.center();
        let (mut w, mut h) = (self.width(), self.height());
        if w / h > target {
            h = w / target;
        } else {
            w = h * target;
        }
        Extent {
            min_x: cx - w / 2.0,
            min_y: cy - h / 2.0,
            max_x: cx + w / 2.0,
            max_y: cy + h / 2.0,
        }
    }
}
