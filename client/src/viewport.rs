/// Margin added around the outermost node positions, in map units.
const BOUNDS_MARGIN: f64 = 10.0;
/// Smallest useful view diagonal; also the window used for an empty map.
const MIN_DIAMETER: f64 = 20.0;
/// Wheel zoom step per notch.
const ZOOM_STEP: f64 = 1.15;

/// Axis-aligned bounding box of the map in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MapBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of the given node positions plus [`BOUNDS_MARGIN`] on
    /// each side. An empty map gets a fixed window around the origin.
    pub fn from_positions(positions: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        let mut any = false;
        for (x, y) in positions {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !any {
            let half = MIN_DIAMETER / 2.0;
            return Self::new(-half, -half, half, half);
        }
        Self::new(
            min_x - BOUNDS_MARGIN,
            min_y - BOUNDS_MARGIN,
            max_x + BOUNDS_MARGIN,
            max_y + BOUNDS_MARGIN,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Pan/zoom window into map space: center `(x, y)` plus view diagonal `d`,
/// both in map units. The on-screen region is the square of side `d`
/// centered on the center, uniformly scaled so it fits the shorter screen
/// axis (the SVG-viewBox convention the renderer reproduces).
///
/// `d` stays within `[min_d, max_d]` and the center is clamped so the view
/// square never leaves the map bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub d: f64,
    bounds: MapBounds,
    min_d: f64,
    max_d: f64,
}

fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    // When the view is wider than the bounds the range inverts; pin to the
    // midpoint instead.
    if lo > hi { (lo + hi) / 2.0 } else { v.clamp(lo, hi) }
}

impl Viewport {
    /// Initial viewport for the given bounds: centered, zoomed halfway
    /// between the closest and widest permitted view.
    pub fn fit(bounds: MapBounds) -> Self {
        let max_d = bounds.width().max(bounds.height());
        let min_d = MIN_DIAMETER.min(max_d);
        Self {
            x: (bounds.min_x + bounds.max_x) / 2.0,
            y: (bounds.min_y + bounds.max_y) / 2.0,
            d: (max_d + min_d) / 2.0,
            bounds,
            min_d,
            max_d,
        }
    }

    /// Pan by a screen-pixel delta. The conversion factor `d / min(vw, vh)`
    /// keeps drag speed proportional to zoom and independent of aspect.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64, view_px: (f64, f64)) {
        let unit = self.d / view_px.0.min(view_px.1);
        self.x += dx_px * unit;
        self.y += dy_px * unit;
        self.clamp_center();
    }

    /// Zoom one step in (`out = false`) or out, keeping the map point under
    /// `pivot_px` fixed on screen. No-op when already at the limit in the
    /// requested direction.
    pub fn zoom(&mut self, out: bool, pivot_px: (f64, f64), view_px: (f64, f64)) {
        if (out && self.d >= self.max_d) || (!out && self.d <= self.min_d) {
            return;
        }
        let step = if out { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        let new_d = (self.d * step).clamp(self.min_d, self.max_d);
        // Effective factor after clamping, so the pivot stays exact even on
        // the step that hits a limit.
        let f = new_d / self.d;

        let min_side = view_px.0.min(view_px.1);
        let kx = (pivot_px.0 - view_px.0 / 2.0) / min_side;
        let ky = (pivot_px.1 - view_px.1 / 2.0) / min_side;
        self.x += kx * self.d * (1.0 - f);
        self.y += ky * self.d * (1.0 - f);
        self.d = new_d;
        self.clamp_center();
    }

    fn clamp_center(&mut self) {
        let half = self.d / 2.0;
        self.x = clamp_axis(self.x, self.bounds.min_x + half, self.bounds.max_x - half);
        self.y = clamp_axis(self.y, self.bounds.min_y + half, self.bounds.max_y - half);
    }

    /// Pixels per map unit at the given screen size.
    pub fn scale(&self, view_px: (f64, f64)) -> f64 {
        view_px.0.min(view_px.1) / self.d
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64, view_px: (f64, f64)) -> (f64, f64) {
        let s = self.scale(view_px);
        (
            view_px.0 / 2.0 + (wx - self.x) * s,
            view_px.1 / 2.0 + (wy - self.y) * s,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64, view_px: (f64, f64)) -> (f64, f64) {
        let s = self.scale(view_px);
        (self.x + (sx - view_px.0 / 2.0) / s, self.y + (sy - view_px.1 / 2.0) / s)
    }
}
