use crate::geometry::{Rect, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Fallback used when the hosting surface cannot resolve its size to pixels.
pub const DEFAULT_VIEWPORT: Vec2 = Vec2 { x: 800.0, y: 600.0 };

/// Duration of the animated zoom reset.
pub const RESET_ANIMATION_MS: f32 = 750.0;

/// The viewport transform: `screen = translate + graph * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(translate: Vec2, scale: f32) -> Self {
        Self {
            translate,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn to_screen(&self, graph_pos: Vec2) -> Vec2 {
        self.translate + graph_pos * self.scale
    }

    pub fn to_graph(&self, screen_pos: Vec2) -> Vec2 {
        (screen_pos - self.translate) * (1.0 / self.scale)
    }

    /// Rescale about `focus` (screen coordinates) so the graph point under
    /// the focus stays put.
    pub fn zoomed_about(&self, factor: f32, focus: Vec2) -> Self {
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = scale / self.scale;
        Self {
            translate: focus - (focus - self.translate) * ratio,
            scale,
        }
    }

    pub fn panned_by(&self, delta: Vec2) -> Self {
        Self {
            translate: self.translate + delta,
            scale: self.scale,
        }
    }

    /// Transform that fits `content` (already padded) into `viewport`,
    /// scaled down by `padding_factor` and capped at `max_scale`, with the
    /// content center mapped onto the viewport center.
    ///
    /// A missing content box (zero nodes) centers the graph origin on the
    /// viewport without any division.
    pub fn fit(content: Option<Rect>, viewport: Vec2, padding_factor: f32, max_scale: f32) -> Self {
        let viewport_center = viewport * 0.5;
        let Some(content) = content else {
            return Self {
                translate: viewport_center,
                scale: 1.0,
            };
        };

        let width = content.width();
        let height = content.height();
        if width <= 0.0 || height <= 0.0 {
            return Self {
                translate: viewport_center - content.center(),
                scale: 1.0,
            };
        }

        let scale = (viewport.x * padding_factor / width)
            .min(viewport.y * padding_factor / height)
            .min(max_scale)
            .clamp(MIN_SCALE, MAX_SCALE);

        Self {
            translate: viewport_center - content.center() * scale,
            scale,
        }
    }
}

/// Resolve the hosting surface's size to concrete pixels. Dimensions the
/// surface could not resolve (missing, non-finite, or non-positive) fall
/// back to the default instead of failing layout.
pub fn resolve_viewport(width: Option<f32>, height: Option<f32>) -> Vec2 {
    let resolve = |value: Option<f32>, fallback: f32| match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    };
    Vec2::new(
        resolve(width, DEFAULT_VIEWPORT.x),
        resolve(height, DEFAULT_VIEWPORT.y),
    )
}

/// A fixed-duration interpolation between two view transforms, used by the
/// animated zoom reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAnimation {
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub duration_ms: f32,
    elapsed_ms: f32,
}

impl ViewAnimation {
    pub fn new(from: ViewTransform, to: ViewTransform, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(1.0),
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt_ms` and return the transform for the new time.
    pub fn advance(&mut self, dt_ms: f32) -> ViewTransform {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
        let t = ease_in_out_cubic(self.elapsed_ms / self.duration_ms);
        ViewTransform {
            translate: lerp(self.from.translate, self.to.translate, t),
            scale: self.from.scale + (self.to.scale - self.from.scale) * t,
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}
