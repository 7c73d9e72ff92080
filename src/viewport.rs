//! Viewport fitting and zoom.
//!
//! The transform maps layout space to screen space:
//! `screen = layout * scale + translate`.

use crate::geometry::{round2, Point};
use crate::layout::LayoutNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    /// Margin added around the content box before fitting.
    pub fit_padding: f64,
    /// Fit never zooms in past this, leaving some room around small graphs.
    pub max_fit_scale: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            fit_padding: 40.0,
            max_fit_scale: 0.95,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Transform {
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    pub fn to_layout(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    pub fn to_svg(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            round2(self.translate_x),
            round2(self.translate_y),
            (self.scale * 10_000.0).round() / 10_000.0
        )
    }
}

/// Axis-aligned box in layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Union of node rectangles; `None` when there are no nodes.
    pub fn of_nodes<'a>(nodes: impl IntoIterator<Item = &'a LayoutNode>) -> Option<Self> {
        nodes.into_iter().fold(None, |acc, n| {
            let b = Bounds {
                min_x: n.x,
                min_y: n.y,
                max_x: n.right(),
                max_y: n.bottom(),
            };
            Some(match acc {
                None => b,
                Some(a) => Bounds {
                    min_x: a.min_x.min(b.min_x),
                    min_y: a.min_y.min(b.min_y),
                    max_x: a.max_x.max(b.max_x),
                    max_y: a.max_y.max(b.max_y),
                },
            })
        })
    }

    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Transform that fits `bounds` (plus padding) centred into `size`.
pub fn fit_transform(bounds: Bounds, size: Size, limits: &ViewportLimits) -> Option<Transform> {
    if !size.is_usable() {
        return None;
    }
    let padded = bounds.expand(limits.fit_padding);
    if padded.width() <= 0.0 || padded.height() <= 0.0 {
        return None;
    }

    let scale = (size.width / padded.width())
        .min(size.height / padded.height())
        .min(limits.max_fit_scale);

    Some(Transform {
        scale,
        translate_x: (size.width - padded.width() * scale) / 2.0 - padded.min_x * scale,
        translate_y: (size.height - padded.height() * scale) / 2.0 - padded.min_y * scale,
    })
}

/// Current transform for one rendered viewport.
#[derive(Debug, Clone)]
pub struct Viewport {
    size: Size,
    transform: Transform,
    limits: ViewportLimits,
}

impl Viewport {
    pub fn new(size: Size, limits: ViewportLimits) -> Self {
        Self {
            size,
            transform: Transform::default(),
            limits,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Fit the given nodes. Returns false (transform untouched) when there is
    /// nothing to fit or the viewport has no area.
    pub fn fit<'a>(&mut self, nodes: impl IntoIterator<Item = &'a LayoutNode>) -> bool {
        let fitted = Bounds::of_nodes(nodes)
            .and_then(|bounds| fit_transform(bounds, self.size, &self.limits));

        match fitted {
            Some(transform) => {
                tracing::debug!(
                    scale = transform.scale,
                    x = transform.translate_x,
                    y = transform.translate_y,
                    "viewport fitted"
                );
                self.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Multiply the scale by `factor` within the zoom limits, keeping `pivot`
    /// (screen space, default viewport centre) fixed on screen.
    pub fn zoom_by(&mut self, factor: f64, pivot: Option<Point>) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let old = self.transform.scale;
        let scale = (old * factor).clamp(self.limits.min_zoom, self.limits.max_zoom);
        if scale == old {
            return false;
        }

        let pivot = pivot.unwrap_or_else(|| self.size.center());
        let k = scale / old;
        self.transform = Transform {
            scale,
            translate_x: pivot.x - (pivot.x - self.transform.translate_x) * k,
            translate_y: pivot.y - (pivot.y - self.transform.translate_y) * k,
        };
        true
    }
}
