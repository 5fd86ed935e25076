//! SVG chart generation for rate-quality curves.
//!
//! Draws one polyline per series with circle markers, a cross marker for
//! highlighted (selected) points, and a legend. Charts follow light and dark
//! mode via CSS media queries.

use std::fmt::Write as _;

/// Data point for a chart series.
#[derive(Debug, Clone)]
pub struct ChartPoint {
    /// X-axis value (bitrate).
    pub x: f64,
    /// Y-axis value (quality).
    pub y: f64,
    /// Optional label shown as a tooltip (e.g., sample id).
    pub label: Option<String>,
    /// Draw a cross marker on top of the circle.
    pub highlighted: bool,
}

impl ChartPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: None,
            highlighted: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

/// Stroke pattern of a series line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    /// Cycle used when several series share a color.
    pub const CYCLE: [LineStyle; 4] = [Self::Solid, Self::Dashed, Self::DashDot, Self::Dotted];

    fn dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("8 5"),
            Self::DashDot => Some("8 4 2 4"),
            Self::Dotted => Some("2 4"),
        }
    }
}

/// A series of data points with styling.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    /// Series identifier (used in legend).
    pub name: String,
    /// CSS color for the series.
    pub color: String,
    /// Line pattern.
    pub style: LineStyle,
    /// Data points sorted by X.
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            style: LineStyle::Solid,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: Vec<ChartPoint>) -> Self {
        self.points = points;
        self
    }
}

/// Chart configuration.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Legend heading, if any.
    pub legend_title: Option<String>,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Quality vs Bitrate".to_string(),
            x_label: "Bitrate (kbps)".to_string(),
            y_label: "VMAF".to_string(),
            legend_title: None,
            width: 900,
            height: 540,
        }
    }
}

impl ChartConfig {
    /// Creates a new chart configuration with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the X-axis label.
    #[must_use]
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Sets the Y-axis label.
    #[must_use]
    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Sets the legend heading.
    #[must_use]
    pub fn with_legend_title(mut self, title: impl Into<String>) -> Self {
        self.legend_title = Some(title.into());
        self
    }

    /// Sets the chart dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

const MARGIN_TOP: f64 = 50.0;
const MARGIN_RIGHT: f64 = 190.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_LEFT: f64 = 80.0;
const TICKS: u32 = 5;

/// Maps data coordinates to SVG coordinates.
struct Plane {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    width: f64,
    height: f64,
}

impl Plane {
    fn fit(series: &[&ChartSeries], config: &ChartConfig) -> Self {
        let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.x));
        let ys = series.iter().flat_map(|s| s.points.iter().map(|p| p.y));
        let (min_x, max_x) = padded_bounds(xs);
        let (min_y, max_y) = padded_bounds(ys);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            width: f64::from(config.width),
            height: f64::from(config.height),
        }
    }

    fn plot_width(&self) -> f64 {
        self.width - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.height - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, v: f64) -> f64 {
        MARGIN_LEFT + (v - self.min_x) / (self.max_x - self.min_x) * self.plot_width()
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + (1.0 - (v - self.min_y) / (self.max_y - self.min_y)) * self.plot_height()
    }
}

/// Min/max of the values with 5% padding; a flat range is widened by one unit.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;
    if range <= f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    (min - range * 0.05, max + range * 0.05)
}

/// Escape text for SVG content and attributes.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Generates an SVG chart from the given series.
///
/// Returns an empty string when no series has points.
///
/// # Example
///
/// ```rust
/// use bitrate_ladder::stats::chart::{generate_svg, ChartConfig, ChartPoint, ChartSeries};
///
/// let series = vec![ChartSeries::new("H264 1280x720", "#3498db").with_points(vec![
///     ChartPoint::new(1000.0, 80.0),
///     ChartPoint::new(2000.0, 90.0).highlighted(true),
/// ])];
///
/// let svg = generate_svg(&series, &ChartConfig::new("RD Curve"));
/// assert!(svg.starts_with("<svg"));
/// ```
#[must_use]
pub fn generate_svg(series: &[ChartSeries], config: &ChartConfig) -> String {
    let drawn: Vec<&ChartSeries> = series.iter().filter(|s| !s.points.is_empty()).collect();
    if drawn.is_empty() {
        return String::new();
    }

    let plane = Plane::fit(&drawn, config);
    let mut svg = String::with_capacity(8192);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        config.width, config.height
    );
    svg.push_str(STYLE);
    let _ = writeln!(
        svg,
        r#"<rect class="background" width="{}" height="{}"/>"#,
        config.width, config.height
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="30" text-anchor="middle" class="title">{}</text>"#,
        plane.width / 2.0,
        escape(&config.title)
    );

    write_axes(&mut svg, &plane, config);

    for s in &drawn {
        write_series(&mut svg, &plane, s);
    }

    write_legend(&mut svg, &plane, config, &drawn);

    svg.push_str("</svg>\n");
    svg
}

const STYLE: &str = r#"<style>
  :root {
    --bg: #ffffff;
    --fg: #1a1a1a;
    --grid: #e4e4e4;
    --axis: #333333;
    --marker-edge: #000000;
  }
  @media (prefers-color-scheme: dark) {
    :root {
      --bg: #181818;
      --fg: #e0e0e0;
      --grid: #3a3a3a;
      --axis: #b0b0b0;
      --marker-edge: #f0f0f0;
    }
  }
  .background { fill: var(--bg); }
  .title { font: bold 18px system-ui, sans-serif; fill: var(--fg); }
  .axis-label { font: 13px system-ui, sans-serif; fill: var(--fg); }
  .tick-label { font: 11px system-ui, sans-serif; fill: var(--fg); }
  .legend { font: 12px system-ui, sans-serif; fill: var(--fg); }
  .grid { stroke: var(--grid); stroke-width: 1; opacity: 0.6; }
  .axis { stroke: var(--axis); stroke-width: 1.5; }
  .selected { stroke: var(--marker-edge); stroke-width: 1; }
</style>
"#;

fn write_axes(svg: &mut String, plane: &Plane, config: &ChartConfig) {
    let left = MARGIN_LEFT;
    let right = plane.width - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = plane.height - MARGIN_BOTTOM;

    for i in 0..=TICKS {
        let frac = f64::from(i) / f64::from(TICKS);
        let x_val = plane.min_x + frac * (plane.max_x - plane.min_x);
        let y_val = plane.min_y + frac * (plane.max_y - plane.min_y);
        let x = plane.x(x_val);
        let y = plane.y(y_val);

        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{top}" x2="{x:.2}" y2="{bottom}" class="grid"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{left}" y1="{y:.2}" x2="{right}" y2="{y:.2}" class="grid"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x:.2}" y="{:.1}" text-anchor="middle" class="tick-label">{x_val:.0}</text>"#,
            bottom + 20.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.2}" text-anchor="end" class="tick-label">{y_val:.1}</text>"#,
            left - 10.0,
            y + 4.0
        );
    }

    let _ = writeln!(
        svg,
        r#"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" class="axis"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" class="axis"/>"#
    );

    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="axis-label">{}</text>"#,
        (left + right) / 2.0,
        plane.height - 20.0,
        escape(&config.x_label)
    );
    let mid_y = (top + bottom) / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="25" y="{mid_y:.1}" text-anchor="middle" class="axis-label" transform="rotate(-90 25 {mid_y:.1})">{}</text>"#,
        escape(&config.y_label)
    );
}

fn write_series(svg: &mut String, plane: &Plane, s: &ChartSeries) {
    let mut path = String::new();
    for (i, p) in s.points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{} {:.2},{:.2}", cmd, plane.x(p.x), plane.y(p.y));
    }
    let dash = s
        .style
        .dasharray()
        .map(|d| format!(r#" stroke-dasharray="{d}""#))
        .unwrap_or_default();
    let _ = writeln!(
        svg,
        r#"<path d="{}" stroke="{}" stroke-width="2"{} fill="none"/>"#,
        path, s.color, dash
    );

    for p in &s.points {
        let (cx, cy) = (plane.x(p.x), plane.y(p.y));
        let title = p
            .label
            .as_deref()
            .map(|l| format!("<title>{}</title>", escape(l)))
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="4" fill="{}">{title}</circle>"#,
            s.color
        );
        if p.highlighted {
            // Cross with a ring, so selected points read in both themes.
            let r = 7.0;
            let w = 2.2;
            let _ = writeln!(
                svg,
                r#"<path d="M {:.2},{:.2} L {:.2},{:.2} M {:.2},{:.2} L {:.2},{:.2}" stroke="{}" stroke-width="{w}" class="selected-x"/>"#,
                cx - r,
                cy - r,
                cx + r,
                cy + r,
                cx - r,
                cy + r,
                cx + r,
                cy - r,
                s.color
            );
            let _ = writeln!(
                svg,
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="none" class="selected"/>"#
            );
        }
    }
}

fn write_legend(svg: &mut String, plane: &Plane, config: &ChartConfig, drawn: &[&ChartSeries]) {
    let x = plane.width - MARGIN_RIGHT + 15.0;
    let mut y = MARGIN_TOP + 10.0;

    if let Some(title) = &config.legend_title {
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" class="legend" font-weight="bold">{}</text>"#,
            escape(title)
        );
        y += 20.0;
    }

    for s in drawn {
        let dash = s
            .style
            .dasharray()
            .map(|d| format!(r#" stroke-dasharray="{d}""#))
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"{dash}/>"#,
            x + 24.0,
            s.color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" class="legend">{}</text>"#,
            x + 30.0,
            y + 4.0,
            escape(&s.name)
        );
        y += 20.0;
    }
}

/// Color palette, one color per codec or resolution.
pub mod colors {
    pub const BLUE: &str = "#1f77b4";
    pub const ORANGE: &str = "#ff7f0e";
    pub const GREEN: &str = "#2ca02c";
    pub const RED: &str = "#d62728";
    pub const PURPLE: &str = "#9467bd";
    pub const BROWN: &str = "#8c564b";
    pub const PINK: &str = "#e377c2";
    pub const GRAY: &str = "#7f7f7f";

    /// Ten-step categorical cycle.
    pub const CYCLE: [&str; 10] = [
        BLUE, ORANGE, GREEN, RED, PURPLE, BROWN, PINK, GRAY, "#bcbd22", "#17becf",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_svg_basic() {
        let series = vec![ChartSeries::new("H264 1280x720", colors::RED).with_points(vec![
            ChartPoint::new(500.0, 80.0).with_label("p001"),
            ChartPoint::new(1000.0, 90.0),
        ])];

        let svg = generate_svg(&series, &ChartConfig::new("Test Chart"));

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Test Chart"));
        assert!(svg.contains("H264 1280x720"));
        assert!(svg.contains("<title>p001</title>"));
        assert!(!svg.contains("selected-x"));
    }

    #[test]
    fn test_empty_series() {
        let svg = generate_svg(&[], &ChartConfig::default());
        assert!(svg.is_empty());

        let series = vec![ChartSeries::new("empty", colors::BLUE)];
        assert!(generate_svg(&series, &ChartConfig::default()).is_empty());
    }

    #[test]
    fn test_highlight_and_dashes() {
        let series = vec![ChartSeries::new("AV1", colors::GREEN)
            .with_style(LineStyle::Dashed)
            .with_points(vec![ChartPoint::new(1000.0, 85.0).highlighted(true)])];
        let svg = generate_svg(&series, &ChartConfig::new("One point"));
        assert!(svg.contains("selected-x"));
        assert!(svg.contains(r#"stroke-dasharray="8 5""#));
        // A single point must not produce NaN coordinates.
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_escapes_text() {
        let series = vec![ChartSeries::new("a<b", colors::GRAY)
            .with_points(vec![ChartPoint::new(1.0, 2.0), ChartPoint::new(2.0, 3.0)])];
        let svg = generate_svg(&series, &ChartConfig::new("R&D"));
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("a&lt;b"));
    }
}
