//! Server-rendered SVG charts. Every function takes a precomputed dataset
//! and returns a self-contained `<svg>` element.

use crate::format::{currency, escape_html};
use crate::models::{AttemptSavings, CategoryCount, DailyPoint, DurationPoint, RatePoint};
use std::f64::consts::PI;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 260.0;
const PAD_X: f64 = 56.0;
const PAD_Y: f64 = 34.0;
const TOP: f64 = 24.0;
const TICKS: usize = 4;

const PALETTE: [&str; 6] = ["#2f4858", "#ff6b4a", "#f5a35b", "#86a8a0", "#c9b8a6", "#7a746d"];

struct Series<'a> {
    name: &'a str,
    color: &'a str,
    values: Vec<f64>,
}

/// Vertical value range, always containing zero.
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn including_zero(values: impl IntoIterator<Item = f64>) -> Self {
        let (mut min, mut max) = values
            .into_iter()
            .fold((0f64, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min == max {
            min -= 1.0;
            max += 1.0;
        }
        Self { min, max }
    }

    fn y(&self, value: f64) -> f64 {
        HEIGHT - PAD_Y - (value - self.min) * (HEIGHT - TOP - PAD_Y) / (self.max - self.min)
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=TICKS).map(|i| self.min + (self.max - self.min) * i as f64 / TICKS as f64)
    }
}

pub fn outcome_pie(slices: &[CategoryCount]) -> String {
    if slices.is_empty() {
        return empty_chart("Call outcomes");
    }

    let (cx, cy, radius) = (WIDTH / 2.0, HEIGHT / 2.0, 90.0);
    let total: usize = slices.iter().map(|s| s.count).sum();
    let mut body = String::new();
    let mut angle = -PI / 2.0;

    for (index, slice) in slices.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let sweep = 2.0 * PI * slice.count as f64 / total as f64;
        let label = escape_html(&slice.label);

        if slices.len() == 1 {
            body.push_str(&format!(
                r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="{color}"><title>{label}: {}</title></circle>"#,
                slice.count
            ));
        } else {
            let (x1, y1) = polar(cx, cy, radius, angle);
            let (x2, y2) = polar(cx, cy, radius, angle + sweep);
            let large = if sweep > PI { 1 } else { 0 };
            body.push_str(&format!(
                r#"<path d="M {cx} {cy} L {x1:.2} {y1:.2} A {radius} {radius} 0 {large} 1 {x2:.2} {y2:.2} Z" fill="{color}" stroke="white" stroke-width="2"><title>{label}: {}</title></path>"#,
                slice.count
            ));
        }

        let mid = angle + sweep / 2.0;
        let (lx, ly) = polar(cx, cy, radius + 16.0, mid);
        let anchor = if lx > cx { "start" } else { "end" };
        body.push_str(&format!(
            r#"<text class="chart-label" x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}" dominant-baseline="central">{label} {:.0}%</text>"#,
            slice.percent
        ));
        angle += sweep;
    }

    svg("Call outcomes", &body)
}

pub fn sentiment_bars(counts: &[CategoryCount]) -> String {
    let labels: Vec<String> = counts.iter().map(|c| c.label.clone()).collect();
    let series = [Series {
        name: "Number of Calls",
        color: PALETTE[0],
        values: counts.iter().map(|c| c.count as f64).collect(),
    }];
    bar_chart("Carrier sentiment", &labels, &series)
}

pub fn savings_by_attempts_bars(groups: &[AttemptSavings]) -> String {
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    let series = [Series {
        name: "Average Savings",
        color: PALETTE[1],
        values: groups.iter().map(|g| g.avg_savings as f64).collect(),
    }];
    bar_chart("Negotiation performance by attempts", &labels, &series)
}

pub fn rate_comparison_bars(points: &[RatePoint]) -> String {
    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
    let series = [
        Series {
            name: "Load Board Rate",
            color: PALETTE[0],
            values: points.iter().map(|p| p.loadboard_rate).collect(),
        },
        Series {
            name: "Carrier Offer",
            color: PALETTE[2],
            values: points.iter().map(|p| p.carrier_offer).collect(),
        },
        Series {
            name: "Agreed Rate",
            color: PALETTE[1],
            values: points.iter().map(|p| p.agreed_rate).collect(),
        },
    ];
    bar_chart("Rate comparison", &labels, &series)
}

/// Daily total savings (left axis) against average call minutes (right axis).
pub fn daily_lines(points: &[DailyPoint]) -> String {
    if points.is_empty() {
        return empty_chart("Daily savings and call duration");
    }

    let savings = Scale::including_zero(points.iter().map(|p| p.total_savings as f64));
    let minutes = Scale::including_zero(points.iter().map(|p| p.avg_duration_minutes));
    let step = x_step(points.len());
    let x = |index: usize| PAD_X + index as f64 * step;

    let mut body = String::new();
    for (left, right) in savings.ticks().zip(minutes.ticks()) {
        let y = savings.y(left);
        body.push_str(&format!(
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y:.2}" x2="{}" y2="{y:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{}</text><text class="chart-label" x="{}" y="{:.2}" text-anchor="start">{}</text>"#,
            WIDTH - PAD_X,
            PAD_X - 10.0,
            y + 4.0,
            axis_value(left),
            WIDTH - PAD_X + 10.0,
            y + 4.0,
            axis_value(right),
        ));
    }
    body.push_str(&zero_line(&savings));

    let savings_path = polyline(points.iter().enumerate().map(|(i, p)| {
        (x(i), savings.y(p.total_savings as f64))
    }));
    let minutes_path = polyline(points.iter().enumerate().map(|(i, p)| {
        (x(i), minutes.y(p.avg_duration_minutes))
    }));
    body.push_str(&format!(
        r#"<path class="chart-line" d="{savings_path}" /><path class="chart-line secondary" d="{minutes_path}" />"#
    ));

    for (index, point) in points.iter().enumerate() {
        body.push_str(&format!(
            r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="4"><title>{}: {}</title></circle><circle class="chart-point secondary" cx="{:.2}" cy="{:.2}" r="4"><title>{}: {} min</title></circle>"#,
            x(index),
            savings.y(point.total_savings as f64),
            point.label,
            currency(point.total_savings),
            x(index),
            minutes.y(point.avg_duration_minutes),
            point.label,
            point.avg_duration_minutes,
        ));
    }

    body.push_str(&x_labels(points.iter().map(|p| p.label.as_str()), x));
    body.push_str(&legend(&[
        ("Total Savings", PALETTE[1]),
        ("Avg Duration (min)", PALETTE[0]),
    ]));
    svg("Daily savings and call duration", &body)
}

pub fn duration_scatter(points: &[DurationPoint]) -> String {
    if points.is_empty() {
        return empty_chart("Call duration distribution");
    }

    let scale = Scale::including_zero(points.iter().map(|p| p.minutes as f64));
    let step = x_step(points.len());
    let x = |index: usize| PAD_X + index as f64 * step;

    let mut body = grid(&scale);
    for (index, point) in points.iter().enumerate() {
        body.push_str(&format!(
            r#"<circle class="chart-dot" cx="{:.2}" cy="{:.2}" r="4"><title>Call {}: {} min ({})</title></circle>"#,
            x(index),
            scale.y(point.minutes as f64),
            point.call,
            point.minutes,
            point.status.as_str(),
        ));
    }
    let calls: Vec<String> = points.iter().map(|p| p.call.to_string()).collect();
    body.push_str(&x_labels(calls.iter().map(String::as_str), x));
    svg("Call duration distribution", &body)
}

fn bar_chart(title: &str, labels: &[String], series: &[Series<'_>]) -> String {
    if labels.is_empty() {
        return empty_chart(title);
    }

    let scale = Scale::including_zero(series.iter().flat_map(|s| s.values.iter().copied()));
    let group_width = (WIDTH - PAD_X * 2.0) / labels.len() as f64;
    let bar_width = group_width * 0.7 / series.len() as f64;
    let zero = scale.y(0.0);

    let mut body = grid(&scale);
    for (group, label) in labels.iter().enumerate() {
        let label = escape_html(label);
        let group_x = PAD_X + group as f64 * group_width + group_width * 0.15;
        for (offset, s) in series.iter().enumerate() {
            let value = s.values.get(group).copied().unwrap_or_default();
            let y = scale.y(value);
            body.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{bar_width:.2}" height="{:.2}" rx="3" fill="{}"><title>{label} · {}: {}</title></rect>"#,
                group_x + offset as f64 * bar_width,
                y.min(zero),
                (zero - y).abs(),
                s.color,
                s.name,
                axis_value(value),
            ));
        }
    }
    body.push_str(&zero_line(&scale));
    body.push_str(&x_labels(labels.iter().map(String::as_str), |index| {
        PAD_X + (index as f64 + 0.5) * group_width
    }));
    if series.len() > 1 {
        let entries: Vec<(&str, &str)> = series.iter().map(|s| (s.name, s.color)).collect();
        body.push_str(&legend(&entries));
    }
    svg(title, &body)
}

fn grid(scale: &Scale) -> String {
    let mut out = String::new();
    for value in scale.ticks() {
        let y = scale.y(value);
        out.push_str(&format!(
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y:.2}" x2="{}" y2="{y:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{}</text>"#,
            WIDTH - PAD_X,
            PAD_X - 10.0,
            y + 4.0,
            axis_value(value),
        ));
    }
    out
}

fn zero_line(scale: &Scale) -> String {
    let y = scale.y(0.0);
    format!(
        r#"<line class="chart-axis" x1="{PAD_X}" y1="{y:.2}" x2="{}" y2="{y:.2}" />"#,
        WIDTH - PAD_X
    )
}

fn x_labels<'a>(labels: impl Iterator<Item = &'a str>, x: impl Fn(usize) -> f64) -> String {
    let labels: Vec<&str> = labels.collect();
    let every = if labels.len() > 8 { 2 } else { 1 };
    let mut out = String::new();
    for (index, label) in labels.iter().enumerate() {
        if index % every != 0 {
            continue;
        }
        out.push_str(&format!(
            r#"<text class="chart-label" x="{:.2}" y="{}" text-anchor="middle">{}</text>"#,
            x(index),
            HEIGHT - PAD_Y + 18.0,
            escape_html(label),
        ));
    }
    out
}

fn legend(entries: &[(&str, &str)]) -> String {
    let mut out = String::new();
    let mut x = PAD_X;
    for (name, color) in entries {
        out.push_str(&format!(
            r#"<rect x="{x}" y="4" width="10" height="10" rx="2" fill="{color}" /><text class="chart-label" x="{}" y="13">{name}</text>"#,
            x + 14.0,
        ));
        x += 24.0 + name.len() as f64 * 6.5;
    }
    out
}

fn polyline(points: impl Iterator<Item = (f64, f64)>) -> String {
    points
        .enumerate()
        .map(|(index, (x, y))| format!("{} {x:.2} {y:.2}", if index == 0 { "M" } else { "L" }))
        .collect::<Vec<_>>()
        .join(" ")
}

fn x_step(count: usize) -> f64 {
    if count > 1 {
        (WIDTH - PAD_X * 2.0) / (count - 1) as f64
    } else {
        0.0
    }
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn axis_value(value: f64) -> String {
    // `+ 0.0` turns -0.0 into 0.0.
    let rounded = (value * 10.0).round() / 10.0 + 0.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn empty_chart(title: &str) -> String {
    svg(
        title,
        r#"<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>"#,
    )
}

fn svg(title: &str, body: &str) -> String {
    format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{title}">{body}</svg>"#
    )
}
