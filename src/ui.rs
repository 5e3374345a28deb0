use crate::charts;
use crate::format::{self, escape_html};
use crate::models::{DashboardResponse, DateRange};

const FILTERS: [(&str, &str); 5] = [
    ("all", "All Time"),
    ("7d", "Last 7 Days"),
    ("30d", "Last 30 Days"),
    ("90d", "Last 90 Days"),
    ("custom", "Custom"),
];

pub fn render_index(dashboard: &DashboardResponse) -> String {
    let content = if dashboard.showing == 0 {
        EMPTY_STATE.to_string()
    } else {
        render_dashboard(dashboard)
    };

    INDEX_HTML
        .replace("{{LAST_UPDATED}}", &escape_html(&dashboard.last_updated))
        .replace("{{FILTERS}}", &render_filters(&dashboard.range))
        .replace("{{CUSTOM_FORM}}", &render_custom_form(&dashboard.range))
        .replace("{{SHOWING}}", &dashboard.showing.to_string())
        .replace("{{TOTAL}}", &dashboard.total_available.to_string())
        .replace("{{CONTENT}}", &content)
}

pub fn render_kpi_card(title: &str, value: &str, subtitle: &str) -> String {
    format!(
        r#"<div class="stat"><span class="label">{}</span><span class="value">{}</span><span class="caption">{}</span></div>"#,
        escape_html(title),
        escape_html(value),
        escape_html(subtitle),
    )
}

fn render_chart_card(title: &str, subtitle: Option<&str>, svg: &str) -> String {
    let subtitle = subtitle
        .map(|text| format!(r#"<p class="subtitle">{}</p>"#, escape_html(text)))
        .unwrap_or_default();
    format!(r#"<div class="chart-card"><h2>{}</h2>{subtitle}{svg}</div>"#, escape_html(title))
}

fn render_dashboard(dashboard: &DashboardResponse) -> String {
    let data = &dashboard.data;
    let kpis = &data.kpis;

    let primary = [
        render_kpi_card("Total Calls", &kpis.total_calls.to_string(), range_caption(&dashboard.range)),
        render_kpi_card(
            "Success Rate",
            &format!("{}%", format::one_decimal(kpis.success_rate)),
            "Completed calls",
        ),
        render_kpi_card(
            "Completed Calls",
            &kpis.completed_calls.to_string(),
            &format!("{} total", kpis.total_calls),
        ),
        render_kpi_card(
            "Avg Call Duration",
            &format::duration(kpis.avg_call_duration_secs),
            "Per call",
        ),
    ];
    let secondary = [
        render_kpi_card(
            "Total Savings",
            &format::signed_currency(kpis.total_savings),
            "From negotiations",
        ),
        render_kpi_card(
            "Avg Savings Per Call",
            &format::signed_currency(kpis.avg_savings),
            "Average negotiation savings",
        ),
        render_kpi_card(
            "Avg Negotiation Attempts",
            &format::one_decimal(kpis.avg_negotiation_attempts),
            "Per call",
        ),
        render_kpi_card(
            "Avg Rate Difference",
            &format::currency(kpis.avg_rate_difference),
            "Per call",
        ),
    ];

    let charts = [
        render_chart_card("Call Outcomes", None, &charts::outcome_pie(&data.outcomes)),
        render_chart_card("Carrier Sentiment", None, &charts::sentiment_bars(&data.sentiments)),
        render_chart_card(
            "Negotiation Performance by Attempts",
            Some("Average savings based on number of negotiation rounds"),
            &charts::savings_by_attempts_bars(&data.savings_by_attempts),
        ),
        render_chart_card(
            "Load Board Rate vs Carrier Offer vs Agreed Rate (Last 10 Calls)",
            None,
            &charts::rate_comparison_bars(&data.rate_comparison),
        ),
        render_chart_card(
            "Daily Total Savings vs Average Call Duration",
            Some("Total negotiation savings per day vs average call duration (minutes) per day"),
            &charts::daily_lines(&data.daily),
        ),
        render_chart_card(
            "Call Duration Distribution",
            None,
            &charts::duration_scatter(&data.durations),
        ),
    ];

    format!(
        r#"<section class="panel">{}</section><section class="panel">{}</section><section class="chart-grid-area">{}</section>"#,
        primary.concat(),
        secondary.concat(),
        charts.concat(),
    )
}

fn render_filters(active: &DateRange) -> String {
    let active = active.key();
    FILTERS
        .iter()
        .map(|(key, label)| {
            let class = if *key == active { "tab active" } else { "tab" };
            format!(r#"<a class="{class}" href="/?range={key}">{label}</a>"#)
        })
        .collect()
}

fn render_custom_form(range: &DateRange) -> String {
    let DateRange::Custom { start, end } = range else {
        return String::new();
    };
    let value = |date: &Option<chrono::NaiveDate>| {
        date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    };
    format!(
        r#"<form class="custom-range" method="get" action="/"><input type="hidden" name="range" value="custom" /><input type="date" name="start" value="{}" /><span>to</span><input type="date" name="end" value="{}" /><button type="submit">Apply</button></form>"#,
        value(start),
        value(end),
    )
}

fn range_caption(range: &DateRange) -> &'static str {
    match range {
        DateRange::All => "All time",
        DateRange::LastDays { days: 7 } => "Last 7 days",
        DateRange::LastDays { days: 30 } => "Last 30 days",
        DateRange::LastDays { days: 90 } => "Last 90 days",
        DateRange::LastDays { .. } => "Rolling window",
        DateRange::Custom { .. } => "Custom range",
    }
}

const EMPTY_STATE: &str = r#"<section class="empty">
      <h2>No Call Data Available</h2>
      <p>No completed, canceled, or failed runs found for the selected date range.</p>
      <p class="hint">Refresh the page to load the latest data.</p>
    </section>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Carrier Calls Analytics</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1280px, 100%);
      margin: 0 auto;
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: flex-end;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 0.95rem;
    }

    .updated {
      text-align: right;
      font-size: 0.9rem;
      color: #6b645d;
    }

    .updated strong {
      display: block;
      color: var(--accent-2);
    }

    .filters {
      display: grid;
      gap: 14px;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .custom-range {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 8px;
    }

    .custom-range input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 8px 10px;
      font: inherit;
    }

    .custom-range button {
      border: none;
      border-radius: 999px;
      padding: 9px 18px;
      font: inherit;
      font-weight: 600;
      color: white;
      background: var(--accent-2);
      cursor: pointer;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
      margin-bottom: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .caption {
      font-size: 0.85rem;
      color: #8b857d;
    }

    .chart-grid-area {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(480px, 1fr));
      gap: 16px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .chart-card h2 {
      margin: 0 0 6px;
      font-size: 1.1rem;
    }

    .chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-line.secondary {
      stroke: var(--accent-2);
      stroke-width: 2;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-point.secondary {
      stroke: var(--accent-2);
    }

    .chart-dot {
      fill: var(--accent-2);
      opacity: 0.7;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-axis {
      stroke: rgba(47, 72, 88, 0.25);
      stroke-dasharray: 4 6;
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .empty {
      background: white;
      border-radius: 20px;
      padding: 64px 24px;
      text-align: center;
      color: #6b645d;
    }

    .empty h2 {
      color: var(--ink);
      margin-top: 0;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      .chart-grid-area {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Carrier Calls Analytics</h1>
        <p class="subtitle">Inbound carrier call outcomes, negotiation savings and rates.</p>
      </div>
      <div class="updated">Last Updated<strong>{{LAST_UPDATED}}</strong></div>
    </header>

    <section class="filters">
      <nav class="tabs">{{FILTERS}}</nav>
      {{CUSTOM_FORM}}
      <p class="hint">Showing <strong>{{SHOWING}}</strong> of <strong>{{TOTAL}}</strong> total metrics</p>
    </section>

    {{CONTENT}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallStatus, MetricRecord};
    use crate::stats::build_dashboard;

    fn dashboard(records: &[MetricRecord], range: DateRange) -> DashboardResponse {
        DashboardResponse {
            range,
            showing: records.len(),
            total_available: records.len() + 2,
            running: 0,
            last_updated: "2025-10-24 09:00:00".to_string(),
            data: build_dashboard(records),
        }
    }

    fn record() -> MetricRecord {
        MetricRecord {
            id: "1".to_string(),
            run_id: None,
            organization_id: None,
            call_outcome: Some("accepted".to_string()),
            carrier_sentiment: Some("positive".to_string()),
            call_status: CallStatus::Completed,
            call_duration: 300.0,
            negotiation_attempts: 2,
            load_loadboard_rate: 1500.0,
            carrier_initial_offer: 1800.0,
            load_agreed_rate: 1650.0,
            rate_difference: 150.0,
            negotiation_performance: 150.0,
            created_at: "2025-10-23T22:22:45Z".parse().unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn renders_kpis_and_charts() {
        let html = render_index(&dashboard(&[record()], DateRange::All));
        assert!(html.contains("Showing <strong>1</strong> of <strong>3</strong>"));
        assert!(html.contains("5m 0s"));
        assert!(html.contains("+$150"));
        assert!(html.contains("100.0%"));
        assert!(html.contains(">2.0<"));
        assert!(html.contains("Call Duration Distribution"));
        assert_eq!(html.matches("<svg").count(), 6);
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<a class="tab active" href="/?range=all">All Time</a>"#));
    }

    #[test]
    fn empty_selection_shows_placeholder() {
        let html = render_index(&dashboard(&[], DateRange::LastDays { days: 7 }));
        assert!(html.contains("No Call Data Available"));
        assert!(!html.contains("<svg"));
        assert!(html.contains(r#"<a class="tab active" href="/?range=7d">"#));
        assert!(!html.contains("custom-range\""));
    }

    #[test]
    fn custom_range_prefills_the_form() {
        let range = DateRange::Custom {
            start: chrono::NaiveDate::from_ymd_opt(2025, 10, 1),
            end: None,
        };
        let html = render_index(&dashboard(&[], range));
        assert!(html.contains(r#"name="start" value="2025-10-01""#));
        assert!(html.contains(r#"name="end" value="""#));
    }

    #[test]
    fn kpi_card_escapes_text() {
        let card = render_kpi_card("A<B", "1 & 2", "x");
        assert!(card.contains("A&lt;B"));
        assert!(card.contains("1 &amp; 2"));
    }
}
