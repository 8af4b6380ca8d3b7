//! HTML email body for the after-hours report.

use crate::report::transform::ConvertedReport;
use crate::report::window::TimeWindow;
use crate::vendor::SummaryRecord;

/// Rows that travelled strictly further than this (km) are highlighted.
pub const DISTANCE_FLAG_THRESHOLD_KM: f64 = 20.0;

const FLAGGED_ROW_STYLE: &str = "background-color:#f8d7da;color:#721c24;font-weight:bold";

const COLUMNS: [&str; 4] = ["Device Name", "Distance (km)", "Spent Fuel (L)", "Engine Hours"];

/// A rendered report, ready to hand to a [`Notifier`](crate::notify::Notifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub html: String,
}

pub struct HtmlRenderer {
    pub title: String,
    pub flag_threshold_km: f64,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            title: "After-Hours Summary Report".to_string(),
            flag_threshold_km: DISTANCE_FLAG_THRESHOLD_KM,
        }
    }

    pub fn with_threshold(flag_threshold_km: f64) -> Self {
        Self {
            flag_threshold_km,
            ..Self::new()
        }
    }

    pub fn is_flagged(&self, record: &SummaryRecord) -> bool {
        record.distance > self.flag_threshold_km
    }

    pub fn render(&self, report: &ConvertedReport, window: &TimeWindow) -> Document {
        let mut html = String::new();

        html.push_str(&format!(
            "<h2>{}<br><small>{} to {}</small></h2>",
            escape_html(&self.title),
            window.from_label(),
            window.to_label()
        ));

        html.push_str(r#"<table border="1" cellpadding="5" cellspacing="0"><tr>"#);
        for column in COLUMNS {
            html.push_str(&format!("<th>{}</th>", column));
        }
        html.push_str("</tr>");

        for record in report.records() {
            self.write_row(&mut html, record);
        }

        html.push_str("</table>");
        Document { html }
    }

    fn write_row(&self, html: &mut String, record: &SummaryRecord) {
        if self.is_flagged(record) {
            html.push_str(&format!(r#"<tr class="flagged" style="{}">"#, FLAGGED_ROW_STYLE));
        } else {
            html.push_str("<tr>");
        }

        html.push_str(&format!(
            "<td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            escape_html(&record.device_name),
            record.distance,
            record.spent_fuel,
            record.engine_hours
        ));
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::transform::convert;
    use chrono::DateTime;

    fn window() -> TimeWindow {
        TimeWindow::new(
            DateTime::parse_from_rfc3339("2024-01-01T18:00:00+11:00").unwrap(),
            DateTime::parse_from_rfc3339("2024-01-01T23:59:59+11:00").unwrap(),
        )
        .unwrap()
    }

    fn record(name: &str, metres: f64, fuel: f64, hours: f64) -> SummaryRecord {
        SummaryRecord {
            device_id: 1,
            device_name: name.to_string(),
            max_speed: 90.0,
            average_speed: 40.0,
            distance: metres,
            spent_fuel: fuel,
            engine_hours: hours,
        }
    }

    fn flagged_rows(html: &str) -> usize {
        html.matches(r#"class="flagged""#).count()
    }

    #[test]
    fn test_truck_and_van_scenario() {
        let report = convert(vec![
            record("Truck A", 25000.0, 10.0, 2.0),
            record("Van B", 15000.0, 5.0, 1.0),
        ]);
        let doc = HtmlRenderer::new().render(&report, &window());

        assert!(doc.html.contains("2024-01-01 18:00 to 2024-01-01 23:59"));
        assert!(doc.html.contains(&format!(
            r#"<tr class="flagged" style="{}"><td>Truck A</td><td>25.00</td><td>10.00</td><td>2.00</td></tr>"#,
            FLAGGED_ROW_STYLE
        )));
        assert!(doc.html.contains("<tr><td>Van B</td><td>15.00</td><td>5.00</td><td>1.00</td></tr>"));
        assert_eq!(flagged_rows(&doc.html), 1);
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let renderer = HtmlRenderer::new();
        let report = convert(vec![
            record("Exactly", 20000.0, 0.0, 0.0),
            record("Just over", 20001.0, 0.0, 0.0),
        ]);

        assert!(!renderer.is_flagged(&report.records()[0]));
        assert!(renderer.is_flagged(&report.records()[1]));

        let doc = renderer.render(&report, &window());
        assert!(doc.html.contains("<tr><td>Exactly</td><td>20.00</td>"));
        assert_eq!(flagged_rows(&doc.html), 1);
    }

    #[test]
    fn test_custom_threshold() {
        let report = convert(vec![record("Van B", 15000.0, 5.0, 1.0)]);
        let doc = HtmlRenderer::with_threshold(10.0).render(&report, &window());
        assert_eq!(flagged_rows(&doc.html), 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = convert(vec![
            record("Truck A", 25000.0, 10.0, 2.0),
            record("Van B", 15000.0, 5.0, 1.0),
        ]);
        let renderer = HtmlRenderer::new();

        assert_eq!(renderer.render(&report, &window()), renderer.render(&report, &window()));
    }

    #[test]
    fn test_device_names_are_escaped() {
        let report = convert(vec![record("<b>Bob's</b> & co", 0.0, 0.0, 0.0)]);
        let doc = HtmlRenderer::new().render(&report, &window());

        assert!(doc.html.contains("&lt;b&gt;Bob&#39;s&lt;/b&gt; &amp; co"));
        assert!(!doc.html.contains("<b>Bob"));
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let doc = HtmlRenderer::new().render(&convert(Vec::new()), &window());
        assert!(doc.html.contains("<th>Device Name</th><th>Distance (km)</th>"));
        assert!(doc.html.ends_with("</tr></table>"));
    }
}
