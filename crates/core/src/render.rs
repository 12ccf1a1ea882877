use crate::domain::series::MetricRow;
use crate::report::SortColumn;
use chrono::NaiveDate;
// Writing into a String cannot fail, so write! results are ignored below.
use std::fmt::Write;

const COLUMNS: [(SortColumn, &str); 8] = [
    (SortColumn::Ticker, "Ticker"),
    (SortColumn::LastClose, "Current Price"),
    (SortColumn::High1y, "1Y High % Diff"),
    (SortColumn::High2y, "2Y High % Diff"),
    (SortColumn::High5y, "5Y High % Diff"),
    (SortColumn::Low1y, "1Y Low % Diff"),
    (SortColumn::Low2y, "2Y Low % Diff"),
    (SortColumn::Low5y, "5Y Low % Diff"),
];

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:right}\
td:first-child,th:first-child{text-align:left}\
.neg{color:#b00020}.pos{color:#1b5e20}";

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub as_of: NaiveDate,
    /// Render column headers as `?sort=` links. Off for static exports.
    pub sort_links: bool,
}

/// Renders the metrics table as a standalone HTML document.
pub fn render_table_page(rows: &[MetricRow], opts: PageOptions) -> String {
    let mut html = String::with_capacity(1024 + rows.len() * 256);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Stock Data</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n<h1>Stock Data</h1>\n");
    let _ = writeln!(html, "<p>As of {}</p>", opts.as_of.format("%Y-%m-%d"));

    html.push_str("<table>\n<thead>\n<tr>");
    for (column, label) in COLUMNS {
        if opts.sort_links {
            let _ = write!(
                html,
                "<th><a href=\"/?sort={}\">{}</a></th>",
                column.as_str(),
                label
            );
        } else {
            let _ = write!(html, "<th>{label}</th>");
        }
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        let _ = write!(html, "<td>{}</td>", escape_html(&row.ticker));
        let _ = write!(html, "<td>{:.2}</td>", row.last_close);
        for pct in [
            row.high_1y_diff_pct,
            row.high_2y_diff_pct,
            row.high_5y_diff_pct,
            row.low_1y_diff_pct,
            row.low_2y_diff_pct,
            row.low_5y_diff_pct,
        ] {
            let _ = write!(html, "<td class=\"{}\">{pct:.2}</td>", sign_class(pct));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn sign_class(pct: f64) -> &'static str {
    if pct < 0.0 {
        "neg"
    } else {
        "pos"
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
