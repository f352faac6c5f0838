//! HTML document shell for the profile screen.

use std::fmt::Write;

use super::ProfilePage;
use crate::chart::svg::escape;
use crate::chart::Element;
use crate::format::{format_ratio, format_xp};

const STYLE: &str = "\
body { margin: 0; background: #111827; color: #F3F4F6; font-family: sans-serif; }
.profile-container { max-width: 960px; margin: 0 auto; padding: 24px; }
.profile-header { display: flex; justify-content: space-between; align-items: center; }
.logout-hint { color: #9CA3AF; font-size: 14px; }
.profile-content { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin: 24px 0; }
.panel { background: #1F2937; border-radius: 8px; padding: 16px; }
.panel h1 { margin: 0 0 8px; font-size: 18px; color: #9CA3AF; }
.xp-value, .ratio-value { font-size: 32px; font-weight: bold; color: #4ADE80; }
.audit-details { color: #9CA3AF; }
.chart-region { background: #1F2937; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
.error-message { color: #F87171; }
";

/// Render the full dashboard document
pub fn document(page: &ProfilePage) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Profile</title>\n");
    let _ = writeln!(html, "<style>\n{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<div class=\"profile-container\">\n");

    let _ = writeln!(
        html,
        "<header class=\"profile-header\"><div class=\"profile-info\"><h2>{}</h2></div>\
         <span class=\"logout-hint\">Run <code>xpdash logout</code> to sign out</span></header>",
        escape(&page.welcome())
    );

    html.push_str("<div class=\"profile-content\">\n");
    html.push_str(&total_xp_panel(page));
    html.push_str(&audit_panel(page));
    html.push_str("</div>\n");

    html.push_str(&chart_region("XP Progress", &page.xp_chart));
    html.push_str(&chart_region("Skills", &page.skills_chart));

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn total_xp_panel(page: &ProfilePage) -> String {
    let body = match &page.total_xp {
        Ok(total) => format!("<div class=\"xp-value\">{}</div>", escape(&format_xp(*total))),
        Err(e) => error_message(e),
    };
    format!("<div class=\"panel total-xp\"><h1>Total XP</h1>{}</div>\n", body)
}

fn audit_panel(page: &ProfilePage) -> String {
    let body = match &page.audit {
        Ok(audit) => {
            let ratio = audit
                .audit_ratio
                .map(format_ratio)
                .unwrap_or_else(|| "-".to_string());
            format!(
                "<div class=\"ratio-value\">{}</div>\
                 <div class=\"audit-details\">Done {} | Received {}</div>",
                escape(&ratio),
                escape(&format_xp(audit.total_up)),
                escape(&format_xp(audit.total_down)),
            )
        }
        Err(e) => error_message(e),
    };
    format!("<div class=\"panel audit-ratio\"><h1>Audit Ratio</h1>{}</div>\n", body)
}

fn chart_region(title: &str, chart: &Result<Element, String>) -> String {
    let body = match chart {
        Ok(svg) => svg.render(),
        Err(e) => error_message(e),
    };
    format!(
        "<section class=\"chart-region\"><h1>{}</h1>{}</section>\n",
        escape(title),
        body
    )
}

fn error_message(message: &str) -> String {
    format!(
        "<p class=\"error-message\">Failed to load: {}</p>",
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartOptions, ChartRenderer};
    use crate::client::{AuditStats, User};

    fn page() -> ProfilePage {
        ProfilePage {
            user: Ok(User {
                login: Some("jdoe".into()),
                first_name: Some("John".into()),
                last_name: Some("<Doe>".into()),
            }),
            total_xp: Ok(1_250_000.0),
            audit: Ok(AuditStats {
                audit_ratio: Some(0.96),
                total_up: 480_000.0,
                total_down: 500_000.0,
            }),
            xp_chart: Ok(ChartRenderer::new(ChartOptions::xp_progress()).render(&[])),
            skills_chart: Err("HTTP error! status: 500".into()),
        }
    }

    #[test]
    fn test_document_panels() {
        let html = document(&page());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Welcome, &lt;Doe&gt; John!"));
        assert!(html.contains("<div class=\"xp-value\">1.25 MB</div>"));
        assert!(html.contains("<div class=\"ratio-value\">1.0</div>"));
        assert!(html.contains("Done 480.0 kB | Received 500.0 kB"));
        assert!(html.contains("xpdash logout"));
    }

    #[test]
    fn test_document_regions() {
        let html = document(&page());

        assert!(html.contains("No data available"));
        assert!(html.contains("Failed to load: HTTP error! status: 500"));
        assert_eq!(html.matches("<section class=\"chart-region\">").count(), 2);
    }
}
