//! Static HTML rendering of a [`Dashboard`].

use crate::dashboard::Dashboard;

const TEMPLATE: &str = include_str!("../assets/dashboard.html");
const PLACEHOLDER: &str = "__DASHBOARD_JSON__";

/// Render a self-contained page with the snapshot embedded as JSON.
///
/// # Errors
///
/// Propagates snapshot serialisation failures.
pub fn render_html(dashboard: &Dashboard) -> serde_json::Result<String> {
    let json = dashboard.to_json()?;
    Ok(TEMPLATE.replacen(PLACEHOLDER, &script_safe(&json), 1))
}

/// Keep embedded JSON from closing the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use p1dash_types::Reading;
    use time::macros::datetime;

    #[test]
    fn test_template_has_placeholder() {
        assert_eq!(TEMPLATE.matches(PLACEHOLDER).count(), 1);
    }

    #[test]
    fn test_render_embeds_snapshot() {
        let readings = [
            Reading::new(datetime!(2024-03-05 10:00 +01:00), 100.0, 1.0, 0.0),
            Reading::new(datetime!(2024-03-05 10:15 +01:00), 100.0, 1.1, 0.0),
        ];
        let dashboard = Dashboard::build(&readings, datetime!(2024-03-05 11:00 UTC)).unwrap();
        let html = render_html(&dashboard).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains(PLACEHOLDER));
        assert!(html.contains("\"di 5 mrt 2024\""));
        assert!(html.contains("fetch('/refresh')"));
    }

    #[test]
    fn test_script_safe() {
        assert_eq!(script_safe(r#"{"t":"</script>"}"#), r#"{"t":"<\/script>"}"#);
    }
}
