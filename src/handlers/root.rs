//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with the metrics endpoint and the active collectors.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");

    // Calculate actual uptime from service start time
    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);

    let cluster = state
        .config
        .cluster_name
        .as_deref()
        .or(state.config.cluster_url.as_deref())
        .unwrap_or("-");
    let cluster = escape_html(cluster);

    let collectors: String = state
        .collectors
        .iter()
        .map(|c| format!("<li><code>{}</code></li>", escape_html(c.name)))
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Isilon Disk Exporter</title>
    <style>
        body {{ 
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; 
            margin: 0; 
            padding: 20px; 
            background: #f5f5f5; 
            line-height: 1.6;
        }}
        .container {{ 
            max-width: 900px; 
            margin: 0 auto; 
            background: white; 
            padding: 40px; 
            border-radius: 8px; 
            box-shadow: 0 2px 8px rgba(0,0,0,0.1); 
        }}
        h1 {{ 
            color: #333; 
            border-bottom: 3px solid #007bff; 
            padding-bottom: 15px; 
        }}
        .info-label {{ 
            font-weight: 600; 
            color: #555; 
        }}
        code {{
            background: #e9ecef;
            padding: 2px 6px;
            border-radius: 3px;
            font-family: 'Courier New', monospace;
        }}
    </style>
</head>
<body>
<div class="container">
    <h1>Isilon Disk Exporter</h1>
    <p><span class="info-label">Version</span> {version}</p>
    <p><span class="info-label">Uptime</span> {uptime}</p>
    <p><span class="info-label">Cluster</span> {cluster}</p>

    <h2>Endpoints</h2>
    <p><a href="/metrics">/metrics</a>: Prometheus-compatible metrics endpoint</p>

    <h2>Enabled Collectors</h2>
    <ul>{collectors}</ul>
</div>
</body>
</html>"#,
        version = version,
        uptime = uptime_str,
        cluster = cluster,
        collectors = collectors
    );

    Html(html)
}

/// Escapes text for use in HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
