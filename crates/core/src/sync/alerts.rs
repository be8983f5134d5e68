//! Alert email rendering for critical sync failures.

use stocksync_domain::{AlertMessage, CriticalErrorKind, CriticalSyncError};

/// Render a critical failure into subject, HTML and plain-text bodies.
pub fn render_alert(error: &CriticalSyncError) -> AlertMessage {
    let title = title(error.kind);
    let subject = format!("[StockSync] {title}: {}", error.partner_shop);

    let mut facts = vec![("Store".to_string(), error.partner_shop.clone())];
    if let Some(rate) = error.failure_rate {
        facts.push(("Failure rate".to_string(), format!("{:.1}%", rate * 100.0)));
    }
    if let Some(count) = error.consecutive_failures {
        facts.push(("Consecutive failures".to_string(), count.to_string()));
    }
    facts.push(("Alert type".to_string(), error.kind.to_string()));

    let action = action(error.kind);

    let mut text = format!("{title}\n\n{}\n\n", error.message);
    for (label, value) in &facts {
        text.push_str(&format!("{label}: {value}\n"));
    }
    text.push_str(&format!("\nDetails:\n{}\n\nWhat to do: {action}\n", error.details));

    let rows: String = facts
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td style=\"padding:4px 12px 4px 0;color:#666\">{}</td><td>{}</td></tr>",
                escape_html(label),
                escape_html(value)
            )
        })
        .collect();
    let html = format!(
        "<div style=\"font-family:sans-serif\">\
         <h2 style=\"color:#b42318\">{}</h2>\
         <p>{}</p>\
         <table>{rows}</table>\
         <h3>Details</h3>\
         <pre style=\"background:#f4f4f5;padding:12px;white-space:pre-wrap\">{}</pre>\
         <p><strong>What to do:</strong> {}</p>\
         </div>",
        escape_html(title),
        escape_html(&error.message),
        escape_html(&error.details),
        escape_html(action),
    );

    AlertMessage { subject, html, text }
}

fn title(kind: CriticalErrorKind) -> &'static str {
    match kind {
        CriticalErrorKind::TokenRevoked => "Partner access revoked",
        CriticalErrorKind::StoreUnreachable => "Partner store unreachable",
        CriticalErrorKind::HighFailureRate => "High inventory sync failure rate",
        CriticalErrorKind::ConsecutiveFailures => "Repeated inventory sync failures",
        CriticalErrorKind::OwnerStoreDisconnected => "Store disconnected",
    }
}

fn action(kind: CriticalErrorKind) -> &'static str {
    match kind {
        CriticalErrorKind::TokenRevoked => {
            "Ask the partner to reinstall the app or reconnect their store."
        }
        CriticalErrorKind::StoreUnreachable => {
            "No action is needed if this clears on the next run; otherwise contact the partner."
        }
        CriticalErrorKind::HighFailureRate => {
            "Check that the mapped products still exist and that inventory tracking is enabled."
        }
        CriticalErrorKind::ConsecutiveFailures => {
            "Review the recent sync logs for this partner and fix the recurring error."
        }
        CriticalErrorKind::OwnerStoreDisconnected => {
            "Reconnect your store; no partner inventory is synced until you do."
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
