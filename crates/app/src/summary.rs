//! Run summary output and process exit codes.

use std::fmt::Write as _;

use stocksync_domain::InventorySyncResult;

/// Every partner synced cleanly.
pub const EXIT_SUCCESS: u8 = 0;
/// The run finished but the aggregate reports failure.
pub const EXIT_FAILED: u8 = 1;
/// The run could not be carried out (config, database, lock, mapping load).
pub const EXIT_FAULT: u8 = 2;

pub fn exit_code(result: &InventorySyncResult) -> u8 {
    if result.success {
        EXIT_SUCCESS
    } else {
        EXIT_FAILED
    }
}

pub fn render_json(result: &InventorySyncResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Human-readable summary, one line per partner.
pub fn render_text(result: &InventorySyncResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Inventory sync {}: {} partner(s), {} processed, {} updated, {} failed, {} skipped",
        if result.success { "succeeded" } else { "failed" },
        result.partners_processed,
        result.items_processed,
        result.items_updated,
        result.items_failed,
        result.items_skipped,
    );
    for error in &result.errors {
        let _ = writeln!(out, "  error: {error}");
    }
    for partner in &result.partner_results {
        let _ = write!(
            out,
            "  {} [{}] updated={} failed={} skipped={}",
            partner.partner_shop,
            if partner.success { "ok" } else { "failed" },
            partner.items_updated,
            partner.items_failed,
            partner.items_skipped,
        );
        if let Some(error_type) = partner.error_type {
            let _ = write!(out, " error_type={error_type}");
        }
        out.push('\n');
        for error in &partner.errors {
            let _ = writeln!(out, "    - {error}");
        }
    }
    out
}
