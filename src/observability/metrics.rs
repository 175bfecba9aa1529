//! Router metrics.
//!
//! # Metrics
//! - `router_navigations_total` (counter): paths admitted for reconciliation
//! - `router_navigations_superseded_total` (counter): in-flight reconciliations
//!   dropped because a newer path arrived
//! - `router_resolution_errors_total` (counter): resolver and executor
//!   failures by `kind`
//! - `router_disposal_errors_total` (counter): failed disposals
//! - `router_not_found_total` (counter): navigations ending in a miss
//! - `router_views_activated_total` (counter): executor invocations that
//!   produced a result
//! - `router_views_disposed_total` (counter): results disposed
//! - `router_active_views` (gauge): currently installed results
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; the host picks the exporter
//! - Labels kept to a fixed, low-cardinality set

use crate::error::RouterError;

pub fn record_navigation() {
    ::metrics::counter!("router_navigations_total").increment(1);
}

pub fn record_superseded() {
    ::metrics::counter!("router_navigations_superseded_total").increment(1);
}

pub fn record_error(error: &RouterError) {
    match error {
        RouterError::Disposal { .. } => {
            ::metrics::counter!("router_disposal_errors_total").increment(1);
        }
        _ => {
            ::metrics::counter!("router_resolution_errors_total", "kind" => error.kind())
                .increment(1);
        }
    }
}

pub fn record_not_found() {
    ::metrics::counter!("router_not_found_total").increment(1);
}

pub fn record_activated(count: usize) {
    ::metrics::counter!("router_views_activated_total").increment(count as u64);
}

pub fn record_disposed(count: usize) {
    ::metrics::counter!("router_views_disposed_total").increment(count as u64);
}

pub fn record_active_views(count: usize) {
    ::metrics::gauge!("router_active_views").set(count as f64);
}
