use content_authz::{Decision, ResourceKind};
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Policy decisions segmented by operation and outcome.
    pub static ref AUTHZ_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "authz_decisions_total",
        "Authorization decisions segmented by operation and outcome",
        &["operation", "decision"]
    )
    .expect("failed to register authz_decisions_total");

    /// Ownership lookups that found nothing, by resource kind.
    pub static ref AUTHZ_RESOURCE_NOT_FOUND_TOTAL: IntCounterVec = register_int_counter_vec!(
        "authz_resource_not_found_total",
        "Ownership chain lookups that could not be resolved",
        &["kind"]
    )
    .expect("failed to register authz_resource_not_found_total");
}

pub fn record_decision(operation: &str, decision: Decision) {
    AUTHZ_DECISIONS_TOTAL
        .with_label_values(&[operation, decision.as_str()])
        .inc();
}

pub fn record_not_found(kind: ResourceKind) {
    AUTHZ_RESOURCE_NOT_FOUND_TOTAL
        .with_label_values(&[kind.as_str()])
        .inc();
}
