use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Post cache events (hit/miss/error).
    pub static ref POST_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "post_cache_events_total",
        "Post cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register post_cache_events_total");

    /// Completed HTTP requests by method and status code.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "HTTP requests segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register http_requests_total");
}
