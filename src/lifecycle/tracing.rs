//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); actors identify
//! themselves with an `entity_type` field instead.
//!
//! ```bash
//! RUST_LOG=info qr-order orders --watch     # actor lifecycle, polls, failures
//! RUST_LOG=debug qr-order cart add --item 1  # every request with its payload
//! ```
//!
//! With `RUST_LOG=info` a polling session reads:
//!
//! ```text
//! INFO Actor started entity_type="Order"
//! INFO Created entity_type="Order" id=order_12 size=1
//! WARN Order poll failed error=Request failed: ...
//! INFO Order served id=order_12
//! INFO Deleted entity_type="Order" id=order_12 size=0
//! ```

/// Initializes the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
