//! HTTP control endpoint for the debug source.
//!
//! `GET /?plug=1&level=750` sets the charging flag and a charge level in
//! thousandths. Any `plug` value other than `0` means plugged in. The reply is
//! `ok`, or one `name: error` line per parameter that could not be applied.
//! When a parameter is repeated only its first value counts.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use xbattbar_rs_core::PowerStatus;

/// Status shared between the HTTP handler and the source.
pub type SharedStatus = Arc<Mutex<PowerStatus>>;

pub fn router(status: SharedStatus) -> Router {
    Router::new().route("/", get(control)).with_state(status)
}

async fn control(
    State(status): State<SharedStatus>,
    Query(params): Query<Vec<(String, String)>>,
) -> String {
    let mut status = status.lock();
    let reply = apply_params(&mut status, &params);
    debug!(status = ?*status, "debug status updated");
    reply
}

/// Apply query parameters to `status` and build the reply body.
///
/// A malformed `level` leaves the previous level untouched; `plug` is still
/// applied.
pub fn apply_params(status: &mut PowerStatus, params: &[(String, String)]) -> String {
    let mut errors = Vec::new();

    if let Some(plug) = first(params, "plug") {
        status.charging = plug != "0";
    }

    if let Some(level) = first(params, "level") {
        match level.trim().parse::<i32>() {
            Ok(thousandths) => status.charge_level = thousandths as f32 / 1000.0,
            Err(e) => errors.push(format!("level: {e}")),
        }
    }

    if errors.is_empty() {
        "ok\n".to_owned()
    } else {
        errors.into_iter().map(|line| line + "\n").collect()
    }
}

fn first<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_plug_and_level() {
        let mut status = PowerStatus::default();
        let reply = apply_params(&mut status, &params(&[("plug", "1"), ("level", "850")]));
        assert_eq!(reply, "ok\n");
        assert!(status.charging);
        assert!((status.charge_level - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_any_non_zero_plug_means_charging() {
        let mut status = PowerStatus::default();
        apply_params(&mut status, &params(&[("plug", "yes")]));
        assert!(status.charging);
        apply_params(&mut status, &params(&[("plug", "0")]));
        assert!(!status.charging);
    }

    #[test]
    fn test_bad_level_keeps_previous_value() {
        let mut status = PowerStatus::default();
        apply_params(&mut status, &params(&[("level", "500")]));

        let reply = apply_params(&mut status, &params(&[("plug", "1"), ("level", "lots")]));
        assert!(reply.starts_with("level: "), "{reply}");
        assert!(reply.ends_with('\n'));
        assert_eq!(status.charge_level, 0.5);
        assert!(status.charging);
    }

    #[test]
    fn test_no_params_is_ok() {
        let mut status = PowerStatus::new(0.3, f32::NAN, true);
        assert_eq!(apply_params(&mut status, &[]), "ok\n");
        assert_eq!(status.charge_level, 0.3);
        assert!(status.charging);
    }

    #[test]
    fn test_repeated_param_uses_first_value() {
        let mut status = PowerStatus::default();
        let reply = apply_params(
            &mut status,
            &params(&[("plug", "1"), ("level", "300"), ("plug", "0"), ("level", "900")]),
        );
        assert_eq!(reply, "ok\n");
        assert!(status.charging);
        assert!((status.charge_level - 0.3).abs() < 1e-6);
    }
}
