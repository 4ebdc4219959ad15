//! CORS policy for browser clients calling the RPC endpoint.
//!
//! An empty allowlist means no CORS layer at all. Configured origins are
//! matched exactly and may send credentials (session cookies).

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error::{AppError, AppResult};

/// Build the CORS layer for `origins`; `None` when the list is empty.
pub fn layer(origins: &[String]) -> AppResult<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }
    let allowed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| AppError::InvalidOrigin {
                origin: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true),
    ))
}

/// Apply the CORS policy to `router` when any origin is configured.
pub fn apply(router: Router, origins: &[String]) -> AppResult<Router> {
    Ok(match layer(origins)? {
        Some(cors) => router.layer(cors),
        None => router,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowlist_means_no_layer() {
        assert!(layer(&[]).unwrap().is_none());
    }

    #[test]
    fn valid_origins_build_a_layer() {
        let origins = vec!["https://app.example".to_string()];
        assert!(layer(&origins).unwrap().is_some());
    }

    #[test]
    fn invalid_origin_is_reported() {
        let origins = vec!["https://bad\norigin".to_string()];
        match layer(&origins) {
            Err(AppError::InvalidOrigin { origin, .. }) => assert_eq!(origin, origins[0]),
            other => panic!("expected InvalidOrigin, got {:?}", other.map(|l| l.is_some())),
        }
    }
}
