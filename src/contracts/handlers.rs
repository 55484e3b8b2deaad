use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use tracing::{debug, instrument, warn};

use crate::{
    auth::gate::Identity,
    contracts::repo::{sanitize_company, Contract},
    error::ApiError,
    state::AppState,
};

#[instrument(skip(state, identity, company), fields(user_id = identity.0.user_id))]
pub async fn get_contracts(
    State(state): State<AppState>,
    identity: Identity,
    company: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Contract>>, ApiError> {
    let Path(company) = company.map_err(|e| {
        warn!(error = %e, "company path rejected");
        ApiError::BadRequest("Invalid company identifier".into())
    })?;
    let company = sanitize_company(&company);
    let contracts = state.contracts.contracts_for(&company).await?;
    debug!(%company, count = contracts.len(), "contracts fetched");
    Ok(Json(contracts))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState, users::repo::fixture};

    async fn get(uri: &str, user_id: Option<i64>) -> (StatusCode, Value) {
        let state = AppState::fake();
        let mut req = Request::builder().uri(uri);
        if let Some(id) = user_id {
            let token = state.keys.issue(&fixture::user(id)).unwrap();
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let res = build_app(state)
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn company_is_sanitized_before_lookup() {
        // "Acme & Co.!!" percent-encoded
        let (status, body) = get("/api/contracts/Acme%20%26%20Co.!!", Some(1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "company": "AcmeCo", "contract": "Contract 1" }]));
    }

    #[tokio::test]
    async fn undecodable_company_is_a_json_bad_request() {
        let (status, body) = get("/api/contracts/Acme%FF", Some(1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Invalid company identifier" }));
    }

    #[tokio::test]
    async fn requires_admin() {
        let (status, _) = get("/api/contracts/Acme", Some(2)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = get("/api/contracts/Acme", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
