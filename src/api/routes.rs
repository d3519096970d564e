//! API Route Handlers
//!
//! JSON request/response handlers over the distributor service. Digests
//! and identities travel as hex strings; proofs as arrays of hex digests.
//! Errors map to an `{ error, code }` body with an HTTP status derived
//! from the failure class.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::distributor::{DistributionStatus, DistributorError};
use crate::types::{parse_digest32, Digest32, Identity};

use super::server::SharedAppState;

/// API failure: a distributor error or a malformed request
pub enum ApiError {
    Distributor(DistributorError),
    BadRequest(String),
}

impl From<DistributorError> for ApiError {
    fn from(err: DistributorError) -> Self {
        Self::Distributor(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST".to_string()),
            ApiError::Distributor(err) => {
                let status = match &err {
                    DistributorError::NotAuthorized => StatusCode::FORBIDDEN,
                    DistributorError::InvalidCommitment
                    | DistributorError::InvalidDepositAmount { .. }
                    | DistributorError::InvalidProof => StatusCode::BAD_REQUEST,
                    DistributorError::NotOpen
                    | DistributorError::AlreadyOpened
                    | DistributorError::WindowExpired
                    | DistributorError::WindowNotExpired
                    | DistributorError::Paused
                    | DistributorError::AlreadyClaimed
                    | DistributorError::ReentrantCall => StatusCode::CONFLICT,
                    DistributorError::TransferFailed(_) => StatusCode::BAD_GATEWAY,
                    DistributorError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string(), err.error_code().to_string())
            }
        };
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn parse_proof(proof: &[String]) -> Result<Vec<Digest32>, ApiError> {
    proof
        .iter()
        .map(|hex| {
            parse_digest32(hex).map_err(|e| ApiError::BadRequest(format!("invalid proof: {}", e)))
        })
        .collect()
}

// ===== Payloads =====

#[derive(Deserialize)]
pub struct ProofPayload {
    pub identity: Identity,
    pub amount: u64,
    pub proof: Vec<String>,
}

#[derive(Deserialize)]
pub struct OpenRequest {
    pub caller: Identity,
    /// Hex-encoded commitment root
    pub commitment: String,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: Identity,
}

#[derive(Deserialize)]
pub struct OwnershipTransferRequest {
    pub caller: Identity,
    pub proposed: Identity,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: DistributionStatus,
    pub opened_at_iso: Option<String>,
    pub closes_at_iso: Option<String>,
}

#[derive(Serialize)]
pub struct ClaimStatusResponse {
    pub identity: Identity,
    pub claimed: bool,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub valid: bool,
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub identity: Identity,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct WithdrawResponse {
    pub swept: u64,
}

#[derive(Serialize)]
pub struct PausedResponse {
    pub paused: bool,
}

fn iso(timestamp: i64) -> Option<String> {
    if timestamp <= 0 {
        return None;
    }
    chrono::DateTime::from_timestamp(timestamp, 0).map(|t| t.to_rfc3339())
}

// ===== Handlers =====

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "zdrop-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn status(State(state): State<SharedAppState>) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.service.status().await?;
    let opened_at_iso = iso(status.opened_at);
    let closes_at_iso = iso(status.closes_at);
    Ok(Json(StatusResponse {
        status,
        opened_at_iso,
        closes_at_iso,
    }))
}

pub async fn claim_status(
    State(state): State<SharedAppState>,
    Path(identity): Path<String>,
) -> Result<Json<ClaimStatusResponse>, ApiError> {
    let identity = Identity::from_hex(&identity)
        .map_err(|e| ApiError::BadRequest(format!("invalid identity: {}", e)))?;
    let claimed = state.service.is_claimed(&identity).await?;
    Ok(Json(ClaimStatusResponse { identity, claimed }))
}

pub async fn preview(
    State(state): State<SharedAppState>,
    Json(payload): Json<ProofPayload>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let proof = parse_proof(&payload.proof)?;
    let valid = state
        .service
        .preview_verify(&payload.identity, payload.amount, &proof);
    Ok(Json(PreviewResponse { valid }))
}

pub async fn claim(
    State(state): State<SharedAppState>,
    Json(payload): Json<ProofPayload>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let proof = parse_proof(&payload.proof)?;
    state
        .service
        .claim(payload.identity, payload.amount, &proof)
        .await?;
    Ok(Json(ClaimResponse {
        identity: payload.identity,
        amount: payload.amount,
    }))
}

pub async fn open(
    State(state): State<SharedAppState>,
    Json(payload): Json<OpenRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let commitment = parse_digest32(&payload.commitment)
        .map_err(|e| ApiError::BadRequest(format!("invalid commitment: {}", e)))?;
    state
        .service
        .open(payload.caller, commitment, payload.amount)
        .await?;

    let status = state.service.status().await?;
    let opened_at_iso = iso(status.opened_at);
    let closes_at_iso = iso(status.closes_at);
    Ok(Json(StatusResponse {
        status,
        opened_at_iso,
        closes_at_iso,
    }))
}

pub async fn withdraw(
    State(state): State<SharedAppState>,
    Json(payload): Json<CallerRequest>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let swept = state.service.withdraw_remaining(payload.caller).await?;
    Ok(Json(WithdrawResponse { swept }))
}

pub async fn pause(
    State(state): State<SharedAppState>,
    Json(payload): Json<CallerRequest>,
) -> Result<Json<PausedResponse>, ApiError> {
    state.service.pause(payload.caller)?;
    Ok(Json(PausedResponse { paused: true }))
}

pub async fn unpause(
    State(state): State<SharedAppState>,
    Json(payload): Json<CallerRequest>,
) -> Result<Json<PausedResponse>, ApiError> {
    state.service.unpause(payload.caller)?;
    Ok(Json(PausedResponse { paused: false }))
}

pub async fn transfer_ownership(
    State(state): State<SharedAppState>,
    Json(payload): Json<OwnershipTransferRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .roles()
        .transfer_ownership(payload.caller, payload.proposed)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn accept_ownership(
    State(state): State<SharedAppState>,
    Json(payload): Json<CallerRequest>,
) -> Result<StatusCode, ApiError> {
    state.service.roles().accept_ownership(payload.caller)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::api::server::{build_router, AppState};
    use crate::clock::ManualClock;
    use crate::custody::MemoryCustody;
    use crate::distributor::{DistributionParams, DistributorService, RoleSet};
    use crate::events::MemoryEventSink;
    use crate::merkle::MerkleTree;
    use crate::storage::MemoryClaimStore;
    use crate::types::digest_to_hex;

    fn identity(byte: u8) -> Identity {
        Identity::new([byte; 32])
    }

    struct ApiHarness {
        app: axum::Router,
        tree: MerkleTree,
        dao: Identity,
    }

    fn harness() -> ApiHarness {
        let a = identity(1);
        let b = identity(2);
        let tree = MerkleTree::new(vec![(a, 600), (b, 400)]);
        let dao = identity(0xBB);

        let service = Arc::new(DistributorService::new(
            DistributionParams {
                expected_commitment: tree.root(),
                expected_deposit: 1000,
                claim_window_secs: 90 * 24 * 60 * 60,
            },
            RoleSet::new(identity(0xAA), dao),
            Arc::new(MemoryCustody::new()),
            Arc::new(MemoryClaimStore::new()),
            Arc::new(ManualClock::new(1_700_000_000)),
            Arc::new(MemoryEventSink::new()),
        ));
        ApiHarness {
            app: build_router(AppState::new(service)),
            tree,
            dao,
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn proof_hex(tree: &MerkleTree, id: &Identity) -> Vec<String> {
        tree.proof_for(id)
            .unwrap()
            .iter()
            .map(digest_to_hex)
            .collect()
    }

    async fn open(h: &ApiHarness) {
        let request = post_json(
            "/open",
            serde_json::json!({
                "caller": h.dao.to_hex(),
                "commitment": digest_to_hex(&h.tree.root()),
                "amount": 1000,
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let response = h
            .app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "zdrop-api");
    }

    #[tokio::test]
    async fn test_status_before_and_after_open() {
        let h = harness();

        let response = h
            .app
            .clone()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["opened"], false);
        assert_eq!(json["opened_at_iso"], serde_json::Value::Null);

        open(&h).await;

        let response = h
            .app
            .clone()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["opened"], true);
        assert_eq!(json["pool"], 1000);
        assert_eq!(json["commitment"], digest_to_hex(&h.tree.root()));
        assert!(json["opened_at_iso"].is_string());
    }

    #[tokio::test]
    async fn test_claim_flow() {
        let h = harness();
        open(&h).await;

        let a = identity(1);
        let request = post_json(
            "/claim",
            serde_json::json!({
                "identity": a.to_hex(),
                "amount": 600,
                "proof": proof_hex(&h.tree, &a),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["amount"], 600);

        // claimed lookup reflects it
        let uri = format!("/claims/{}", a.to_hex());
        let response = h
            .app
            .clone()
            .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["claimed"], true);

        // repeat claim maps to 409 ALREADY_CLAIMED
        let request = post_json(
            "/claim",
            serde_json::json!({
                "identity": a.to_hex(),
                "amount": 600,
                "proof": proof_hex(&h.tree, &a),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["code"], "ALREADY_CLAIMED");
    }

    #[tokio::test]
    async fn test_claim_before_open_maps_to_conflict() {
        let h = harness();
        let a = identity(1);
        let request = post_json(
            "/claim",
            serde_json::json!({
                "identity": a.to_hex(),
                "amount": 600,
                "proof": proof_hex(&h.tree, &a),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_OPEN");
    }

    #[tokio::test]
    async fn test_preview_and_bad_proof_encoding() {
        let h = harness();
        let a = identity(1);

        // preview works even before opening
        let request = post_json(
            "/preview",
            serde_json::json!({
                "identity": a.to_hex(),
                "amount": 600,
                "proof": proof_hex(&h.tree, &a),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["valid"], true);

        // malformed hex is a 400, not a distributor error
        let request = post_json(
            "/preview",
            serde_json::json!({
                "identity": a.to_hex(),
                "amount": 600,
                "proof": ["not-hex"],
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_endpoints_enforce_roles() {
        let h = harness();
        open(&h).await;

        // pause by a stranger -> 403
        let request = post_json(
            "/pause",
            serde_json::json!({ "caller": identity(9).to_hex() }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // pause by dao, then early sweep goes through
        let request = post_json("/pause", serde_json::json!({ "caller": h.dao.to_hex() }));
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = post_json(
            "/withdraw",
            serde_json::json!({ "caller": h.dao.to_hex() }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["swept"], 1000);
    }

    #[tokio::test]
    async fn test_ownership_endpoints() {
        let h = harness();
        let owner = identity(0xAA);
        let successor = identity(0xCC);

        let request = post_json(
            "/ownership/transfer",
            serde_json::json!({
                "caller": owner.to_hex(),
                "proposed": successor.to_hex(),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let request = post_json(
            "/ownership/accept",
            serde_json::json!({ "caller": successor.to_hex() }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // old owner can no longer propose
        let request = post_json(
            "/ownership/transfer",
            serde_json::json!({
                "caller": owner.to_hex(),
                "proposed": owner.to_hex(),
            }),
        );
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
