//! Remote annealer REST API client.
//!
//! The service accepts a problem, queues it on a solver and returns an id
//! that is polled until the answer is ready:
//!
//! ```text
//!   POST   /problems          submit, returns ProblemStatus
//!   GET    /problems/{id}     poll, answer present once completed
//!   DELETE /problems/{id}     cancel
//!   GET    /solvers/{name}    solver limits and status
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qsweep_hal::{AnnealMode, SampleRequest};
use qsweep_model::BinaryQuadraticModel;

use crate::error::{RemoteError, RemoteResult};

/// Remote annealer REST API client.
///
/// Authenticates with a static Bearer token.
pub struct RemoteClient {
    /// HTTP client with timeouts configured.
    client: Client,
    /// API base URL (without trailing slash).
    base_url: String,
    /// Bearer token for authentication.
    token: String,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl RemoteClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(RemoteError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> RemoteResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> RemoteResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> RemoteResult<()> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        let resp = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            Err(RemoteError::ApiError { status, message })
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> RemoteResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            parse_body(&body)
        } else {
            let message = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(RemoteError::ProblemNotFound(message)),
                _ => Err(RemoteError::ApiError {
                    status: status.as_u16(),
                    message,
                }),
            }
        }
    }

    /// Fetch a solver's limits and status.
    #[instrument(skip(self))]
    pub async fn solver_info(&self, solver: &str) -> RemoteResult<SolverInfo> {
        self.get(&format!("solvers/{solver}")).await
    }

    /// Submit a problem.
    #[instrument(skip(self, req), fields(solver = %req.solver))]
    pub async fn submit_problem(&self, req: &ProblemRequest) -> RemoteResult<ProblemStatus> {
        debug!(
            "Submitting problem with {} variables, {} reads",
            req.problem.num_variables, req.params.num_reads
        );
        self.post("problems", req).await
    }

    /// Poll a problem's status, including its answer once completed.
    #[instrument(skip(self))]
    pub async fn problem_status(&self, problem_id: &str) -> RemoteResult<ProblemStatus> {
        self.get(&format!("problems/{problem_id}")).await
    }

    /// Cancel a queued or running problem.
    #[instrument(skip(self))]
    pub async fn cancel_problem(&self, problem_id: &str) -> RemoteResult<()> {
        self.delete(&format!("problems/{problem_id}")).await
    }
}

/// Decode a successful response body.
fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> RemoteResult<T> {
    Ok(serde_json::from_str(body)?)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /problems`.
#[derive(Debug, Serialize)]
pub struct ProblemRequest {
    /// Target solver.
    pub solver: String,
    /// Client-side label for tracing a submission.
    pub label: String,
    /// The model.
    pub problem: ProblemPayload,
    /// Sampling parameters.
    pub params: ProblemParams,
}

impl ProblemRequest {
    /// Encode a model and request for `solver`.
    pub fn new(solver: &str, model: &BinaryQuadraticModel, request: &SampleRequest) -> Self {
        Self {
            solver: solver.to_string(),
            label: format!("qsweep-{}", uuid::Uuid::new_v4()),
            problem: ProblemPayload::from_model(model),
            params: ProblemParams::from_request(request),
        }
    }
}

/// Binary quadratic model in triplet form.
#[derive(Debug, Serialize)]
pub struct ProblemPayload {
    /// Always `"BINARY"`.
    pub vartype: &'static str,
    /// Number of variables.
    pub num_variables: usize,
    /// Non-zero `(i, h_i)` terms.
    pub linear: Vec<(usize, f64)>,
    /// `(i, j, Q_ij)` terms with `i < j`.
    pub quadratic: Vec<(usize, usize, f64)>,
    /// Constant offset.
    pub offset: f64,
}

impl ProblemPayload {
    /// Encode `model`.
    pub fn from_model(model: &BinaryQuadraticModel) -> Self {
        Self {
            vartype: "BINARY",
            num_variables: model.num_variables(),
            linear: model
                .linear_terms()
                .iter()
                .enumerate()
                .filter(|(_, h)| **h != 0.0)
                .map(|(i, h)| (i, *h))
                .collect(),
            quadratic: model
                .interactions()
                .map(|((i, j), q)| (i, j, q))
                .collect(),
            offset: model.offset(),
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Serialize)]
pub struct ProblemParams {
    /// Number of reads.
    pub num_reads: u32,
    /// `[time, s]` points, reverse mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anneal_schedule: Option<Vec<(f64, f64)>>,
    /// Seed state, reverse mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<Vec<u8>>,
    /// Restart each read from `initial_state`, reverse mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reinitialize_state: Option<bool>,
    /// Solver-side seed, if the solver honours one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ProblemParams {
    /// Encode a sampling request.
    pub fn from_request(request: &SampleRequest) -> Self {
        let mut params = Self {
            num_reads: request.num_reads,
            anneal_schedule: None,
            initial_state: None,
            reinitialize_state: None,
            seed: request.seed,
        };
        if let AnnealMode::Reverse(reverse) = &request.mode {
            params.anneal_schedule = Some(reverse.schedule.points().to_vec());
            params.initial_state = Some(reverse.initial_state.clone());
            params.reinitialize_state = Some(reverse.reinitialize_state);
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response from `POST /problems` and `GET /problems/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemStatus {
    /// Problem identifier.
    pub id: String,
    /// `pending | in_progress | completed | failed | cancelled`.
    pub status: String,
    /// Answer, present when `status == "completed"`.
    #[serde(default)]
    pub answer: Option<Answer>,
    /// Error message if `status == "failed"`.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ProblemStatus {
    /// Whether the problem is still queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "pending" | "in_progress"
        )
    }

    /// Whether the problem completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    /// Whether the problem failed.
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }

    /// Whether the problem was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("cancelled")
    }
}

/// Samples returned for a completed problem.
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    /// One state per distinct sample.
    pub samples: Vec<Vec<u8>>,
    /// Energy of each sample.
    #[serde(default)]
    pub energies: Option<Vec<f64>>,
    /// How often each sample was read. Absent means once each.
    #[serde(default)]
    pub num_occurrences: Option<Vec<u32>>,
}

/// Response from `GET /solvers/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverInfo {
    /// Solver name.
    pub id: String,
    /// `online`, `offline`, ...
    #[serde(default)]
    pub status: Option<String>,
    /// Largest problem accepted.
    #[serde(default)]
    pub max_variables: Option<usize>,
    /// Largest read count per problem.
    #[serde(default)]
    pub max_reads: Option<u32>,
    /// Longest anneal schedule accepted.
    #[serde(default)]
    pub max_anneal_duration: Option<f64>,
    /// Whether the solver accepts reverse anneal schedules.
    #[serde(default)]
    pub supports_reverse: Option<bool>,
    /// Problems queued ahead.
    #[serde(default)]
    pub queue_depth: Option<u32>,
}

impl SolverInfo {
    /// Whether the solver is accepting problems.
    pub fn is_online(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| matches!(s.to_lowercase().as_str(), "online" | "available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsweep_hal::{AnnealSchedule, ReverseAnneal};
    use qsweep_model::{ProblemWeights, build_model};

    #[test]
    fn test_payload_from_model() {
        let model = build_model(1, 2, &ProblemWeights::default()).unwrap();
        let payload = ProblemPayload::from_model(&model);
        assert_eq!(payload.num_variables, 2);
        assert_eq!(payload.quadratic.len(), model.num_interactions());
        assert!(payload.quadratic.iter().all(|(i, j, _)| i < j));
        assert_eq!(payload.offset, model.offset());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["vartype"], "BINARY");
    }

    #[test]
    fn test_forward_params_omit_reverse_fields() {
        let params = ProblemParams::from_request(&SampleRequest::forward(100));
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(r#""num_reads":100"#));
        assert!(!json.contains("anneal_schedule"));
        assert!(!json.contains("initial_state"));
        assert!(!json.contains("seed"));
    }

    #[test]
    fn test_reverse_params() {
        let schedule = AnnealSchedule::reverse(0.45, 2.0, 6.0).unwrap();
        let reverse = ReverseAnneal::new(schedule, vec![1, 0]).with_reinitialize_state(false);
        let params = ProblemParams::from_request(&SampleRequest::reverse(10, reverse).with_seed(7));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json["anneal_schedule"],
            serde_json::json!([[0.0, 1.0], [2.0, 0.45], [8.0, 0.45], [10.0, 1.0]])
        );
        assert_eq!(json["initial_state"], serde_json::json!([1, 0]));
        assert_eq!(json["reinitialize_state"], false);
        assert_eq!(json["seed"], 7);
    }

    #[test]
    fn test_problem_request_label() {
        let model = build_model(1, 1, &ProblemWeights::default()).unwrap();
        let req = ProblemRequest::new("advantage", &model, &SampleRequest::forward(1));
        assert_eq!(req.solver, "advantage");
        assert!(req.label.starts_with("qsweep-"));
    }

    #[test]
    fn test_problem_status_methods() {
        let mut status: ProblemStatus =
            serde_json::from_str(r#"{"id":"p1","status":"pending"}"#).unwrap();
        assert!(status.is_pending());
        assert!(status.answer.is_none());

        status.status = "IN_PROGRESS".into();
        assert!(status.is_pending());

        status.status = "completed".into();
        assert!(status.is_completed());
        assert!(!status.is_pending());

        status.status = "failed".into();
        assert!(status.is_failed());

        status.status = "cancelled".into();
        assert!(status.is_cancelled());
    }

    #[test]
    fn test_answer_deserialization() {
        let status: ProblemStatus = serde_json::from_str(
            r#"{"id":"p1","status":"completed",
                "answer":{"samples":[[1,0],[0,1]],"energies":[0.0,0.0],"num_occurrences":[3,2]}}"#,
        )
        .unwrap();
        let answer = status.answer.unwrap();
        assert_eq!(answer.samples.len(), 2);
        assert_eq!(answer.num_occurrences, Some(vec![3, 2]));
    }

    #[test]
    fn test_parse_body_reports_bad_json() {
        let status: ProblemStatus = parse_body(r#"{"id":"p1","status":"pending"}"#).unwrap();
        assert_eq!(status.id, "p1");

        let err = parse_body::<ProblemStatus>(r#"{"id":"p1","#).unwrap_err();
        assert!(matches!(err, RemoteError::Json(_)));
        let err = parse_body::<SolverInfo>(r#"{"status":"online"}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Json(_)));
    }

    #[test]
    fn test_solver_info_is_online() {
        let info: SolverInfo =
            serde_json::from_str(r#"{"id":"advantage","status":"ONLINE","max_variables":5000}"#)
                .unwrap();
        assert!(info.is_online());
        assert_eq!(info.max_variables, Some(5000));
    }
}
