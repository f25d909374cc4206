//! Remote annealer sampler implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use qsweep_hal::{
    Capabilities, HalError, HalResult, Sample, SampleInfo, SampleRequest, SampleSet, Sampler,
    SamplerAvailability, SamplerConfig, SamplerFactory, ValidationResult, check_request,
};
use qsweep_model::BinaryQuadraticModel;

use crate::api::{Answer, ProblemRequest, ProblemStatus, RemoteClient, SolverInfo};
use crate::error::{RemoteError, RemoteResult};

/// Registered name of the remote sampler.
pub const REMOTE: &str = "remote";

/// Solver used when none is configured.
pub const DEFAULT_SOLVER: &str = "advantage";

/// Environment variable holding the Bearer token.
pub const TOKEN_ENV: &str = "QSWEEP_REMOTE_TOKEN";

/// Environment variable holding the API base URL.
pub const URL_ENV: &str = "QSWEEP_REMOTE_URL";

const DEFAULT_MAX_VARIABLES: usize = 5000;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_POLLS: u32 = 600;

/// TTL for cached solver info before re-fetching from the API.
const SOLVER_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// Hardware annealer behind the remote problem API.
///
/// Each call submits one problem and polls it until the answer is ready.
/// Reverse requests forward the schedule, the seed state and the
/// reinitialisation flag unchanged; the solver does the annealing.
///
/// # Authentication
///
/// Set `QSWEEP_REMOTE_TOKEN` and `QSWEEP_REMOTE_URL` in the environment, or
/// pass `token` and `endpoint` in the sampler configuration.
pub struct RemoteSampler {
    client: RemoteClient,
    solver: String,
    capabilities: Capabilities,
    poll_interval: Duration,
    max_polls: u32,
    solver_info: Arc<Mutex<Option<(SolverInfo, Instant)>>>,
}

impl RemoteSampler {
    /// Create a sampler for `solver` from the environment.
    pub fn new(solver: impl Into<String>) -> RemoteResult<Self> {
        let base_url = std::env::var(URL_ENV).map_err(|_| RemoteError::MissingEndpoint)?;
        let token = std::env::var(TOKEN_ENV).map_err(|_| RemoteError::MissingToken)?;
        Ok(Self::with_client(RemoteClient::new(base_url, token)?, solver))
    }

    /// Create a sampler around an existing client.
    pub fn with_client(client: RemoteClient, solver: impl Into<String>) -> Self {
        Self {
            client,
            solver: solver.into(),
            capabilities: Capabilities::annealer(REMOTE, DEFAULT_MAX_VARIABLES),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            solver_info: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many polls to make before giving up.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Override the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Target solver.
    pub fn solver(&self) -> &str {
        &self.solver
    }

    async fn fetch_solver_info(&self) -> RemoteResult<SolverInfo> {
        {
            let cache = self.solver_info.lock().await;
            if let Some((ref info, fetched_at)) = *cache {
                if fetched_at.elapsed() < SOLVER_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.solver_info(&self.solver).await?;

        {
            let mut cache = self.solver_info.lock().await;
            *cache = Some((info.clone(), Instant::now()));
        }

        Ok(info)
    }

    /// Limits in effect for the next submission.
    ///
    /// Falls back to the configured capabilities when the solver cannot be
    /// reached.
    async fn effective_capabilities(&self) -> Capabilities {
        match self.fetch_solver_info().await {
            Ok(info) => solver_capabilities(&self.capabilities, &info),
            Err(e) => {
                debug!("Using configured limits, solver info unavailable: {}", e);
                self.capabilities.clone()
            }
        }
    }

    /// Poll `problem_id` until it leaves the queue.
    async fn wait(&self, problem_id: &str) -> RemoteResult<Answer> {
        for _ in 0..self.max_polls {
            let status = self.client.problem_status(problem_id).await?;
            if let Some(answer) = poll_outcome(status)? {
                return Ok(answer);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        if let Err(e) = self.client.cancel_problem(problem_id).await {
            warn!("Failed to cancel timed-out problem {}: {}", problem_id, e);
        }
        Err(RemoteError::Timeout(problem_id.to_string()))
    }
}

/// Tighten `base` to the limits a solver reports.
pub(crate) fn solver_capabilities(base: &Capabilities, info: &SolverInfo) -> Capabilities {
    let mut caps = base.clone();
    if let Some(max) = info.max_variables {
        caps.max_variables = caps.max_variables.min(max);
    }
    if let Some(max) = info.max_reads {
        caps.max_reads = caps.max_reads.min(max);
    }
    if let Some(max) = info.max_anneal_duration {
        caps.max_anneal_duration = Some(caps.max_anneal_duration.map_or(max, |m| m.min(max)));
    }
    if info.supports_reverse == Some(false) {
        caps.supports_reverse = false;
    }
    caps
}

/// Decide what a polled status means.
///
/// `Ok(None)` while the problem is queued or running.
pub(crate) fn poll_outcome(status: ProblemStatus) -> RemoteResult<Option<Answer>> {
    if status.is_pending() {
        return Ok(None);
    }
    if status.is_completed() {
        return match status.answer {
            Some(answer) => Ok(Some(answer)),
            None => Err(RemoteError::MalformedAnswer(format!(
                "problem {} completed without an answer",
                status.id
            ))),
        };
    }
    if status.is_failed() {
        return Err(RemoteError::ProblemFailed(
            status.error_message.unwrap_or(status.id),
        ));
    }
    if status.is_cancelled() {
        return Err(RemoteError::ProblemCancelled(status.id));
    }
    Err(RemoteError::UnknownStatus {
        id: status.id,
        status: status.status,
    })
}

/// Expand an answer into one sample per read.
///
/// Reported energies are kept as returned. An answer holding more reads
/// than `num_reads` is rejected before any state is copied.
pub(crate) fn decode_answer(
    model: &BinaryQuadraticModel,
    answer: Answer,
    num_reads: u32,
) -> RemoteResult<Vec<Sample>> {
    let energies = answer
        .energies
        .ok_or_else(|| RemoteError::MalformedAnswer("answer has no energies".into()))?;
    if energies.len() != answer.samples.len() {
        return Err(RemoteError::MalformedAnswer(format!(
            "{} samples but {} energies",
            answer.samples.len(),
            energies.len()
        )));
    }
    let occurrences = match answer.num_occurrences {
        Some(counts) if counts.len() != answer.samples.len() => {
            return Err(RemoteError::MalformedAnswer(format!(
                "{} samples but {} occurrence counts",
                answer.samples.len(),
                counts.len()
            )));
        }
        Some(counts) => counts,
        None => vec![1; answer.samples.len()],
    };

    let total = occurrences
        .iter()
        .try_fold(0u64, |acc, &count| acc.checked_add(u64::from(count)))
        .ok_or_else(|| RemoteError::MalformedAnswer("occurrence counts overflow".into()))?;
    if total > u64::from(num_reads) {
        return Err(RemoteError::MalformedAnswer(format!(
            "answer holds {total} reads but {num_reads} were requested"
        )));
    }

    let mut samples = Vec::with_capacity(total as usize);
    for ((state, energy), count) in answer.samples.into_iter().zip(energies).zip(occurrences) {
        if state.len() != model.num_variables() {
            return Err(RemoteError::MalformedAnswer(format!(
                "state has {} values, model has {} variables",
                state.len(),
                model.num_variables()
            )));
        }
        for _ in 0..count {
            samples.push(Sample::new(state.clone(), energy));
        }
    }
    Ok(samples)
}

impl SamplerFactory for RemoteSampler {
    /// Recognised settings: `solver`, `max_variables`, `max_reads`,
    /// `poll_interval_ms`, `max_polls`. `endpoint` and `token` fall back to
    /// the environment.
    fn from_config(config: SamplerConfig) -> HalResult<Self> {
        let base_url = match config.endpoint.clone() {
            Some(url) => url,
            None => std::env::var(URL_ENV).map_err(|_| RemoteError::MissingEndpoint)?,
        };
        let token = match config.token.clone() {
            Some(token) => token,
            None => std::env::var(TOKEN_ENV).map_err(|_| RemoteError::MissingToken)?,
        };
        let solver = config.extra_str("solver")?.unwrap_or(DEFAULT_SOLVER).to_string();

        let mut sampler = Self::with_client(RemoteClient::new(base_url, token)?, solver);
        if let Some(max) = config.extra_u64("max_variables")? {
            sampler.capabilities.max_variables = max as usize;
        }
        if let Some(max) = config.extra_u64("max_reads")? {
            let max = u32::try_from(max)
                .map_err(|_| HalError::Configuration(format!("max_reads {max} is too large")))?;
            sampler.capabilities = sampler.capabilities.with_max_reads(max);
        }
        if let Some(ms) = config.extra_u64("poll_interval_ms")? {
            sampler = sampler.with_poll_interval(Duration::from_millis(ms));
        }
        if let Some(polls) = config.extra_u64("max_polls")? {
            sampler = sampler.with_max_polls(u32::try_from(polls).unwrap_or(u32::MAX));
        }
        Ok(sampler)
    }
}

#[async_trait]
impl Sampler for RemoteSampler {
    fn name(&self) -> &str {
        REMOTE
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Checks against the configured limits tightened by what the solver
    /// currently reports.
    async fn validate(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<ValidationResult> {
        let caps = self.effective_capabilities().await;
        Ok(check_request(&caps, model, request))
    }

    #[instrument(skip(self))]
    async fn availability(&self) -> HalResult<SamplerAvailability> {
        match self.fetch_solver_info().await {
            Ok(info) if info.is_online() => Ok(SamplerAvailability {
                is_available: true,
                queue_depth: info.queue_depth,
                estimated_wait: None,
                status_message: None,
            }),
            Ok(info) => Ok(SamplerAvailability::unavailable(
                info.status.unwrap_or_else(|| "offline".into()),
            )),
            Err(e) => {
                debug!("Solver availability check failed: {}", e);
                Ok(SamplerAvailability::unavailable(e.to_string()))
            }
        }
    }

    #[instrument(skip(self, model, request), fields(solver = %self.solver, mode = %request.mode.kind()))]
    async fn sample(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<SampleSet> {
        if request.num_reads == 0 {
            return Err(HalError::InvalidReads("num_reads must be at least 1".into()));
        }
        if request.reverse_params().is_some() && !self.capabilities.supports_reverse {
            return Err(HalError::Unsupported(format!(
                "reverse annealing on solver {}",
                self.solver
            )));
        }

        let start = Instant::now();
        let req = ProblemRequest::new(&self.solver, model, request);
        let submitted = self.client.submit_problem(&req).await?;
        let problem_id = submitted.id.clone();
        info!("Problem submitted to {}: {}", self.solver, problem_id);

        let answer = match poll_outcome(submitted)? {
            Some(answer) => answer,
            None => self.wait(&problem_id).await?,
        };
        let samples = decode_answer(model, answer, request.num_reads)?;

        let elapsed = start.elapsed();
        debug!("Problem {} returned {} samples in {:?}", problem_id, samples.len(), elapsed);
        Ok(SampleSet::new(
            samples,
            SampleInfo::new(REMOTE)
                .with_job_id(problem_id)
                .with_elapsed_ms(elapsed.as_millis() as u64),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsweep_hal::{AnnealSchedule, ReverseAnneal};
    use qsweep_model::{ProblemWeights, build_model};
    use serde_json::json;

    fn model() -> BinaryQuadraticModel {
        build_model(1, 2, &ProblemWeights::default()).unwrap()
    }

    fn answer(samples: Vec<Vec<u8>>, energies: Option<Vec<f64>>, counts: Option<Vec<u32>>) -> Answer {
        Answer {
            samples,
            energies,
            num_occurrences: counts,
        }
    }

    fn status(value: serde_json::Value) -> ProblemStatus {
        serde_json::from_value(value).unwrap()
    }

    fn solver(value: serde_json::Value) -> SolverInfo {
        serde_json::from_value(value).unwrap()
    }

    fn offline_sampler() -> RemoteSampler {
        RemoteSampler::with_client(RemoteClient::new("http://localhost:9", "t").unwrap(), "qpu")
    }

    fn reverse_request(num_reads: u32, duration: f64) -> SampleRequest {
        let schedule = AnnealSchedule::reverse(0.45, duration / 4.0, duration / 2.0).unwrap();
        SampleRequest::reverse(num_reads, ReverseAnneal::new(schedule, vec![1, 0]))
    }

    #[test]
    fn test_decode_expands_occurrences() {
        let samples = decode_answer(
            &model(),
            answer(vec![vec![1, 0], vec![0, 1]], Some(vec![0.0, 0.0]), Some(vec![3, 2])),
            5,
        )
        .unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].state, vec![1, 0]);
        assert_eq!(samples[4].state, vec![0, 1]);
    }

    #[test]
    fn test_decode_without_occurrences() {
        let samples =
            decode_answer(&model(), answer(vec![vec![1, 1]], Some(vec![4.5]), None), 1).unwrap();
        assert_eq!(samples, vec![Sample::new(vec![1, 1], 4.5)]);
    }

    #[test]
    fn test_decode_allows_short_answers() {
        let samples = decode_answer(
            &model(),
            answer(vec![vec![1, 0]], Some(vec![0.0]), Some(vec![3])),
            10,
        )
        .unwrap();
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_decode_rejects_occurrences_beyond_requested_reads() {
        let err = decode_answer(
            &model(),
            answer(vec![vec![1, 0]], Some(vec![0.0]), Some(vec![5_000_000])),
            10,
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(ref msg) if msg.contains("5000000")));

        let err = decode_answer(
            &model(),
            answer(
                vec![vec![1, 0], vec![0, 1]],
                Some(vec![0.0, 0.0]),
                Some(vec![u32::MAX, u32::MAX]),
            ),
            u32::MAX,
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(_)));
    }

    #[test]
    fn test_decode_rejects_too_many_states() {
        let err = decode_answer(
            &model(),
            answer(vec![vec![1, 0], vec![0, 1]], Some(vec![0.0, 0.0]), None),
            1,
        )
        .unwrap_err();
        let hal: HalError = err.into();
        assert!(matches!(hal, HalError::MalformedBatch(_)));
    }

    #[test]
    fn test_decode_requires_energies() {
        let err = decode_answer(&model(), answer(vec![vec![1, 0]], None, None), 1).unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_state_length() {
        let err = decode_answer(&model(), answer(vec![vec![1, 0, 0]], Some(vec![0.0]), None), 1)
            .unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(_)));
    }

    #[test]
    fn test_decode_rejects_mismatched_counts() {
        let err = decode_answer(
            &model(),
            answer(vec![vec![1, 0]], Some(vec![0.0]), Some(vec![1, 1])),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(_)));
    }

    #[test]
    fn test_poll_outcome_pending() {
        assert!(poll_outcome(status(json!({"id": "p1", "status": "pending"}))).unwrap().is_none());
        assert!(
            poll_outcome(status(json!({"id": "p1", "status": "IN_PROGRESS"})))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_poll_outcome_completed() {
        let answer = poll_outcome(status(json!({
            "id": "p1",
            "status": "completed",
            "answer": {"samples": [[1, 0]], "energies": [0.0]}
        })))
        .unwrap()
        .unwrap();
        assert_eq!(answer.samples, vec![vec![1, 0]]);
    }

    #[test]
    fn test_poll_outcome_completed_without_answer() {
        let err = poll_outcome(status(json!({"id": "p1", "status": "completed"}))).unwrap_err();
        assert!(matches!(err, RemoteError::MalformedAnswer(ref msg) if msg.contains("p1")));
    }

    #[test]
    fn test_poll_outcome_failed() {
        let err = poll_outcome(status(json!({
            "id": "p1",
            "status": "failed",
            "error_message": "embedding failed"
        })))
        .unwrap_err();
        assert!(matches!(err, RemoteError::ProblemFailed(ref msg) if msg == "embedding failed"));

        let err = poll_outcome(status(json!({"id": "p2", "status": "failed"}))).unwrap_err();
        let hal: HalError = err.into();
        assert!(matches!(hal, HalError::JobFailed(ref msg) if msg == "p2"));
    }

    #[test]
    fn test_poll_outcome_cancelled() {
        let err = poll_outcome(status(json!({"id": "p1", "status": "cancelled"}))).unwrap_err();
        assert!(matches!(err, RemoteError::ProblemCancelled(ref id) if id == "p1"));
    }

    #[test]
    fn test_poll_outcome_unknown_status() {
        let err = poll_outcome(status(json!({"id": "p1", "status": "exploded"}))).unwrap_err();
        assert!(matches!(err, RemoteError::UnknownStatus { ref status, .. } if status == "exploded"));
        let hal: HalError = err.into();
        assert!(matches!(hal, HalError::Backend(_)));
    }

    #[test]
    fn test_solver_limits_tighten_capabilities() {
        let base = Capabilities::annealer(REMOTE, 5000);
        let caps = solver_capabilities(
            &base,
            &solver(json!({
                "id": "qpu",
                "max_variables": 2048,
                "max_reads": 50,
                "max_anneal_duration": 4.0,
                "supports_reverse": false
            })),
        );
        assert_eq!(caps.max_variables, 2048);
        assert_eq!(caps.max_reads, 50);
        assert_eq!(caps.max_anneal_duration, Some(4.0));
        assert!(!caps.supports_reverse);

        let caps = solver_capabilities(
            &base,
            &solver(json!({"id": "qpu", "max_variables": 9000, "max_reads": 1_000_000})),
        );
        assert_eq!(caps, base);
    }

    #[tokio::test]
    async fn test_validate_uses_solver_limits() {
        let sampler = offline_sampler();
        *sampler.solver_info.lock().await = Some((
            solver(json!({"id": "qpu", "status": "online", "max_reads": 10, "max_anneal_duration": 4.0})),
            Instant::now(),
        ));

        let ok = sampler.validate(&model(), &SampleRequest::forward(10)).await.unwrap();
        assert!(ok.is_valid());

        let too_many = sampler.validate(&model(), &SampleRequest::forward(11)).await.unwrap();
        assert!(!too_many.is_valid());

        let too_long = sampler.validate(&model(), &reverse_request(10, 6.0)).await.unwrap();
        assert!(!too_long.is_valid());

        let err = sampler
            .run(&model(), &SampleRequest::forward(11), qsweep_hal::BatchPolicy::AllowShort)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_reverse_unsupported_is_refused_before_submit() {
        let sampler = offline_sampler()
            .with_capabilities(Capabilities::annealer(REMOTE, 5000).with_reverse(false));
        let err = sampler.sample(&model(), &reverse_request(10, 4.0)).await.unwrap_err();
        assert!(matches!(err, HalError::Unsupported(ref msg) if msg.contains("qpu")));
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = SamplerConfig::new(REMOTE)
            .with_endpoint("http://localhost:9/v1/")
            .with_token("secret")
            .with_extra("solver", json!("advantage2"))
            .with_extra("max_variables", json!(1200))
            .with_extra("max_reads", json!(500))
            .with_extra("poll_interval_ms", json!(10));
        let sampler = RemoteSampler::from_config(config).unwrap();
        assert_eq!(sampler.name(), REMOTE);
        assert_eq!(sampler.solver(), "advantage2");
        assert_eq!(sampler.capabilities().max_variables, 1200);
        assert_eq!(sampler.capabilities().max_reads, 500);
        assert!(!sampler.capabilities().is_simulator);
        assert_eq!(sampler.client.base_url(), "http://localhost:9/v1");
        assert_eq!(sampler.poll_interval, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_debug_redacts_token() {
        let client = RemoteClient::new("http://localhost:9", "secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }
}
