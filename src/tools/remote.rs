//! NCBI BLAST URL API client.
//!
//! A job is submitted with `CMD=Put`, left alone for a fixed initial delay,
//! then polled with `CMD=Get` at a fixed interval until the response carries
//! `Status=READY`. The ready response body is the report.

use crate::bio::fasta::to_fasta_string;
use crate::bio::sequence::SequenceRecord;
use crate::core::config::RemoteConfig;
use crate::tools::traits::{AlignmentBackend, AlignmentJob, AlignmentReport, JobState};
use crate::{Result, TracealignError};
use std::time::Duration;

/// Request/response transport for the BLAST service
#[cfg_attr(test, mockall::automock)]
pub trait BlastTransport {
    /// Send a submission form and return the response body
    fn submit(&self, form: &[(String, String)]) -> Result<String>;

    /// Send a status query and return the response body
    fn poll(&self, params: &[(String, String)]) -> Result<String>;
}

/// Suspends the calling thread. Swapped out in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Blocking HTTP transport
pub struct HttpTransport {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }
}

impl BlastTransport for HttpTransport {
    fn submit(&self, form: &[(String, String)]) -> Result<String> {
        let response = self.client.post(&self.url).form(form).send()?;
        if !response.status().is_success() {
            tracing::warn!("BLAST submission returned status {}", response.status());
        }
        Ok(response.text()?)
    }

    fn poll(&self, params: &[(String, String)]) -> Result<String> {
        let response = self.client.get(&self.url).query(params).send()?;
        if !response.status().is_success() {
            tracing::warn!("BLAST status check returned status {}", response.status());
        }
        Ok(response.text()?)
    }
}

/// Timing of the submit/poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    /// `None` polls until the service reports ready, however long it takes.
    pub max_wait: Option<Duration>,
}

impl PollPolicy {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            initial_delay: Duration::from_secs(config.initial_delay_secs),
            interval: Duration::from_secs(config.poll_interval_secs),
            max_wait: config.max_wait_secs.map(Duration::from_secs),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&RemoteConfig::default())
    }
}

/// Status signalled by a `CMD=Get` response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Waiting,
    Ready,
    Failed,
    Unknown,
}

impl PollStatus {
    pub fn from_body(body: &str) -> Self {
        if body.contains("Status=READY") {
            PollStatus::Ready
        } else if body.contains("Status=FAILED") {
            PollStatus::Failed
        } else if body.contains("Status=UNKNOWN") {
            PollStatus::Unknown
        } else {
            PollStatus::Waiting
        }
    }
}

/// Pull the request identifier out of a submission response
pub fn extract_rid(body: &str) -> Option<String> {
    let start = body.find("RID = ")? + "RID = ".len();
    let rid = body[start..].lines().next().unwrap_or("").trim();
    if rid.is_empty() {
        None
    } else {
        Some(rid.to_string())
    }
}

/// Alignment against the NCBI nucleotide collection over HTTP
pub struct RemoteBackend<T: BlastTransport = HttpTransport, S: Sleeper = ThreadSleeper> {
    transport: T,
    sleeper: S,
    config: RemoteConfig,
    policy: PollPolicy,
    jobs: Vec<AlignmentJob>,
}

impl RemoteBackend<HttpTransport, ThreadSleeper> {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(transport, ThreadSleeper, config))
    }
}

impl<T: BlastTransport, S: Sleeper> RemoteBackend<T, S> {
    pub fn with_parts(transport: T, sleeper: S, config: RemoteConfig) -> Self {
        let policy = PollPolicy::from_config(&config);
        Self {
            transport,
            sleeper,
            config,
            policy,
            jobs: Vec::new(),
        }
    }

    fn submit(&self, query: &SequenceRecord) -> Result<String> {
        let form = vec![
            ("CMD".to_string(), "Put".to_string()),
            ("PROGRAM".to_string(), self.config.program.clone()),
            ("DATABASE".to_string(), self.config.database.clone()),
            ("QUERY".to_string(), to_fasta_string(query)),
            ("FORMAT_TYPE".to_string(), "Text".to_string()),
        ];

        let body = self.transport.submit(&form)?;
        extract_rid(&body).ok_or_else(|| TracealignError::SubmissionFailure {
            query: query.identifier.clone(),
            reason: "response did not contain a request ID".to_string(),
        })
    }

    fn drive(&self, job: &mut AlignmentJob, query: &SequenceRecord) -> Result<AlignmentReport> {
        let rid = self.submit(query)?;
        tracing::info!("BLAST job submitted for {}. Request ID: {}", query.identifier, rid);
        job.transition(JobState::Submitted { rid: rid.clone() });

        // Nothing is ever ready before the initial delay.
        self.sleeper.sleep(self.policy.initial_delay);
        let mut waited = self.policy.initial_delay;

        let params = vec![
            ("CMD".to_string(), "Get".to_string()),
            ("RID".to_string(), rid.clone()),
            ("FORMAT_TYPE".to_string(), "Text".to_string()),
        ];

        let mut polls = 0u32;
        loop {
            polls += 1;
            job.transition(JobState::Running {
                rid: rid.clone(),
                polls,
            });

            let body = self.transport.poll(&params)?;
            match PollStatus::from_body(&body) {
                PollStatus::Ready => {
                    tracing::info!("BLAST results ready for {} after {} checks", query.identifier, polls);
                    job.transition(JobState::Ready { rid });
                    return Ok(AlignmentReport::new(&query.identifier, body));
                }
                PollStatus::Waiting => {
                    tracing::debug!("BLAST job {} still running (check {})", rid, polls);
                }
                status => {
                    tracing::warn!("BLAST job {} reported {:?}, continuing to poll", rid, status);
                }
            }

            let next = waited.checked_add(self.policy.interval);
            if let Some(max_wait) = self.policy.max_wait {
                if next.map_or(true, |next| next > max_wait) {
                    return Err(TracealignError::PollTimeout {
                        rid,
                        waited_secs: waited.as_secs(),
                    });
                }
            }
            self.sleeper.sleep(self.policy.interval);
            waited = next.unwrap_or(Duration::MAX);
        }
    }
}

impl<T: BlastTransport, S: Sleeper> AlignmentBackend for RemoteBackend<T, S> {
    fn run(&mut self, query: &SequenceRecord) -> Result<AlignmentReport> {
        let mut job = AlignmentJob::new(&query.identifier, JobState::Pending);
        let result = self.drive(&mut job, query);
        if let Err(e) = &result {
            job.transition(JobState::Failed {
                reason: e.to_string(),
            });
        }
        self.jobs.push(job);
        result
    }

    fn jobs(&self) -> &[AlignmentJob] {
        &self.jobs
    }

    fn name(&self) -> &str {
        "remote"
    }
}
