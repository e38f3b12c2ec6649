pub mod local;
pub mod process;
pub mod remote;
pub mod traits;

pub use local::{DatabaseHandle, LocalBackend};
pub use process::{CommandSpec, ProcessOutput, ProcessRunner, SystemRunner};
pub use remote::{BlastTransport, HttpTransport, PollPolicy, RemoteBackend, Sleeper, ThreadSleeper};
pub use traits::{AlignmentBackend, AlignmentJob, AlignmentReport, JobState};
