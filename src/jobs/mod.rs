//! Jobs module - remote job execution
//!
//! Turns the submit-then-poll model of the scraping service into a single
//! awaitable call.

pub mod scraper;
pub mod timer;
pub mod waiter;

pub use scraper::ScraperClient;
pub use timer::{ManualTimer, Timer, TokioTimer};
pub use waiter::{
    AsyncJobWaiter, JobService, JobSpec, JobStatus, PollSettings, RemoteJob, ResultSet,
    Submission,
};
