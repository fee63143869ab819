mod aggregate;
mod definition;
mod error;
mod language;
pub mod luogu;
pub mod payload;
mod poller;
pub mod provider;
mod quota;
mod remote;
mod status;
mod submit;
pub mod utils;

#[cfg(test)]
pub(crate) mod mock;

pub use aggregate::*;
pub use definition::*;
pub use error::*;
pub use language::*;
pub use poller::*;
pub use provider::{
    CaseResult, FetchResponse, ProgressSink, ProgressUpdate, SubmissionHandle,
    SubmissionOutcome, SubmissionRequest, SubmitResponse, SubtaskAggregate, Transport,
};
pub use quota::*;
pub use remote::*;
pub use status::*;
pub use submit::*;
