//! Posts a summary of a finished workflow run to a chat webhook.
//!
//! The flow is strictly linear: [`context::RunContext::from_env`] reads and
//! validates the run environment, [`message::build_message`] turns it into a
//! webhook payload, and a [`sink::Sink`] delivers it in a single attempt.

pub mod cli;
pub mod context;
pub mod event;
pub mod logging;
pub mod message;
pub mod sink;
pub mod status;

pub use context::{ContextError, RunContext};
pub use message::{build_message, NotificationMessage};
pub use sink::{DeliveryError, Sink, StdoutSink, WebhookSink};
pub use status::JobStatus;
