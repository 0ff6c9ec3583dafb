//! Forwarding pipeline.
//!
//! Every invocation runs the same named steps over one `PipelineContext`:
//! 1. `parse_event`: validate the SES notification
//! 2. `transform_recipients`: forwarding table lookup (may finish early)
//! 3. `fetch_message`: readable copy + read from S3
//! 4. `process_message`: header rewrite
//! 5. `send_message`: SES `SendRawEmail`
//! 6. `finish`
//!
//! Each step returns a `StepOutcome`; the first `Succeed` or `Fail` ends the
//! run.

pub mod driver;
pub mod fetch_message;
pub mod finish;
pub mod parse_event;
pub mod process_message;
pub mod registry;
pub mod send_message;
pub mod transform_recipients;
pub mod types;

pub use driver::Pipeline;
pub use registry::{DEFAULT_STEPS, StepRegistry};
pub use types::{Outcome, PipelineContext, Step, StepOutcome};
