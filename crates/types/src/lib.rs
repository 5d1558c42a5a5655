//! Plain data types shared between the adjutant dispatch core and front ends.
//!
//! Everything in this crate is serializable value data with no behavior
//! beyond construction and accessors:
//!
//! - [`ParsedInput`] - a tokenized command invocation (name + arguments)
//! - [`ExecutionReport`] - the JSON result envelope front ends emit
//! - [`ReportStatus`] - machine-readable status codes for the envelope
//!
//! The pipeline itself lives in the `adjutant` crate; front ends that only
//! need to log, forward, or render invocations can depend on this crate
//! alone.

mod parsed;
mod report;

pub use parsed::ParsedInput;
pub use report::{ExecutionReport, ReportStatus};
