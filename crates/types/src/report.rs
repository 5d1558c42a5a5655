//! Structured result envelope for front ends.
//!
//! Every pipeline invocation ends in an execution result; front ends that
//! talk JSON (network protocols, agent hosts, structured logs) convert it
//! into this envelope:
//!
//! ```json
//! { "ok": true, "status": "success", "command": "greet", "value": "hi" }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "ok": false,
//!   "status": "conversion_failed",
//!   "command": "repeat",
//!   "parameter": "count",
//!   "message": "invalid digit found in string"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Machine-readable status code for a completed invocation.
///
/// Mirrors the terminal states of the pipeline: one success state plus one
/// code per failure class, so callers can branch without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
	/// Handler ran and returned normally.
	Success,
	/// Input had no command name to dispatch on.
	ParseFailure,
	/// No registered command matched the input name.
	NoMatch,
	/// Multiple overloads tied at the highest rank (misconfigured registry).
	Ambiguous,
	/// A token could not be converted to its parameter's declared type.
	ConversionFailed,
	/// An authorization check rejected the invocation.
	PreconditionFailed,
	/// The handler body raised a fault.
	Fault,
	/// The invocation was cancelled between stages.
	Cancelled,
}

impl ReportStatus {
	/// `true` only for [`ReportStatus::Success`].
	pub fn is_success(self) -> bool {
		matches!(self, ReportStatus::Success)
	}
}

/// Serializable summary of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
	/// Whether the invocation reached the handler and returned normally.
	pub ok: bool,

	/// Status code for programmatic handling.
	pub status: ReportStatus,

	/// Primary name of the matched command, when resolution got that far.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub command: Option<String>,

	/// Parameter at fault, for conversion failures.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parameter: Option<String>,

	/// Human-readable failure description. Absent on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,

	/// Handler return value. Present on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<serde_json::Value>,
}

impl ExecutionReport {
	/// Envelope for a successful invocation of `command`.
	pub fn success(command: impl Into<String>, value: serde_json::Value) -> Self {
		Self {
			ok: true,
			status: ReportStatus::Success,
			command: Some(command.into()),
			parameter: None,
			message: None,
			value: Some(value),
		}
	}

	/// Envelope for a failed invocation.
	pub fn failure(status: ReportStatus, message: impl Into<String>) -> Self {
		Self {
			ok: false,
			status,
			command: None,
			parameter: None,
			message: Some(message.into()),
			value: None,
		}
	}

	/// Attaches the matched command name.
	pub fn with_command(mut self, command: impl Into<String>) -> Self {
		self.command = Some(command.into());
		self
	}

	/// Attaches the offending parameter name.
	pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
		self.parameter = Some(parameter.into());
		self
	}
}
