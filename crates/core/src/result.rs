//! The discriminated outcome of one dispatch.

use std::fmt;
use std::sync::Arc;

use adjutant_types::{ExecutionReport, ReportStatus};

use crate::command::Command;

/// Pipeline stages, named so a cancelled dispatch can say how far it got.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
	Resolve,
	Convert,
	Authorize,
	Invoke,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Stage::Resolve => "resolution",
			Stage::Convert => "conversion",
			Stage::Authorize => "authorization",
			Stage::Invoke => "invocation",
		};
		f.write_str(name)
	}
}

/// Every way one dispatch can end.
///
/// Expected failures are values, not errors; the host inspects the variant
/// and renders whatever its surface needs. Only [`Fault`](Self::Fault)
/// carries a real error object, and that error never crossed the pipeline
/// as a panic or early return.
#[derive(Debug)]
pub enum ExecutionResult {
	Success {
		command: Arc<Command>,
		value: serde_json::Value,
	},
	/// The input contained no command name at all.
	ParseFailure { reason: String },
	/// Unknown name, or no overload whose shape fits.
	NoMatch { name: String },
	/// Structurally indistinguishable overloads tied at the top rank.
	Ambiguous { name: String, candidates: usize },
	ConversionFailed {
		command: Arc<Command>,
		parameter: String,
		reason: String,
	},
	PreconditionFailed {
		command: Arc<Command>,
		reason: String,
	},
	/// The handler (or its group factory) failed or panicked.
	Fault {
		command: Arc<Command>,
		error: anyhow::Error,
	},
	/// Cancellation was observed before `stage` ran.
	Cancelled { stage: Stage },
}

impl ExecutionResult {
	pub fn is_success(&self) -> bool {
		matches!(self, ExecutionResult::Success { .. })
	}

	/// The matched command, for every outcome past resolution.
	pub fn command(&self) -> Option<&Arc<Command>> {
		match self {
			ExecutionResult::Success { command, .. }
			| ExecutionResult::ConversionFailed { command, .. }
			| ExecutionResult::PreconditionFailed { command, .. }
			| ExecutionResult::Fault { command, .. } => Some(command),
			_ => None,
		}
	}

	pub fn value(&self) -> Option<&serde_json::Value> {
		match self {
			ExecutionResult::Success { value, .. } => Some(value),
			_ => None,
		}
	}

	pub fn fault(&self) -> Option<&anyhow::Error> {
		match self {
			ExecutionResult::Fault { error, .. } => Some(error),
			_ => None,
		}
	}

	/// Human-readable failure description; `None` for success.
	pub fn failure_message(&self) -> Option<String> {
		match self {
			ExecutionResult::Success { .. } => None,
			ExecutionResult::ParseFailure { reason } => Some(reason.clone()),
			ExecutionResult::NoMatch { name } => Some(format!("unknown command '{name}'")),
			ExecutionResult::Ambiguous { name, candidates } => Some(format!(
				"'{name}' is ambiguous between {candidates} overloads"
			)),
			ExecutionResult::ConversionFailed {
				parameter, reason, ..
			} => Some(format!("argument '{parameter}': {reason}")),
			ExecutionResult::PreconditionFailed { reason, .. } => Some(reason.clone()),
			ExecutionResult::Fault { command, error } => {
				Some(format!("command '{}' failed: {error:#}", command.name()))
			}
			ExecutionResult::Cancelled { stage } => {
				Some(format!("cancelled during {stage}"))
			}
		}
	}

	/// Serializable envelope for front ends.
	pub fn report(&self) -> ExecutionReport {
		match self {
			ExecutionResult::Success { command, value } => {
				ExecutionReport::success(command.name(), value.clone())
			}
			ExecutionResult::ParseFailure { reason } => {
				ExecutionReport::failure(ReportStatus::ParseFailure, reason)
			}
			ExecutionResult::NoMatch { name } => {
				ExecutionReport::failure(ReportStatus::NoMatch, format!("unknown command '{name}'"))
					.with_command(name)
			}
			ExecutionResult::Ambiguous { name, candidates } => ExecutionReport::failure(
				ReportStatus::Ambiguous,
				format!("'{name}' is ambiguous between {candidates} overloads"),
			)
			.with_command(name),
			ExecutionResult::ConversionFailed {
				command,
				parameter,
				reason,
			} => ExecutionReport::failure(ReportStatus::ConversionFailed, reason)
				.with_command(command.name())
				.with_parameter(parameter),
			ExecutionResult::PreconditionFailed { command, reason } => {
				ExecutionReport::failure(ReportStatus::PreconditionFailed, reason)
					.with_command(command.name())
			}
			ExecutionResult::Fault { command, error } => {
				ExecutionReport::failure(ReportStatus::Fault, format!("{error:#}"))
					.with_command(command.name())
			}
			ExecutionResult::Cancelled { stage } => ExecutionReport::failure(
				ReportStatus::Cancelled,
				format!("cancelled during {stage}"),
			),
		}
	}
}
