//! The dispatch service: one call from raw text to an execution result.

use std::fmt;
use std::sync::Arc;

use adjutant_types::ParsedInput;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info_span, warn};

use crate::bind::{self, BindFailure};
use crate::cancel::CancelToken;
use crate::context::InvocationContext;
use crate::convert::ConverterRegistry;
use crate::error::ConfigError;
use crate::invoke;
use crate::precondition::{self, GateOutcome};
use crate::provider::DependencyProvider;
use crate::registry::CommandRegistry;
use crate::resolve::{self, MatchOutcome};
use crate::result::{ExecutionResult, Stage};
use crate::tokenize;

/// Whether dispatches may overlap or must run strictly one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
	#[default]
	Concurrent,
	/// Every dispatch acquires a service-wide lock and runs to completion
	/// before the next one starts.
	Serialized,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ServiceConfig {
	pub mode: ExecutionMode,
}

impl ServiceConfig {
	pub fn serialized() -> Self {
		Self {
			mode: ExecutionMode::Serialized,
		}
	}
}

/// The assembled pipeline: registry, converters, provider, and mode.
///
/// One service instance serves any number of concurrent dispatches; all
/// shared state is immutable or internally synchronized. Per-invocation
/// state travels in the [`InvocationContext`] and [`CancelToken`] arguments.
pub struct CommandService {
	registry: Arc<CommandRegistry>,
	converters: Arc<ConverterRegistry>,
	provider: Arc<dyn DependencyProvider>,
	config: ServiceConfig,
	serial: Mutex<()>,
}

impl CommandService {
	/// Assembles the service, failing fast when any declared parameter type
	/// has no converter.
	pub fn new(
		registry: CommandRegistry,
		converters: ConverterRegistry,
		provider: Arc<dyn DependencyProvider>,
		config: ServiceConfig,
	) -> Result<Self, ConfigError> {
		for command in registry.commands() {
			for parameter in command.parameters() {
				if !converters.can_convert(&parameter.ty()) {
					return Err(ConfigError::MissingConverter {
						command: command.name().to_string(),
						parameter: parameter.name().to_string(),
						type_name: parameter.ty().name(),
					});
				}
			}
		}
		Ok(Self {
			registry: Arc::new(registry),
			converters: Arc::new(converters),
			provider,
			config,
			serial: Mutex::new(()),
		})
	}

	pub fn registry(&self) -> &CommandRegistry {
		&self.registry
	}

	/// Tokenizes and dispatches one line of input.
	pub async fn execute(
		&self,
		raw: &str,
		ctx: InvocationContext,
		cancel: &CancelToken,
	) -> ExecutionResult {
		self.execute_parsed(tokenize::parse(raw), ctx, cancel).await
	}

	/// Dispatches input that is already tokenized.
	pub async fn execute_parsed(
		&self,
		input: ParsedInput,
		ctx: InvocationContext,
		cancel: &CancelToken,
	) -> ExecutionResult {
		let _serial = match self.config.mode {
			ExecutionMode::Serialized => Some(self.serial.lock().await),
			ExecutionMode::Concurrent => None,
		};
		let span = info_span!("dispatch", command = %input.name);
		self.run(input, ctx, cancel).instrument(span).await
	}

	async fn run(
		&self,
		input: ParsedInput,
		ctx: InvocationContext,
		cancel: &CancelToken,
	) -> ExecutionResult {
		if input.is_empty() {
			return ExecutionResult::ParseFailure {
				reason: "input has no command name".to_string(),
			};
		}

		if cancel.is_cancelled() {
			return ExecutionResult::Cancelled {
				stage: Stage::Resolve,
			};
		}
		let command = match resolve::resolve(&input, &self.registry) {
			MatchOutcome::Matched(command) => command,
			MatchOutcome::NoMatch => {
				debug!(command = %input.name, "no matching overload");
				return ExecutionResult::NoMatch { name: input.name };
			}
			MatchOutcome::Ambiguous(tied) => {
				warn!(command = %input.name, candidates = tied.len(), "ambiguous overloads");
				return ExecutionResult::Ambiguous {
					name: input.name,
					candidates: tied.len(),
				};
			}
		};

		if cancel.is_cancelled() {
			return ExecutionResult::Cancelled {
				stage: Stage::Convert,
			};
		}
		let args = match bind::bind(&command, &input, &self.converters, &ctx, cancel).await {
			Ok(args) => args,
			Err(BindFailure::Conversion { parameter, reason }) => {
				debug!(command = command.name(), parameter = %parameter, "conversion failed");
				return ExecutionResult::ConversionFailed {
					command,
					parameter,
					reason,
				};
			}
			Err(BindFailure::Cancelled) => {
				return ExecutionResult::Cancelled {
					stage: Stage::Convert,
				};
			}
		};

		if cancel.is_cancelled() {
			return ExecutionResult::Cancelled {
				stage: Stage::Authorize,
			};
		}
		match precondition::evaluate(&command, &ctx, self.provider.as_ref(), cancel).await {
			GateOutcome::Pass => {}
			GateOutcome::Denied { reason } => {
				return ExecutionResult::PreconditionFailed { command, reason };
			}
			GateOutcome::Cancelled => {
				return ExecutionResult::Cancelled {
					stage: Stage::Authorize,
				};
			}
		}

		if cancel.is_cancelled() {
			return ExecutionResult::Cancelled {
				stage: Stage::Invoke,
			};
		}
		match invoke::invoke(&command, ctx, args, self.provider.as_ref()).await {
			Ok(value) => {
				debug!(command = command.name(), "handler completed");
				ExecutionResult::Success { command, value }
			}
			Err(error) => {
				warn!(command = command.name(), error = %error, "handler fault");
				ExecutionResult::Fault { command, error }
			}
		}
	}
}

impl fmt::Debug for CommandService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandService")
			.field("commands", &self.registry.len())
			.field("mode", &self.config.mode)
			.finish_non_exhaustive()
	}
}
