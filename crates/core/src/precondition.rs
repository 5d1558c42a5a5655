//! Execution gates checked between conversion and the handler call.

use tracing::debug;

use crate::BoxFut;
use crate::cancel::CancelToken;
use crate::command::Command;
use crate::context::InvocationContext;
use crate::provider::DependencyProvider;

/// One execution gate.
///
/// Gates attach to a group or to a single command. Evaluation order is
/// fixed: every group gate runs before any command gate, in declaration
/// order, and stops at the first denial. `Err` carries the human-readable
/// denial reason that becomes the precondition-failure result.
///
/// Checks that suspend on external lookups should watch `cancel` so a
/// cancelled dispatch is not left waiting on them.
pub trait Precondition: Send + Sync {
	/// Short identifier for logs.
	fn name(&self) -> &str {
		"precondition"
	}

	fn check<'a>(
		&'a self,
		ctx: &'a InvocationContext,
		command: &'a Command,
		provider: &'a dyn DependencyProvider,
		cancel: &'a CancelToken,
	) -> BoxFut<'a, Result<(), String>>;
}

pub(crate) enum GateOutcome {
	Pass,
	Denied { reason: String },
	Cancelled,
}

/// Runs the full gate chain for `command`, group gates first.
pub(crate) async fn evaluate(
	command: &Command,
	ctx: &InvocationContext,
	provider: &dyn DependencyProvider,
	cancel: &CancelToken,
) -> GateOutcome {
	let gates = command
		.group()
		.preconditions()
		.iter()
		.chain(command.preconditions());
	for gate in gates {
		if cancel.is_cancelled() {
			return GateOutcome::Cancelled;
		}
		if let Err(reason) = gate.check(ctx, command, provider, cancel).await {
			debug!(
				command = command.name(),
				gate = gate.name(),
				"precondition denied"
			);
			return GateOutcome::Denied { reason };
		}
	}
	GateOutcome::Pass
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;
	use crate::command::{CommandBuilder, GroupBuilder, RegistryBuilder};
	use crate::provider::EmptyProvider;

	struct Gate {
		label: &'static str,
		deny: bool,
		log: Arc<Mutex<Vec<&'static str>>>,
	}

	impl Precondition for Gate {
		fn name(&self) -> &str {
			self.label
		}

		fn check<'a>(
			&'a self,
			_ctx: &'a InvocationContext,
			_command: &'a Command,
			_provider: &'a dyn DependencyProvider,
			_cancel: &'a CancelToken,
		) -> BoxFut<'a, Result<(), String>> {
			Box::pin(async move {
				self.log.lock().unwrap().push(self.label);
				if self.deny {
					Err(format!("{} says no", self.label))
				} else {
					Ok(())
				}
			})
		}
	}

	fn gated_command(
		group_gates: Vec<Gate>,
		command_gates: Vec<Gate>,
	) -> Arc<Command> {
		let mut group = GroupBuilder::new("guarded");
		for gate in group_gates {
			group = group.precondition(gate);
		}
		let mut command = CommandBuilder::new("noop")
			.handler(|_ctx, _args| async { Ok(serde_json::Value::Null) });
		for gate in command_gates {
			command = command.precondition(gate);
		}
		let registry = RegistryBuilder::new()
			.group(group.command(command))
			.build()
			.unwrap();
		registry.overloads("noop")[0].clone()
	}

	fn gate(label: &'static str, deny: bool, log: &Arc<Mutex<Vec<&'static str>>>) -> Gate {
		Gate {
			label,
			deny,
			log: log.clone(),
		}
	}

	#[tokio::test]
	async fn group_gates_run_before_command_gates() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let command = gated_command(
			vec![gate("g1", false, &log), gate("g2", false, &log)],
			vec![gate("c1", false, &log)],
		);
		let outcome = evaluate(
			&command,
			&InvocationContext::new(),
			&EmptyProvider,
			&CancelToken::new(),
		)
		.await;
		assert!(matches!(outcome, GateOutcome::Pass));
		assert_eq!(*log.lock().unwrap(), vec!["g1", "g2", "c1"]);
	}

	#[tokio::test]
	async fn first_denial_stops_the_chain() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let command = gated_command(
			vec![gate("g1", true, &log)],
			vec![gate("c1", false, &log)],
		);
		let outcome = evaluate(
			&command,
			&InvocationContext::new(),
			&EmptyProvider,
			&CancelToken::new(),
		)
		.await;
		match outcome {
			GateOutcome::Denied { reason } => assert_eq!(reason, "g1 says no"),
			_ => panic!("expected denial"),
		}
		assert_eq!(*log.lock().unwrap(), vec!["g1"]);
	}

	#[tokio::test]
	async fn cancellation_preempts_remaining_gates() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let command = gated_command(vec![gate("g1", false, &log)], vec![]);
		let cancel = CancelToken::new();
		cancel.cancel();
		let outcome = evaluate(
			&command,
			&InvocationContext::new(),
			&EmptyProvider,
			&cancel,
		)
		.await;
		assert!(matches!(outcome, GateOutcome::Cancelled));
		assert!(log.lock().unwrap().is_empty());
	}
}
