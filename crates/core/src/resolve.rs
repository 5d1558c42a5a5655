//! Overload resolution: structural candidate filtering and deterministic
//! ranking.
//!
//! Resolution never looks at token contents, only at shape: the command
//! name, how many positional tokens arrived, and which named keys. A
//! command that matches structurally but fails conversion later stays
//! matched; resolution does not backtrack.

use std::cmp::Reverse;
use std::sync::Arc;

use adjutant_types::ParsedInput;

use crate::command::Command;
use crate::registry::CommandRegistry;

/// Outcome of resolving one parsed input against the registry.
#[derive(Debug)]
pub enum MatchOutcome {
	Matched(Arc<Command>),
	/// Unknown name, or no overload whose shape fits the input.
	NoMatch,
	/// The winner is structurally indistinguishable from another top-ranked
	/// overload. Only reachable through a registry supplied with duplicate
	/// signatures; the builder rejects them.
	Ambiguous(Vec<Arc<Command>>),
}

struct Candidate {
	command: Arc<Command>,
	/// Optional parameters the input leaves unfilled; primary ranking key.
	unfilled: usize,
	/// Count of non-catch-all parameter types; secondary ranking key.
	specificity: usize,
}

pub fn resolve(input: &ParsedInput, registry: &CommandRegistry) -> MatchOutcome {
	let mut candidates: Vec<Candidate> = registry
		.overloads(&input.name)
		.iter()
		.filter_map(|command| {
			feasibility(command, input).map(|unfilled| Candidate {
				command: command.clone(),
				unfilled,
				specificity: specificity(command),
			})
		})
		.collect();
	if candidates.is_empty() {
		return MatchOutcome::NoMatch;
	}

	candidates.sort_by_key(|c| (c.unfilled, Reverse(c.specificity), c.command.registration));

	// Registration order breaks rank ties, so ambiguity only remains when a
	// same-rank rival carries the very same signature as the winner.
	let winner = &candidates[0];
	let rivals: Vec<Arc<Command>> = candidates[1..]
		.iter()
		.take_while(|c| c.unfilled == winner.unfilled && c.specificity == winner.specificity)
		.filter(|c| c.command.signature() == winner.command.signature())
		.map(|c| c.command.clone())
		.collect();
	if rivals.is_empty() {
		MatchOutcome::Matched(winner.command.clone())
	} else {
		let mut tied = vec![winner.command.clone()];
		tied.extend(rivals);
		MatchOutcome::Ambiguous(tied)
	}
}

/// Whether `input` fits `command` structurally; `Some(unfilled)` carries
/// how many optional parameters stay unfilled.
///
/// Slots claimed by named keys leave the positional arity window, so
/// `greet name:X` satisfies a required `name` with zero positional tokens.
fn feasibility(command: &Command, input: &ParsedInput) -> Option<usize> {
	for key in input.named.keys() {
		command.parameter(key)?;
	}

	let mut open_required = 0usize;
	let mut open_capacity = 0usize;
	let mut open_remainder = false;
	for parameter in command.parameters() {
		let claimed = input
			.named
			.keys()
			.any(|key| parameter.key() == key.as_str());
		if claimed {
			continue;
		}
		if parameter.flags().remainder {
			open_remainder = true;
			continue;
		}
		open_capacity += 1;
		if parameter.is_required() {
			open_required += 1;
		}
	}

	let positional = input.positional.len();
	if positional < open_required {
		return None;
	}
	if !open_remainder && positional > open_capacity {
		return None;
	}
	Some(open_capacity.saturating_sub(positional))
}

fn specificity(command: &Command) -> usize {
	command
		.parameters()
		.iter()
		.filter(|p| !p.ty().is_catch_all())
		.count()
}
