//! Case-insensitive command lookup with overload buckets.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::command::Command;

/// Immutable command table.
///
/// Every lookup key (primary name or alias, lowercased) maps to its
/// overload set in registration order. Built once by
/// [`RegistryBuilder::build`](crate::command::RegistryBuilder::build) or
/// supplied whole through [`from_commands_unchecked`](Self::from_commands_unchecked);
/// never mutated afterwards.
pub struct CommandRegistry {
	commands: Vec<Arc<Command>>,
	index: HashMap<String, Vec<Arc<Command>>>,
}

impl CommandRegistry {
	pub(crate) fn from_validated(commands: Vec<Command>) -> Self {
		Self::assemble(commands)
	}

	/// Builds a registry from externally finalized commands, skipping the
	/// duplicate-signature validation the builder performs.
	///
	/// Supply order becomes registration order. Overloads that share a key
	/// and a signature are kept and surface as ambiguous matches when that
	/// shape is requested.
	pub fn from_commands_unchecked(commands: Vec<Command>) -> Self {
		Self::assemble(commands)
	}

	fn assemble(commands: Vec<Command>) -> Self {
		let commands: Vec<Arc<Command>> = commands
			.into_iter()
			.enumerate()
			.map(|(position, mut command)| {
				command.registration = position;
				Arc::new(command)
			})
			.collect();

		let mut index: HashMap<String, Vec<Arc<Command>>> = HashMap::new();
		for command in &commands {
			let mut keys: Vec<String> = command.lookup_keys().collect();
			keys.sort();
			keys.dedup();
			for key in keys {
				index.entry(key).or_default().push(command.clone());
			}
		}

		Self { commands, index }
	}

	/// Overload set registered under `name`, matched case-insensitively.
	/// Empty when the name is unknown.
	pub fn overloads(&self, name: &str) -> &[Arc<Command>] {
		self.index
			.get(&name.to_lowercase())
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Every command in registration order.
	pub fn commands(&self) -> impl Iterator<Item = &Arc<Command>> {
		self.commands.iter()
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}

impl fmt::Debug for CommandRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandRegistry")
			.field("commands", &self.commands.len())
			.field("lookup_keys", &self.index.len())
			.finish_non_exhaustive()
	}
}
