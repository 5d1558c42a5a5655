//! Typed access to converted arguments inside a handler.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::command::Command;
use crate::convert::{ArgValue, short_type_name};

/// One bound parameter slot.
pub(crate) enum Slot {
	Value(ArgValue),
	/// Null from an empty token, or an unfilled optional with no default.
	Empty,
}

/// The converted arguments of one invocation, in declaration order.
///
/// Handlers look values up by parameter name: [`get`](Self::get) for
/// arguments that must be present, [`opt`](Self::opt) for optional and
/// nullable ones. Lookups are case-insensitive like everything else in the
/// pipeline.
pub struct Args {
	command: Arc<Command>,
	slots: Vec<Slot>,
}

#[derive(Debug, Error)]
pub enum ArgError {
	#[error("command declares no parameter named '{name}'")]
	UnknownParameter { name: String },

	#[error("parameter '{name}' has no value")]
	Missing { name: String },

	#[error("parameter '{name}' holds a {actual}, not a {requested}")]
	WrongType {
		name: String,
		actual: &'static str,
		requested: &'static str,
	},
}

impl Args {
	pub(crate) fn new(command: Arc<Command>, slots: Vec<Slot>) -> Self {
		Self { command, slots }
	}

	/// The command these arguments were bound for.
	pub fn command(&self) -> &Command {
		&self.command
	}

	/// Number of parameter slots (filled or not).
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Typed access to an argument that must be present.
	pub fn get<T: Any>(&self, name: &str) -> Result<&T, ArgError> {
		let (index, parameter) =
			self.command
				.parameter(name)
				.ok_or_else(|| ArgError::UnknownParameter {
					name: name.to_string(),
				})?;
		match &self.slots[index] {
			Slot::Value(value) => {
				value
					.downcast_ref::<T>()
					.ok_or_else(|| ArgError::WrongType {
						name: parameter.name().to_string(),
						actual: value.type_name(),
						requested: short_type_name::<T>(),
					})
			}
			Slot::Empty => Err(ArgError::Missing {
				name: parameter.name().to_string(),
			}),
		}
	}

	/// Typed access to an argument that may be unfilled.
	pub fn opt<T: Any>(&self, name: &str) -> Option<&T> {
		let (index, _) = self.command.parameter(name)?;
		match &self.slots[index] {
			Slot::Value(value) => value.downcast_ref::<T>(),
			Slot::Empty => None,
		}
	}

	/// Whether the named parameter got a value (explicitly or via default).
	pub fn is_set(&self, name: &str) -> bool {
		self.command
			.parameter(name)
			.is_some_and(|(index, _)| matches!(self.slots[index], Slot::Value(_)))
	}
}

impl fmt::Debug for Args {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let filled = self
			.slots
			.iter()
			.filter(|slot| matches!(slot, Slot::Value(_)))
			.count();
		f.debug_struct("Args")
			.field("command", &self.command.name())
			.field("filled", &filled)
			.field("slots", &self.slots.len())
			.finish()
	}
}
