use thiserror::Error;

/// Registry construction or service startup rejected a command table.
///
/// Every variant is a programming error in the host application, not a user
/// input problem, so these surface once at startup and never during dispatch.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("command name is empty")]
	EmptyCommandName,

	#[error("command '{command}' has no handler")]
	MissingHandler { command: String },

	#[error("command '{command}' declares parameter '{parameter}' more than once")]
	DuplicateParameter { command: String, parameter: String },

	#[error("command '{command}': parameter '{parameter}' follows the remainder parameter")]
	ParameterAfterRemainder { command: String, parameter: String },

	#[error("command '{command}': required parameter '{parameter}' follows an optional one")]
	RequiredAfterOptional { command: String, parameter: String },

	#[error("command '{name}' registers {count} overloads with identical signatures")]
	DuplicateSignature { name: String, count: usize },

	#[error(
		"no converter registered for parameter '{parameter}' of command '{command}' (type {type_name})"
	)]
	MissingConverter {
		command: String,
		parameter: String,
		type_name: &'static str,
	},
}
