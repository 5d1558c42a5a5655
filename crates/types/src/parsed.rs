//! Tokenized command invocation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A tokenized command invocation: name, positional tokens, named tokens.
///
/// Produced once per invocation (by the core tokenizer, or directly by a
/// front end that already has a split token list) and treated as immutable
/// afterwards. All values stay strings until argument conversion; nothing
/// here guesses at types.
///
/// Named keys are stored lowercased so lookups are case-insensitive, and a
/// duplicate key keeps the value seen last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInput {
	/// Command name: the first whitespace-delimited token, original casing.
	/// Empty when the input contained no tokens at all.
	pub name: String,

	/// Positional tokens in input order.
	pub positional: Vec<String>,

	/// Named tokens (`key:value` / `key=value`) keyed by lowercased name.
	pub named: HashMap<String, String>,

	/// The raw input line as received. Empty for pre-split token lists.
	pub raw: String,
}

impl ParsedInput {
	/// Case-insensitive named-token lookup.
	pub fn named_value(&self, key: &str) -> Option<&str> {
		self.named.get(&key.to_lowercase()).map(String::as_str)
	}

	/// `true` when the input contained no command name.
	pub fn is_empty(&self) -> bool {
		self.name.is_empty()
	}

	/// Total number of argument tokens, positional and named.
	pub fn arg_count(&self) -> usize {
		self.positional.len() + self.named.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn input_with_named(pairs: &[(&str, &str)]) -> ParsedInput {
		ParsedInput {
			name: "cmd".into(),
			positional: vec![],
			named: pairs
				.iter()
				.map(|(k, v)| (k.to_lowercase(), v.to_string()))
				.collect(),
			raw: String::new(),
		}
	}

	#[test]
	fn named_value_is_case_insensitive() {
		let input = input_with_named(&[("Name", "John")]);
		assert_eq!(input.named_value("name"), Some("John"));
		assert_eq!(input.named_value("NAME"), Some("John"));
		assert_eq!(input.named_value("nope"), None);
	}

	#[test]
	fn empty_name_means_empty_input() {
		let input = ParsedInput {
			name: String::new(),
			positional: vec![],
			named: HashMap::new(),
			raw: "   ".into(),
		};
		assert!(input.is_empty());
	}

	#[test]
	fn serializes_with_camel_case_fields() {
		let input = input_with_named(&[("who", "me")]);
		let json = serde_json::to_string(&input).unwrap();
		assert!(json.contains(r#""name":"cmd""#));
		assert!(json.contains(r#""positional":[]"#));
		assert!(json.contains(r#""who":"me""#));
	}
}
