//! Enumerated argument types and their generated converters.

use std::collections::HashMap;
use std::future::ready;
use std::sync::Arc;

use super::{ArgValue, TypeConverter, short_type_name};
use crate::BoxFut;
use crate::context::InvocationContext;

/// An argument type with a fixed set of named values.
///
/// Declaring a parameter with [`ArgType::enum_of`](super::ArgType::enum_of)
/// is all it takes; the converter is generated from the variants table on
/// first use. Matching is case-insensitive against the canonical names.
pub trait EnumArgument: Clone + Send + Sync + 'static {
	/// Canonical name/value pairs.
	fn variants() -> &'static [(&'static str, Self)];
}

pub(super) fn converter_factory<T: EnumArgument>() -> Arc<dyn TypeConverter> {
	Arc::new(EnumConverter::<T>::build())
}

/// Name-table converter built from [`EnumArgument::variants`].
///
/// Constructed once per enum type and cached by the registry, so every
/// conversion after the first is a single map lookup.
struct EnumConverter<T> {
	symbols: HashMap<String, T>,
	/// Canonical names joined for rejection messages.
	expected: String,
	type_name: &'static str,
}

impl<T: EnumArgument> EnumConverter<T> {
	fn build() -> Self {
		let mut symbols = HashMap::new();
		for (name, value) in T::variants() {
			symbols.insert(name.to_lowercase(), value.clone());
		}
		let expected = T::variants()
			.iter()
			.map(|(name, _)| *name)
			.collect::<Vec<_>>()
			.join(", ");
		Self {
			symbols,
			expected,
			type_name: short_type_name::<T>(),
		}
	}
}

impl<T: EnumArgument> TypeConverter for EnumConverter<T> {
	fn convert<'a>(
		&'a self,
		token: &'a str,
		_ctx: &'a InvocationContext,
	) -> BoxFut<'a, Result<ArgValue, String>> {
		let outcome = match self.symbols.get(&token.to_lowercase()) {
			Some(value) => Ok(ArgValue::new(value.clone())),
			None => Err(format!(
				"'{token}' is not a valid {} (expected one of: {})",
				self.type_name, self.expected
			)),
		};
		Box::pin(ready(outcome))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::convert::{ArgType, ConverterRegistry};

	#[derive(Clone, Debug, PartialEq)]
	enum Direction {
		North,
		South,
		East,
		West,
	}

	impl EnumArgument for Direction {
		fn variants() -> &'static [(&'static str, Self)] {
			&[
				("north", Direction::North),
				("south", Direction::South),
				("east", Direction::East),
				("west", Direction::West),
			]
		}
	}

	async fn convert(token: &str) -> Result<ArgValue, String> {
		let registry = ConverterRegistry::new();
		let converter = registry.resolve(&ArgType::enum_of::<Direction>()).unwrap();
		let ctx = InvocationContext::new();
		converter.convert(token, &ctx).await
	}

	#[tokio::test]
	async fn matches_canonical_name() {
		let value = convert("north").await.unwrap();
		assert_eq!(value.downcast_ref::<Direction>(), Some(&Direction::North));
	}

	#[tokio::test]
	async fn matches_any_casing() {
		let value = convert("WeSt").await.unwrap();
		assert_eq!(value.downcast_ref::<Direction>(), Some(&Direction::West));
	}

	#[tokio::test]
	async fn rejection_lists_the_variants() {
		let err = convert("up").await.unwrap_err();
		assert_eq!(
			err,
			"'up' is not a valid Direction (expected one of: north, south, east, west)"
		);
	}
}
