//! Stock converters for the standard scalar types.

use std::future::ready;
use std::marker::PhantomData;
use std::str::FromStr;

use super::{ArgValue, ConverterRegistry, TypeConverter, short_type_name};
use crate::BoxFut;
use crate::context::InvocationContext;

/// Converter for any `FromStr` target type.
///
/// Also the extension point for host types: anything implementing `FromStr`
/// can be registered with `registry.register::<T>(FromStrConverter::new())`.
pub struct FromStrConverter<T> {
	_marker: PhantomData<fn() -> T>,
}

impl<T> FromStrConverter<T> {
	pub fn new() -> Self {
		Self {
			_marker: PhantomData,
		}
	}
}

impl<T> Default for FromStrConverter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> TypeConverter for FromStrConverter<T>
where
	T: FromStr + Send + Sync + 'static,
{
	fn convert<'a>(
		&'a self,
		token: &'a str,
		_ctx: &'a InvocationContext,
	) -> BoxFut<'a, Result<ArgValue, String>> {
		let outcome = token
			.parse::<T>()
			.map(ArgValue::new)
			.map_err(|_| format!("'{token}' is not a valid {}", short_type_name::<T>()));
		Box::pin(ready(outcome))
	}
}

/// Accepts the usual textual spellings of a boolean, case-insensitively.
struct BoolConverter;

impl TypeConverter for BoolConverter {
	fn convert<'a>(
		&'a self,
		token: &'a str,
		_ctx: &'a InvocationContext,
	) -> BoxFut<'a, Result<ArgValue, String>> {
		let outcome = match token.to_ascii_lowercase().as_str() {
			"true" | "yes" | "on" | "1" => Ok(ArgValue::new(true)),
			"false" | "no" | "off" | "0" => Ok(ArgValue::new(false)),
			_ => Err(format!("'{token}' is not a valid bool (try true or false)")),
		};
		Box::pin(ready(outcome))
	}
}

pub(super) fn install(registry: &ConverterRegistry) {
	macro_rules! from_str {
		($($ty:ty),+ $(,)?) => {
			$(registry.register::<$ty>(FromStrConverter::<$ty>::new());)+
		};
	}
	from_str!(String, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
	registry.register::<bool>(BoolConverter);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::convert::ArgType;

	async fn convert(ty: ArgType, token: &str) -> Result<ArgValue, String> {
		let registry = ConverterRegistry::new();
		let converter = registry.resolve(&ty).unwrap();
		let ctx = InvocationContext::new();
		converter.convert(token, &ctx).await
	}

	#[tokio::test]
	async fn integers_parse() {
		let value = convert(ArgType::of::<i64>(), "-42").await.unwrap();
		assert_eq!(value.downcast_ref::<i64>(), Some(&-42));
	}

	#[tokio::test]
	async fn integer_rejection_names_the_type() {
		let err = convert(ArgType::of::<i64>(), "abc").await.unwrap_err();
		assert_eq!(err, "'abc' is not a valid i64");
	}

	#[tokio::test]
	async fn unsigned_rejects_negative() {
		assert!(convert(ArgType::of::<u32>(), "-1").await.is_err());
	}

	#[tokio::test]
	async fn floats_parse() {
		let value = convert(ArgType::of::<f64>(), "2.5").await.unwrap();
		assert_eq!(value.downcast_ref::<f64>(), Some(&2.5));
	}

	#[tokio::test]
	async fn text_accepts_anything() {
		let value = convert(ArgType::text(), "anything at all").await.unwrap();
		assert_eq!(
			value.downcast_ref::<String>().map(String::as_str),
			Some("anything at all")
		);
	}

	#[tokio::test]
	async fn char_wants_exactly_one() {
		let value = convert(ArgType::of::<char>(), "x").await.unwrap();
		assert_eq!(value.downcast_ref::<char>(), Some(&'x'));
		assert!(convert(ArgType::of::<char>(), "xy").await.is_err());
	}

	#[tokio::test]
	async fn bool_accepts_common_spellings() {
		for token in ["true", "YES", "on", "1"] {
			let value = convert(ArgType::of::<bool>(), token).await.unwrap();
			assert_eq!(value.downcast_ref::<bool>(), Some(&true), "{token}");
		}
		for token in ["false", "No", "OFF", "0"] {
			let value = convert(ArgType::of::<bool>(), token).await.unwrap();
			assert_eq!(value.downcast_ref::<bool>(), Some(&false), "{token}");
		}
	}

	#[tokio::test]
	async fn bool_rejection_suggests_spelling() {
		let err = convert(ArgType::of::<bool>(), "maybe").await.unwrap_err();
		assert_eq!(err, "'maybe' is not a valid bool (try true or false)");
	}
}
