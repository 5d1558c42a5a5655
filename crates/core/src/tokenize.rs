//! Raw input tokenization and named-token classification.
//!
//! Splits one line of text into a command name plus positional and named
//! arguments. Double quotes group whitespace into a single token, backslash
//! escapes the next character, and a token shaped like `key:value` or
//! `key=value` becomes a named argument unless quoting or escaping touched
//! the text before the separator.

use std::collections::HashMap;

use adjutant_types::ParsedInput;

/// One scanned token plus where quoting or escaping first altered it.
///
/// `literal_from` is the byte index of the first character that arrived via
/// a quote or an escape. Named-token classification only looks at the text
/// before that point, so `"key:value"` and `key\:value` stay positional
/// while `key:"a b"` is still named.
struct RawToken {
	text: String,
	literal_from: Option<usize>,
}

enum Classified {
	Positional(String),
	Named { key: String, value: String },
}

/// Tokenizes a raw input line.
///
/// Never fails: empty or whitespace-only input yields a [`ParsedInput`] with
/// an empty name, and an unterminated quote degrades by consuming the rest
/// of the line as the final token.
pub fn parse(raw: &str) -> ParsedInput {
	let tokens = scan(raw);
	assemble(tokens, raw.to_string())
}

/// Builds a [`ParsedInput`] from an already-split token list.
///
/// Front ends that receive arguments pre-split (an argv, a slash-command
/// payload) skip quote handling but keep named-token classification, with
/// every token treated as unquoted text.
pub fn from_tokens<N, I, S>(name: N, tokens: I) -> ParsedInput
where
	N: Into<String>,
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut scanned = vec![RawToken {
		text: name.into(),
		literal_from: None,
	}];
	scanned.extend(tokens.into_iter().map(|t| RawToken {
		text: t.into(),
		literal_from: None,
	}));
	assemble(scanned, String::new())
}

fn assemble(tokens: Vec<RawToken>, raw: String) -> ParsedInput {
	let mut tokens = tokens.into_iter();
	let name = tokens.next().map(|t| t.text).unwrap_or_default();

	let mut positional = Vec::new();
	let mut named = HashMap::new();
	for token in tokens {
		match classify(token) {
			Classified::Positional(text) => positional.push(text),
			// Later duplicates of a key overwrite earlier ones.
			Classified::Named { key, value } => {
				named.insert(key.to_lowercase(), value);
			}
		}
	}

	ParsedInput {
		name,
		positional,
		named,
		raw,
	}
}

/// Splits a named candidate on its first plain `:` or `=`.
///
/// The separator must sit in the part of the token untouched by quotes and
/// escapes, and the key must be non-empty. Everything after the first
/// separator is the value, so `url:https://example.com` keeps its colons.
fn classify(token: RawToken) -> Classified {
	let plain_end = token.literal_from.unwrap_or(token.text.len());
	let separator = token.text[..plain_end]
		.char_indices()
		.find(|&(_, c)| c == ':' || c == '=');
	match separator {
		Some((at, _)) if at > 0 => Classified::Named {
			key: token.text[..at].to_string(),
			value: token.text[at + 1..].to_string(),
		},
		_ => Classified::Positional(token.text),
	}
}

fn scan(raw: &str) -> Vec<RawToken> {
	let mut out = Vec::new();
	let mut text = String::new();
	let mut literal_from = None;
	let mut started = false;
	let mut in_quote = false;
	let mut chars = raw.chars();

	// `started` distinguishes "no token yet" from an explicitly quoted empty
	// token, which must survive as "".
	macro_rules! flush {
		() => {
			if started {
				out.push(RawToken {
					text: std::mem::take(&mut text),
					literal_from: literal_from.take(),
				});
				started = false;
			}
		};
	}

	while let Some(ch) = chars.next() {
		if in_quote {
			match ch {
				'"' => in_quote = false,
				'\\' => {
					if let Some(next) = chars.next() {
						text.push(next);
					}
				}
				_ => text.push(ch),
			}
		} else {
			match ch {
				'"' => {
					in_quote = true;
					started = true;
					literal_from.get_or_insert(text.len());
				}
				'\\' => {
					if let Some(next) = chars.next() {
						literal_from.get_or_insert(text.len());
						text.push(next);
						started = true;
					}
				}
				c if c.is_whitespace() => flush!(),
				_ => {
					text.push(ch);
					started = true;
				}
			}
		}
	}
	// An unterminated quote falls out of the loop still inside the quote;
	// whatever accumulated becomes the final token.
	if started {
		out.push(RawToken { text, literal_from });
	}

	out
}
