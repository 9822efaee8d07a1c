//! Parameter-name extraction from the textual definition of a callable.
//!
//! The extractor understands closure parameter lists (`|logger, store|`) and
//! function headers (`fn new(logger: Logger)`, `constructor(a, b)`). Type
//! annotations are skipped, so `|a: Vec<(u8, u8)>, b: Arc<Store>|` yields
//! `["a", "b"]`.
//!
//! Parameter names are only as good as the text they come from. Default
//! values (`a = 1`) and destructuring patterns (`(a, b)`, `Point { x, y }`)
//! are rejected with [`IocError::SignatureParse`] instead of being guessed at.
//! When a callable cannot be described by text, pass the names directly with
//! [`Signature::Explicit`](crate::Signature::Explicit).

use crate::error::{IocError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static CLOSURE_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:move\s*)?\|").unwrap());

// Everything before the generics and the parameter list. Generics are
// balanced separately since bounds such as `F: Fn(u8)` contain parentheses.
static FUNCTION_HEAD: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"^(?:pub(?:\([^)]*\))?\s+)?(?:(?:const|async|unsafe)\s+)*(?:(?:fn|function)\s+(?:r#)?[\p{Alphabetic}_]\w*|(?:r#)?[\p{Alphabetic}_]\w*)?\s*",
  )
  .unwrap()
});

static RECEIVER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(?:&\s*(?:'\w+\s+)?(?:mut\s+)?|mut\s+)?self$").unwrap());

static MUT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^mut\s+").unwrap());

static IDENTIFIER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(?:r#)?([\p{Alphabetic}_]\w*)$").unwrap());

/// Returns the ordered formal parameter names declared by `text`.
///
/// A callable with no parameters yields an empty list.
pub fn extract(text: &str) -> Result<Vec<String>> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(IocError::signature(text, "signature is empty"));
  }

  let (rest, terminator) = match CLOSURE_HEAD.find(trimmed) {
    Some(head) => (&trimmed[head.end()..], '|'),
    None => (function_parameters(text, trimmed)?, ')'),
  };

  let end = find_top_level(rest, |_, ch, _| ch == terminator)
    .map_err(|reason| IocError::signature(text, reason))?
    .ok_or_else(|| IocError::signature(text, "parameter list is never closed"))?;

  split_parameters(text, &rest[..end])?
    .into_iter()
    .filter_map(|parameter| parse_parameter(text, parameter).transpose())
    .collect()
}

/// The text after the opening parenthesis of a function header, skipping an
/// optional generic parameter list.
fn function_parameters<'a>(text: &str, trimmed: &'a str) -> Result<&'a str> {
  let head = FUNCTION_HEAD.find(trimmed).map_or(0, |head| head.end());
  let after = &trimmed[head..];

  let open = find_top_level(after, |_, ch, _| ch == '(')
    .map_err(|reason| IocError::signature(text, reason))?
    .ok_or_else(|| IocError::signature(text, "unrecognised callable header"))?;

  let generics = after[..open].trim();
  if !generics.is_empty() && !(generics.starts_with('<') && generics.ends_with('>')) {
    return Err(IocError::signature(text, "unrecognised callable header"));
  }
  Ok(&after[open + 1..])
}

fn split_parameters<'a>(text: &str, list: &'a str) -> Result<Vec<&'a str>> {
  let mut parameters = Vec::new();
  let mut rest = list;

  loop {
    let comma = find_top_level(rest, |_, ch, _| ch == ',')
      .map_err(|reason| IocError::signature(text, reason))?;
    match comma {
      Some(at) => {
        let parameter = rest[..at].trim();
        if parameter.is_empty() {
          return Err(IocError::signature(text, "empty parameter"));
        }
        parameters.push(parameter);
        rest = &rest[at + 1..];
      }
      None => {
        // A trailing comma leaves an empty tail.
        let parameter = rest.trim();
        if !parameter.is_empty() {
          parameters.push(parameter);
        }
        return Ok(parameters);
      }
    }
  }
}

/// Parses one parameter. Receivers (`&self`) yield `None`.
fn parse_parameter(text: &str, parameter: &str) -> Result<Option<String>> {
  let colon = find_top_level(parameter, |prev, ch, next| {
    ch == ':' && prev != Some(':') && next != Some(':')
  })
  .map_err(|reason| IocError::signature(text, reason))?;

  let pattern = match colon {
    Some(at) => parameter[..at].trim(),
    None => parameter,
  };

  if pattern.contains('=') {
    return Err(IocError::signature(
      text,
      format!("default value in `{}` is not supported", parameter),
    ));
  }
  if RECEIVER.is_match(pattern) {
    return Ok(None);
  }

  let pattern = MUT_PREFIX.replace(pattern, "");
  if pattern.starts_with(['(', '[', '{', '&']) || pattern.contains(['(', '{', '[']) {
    return Err(IocError::signature(
      text,
      format!("destructuring pattern `{}` is not supported", pattern),
    ));
  }

  let name = IDENTIFIER
    .captures(&pattern)
    .and_then(|captures| captures.get(1))
    .map(|name| name.as_str())
    .ok_or_else(|| {
      IocError::signature(text, format!("`{}` is not a plain identifier", pattern))
    })?;

  if name == "_" {
    return Err(IocError::signature(
      text,
      "a wildcard parameter cannot name a dependency",
    ));
  }

  Ok(Some(name.to_owned()))
}

/// Walks `input` tracking bracket nesting and returns the byte offset of the
/// first depth-zero character accepted by `stop(prev, ch, next)`.
fn find_top_level(
  input: &str,
  stop: impl Fn(Option<char>, char, Option<char>) -> bool,
) -> std::result::Result<Option<usize>, &'static str> {
  let chars: Vec<(usize, char)> = input.char_indices().collect();
  let mut depth = 0usize;

  for (i, &(offset, ch)) in chars.iter().enumerate() {
    let prev = i.checked_sub(1).map(|p| chars[p].1);
    let next = chars.get(i + 1).map(|&(_, c)| c);

    if depth == 0 && stop(prev, ch, next) {
      return Ok(Some(offset));
    }

    match ch {
      '(' | '[' | '{' | '<' => depth += 1,
      ')' | ']' | '}' => depth = depth.checked_sub(1).ok_or("unbalanced delimiters")?,
      // `->` and `=>` are arrows, not closing brackets.
      '>' if prev != Some('-') && prev != Some('=') => {
        depth = depth.checked_sub(1).ok_or("unbalanced delimiters")?
      }
      _ => {}
    }
  }

  if depth != 0 {
    return Err("unbalanced delimiters");
  }
  Ok(None)
}
