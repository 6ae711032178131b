//! Lexical pre-pass that blanks out comments and literal contents.
//!
//! The masked text has exactly the same byte length and line structure as the input, so
//! offsets found by pattern matching on it can be used to slice the original source. Quote
//! and backtick delimiters of top-level literals are kept so that statement patterns can
//! still see where a specifier string sits.

use crate::error::DialectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Code,
  LineComment,
  BlockComment,
  Quote(u8),
  Template,
  Regex { in_class: bool },
}

/// Produce the masked form of `source`, validating literal termination and bracket balance.
pub fn mask_source(source: &str) -> Result<String, DialectError> {
  let bytes = source.as_bytes();
  let mut out = bytes.to_vec();
  let mut mode = Mode::Code;
  // One brace depth per open `${ ... }` template expression.
  let mut template_exprs: Vec<usize> = Vec::new();
  let mut brackets: Vec<(u8, usize)> = Vec::new();
  let mut literal_start = 0;
  let mut i = 0;

  while i < bytes.len() {
    let byte = bytes[i];
    let next = bytes.get(i + 1).copied();
    let nested = !template_exprs.is_empty();

    match mode {
      Mode::Code => {
        match byte {
          b'/' if next == Some(b'/') => {
            mode = Mode::LineComment;
            blank(&mut out, i);
          }
          b'/' if next == Some(b'*') => {
            mode = Mode::BlockComment;
            literal_start = i;
            blank(&mut out, i);
            blank(&mut out, i + 1);
            i += 1;
          }
          b'/' if regex_allowed(&out[..i]) => {
            mode = Mode::Regex { in_class: false };
            literal_start = i;
          }
          b'\'' | b'"' => {
            mode = Mode::Quote(byte);
            literal_start = i;
            if nested {
              blank(&mut out, i);
            }
          }
          b'`' => {
            mode = Mode::Template;
            literal_start = i;
            if nested {
              blank(&mut out, i);
            }
          }
          b'{' if nested => {
            if let Some(depth) = template_exprs.last_mut() {
              *depth += 1;
            }
            blank(&mut out, i);
          }
          b'}' if nested => {
            blank(&mut out, i);
            match template_exprs.last_mut() {
              Some(0) => {
                template_exprs.pop();
                mode = Mode::Template;
              }
              Some(depth) => *depth -= 1,
              None => {}
            }
          }
          b'(' | b'[' | b'{' => {
            brackets.push((byte, i));
            if nested {
              blank(&mut out, i);
            }
          }
          b')' | b']' | b'}' => {
            if nested {
              blank(&mut out, i);
            }
            let expected = match byte {
              b')' => b'(',
              b']' => b'[',
              _ => b'{',
            };
            match brackets.pop() {
              Some((open, _)) if open == expected => {}
              _ => {
                return Err(DialectError::at(
                  source,
                  i,
                  format!("unexpected `{}`", byte as char),
                ));
              }
            }
          }
          _ => {
            if nested {
              blank(&mut out, i);
            }
          }
        }
      }
      Mode::LineComment => {
        if byte == b'\n' {
          mode = Mode::Code;
        } else {
          blank(&mut out, i);
        }
      }
      Mode::BlockComment => {
        blank(&mut out, i);
        if byte == b'*' && next == Some(b'/') {
          blank(&mut out, i + 1);
          i += 1;
          mode = Mode::Code;
        }
      }
      Mode::Quote(quote) => {
        if byte == b'\\' {
          blank(&mut out, i);
          if next.is_some() {
            blank(&mut out, i + 1);
            i += 1;
          }
        } else if byte == quote {
          mode = Mode::Code;
          if nested {
            blank(&mut out, i);
          }
        } else if byte == b'\n' {
          return Err(DialectError::at(source, literal_start, "unterminated string literal"));
        } else {
          blank(&mut out, i);
        }
      }
      Mode::Template => {
        if byte == b'\\' {
          blank(&mut out, i);
          if next.is_some() {
            blank(&mut out, i + 1);
            i += 1;
          }
        } else if byte == b'`' {
          mode = Mode::Code;
          if nested {
            blank(&mut out, i);
          }
        } else if byte == b'$' && next == Some(b'{') {
          blank(&mut out, i);
          blank(&mut out, i + 1);
          i += 1;
          template_exprs.push(0);
          mode = Mode::Code;
        } else {
          blank(&mut out, i);
        }
      }
      Mode::Regex { in_class } => {
        if byte == b'\\' {
          blank(&mut out, i);
          if next.is_some() {
            blank(&mut out, i + 1);
            i += 1;
          }
        } else if byte == b'\n' {
          return Err(DialectError::at(source, literal_start, "unterminated regular expression"));
        } else if byte == b'/' && !in_class {
          mode = Mode::Code;
        } else {
          blank(&mut out, i);
          mode = match byte {
            b'[' => Mode::Regex { in_class: true },
            b']' => Mode::Regex { in_class: false },
            _ => mode,
          };
        }
      }
    }
    i += 1;
  }

  match mode {
    Mode::Code | Mode::LineComment if template_exprs.is_empty() => {}
    Mode::BlockComment => {
      return Err(DialectError::at(source, literal_start, "unterminated block comment"));
    }
    Mode::Quote(_) => {
      return Err(DialectError::at(source, literal_start, "unterminated string literal"));
    }
    Mode::Regex { .. } => {
      return Err(DialectError::at(source, literal_start, "unterminated regular expression"));
    }
    _ => {
      return Err(DialectError::at(source, literal_start, "unterminated template literal"));
    }
  }

  if let Some((open, offset)) = brackets.pop() {
    return Err(DialectError::at(
      source,
      offset,
      format!("unclosed `{}`", open as char),
    ));
  }

  String::from_utf8(out).map_err(|_| DialectError::at(source, 0, "source is not valid UTF-8"))
}

fn blank(out: &mut [u8], index: usize) {
  if let Some(byte) = out.get_mut(index)
    && *byte != b'\n'
  {
    *byte = b' ';
  }
}

/// Decide whether a `/` at the end of `prefix` starts a regular expression literal.
fn regex_allowed(prefix: &[u8]) -> bool {
  let trimmed = prefix
    .iter()
    .rposition(|byte| !byte.is_ascii_whitespace())
    .map(|end| &prefix[..=end]);
  let Some(trimmed) = trimmed else {
    return true;
  };

  let last = trimmed[trimmed.len() - 1];
  if (last == b'+' || last == b'-') && ends_postfix_update(trimmed) {
    return false;
  }
  if b"(,=:[!&|?{};+-*%<>~^".contains(&last) {
    return true;
  }

  let word_start = trimmed
    .iter()
    .rposition(|byte| !(byte.is_ascii_alphanumeric() || *byte == b'_' || *byte == b'$'))
    .map_or(0, |index| index + 1);
  matches!(
    &trimmed[word_start..],
    b"return" | b"typeof" | b"instanceof" | b"in" | b"of" | b"new" | b"delete" | b"void"
      | b"throw" | b"case" | b"do" | b"else" | b"yield" | b"await"
  )
}

/// Whether `prefix` ends in `x++` / `x--`, after which a slash divides.
fn ends_postfix_update(prefix: &[u8]) -> bool {
  let Some((rest, operator)) = prefix.split_last_chunk::<2>() else {
    return false;
  };
  if operator[0] != operator[1] {
    return false;
  }
  rest
    .iter()
    .rev()
    .find(|byte| !byte.is_ascii_whitespace())
    .is_some_and(|byte| byte.is_ascii_alphanumeric() || b"_$)]".contains(byte))
}
