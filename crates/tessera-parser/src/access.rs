//! Access names: dotted paths that address boxes.
//!
//! An access name is a sequence of segments separated by `.`. A segment is
//! either bare (word characters only) or quoted with `"`; inside quotes `\"`
//! and `\\` are the only escapes. The canonical form quotes exactly the
//! segments that need it:
//!
//! ```
//! # use tessera_parser::{access_name_to_path, path_to_access_name};
//! let path = access_name_to_path("a.\"b.c\"").unwrap();
//! assert_eq!(path, ["a", "b.c"]);
//! assert_eq!(path_to_access_name(&path), "a.\"b.c\"");
//! ```

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode, ModalResult},
    token::{none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
};

/// Why an access name could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessFailure {
    UnterminatedQuote,
    InvalidEscape,
    MissingSegment,
}

impl AccessFailure {
    pub(crate) fn code(self) -> ErrorCode {
        match self {
            AccessFailure::UnterminatedQuote => ErrorCode::E001,
            AccessFailure::InvalidEscape => ErrorCode::E003,
            AccessFailure::MissingSegment => ErrorCode::E103,
        }
    }

    pub(crate) fn message(self) -> &'static str {
        match self {
            AccessFailure::UnterminatedQuote => "unterminated quoted segment",
            AccessFailure::InvalidEscape => "invalid escape sequence in quoted segment",
            AccessFailure::MissingSegment => "expected a bare or quoted segment",
        }
    }
}

type Input<'a> = &'a str;
type IResult<O> = ModalResult<O, ContextError<AccessFailure>>;

/// Characters allowed in bare segments.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn bare_segment<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., is_word_char).parse_next(input)
}

fn escaped_char(input: &mut Input<'_>) -> IResult<char> {
    preceded(
        '\\',
        cut_err(one_of(['"', '\\'])).context(AccessFailure::InvalidEscape),
    )
    .parse_next(input)
}

fn quoted_segment(input: &mut Input<'_>) -> IResult<String> {
    let content = repeat(0.., alt((escaped_char, none_of(['"', '\\'])))).fold(
        String::new,
        |mut acc, ch| {
            acc.push(ch);
            acc
        },
    );

    preceded(
        '"',
        cut_err(terminated(content, '"')).context(AccessFailure::UnterminatedQuote),
    )
    .parse_next(input)
}

fn segment(input: &mut Input<'_>) -> IResult<String> {
    alt((quoted_segment, bare_segment.map(str::to_owned))).parse_next(input)
}

fn path(input: &mut Input<'_>) -> IResult<Vec<String>> {
    separated(1.., segment, '.').parse_next(input)
}

fn failure_of(err: ErrMode<ContextError<AccessFailure>>) -> AccessFailure {
    match err {
        ErrMode::Backtrack(err) | ErrMode::Cut(err) => err
            .context()
            .next()
            .copied()
            .unwrap_or(AccessFailure::MissingSegment),
        _ => AccessFailure::MissingSegment,
    }
}

/// Reads a path at the start of `src`.
///
/// Returns the segments and the number of bytes consumed. Reading stops at
/// the first character that cannot continue the path, so `a.b->c` yields
/// `["a", "b"]` and 3 bytes.
pub(crate) fn path_prefix(src: &str) -> Result<(Vec<String>, usize), AccessFailure> {
    let mut input = src;
    let path = path.parse_next(&mut input).map_err(failure_of)?;
    Ok((path, src.len() - input.len()))
}

/// Reads a single segment at the start of `src`, as used by `&name` and
/// `$tag` selectors.
pub(crate) fn segment_prefix(src: &str) -> Result<(String, usize), AccessFailure> {
    let mut input = src;
    let segment = segment.parse_next(&mut input).map_err(failure_of)?;
    Ok((segment, src.len() - input.len()))
}

/// Parses an access name into its path segments.
///
/// The empty string names the root and yields an empty path.
///
/// # Errors
///
/// Returns a [`ParseError`] when the name is not a valid access name or has
/// trailing characters.
pub fn access_name_to_path(name: &str) -> Result<Vec<String>, ParseError> {
    if name.is_empty() {
        return Ok(Vec::new());
    }

    let (path, consumed) = path_prefix(name).map_err(|failure| {
        Diagnostic::error(failure.message())
            .with_code(failure.code())
            .with_label(Span::new(0..name.len()), "in this access name")
    })?;

    if consumed != name.len() {
        return Err(Diagnostic::error(format!(
            "unexpected `{}` in access name",
            &name[consumed..]
        ))
        .with_code(ErrorCode::E103)
        .with_label(Span::new(consumed..name.len()), "not part of a path")
        .into());
    }

    Ok(path)
}

/// Formats path segments as a canonical access name.
///
/// Segments that are empty or contain anything besides word characters are
/// quoted, with `"` and `\` escaped.
pub fn path_to_access_name<S: AsRef<str>>(path: &[S]) -> String {
    let segments: Vec<String> = path
        .iter()
        .map(|segment| format_segment(segment.as_ref()))
        .collect();
    segments.join(".")
}

fn format_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.chars().all(is_word_char) {
        return segment.to_string();
    }

    let mut quoted = String::with_capacity(segment.len() + 2);
    quoted.push('"');
    for ch in segment.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        assert_eq!(
            access_name_to_path("web.api.v2").unwrap(),
            ["web", "api", "v2"]
        );
        assert!(access_name_to_path("").unwrap().is_empty());
    }

    #[test]
    fn test_quoted_segments() {
        assert_eq!(
            access_name_to_path(r#"a."b.c"."say \"hi\"""#).unwrap(),
            ["a", "b.c", "say \"hi\""]
        );
        assert_eq!(access_name_to_path(r#""""#).unwrap(), [""]);
        assert_eq!(access_name_to_path(r#""a\\b""#).unwrap(), ["a\\b"]);
    }

    #[test]
    fn test_format_quotes_only_when_needed() {
        assert_eq!(path_to_access_name(&["a", "b.c"]), "a.\"b.c\"");
        assert_eq!(path_to_access_name(&["", "x y"]), "\"\".\"x y\"");
        assert_eq!(path_to_access_name(&["q\"t"]), "\"q\\\"t\"");
        assert_eq!(path_to_access_name::<&str>(&[]), "");
    }

    #[test]
    fn test_prefix_stops_before_link_token() {
        let (path, consumed) = path_prefix("a.b->c").unwrap();
        assert_eq!(path, ["a", "b"]);
        assert_eq!(consumed, 3);

        let (path, consumed) = path_prefix("x.->y").unwrap();
        assert_eq!(path, ["x"]);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_errors() {
        let err = access_name_to_path("\"open").unwrap_err();
        assert_eq!(err.first().and_then(Diagnostic::code), Some(ErrorCode::E001));

        let err = access_name_to_path("\"bad\\n\"").unwrap_err();
        assert_eq!(err.first().and_then(Diagnostic::code), Some(ErrorCode::E003));

        let err = access_name_to_path("a b").unwrap_err();
        assert_eq!(err.first().and_then(Diagnostic::code), Some(ErrorCode::E103));

        let err = access_name_to_path(".a").unwrap_err();
        assert_eq!(err.first().and_then(Diagnostic::code), Some(ErrorCode::E103));
    }

    #[test]
    fn test_segment_prefix() {
        assert_eq!(segment_prefix("db rest").unwrap(), ("db".to_string(), 2));
        assert_eq!(
            segment_prefix("\"my db\"}").unwrap(),
            ("my db".to_string(), 7)
        );
        assert_eq!(segment_prefix("-x"), Err(AccessFailure::MissingSegment));
    }
}
