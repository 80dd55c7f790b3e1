//! Best-effort translation of ECMA 262 regular expressions into the syntax
//! understood by the Rust regex engines.
//!
//! JSON Schema patterns follow JavaScript semantics: `\d`, `\w` and `\s` are
//! ASCII-oriented, and `\cX` control escapes exist. Patterns containing
//! look-arounds or backreferences are passed through untouched; `fancy-regex`
//! supports them natively.
use std::borrow::Cow;

use regex_syntax::ast::{
    self, parse::Parser, Ast, ClassPerl, ClassPerlKind, ClassSetItem, ErrorKind, Literal,
    LiteralKind, Span, SpecialLiteralKind,
};

pub(crate) fn to_rust_regex(pattern: &str) -> Result<Cow<'_, str>, ()> {
    let mut pattern = Cow::Borrowed(pattern);
    let ast = loop {
        match Parser::new().parse(&pattern) {
            Ok(ast) => break ast,
            Err(error) if *error.kind() == ErrorKind::EscapeUnrecognized => {
                match replace_control_escape(&pattern, error.span()) {
                    Some(replaced) => pattern = Cow::Owned(replaced),
                    None => return Err(()),
                }
            }
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::UnsupportedLookAround | ErrorKind::UnsupportedBackreference
                ) =>
            {
                // fancy-regex handles these; no translation possible anyway
                return Ok(pattern);
            }
            Err(_) => return Err(()),
        }
    };

    let mut replacements = Vec::new();
    ast::visit(
        &ast,
        ClassCollector {
            replacements: &mut replacements,
        },
    )?;
    if replacements.is_empty() {
        return Ok(pattern);
    }
    let mut buffer = pattern.into_owned();
    // Spans refer to the parsed string; apply right-to-left so earlier
    // offsets stay valid.
    replacements.sort_by_key(|(span, _)| span.start.offset);
    for (span, replacement) in replacements.into_iter().rev() {
        buffer.replace_range(span.start.offset..span.end.offset, replacement);
    }
    Ok(Cow::Owned(buffer))
}

/// Rewrite a `\cX` escape (an ASCII control character in ECMA 262) in place.
fn replace_control_escape(pattern: &str, span: &Span) -> Option<String> {
    let escape = &pattern[span.start.offset..span.end.offset];
    if escape != r"\c" {
        return None;
    }
    let letter = pattern[span.end.offset..].chars().next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    let control = ((letter as u8) % 32) as char;
    let mut replaced = String::with_capacity(pattern.len());
    replaced.push_str(&pattern[..span.start.offset]);
    replaced.push(control);
    replaced.push_str(&pattern[span.end.offset + 1..]);
    Some(replaced)
}

const fn perl_replacement(class: &ClassPerl) -> &'static str {
    match class.kind {
        ClassPerlKind::Digit => {
            if class.negated {
                "[^0-9]"
            } else {
                "[0-9]"
            }
        }
        ClassPerlKind::Word => {
            if class.negated {
                "[^A-Za-z0-9_]"
            } else {
                "[A-Za-z0-9_]"
            }
        }
        ClassPerlKind::Space => {
            if class.negated {
                "[^ \t\n\r\u{000b}\u{000c}\u{00a0}\u{feff}\u{2003}\u{2029}]"
            } else {
                "[ \t\n\r\u{000b}\u{000c}\u{00a0}\u{feff}\u{2003}\u{2029}]"
            }
        }
    }
}

struct ClassCollector<'a> {
    replacements: &'a mut Vec<(Span, &'static str)>,
}

impl ast::Visitor for ClassCollector<'_> {
    type Output = ();
    type Err = ();

    fn finish(self) -> Result<(), ()> {
        Ok(())
    }

    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), ()> {
        if let ClassSetItem::Perl(class) = item {
            self.replacements.push((class.span, perl_replacement(class)));
        }
        Ok(())
    }

    fn visit_post(&mut self, ast: &Ast) -> Result<(), ()> {
        match ast {
            Ast::ClassPerl(class) => {
                self.replacements.push((class.span, perl_replacement(class)));
            }
            Ast::Literal(literal) => {
                if let Literal {
                    kind: LiteralKind::Special(SpecialLiteralKind::Bell),
                    ..
                } = literal.as_ref()
                {
                    // `\a` is not a valid ECMA 262 escape
                    return Err(());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::to_rust_regex;
    use test_case::test_case;

    #[test_case(r"\d+", "[0-9]+"; "digit class plus")]
    #[test_case(r"\D", "[^0-9]"; "non digit class")]
    #[test_case(r"\w-\W", "[A-Za-z0-9_]-[^A-Za-z0-9_]"; "word and non word classes")]
    #[test_case(r"[\d\w]", "[[0-9][A-Za-z0-9_]]"; "digit and word inside class")]
    #[test_case(r"[^\d]", "[^[0-9]]"; "negated digit class")]
    #[test_case(r"\cA", "\x01"; "control escape a")]
    #[test_case(r"a\cIb", "a\x09b"; "control escape i")]
    #[test_case(r"^a*$", "^a*$"; "untouched pattern stays borrowed")]
    fn translation(input: &str, expected: &str) {
        assert_eq!(to_rust_regex(input).unwrap(), expected);
    }

    #[test_case(r"(?=a)b"; "lookahead passes through")]
    fn passthrough(input: &str) {
        assert_eq!(to_rust_regex(input).unwrap(), input);
    }

    #[test_case(r"[a-z"; "unclosed class")]
    #[test_case(r"a{3,2}"; "bad quantifier")]
    #[test_case(r"\c"; "dangling control escape")]
    #[test_case(r"\"; "trailing backslash")]
    fn invalid(input: &str) {
        assert!(to_rust_regex(input).is_err());
    }
}
