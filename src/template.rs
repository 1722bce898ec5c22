//! Message template rendering.
//!
//! A template is merged with its positional arguments exactly once, when the
//! record is normalized. Two placeholder styles are accepted and may be
//! mixed:
//!
//! * `{}` with `{{` and `}}` as escapes
//! * `%s`, `%d`, `%i`, `%f`, `%r` with `%%` as escape
//!
//! Every placeholder renders its argument through
//! [`Loggable::render`](crate::loggable::Loggable::render); the printf
//! letters exist for familiarity and do not change the rendering.

use crate::error::{Error, Result};
use crate::loggable::Arg;

const PRINTF_CONVERSIONS: &[u8] = b"sdifr";

/// Renders `template` with `args`.
///
/// With no arguments the template is returned verbatim, so messages such as
/// `"100% done"` never need escaping.
pub fn render(template: &str, args: &[Arg]) -> Result<String> {
    if args.is_empty() {
        return Ok(template.to_string());
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut next_arg = 0;
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (skip, replacement) = match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => (2, Some("{")),
            b'}' if bytes.get(i + 1) == Some(&b'}') => (2, Some("}")),
            b'%' if bytes.get(i + 1) == Some(&b'%') => (2, Some("%")),
            b'{' if bytes.get(i + 1) == Some(&b'}') => (2, None),
            b'%' if bytes.get(i + 1).is_some_and(|c| PRINTF_CONVERSIONS.contains(c)) => (2, None),
            b'{' | b'}' | b'%' => {
                return Err(Error::MalformedTemplate {
                    template: template.to_string(),
                    position: i,
                })
            }
            _ => {
                i += 1;
                continue;
            }
        };

        out.push_str(&template[literal_start..i]);
        match replacement {
            Some(escaped) => out.push_str(escaped),
            None => {
                let value = args.get(next_arg).ok_or_else(|| Error::MissingArgument {
                    template: template.to_string(),
                    index: next_arg,
                })?;
                out.push_str(&value.render());
                next_arg += 1;
            }
        }
        i += skip;
        literal_start = i;
    }
    out.push_str(&template[literal_start..]);

    if next_arg != args.len() {
        return Err(Error::UnusedArguments {
            template: template.to_string(),
            used: next_arg,
            supplied: args.len(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggable::arg;

    #[test]
    fn test_printf_placeholder() {
        let out = render("user %s logged in", &[arg("alice")]).unwrap();
        assert_eq!(out, "user alice logged in");
    }

    #[test]
    fn test_brace_placeholders() {
        let out = render("Status: {}, Count: {}", &[arg(true), arg(42)]).unwrap();
        assert_eq!(out, "Status: true, Count: 42");
    }

    #[test]
    fn test_escapes() {
        let out = render("{{literal}} {} at 100%%", &[arg(7)]).unwrap();
        assert_eq!(out, "{literal} 7 at 100%");
    }

    #[test]
    fn test_no_args_is_verbatim() {
        assert_eq!(render("100% {weird}", &[]).unwrap(), "100% {weird}");
    }

    #[test]
    fn test_missing_argument() {
        let err = render("{} and {}", &[arg(1)]).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { index: 1, .. }));
    }

    #[test]
    fn test_unused_arguments() {
        let err = render("only {}", &[arg(1), arg(2)]).unwrap_err();
        assert!(matches!(err, Error::UnusedArguments { used: 1, supplied: 2, .. }));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            render("value={", &[arg(1)]),
            Err(Error::MalformedTemplate { position: 6, .. })
        ));
        assert!(matches!(
            render("rate %q {}", &[arg(1)]),
            Err(Error::MalformedTemplate { position: 5, .. })
        ));
    }

    #[test]
    fn test_unicode_literals() {
        let out = render("Hello, 世界 {} 🌍", &[arg("ok")]).unwrap();
        assert_eq!(out, "Hello, 世界 ok 🌍");
    }
}
