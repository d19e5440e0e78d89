use std::fmt;

use once_cell::sync::Lazy;

use crate::combinator::{
    any, delimited, empty, literal_rune, many0, marked, opt, peek, regex, sequence, tag,
    take_until, Failure, Node, NodeKind, Parser,
};

pub(crate) const BREAKING_PHRASE: &str = "BREAKING CHANGE";
pub(crate) const BREAKING_ARROW: &str = "BREAKING-CHANGE";

const WORD: &str = r"[\w-]+";

/// The grammar rules of a Conventional Commit message.
///
/// Nodes produced by the grammar carry these as [`NodeKind::Marked`] labels,
/// and [`crate::Error::expected`] reports them when a rule fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `"\n"` or `"\r\n"`.
    Newline,
    /// A line of text, without its terminator.
    Line,
    /// The commit type, e.g. `feat`.
    CommitType,
    /// The parenthesized scope, e.g. `(parser)`.
    Scope,
    /// The `!` after the type and scope.
    BreakingChangeBang,
    /// The type, scope and `!` together.
    Context,
    /// The text after `": "` in the header.
    Description,
    /// Free-form text between the header and the footers.
    Body,
    /// A `BREAKING CHANGE` or `BREAKING-CHANGE` footer token, with either
    /// separator.
    BreakingChange,
    /// Any other footer token, e.g. `Refs: ` or `Closes #`.
    FooterToken,
    /// A footer token followed by its value.
    Footer,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::Newline => "newline",
            Rule::Line => "line",
            Rule::CommitType => "commit type",
            Rule::Scope => "scope",
            Rule::BreakingChangeBang => "breaking change marker",
            Rule::Context => "type and scope",
            Rule::Description => "description",
            Rule::Body => "body",
            Rule::BreakingChange => "breaking change token",
            Rule::FooterToken => "footer token",
            Rule::Footer => "footer",
        })
    }
}

/// The grammar, built once.
struct Grammar {
    line: Parser<Rule>,
    context: Parser<Rule>,
    description: Parser<Rule>,
    body: Parser<Rule>,
    footers: Parser<Rule>,
    type_fragment: Parser<Rule>,
    scope_fragment: Parser<Rule>,
    token_fragment: Parser<Rule>,
}

impl Grammar {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            line: line(),
            context: context(),
            description: description(),
            body: body()?,
            footers: footers()?,
            type_fragment: lone_type(),
            scope_fragment: lone_scope(),
            token_fragment: lone_token()?,
        })
    }
}

static GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::new().expect("grammar patterns are valid regular expressions"));

type HeaderDetails<'a> = (&'a str, Option<&'a str>, bool, Option<&'a str>);

/// (verbatim text, token, separator, value)
type FooterDetails<'a> = (&'a str, &'a str, &'a str, &'a str);

type RestDetails<'a> = (&'a str, Vec<FooterDetails<'a>>);

/// Split off the first line, dropping its terminator.
pub(crate) fn split_first_line<'a>(
    i: &'a str,
) -> Result<(&'a str, &'a str), Failure<'a, Rule>> {
    let node = GRAMMAR.line.parse(i)?;
    let first = node.child(Rule::Line).map_or("", Node::value);
    Ok((first, node.remaining()))
}

/// Parse a header line into its type, scope, `!` and description.
///
/// A missing `": "` separator is not a failure; the description is `None`.
pub(crate) fn header<'a>(line: &'a str) -> Result<HeaderDetails<'a>, Failure<'a, Rule>> {
    let context = GRAMMAR.context.parse(line)?;

    let mut ty = "";
    let mut scope = None;
    let mut breaking = false;
    for child in context.children() {
        match child.label() {
            Some(Rule::CommitType) => ty = child.value(),
            Some(Rule::Scope) => scope = Some(child.value()),
            Some(Rule::BreakingChangeBang) => breaking = true,
            Some(
                Rule::Newline
                | Rule::Line
                | Rule::Context
                | Rule::Description
                | Rule::Body
                | Rule::BreakingChange
                | Rule::FooterToken
                | Rule::Footer,
            )
            | None => {}
        }
    }

    let description = GRAMMAR
        .description
        .parse(context.remaining())
        .ok()
        .and_then(|node| node.child(Rule::Description).map(Node::value));

    Ok((ty, scope, breaking, description))
}

/// Parse everything after the header: the body, then the footers.
///
/// Trailing whitespace must already be trimmed.
pub(crate) fn rest<'a>(i: &'a str) -> Result<RestDetails<'a>, Failure<'a, Rule>> {
    let body = GRAMMAR.body.parse(i)?;
    let text = body.child(Rule::Body).map_or("", Node::value);

    let entries = GRAMMAR.footers.parse(body.remaining())?;
    if !entries.remaining().is_empty() {
        return Err(Failure::new(
            entries.remaining(),
            NodeKind::Marked(Rule::Footer),
        ));
    }

    let mut footers = Vec::with_capacity(entries.children().len());
    for entry in entries.children() {
        let footer = entry
            .child(Rule::Footer)
            .ok_or_else(|| Failure::new(entry.value(), NodeKind::Marked(Rule::Footer)))?;
        let [token, value] = footer.children() else {
            return Err(Failure::new(footer.value(), NodeKind::Marked(Rule::Footer)));
        };
        let [key, separator] = token.children() else {
            return Err(Failure::new(token.value(), NodeKind::Marked(Rule::FooterToken)));
        };
        footers.push((footer.value(), key.value(), separator.value(), value.value()));
    }

    Ok((text, footers))
}

/// Validate a lone commit type, as entered into a composer.
pub(crate) fn type_fragment<'a>(i: &'a str) -> Result<&'a str, Failure<'a, Rule>> {
    fragment(&GRAMMAR.type_fragment, Rule::CommitType, i)
}

/// Validate a lone scope, without parentheses.
pub(crate) fn scope_fragment<'a>(i: &'a str) -> Result<&'a str, Failure<'a, Rule>> {
    fragment(&GRAMMAR.scope_fragment, Rule::Scope, i)
}

/// Validate a lone footer token, without separator.
pub(crate) fn token_fragment<'a>(i: &'a str) -> Result<&'a str, Failure<'a, Rule>> {
    fragment(&GRAMMAR.token_fragment, Rule::FooterToken, i)
}

fn fragment<'a>(
    parser: &Parser<Rule>,
    rule: Rule,
    i: &'a str,
) -> Result<&'a str, Failure<'a, Rule>> {
    let node = parser.parse(i)?;
    match node.child(rule).map(Node::value) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Failure::new(i, NodeKind::Marked(rule))),
    }
}

// <newline>         ::= "\n" | "\r\n"
fn newline() -> Parser<Rule> {
    marked(Rule::Newline, any([literal_rune('\n'), tag("\r\n")]))
}

// <line>            ::= <any chars except newline>*, [<newline>]
fn line() -> Parser<Rule> {
    sequence([
        marked(Rule::Line, take_until(any([newline(), empty()]))),
        opt(newline()),
    ])
}

// <type>            ::= <any chars up to "!" or ":" or "(">
fn commit_type() -> Parser<Rule> {
    marked(
        Rule::CommitType,
        take_until(any([breaking_change_bang(), tag(":"), tag("(")])),
    )
}

// <scope>           ::= "(", <any chars up to ")">, ")"
fn scope() -> Parser<Rule> {
    marked(
        Rule::Scope,
        delimited(tag("("), take_until(tag(")")), tag(")")),
    )
}

fn breaking_change_bang() -> Parser<Rule> {
    marked(Rule::BreakingChangeBang, tag("!"))
}

// <context>         ::= <type>, [<scope>], ["!"]
fn context() -> Parser<Rule> {
    marked(
        Rule::Context,
        sequence([commit_type(), opt(scope()), opt(breaking_change_bang())]),
    )
}

// <description>     ::= ": ", <any chars>*
fn description() -> Parser<Rule> {
    sequence([
        tag(": "),
        marked(Rule::Description, take_until(empty())),
    ])
}

// <separator>       ::= ": " | " #"
fn separator() -> Parser<Rule> {
    any([tag(": "), tag(" #")])
}

// <token>           ::= ("BREAKING CHANGE" | "BREAKING-CHANGE"), <separator>
//                    |  <word>, <separator>
fn footer_token() -> Result<Parser<Rule>, regex::Error> {
    Ok(any([
        marked(
            Rule::BreakingChange,
            sequence([any([tag(BREAKING_PHRASE), tag(BREAKING_ARROW)]), separator()]),
        ),
        marked(Rule::FooterToken, sequence([regex(WORD)?, separator()])),
    ]))
}

// /* Footers are only recognized at the start of a line */
// <body>            ::= <newline>+, &<token>
//                    |  <newline>+, <any chars up to end or <newline>+, <token>>
fn body() -> Result<Parser<Rule>, regex::Error> {
    let line_then_footer = sequence([newline(), many0(newline()), footer_token()?]);
    Ok(sequence([
        newline(),
        many0(newline()),
        marked(
            Rule::Body,
            any([
                peek(footer_token()?),
                take_until(any([empty(), line_then_footer])),
            ]),
        ),
    ]))
}

// <footer>          ::= <token>, <any chars up to end or <newline>+, <token>>
fn footer() -> Result<Parser<Rule>, regex::Error> {
    let line_then_footer = sequence([newline(), many0(newline()), footer_token()?]);
    Ok(marked(
        Rule::Footer,
        sequence([
            footer_token()?,
            take_until(any([empty(), line_then_footer])),
        ]),
    ))
}

// <footers>         ::= (<newline>*, <footer>)*
fn footers() -> Result<Parser<Rule>, regex::Error> {
    Ok(many0(sequence([many0(newline()), footer()?])))
}

// <type>, <end>
fn lone_type() -> Parser<Rule> {
    sequence([
        marked(
            Rule::CommitType,
            take_until(any([tag("!"), tag(":"), tag("("), newline(), empty()])),
        ),
        empty(),
    ])
}

// <any chars up to ")">, <end>
fn lone_scope() -> Parser<Rule> {
    sequence([
        marked(Rule::Scope, take_until(any([tag(")"), newline(), empty()]))),
        empty(),
    ])
}

fn lone_token() -> Result<Parser<Rule>, regex::Error> {
    Ok(sequence([
        marked(
            Rule::FooterToken,
            any([tag(BREAKING_PHRASE), tag(BREAKING_ARROW), regex(WORD)?]),
        ),
        empty(),
    ]))
}

#[cfg(test)]
#[allow(clippy::non_ascii_literal)]
mod tests {
    use super::*;

    fn value(p: &Parser<Rule>, i: &str) -> Option<(String, String)> {
        p.parse(i)
            .ok()
            .map(|node| (node.remaining().to_owned(), node.value().to_owned()))
    }

    fn pair(remaining: &str, value: &str) -> Option<(String, String)> {
        Some((remaining.to_owned(), value.to_owned()))
    }

    mod header {
        use super::*;

        #[test]
        fn test_type() {
            let p = commit_type();

            // valid
            assert_eq!(value(&p, "feat(parser): x"), pair("(parser): x", "feat"));
            assert_eq!(value(&p, "feat!: x"), pair("!: x", "feat"));
            assert_eq!(value(&p, "feat: x"), pair(": x", "feat"));
            assert_eq!(value(&p, "foo-bar: x"), pair(": x", "foo-bar"));
            assert_eq!(value(&p, "foo bar: x"), pair(": x", "foo bar"));
            assert_eq!(value(&p, ": x"), pair(": x", ""));
            assert_eq!(value(&p, "fête: x"), pair(": x", "fête"));

            // invalid
            assert_eq!(value(&p, ""), None);
            assert_eq!(value(&p, "Hello World"), None);
        }

        #[test]
        fn test_scope() {
            let p = scope();

            // valid
            assert_eq!(value(&p, "(core): x"), pair(": x", "core"));
            assert_eq!(value(&p, "(my scope)!: x"), pair("!: x", "my scope"));
            assert_eq!(value(&p, "(): x"), pair(": x", ""));

            // invalid
            assert_eq!(value(&p, "core): x"), None);
            assert_eq!(value(&p, "(core: x"), None);
            assert_eq!(value(&p, ": x"), None);

            let optional = opt(scope());
            assert_eq!(value(&optional, ": x"), pair(": x", ""));
        }

        #[test]
        fn test_context() {
            let p = context();

            let node = p.parse("feat(parser)!: x").unwrap();
            assert_eq!(node.label(), Some(Rule::Context));
            assert_eq!(node.value(), "feat(parser)!");
            assert_eq!(node.remaining(), ": x");
            let labels: Vec<_> = node.children().iter().map(Node::label).collect();
            assert_eq!(
                labels,
                [
                    Some(Rule::CommitType),
                    Some(Rule::Scope),
                    Some(Rule::BreakingChangeBang)
                ]
            );

            let node = p.parse("fix: x").unwrap();
            let kinds: Vec<_> = node.children().iter().map(Node::kind).collect();
            assert_eq!(
                kinds,
                [
                    NodeKind::Marked(Rule::CommitType),
                    NodeKind::Nothing,
                    NodeKind::Nothing
                ]
            );

            let err = p.parse("Hello World").unwrap_err();
            assert_eq!(err.expected(), NodeKind::Marked(Rule::Context));
        }

        #[test]
        fn test_header() {
            assert_eq!(header("foo: bar").unwrap(), ("foo", None, false, Some("bar")));
            assert_eq!(
                header("foo(bar): baz").unwrap(),
                ("foo", Some("bar"), false, Some("baz"))
            );
            assert_eq!(
                header("foo(bar-baz)!: qux").unwrap(),
                ("foo", Some("bar-baz"), true, Some("qux"))
            );
            assert_eq!(header("foo!: bar").unwrap(), ("foo", None, true, Some("bar")));
            assert_eq!(
                header("foo: bar (#1)").unwrap(),
                ("foo", None, false, Some("bar (#1)"))
            );
            assert_eq!(header("foo: ").unwrap(), ("foo", None, false, Some("")));

            // no separator
            assert_eq!(header("foo:bar").unwrap(), ("foo", None, false, None));
            assert_eq!(header("foo(bar)").unwrap(), ("foo", Some("bar"), false, None));
            assert_eq!(header("foo(bar: baz").unwrap(), ("foo", None, false, None));

            // no terminator for the type
            assert!(header("").is_err());
            assert!(header("foo").is_err());
            assert!(header("foo bar").is_err());
        }

        #[test]
        fn test_split_first_line() {
            assert_eq!(split_first_line("a: b").unwrap(), ("a: b", ""));
            assert_eq!(split_first_line("a: b\n\nc").unwrap(), ("a: b", "\nc"));
            assert_eq!(split_first_line("a: b\r\n\r\nc").unwrap(), ("a: b", "\r\nc"));
            assert_eq!(split_first_line("\nc").unwrap(), ("", "c"));
            assert_eq!(split_first_line("").unwrap(), ("", ""));
        }
    }

    mod rest {
        use super::*;

        #[test]
        fn test_footer_token() {
            let p = footer_token().unwrap();

            let node = p.parse("BREAKING CHANGE: x").unwrap();
            assert_eq!(node.label(), Some(Rule::BreakingChange));
            assert_eq!(node.value(), "BREAKING CHANGE: ");

            let node = p.parse("BREAKING-CHANGE: x").unwrap();
            assert_eq!(node.label(), Some(Rule::BreakingChange));

            let node = p.parse("BREAKING-CHANGE #12").unwrap();
            assert_eq!(node.label(), Some(Rule::BreakingChange));
            assert_eq!(node.remaining(), "12");

            let node = p.parse("Co-Authored-By: x").unwrap();
            assert_eq!(node.label(), Some(Rule::FooterToken));
            assert_eq!(node.value(), "Co-Authored-By: ");

            let node = p.parse("Closes #12").unwrap();
            assert_eq!(node.label(), Some(Rule::FooterToken));
            assert_eq!(node.remaining(), "12");

            // invalid
            assert!(p.parse("").is_err());
            assert!(p.parse("BREAKING CHANGE").is_err());
            assert!(p.parse("BREAKING CHANGE:x").is_err());
            assert!(p.parse("foo").is_err());
            assert!(p.parse("foo:").is_err());
            assert!(p.parse("foo #").is_ok());
            assert!(p.parse("two words: x").is_err());
            assert!(p.parse(" foo: x").is_err());
        }

        #[test]
        fn test_body() {
            fn text(i: &str) -> Option<&str> {
                body()
                    .unwrap()
                    .parse(i)
                    .ok()
                    .and_then(|node| node.child(Rule::Body).map(Node::value))
            }

            // valid
            assert_eq!(text("\nfoo"), Some("foo"));
            assert_eq!(text("\n\n\nfoo"), Some("foo"));
            assert_eq!(text("\r\nfoo"), Some("foo"));
            assert_eq!(text("\n    code block"), Some("    code block"));
            assert_eq!(text("\nüíÉüèΩ"), Some("üíÉüèΩ"));
            assert_eq!(text("\nfoo\nbar\n\nbaz"), Some("foo\nbar\n\nbaz"));
            assert_eq!(text("\nsee docs: here"), Some("see docs: here"));
            assert_eq!(text("\nfoo\nRefs: bar"), Some("foo"));
            assert_eq!(text("\nfoo\nBREAKING CHANGE: bar"), Some("foo"));
            assert_eq!(text("\nfoo\nBREAKING-CHANGE #12"), Some("foo"));
            assert_eq!(text("\nfoo\nbar baz: qux"), Some("foo\nbar baz: qux"));
            assert_eq!(text("\nfoo\n\nBREAKING CHANGE: oops!"), Some("foo"));
            assert_eq!(text("\nfoo\n\nBREAKING-CHANGE: bar"), Some("foo"));
            assert_eq!(text("\nfoo\n\nMy-Footer: bar"), Some("foo"));
            assert_eq!(text("\nfoo\r\n\r\nMy-Footer #bar"), Some("foo"));
            assert_eq!(text("\nBREAKING CHANGE: oops!"), Some(""));

            // invalid
            assert_eq!(text(""), None);
            assert_eq!(text("foo"), None);
        }

        #[test]
        fn test_footer() {
            let p = footer().unwrap();

            // valid
            assert_eq!(value(&p, "hello: world"), pair("", "hello: world"));
            assert_eq!(
                value(&p, "BREAKING CHANGE: woops!"),
                pair("", "BREAKING CHANGE: woops!")
            );
            assert_eq!(value(&p, "Closes #12"), pair("", "Closes #12"));
            assert_eq!(
                value(&p, "Refs: a\n  continued\nCloses #1"),
                pair("\nCloses #1", "Refs: a\n  continued")
            );
            assert_eq!(
                value(&p, "Refs: see note: below"),
                pair("", "Refs: see note: below")
            );

            // invalid
            assert_eq!(value(&p, ""), None);
            assert_eq!(value(&p, "foo"), None);
            assert_eq!(value(&p, "BREAKING CHANGE"), None);
        }

        #[test]
        fn test_footers() {
            let p = footers().unwrap();

            let node = p.parse("").unwrap();
            assert!(node.children().is_empty());

            let node = p.parse("not a footer").unwrap();
            assert!(node.children().is_empty());
            assert_eq!(node.remaining(), "not a footer");

            let node = p.parse("\n\nA: 1\nB #2\n\nC: 3").unwrap();
            assert_eq!(node.children().len(), 3);
            assert_eq!(node.remaining(), "");
        }

        #[test]
        fn test_rest() {
            assert_eq!(rest("\nfoo").unwrap(), ("foo", vec![]));
            assert_eq!(
                rest("\nBREAKING CHANGE: old API removed").unwrap(),
                (
                    "",
                    vec![(
                        "BREAKING CHANGE: old API removed",
                        "BREAKING CHANGE",
                        ": ",
                        "old API removed"
                    )]
                )
            );
            assert_eq!(
                rest("\nfoo\n\nbar\n\nRefs: 1\nCloses #2").unwrap(),
                (
                    "foo\n\nbar",
                    vec![
                        ("Refs: 1", "Refs", ": ", "1"),
                        ("Closes #2", "Closes", " #", "2")
                    ]
                )
            );

            let err = rest("foo").unwrap_err();
            assert_eq!(err.expected(), NodeKind::Marked(Rule::Newline));
        }
    }

    mod fragments {
        use super::*;

        #[test]
        fn test_type_fragment() {
            assert_eq!(type_fragment("feat").unwrap(), "feat");
            assert_eq!(type_fragment("fête").unwrap(), "fête");
            assert!(type_fragment("").is_err());
            assert!(type_fragment("feat!").is_err());
            assert!(type_fragment("feat:").is_err());
            assert!(type_fragment("feat(").is_err());
            assert!(type_fragment("feat\n").is_err());
        }

        #[test]
        fn test_scope_fragment() {
            assert_eq!(scope_fragment("core").unwrap(), "core");
            assert_eq!(scope_fragment("my scope").unwrap(), "my scope");
            assert!(scope_fragment("").is_err());
            assert!(scope_fragment("core)").is_err());
            assert!(scope_fragment("co\nre").is_err());
        }

        #[test]
        fn test_token_fragment() {
            assert_eq!(token_fragment("Refs").unwrap(), "Refs");
            assert_eq!(token_fragment("BREAKING CHANGE").unwrap(), "BREAKING CHANGE");
            assert!(token_fragment("").is_err());
            assert!(token_fragment("two words").is_err());
            assert!(token_fragment("Refs:").is_err());
        }
    }
}
