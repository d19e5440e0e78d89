//! Backtracking parser combinators over `&str`.
//!
//! A [`Parser`] is a pure function from an input slice to either a [`Node`]
//! holding the consumed text and the unconsumed remainder, or a [`Failure`].
//! Nothing is ever consumed on failure, so any parser can be retried against
//! the same input by [`any`], [`opt`] or [`many0`].
//!
//! Parsers step through their input one `char` at a time, never one byte at a
//! time, so multi-byte characters are never split. Every [`Node::value`] is a
//! borrowed slice of the input at the position where the match started.
//!
//! Nodes are anonymous unless wrapped in [`marked`], which tags them with a
//! caller-chosen label `L`:
//!
//! ```rust
//! use git_cc::combinator::{marked, sequence, tag, take_until, Parser};
//!
//! let key: Parser<&str> = marked("key", take_until(tag("=")));
//! let pair = sequence([key, tag("=")]);
//!
//! let node = pair.parse("name=value").unwrap();
//! assert_eq!(node.value(), "name=");
//! assert_eq!(node.child("key").unwrap().value(), "name");
//! assert_eq!(node.remaining(), "value");
//! ```

use std::fmt;

use regex::Regex;

/// The outcome of running a [`Parser`].
pub type PResult<'i, L> = Result<Node<'i, L>, Failure<'i, L>>;

/// What produced a [`Node`], or what a [`Failure`] expected to find.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind<L> {
    /// A single character, see [`literal_rune`].
    Char(char),
    /// A literal prefix, see [`tag`].
    Tag(&'static str),
    /// A regular expression, see [`regex`].
    Pattern(&'static str),
    /// The end of input, see [`empty`].
    End,
    /// A run of parsers, see [`sequence`].
    Sequence,
    /// An absent optional match, see [`opt`].
    Nothing,
    /// A repetition, see [`many0`].
    Many,
    /// The text before a terminator, see [`take_until`].
    Until,
    /// A zero-width lookahead, see [`peek`].
    Lookahead,
    /// A node relabeled by [`marked`].
    Marked(L),
}

impl<L: fmt::Display> fmt::Display for NodeKind<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Char(c) => write!(f, "{c:?}"),
            NodeKind::Tag(tag) => write!(f, "{tag:?}"),
            NodeKind::Pattern(pattern) => write!(f, "/{pattern}/"),
            NodeKind::End => f.write_str("end of input"),
            NodeKind::Sequence => f.write_str("sequence"),
            NodeKind::Nothing => f.write_str("nothing"),
            NodeKind::Many => f.write_str("repetition"),
            NodeKind::Until => f.write_str("terminator"),
            NodeKind::Lookahead => f.write_str("lookahead"),
            NodeKind::Marked(label) => label.fmt(f),
        }
    }
}

/// A successful match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<'i, L> {
    kind: NodeKind<L>,
    value: &'i str,
    children: Vec<Node<'i, L>>,
    remaining: &'i str,
}

impl<'i, L: Copy> Node<'i, L> {
    fn leaf(kind: NodeKind<L>, input: &'i str, remaining: &'i str) -> Self {
        Self::branch(kind, input, remaining, Vec::new())
    }

    fn branch(
        kind: NodeKind<L>,
        input: &'i str,
        remaining: &'i str,
        children: Vec<Node<'i, L>>,
    ) -> Self {
        debug_assert!(input.ends_with(remaining), "{remaining:?} is not a suffix");
        Self {
            kind,
            value: &input[..input.len() - remaining.len()],
            children,
            remaining,
        }
    }

    /// What produced this node.
    pub fn kind(&self) -> NodeKind<L> {
        self.kind
    }

    /// The label given by [`marked`], if any.
    pub fn label(&self) -> Option<L> {
        match self.kind {
            NodeKind::Marked(label) => Some(label),
            _ => None,
        }
    }

    /// The consumed text.
    pub fn value(&self) -> &'i str {
        self.value
    }

    /// Sub-matches of a composite parser, in input order.
    pub fn children(&self) -> &[Node<'i, L>] {
        &self.children
    }

    /// The input left after this match.
    pub fn remaining(&self) -> &'i str {
        self.remaining
    }

    /// The first direct child carrying `label`.
    pub fn child(&self, label: L) -> Option<&Node<'i, L>>
    where
        L: PartialEq,
    {
        self.children
            .iter()
            .find(|child| child.label() == Some(label))
    }
}

/// A failed match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Failure<'i, L> {
    at: &'i str,
    expected: NodeKind<L>,
}

impl<'i, L: Copy> Failure<'i, L> {
    /// Report that `expected` could not be matched at the start of `at`.
    pub fn new(at: &'i str, expected: NodeKind<L>) -> Self {
        Self { at, expected }
    }

    /// The input at the point of failure.
    pub fn at(&self) -> &'i str {
        self.at
    }

    /// The rule that could not be matched.
    pub fn expected(&self) -> NodeKind<L> {
        self.expected
    }

    /// Character offset of the failure within `input`.
    ///
    /// `input` must be the text (or a slice of the text) the failing parser
    /// was run against; otherwise the offset is meaningless.
    pub fn position(&self, input: &str) -> usize {
        let start = input.as_ptr() as usize;
        let offset = (self.at.as_ptr() as usize)
            .saturating_sub(start)
            .min(input.len());
        input
            .get(..offset)
            .map_or(0, |consumed| consumed.chars().count())
    }
}

/// A composable parser producing nodes labeled with `L`.
///
/// Build parsers with the free functions of this module.
#[derive(Clone, Debug)]
pub struct Parser<L>(Combinator<L>);

#[derive(Clone, Debug)]
enum Combinator<L> {
    LiteralRune(char),
    Tag(&'static str),
    Regex(&'static str, Regex),
    Empty,
    Sequence(Vec<Parser<L>>),
    Any(Vec<Parser<L>>),
    Opt(Box<Parser<L>>),
    Many0(Box<Parser<L>>),
    TakeUntil(Box<Parser<L>>),
    Delimited(Box<[Parser<L>; 3]>),
    Marked(L, Box<Parser<L>>),
    Peek(Box<Parser<L>>),
}

impl<L: Copy> Parser<L> {
    /// Run the parser against the start of `input`.
    pub fn parse<'i>(&self, input: &'i str) -> PResult<'i, L> {
        match &self.0 {
            Combinator::LiteralRune(expected) => {
                let mut chars = input.chars();
                match chars.next() {
                    Some(c) if c == *expected => {
                        Ok(Node::leaf(NodeKind::Char(c), input, chars.as_str()))
                    }
                    _ => Err(Failure::new(input, NodeKind::Char(*expected))),
                }
            }
            Combinator::Tag(tag) => match input.strip_prefix(*tag) {
                Some(rest) => Ok(Node::leaf(NodeKind::Tag(*tag), input, rest)),
                None => Err(Failure::new(input, NodeKind::Tag(*tag))),
            },
            Combinator::Regex(pattern, re) => match re.find(input) {
                Some(m) if m.start() == 0 => Ok(Node::leaf(
                    NodeKind::Pattern(*pattern),
                    input,
                    &input[m.end()..],
                )),
                _ => Err(Failure::new(input, NodeKind::Pattern(*pattern))),
            },
            Combinator::Empty => {
                if input.is_empty() {
                    Ok(Node::leaf(NodeKind::End, input, input))
                } else {
                    Err(Failure::new(input, NodeKind::End))
                }
            }
            Combinator::Sequence(parsers) => {
                let mut rest = input;
                let mut children = Vec::with_capacity(parsers.len());
                for parser in parsers {
                    let child = parser.parse(rest)?;
                    rest = child.remaining;
                    children.push(child);
                }
                Ok(Node::branch(NodeKind::Sequence, input, rest, children))
            }
            Combinator::Any(parsers) => {
                let mut furthest: Option<Failure<'i, L>> = None;
                for parser in parsers {
                    match parser.parse(input) {
                        Ok(node) => return Ok(node),
                        Err(failure) => {
                            furthest = match furthest {
                                Some(prior) if prior.at.len() < failure.at.len() => Some(prior),
                                _ => Some(failure),
                            };
                        }
                    }
                }
                Err(furthest.unwrap_or_else(|| Failure::new(input, NodeKind::Nothing)))
            }
            Combinator::Opt(parser) => Ok(parser
                .parse(input)
                .unwrap_or_else(|_| Node::leaf(NodeKind::Nothing, input, input))),
            Combinator::Many0(parser) => {
                let mut rest = input;
                let mut children = Vec::new();
                while let Ok(child) = parser.parse(rest) {
                    // A zero-width success would repeat forever.
                    if child.remaining.len() == rest.len() {
                        break;
                    }
                    rest = child.remaining;
                    children.push(child);
                }
                Ok(Node::branch(NodeKind::Many, input, rest, children))
            }
            Combinator::TakeUntil(stop) => {
                let mut rest = input;
                loop {
                    if stop.parse(rest).is_ok() {
                        return Ok(Node::leaf(NodeKind::Until, input, rest));
                    }
                    let mut chars = rest.chars();
                    if chars.next().is_none() {
                        return Err(Failure::new(rest, NodeKind::Until));
                    }
                    rest = chars.as_str();
                }
            }
            Combinator::Delimited(parts) => {
                let [open, inner, close] = &**parts;
                let open = open.parse(input)?;
                let inner = inner.parse(open.remaining)?;
                let close = close.parse(inner.remaining)?;
                Ok(Node {
                    remaining: close.remaining,
                    ..inner
                })
            }
            Combinator::Marked(label, parser) => parser
                .parse(input)
                .map(|node| Node {
                    kind: NodeKind::Marked(*label),
                    ..node
                })
                .map_err(|failure| Failure {
                    expected: NodeKind::Marked(*label),
                    ..failure
                }),
            Combinator::Peek(parser) => {
                let node = parser.parse(input)?;
                Ok(Node::branch(NodeKind::Lookahead, input, input, vec![node]))
            }
        }
    }
}

/// Match exactly one `c`.
pub fn literal_rune<L>(c: char) -> Parser<L> {
    Parser(Combinator::LiteralRune(c))
}

/// Match the literal prefix `s`.
pub fn tag<L>(s: &'static str) -> Parser<L> {
    Parser(Combinator::Tag(s))
}

/// Match `pattern` anchored at the start of the input.
///
/// Alternations follow the `regex` crate's leftmost-first semantics; for
/// greedy patterns without alternation this is the longest matching prefix.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn regex<L>(pattern: &'static str) -> Result<Parser<L>, regex::Error> {
    let re = Regex::new(&format!(r"\A(?:{pattern})"))?;
    Ok(Parser(Combinator::Regex(pattern, re)))
}

/// Match the end of input without consuming anything.
pub fn empty<L>() -> Parser<L> {
    Parser(Combinator::Empty)
}

/// Match each parser in turn, each one starting where the previous stopped.
pub fn sequence<L>(parsers: impl IntoIterator<Item = Parser<L>>) -> Parser<L> {
    Parser(Combinator::Sequence(parsers.into_iter().collect()))
}

/// Ordered choice: the first alternative to succeed wins.
///
/// When every alternative fails, the failure that got furthest into the input
/// is reported.
pub fn any<L>(parsers: impl IntoIterator<Item = Parser<L>>) -> Parser<L> {
    Parser(Combinator::Any(parsers.into_iter().collect()))
}

/// Match `parser` if possible, otherwise succeed without consuming anything.
pub fn opt<L>(parser: Parser<L>) -> Parser<L> {
    Parser(Combinator::Opt(Box::new(parser)))
}

/// Match `parser` as many times as possible, including zero.
pub fn many0<L>(parser: Parser<L>) -> Parser<L> {
    Parser(Combinator::Many0(Box::new(parser)))
}

/// Consume characters up to, but not including, the first position where
/// `stop` matches.
///
/// `stop` is only peeked at. It is also tried at the end of input, so include
/// [`empty`] among its alternatives when the end of input is an acceptable
/// terminator; otherwise running out of input is a failure.
pub fn take_until<L>(stop: Parser<L>) -> Parser<L> {
    Parser(Combinator::TakeUntil(Box::new(stop)))
}

/// Match `open`, `inner` and `close`, keeping only `inner`'s node.
pub fn delimited<L>(open: Parser<L>, inner: Parser<L>, close: Parser<L>) -> Parser<L> {
    Parser(Combinator::Delimited(Box::new([open, inner, close])))
}

/// Label whatever `parser` produces (or fails to produce) with `label`.
pub fn marked<L>(label: L, parser: Parser<L>) -> Parser<L> {
    Parser(Combinator::Marked(label, Box::new(parser)))
}

/// Succeed without consuming anything if `parser` would match.
pub fn peek<L>(parser: Parser<L>) -> Parser<L> {
    Parser(Combinator::Peek(Box::new(parser)))
}
