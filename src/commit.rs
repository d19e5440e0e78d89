//! The conventional commit, its header, and the rest of the message.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::parser::{self, BREAKING_ARROW, BREAKING_PHRASE};
use crate::{Error, ErrorKind};

/// A conventional commit.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit<'a> {
    ty: Type<'a>,
    scope: Option<Scope<'a>>,
    description: Option<&'a str>,
    body: Option<&'a str>,
    breaking: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    bang: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    breaking_description: Option<&'a str>,
    footers: Vec<Footer<'a>>,
}

impl<'a> Commit<'a> {
    /// Create a new Conventional Commit based on the provided commit message
    /// string.
    ///
    /// A header without the `": "` separator still parses; check
    /// [`Commit::description`] or [`Commit::is_ready`] before using it.
    ///
    /// # Errors
    ///
    /// This function returns an error if the first line is empty, if the
    /// header has no type, or if the text after the header is not a body
    /// followed by footers.
    pub fn parse(string: &'a str) -> Result<Self, Error> {
        log::trace!("parsing commit {string:?}");
        let (line, rest) = first_line(string)?;
        let header = Header::from_line(string, line)?;
        let rest = Rest::from_remainder(string, rest)?;
        Ok(Self::new(header, rest))
    }

    fn new(header: Header<'a>, rest: Rest<'a>) -> Self {
        let breaking_description = rest
            .footers
            .iter()
            .find(|footer| footer.breaking())
            .map(Footer::value)
            .or(if header.breaking {
                header.description
            } else {
                None
            });

        Self {
            ty: header.ty,
            scope: header.scope,
            description: header.description,
            body: rest.body,
            breaking: header.breaking || rest.breaking,
            bang: header.breaking,
            breaking_description,
            footers: rest.footers,
        }
    }

    /// The type of the commit.
    pub fn type_(&self) -> Type<'a> {
        self.ty
    }

    /// The optional scope of the commit.
    pub fn scope(&self) -> Option<Scope<'a>> {
        self.scope
    }

    /// The commit description, `None` when the header has no `": "`.
    pub fn description(&self) -> Option<&'a str> {
        self.description
    }

    /// The commit body, containing a more detailed explanation of the commit
    /// changes.
    pub fn body(&self) -> Option<&'a str> {
        self.body
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set either when the commit has an exclamation mark after
    /// the message type and scope, e.g.:
    /// ```text
    /// feat(scope)!: this is a breaking change
    /// ```
    ///
    /// Or when the `BREAKING CHANGE: ` footer is defined:
    /// ```text
    /// feat: my commit description
    ///
    /// BREAKING CHANGE: this is a breaking change
    /// ```
    pub fn breaking(&self) -> bool {
        self.breaking
    }

    /// Explanation for the breaking change.
    ///
    /// Note: if no `BREAKING CHANGE` footer is provided, the `description` is expected to describe
    /// the breaking change.
    pub fn breaking_description(&self) -> Option<&'a str> {
        self.breaking_description
    }

    /// Any footer.
    ///
    /// A footer is similar to a Git trailer, with the exception of not
    /// requiring whitespace before newlines.
    ///
    /// See: <https://git-scm.com/docs/git-interpret-trailers>
    pub fn footers(&self) -> &[Footer<'a>] {
        &self.footers
    }

    /// Whether the commit has both a type and a non-empty description.
    pub fn is_ready(&self) -> bool {
        !self.ty.is_empty() && self.description.is_some_and(|d| !d.is_empty())
    }
}

impl fmt::Display for Commit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_().as_str())?;

        if let Some(scope) = &self.scope() {
            write!(f, "({scope})")?;
        }

        if self.bang {
            f.write_str("!")?;
        }

        if let Some(description) = self.description() {
            write!(f, ": {description}")?;
        }

        if let Some(body) = self.body() {
            write!(f, "\n\n{body}")?;
        }

        for (i, footer) in self.footers().iter().enumerate() {
            let gap = if i == 0 { "\n\n" } else { "\n" };
            write!(f, "{gap}{footer}")?;
        }

        Ok(())
    }
}

/// The first line of a commit: type, scope, `!` and description.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header<'a> {
    ty: Type<'a>,
    scope: Option<Scope<'a>>,
    description: Option<&'a str>,
    breaking: bool,
}

impl<'a> Header<'a> {
    /// Parse the first line of `string` as a commit header.
    ///
    /// Anything after the first line is ignored.
    ///
    /// # Errors
    ///
    /// This function returns an error if the first line is empty or has no
    /// type.
    pub fn parse(string: &'a str) -> Result<Self, Error> {
        let (line, _) = first_line(string)?;
        Self::from_line(string, line)
    }

    fn from_line(commit: &str, line: &'a str) -> Result<Self, Error> {
        let (ty, scope, breaking, description) = parser::header(line).map_err(|err| {
            let err = Error::with_failure(ErrorKind::HeaderSyntax, commit, err);
            log::debug!("rejected commit header: {err}");
            err
        })?;
        if description.is_none() {
            log::debug!("commit header {line:?} has no description");
        }

        Ok(Self {
            ty: Type::new_unchecked(ty),
            scope: scope.filter(|s| !s.is_empty()).map(Scope::new_unchecked),
            description,
            breaking,
        })
    }

    /// The type of the commit.
    pub fn type_(&self) -> Type<'a> {
        self.ty
    }

    /// The optional scope of the commit.
    pub fn scope(&self) -> Option<Scope<'a>> {
        self.scope
    }

    /// The text after `": "`, `None` when the separator is missing.
    pub fn description(&self) -> Option<&'a str> {
        self.description
    }

    /// Whether the header carries the `!` marker.
    pub fn breaking(&self) -> bool {
        self.breaking
    }
}

/// Everything after the header: the body and the footers.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rest<'a> {
    body: Option<&'a str>,
    footers: Vec<Footer<'a>>,
    breaking: bool,
}

impl<'a> Rest<'a> {
    /// Parse the text that follows the header line.
    ///
    /// Trailing whitespace is ignored. Otherwise the text must start with a
    /// newline, i.e. leave a blank line after the header.
    ///
    /// # Errors
    ///
    /// This function returns an error if the text is not a body followed by
    /// footers.
    pub fn parse(string: &'a str) -> Result<Self, Error> {
        Self::from_remainder(string, string)
    }

    fn from_remainder(commit: &str, rest: &'a str) -> Result<Self, Error> {
        let rest = rest.trim_end_matches(['\n', '\r', '\t', ' ']);
        if rest.is_empty() {
            return Ok(Self::default());
        }

        let (body, footers) = parser::rest(rest).map_err(|err| {
            let err = Error::with_failure(ErrorKind::BodySyntax, commit, err);
            log::debug!("rejected commit body: {err}");
            err
        })?;
        let footers = footers
            .into_iter()
            .map(|(text, token, sep, value)| {
                Ok(Footer {
                    text,
                    token: FooterToken::new_unchecked(token),
                    sep: sep.parse()?,
                    value,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let breaking = footers.iter().any(Footer::breaking);

        Ok(Self {
            body: (!body.is_empty()).then_some(body),
            footers,
            breaking,
        })
    }

    /// The commit body.
    pub fn body(&self) -> Option<&'a str> {
        self.body
    }

    /// The footers, in order.
    pub fn footers(&self) -> &[Footer<'a>] {
        &self.footers
    }

    /// Whether any footer is a `BREAKING CHANGE` footer.
    pub fn breaking(&self) -> bool {
        self.breaking
    }
}

fn first_line(string: &str) -> Result<(&str, &str), Error> {
    let (line, rest) = parser::split_first_line(string)
        .map_err(|err| Error::with_failure(ErrorKind::EmptyCommit, string, err))?;
    if line.is_empty() {
        return Err(Error::new(ErrorKind::EmptyCommit).set_commit(string));
    }
    Ok((line, rest))
}

/// A single footer.
///
/// A footer is similar to a Git trailer, with the exception of not requiring
/// whitespace before newlines.
///
/// See: <https://git-scm.com/docs/git-interpret-trailers>
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Footer<'a> {
    #[cfg_attr(feature = "serde", serde(skip))]
    text: &'a str,
    token: FooterToken<'a>,
    sep: FooterSeparator,
    value: &'a str,
}

impl<'a> Footer<'a> {
    /// The footer exactly as written, token included.
    pub const fn as_str(&self) -> &'a str {
        self.text
    }

    /// The token of the footer.
    pub const fn token(&self) -> FooterToken<'a> {
        self.token
    }

    /// The separator between the footer token and its value.
    pub const fn separator(&self) -> FooterSeparator {
        self.sep
    }

    /// The value of the footer.
    pub const fn value(&self) -> &'a str {
        self.value
    }

    /// A flag to signal that the footer describes a breaking change.
    pub fn breaking(&self) -> bool {
        self.token.breaking()
    }
}

impl fmt::Display for Footer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// The type of separator between the footer token and value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum FooterSeparator {
    /// ": "
    Value,

    /// " #"
    Ref,
}

impl FooterSeparator {
    /// Access `str` representation of FooterSeparator
    pub fn as_str(self) -> &'static str {
        match self {
            FooterSeparator::Value => ": ",
            FooterSeparator::Ref => " #",
        }
    }
}

impl Deref for FooterSeparator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl PartialEq<&'_ str> for FooterSeparator {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for FooterSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl FromStr for FooterSeparator {
    type Err = Error;

    fn from_str(sep: &str) -> Result<Self, Self::Err> {
        match sep {
            ": " => Ok(FooterSeparator::Value),
            " #" => Ok(FooterSeparator::Ref),
            _ => Err(Error::new(ErrorKind::BodySyntax).set_commit(sep)),
        }
    }
}

macro_rules! unicase_components {
    ($($ty:ident),+) => (
        $(
            /// A component of the conventional commit.
            ///
            /// Comparisons ignore case.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $ty<'a>(unicase::UniCase<&'a str>);

            impl<'a> $ty<'a> {
                /// See `parse` for ensuring the data is valid.
                pub const fn new_unchecked(value: &'a str) -> Self {
                    $ty(unicase::UniCase::unicode(value))
                }

                /// Access `str` representation
                pub fn as_str(&self) -> &'a str {
                    self.0.into_inner()
                }
            }

            impl Deref for $ty<'_> {
                type Target = str;

                fn deref(&self) -> &Self::Target {
                    self.as_str()
                }
            }

            impl PartialEq<&'_ str> for $ty<'_> {
                fn eq(&self, other: &&str) -> bool {
                    *self == $ty::new_unchecked(*other)
                }
            }

            impl fmt::Display for $ty<'_> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            #[cfg(feature = "serde")]
            impl serde::Serialize for $ty<'_> {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(self)
                }
            }
        )+
    )
}

unicase_components![Type, Scope, FooterToken];

impl<'a> Type<'a> {
    /// Parse a `str` into a `Type`.
    ///
    /// # Errors
    ///
    /// The type must be non-empty and free of `!`, `:`, `(` and newlines.
    pub fn parse(sep: &'a str) -> Result<Self, Error> {
        parser::type_fragment(sep)
            .map(Type::new_unchecked)
            .map_err(|err| Error::with_failure(ErrorKind::HeaderSyntax, sep, err))
    }
}

/// Common commit types
impl Type<'static> {
    /// Commit type when introducing new features (correlates with `minor` in semver)
    pub const FEAT: Type<'static> = Type::new_unchecked("feat");
    /// Commit type when patching a bug (correlates with `patch` in semver)
    pub const FIX: Type<'static> = Type::new_unchecked("fix");
    /// Possible commit type when reverting changes.
    pub const REVERT: Type<'static> = Type::new_unchecked("revert");
    /// Possible commit type for changing documentation.
    pub const DOCS: Type<'static> = Type::new_unchecked("docs");
    /// Possible commit type for changing code style.
    pub const STYLE: Type<'static> = Type::new_unchecked("style");
    /// Possible commit type for refactoring code structure.
    pub const REFACTOR: Type<'static> = Type::new_unchecked("refactor");
    /// Possible commit type for performance optimizations.
    pub const PERF: Type<'static> = Type::new_unchecked("perf");
    /// Possible commit type for addressing tests.
    pub const TEST: Type<'static> = Type::new_unchecked("test");
    /// Possible commit type for changes to the build system or dependencies.
    pub const BUILD: Type<'static> = Type::new_unchecked("build");
    /// Possible commit type for changes to continuous integration.
    pub const CI: Type<'static> = Type::new_unchecked("ci");
    /// Possible commit type for other things.
    pub const CHORE: Type<'static> = Type::new_unchecked("chore");
}

impl<'a> Scope<'a> {
    /// Parse a `str` into a `Scope`.
    ///
    /// # Errors
    ///
    /// The scope must be non-empty and free of `)` and newlines.
    pub fn parse(sep: &'a str) -> Result<Self, Error> {
        parser::scope_fragment(sep)
            .map(Scope::new_unchecked)
            .map_err(|err| Error::with_failure(ErrorKind::HeaderSyntax, sep, err))
    }
}

impl<'a> FooterToken<'a> {
    /// Parse a `str` into a `FooterToken`.
    ///
    /// # Errors
    ///
    /// The token must be `BREAKING CHANGE` or a word of letters, digits, `_`
    /// and `-`.
    pub fn parse(sep: &'a str) -> Result<Self, Error> {
        parser::token_fragment(sep)
            .map(FooterToken::new_unchecked)
            .map_err(|err| Error::with_failure(ErrorKind::BodySyntax, sep, err))
    }

    /// A flag to signal that the footer describes a breaking change.
    ///
    /// Unlike other tokens, the breaking change tokens are case-sensitive.
    /// Both separators are accepted after them.
    pub fn breaking(&self) -> bool {
        self.as_str() == BREAKING_PHRASE || self.as_str() == BREAKING_ARROW
    }
}
