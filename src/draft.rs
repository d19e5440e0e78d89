//! Writing conventional commit messages.

use std::fmt;

use crate::parser::BREAKING_PHRASE;
use crate::{Commit, Footer};

/// A commit message to be written: the header, plus an optional
/// `BREAKING CHANGE` footer.
///
/// ```rust
/// use git_cc::Draft;
///
/// let message = Draft::new("feat", "support scopes")
///     .scope("parser")
///     .breaking_change("old API removed")
///     .to_string();
///
/// assert_eq!(
///     message,
///     "feat(parser)!: support scopes\n\nBREAKING CHANGE: old API removed\n"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Draft<'a> {
    ty: &'a str,
    scope: Option<&'a str>,
    breaking: bool,
    description: Option<&'a str>,
    breaking_change: Option<&'a str>,
}

impl<'a> Draft<'a> {
    /// Start a message with a type and a description.
    pub const fn new(ty: &'a str, description: &'a str) -> Self {
        Self {
            ty,
            scope: None,
            breaking: false,
            description: Some(description),
            breaking_change: None,
        }
    }

    /// Set the scope; an empty scope is left out.
    pub fn scope(mut self, scope: &'a str) -> Self {
        self.scope = (!scope.is_empty()).then_some(scope);
        self
    }

    /// Mark the header with `!`.
    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    /// Explain a breaking change in a footer, which also marks the header with
    /// `!`. Empty text is ignored.
    pub fn breaking_change(mut self, text: &'a str) -> Self {
        if !text.is_empty() {
            self.breaking = true;
            self.breaking_change = Some(text);
        }
        self
    }

    /// The header line, without a line ending.
    pub fn header(&self) -> String {
        HeaderLine(self).to_string()
    }
}

impl fmt::Display for Draft<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HeaderLine(self))?;
        if let Some(text) = self.breaking_change {
            writeln!(f)?;
            writeln!(f, "{BREAKING_PHRASE}: {text}")?;
        }
        Ok(())
    }
}

/// A commit without a description gives a header without `": "`.
impl<'a> From<&Commit<'a>> for Draft<'a> {
    fn from(commit: &Commit<'a>) -> Self {
        let mut draft = Draft::new(commit.type_().as_str(), "").breaking(commit.breaking());
        draft.description = commit.description();
        if let Some(scope) = commit.scope() {
            draft = draft.scope(scope.as_str());
        }
        if let Some(text) = commit
            .footers()
            .iter()
            .find(|footer| footer.breaking())
            .map(Footer::value)
        {
            draft = draft.breaking_change(text);
        }
        draft
    }
}

struct HeaderLine<'d, 'a>(&'d Draft<'a>);

impl fmt::Display for HeaderLine<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let draft = self.0;
        f.write_str(draft.ty)?;
        if let Some(scope) = draft.scope {
            write!(f, "({scope})")?;
        }
        if draft.breaking {
            f.write_str("!")?;
        }
        match draft.description {
            Some(description) => write!(f, ": {description}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Header;
    use proptest::prelude::*;

    #[test]
    fn test_header_only() {
        assert_eq!(Draft::new("fix", "bug").to_string(), "fix: bug\n");
        assert_eq!(
            Draft::new("fix", "bug").scope("core").to_string(),
            "fix(core): bug\n"
        );
        assert_eq!(
            Draft::new("fix", "bug").scope("").breaking(true).to_string(),
            "fix!: bug\n"
        );
        assert_eq!(
            Draft::new("fix", "bug").scope("core").breaking(true).header(),
            "fix(core)!: bug"
        );
    }

    #[test]
    fn test_breaking_change_footer() {
        let draft = Draft::new("feat", "drop v1").breaking_change("v1 endpoints are gone");
        assert_eq!(
            draft.to_string(),
            "feat!: drop v1\n\nBREAKING CHANGE: v1 endpoints are gone\n"
        );

        let draft = Draft::new("feat", "keep v1").breaking_change("");
        assert_eq!(draft.to_string(), "feat: keep v1\n");
    }

    #[test]
    fn test_from_commit() {
        let commit = Commit::parse(
            "feat(api): drop v1\n\nSome context.\n\nBREAKING CHANGE: v1 is gone\nRefs #3",
        )
        .unwrap();

        let draft = Draft::from(&commit);
        assert_eq!(
            draft.to_string(),
            "feat(api)!: drop v1\n\nBREAKING CHANGE: v1 is gone\n"
        );

        let reparsed = Commit::parse(&draft.to_string()).unwrap().to_string();
        let expected = "feat(api)!: drop v1\n\nBREAKING CHANGE: v1 is gone";
        assert_eq!(reparsed, expected);
    }

    #[test]
    fn test_from_commit_without_description() {
        let commit = Commit::parse("feat(core)").unwrap();

        let draft = Draft::from(&commit);
        assert_eq!(draft.header(), "feat(core)");

        let rendered = draft.to_string();
        let reparsed = Commit::parse(&rendered).unwrap();
        assert_eq!(reparsed.description(), None);
        assert!(!reparsed.is_ready());

        let commit = Commit::parse("feat: ").unwrap();
        assert_eq!(Draft::from(&commit).header(), "feat: ");
    }

    proptest! {
        #[test]
        fn header_round_trip(
            ty in r"[^!:(\r\n]{1,12}",
            scope in r"[^)\r\n]{0,12}",
            breaking in any::<bool>(),
            description in r"[^\r\n]{0,40}",
        ) {
            let message = Draft::new(&ty, &description)
                .scope(&scope)
                .breaking(breaking)
                .to_string();

            let header = Header::parse(&message).unwrap();
            prop_assert_eq!(header.type_().as_str(), ty.as_str());
            prop_assert_eq!(
                header.scope().map(|scope| scope.as_str()),
                (!scope.is_empty()).then_some(scope.as_str())
            );
            prop_assert_eq!(header.breaking(), breaking);
            prop_assert_eq!(header.description(), Some(description.as_str()));
        }
    }
}
