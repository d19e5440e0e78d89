//! A parser and writer for [Conventional Commit] messages, built on a small
//! set of backtracking parser combinators.
//!
//! [conventional commit]: https://www.conventionalcommits.org
//!
//! # Example
//!
//! ```rust
//! use indoc::indoc;
//!
//! let message = indoc!("
//!     docs(example)!: add tested usage example
//!
//!     This example is tested using Rust's doctest capabilities. Having this
//!     example helps people understand how to use the parser.
//!
//!     BREAKING CHANGE: Going from nothing to something, meaning anyone doing
//!     nothing before suddenly has something to do. That sounds like a change
//!     in your break.
//!
//!     Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>
//!     Closes #12
//! ");
//!
//! let commit = git_cc::Commit::parse(message).unwrap();
//!
//! // You can access all components of the header.
//! assert_eq!(commit.type_(), git_cc::DOCS);
//! assert_eq!(commit.scope().unwrap(), "example");
//! assert_eq!(commit.description(), Some("add tested usage example"));
//!
//! // And the free-form commit body.
//! assert!(commit.body().unwrap().contains("helps people understand"));
//!
//! // If a commit is marked with a bang (`!`) OR has a footer with the key
//! // "BREAKING CHANGE", it is considered a "breaking" commit.
//! assert!(commit.breaking());
//!
//! // You can access each footer individually.
//! assert!(commit.footers()[0].value().contains("That sounds like a change"));
//!
//! // Footers provide access to their token and value.
//! assert_eq!(commit.footers()[1].token(), "Co-Authored-By");
//! assert_eq!(commit.footers()[1].value(), "Lisa Simpson <lisa@simpsons.fam>");
//!
//! // Two types of separators are supported, regular ": ", and " #":
//! assert_eq!(commit.footers()[2].separator(), " #");
//! assert_eq!(commit.footers()[2].value(), "12");
//! assert_eq!(commit.footers()[2].as_str(), "Closes #12");
//!
//! // Headers can be written back out.
//! let draft = git_cc::Draft::from(&commit);
//! assert_eq!(draft.header(), "docs(example)!: add tested usage example");
//! ```

#![warn(missing_docs)]

pub mod combinator;
mod commit;
mod draft;
mod error;
mod parser;

pub use commit::{Commit, Footer, FooterSeparator, FooterToken, Header, Rest, Scope, Type};
pub use draft::Draft;
pub use error::{Error, ErrorKind};
pub use parser::Rule;

/// Commit type when introducing new features (correlates with `minor` in semver)
pub const FEAT: Type<'static> = Type::FEAT;
/// Commit type when patching a bug (correlates with `patch` in semver)
pub const FIX: Type<'static> = Type::FIX;
/// Possible commit type when reverting changes.
pub const REVERT: Type<'static> = Type::REVERT;
/// Possible commit type for changing documentation.
pub const DOCS: Type<'static> = Type::DOCS;
/// Possible commit type for changing code style.
pub const STYLE: Type<'static> = Type::STYLE;
/// Possible commit type for refactoring code structure.
pub const REFACTOR: Type<'static> = Type::REFACTOR;
/// Possible commit type for performance optimizations.
pub const PERF: Type<'static> = Type::PERF;
/// Possible commit type for addressing tests.
pub const TEST: Type<'static> = Type::TEST;
/// Possible commit type for changes to the build system or dependencies.
pub const BUILD: Type<'static> = Type::BUILD;
/// Possible commit type for changes to continuous integration.
pub const CI: Type<'static> = Type::CI;
/// Possible commit type for other things.
pub const CHORE: Type<'static> = Type::CHORE;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
