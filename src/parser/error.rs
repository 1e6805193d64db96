//! Errors raised while reading a rule file.

// The unused_assignments lint fires on miette/thiserror derive expansion in
// some Rust versions only, so `#[expect]` cannot be used here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    reason = "version-dependent lint false positive from derive macros"
)]
#![allow(unused_assignments, reason = "derive macro expansion")]

use miette::Diagnostic;
use thiserror::Error;

/// Malformed rule-file input. Line numbers are 1-based.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    /// A target line did not contain exactly one colon.
    #[error("line {line}: expected exactly one ':' in a target line, found {found}")]
    #[diagnostic(
        code(mymake::parse::colon_count),
        help("write targets as `name : dep1 dep2`; command lines must start with a tab")
    )]
    ColonCount {
        /// Offending line.
        line: usize,
        /// Number of colons seen.
        found: usize,
    },

    /// A tab-indented command appeared before any target line.
    #[error("line {line}: command appears before any target")]
    #[diagnostic(
        code(mymake::parse::command_before_target),
        help("declare a target line such as `all :` above the first command")
    )]
    CommandBeforeTarget {
        /// Offending line.
        line: usize,
    },

    /// The left-hand side of a target line was empty.
    #[error("line {line}: target line has no target name")]
    #[diagnostic(code(mymake::parse::missing_target))]
    MissingTargetName {
        /// Offending line.
        line: usize,
    },

    /// The left-hand side of a target line held more than one word.
    #[error("line {line}: expected a single target name, found `{names}`")]
    #[diagnostic(
        code(mymake::parse::multiple_targets),
        help("declare each target on its own line")
    )]
    MultipleTargetNames {
        /// Offending line.
        line: usize,
        /// The left-hand side as written.
        names: String,
    },

    /// A target that already has dependencies was declared again.
    #[error("line {line}: target `{name}` is already defined")]
    #[diagnostic(
        code(mymake::parse::duplicate_target),
        help("merge the dependency lists into a single rule")
    )]
    DuplicateTarget {
        /// Offending line.
        line: usize,
        /// Target name.
        name: String,
    },
}

impl ParseError {
    /// Line on which the error was detected.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::ColonCount { line, .. }
            | Self::CommandBeforeTarget { line }
            | Self::MissingTargetName { line }
            | Self::MultipleTargetNames { line, .. }
            | Self::DuplicateTarget { line, .. } => *line,
        }
    }
}
