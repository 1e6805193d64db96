//! Errors that abort a build.

// See `parser::error` for why these attributes are needed.
#![allow(
    clippy::allow_attributes,
    reason = "version-dependent lint false positive from derive macros"
)]
#![allow(unused_assignments, reason = "derive macro expansion")]

use crate::exec::CommandError;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Fatal planning or execution failure.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The requested target is not in the graph.
    #[error("target `{target}` was not found in the rule file")]
    #[diagnostic(code(mymake::build::not_found))]
    NotFound {
        /// Requested name.
        target: String,
    },

    /// No target was requested and the rule file declares none.
    #[error("no targets are declared")]
    #[diagnostic(
        code(mymake::build::no_targets),
        help("add a line such as `all : app` to the rule file")
    )]
    NoTargets,

    /// A plain dependency has no file on disk and no rule to produce it.
    #[error("`{name}` does not exist and no rule builds it")]
    #[diagnostic(code(mymake::build::missing_leaf))]
    MissingLeaf {
        /// Dependency name.
        name: String,
        /// Probe failure.
        #[source]
        source: io::Error,
    },

    /// A target has no file, no dependencies and no commands.
    #[error("`{name}` does not exist and has nothing to build it from")]
    #[diagnostic(
        code(mymake::build::no_recipe),
        help("give the target dependencies or commands, or create the file")
    )]
    NoRecipe {
        /// Target name.
        name: String,
    },

    /// A command failed; the rest of the build was abandoned.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Command(#[from] CommandError),
}
