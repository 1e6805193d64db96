//! Target-line normalisation.

/// Rewrite a target line so the colon has exactly one space on each side and
/// runs of whitespace collapse to a single space.
///
/// Leading and trailing whitespace is dropped, which makes `a:b`, `a :b` and
/// `a:  b` equivalent. A trailing colon keeps its leading space only.
///
/// # Examples
/// ```
/// use mymake::parser::normalize;
/// assert_eq!(normalize("a:b"), "a : b");
/// assert_eq!(normalize("  app :\tmain.o   util.o "), "app : main.o util.o");
/// assert_eq!(normalize("clean:"), "clean :");
/// ```
#[must_use]
pub fn normalize(line: &str) -> String {
    line.replace(':', " : ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
