//! Path segment algebra for relative module specifiers.
//!
//! A [`DirectoryStack`] is a directory expressed as segments below the
//! project boundary. Replaying a specifier against it treats `..` as pop,
//! `.` as a no-op and every other segment as push. Popping an empty stack
//! means the specifier climbs above the boundary.

use std::path::{Component, Path};

/// Parent-directory operator.
pub const PARENT_DIR: &str = "..";

/// Same-directory operator.
pub const CURRENT_DIR: &str = ".";

/// Splits a specifier on both `/` and `\` separators.
///
/// An empty specifier yields a single empty segment.
pub fn split_segments(specifier: &str) -> impl Iterator<Item = &str> {
    specifier.split(['/', '\\'])
}

/// One segment of a specifier, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// `..`
    Parent,
    /// `.`
    Current,
    /// Any other component, including the empty string.
    Named(&'a str),
}

impl<'a> Segment<'a> {
    /// Classifies a raw segment.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        match raw {
            PARENT_DIR => Self::Parent,
            CURRENT_DIR => Self::Current,
            other => Self::Named(other),
        }
    }
}

/// Returns true if the specifier starts with a `.` or `..` segment.
///
/// Bare package names (`react`, `lodash/fp`) and absolute paths are not
/// relative and are never replayed.
#[must_use]
pub fn is_relative_specifier(specifier: &str) -> bool {
    matches!(
        split_segments(specifier).next().map(Segment::parse),
        Some(Segment::Parent | Segment::Current)
    )
}

/// A replay climbed above the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryEscape {
    /// Index of the `..` segment that underflowed.
    pub segment: usize,
}

/// Directory of a module, as segments relative to the project boundary.
///
/// Never contains `.` or `..`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DirectoryStack {
    segments: Vec<String>,
}

impl DirectoryStack {
    /// Creates an empty stack (the boundary directory itself).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from raw segments, folding any `.` and `..`.
    ///
    /// Returns `None` if the segments climb above the starting point.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stack = Self::new();
        for raw in segments {
            stack.apply(Segment::parse(raw.as_ref())).ok()?;
        }
        Some(stack)
    }

    /// Derives the containing directory of `module` relative to `boundary`.
    ///
    /// Returns `None` when `module` does not lie under `boundary`.
    #[must_use]
    pub fn for_module(boundary: &Path, module: &Path) -> Option<Self> {
        let relative = module.strip_prefix(boundary).ok()?;
        let mut components: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(s) => components.push(s.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => components.push(PARENT_DIR.to_owned()),
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        // The last component is the file name.
        components.pop()?;
        Self::from_segments(components)
    }

    /// Segments from the boundary downwards.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true when the stack is the boundary directory itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn apply(&mut self, segment: Segment<'_>) -> Result<(), ()> {
        match segment {
            Segment::Parent => self.segments.pop().map(drop).ok_or(()),
            Segment::Current => Ok(()),
            Segment::Named(name) => {
                self.segments.push(name.to_owned());
                Ok(())
            }
        }
    }

    /// Replays `specifier` against a copy of this stack.
    ///
    /// Processing stops at the first `..` applied to an empty stack.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryEscape`] if the specifier climbs above the boundary.
    pub fn resolve(&self, specifier: &str) -> Result<Self, BoundaryEscape> {
        let mut resolved = self.clone();
        for (index, raw) in split_segments(specifier).enumerate() {
            resolved
                .apply(Segment::parse(raw))
                .map_err(|()| BoundaryEscape { segment: index })?;
        }
        Ok(resolved)
    }
}

impl std::fmt::Display for DirectoryStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(segments: &[&str]) -> DirectoryStack {
        DirectoryStack::from_segments(segments).unwrap()
    }

    #[test]
    fn climbs_within_bounds() {
        let resolved = stack(&["a", "b"]).resolve("../../c").unwrap();
        assert_eq!(resolved.segments(), ["c"]);
    }

    #[test]
    fn underflow_reports_once() {
        let err = stack(&["a"]).resolve("../../c").unwrap_err();
        assert_eq!(err, BoundaryEscape { segment: 1 });
    }

    #[test]
    fn stops_at_first_underflow() {
        // Later segments would bring it back in bounds but are never evaluated.
        let err = stack(&[]).resolve("../../../src/x").unwrap_err();
        assert_eq!(err.segment, 0);
    }

    #[test]
    fn current_dir_segments_are_inert() {
        let base = stack(&["a"]);
        assert_eq!(base.resolve(".").unwrap(), base);
        assert_eq!(base.resolve("./././.").unwrap(), base);
        assert_eq!(stack(&[]).resolve("./.").unwrap(), stack(&[]));
    }

    #[test]
    fn descend_then_ascend_round_trips() {
        let base = stack(&["x", "y"]);
        let resolved = base.resolve("./p/q/r/../../..").unwrap();
        assert_eq!(resolved, base);
    }

    #[test]
    fn resolve_leaves_base_untouched() {
        let base = stack(&["a", "b"]);
        let _ = base.resolve("../../..");
        let _ = base.resolve("./c/d");
        assert_eq!(base.segments(), ["a", "b"]);
    }

    #[test]
    fn backslash_is_a_separator() {
        let resolved = stack(&["a", "b"]).resolve("..\\c").unwrap();
        assert_eq!(resolved.segments(), ["a", "c"]);
    }

    #[test]
    fn empty_specifier_is_one_named_segment() {
        let resolved = stack(&["a"]).resolve("").unwrap();
        assert_eq!(resolved.segments(), ["a", ""]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let base = stack(&["a", "b"]);
        for specifier in ["../x", "../../../y", "./z/.."] {
            assert_eq!(base.resolve(specifier), base.resolve(specifier));
        }
    }

    #[test]
    fn relative_specifier_detection() {
        assert!(is_relative_specifier("./foo"));
        assert!(is_relative_specifier("../foo"));
        assert!(is_relative_specifier(".."));
        assert!(is_relative_specifier(".\\foo"));
        assert!(!is_relative_specifier("react"));
        assert!(!is_relative_specifier("lodash/../x"));
        assert!(!is_relative_specifier("/abs/path"));
        assert!(!is_relative_specifier(".hidden/x"));
        assert!(!is_relative_specifier(""));
    }

    #[test]
    fn for_module_drops_file_name() {
        let dir = DirectoryStack::for_module(
            Path::new("/work/src"),
            Path::new("/work/src/components/button/index.js"),
        )
        .unwrap();
        assert_eq!(dir.segments(), ["components", "button"]);
        assert_eq!(dir.to_string(), "components/button");
    }

    #[test]
    fn for_module_at_boundary_root_is_empty() {
        let dir =
            DirectoryStack::for_module(Path::new("/work/src"), Path::new("/work/src/index.js"))
                .unwrap();
        assert!(dir.is_empty());
    }

    #[test]
    fn for_module_outside_boundary_is_none() {
        assert!(DirectoryStack::for_module(
            Path::new("/work/src"),
            Path::new("/work/webpack.config.js")
        )
        .is_none());
        assert!(
            DirectoryStack::for_module(Path::new("/work/src"), Path::new("/work/src")).is_none()
        );
    }

    #[test]
    fn from_segments_folds_operators() {
        assert_eq!(stack(&["a", ".", "b", ".."]).segments(), ["a"]);
        assert!(DirectoryStack::from_segments(["a", "..", ".."]).is_none());
    }
}
