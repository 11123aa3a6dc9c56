//! Text-preserving corrector.
//!
//! Rewrites a descriptor by literal, case-sensitive substitution of one
//! marker string for another. Nothing outside the marker is touched, so line
//! endings, attribute order, comments and the BOM survive as they were.

use crate::descriptor::{self, Descriptor};
use crate::error::{ProjectError, Result};
use std::path::Path;

/// Offending and accepted serializations of the setting element.
#[derive(Debug, Clone)]
pub struct Markers {
    pub offending: String,
    pub accepted: String,
}

impl Markers {
    pub fn new(offending: impl Into<String>, accepted: impl Into<String>) -> Self {
        Self {
            offending: offending.into(),
            accepted: accepted.into(),
        }
    }

    /// `<element>value</element>` markers for both values.
    pub fn for_element(element: &str, offending: &str, accepted: &str) -> Self {
        Self::new(
            format!("<{element}>{offending}</{element}>"),
            format!("<{element}>{accepted}</{element}>"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub text: String,
    pub changed: bool,
}

/// Replace every offending marker in `text`.
pub fn correct_text(text: &str, markers: &Markers) -> Correction {
    if markers.offending.is_empty() || !text.contains(&markers.offending) {
        return Correction {
            text: text.to_string(),
            changed: false,
        };
    }
    Correction {
        text: text.replace(&markers.offending, &markers.accepted),
        changed: true,
    }
}

pub fn correct(d: &Descriptor, markers: &Markers) -> Correction {
    correct_text(&d.text, markers)
}

/// Load, correct and write back one descriptor. Returns whether it changed.
///
/// Only files whose extension ends in `proj` are rewritten; the write is
/// skipped entirely when nothing was substituted.
pub fn correct_file(path: &Path, markers: &Markers) -> Result<bool> {
    descriptor::resolve(path)?;
    if !is_project_file(path) {
        return Err(ProjectError::UnsupportedProjectKind {
            path: path.to_path_buf(),
        });
    }
    let d = descriptor::load(path)?;
    if d.is_blank() {
        return Ok(false);
    }
    let fixed = correct(&d, markers);
    if fixed.changed {
        d.write_text(&fixed.text)?;
    }
    Ok(fixed.changed)
}

fn is_project_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().ends_with("proj"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TextEncoding;
    use std::fs;
    use tempfile::tempdir;

    fn markers() -> Markers {
        Markers::for_element("CopyToOutputDirectory", "Always", "PreserveNewest")
    }

    const SAMPLE: &str = "<Project>\r\n  <ItemGroup>\r\n    <Content Include=\"logo.png\"><CopyToOutputDirectory>Always</CopyToOutputDirectory></Content>\r\n    <!-- keep -->\r\n  </ItemGroup>\r\n</Project>\r\n";

    #[test]
    fn test_markers_for_element() {
        let m = markers();
        assert_eq!(m.offending, "<CopyToOutputDirectory>Always</CopyToOutputDirectory>");
        assert_eq!(m.accepted, "<CopyToOutputDirectory>PreserveNewest</CopyToOutputDirectory>");
    }

    #[test]
    fn test_replaces_marker_and_keeps_everything_else() {
        let out = correct_text(SAMPLE, &markers());
        assert!(out.changed);
        assert_eq!(out.text, SAMPLE.replace("Always", "PreserveNewest"));
        assert!(out.text.contains("\r\n    <!-- keep -->\r\n"));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let once = correct_text(SAMPLE, &markers());
        let twice = correct_text(&once.text, &markers());
        assert!(!twice.changed);
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn test_no_marker_is_identity() {
        let text = "<Project><None Include=\"a\"><CopyToOutputDirectory>PreserveNewest</CopyToOutputDirectory></None></Project>";
        let out = correct_text(text, &markers());
        assert!(!out.changed);
        assert_eq!(out.text, text);
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        let text = "<Project><CopyToOutputDirectory>always</CopyToOutputDirectory></Project>";
        assert!(!correct_text(text, &markers()).changed);
    }

    #[test]
    fn test_correct_file_preserves_utf16_encoding() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("App.csproj");
        fs::write(&p, TextEncoding::Utf16Le.encode(SAMPLE)).unwrap();
        assert!(correct_file(&p, &markers()).unwrap());
        let expected = TextEncoding::Utf16Le.encode(&SAMPLE.replace("Always", "PreserveNewest"));
        assert_eq!(fs::read(&p).unwrap(), expected);
    }

    #[test]
    fn test_correct_file_skips_write_when_unchanged() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("App.csproj");
        fs::write(&p, "<Project />").unwrap();
        let before = fs::metadata(&p).unwrap().modified().unwrap();
        assert!(!correct_file(&p, &markers()).unwrap());
        assert_eq!(fs::metadata(&p).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_correct_file_refuses_non_project_files() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("notes.xml");
        fs::write(&p, SAMPLE).unwrap();
        let err = correct_file(&p, &markers()).unwrap_err();
        assert!(matches!(err, ProjectError::UnsupportedProjectKind { .. }));
        assert_eq!(fs::read_to_string(&p).unwrap(), SAMPLE);
    }
}
