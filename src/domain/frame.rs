//! Stack frame records and content-addressed frame identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One entry of a captured call stack, describing one active function
/// activation at capture time. Supplied by the capture collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Source file the function is defined in
    pub source_file: PathBuf,
    /// Line where the function definition starts
    pub definition_line: u32,
    /// Line executing within this frame at capture time. For every frame
    /// except the innermost this is the call site of the frame above it.
    pub call_site_line: u32,
    /// Name of the active function
    pub function_name: String,
}

impl FrameRecord {
    pub fn new(
        source_file: impl Into<PathBuf>,
        definition_line: u32,
        call_site_line: u32,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            definition_line,
            call_site_line,
            function_name: function_name.into(),
        }
    }

    /// Display label for the node this record maps to.
    pub fn label(&self) -> String {
        format!("{}:{}", self.definition_line, self.function_name)
    }
}

/// Identity of a defined function, derived from where it is defined rather
/// than where it was called. Two records for the same
/// (file, definition line, name) triple collapse to the same id no matter
/// how many distinct call sites they were captured from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(String);

impl FrameId {
    /// Digest `"{file}:{definition_line}:{name}"`. The call-site line never
    /// participates.
    pub fn of(record: &FrameRecord) -> Self {
        let digest = blake3::Hasher::new()
            .update(record.source_file.to_string_lossy().as_bytes())
            .update(b":")
            .update(record.definition_line.to_string().as_bytes())
            .update(b":")
            .update(record.function_name.as_bytes())
            .finalize();
        FrameId(digest.to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_call_site() {
        let first = FrameRecord::new("/srv/app/main.py", 10, 42, "handler");
        let second = FrameRecord::new("/srv/app/main.py", 10, 99, "handler");
        assert_eq!(FrameId::of(&first), FrameId::of(&second));
    }

    #[test]
    fn identity_differs_per_definition() {
        let base = FrameRecord::new("/srv/app/main.py", 10, 42, "handler");
        let other_line = FrameRecord::new("/srv/app/main.py", 11, 42, "handler");
        let other_name = FrameRecord::new("/srv/app/main.py", 10, 42, "helper");
        let other_file = FrameRecord::new("/srv/app/util.py", 10, 42, "handler");

        assert_ne!(FrameId::of(&base), FrameId::of(&other_line));
        assert_ne!(FrameId::of(&base), FrameId::of(&other_name));
        assert_ne!(FrameId::of(&base), FrameId::of(&other_file));
    }

    #[test]
    fn identity_is_deterministic() {
        let record = FrameRecord::new("/srv/app/main.py", 10, 42, "handler");
        assert_eq!(FrameId::of(&record), FrameId::of(&record));
    }
}
