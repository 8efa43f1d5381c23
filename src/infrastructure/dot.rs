//! DOT text assembly for the layout engine.

use std::fmt::Write;

/// Escape special characters for DOT attribute values.
pub fn escape(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Sanitize a string into a valid DOT identifier (used for cluster names,
/// which cannot be quoted).
pub fn sanitize_id(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Derive a unique cluster identifier: the sanitized name for readability,
/// suffixed with a digest of the raw name. Sanitizing alone is lossy, so
/// paths differing only in non-alphanumeric characters (`a-b.py` vs
/// `a.b.py`) would otherwise collapse into one cluster.
pub fn cluster_id(input: &str) -> String {
    let digest = blake3::hash(input.as_bytes()).to_hex();
    format!("{}_{}", sanitize_id(input), &digest[..8])
}

/// Incremental writer for a directed graph with subgraph clusters. Produces
/// a non-strict digraph, so parallel edges between one node pair survive.
pub struct DotWriter {
    output: String,
    indent: usize,
}

impl DotWriter {
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph {} {{", sanitize_id(name));
        Self { output, indent: 1 }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    fn write_attr_list(&mut self, attrs: &[(&str, &str)]) {
        self.output.push('[');
        for (i, (key, value)) in attrs.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let _ = write!(self.output, "{}=\"{}\"", key, escape(value));
        }
        self.output.push(']');
    }

    /// Top-level graph attributes, one per line.
    pub fn graph_attrs(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        for (key, value) in attrs {
            self.write_indent();
            let _ = writeln!(self.output, "{}=\"{}\";", key, escape(value));
        }
        self
    }

    /// Default attributes applied to all nodes.
    pub fn node_defaults(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        self.output.push_str("node ");
        self.write_attr_list(attrs);
        self.output.push_str(";\n");
        self
    }

    /// Default attributes applied to all edges.
    pub fn edge_defaults(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        self.output.push_str("edge ");
        self.write_attr_list(attrs);
        self.output.push_str(";\n");
        self
    }

    /// Open a `subgraph cluster_<id>` block; the layout engine only treats
    /// subgraphs named with the `cluster` prefix as visual regions.
    pub fn open_cluster(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        let _ = writeln!(self.output, "subgraph cluster_{} {{", cluster_id(id));
        self.indent += 1;
        for (key, value) in attrs {
            self.write_indent();
            let _ = writeln!(self.output, "{}=\"{}\";", key, escape(value));
        }
        self
    }

    pub fn close_cluster(&mut self) -> &mut Self {
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
        self
    }

    pub fn node(&mut self, id: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        let _ = write!(self.output, "\"{}\" ", escape(id));
        self.write_attr_list(attrs);
        self.output.push_str(";\n");
        self
    }

    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_indent();
        let _ = write!(self.output, "\"{}\" -> \"{}\" ", escape(from), escape(to));
        self.write_attr_list(attrs);
        self.output.push_str(";\n");
        self
    }

    /// Close the digraph and hand back the DOT text.
    pub fn finish(&mut self) -> String {
        self.output.push_str("}\n");
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(escape("a\"b\nc\\d"), "a\\\"b\\nc\\\\d");
    }

    #[test]
    fn sanitizes_paths_to_identifiers() {
        assert_eq!(sanitize_id("/srv/app/main.py"), "_srv_app_main_py");
    }

    #[test]
    fn writes_clustered_digraph() {
        let mut writer = DotWriter::new("frames");
        writer.open_cluster("/app/main.py", &[("label", "/app/main.py")]);
        writer.node("n1", &[("label", "1:main")]);
        writer.close_cluster();
        writer.edge("n1", "n2", &[("label", "#1 at 5")]);
        let dot = writer.finish();

        assert!(dot.starts_with("digraph frames {"));
        assert!(dot.contains("subgraph cluster__app_main_py_"));
        assert!(dot.contains("\"n1\" [label=\"1:main\"];"));
        assert!(dot.contains("\"n1\" -> \"n2\" [label=\"#1 at 5\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn cluster_ids_stay_distinct_when_sanitizing_collides() {
        // Both sanitize to `_app_a_b_py`; the digest suffix keeps them apart,
        // otherwise the layout engine would merge the two clusters
        let first = cluster_id("/app/a-b.py");
        let second = cluster_id("/app/a.b.py");
        assert!(first.starts_with("_app_a_b_py_"));
        assert!(second.starts_with("_app_a_b_py_"));
        assert_ne!(first, second);
        assert_eq!(first, cluster_id("/app/a-b.py"), "stable across calls");
    }
}
