use std::fmt::Write as _;

use crate::graph::{node::DEFAULT_IO_NAME, scheduler::Graph};

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Graph {
    /// Graphviz description of the topology, annotated with evaluation counters.
    ///
    /// Edges are labelled with the consuming slot, plus the producing output when it is not
    /// the default one.
    pub fn dump_dot(&self) -> String {
        let mut out = String::from("digraph G {\n    rankdir=LR;\n    node [shape=box];\n");
        for (idx, entry) in self.entries.iter().enumerate() {
            let stats = &entry.stats;
            let timing = match stats.last_duration {
                Some(d) => format!("{:.3} ms", d.as_secs_f64() * 1000.0),
                None => "-".to_string(),
            };
            let _ = writeln!(
                out,
                "    n{idx} [label=\"{}\\n{}\\nevals: {} hits: {}\\nlast: {}\"];",
                escape(&entry.name),
                entry.node.kind(),
                stats.evaluations,
                stats.cache_hits,
                timing
            );
        }
        for (idx, entry) in self.entries.iter().enumerate() {
            for slot in entry.node.inputs() {
                let label = if slot.dependency.output == DEFAULT_IO_NAME {
                    escape(&slot.name)
                } else {
                    format!("{}:{}", escape(&slot.dependency.output), escape(&slot.name))
                };
                let _ = writeln!(
                    out,
                    "    {} -> n{idx} [label=\"{label}\"];",
                    slot.dependency.node
                );
            }
        }
        out.push_str("}\n");
        out
    }
}
