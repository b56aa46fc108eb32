//! Graphviz export of a flattened forest.
//!
//! Every node becomes a record with a `C` port for incoming edges, `L` and `R`
//! ports when it has children in its sibling tree, and an `N` port when it
//! roots a nested forest (leaves show their value instead). Edges are derived
//! from the paths alone.

use std::{collections::HashSet, io::Write, path::Path};

use nestree_costs::{cost_return_on_error_no_add, CostsExt, OperationCost};
use nestree_path::{NodePath, Step};
use tracing::info;

use crate::{flatten::FlatNode, serializer::write_atomically, Error};

/// Fill colours by nesting level, cycling for deeper levels.
const LEVEL_COLORS: [&str; 8] = [
    "#FDF3D0", "#DCE8FA", "#D9E7D6", "#F1CFCD", "#F5F5F5", "#E1D5E7", "#FFE6CC", "white",
];

fn port(step: Step) -> char {
    match step {
        Step::Nested => 'N',
        other => other.symbol(),
    }
}

fn label(node: &FlatNode, paths: &HashSet<&NodePath>) -> String {
    let position = node.path.unmarked();
    let has_child = |child: NodePath| paths.contains(&child) || paths.contains(&child.marked());

    let mut fields = Vec::with_capacity(4);
    if has_child(position.left()) {
        fields.push("<L>L".to_owned());
    }
    fields.push(format!("<C>{}", node.key()));
    match node.value() {
        Some(value) => fields.push(value.to_string()),
        None => fields.push("<N>N".to_owned()),
    }
    if has_child(position.right()) {
        fields.push("<R>R".to_owned());
    }
    format!("{{{}}}", fields.join("|"))
}

/// Writes the DOT graph of `nodes` to `out`.
///
/// Fails with [`Error::PathLookupFailure`] if a node's parent is not among
/// `nodes`.
pub fn write_dot<W: Write>(nodes: &[FlatNode], mut out: W) -> Result<(), Error> {
    let paths: HashSet<&NodePath> = nodes.iter().map(|node| &node.path).collect();

    writeln!(out, "strict digraph {{")?;
    writeln!(out, "node [shape=record];")?;
    for node in nodes {
        writeln!(
            out,
            "\"{}\" [label=\"{}\" style=filled fillcolor=\"{}\"];",
            node.path.token(),
            label(node, &paths),
            LEVEL_COLORS[node.nesting_level() % LEVEL_COLORS.len()]
        )?;
        if let Some(link) = node.path.parent_link(|path| paths.contains(path))? {
            writeln!(
                out,
                "\"{}\":{} -> \"{}\":C;",
                link.parent.token(),
                port(link.port),
                node.path.token()
            )?;
        }
    }
    writeln!(out, "}}")?;
    out.flush()?;
    Ok(())
}

/// Writes the DOT graph of `nodes` to the file at `path`, atomically.
pub fn write_dot_file(path: &Path, nodes: &[FlatNode]) -> Result<(), Error> {
    write_atomically(path, |out| {
        let cost = OperationCost::default();
        cost_return_on_error_no_add!(&cost, write_dot(nodes, out));
        Ok(()).wrap_with_cost(cost)
    })
    .value?;
    info!(path = %path.display(), nodes = nodes.len(), "wrote graph");
    Ok(())
}
