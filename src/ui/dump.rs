//! Non-interactive output: the visible rows as tab-separated text.

use std::io::Write;

use crate::core::graph::GraphStore;
use crate::core::projection::TreeProjection;

use super::tree_widget::{header_labels, row_cells};

/// Write a header line and one line per visible row.  The first field is
/// indented by two spaces per depth level; tabs and newlines inside cell
/// text are replaced by spaces.
pub fn write_tsv<S: GraphStore>(
    projection: &TreeProjection<S>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "{}", header_labels(projection).join("\t"))?;
    for row in projection.rows() {
        let cells: Vec<String> = row_cells(projection, &row)
            .into_iter()
            .map(|c| c.replace(['\t', '\n', '\r'], " "))
            .collect();
        writeln!(out, "{}{}", "  ".repeat(row.depth), cells.join("\t"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::columns::ColumnRegistry;
    use crate::core::graph::{Containment, MemoryGraph, Triple};
    use crate::core::term::{vocab, Literal, Resource};

    fn ex(s: &str) -> Resource {
        Resource::iri(format!("http://example.org/{s}"))
    }

    #[test]
    fn dump_indents_and_separates() {
        let label = Resource::iri(vocab::RDFS_LABEL);
        let kind = Resource::iri(vocab::RDF_TYPE);
        let g = MemoryGraph::new(Containment::new(vec![ex("child")])).into_shared();
        {
            let mut g = g.borrow_mut();
            g.assert(Triple::new(ex("r"), label.clone(), Literal::plain("Root")));
            g.assert(Triple::new(ex("r"), ex("child"), ex("a")));
            g.assert(Triple::new(ex("a"), label.clone(), Literal::plain("A\tone")));
            g.assert(Triple::new(ex("a"), kind.clone(), ex("Thing")));
        }
        let mut cols = ColumnRegistry::new();
        cols.add_column(label, "Label", true);
        cols.add_column(kind, "Type", true);
        let p = TreeProjection::new(g, ex("r")).with_columns(cols);

        let mut out = Vec::new();
        write_tsv(&p, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Label\tType\nRoot\t\n  A one\thttp://example.org/Thing\n"
        );
    }
}
