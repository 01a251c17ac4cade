//! GFM tables.
//!
//! A hidden table is replaced by its static rendering. Cells render their
//! inline children, so emphasis, links and code spans work inside tables;
//! [`TableModel`] supplies alignments and pads ragged rows.

use std::collections::HashMap;

use inkset_tree::{Node, SyntaxExtension, kind};

use super::SYNTAX_CLASS;
use crate::annotation::{Annotation, HostEvent, Widget};
use crate::plugin::{KeyBinding, Plugin, Rendered};
use crate::table::TableModel;
use crate::util::line_ranges;

/// Host command that pretty-prints the table under the cursor with
/// [`format_table`](crate::table::format_table).
pub const FORMAT_COMMAND: &str = "format-table";

/// Table plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("table", env!("CARGO_PKG_VERSION"))
        .with_priority(70)
        .with_node_types([kind::TABLE])
        .with_syntax(SyntaxExtension::Table)
        .with_key_binding(KeyBinding::new("Mod-Alt-f", FORMAT_COMMAND))
        .with_annotate(|ctx, out| {
            for node in ctx.nodes_of(kind::TABLE) {
                if TableModel::parse(node.text()).is_none() {
                    continue;
                }
                if ctx.reveals(node) {
                    for line in line_ranges(ctx.source(), node.range()) {
                        out.push(Annotation::line(line.start, "ink-table-source"));
                    }
                    if let Some(delimiter) = node.child(kind::TABLE_DELIMITER) {
                        out.push(Annotation::mark(delimiter.range(), SYNTAX_CLASS));
                    }
                    continue;
                }
                let fragment = ctx.fragments.node(node);
                let widget = Widget::new(move |range| {
                    fragment.view("ink-table").with_activation(HostEvent::Select(range))
                });
                out.push(Annotation::replace(node.range(), widget));
            }
            Ok(())
        })
        .with_render(|node, _, ctx| {
            let Some(table) = TableModel::parse(node.text()) else {
                return Rendered::Unhandled;
            };
            let cells = cell_nodes(node);
            Rendered::Html(table.to_html_with(|row, column| match cells.get(&(row, column)) {
                Some(cell) => ctx.render_children(*cell).trim().to_owned(),
                None => table.plain_html(row, column),
            }))
        })
        .with_styles(|_| {
            "table { border-collapse: collapse; }
th, td { border: 1px solid var(--ink-border); padding: 0.25em 0.75em; }
.ink-table-source { font-family: monospace; }"
                .to_owned()
        })
}

/// Cell nodes keyed by `(row, column)`, with `None` as the header row.
///
/// Empty cells have no node, so columns are counted from the pipes in front
/// of each cell rather than from its position among its siblings.
fn cell_nodes(table: Node<'_>) -> HashMap<(Option<usize>, usize), Node<'_>> {
    let header = table.children_of(kind::TABLE_HEADER).map(|row| (None, row));
    let body = table
        .children_of(kind::TABLE_ROW)
        .enumerate()
        .map(|(i, row)| (Some(i), row));
    header
        .chain(body)
        .flat_map(|(index, row)| {
            row.children_of(kind::TABLE_CELL)
                .map(move |cell| ((index, column_of(row, cell)), cell))
        })
        .collect()
}

fn column_of(row: Node<'_>, cell: Node<'_>) -> usize {
    let before = row.tree().slice(row.start()..cell.start()).as_bytes();
    let pipes = (0..before.len())
        .filter(|&i| before[i] == b'|' && (i == 0 || before[i - 1] != b'\\'))
        .count();
    let leading = usize::from(row.text().trim_start().starts_with('|'));
    pipes.saturating_sub(leading)
}
