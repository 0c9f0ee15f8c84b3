use std::io::Write;

use tabled::{
    builder::Builder,
    settings::{
        object::{Cell, Columns, Rows},
        style::On,
        Alignment, Border, Style,
    },
    Table,
};

use crate::{portfolio::render::RenderTable, util::rw::WriteHandle};

use super::model::{AcbWriter, Error, OutputType};

/// Renders tables as ascii art, for the console.
pub struct TextWriter {
    w: WriteHandle,
}

impl TextWriter {
    pub fn new(w: WriteHandle) -> TextWriter {
        TextWriter { w }
    }
}

#[derive(Clone, Copy)]
struct CellBorder {
    top: char,
    bottom: char,
    left: char,
    right: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

impl CellBorder {
    const FULL: CellBorder = CellBorder {
        top: '-',
        bottom: '-',
        left: '|',
        right: '|',
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
    };

    const BLANK: CellBorder = CellBorder {
        top: ' ',
        bottom: ' ',
        left: ' ',
        right: ' ',
        top_left: ' ',
        top_right: ' ',
        bottom_left: ' ',
        bottom_right: ' ',
    };

    fn to_border(self) -> Border<On, On, On, On> {
        Border::full(
            self.top,
            self.bottom,
            self.left,
            self.right,
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        )
    }
}

fn title(out_type: &OutputType, name: &str) -> String {
    match out_type {
        OutputType::Transactions => format!("Transactions for {}", name),
        OutputType::CapitalGains => format!("Capital Gains/Losses for {}", name),
        OutputType::PortfolioSummary => "Portfolio Summary".to_string(),
        OutputType::AggregateGains => "Aggregate Gains".to_string(),
    }
}

/// Header (upper-cased), rows, then, if there is a footer, a blank
/// separator row and the footer row. Returns the separator's row index.
fn build_table(model: &RenderTable) -> (Table, Option<usize>) {
    let mut bldr = Builder::default();
    bldr.push_record(model.header.iter().map(|h| h.to_uppercase()));
    for row in &model.rows {
        bldr.push_record(row);
    }

    let mut sep_row = None;
    if !model.footer.is_empty() {
        bldr.push_record(vec![String::new(); model.footer.len()]);
        bldr.push_record(model.footer.clone());
        sep_row = Some(1 + model.rows.len());
    }
    (bldr.build(), sep_row)
}

/// Removes the outer frame around the header row and along the left and
/// right edges, leaving only inner column separators.
fn open_outer_edges(table: &mut Table, n_cols: usize) {
    table.with(Style::ascii());
    table.modify(Rows::first(), Alignment::center());

    table.modify(Rows::first(), CellBorder {
        top: ' ',
        top_left: ' ',
        top_right: ' ',
        ..CellBorder::FULL
    }.to_border());
    table.modify(Columns::first(), CellBorder {
        left: ' ',
        top_left: '-',
        bottom_left: '-',
        ..CellBorder::FULL
    }.to_border());
    table.modify(Columns::last(), CellBorder {
        right: ' ',
        top_right: '-',
        bottom_right: '-',
        ..CellBorder::FULL
    }.to_border());

    let header_corner = CellBorder { top: ' ', top_left: ' ', top_right: ' ', ..CellBorder::FULL };
    table.modify(Cell::new(0, 0), CellBorder {
        left: ' ',
        bottom_left: '-',
        ..header_corner
    }.to_border());
    table.modify(Cell::new(0, n_cols.saturating_sub(1)), CellBorder {
        right: ' ',
        bottom_right: '-',
        ..header_corner
    }.to_border());
}

/// Draws the footer as a row of detached boxes under the table. Only the
/// non-empty footer cells get a box, which reaches up through the
/// separator row to the table's bottom edge.
fn frame_footer(table: &mut Table, sep_row: usize, footer: &[String]) {
    let footer_row = sep_row + 1;
    table.modify(Rows::single(sep_row), Border::new().set_left(' ').set_right(' '));
    table.modify(Rows::single(footer_row), CellBorder::BLANK.to_border());

    for (col, _) in footer.iter().enumerate().filter(|(_, c)| !c.is_empty()) {
        table.modify(Cell::new(sep_row, col), CellBorder::FULL.to_border());
        table.modify(Cell::new(footer_row, col), CellBorder::FULL.to_border());
    }
}

impl AcbWriter for TextWriter {
    fn print_render_table(
        &mut self,
        out_type: OutputType,
        name: &str,
        table_model: &RenderTable,
    ) -> Result<(), Error> {
        let map_write_err = |e| format!("{e}");

        for err in &table_model.errors {
            writeln!(self.w, "[!] {}", err).map_err(map_write_err)?;
        }
        if !table_model.errors.is_empty() {
            writeln!(self.w, "Printing parsed information state:")
                .map_err(map_write_err)?;
        }
        writeln!(self.w, "{}", title(&out_type, name)).map_err(map_write_err)?;

        let (mut table, sep_row) = build_table(table_model);
        open_outer_edges(&mut table, table_model.header.len());
        if let Some(sep_row) = sep_row {
            frame_footer(&mut table, sep_row, &table_model.footer);
        }
        writeln!(self.w, "{table}").map_err(map_write_err)?;

        for note in &table_model.notes {
            writeln!(self.w, "{note}").map_err(map_write_err)?;
        }
        writeln!(self.w).map_err(map_write_err)?;
        Ok(())
    }
}
