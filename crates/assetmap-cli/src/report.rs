//! Gap report writers (XLSX workbook or JSON), written atomically.

use anyhow::{Context, Result};
use assetmap_align::{GapReport, ReportCell, ReportTable, SideLabels};
use assetmap_extract::output::write_bytes;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::path::Path;

use crate::config::ReportFormat;

pub fn write_report(
    path: &Path,
    report: &GapReport,
    labels: &SideLabels,
    format: ReportFormat,
) -> Result<()> {
    let bytes = match format {
        ReportFormat::Xlsx => workbook_bytes(&report.tables(labels))
            .with_context(|| format!("failed to build workbook for {}", report.source_class))?,
        ReportFormat::Json => json_bytes(report, labels)?,
    };
    write_bytes(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn workbook_bytes(tables: &[ReportTable]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.name)?;
        write_table(sheet, table, &header_format)?;
    }

    workbook.save_to_buffer()
}

fn write_table(
    sheet: &mut Worksheet,
    table: &ReportTable,
    header: &Format,
) -> Result<(), XlsxError> {
    for (col, name) in table.headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, name, header)?;
        sheet.set_column_width(col, table.column_width)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                ReportCell::Text(s) => {
                    sheet.write_string(r, col, s)?;
                }
                ReportCell::Number(n) => {
                    sheet.write_number(r, col, *n)?;
                }
                ReportCell::Empty => {}
            }
        }
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// JSON form: the structured report plus the rendered sheets.
#[derive(Serialize)]
struct JsonReport<'a> {
    labels: &'a SideLabels,
    report: &'a GapReport,
    tables: Vec<ReportTable>,
}

fn json_bytes(report: &GapReport, labels: &SideLabels) -> Result<Vec<u8>> {
    let doc = JsonReport {
        labels,
        report,
        tables: report.tables(labels),
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}
