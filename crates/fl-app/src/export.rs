//! CSV export of tables.

use std::fmt::Display;
use std::io::Write;

use fl_core::{Cell, Table};

use crate::error::AppResult;

/// Render `table` as CSV: a header row (index name first, `index` when
/// unnamed) then one line per row. Null cells are empty fields.
pub fn table_to_csv<K: Clone + Display>(table: &Table<K>) -> String {
    let mut csv = String::new();

    let mut header = vec![field(table.index_name().unwrap_or("index"))];
    header.extend(table.columns().iter().map(|c| field(c)));
    csv.push_str(&header.join(","));
    csv.push('\n');

    for (key, row) in table.iter() {
        let mut line = vec![field(&key.to_string())];
        line.extend(row.iter().map(cell));
        csv.push_str(&line.join(","));
        csv.push('\n');
    }
    csv
}

pub fn write_table<K: Clone + Display>(table: &Table<K>, out: &mut impl Write) -> AppResult<()> {
    out.write_all(table_to_csv(table).as_bytes())?;
    Ok(())
}

fn cell(value: &Cell) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote fields holding a comma, a quote or a newline.
fn field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::CaseTable;

    #[test]
    fn csv_has_header_and_empty_nulls() {
        let table = Table::from_rows(
            vec!["mass-flow".to_string(), "temp, K".to_string()],
            vec![1i64, 2],
            vec![vec![Some(0.5), None], vec![Some(1.25), Some(300.0)]],
        )
        .unwrap()
        .with_index_name("iter");

        assert_eq!(
            table_to_csv(&table),
            "iter,mass-flow,\"temp, K\"\n1,0.5,\n2,1.25,300\n"
        );
    }

    #[test]
    fn unnamed_index_gets_a_header() {
        let mut table = CaseTable::new(vec!["x".to_string()]);
        table.push_row("case \"a\"".to_string(), vec![Some(1.0)]).unwrap();

        let mut out = Vec::new();
        write_table(&table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "index,x\n\"case \"\"a\"\"\",1\n"
        );
    }
}
