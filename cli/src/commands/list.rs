//! List command - print one capture and exit.

use anyhow::Result;
use pvw_core::{Column, Row, SystemSession};

pub async fn run(session: &SystemSession, json: bool) -> Result<()> {
    let derivation = session.refresh().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&derivation.processes)?);
        return Ok(());
    }

    if derivation.table.is_empty() {
        println!("No open ports found.");
        return Ok(());
    }

    for line in format_table(&session.settings().columns, &derivation.table.rows) {
        println!("{}", line);
    }

    println!(
        "\nTotal: {} connections across {} processes",
        derivation.connection_count(),
        derivation.processes.len()
    );
    Ok(())
}

/// Render rows as left-aligned text columns.
///
/// Each column is as wide as its widest cell. Nothing is truncated since the
/// output may be piped.
fn format_table(columns: &[Column], rows: &[Row]) -> Vec<String> {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.title().len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let titles: Vec<&str> = columns.iter().map(|c| c.title()).collect();
    let mut lines = vec![join(&titles, &widths)];
    lines.push("-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    lines.extend(rows.iter().map(|row| join(row, &widths)));
    lines
}

fn join<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let columns = [Column::Pid, Column::Name, Column::Port];
        let rows = vec![row(&["1234", "nginx", "80"]), row(&["", "", "51000"])];

        let lines = format_table(&columns, &rows);
        assert_eq!(lines[0], "PID   Name   Port");
        assert_eq!(lines[1], "-".repeat(18));
        assert_eq!(lines[2], "1234  nginx  80");
        assert_eq!(lines[3], format!("{}51000", " ".repeat(13)));
    }

    #[test]
    fn test_format_table_does_not_truncate() {
        let columns = [Column::Directory];
        let long = "/home/someone/projects/a/very/long/working/directory";
        let lines = format_table(&columns, &[row(&[long])]);
        assert_eq!(lines[2], long);
    }
}
