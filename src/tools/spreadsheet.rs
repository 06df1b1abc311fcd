//! Spreadsheet workbooks (xlsx, xls, ods) rendered as CSV-like text.

use crate::error::{Result, SvarError};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// Extensions handled by [`render_workbook`].
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_spreadsheet(extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext))
}

/// Render every sheet of a workbook, each under a `## Sheet: <name>` header.
pub fn render_workbook(name: &str, bytes: Vec<u8>) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SvarError::ToolFailed(format!("Cannot open workbook '{}': {}", name, e)))?;

    let mut sections = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet).map_err(|e| {
            SvarError::ToolFailed(format!("Cannot read sheet '{}' of '{}': {}", sheet, name, e))
        })?;
        sections.push(format!("## Sheet: {}\n{}", sheet, render_range(&range)));
    }

    if sections.is_empty() {
        return Err(SvarError::ToolFailed(format!("Workbook '{}' has no sheets", name)));
    }
    Ok(sections.join("\n\n"))
}

/// One line per row, cells separated by commas.
pub fn render_range(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| row.iter().map(render_cell).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell(cell: &Data) -> String {
    let text = match cell {
        Data::Empty => return String::new(),
        other => other.to_string(),
    };

    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Some("xlsx")));
        assert!(is_spreadsheet(Some("xls")));
        assert!(!is_spreadsheet(Some("csv")));
        assert!(!is_spreadsheet(None));
    }

    #[test]
    fn test_render_range_as_csv() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("Item".to_string()));
        range.set_value((0, 1), Data::String("Category".to_string()));
        range.set_value((0, 2), Data::String("Sales".to_string()));
        range.set_value((1, 0), Data::String("Burger".to_string()));
        range.set_value((1, 1), Data::String("Food".to_string()));
        range.set_value((1, 2), Data::Int(1200));
        range.set_value((2, 0), Data::String("Soda, large".to_string()));
        range.set_value((2, 2), Data::Int(300));

        assert_eq!(
            render_range(&range),
            "Item,Category,Sales\nBurger,Food,1200\n\"Soda, large\",,300"
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(
            render_cell(&Data::String("say \"hi\"".to_string())),
            "\"say \"\"hi\"\"\""
        );
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_invalid_workbook_fails() {
        let err = render_workbook("sales.xlsx", b"PK\x03\x04 not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, SvarError::ToolFailed(_)));
    }
}
