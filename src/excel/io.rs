use crate::error::{Result, TimetableError};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Render a calamine `Data` cell as text. Integral floats print without
/// a decimal part so hour columns read as `"3"` rather than `"3.0"`.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Lowercase and drop whitespace, for tolerant header comparisons.
pub fn normalize_header(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Read the first worksheet of a workbook as rows of strings.
pub fn read_first_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(&first)?;
    Ok(range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect())
}

/// Minimal CSV reader: quoted fields, doubled quotes, embedded separators and
/// newlines, LF or CRLF line endings.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            other => field.push(other),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows.into_iter()
        .map(|r| r.into_iter().map(|f| f.trim().to_string()).collect())
        .collect()
}

/// Read an uploaded sheet, dispatching on the file extension.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TimetableError::MissingFile(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_first_sheet(path),
        "csv" => {
            let bytes = std::fs::read(path)?;
            Ok(parse_csv(&String::from_utf8_lossy(&bytes)))
        }
        other => Err(TimetableError::UnsupportedExtension(format!(".{}", other))),
    }
}
