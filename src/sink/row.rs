//! Row formatting and parsing for the `, `-separated, `"`-quoted file format.

use crate::{Record, Reference};

/// Quote a field: CR/LF become spaces, `"` is doubled.
fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\r' | '\n' => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `<url>, "<title>"`. The URL is written bare unless it holds `,` or `"`, which a bare
/// field cannot carry; then it is quoted like the title.
pub fn format_reference_row(reference: &Reference) -> String {
    let url: String = reference
        .url
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let url = url.trim();
    if url.contains([',', '"']) {
        format!("{}, {}", quote(url), quote(&reference.title))
    } else {
        format!("{}, {}", url, quote(&reference.title))
    }
}

/// `"<date>", "<title>", "<body>"`.
pub fn format_record_row(record: &Record) -> String {
    format!(
        "{}, {}, {}",
        quote(record.date()),
        quote(&record.title),
        quote(&record.body)
    )
}

/// Split one line into fields. Fields are separated by `,` plus optional spaces and may be
/// quoted with `"` (a doubled `""` inside a quoted field is one quote).
/// An unterminated quoted field is an error, which is how a truncated row shows up.
pub fn parse_row(line: &str) -> Result<Vec<String>, String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        let mut field = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    None => return Err("unterminated quoted field".to_string()),
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    Some('"') => break,
                    Some(c) => field.push(c),
                }
            }
            fields.push(field);
            while chars.peek() == Some(&' ') {
                chars.next();
            }
            match chars.next() {
                None => break,
                Some(',') => continue,
                Some(c) => return Err(format!("unexpected {c:?} after quoted field")),
            }
        } else {
            let mut at_end = true;
            for c in chars.by_ref() {
                if c == ',' {
                    at_end = false;
                    break;
                }
                field.push(c);
            }
            fields.push(field.trim_end().to_string());
            if at_end {
                break;
            }
        }
    }
    Ok(fields)
}
