//! Minimal CSV writer
//!
//! Comma delimited, `\n` line endings. Fields containing the delimiter, a
//! quote, or a line break are wrapped in quotes with inner quotes doubled.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Appends one record, terminated by `\n`
pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        write_field(out, field.as_ref());
    }
    out.push('\n');
}

fn write_field(out: &mut String, field: &str) {
    if !needs_quoting(field) {
        out.push_str(field);
        return;
    }

    out.push(QUOTE);
    for ch in field.chars() {
        if ch == QUOTE {
            out.push(QUOTE);
        }
        out.push(ch);
    }
    out.push(QUOTE);
}

fn needs_quoting(field: &str) -> bool {
    field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r')
}

/// Reads back what [`write_record`] produces
#[cfg(test)]
pub(crate) fn parse(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            QUOTE => in_quotes = true,
            DELIMITER => record.push(std::mem::take(&mut field)),
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
