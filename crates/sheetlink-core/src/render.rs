//! Document rendering
//!
//! Turns a record into the initial text of its document: a front matter
//! block with one entry per non-empty field. The link section is left to
//! the merger.

use crate::table::Record;

/// Render the front matter for a record
///
/// Headers repeated across grouped ledger rows become lists; multi-line
/// values become block scalars.
pub fn render_document(record: &Record) -> String {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for field in record.fields() {
        if field.text.is_empty() {
            continue;
        }
        match grouped.iter().position(|(header, _)| *header == field.header) {
            Some(i) => grouped[i].1.push(field.text.as_str()),
            None => grouped.push((field.header.as_str(), vec![field.text.as_str()])),
        }
    }

    let mut out = String::from("---\n");
    for (header, values) in grouped {
        if let [value] = values.as_slice() {
            push_scalar(&mut out, &format!("{}:", header), value, "  ");
        } else {
            out.push_str(&format!("{}:\n", header));
            for value in values {
                push_scalar(&mut out, "  -", value, "    ");
            }
        }
    }
    out.push_str("---\n");
    out
}

fn push_scalar(out: &mut String, prefix: &str, value: &str, indent: &str) {
    if value.contains('\n') {
        out.push_str(&format!("{} |\n", prefix));
        for line in value.lines() {
            out.push_str(indent);
            out.push_str(line.trim_end());
            out.push('\n');
        }
    } else {
        out.push_str(&format!("{} {}\n", prefix, value));
    }
}
