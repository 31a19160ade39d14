// src/format.rs

//! Output rendering
//!
//! Plain output is one package name per line, ready for `xargs` or a
//! package manager. Verbose output is comma separated with the columns
//! `name,origin,tag,description`; fields containing a comma, quote or line
//! break are quoted.

use crate::engine::Classification;
use crate::error::Result;

/// Render classifications as names or delimited records
pub fn format<'a, I>(entries: I, verbose: bool) -> Result<String>
where
    I: IntoIterator<Item = &'a Classification>,
{
    if !verbose {
        return Ok(entries
            .into_iter()
            .map(|entry| format!("{}\n", entry.name))
            .collect());
    }

    let mut writer = delimited_writer();
    for entry in entries {
        writer.write_record([
            entry.name.as_str(),
            origin_field(entry),
            entry.tag.as_deref().unwrap_or(""),
            entry.description.as_deref().unwrap_or(""),
        ])?;
    }
    finish(writer)
}

/// Render one package with its state: `name,state,origin,tag,description`
pub fn format_status(entry: &Classification) -> Result<String> {
    let mut writer = delimited_writer();
    writer.write_record([
        entry.name.as_str(),
        entry.state.as_str(),
        origin_field(entry),
        entry.tag.as_deref().unwrap_or(""),
        entry.description.as_deref().unwrap_or(""),
    ])?;
    finish(writer)
}

fn origin_field(entry: &Classification) -> &str {
    entry.origin.as_ref().map(|o| o.as_str()).unwrap_or("")
}

fn delimited_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
