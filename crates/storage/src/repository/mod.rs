mod athlete;
mod result;

pub use athlete::AthleteRepository;
pub use result::{HISTORY_HEADERS, ResultRepository};

/// Decodes a CSV file that may have been saved by a spreadsheet in Latin-1.
fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
