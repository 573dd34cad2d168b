//! CSV export of an itinerary summary: one row per activity, ordered by
//! day then by the day's activity order.

use std::io::{self, Write};

use crate::model::Itinerary;

const HEADER: &str = "Day,Activity,Start Time,End Time,Location,Description";

/// Quote a field when it contains a comma, quote, or newline (RFC 4180
/// minimal quoting).
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Write the itinerary summary as CSV.
pub fn write_csv(itinerary: &Itinerary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "{HEADER}")?;

    for day in &itinerary.days {
        for activity in &day.activities {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                csv_field(&day.date.to_string()),
                csv_field(&activity.name),
                csv_field(&activity.start_time.format("%H:%M").to_string()),
                csv_field(&activity.end_time.format("%H:%M").to_string()),
                csv_field(&activity.location.name),
                csv_field(activity.description.as_deref().unwrap_or("")),
            )?;
        }
    }
    Ok(())
}

/// The itinerary summary as a CSV string.
pub fn csv_string(itinerary: &Itinerary) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec<u8> cannot fail.
    write_csv(itinerary, &mut buf).expect("in-memory write");
    String::from_utf8(buf).expect("CSV output is UTF-8")
}
