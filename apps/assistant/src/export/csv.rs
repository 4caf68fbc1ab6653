use std::borrow::Cow;

use crate::models::application::Application;

pub const TRACKER_CSV_HEADER: [&str; 5] =
    ["Company", "Position", "Application Date", "Status", "Notes"];

/// Quotes a field when it contains a comma, quote, CR or LF, doubling any
/// embedded quotes. Other fields pass through untouched.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// One CSV row, without a line terminator.
pub fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Tracker export: header plus one row per application, `\n` terminated.
pub fn applications_to_csv(applications: &[Application]) -> String {
    let mut out = csv_row(&TRACKER_CSV_HEADER);
    out.push('\n');
    for app in applications {
        let date = app.application_date.format("%Y-%m-%d").to_string();
        out.push_str(&csv_row(&[
            app.company_name.as_str(),
            app.position.as_str(),
            date.as_str(),
            app.status.as_str(),
            app.notes.as_str(),
        ]));
        out.push('\n');
    }
    out
}
