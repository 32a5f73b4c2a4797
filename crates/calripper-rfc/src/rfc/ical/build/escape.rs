//! iCalendar text escaping utilities.

/// Escapes text for iCalendar TEXT values (RFC 5545 §3.3.11).
///
/// Backslash, comma and semicolon are escaped; line breaks (`\n`,
/// `\r\n` or a lone `\r`) become the two-character sequence `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            _ => result.push(c),
        }
    }
    result
}

/// Drops control characters from a pre-formatted value.
///
/// Raw values (URIs, dates, recurrence rules) have no escape syntax, so a
/// line break would otherwise end the content line early.
#[must_use]
pub fn strip_controls(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Escapes a parameter value, quoting it when it contains `:`, `;` or `,`.
///
/// Double quotes cannot appear inside a quoted parameter and are replaced
/// with the RFC 6868 caret sequence.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if !s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n')) {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len() + 4);
    result.push('"');
    for c in s.chars() {
        match c {
            '^' => result.push_str("^^"),
            '\n' => result.push_str("^n"),
            '"' => result.push_str("^'"),
            _ => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_specials() {
        assert_eq!(escape_text("Jazz, Blues; Soul"), "Jazz\\, Blues\\; Soul");
        assert_eq!(escape_text("C:\\music"), "C:\\\\music");
    }

    #[test]
    fn escape_text_line_breaks() {
        assert_eq!(escape_text("one\ntwo"), "one\\ntwo");
        assert_eq!(escape_text("one\r\ntwo"), "one\\ntwo");
        assert_eq!(escape_text("one\rtwo"), "one\\ntwo");
    }

    #[test]
    fn strip_controls_removes_line_breaks() {
        assert_eq!(
            strip_controls("https://a.example/\r\nX-INJECTED:yes"),
            "https://a.example/X-INJECTED:yes"
        );
        assert_eq!(strip_controls("FREQ=WEEKLY;BYDAY=SU"), "FREQ=WEEKLY;BYDAY=SU");
    }

    #[test]
    fn escape_param_value_plain_and_quoted() {
        assert_eq!(escape_param_value("America/New_York"), "America/New_York");
        assert_eq!(escape_param_value("Hall A, Floor 2"), "\"Hall A, Floor 2\"");
        assert_eq!(escape_param_value("say \"hi\":"), "\"say ^'hi^':\"");
    }
}
