//! Terminal rendering of generated markdown-ish text.

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Turn `**x**` into bold and drop `###` heading markers.
///
/// An unmatched `**` is kept as-is.
pub fn emphasize(text: &str) -> String {
    let text = text.replace("###", "");
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(BOLD);
        out.push_str(&after[..close]);
        out.push_str(RESET);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

/// Remove the emphasis markers without styling, for non-terminal output.
pub fn plain(text: &str) -> String {
    text.replace("###", "").replace("**", "")
}
