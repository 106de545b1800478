use std::io::{self, Write};

/// Turn a wire-protocol field name into a C++ member identifier
pub(super) fn sanitize_name(s: &str) -> &str {
    match s.trim_matches('_') {
        "default" => "def",
        trimmed => trimmed,
    }
}

/// Write `text` as `//` line comments, each line prefixed by `indent`
pub(super) fn write_comment(w: &mut impl Write, indent: &str, text: &str) -> io::Result<()> {
    for line in text.split('\n') {
        if line.is_empty() {
            writeln!(w, "{indent}//")?;
        } else {
            writeln!(w, "{indent}// {line}")?;
        }
    }
    Ok(())
}
