//! Shared styling helpers for terminal output

use console::Style;

/// Green check mark followed by `msg`
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Red cross followed by `msg`
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Yellow warning sign followed by `msg`
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// `#n` root label, 0-based index in, 1-based label out
pub fn root_label(idx: usize) -> String {
    Style::new().cyan().bold().apply_to(format!("#{}", idx + 1)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_keep_message() {
        assert!(success("done").ends_with("done"));
        assert!(error("failed").ends_with("failed"));
        assert!(warn("careful").contains("careful"));
        assert!(header("Title").contains("Title"));
        assert!(root_label(0).contains("#1"));
    }
}
