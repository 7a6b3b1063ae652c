/// Lowercased file stem where every character outside `[A-Za-z0-9]` becomes
/// `_`.
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `<sanitized-title>_roadmap.pdf`
pub fn export_file_name(title: &str) -> String {
    format!("{}_roadmap.pdf", sanitize_file_stem(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_everything_but_ascii_alphanumerics() {
        assert_eq!(sanitize_file_stem("Learn Rust: 2024!"), "learn_rust__2024_");
        assert_eq!(sanitize_file_stem("Über"), "_ber");
    }

    #[test]
    fn file_name_has_roadmap_suffix() {
        assert_eq!(export_file_name("Web Dev"), "web_dev_roadmap.pdf");
    }
}
