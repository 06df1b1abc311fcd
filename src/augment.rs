//! Question augmentation.
//!
//! Appends the attached file's URL and extension to a question so the agent
//! knows where to fetch it and how to read it.

/// Placeholder URL for questions without an attached file.
pub const NO_FILE_URL: &str = "No URL provided";

/// Extension of a file name: the text after its last `.`.
///
/// A name without a dot yields the whole name. An absent name yields "".
pub fn file_extension(file_name: Option<&str>) -> &str {
    match file_name {
        Some(name) => name.rsplit('.').next().unwrap_or_default(),
        None => "",
    }
}

/// URL of the file attached to a task, or [`NO_FILE_URL`].
pub fn file_url(task_id: &str, file_name: Option<&str>, base_url: &str) -> String {
    match file_name {
        Some(name) if !name.is_empty() => {
            format!("{}/files/{}", base_url.trim_end_matches('/'), task_id)
        }
        _ => NO_FILE_URL.to_string(),
    }
}

/// Append `file_url` and `file_extension` lines to a question.
pub fn augment_question(
    task_id: &str,
    question: &str,
    file_name: Option<&str>,
    base_url: &str,
) -> String {
    let file_name = file_name.filter(|n| !n.is_empty());
    format!(
        "{}\n\nfile_url : {} \nfile_extension : {}",
        question,
        file_url(task_id, file_name, base_url),
        file_extension(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://scoring.example";

    #[test]
    fn test_with_file() {
        let text = augment_question("2", "Read file", Some("data.csv"), BASE);
        assert_eq!(
            text,
            "Read file\n\nfile_url : https://scoring.example/files/2 \nfile_extension : csv"
        );
    }

    #[test]
    fn test_without_file() {
        let text = augment_question("1", "What is 2+2?", None, BASE);
        assert!(text.contains("file_url : No URL provided"));
        assert!(text.ends_with("file_extension : "));
    }

    #[test]
    fn test_empty_file_name_counts_as_absent() {
        let text = augment_question("1", "Q", Some(""), BASE);
        assert!(text.contains(NO_FILE_URL));
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(file_extension(Some("archive.tar.gz")), "gz");
        assert_eq!(file_extension(Some("Makefile")), "Makefile");
        assert_eq!(file_extension(Some("trailing.")), "");
        assert_eq!(file_extension(None), "");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(
            file_url("abc", Some("a.png"), "https://scoring.example/"),
            "https://scoring.example/files/abc"
        );
    }
}
