//! Assembly of the prompt text delivered to an agent.

use std::path::PathBuf;

/// A file reference that has been checked to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Path as the caller gave it; the agent sees this exact string.
    pub path: PathBuf,
    /// Size in bytes at resolution time.
    pub size: u64,
}

/// Build the prompt text for an agent.
///
/// With nothing to add, the trimmed user prompt is returned unchanged.
/// Otherwise the text is split into sections:
///
/// ```text
/// === SYSTEM PROMPT ===
/// ...
///
/// === FILE REFERENCES ===
/// - src/auth.rs (1432 bytes)
///
/// === IMAGES ===
/// - screenshots/login.png
///
/// === USER REQUEST ===
/// ...
/// ```
pub fn compose_prompt(
    system_prompt: Option<&str>,
    files: &[FileReference],
    images: &[FileReference],
    user_prompt: &str,
) -> String {
    let user_prompt = user_prompt.trim();
    if system_prompt.is_none() && files.is_empty() && images.is_empty() {
        return user_prompt.to_string();
    }

    let mut sections = Vec::with_capacity(4);

    if let Some(system) = system_prompt {
        sections.push(format!("=== SYSTEM PROMPT ===\n{}", system.trim()));
    }

    if !files.is_empty() {
        let refs = files
            .iter()
            .map(|f| format!("- {} ({} bytes)", f.path.display(), f.size))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("=== FILE REFERENCES ===\n{}", refs));
    }

    if !images.is_empty() {
        let refs = images
            .iter()
            .map(|i| format!("- {}", i.path.display()))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("=== IMAGES ===\n{}", refs));
    }

    sections.push(format!("=== USER REQUEST ===\n{}", user_prompt));
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_prompt_is_only_trimmed() {
        assert_eq!(compose_prompt(None, &[], &[], "  hello world \n"), "hello world");
    }

    #[test]
    fn sections_in_order() {
        let files = vec![FileReference {
            path: PathBuf::from("src/auth.rs"),
            size: 12,
        }];
        let text = compose_prompt(Some("Be brief.\n"), &files, &[], "Review auth");
        assert_eq!(
            text,
            "=== SYSTEM PROMPT ===\nBe brief.\n\n\
             === FILE REFERENCES ===\n- src/auth.rs (12 bytes)\n\n\
             === USER REQUEST ===\nReview auth"
        );
    }

    #[test]
    fn files_without_system_prompt() {
        let files = vec![
            FileReference {
                path: PathBuf::from("a.txt"),
                size: 1,
            },
            FileReference {
                path: PathBuf::from("b.txt"),
                size: 2,
            },
        ];
        let text = compose_prompt(None, &files, &[], "Compare");
        assert!(text.starts_with("=== FILE REFERENCES ===\n- a.txt (1 bytes)\n- b.txt (2 bytes)"));
        assert!(text.ends_with("=== USER REQUEST ===\nCompare"));
    }

    #[test]
    fn images_listed_after_files() {
        let files = vec![FileReference {
            path: PathBuf::from("src/ui.rs"),
            size: 5,
        }];
        let images = vec![FileReference {
            path: PathBuf::from("shots/login.png"),
            size: 2048,
        }];
        let text = compose_prompt(None, &files, &images, "Why is the button hidden?");
        assert_eq!(
            text,
            "=== FILE REFERENCES ===\n- src/ui.rs (5 bytes)\n\n\
             === IMAGES ===\n- shots/login.png\n\n\
             === USER REQUEST ===\nWhy is the button hidden?"
        );
    }
}
