/// Cuts `text` to at most `max_chars` characters on a word boundary, adding an ellipsis.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(i) if i > 0 => &cut[..i],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Short label for an image reference; data URLs are far too long to print.
pub fn describe_image(image: &str) -> String {
    match image.split_once(";base64,") {
        Some((_, payload)) if image.starts_with("data:") => {
            format!("[generated image, {} KB]", payload.len() * 3 / 4 / 1024)
        }
        _ => format!("[photo: {}]", image),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_words() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("hello there general kenobi", 14), "hello there…");
        assert_eq!(preview("abcdefghij", 4), "abcd…");
    }

    #[test]
    fn describe_image_hides_payload() {
        let data_url = format!("data:image/png;base64,{}", "A".repeat(4096));
        assert_eq!(describe_image(&data_url), "[generated image, 3 KB]");
        assert_eq!(
            describe_image("https://loremflickr.com/400/600/portrait,man?lock=3"),
            "[photo: https://loremflickr.com/400/600/portrait,man?lock=3]"
        );
    }
}
