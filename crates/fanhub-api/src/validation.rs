//! Input checks shared by the handlers. Each returns the cleaned value or a
//! `BadRequest` carrying a message fit for the client.

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_TAGS: usize = 10;
const MAX_TAG_CHARS: usize = 32;

pub fn username(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(3..=32).contains(&len) {
        return Err(AppError::BadRequest("Username must be 3-32 characters".into()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest("Username must not contain whitespace".into()));
    }
    Ok(name.to_string())
}

pub fn password(raw: &str) -> AppResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Trimmed, non-empty, at most `max_chars` characters.
pub fn text(field: &str, raw: &str, max_chars: usize) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn rating(raw: i64) -> AppResult<u8> {
    match u8::try_from(raw) {
        Ok(r @ 1..=5) => Ok(r),
        _ => Err(AppError::BadRequest("Rating must be between 1 and 5".into())),
    }
}

/// Trims, drops blanks and duplicates (first occurrence wins).
pub fn tags(raw: Vec<String>) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(AppError::BadRequest(format!(
                "Tags must be at most {MAX_TAG_CHARS} characters"
            )));
        }
        out.push(tag.to_string());
    }
    if out.len() > MAX_TAGS {
        return Err(AppError::BadRequest(format!("At most {MAX_TAGS} tags allowed")));
    }
    Ok(out)
}

/// Absolute http(s) URL or a site-relative path.
pub fn image_url(raw: &str) -> AppResult<String> {
    let url = text("Image URL", raw, 500)?;
    let ok = url.starts_with("http://") || url.starts_with("https://") || (url.starts_with('/') && !url.starts_with("//"));
    if !ok || url.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest(
            "Image URL must be an http(s) URL or a path starting with /".into(),
        ));
    }
    Ok(url)
}

pub fn limit(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert_eq!(username("  lin ").unwrap(), "lin");
        assert_eq!(username("书虫阿林").unwrap(), "书虫阿林");
        assert!(username("ab").is_err());
        assert!(username("two words").is_err());
        assert!(username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn ratings() {
        for ok in 1..=5 {
            assert_eq!(rating(ok).unwrap() as i64, ok);
        }
        for bad in [0, 6, -1, 300] {
            assert!(rating(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn tags_are_cleaned() {
        let cleaned = tags(vec![" plot ".into(), "".into(), "plot".into(), "cast".into()]).unwrap();
        assert_eq!(cleaned, vec!["plot", "cast"]);

        let too_many: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        assert!(tags(too_many).is_err());
        assert!(tags(vec!["x".repeat(33)]).is_err());
    }

    #[test]
    fn image_urls() {
        assert!(image_url("https://cdn.example.com/a.jpg").is_ok());
        assert!(image_url("/uploads/a.jpg").is_ok());
        assert!(image_url("//evil.example.com/a.jpg").is_err());
        assert!(image_url("javascript:alert(1)").is_err());
        assert!(image_url("   ").is_err());
    }

    #[test]
    fn text_limits() {
        assert_eq!(text("Content", "  hi  ", 5).unwrap(), "hi");
        assert!(text("Content", "   ", 5).is_err());
        assert!(text("Content", "toolong", 5).is_err());
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(limit(None, 50, 200), 50);
        assert_eq!(limit(Some(0), 50, 200), 1);
        assert_eq!(limit(Some(1000), 50, 200), 200);
    }
}
