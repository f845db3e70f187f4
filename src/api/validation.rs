use super::ApiError;
use crate::constants::{account, limits};

pub fn validate_login(login: &str) -> Result<&str, ApiError> {
    if login.is_empty() {
        return Err(ApiError::validation("Login cannot be empty"));
    }

    if login.chars().count() > account::LOGIN_MAX_LENGTH {
        return Err(ApiError::validation(format!(
            "Login must be {} characters or less",
            account::LOGIN_MAX_LENGTH
        )));
    }

    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'))
    {
        return Err(ApiError::validation(
            "Login can only contain letters, digits and the characters _ . @ -",
        ));
    }

    Ok(login)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    let len = password.chars().count();
    if !(account::PASSWORD_MIN_LENGTH..=account::PASSWORD_MAX_LENGTH).contains(&len) {
        return Err(ApiError::validation(format!(
            "Password must be between {} and {} characters",
            account::PASSWORD_MIN_LENGTH,
            account::PASSWORD_MAX_LENGTH
        )));
    }
    Ok(password)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ApiError::validation(format!("Invalid email: {}", email)));
    }
    Ok(trimmed)
}

/// Parse a catalog id from the URL. Integers outside the `i32` key range
/// cannot name a row, so they are reported as not found.
pub fn catalog_id(resource: &str, raw: &str) -> Result<i32, ApiError> {
    if let Ok(id) = raw.parse::<i32>() {
        return Ok(id);
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::not_found(resource, raw));
    }

    Err(ApiError::validation(format!("Invalid {} id: {}", resource.to_lowercase(), raw)))
}

/// Turn a one-based `page` and `per_page` into a zero-based page index and a
/// capped page size.
pub fn validate_page(page: Option<u64>, per_page: Option<u64>) -> Result<(u64, u64), ApiError> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation("Page numbers start at 1"));
    }

    let per_page = per_page
        .unwrap_or(limits::DEFAULT_PAGE_SIZE)
        .min(limits::MAX_PAGE_SIZE);
    if per_page == 0 {
        return Err(ApiError::validation("per_page must be positive"));
    }

    let index = page - 1;
    if index
        .checked_mul(per_page)
        .is_none_or(|offset| offset > limits::MAX_ROW_OFFSET)
    {
        return Err(ApiError::validation(format!("Page {} is out of range", page)));
    }

    Ok((index, per_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert!(validate_login("johndoe").is_ok());
        assert!(validate_login("john.doe@localhost").is_ok());
        assert!(validate_login("j_d-1").is_ok());
        assert!(validate_login("").is_err());
        assert!(validate_login("a".repeat(51).as_str()).is_err());
        assert!(validate_login("john doe").is_err());
        assert!(validate_login("jöhn").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abcd").is_ok());
        assert!(validate_password("a".repeat(100).as_str()).is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password("a".repeat(101).as_str()).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" john.doe@localhost ").ok(),
            Some("john.doe@localhost")
        );
        assert!(validate_email("localhost").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_catalog_id() {
        assert_eq!(catalog_id("Author", "42").ok(), Some(42));
        assert!(matches!(
            catalog_id("Author", "9223372036854775807"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            catalog_id("Author", "-99999999999999999999"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            catalog_id("Author", "abc"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(catalog_id("Author", "-"), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None, None).ok(), Some((0, 20)));
        assert_eq!(validate_page(Some(3), Some(10)).ok(), Some((2, 10)));
        assert_eq!(validate_page(Some(1), Some(500)).ok(), Some((0, 100)));
        assert!(validate_page(Some(0), None).is_err());
        assert!(validate_page(None, Some(0)).is_err());
    }

    #[test]
    fn test_validate_page_rejects_overflowing_offsets() {
        assert!(validate_page(Some(u64::MAX), Some(100)).is_err());
        assert!(validate_page(Some(u64::MAX / 2), Some(20)).is_err());

        let last = limits::MAX_ROW_OFFSET / 10 + 1;
        assert_eq!(validate_page(Some(last), Some(10)).ok(), Some((last - 1, 10)));
        assert!(validate_page(Some(last + 1), Some(10)).is_err());
    }
}
