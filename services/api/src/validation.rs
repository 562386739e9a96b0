//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a product price. The field is required and must be a real,
/// non-negative number.
pub fn validate_price(price: Option<f64>) -> Result<f64, String> {
    let Some(price) = price else {
        return Err("Invalid price format".to_string());
    };

    if !price.is_finite() {
        return Err("Invalid price format".to_string());
    }

    if price < 0.0 {
        return Err("Price cannot be negative".to_string());
    }

    Ok(price)
}

/// Validate a product's category tag set.
pub fn validate_categories(categories: &[String]) -> Result<(), String> {
    if categories.len() > 20 {
        return Err("A product can have at most 20 categories".to_string());
    }

    for tag in categories {
        if tag.trim().is_empty() {
            return Err("Category tags cannot be empty".to_string());
        }
        if tag.len() > 50 {
            return Err("Category tags must be at most 50 characters long".to_string());
        }
    }

    Ok(())
}

/// Validate a profile description.
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("Description cannot be empty".to_string());
    }

    if description.len() > 2000 {
        return Err("Description must be at most 2000 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_must_be_simple_identifiers() {
        assert!(validate_username("alice_99").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has spaces").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn emails_are_roughly_checked() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn passwords_are_length_bounded() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn price_is_required_and_sane() {
        assert_eq!(validate_price(Some(9.99)), Ok(9.99));
        assert_eq!(validate_price(Some(0.0)), Ok(0.0));
        assert!(validate_price(None).is_err());
        assert!(validate_price(Some(f64::NAN)).is_err());
        assert!(validate_price(Some(f64::INFINITY)).is_err());
        assert!(validate_price(Some(-1.0)).is_err());
    }

    #[test]
    fn category_tags_are_bounded() {
        assert!(validate_categories(&["Gadgets".to_string()]).is_ok());
        assert!(validate_categories(&[]).is_ok());
        assert!(validate_categories(&[" ".to_string()]).is_err());
        assert!(validate_categories(&["x".repeat(51)]).is_err());
        let too_many: Vec<String> = (0..21).map(|i| format!("tag{i}")).collect();
        assert!(validate_categories(&too_many).is_err());
    }

    #[test]
    fn descriptions_cannot_be_blank() {
        assert!(validate_description("I collect widgets.").is_ok());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"x".repeat(2001)).is_err());
    }
}
