//! Field rules for affiliate sign-up.

use crate::affiliate::error::RegistrationError;
use crate::affiliate::types::NewRegistration;
use crate::auth::check_password_policy;

/// Trims and lowercases a username so lookups are case-insensitive.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Returns true if `utm_id` is 1-64 characters of `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_utm_id(utm_id: &str) -> bool {
    (1..=64).contains(&utm_id.len())
        && utm_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_valid_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn mobile_digits(mobile: &str) -> Option<String> {
    let stripped = mobile.trim().strip_prefix('+').unwrap_or(mobile.trim());
    let mut digits = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' => {}
            _ => return None,
        }
    }
    (10..=15).contains(&digits.len()).then_some(digits)
}

/// Validates a sign-up and returns it with normalized fields.
///
/// Username is lowercased, text fields are trimmed, and an empty UTM id
/// becomes `None`. The password is checked against the policy but left as is.
///
/// # Errors
///
/// Returns the first rule the input breaks.
pub fn validate_registration(input: NewRegistration) -> Result<NewRegistration, RegistrationError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(RegistrationError::MissingField("name"));
    }

    let email = input.email.trim().to_string();
    if email.is_empty() {
        return Err(RegistrationError::MissingField("email"));
    }
    if !is_valid_email(&email) {
        return Err(RegistrationError::InvalidEmail);
    }

    if input.mobile.trim().is_empty() {
        return Err(RegistrationError::MissingField("mobile"));
    }
    let mobile = mobile_digits(&input.mobile).ok_or(RegistrationError::InvalidMobile)?;

    let username = normalize_username(&input.username);
    if username.is_empty() {
        return Err(RegistrationError::MissingField("username"));
    }
    if !is_valid_username(&username) {
        return Err(RegistrationError::InvalidUsername);
    }

    check_password_policy(&input.password)?;

    let utm_id = match input.utm_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(utm) if is_valid_utm_id(utm) => Some(utm.to_string()),
        Some(_) => return Err(RegistrationError::InvalidUtmId),
    };

    Ok(NewRegistration {
        name,
        email,
        social_link: input.social_link.trim().to_string(),
        mobile,
        username,
        password: input.password,
        utm_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid() -> NewRegistration {
        NewRegistration {
            name: "  Asha Rao ".into(),
            email: "asha@example.com".into(),
            social_link: " https://instagram.com/asha ".into(),
            mobile: "+91 98765-43210".into(),
            username: " Asha.R ".into(),
            password: "s3cret-pass".into(),
            utm_id: Some("  ".into()),
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let out = validate_registration(valid()).unwrap();

        assert_eq!(out.name, "Asha Rao");
        assert_eq!(out.username, "asha.r");
        assert_eq!(out.mobile, "919876543210");
        assert_eq!(out.social_link, "https://instagram.com/asha");
        assert_eq!(out.utm_id, None);
        assert_eq!(out.password, "s3cret-pass");
    }

    #[test]
    fn test_requested_utm_id_kept() {
        let mut input = valid();
        input.utm_id = Some(" asha_01 ".into());
        assert_eq!(
            validate_registration(input).unwrap().utm_id.as_deref(),
            Some("asha_01")
        );
    }

    #[rstest]
    #[case::no_name(|r: &mut NewRegistration| r.name = " ".into(), "name is required")]
    #[case::bad_email(|r: &mut NewRegistration| r.email = "asha.example.com".into(), "email address is invalid")]
    #[case::email_two_ats(|r: &mut NewRegistration| r.email = "a@b@c.com".into(), "email address is invalid")]
    #[case::short_mobile(|r: &mut NewRegistration| r.mobile = "12345".into(), "mobile number must contain 10 to 15 digits")]
    #[case::letters_in_mobile(|r: &mut NewRegistration| r.mobile = "98765abc10".into(), "mobile number must contain 10 to 15 digits")]
    #[case::username_spaces(|r: &mut NewRegistration| r.username = "asha rao".into(), "username must be 3-32 characters of letters, digits, '.', '_' or '-'")]
    #[case::bad_utm(|r: &mut NewRegistration| r.utm_id = Some("utm id".into()), "UTM id must be 1-64 characters of letters, digits, '_' or '-'")]
    fn test_invalid_registrations(
        #[case] mutate: fn(&mut NewRegistration),
        #[case] message: &str,
    ) {
        let mut input = valid();
        mutate(&mut input);
        let err = validate_registration(input).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn test_weak_password_rejected() {
        let mut input = valid();
        input.password = "short".into();
        assert!(matches!(
            validate_registration(input),
            Err(RegistrationError::Password(_))
        ));
    }

    #[rstest]
    #[case("utm-01", true)]
    #[case("Summer_Sale", true)]
    #[case("", false)]
    #[case("has space", false)]
    #[case("emoji🙂", false)]
    fn test_utm_id_rules(#[case] utm: &str, #[case] ok: bool) {
        assert_eq!(is_valid_utm_id(utm), ok);
    }
}
