//! Registration rule table
//!
//! Every check is one `{field, rule, message}` row. Rows are evaluated in
//! order and all of them run; the messages of the failing rows form the
//! error list shown to the user.

use std::fmt;

use validator::ValidateEmail;

/// Characters that satisfy the "special character" part of the password
/// composition rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MAX_LEN: usize = 50;

pub const EMAIL_TAKEN_MESSAGE: &str =
    "The provided Email Address is already in use by another account";

/// A submitted registration form.
///
/// Missing fields deserialize as empty strings, which the `Required`
/// rule then reports.
#[derive(Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::EmailAddress => &self.email_address,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }
}

// Passwords never reach logs, including through `{:?}`.
impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email_address", &self.email_address)
            .field("password", &"[redacted]")
            .field("confirm_password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    EmailAddress,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Name used by the HTML form.
    pub fn form_name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::EmailAddress => "emailAddress",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Rejects the empty string.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    Email,
    /// At least one lowercase, uppercase, digit and special character,
    /// in any order.
    PasswordComposition,
    /// Exactly equal to another field.
    Matches(Field),
    /// No stored user has this email. Needs storage.
    UniqueEmail,
}

impl Rule {
    /// Evaluate a rule that needs nothing but the form. Returns `None` for
    /// rules that must consult storage.
    pub fn check(self, value: &str, form: &RegistrationForm) -> Option<bool> {
        let passed = match self {
            Rule::Required => !value.is_empty(),
            Rule::MaxLength(max) => value.chars().count() <= max,
            Rule::Email => value.validate_email() && has_top_level_domain(value),
            Rule::PasswordComposition => satisfies_composition(value),
            Rule::Matches(other) => value == form.value(other),
            Rule::UniqueEmail => return None,
        };
        Some(passed)
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct RuleRow {
    pub field: Field,
    pub rule: Rule,
    pub message: &'static str,
}

const fn row(field: Field, rule: Rule, message: &'static str) -> RuleRow {
    RuleRow {
        field,
        rule,
        message,
    }
}

pub const REGISTRATION_RULES: &[RuleRow] = &[
    row(Field::FirstName, Rule::Required, "Please provide a value for First Name"),
    row(
        Field::FirstName,
        Rule::MaxLength(NAME_MAX_LEN),
        "First Name must not be more than 50 characters long",
    ),
    row(Field::LastName, Rule::Required, "Please provide a value for Last Name"),
    row(
        Field::LastName,
        Rule::MaxLength(NAME_MAX_LEN),
        "Last Name must not be more than 50 characters long",
    ),
    row(Field::EmailAddress, Rule::Required, "Please provide a value for Email Address"),
    row(
        Field::EmailAddress,
        Rule::MaxLength(EMAIL_MAX_LEN),
        "Email Address must not be more than 255 characters long",
    ),
    row(Field::EmailAddress, Rule::Email, "Email Address is not a valid email"),
    row(Field::EmailAddress, Rule::UniqueEmail, EMAIL_TAKEN_MESSAGE),
    row(Field::Password, Rule::Required, "Please provide a value for Password"),
    row(
        Field::Password,
        Rule::MaxLength(PASSWORD_MAX_LEN),
        "Password must not be more than 50 characters long",
    ),
    row(
        Field::Password,
        Rule::PasswordComposition,
        "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
    ),
    row(
        Field::ConfirmPassword,
        Rule::Required,
        "Please provide a value for Confirm Password",
    ),
    row(
        Field::ConfirmPassword,
        Rule::MaxLength(PASSWORD_MAX_LEN),
        "Confirm Password must not be more than 50 characters long",
    ),
    row(
        Field::ConfirmPassword,
        Rule::Matches(Field::Password),
        "Confirm Password must match Password",
    ),
];

/// The domain must end in a real top-level label: two or more letters,
/// or an IDNA `xn--` label. Rejects `a@localhost`, `a@b` and IP literals.
fn has_top_level_domain(value: &str) -> bool {
    let Some((_, domain)) = value.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty() {
        return false;
    }
    let tld = tld.to_ascii_lowercase();
    if let Some(rest) = tld.strip_prefix("xn") {
        if rest.len() >= 2 && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return true;
        }
    }
    tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}

fn satisfies_composition(value: &str) -> bool {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;
    for c in value.chars() {
        lower |= c.is_ascii_lowercase();
        upper |= c.is_ascii_uppercase();
        digit |= c.is_ascii_digit();
        special |= SPECIAL_CHARACTERS.contains(c);
    }
    lower && upper && digit && special
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email_address: "ann@example.com".into(),
            password: "Abcdef1!".into(),
            confirm_password: "Abcdef1!".into(),
        }
    }

    fn failing(form: &RegistrationForm) -> Vec<&'static str> {
        REGISTRATION_RULES
            .iter()
            .filter(|s| s.rule.check(form.value(s.field), form) == Some(false))
            .map(|s| s.message)
            .collect()
    }

    #[test]
    fn valid_form_passes_local_rules() {
        assert!(failing(&form()).is_empty());
    }

    #[test]
    fn composition_is_presence_based() {
        assert!(satisfies_composition("Abcdef1!"));
        assert!(satisfies_composition("!1fedcbA"));
        assert!(satisfies_composition("1!aB"));
    }

    #[test]
    fn composition_requires_each_class() {
        for pw in ["abcdef1!", "ABCDEF1!", "Abcdefg!", "Abcdefg1", "Abcdef1?"] {
            assert!(!satisfies_composition(pw), "{pw} should be rejected");
        }
    }

    #[test]
    fn max_length_counts_characters() {
        let at_limit = "é".repeat(50);
        assert_eq!(Rule::MaxLength(50).check(&at_limit, &form()), Some(true));
        let over = "a".repeat(51);
        assert_eq!(Rule::MaxLength(50).check(&over, &form()), Some(false));
    }

    #[test]
    fn whitespace_counts_as_a_value() {
        assert_eq!(Rule::Required.check(" ", &form()), Some(true));
        assert_eq!(Rule::Required.check("", &form()), Some(false));
    }

    #[test]
    fn unique_email_needs_storage() {
        assert_eq!(Rule::UniqueEmail.check("ann@example.com", &form()), None);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let messages = failing(&RegistrationForm::default());
        assert_eq!(
            messages,
            vec![
                "Please provide a value for First Name",
                "Please provide a value for Last Name",
                "Please provide a value for Email Address",
                "Email Address is not a valid email",
                "Please provide a value for Password",
                "Password must contain at least 1 lowercase letter, uppercase letter, number, and special character (i.e. \"!@#$%^&*\")",
                "Please provide a value for Confirm Password",
            ]
        );
    }

    #[test]
    fn one_character_confirmation_mismatch() {
        let mut f = form();
        f.confirm_password = "Abcdef1@".into();
        assert_eq!(failing(&f), vec!["Confirm Password must match Password"]);
    }

    #[test]
    fn invalid_email_syntax() {
        let mut f = form();
        f.email_address = "ann.example.com".into();
        assert_eq!(failing(&f), vec!["Email Address is not a valid email"]);
    }

    #[test]
    fn email_domain_needs_top_level_label() {
        for email in ["a@b", "a@localhost", "ann@[127.0.0.1]", "ann@example.c", "ann@example.123"] {
            assert_eq!(Rule::Email.check(email, &form()), Some(false), "{email}");
        }
        for email in ["a@b.co", "ann@mail.example.com", "ann@example.xn--p1ai"] {
            assert_eq!(Rule::Email.check(email, &form()), Some(true), "{email}");
        }
    }

    #[test]
    fn debug_redacts_passwords() {
        let rendered = format!("{:?}", form());
        assert!(!rendered.contains("Abcdef1!"));
        assert!(rendered.contains("ann@example.com"));
    }

    #[test]
    fn form_names_match_html() {
        assert_eq!(Field::EmailAddress.form_name(), "emailAddress");
        assert_eq!(Field::ConfirmPassword.form_name(), "confirmPassword");
    }
}
