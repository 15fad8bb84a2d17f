//! Field rules shared by registration and profile editing.
//!
//! Each check returns the human-readable problems it found; an empty list means the value is fine.

pub const USERNAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;

/// Lowercases and trims, the form every username is stored in.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn username_problems(username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if username.is_empty() {
        problems.push("Username is required.".to_owned());
    } else if username.chars().count() > USERNAME_MAX {
        problems.push(format!("Username must be at most {USERNAME_MAX} characters."));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "@.+-_".contains(c))
    {
        problems.push("Username may contain only letters, digits and @/./+/-/_ characters.".to_owned());
    }

    problems
}

pub fn password_problems(username: &str, password1: &str, password2: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if password1 != password2 {
        problems.push("The two password fields didn't match.".to_owned());
    }
    if password1.chars().count() < PASSWORD_MIN {
        problems.push(format!("This password is too short. It must contain at least {PASSWORD_MIN} characters."));
    }
    if !password1.is_empty() && password1.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }
    if !username.is_empty() && password1.to_lowercase() == username {
        problems.push("The password is too similar to the username.".to_owned());
    }

    problems
}

/// Loose `local@domain.tld` shape check; empty means "no email".
pub fn email_problems(email: &str) -> Vec<String> {
    if email.is_empty() {
        return Vec::new();
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Vec::new()
    } else {
        vec!["Enter a valid email address.".to_owned()]
    }
}
