use crate::types::{CategoryRequest, CategoryType, ExpenseRequest, LoginRequest, RegisterRequest};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Loose structural email check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn check_name(field: &str, value: &str, errors: &mut Vec<String>) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(format!("{} is required", field));
    } else if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        errors.push(format!(
            "{} must be between {} and {} characters",
            field, NAME_MIN_LEN, NAME_MAX_LEN
        ));
    }
}

fn check_email(value: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push("email is required".to_string());
    } else if !is_valid_email(value) {
        errors.push("email must be a valid email address".to_string());
    }
}

/// Returns every violation found; an empty vector means the request is valid.
pub fn validate_register(request: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();
    check_name("name", &request.name, &mut errors);
    check_email(&request.email, &mut errors);

    if request.password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }

    errors
}

pub fn validate_login(request: &LoginRequest) -> Vec<String> {
    let mut errors = Vec::new();
    check_email(&request.email, &mut errors);

    if request.password.is_empty() {
        errors.push("password is required".to_string());
    }

    errors
}

pub fn validate_category(request: &CategoryRequest) -> Vec<String> {
    let mut errors = Vec::new();
    check_name("name", &request.name, &mut errors);

    if request.category_type.parse::<CategoryType>().is_err() {
        errors.push("type must be one of: expense, income".to_string());
    }

    errors
}

pub fn validate_expense(request: &ExpenseRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }

    if !request.amount.is_finite() || request.amount <= 0.0 {
        errors.push("amount must be greater than 0".to_string());
    }

    errors
}
