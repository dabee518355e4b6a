use chrono::{DateTime, Utc};

use super::domain::{
    is_known_department, AdminRegistration, Level, NewAdmin, NewStudent, StudentRegistration,
};
use crate::workflows::validation::{is_valid_email, is_valid_phone, required, ValidationErrors};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered";
pub const DUPLICATE_USERNAME_MESSAGE: &str = "This username is already taken";

const MIN_USERNAME_LEN: usize = 3;

/// Turns raw signup forms into validated records, collecting every field problem.
#[derive(Debug, Clone, Default)]
pub struct RegistrationGuard;

impl RegistrationGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn student(
        &self,
        registration: StudentRegistration,
        registered_at: DateTime<Utc>,
    ) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = required(
            &mut errors,
            "first_name",
            &registration.first_name,
            "First name is required",
        );
        let last_name = required(
            &mut errors,
            "last_name",
            &registration.last_name,
            "Last name is required",
        );
        let email = checked_email(&mut errors, &registration.email);

        let phone = required(
            &mut errors,
            "phone",
            &registration.phone,
            "Phone number is required",
        );
        if !phone.is_empty() && !is_valid_phone(&phone) {
            errors.add("phone", "Please enter a valid phone number");
        }

        let level = checked_level(&mut errors, &registration.level);
        let department = checked_department(&mut errors, &registration.department);

        match level {
            Some(level) if errors.is_empty() => Ok(NewStudent {
                first_name,
                last_name,
                email,
                phone,
                level,
                department,
                notification_preference: registration.notification_preference,
                email_notifications: registration.email_notifications,
                sms_notifications: registration.sms_notifications,
                registration_date: registered_at,
            }),
            _ => Err(errors),
        }
    }

    pub fn admin(
        &self,
        registration: AdminRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<NewAdmin, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = required(
            &mut errors,
            "username",
            &registration.username,
            "Username is required",
        );
        if !username.is_empty() && username.chars().count() < MIN_USERNAME_LEN {
            errors.add("username", "Username must be at least 3 characters");
        }

        let email = checked_email(&mut errors, &registration.email);
        let first_name = required(
            &mut errors,
            "first_name",
            &registration.first_name,
            "First name is required",
        );
        let last_name = required(
            &mut errors,
            "last_name",
            &registration.last_name,
            "Last name is required",
        );
        let department = checked_department(&mut errors, &registration.department);

        errors.into_result(NewAdmin {
            username,
            email,
            first_name,
            last_name,
            department,
            role: registration.role,
            created_at,
        })
    }
}

/// Validation applied to the student lookup box before searching the roster.
pub fn lookup_email(raw: &str) -> Result<&str, ValidationErrors> {
    if raw.trim().is_empty() {
        return Err(ValidationErrors::single(
            "email",
            "Please enter an email address",
        ));
    }
    if !is_valid_email(raw) {
        return Err(ValidationErrors::single(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(raw)
}

fn checked_email(errors: &mut ValidationErrors, raw: &str) -> String {
    let email = required(errors, "email", raw, "Email is required");
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Please enter a valid email address");
    }
    email
}

fn checked_level(errors: &mut ValidationErrors, raw: &str) -> Option<Level> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add("level", "Academic level is required");
        return None;
    }
    match trimmed.parse::<Level>() {
        Ok(level) => Some(level),
        Err(err) => {
            errors.add("level", err.to_string());
            None
        }
    }
}

fn checked_department(errors: &mut ValidationErrors, raw: &str) -> String {
    let department = required(errors, "department", raw, "Department is required");
    if !department.is_empty() && !is_known_department(&department) {
        errors.add("department", format!("Unknown department '{department}'"));
    }
    department
}
