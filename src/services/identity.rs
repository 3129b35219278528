//! Registration and credential checks against the identity store.

use chrono::Utc;

use super::error::{ServiceError, ServiceResult};
use super::password::{hash_password, verify_password};
use crate::domain::{DuplicateField, NewUser, RegisterForm, Repository, User, ValidationErrors};

const PHONE_TAKEN: &str = "A user with this phone number already exists.";
const EMAIL_TAKEN: &str = "A user with this email already exists.";

/// Validates the form, checks uniqueness and persists a regular account.
pub async fn register(repo: &dyn Repository, form: &RegisterForm) -> ServiceResult<User> {
    // ---
    create_account(repo, form, false).await
}

/// Same as [`register`] but the account gets the staff and superuser flags.
pub async fn create_superuser(repo: &dyn Repository, form: &RegisterForm) -> ServiceResult<User> {
    // ---
    create_account(repo, form, true).await
}

async fn create_account(
    repo: &dyn Repository,
    form: &RegisterForm,
    privileged: bool,
) -> ServiceResult<User> {
    // ---
    let registration = form.validate()?;

    let mut errors = ValidationErrors::new();
    if repo
        .get_user_by_phone(&registration.phone_number)
        .await?
        .is_some()
    {
        errors.add("phone_number", PHONE_TAKEN);
    }
    if repo.get_user_by_email(&registration.email).await?.is_some() {
        errors.add("email", EMAIL_TAKEN);
    }
    if !errors.is_empty() {
        tracing::warn!(fields = %errors, "registration rejected");
        return Err(errors.into());
    }

    let new_user = NewUser {
        phone_number: registration.phone_number,
        first_name: registration.first_name,
        last_name: registration.last_name,
        email: registration.email,
        password_hash: hash_password(&registration.password)?,
        is_staff: privileged,
        is_superuser: privileged,
    };

    // A concurrent registration can still win the race; the unique
    // constraint reports it.
    let user = repo.create_user(new_user).await.map_err(|err| {
        let duplicate = err.downcast_ref::<DuplicateField>().map(|d| d.field);
        match duplicate {
            Some("email") => ValidationErrors::single("email", EMAIL_TAKEN).into(),
            Some(field) => ValidationErrors::single(field, PHONE_TAKEN).into(),
            None => ServiceError::Internal(err),
        }
    })?;

    tracing::info!(user_id = %user.id, superuser = privileged, "registered user");

    Ok(user)
}

/// Resolves a phone number and password to an active user and stamps `last_login`.
///
/// Unknown phone numbers, wrong passwords and inactive accounts are
/// indistinguishable to the caller.
pub async fn authenticate(
    repo: &dyn Repository,
    phone_number: &str,
    password: &str,
) -> ServiceResult<User> {
    // ---
    let Some(mut user) = repo.get_user_by_phone(phone_number.trim()).await? else {
        return Err(ServiceError::InvalidCredential);
    };

    let verified = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
        tracing::error!(user_id = %user.id, "stored password hash is unreadable: {e:#}");
        false
    });
    if !user.is_active || !verified {
        return Err(ServiceError::InvalidCredential);
    }

    let now = Utc::now();
    repo.record_login(user.id, now).await?;
    user.last_login = Some(now);

    Ok(user)
}
