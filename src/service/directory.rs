use crate::{
    auth::{
        jwt::{TokenError, TokenService},
        password::{hash_password, verify_password},
    },
    error::{AppError, StoreError},
    model::{
        role::{BaseRole, Role},
        user::{NewUser, User, UserChanges},
    },
    models::{AdminUpdateUserInput, LoginInput, RegisterInput, UpdatePasswordInput, UpdateProfileInput},
    repository::{RoleRepository, UserRepository},
    utils::{pagination::Pagination, username_index::UsernameIndex},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const USERNAME_LEN: (usize, usize) = (3, 100);
const MIN_PASSWORD_LEN: usize = 6;
const ROLE_NAME_LEN: (usize, usize) = (3, 50);

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User with ID {0} not found")]
    UserNotFound(u64),
    #[error("Role with ID {0} not found")]
    RoleNotFound(u64),
    #[error("Username or Email already exists")]
    DuplicateUser,
    #[error("Role name already exists")]
    DuplicateRole,
    #[error("Invalid Role ID")]
    InvalidRole,
    #[error("{0}")]
    Validation(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Incorrect old password")]
    IncorrectPassword,
    #[error("You cannot delete your own account")]
    SelfDeletion,
    #[error("Base role '{0}' cannot be modified or deleted")]
    BaseRoleProtected(String),
    #[error("Role is still assigned to {0} user(s)")]
    RoleStillAssigned(u64),
    #[error("User still has schedule or attendance records")]
    UserStillReferenced,
    #[error("Choosing a role at registration is disabled")]
    RoleChoiceDisabled,
    #[error("failed to hash password: {0}")]
    Hashing(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        use DirectoryError::*;
        match err {
            UserNotFound(_) | RoleNotFound(_) => AppError::NotFound(err.to_string()),
            DuplicateUser | DuplicateRole | RoleStillAssigned(_) => AppError::Conflict(err.to_string()),
            InvalidRole => AppError::validation(err.to_string()),
            Validation(ref message) => AppError::validation_with("Validation failed", message),
            InvalidCredentials | IncorrectPassword => AppError::Unauthorized(err.to_string()),
            SelfDeletion | BaseRoleProtected(_) | RoleChoiceDisabled => AppError::Forbidden(err.to_string()),
            UserStillReferenced => AppError::ReferentialConflict(err.to_string()),
            Hashing(_) | Token(_) => AppError::internal("Failed to process credentials", err),
            Store(e) => AppError::internal("Failed to process user request", e),
        }
    }
}

/// Users, roles and credentials.
pub struct Directory {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    tokens: Arc<TokenService>,
    usernames: Arc<UsernameIndex>,
    /// Whether `register` honors a `role_id` other than Employee.
    role_choice: bool,
}

impl Directory {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        tokens: Arc<TokenService>,
        usernames: Arc<UsernameIndex>,
    ) -> Self {
        Self {
            users,
            roles,
            tokens,
            usernames,
            role_choice: true,
        }
    }

    pub fn with_role_choice(mut self, allowed: bool) -> Self {
        self.role_choice = allowed;
        self
    }

    pub async fn register(&self, input: &RegisterInput) -> Result<u64, DirectoryError> {
        let username = input.username.trim();
        validate_username(username)?;
        validate_email(&input.email)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DirectoryError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let role_id = match input.role_id {
            Some(id) => {
                let role = self.roles.find_by_id(id).await?.ok_or(DirectoryError::InvalidRole)?;
                if !self.role_choice && !role.name.eq_ignore_ascii_case(BaseRole::Employee.as_ref()) {
                    warn!(username, role_id = id, "Registration rejected: role choice disabled");
                    return Err(DirectoryError::RoleChoiceDisabled);
                }
                role.id
            }
            None => self
                .roles
                .find_by_name(BaseRole::Employee.as_ref())
                .await?
                .ok_or(DirectoryError::InvalidRole)?
                .id,
        };

        if !self.usernames.is_available(username, self.users.as_ref()).await? {
            debug!(username, "Username rejected by index pre-check");
            return Err(DirectoryError::DuplicateUser);
        }

        let password_hash = hash_password(&input.password).map_err(|e| DirectoryError::Hashing(e.to_string()))?;

        let id = self
            .users
            .create(&NewUser {
                username: username.to_string(),
                password_hash,
                email: input.email.trim().to_string(),
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role_id,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => DirectoryError::DuplicateUser,
                StoreError::InvalidReference => DirectoryError::InvalidRole,
                other => other.into(),
            })?;

        self.usernames.mark_taken(username).await;
        info!(user_id = id, username, role_id, "User registered");
        Ok(id)
    }

    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, input: &LoginInput) -> Result<String, DirectoryError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(DirectoryError::Validation("username and password are required".into()));
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            info!("Invalid credentials: user not found");
            return Err(DirectoryError::InvalidCredentials);
        };

        if !verify_password(&input.password, &user.password_hash) {
            info!(user_id = user.id, "Invalid credentials: password mismatch");
            return Err(DirectoryError::InvalidCredentials);
        }

        let role = user.role_name().unwrap_or_default();
        let token = self.tokens.issue(user.id, &user.username, role)?;
        info!(user_id = user.id, role, "Login successful");
        Ok(token)
    }

    pub async fn get_user(&self, id: u64) -> Result<User, DirectoryError> {
        self.users.find_by_id(id).await?.ok_or(DirectoryError::UserNotFound(id))
    }

    pub async fn list_users(&self, pagination: Pagination) -> Result<(Vec<User>, u64), DirectoryError> {
        Ok(self.users.list(pagination).await?)
    }

    pub async fn update_by_admin(&self, id: u64, input: &AdminUpdateUserInput) -> Result<(), DirectoryError> {
        if input.role_id == 0 || self.roles.find_by_id(input.role_id).await?.is_none() {
            return Err(DirectoryError::InvalidRole);
        }
        let changes = UserChanges {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role_id: input.role_id,
        };
        self.apply_changes(id, changes).await
    }

    pub async fn update_profile(&self, id: u64, input: &UpdateProfileInput) -> Result<(), DirectoryError> {
        let current = self.get_user(id).await?;
        let changes = UserChanges {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role_id: current.role_id,
        };
        self.apply_changes(id, changes).await
    }

    async fn apply_changes(&self, id: u64, changes: UserChanges) -> Result<(), DirectoryError> {
        validate_username(&changes.username)?;
        validate_email(&changes.email)?;

        let previous = self.get_user(id).await?;
        self.users.update(id, &changes).await.map_err(|e| match e {
            StoreError::NotFound => DirectoryError::UserNotFound(id),
            StoreError::Duplicate => DirectoryError::DuplicateUser,
            StoreError::InvalidReference => DirectoryError::InvalidRole,
            other => other.into(),
        })?;

        if !previous.username.eq_ignore_ascii_case(&changes.username) {
            self.usernames.forget(&previous.username).await;
            self.usernames.mark_taken(&changes.username).await;
        }
        info!(user_id = id, "User updated");
        Ok(())
    }

    pub async fn change_password(&self, id: u64, input: &UpdatePasswordInput) -> Result<(), DirectoryError> {
        if input.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DirectoryError::Validation(format!(
                "new_password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self.get_user(id).await?;
        if !verify_password(&input.old_password, &user.password_hash) {
            warn!(user_id = id, "Password change rejected: old password mismatch");
            return Err(DirectoryError::IncorrectPassword);
        }

        let password_hash = hash_password(&input.new_password).map_err(|e| DirectoryError::Hashing(e.to_string()))?;
        self.users
            .update_password(id, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => DirectoryError::UserNotFound(id),
                other => other.into(),
            })?;
        info!(user_id = id, "Password updated");
        Ok(())
    }

    pub async fn delete_user(&self, requester_id: u64, target_id: u64) -> Result<(), DirectoryError> {
        if requester_id == target_id {
            warn!(user_id = requester_id, "Self-deletion attempt rejected");
            return Err(DirectoryError::SelfDeletion);
        }

        let target = self.get_user(target_id).await?;
        self.users.delete(target_id).await.map_err(|e| match e {
            StoreError::NotFound => DirectoryError::UserNotFound(target_id),
            StoreError::StillReferenced => DirectoryError::UserStillReferenced,
            other => other.into(),
        })?;

        self.usernames.forget(&target.username).await;
        info!(user_id = target_id, deleted_by = requester_id, "User deleted");
        Ok(())
    }

    pub async fn create_role(&self, name: &str) -> Result<u64, DirectoryError> {
        let name = validate_role_name(name)?;
        let id = self.roles.create(name).await.map_err(|e| match e {
            StoreError::Duplicate => DirectoryError::DuplicateRole,
            other => other.into(),
        })?;
        info!(role_id = id, name, "Role created");
        Ok(id)
    }

    pub async fn get_role(&self, id: u64) -> Result<Role, DirectoryError> {
        self.roles.find_by_id(id).await?.ok_or(DirectoryError::RoleNotFound(id))
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
        Ok(self.roles.list().await?)
    }

    pub async fn update_role(&self, id: u64, name: &str) -> Result<(), DirectoryError> {
        let name = validate_role_name(name)?;
        let current = self.get_role(id).await?;
        if BaseRole::is_base(&current.name) {
            return Err(DirectoryError::BaseRoleProtected(current.name));
        }

        self.roles.update(id, name).await.map_err(|e| match e {
            StoreError::NotFound => DirectoryError::RoleNotFound(id),
            StoreError::Duplicate => DirectoryError::DuplicateRole,
            other => other.into(),
        })?;
        info!(role_id = id, name, "Role updated");
        Ok(())
    }

    pub async fn delete_role(&self, id: u64) -> Result<(), DirectoryError> {
        let current = self.get_role(id).await?;
        if BaseRole::is_base(&current.name) {
            return Err(DirectoryError::BaseRoleProtected(current.name));
        }

        let assigned = self.roles.count_users(id).await?;
        if assigned > 0 {
            return Err(DirectoryError::RoleStillAssigned(assigned));
        }

        self.roles.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => DirectoryError::RoleNotFound(id),
            StoreError::StillReferenced => DirectoryError::RoleStillAssigned(1),
            other => other.into(),
        })?;
        info!(role_id = id, "Role deleted");
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), DirectoryError> {
    let len = username.chars().count();
    let (min, max) = USERNAME_LEN;
    if len < min || len > max {
        return Err(DirectoryError::Validation(format!(
            "username must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DirectoryError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DirectoryError::Validation("email must be a valid address".into()));
    }
    Ok(())
}

fn validate_role_name(name: &str) -> Result<&str, DirectoryError> {
    let name = name.trim();
    let len = name.chars().count();
    let (min, max) = ROLE_NAME_LEN;
    if len < min || len > max {
        return Err(DirectoryError::Validation(format!(
            "role name must be between {min} and {max} characters"
        )));
    }
    Ok(name)
}
