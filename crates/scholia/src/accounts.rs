//! Local user registry.
//!
//! Credentials are kept and compared in plain text in the store. This is a
//! single-user convenience registry, not an authentication system.

use std::fmt;

use base64::Engine;
use log::info;
use serde::{Deserialize, Serialize};

use crate::store::{load_json, save_json, KeyValueStore};
use crate::Result;

/// Key of the registered users list.
pub const USERS_KEY: &str = "scholia_users";
/// Key of the signed-in user.
pub const CURRENT_USER_KEY: &str = "current_user";
/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in user, as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier, used to key the user's history.
    pub id: String,
    /// The username.
    pub name: String,
    /// The e-mail address, possibly empty.
    pub email: String,
    /// Whether the account belongs to a student.
    pub is_student: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    password: String,
}

/// Why an account operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// The password is shorter than [`MIN_PASSWORD_LEN`].
    PasswordTooShort,
    /// The username or e-mail is taken.
    AlreadyRegistered,
    /// No user has this username.
    UnknownUser,
    /// The password does not match.
    WrongPassword,
    /// The username is blank.
    MissingUsername,
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::PasswordTooShort => write!(
                f,
                "the password must have at least {MIN_PASSWORD_LEN} characters"
            ),
            AccountError::AlreadyRegistered => {
                f.write_str("this username or e-mail is already registered, try logging in")
            }
            AccountError::UnknownUser => {
                f.write_str("user not registered, sign up to create an account")
            }
            AccountError::WrongPassword => f.write_str("wrong password, please try again"),
            AccountError::MissingUsername => f.write_str("the username must not be empty"),
        }
    }
}

impl std::error::Error for AccountError {}

/// Sign-up, log-in and session state on top of a [`KeyValueStore`].
pub struct Accounts<S> {
    store: S,
}

impl<S: KeyValueStore> Accounts<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn users(&self) -> Result<Vec<StoredUser>> {
        Ok(load_json(&self.store, USERS_KEY)?.unwrap_or_default())
    }

    /// Registers a user and signs them in.
    pub fn sign_up(&mut self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(AccountError::MissingUsername.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort.into());
        }

        let mut users = self.users()?;
        let taken = users.iter().any(|u| {
            u.user.name == username || (!email.is_empty() && u.user.email == email)
        });
        if taken {
            return Err(AccountError::AlreadyRegistered.into());
        }

        let seed = if email.is_empty() {
            format!("{username}{}", chrono::Utc::now().timestamp_millis())
        } else {
            email.to_owned()
        };
        let user = User {
            id: base64::engine::general_purpose::STANDARD.encode(seed),
            name: username.to_owned(),
            email: email.to_owned(),
            is_student: true,
        };

        users.push(StoredUser {
            user: user.clone(),
            password: password.to_owned(),
        });
        save_json(&mut self.store, USERS_KEY, &users)?;
        self.set_current(&user)?;

        info!("accounts: registered {}", user.name);
        Ok(user)
    }

    /// Signs a registered user in.
    pub fn log_in(&mut self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let users = self.users()?;
        let found = users
            .into_iter()
            .find(|u| u.user.name == username)
            .ok_or(AccountError::UnknownUser)?;
        if found.password != password {
            return Err(AccountError::WrongPassword.into());
        }

        self.set_current(&found.user)?;
        info!("accounts: {} logged in", found.user.name);
        Ok(found.user)
    }

    /// Signs the current user out.
    pub fn log_out(&mut self) -> Result<()> {
        self.store.remove(CURRENT_USER_KEY)
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Result<Option<User>> {
        load_json(&self.store, CURRENT_USER_KEY)
    }

    fn set_current(&mut self, user: &User) -> Result<()> {
        save_json(&mut self.store, CURRENT_USER_KEY, user)
    }
}
