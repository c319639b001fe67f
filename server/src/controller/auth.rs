use crate::app::{AppError, AppResult};
use chrono::Utc;
use contracts::{login, register, Form};
use database::{self as db, Database};
use ring::{
    digest,
    rand::{SecureRandom, SystemRandom},
};
use std::{convert::TryFrom, num::NonZeroU32, sync::Arc};

const PBKDF2_ITERATIONS: u32 = 100_000;

pub struct AuthController {
    user_db: Arc<Database<db::User>>,
}

impl AuthController {
    pub fn new(user_db: Arc<Database<db::User>>) -> Self {
        Self { user_db }
    }

    /// Creates an account with a salted PBKDF2 password hash. Fails if the
    /// email is already taken.
    pub async fn register(&self, form: &Form) -> AppResult<db::User> {
        let params = register::Params::try_from(form)?;

        if self.user_db.email_exists(&params.email)? {
            return Err(AppError::duplicate_email());
        }

        let rng = SystemRandom::new();
        let mut salt = [0u8; db::SALT_BYTE_LEN];
        rng.fill(&mut salt)
            .map_err(|e| AppError::internal_error().with_context(&e))?;

        let hashed_password = encrypt(&params.password, &salt);

        let id = self.user_db.insert_user(
            &params.name,
            &params.email,
            &hashed_password,
            &salt,
            Utc::now().timestamp(),
        )?;
        info!("registered user {} ({})", id, params.email);

        self.user_db
            .get_user(id)?
            .ok_or_else(AppError::internal_error)
    }

    /// Checks credentials and returns the user. Establishing a session is
    /// the caller's business.
    pub async fn authenticate(&self, form: &Form) -> AppResult<db::User> {
        let params = login::Params::try_from(form)?;

        let user = self
            .user_db
            .get_user_by_email(&params.email)?
            .ok_or_else(AppError::no_such_user)?;

        verify(&params.password, &user.salt, &user.password)
            .map_err(|_| AppError::invalid_password())?;

        Ok(user)
    }
}

fn encrypt(password: &str, salt: &[u8]) -> [u8; digest::SHA512_OUTPUT_LEN] {
    let mut hash = [0u8; digest::SHA512_OUTPUT_LEN];

    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA512,
        NonZeroU32::new(PBKDF2_ITERATIONS).unwrap(),
        salt,
        password.as_bytes(),
        &mut hash,
    );

    hash
}

fn verify(password: &str, salt: &[u8], hash: &[u8]) -> Result<(), ring::error::Unspecified> {
    ring::pbkdf2::verify(
        ring::pbkdf2::PBKDF2_HMAC_SHA512,
        NonZeroU32::new(PBKDF2_ITERATIONS).unwrap(),
        salt,
        password.as_bytes(),
        hash,
    )
}
