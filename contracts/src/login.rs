use crate::Form;
use std::{convert::TryFrom, error::Error, fmt::Display};

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Params {
    pub email: String,
    pub password: String,
}

impl Params {
    pub fn new(email: String, password: String) -> Result<Self, InvalidParams> {
        let email = email.trim().to_owned();
        if email.is_empty() {
            return Err(InvalidParams::EmailEmptyOrWhitespace);
        }
        if !email.contains('@') {
            return Err(InvalidParams::EmailNotAnAddress);
        }
        if password.is_empty() {
            return Err(InvalidParams::PasswordEmpty);
        }

        Ok(Self { email, password })
    }
}

impl TryFrom<&Form> for Params {
    type Error = InvalidParams;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let email = form
            .get("email")
            .ok_or(InvalidParams::MissingField("email"))?;
        let password = form
            .get("password")
            .ok_or(InvalidParams::MissingField("password"))?;

        Params::new(email.to_owned(), password.to_owned())
    }
}

#[derive(Debug)]
pub enum InvalidParams {
    MissingField(&'static str),
    EmailEmptyOrWhitespace,
    EmailNotAnAddress,
    PasswordEmpty,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::MissingField(field) => crate::missing_field_message(field),
            InvalidParams::EmailEmptyOrWhitespace => crate::empty_field_message("email"),
            InvalidParams::EmailNotAnAddress => "'email' is not a valid address".to_owned(),
            InvalidParams::PasswordEmpty => crate::empty_field_message("password"),
        };

        write!(f, "{}", output)
    }
}
