use crate::Form;
use std::{convert::TryFrom, error::Error, fmt::Display};

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Params {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Params {
    pub fn new(name: String, email: String, password: String) -> Result<Self, InvalidParams> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(InvalidParams::NameEmptyOrWhitespace);
        }

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

        Ok(Self {
            name,
            email,
            password,
        })
    }
}

impl TryFrom<&Form> for Params {
    type Error = InvalidParams;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let name = form.get("name").ok_or(InvalidParams::MissingField("name"))?;
        let email = form
            .get("email")
            .ok_or(InvalidParams::MissingField("email"))?;
        let password = form
            .get("password")
            .ok_or(InvalidParams::MissingField("password"))?;

        Params::new(name.to_owned(), email.to_owned(), password.to_owned())
    }
}

#[derive(Debug)]
pub enum InvalidParams {
    MissingField(&'static str),
    NameEmptyOrWhitespace,
    EmailEmptyOrWhitespace,
    EmailNotAnAddress,
    PasswordEmpty,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::MissingField(field) => crate::missing_field_message(field),
            InvalidParams::NameEmptyOrWhitespace => crate::empty_field_message("name"),
            InvalidParams::EmailEmptyOrWhitespace => crate::empty_field_message("email"),
            InvalidParams::EmailNotAnAddress => "'email' is not a valid address".to_owned(),
            InvalidParams::PasswordEmpty => crate::empty_field_message("password"),
        };

        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_registration() {
        let form: Form = "name=Ann&email=ann%40x.com&password=pw1".parse().unwrap();
        let params = Params::try_from(&form).unwrap();

        assert_eq!(params.name, "Ann");
        assert_eq!(params.email, "ann@x.com");
    }

    #[test]
    fn trims_name_and_email() {
        let params = Params::new(
            "  Ann ".to_owned(),
            " ann@x.com ".to_owned(),
            "pw1".to_owned(),
        )
        .unwrap();

        assert_eq!(params.name, "Ann");
        assert_eq!(params.email, "ann@x.com");
    }

    #[test]
    fn rejects_whitespace_name() {
        assert!(matches!(
            Params::new("   ".to_owned(), "ann@x.com".to_owned(), "pw1".to_owned()),
            Err(InvalidParams::NameEmptyOrWhitespace)
        ));
    }
}
