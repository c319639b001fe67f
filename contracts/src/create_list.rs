use crate::Form;
use std::{convert::TryFrom, error::Error, fmt::Display};

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Params {
    pub name: String,
}

impl Params {
    pub fn new(name: String) -> Result<Self, InvalidParams> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Err(InvalidParams::NameEmptyOrWhitespace)
        } else {
            Ok(Self {
                name: trimmed.to_owned(),
            })
        }
    }
}

impl TryFrom<&Form> for Params {
    type Error = InvalidParams;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let name = form.get("name").ok_or(InvalidParams::MissingField("name"))?;

        Params::new(name.to_owned())
    }
}

#[derive(Debug)]
pub enum InvalidParams {
    MissingField(&'static str),
    NameEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::MissingField(field) => crate::missing_field_message(field),
            InvalidParams::NameEmptyOrWhitespace => crate::empty_field_message("name"),
        };

        write!(f, "{}", output)
    }
}
