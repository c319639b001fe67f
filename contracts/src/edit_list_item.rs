use crate::Form;
use std::{convert::TryFrom, error::Error, fmt::Display};

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Params {
    pub body: String,
}

impl Params {
    pub fn new(body: String) -> Result<Self, InvalidParams> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            Err(InvalidParams::BodyEmptyOrWhitespace)
        } else {
            Ok(Self {
                body: trimmed.to_owned(),
            })
        }
    }
}

impl TryFrom<&Form> for Params {
    type Error = InvalidParams;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let body = form.get("body").ok_or(InvalidParams::MissingField("body"))?;

        Params::new(body.to_owned())
    }
}

#[derive(Debug)]
pub enum InvalidParams {
    MissingField(&'static str),
    BodyEmptyOrWhitespace,
}

impl Error for InvalidParams {}

impl Display for InvalidParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            InvalidParams::MissingField(field) => crate::missing_field_message(field),
            InvalidParams::BodyEmptyOrWhitespace => crate::empty_field_message("body"),
        };

        write!(f, "{}", output)
    }
}
