use std::{error::Error, fmt::Display, str::FromStr};

/// A parsed `application/x-www-form-urlencoded` request body.
///
/// Keeps fields in submission order. Lookups return the first value for a
/// given name, which matches how browsers submit the forms in this app
/// (every field appears at most once).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl FromStr for Form {
    type Err = FormParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Vec::new();
        for pair in s.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = match pair.find('=') {
                Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                None => (pair, ""),
            };
            fields.push((decode_component(key)?, decode_component(value)?));
        }

        Ok(Self { fields })
    }
}

// '+' means space in form encoding, which `urlencoding` does not handle.
// `urlencoding` passes malformed escapes through verbatim, so every '%'
// is checked for two trailing hex digits before decoding.
fn decode_component(raw: &str) -> Result<String, FormParseError> {
    validate_percent_escapes(raw)?;

    urlencoding::decode(&raw.replace('+', " ")).map_err(|_| FormParseError::InvalidEncoding)
}

fn validate_percent_escapes(raw: &str) -> Result<(), FormParseError> {
    let bytes = raw.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            if idx + 2 >= bytes.len()
                || !bytes[idx + 1].is_ascii_hexdigit()
                || !bytes[idx + 2].is_ascii_hexdigit()
            {
                return Err(FormParseError::InvalidEncoding);
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }

    Ok(())
}

#[derive(Debug)]
pub enum FormParseError {
    InvalidEncoding,
}

impl Error for FormParseError {}

impl Display for FormParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormParseError::InvalidEncoding => write!(f, "invalid percent-encoding in form body"),
        }
    }
}
