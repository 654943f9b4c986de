//! Validated text primitives shared by every RaktMap crate.
//!
//! Each type checks its invariant once at construction (and on deserialisation), so code holding
//! one never has to re-validate it.

/// Errors that can occur when creating validated text types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, returning `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A lowercased, trimmed email address.
///
/// Only the shape `local@domain` is checked; deliverability is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let email = input.as_ref().trim().to_lowercase();
        if email.is_empty() {
            return Err(TextError::Empty);
        }

        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(TextError::InvalidEmail(email));
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A phone number in dialable form: an optional leading `+` followed by 7 to 15 digits.
///
/// Spaces, dashes, dots and parentheses are stripped during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(TextError::Empty);
        }

        let compact: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);

        if !digits.chars().all(|c| c.is_ascii_digit())
            || !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len())
        {
            return Err(TextError::InvalidPhone(raw.to_owned()));
        }

        Ok(Self(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! text_type_impls {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

text_type_impls!(NonEmptyText);
text_type_impls!(EmailAddress);
text_type_impls!(PhoneNumber);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims() {
        let text = NonEmptyText::new("  City Hospital ").unwrap();
        assert_eq!(text.as_str(), "City Hospital");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t"), Err(TextError::Empty));
    }

    #[test]
    fn test_email_is_lowercased() {
        let email = EmailAddress::new(" Donor@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "donor@example.com");
    }

    #[test]
    fn test_email_rejects_malformed() {
        assert!(EmailAddress::new("no-at-sign").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("a@b@c").is_err());
        assert!(EmailAddress::new("a b@example.com").is_err());
    }

    #[test]
    fn test_phone_strips_separators() {
        let phone = PhoneNumber::new("+91 99090-55454").unwrap();
        assert_eq!(phone.as_str(), "+919909055454");
    }

    #[test]
    fn test_phone_rejects_letters_and_short_numbers() {
        assert!(matches!(
            PhoneNumber::new("call me"),
            Err(TextError::InvalidPhone(_))
        ));
        assert!(matches!(
            PhoneNumber::new("12345"),
            Err(TextError::InvalidPhone(_))
        ));
        assert_eq!(PhoneNumber::new(""), Err(TextError::Empty));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<EmailAddress, _> = serde_json::from_str("\"X@Y.org\"");
        assert_eq!(ok.unwrap().as_str(), "x@y.org");

        let bad: Result<NonEmptyText, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }
}
