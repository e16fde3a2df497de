use std::fmt;

use thiserror::Error;

/// Form fields of one inbound report submission, as handed over by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub via: Option<String>,
    pub report: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    From,
    Subject,
    Via,
    Report,
}

impl Field {
    /// Checked in this order, the first failure wins.
    pub const REQUIRED: [Field; 4] = [Field::From, Field::Subject, Field::Via, Field::Report];

    pub fn name(&self) -> &'static str {
        match self {
            Field::From => "from",
            Field::Subject => "subject",
            Field::Via => "via",
            Field::Report => "report",
        }
    }

    /// The report body is the only field allowed to span several lines.
    pub fn is_single_line(&self) -> bool {
        !matches!(self, Field::Report)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing {0} field")]
    Missing(Field),
    #[error("invalid {0} field")]
    Malformed(Field),
}

/// The four text fields of a submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub from: String,
    pub subject: String,
    pub via: String,
    pub report: String,
}

impl Submission {
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::From => self.from.as_deref(),
            Field::Subject => self.subject.as_deref(),
            Field::Via => self.via.as_deref(),
            Field::Report => self.report.as_deref(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedFields, FieldError> {
        for field in Field::REQUIRED {
            let value = match self.field(field) {
                Some(value) if !value.is_empty() => value,
                _ => return Err(FieldError::Missing(field)),
            };
            if field.is_single_line() && value.contains(|c: char| c == '\r' || c == '\n') {
                return Err(FieldError::Malformed(field));
            }
        }

        let take = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(ValidatedFields {
            from: take(&self.from),
            subject: take(&self.subject),
            via: take(&self.via),
            report: take(&self.report),
        })
    }
}
