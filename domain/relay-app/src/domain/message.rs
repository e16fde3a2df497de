use crate::domain::submission::ValidatedFields;

/// Header recording which relay forwarded the report and which tool filed it.
pub const REPORTED_VIA_HEADER: &str = "X-Reported-Via";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub reported_via: String,
}

impl OutboundMessage {
    /// Passes the submitted fields through untouched and adds the audit header.
    pub fn compose(
        fields: ValidatedFields,
        destination: &str,
        identity: &str,
        version: &str,
    ) -> Self {
        let reported_via = format!("{} {} relayed from {}", identity, version, fields.via);
        Self {
            to: destination.to_string(),
            from: fields.from,
            subject: fields.subject,
            body: fields.report,
            reported_via,
        }
    }
}
