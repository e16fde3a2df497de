use std::str::FromStr;

use lettre::{
    Message, SendmailTransport, SmtpTransport, Transport,
    message::{
        Body, Mailbox,
        header::{ContentTransferEncoding, ContentType, Header, HeaderName, HeaderValue},
    },
    transport::{smtp::authentication::Credentials, stub::StubTransport},
};
use log::debug;
use relay_app::{
    domain::message::{OutboundMessage, REPORTED_VIA_HEADER},
    ports::mail::{DeliveryError, MailTransportPort},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Smtp,
    Sendmail,
    Stub,
}

impl FromStr for TransportKind {
    type Err = DeliveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("smtp") {
            Ok(TransportKind::Smtp)
        } else if s.eq_ignore_ascii_case("sendmail") {
            Ok(TransportKind::Sendmail)
        } else if s.eq_ignore_ascii_case("stub") {
            Ok(TransportKind::Stub)
        } else {
            Err(DeliveryError::UnknownTransport(s.to_string()))
        }
    }
}

/// Connection settings for the SMTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: Option<u16>,
    pub credentials: Option<(String, String)>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            credentials: None,
        }
    }
}

impl SmtpSettings {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let mut settings = Self::default();
        if let Some(host) = var("RELAY_SMTP_HOST") {
            settings.host = host;
        }
        settings.port = var("RELAY_SMTP_PORT").and_then(|port| port.parse().ok());
        settings.credentials = var("RELAY_SMTP_USER").zip(var("RELAY_SMTP_PASSWORD"));
        settings
    }

    /// Authenticated settings use an implicit TLS relay connection, anything
    /// else talks plain SMTP to a trusted local relay.
    pub fn build(&self) -> Result<SmtpTransport, DeliveryError> {
        let builder = match &self.credentials {
            Some((user, password)) => SmtpTransport::relay(&self.host)
                .map_err(|e| DeliveryError::Send(format!("Failed to create SMTP transport: {}", e)))?
                .credentials(Credentials::new(user.clone(), password.clone())),
            None => SmtpTransport::builder_dangerous(&self.host),
        };
        let builder = match self.port {
            Some(port) => builder.port(port),
            None => builder,
        };
        Ok(builder.build())
    }
}

#[derive(Debug, Clone)]
struct ReportedVia(String);

impl Header for ReportedVia {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str(REPORTED_VIA_HEADER)
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

pub struct LettreMailAdapter {
    smtp: SmtpTransport,
    sendmail: SendmailTransport,
    stub: StubTransport,
}

impl LettreMailAdapter {
    pub fn new(smtp: SmtpTransport, sendmail: SendmailTransport) -> Self {
        Self {
            smtp,
            sendmail,
            stub: StubTransport::new_ok(),
        }
    }

    pub fn from_env() -> Result<Self, DeliveryError> {
        let smtp = SmtpSettings::from_env().build()?;
        let sendmail = match std::env::var("RELAY_SENDMAIL_COMMAND") {
            Ok(command) if !command.is_empty() => SendmailTransport::new_with_command(command),
            _ => SendmailTransport::new(),
        };
        Ok(Self::new(smtp, sendmail))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    Mailbox::from_str(address).map_err(|e| DeliveryError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Sends the report as 8bit so its bytes reach the collector as submitted.
/// Lines too long for 8bit fall back to the encoding lettre picks.
fn report_body(report: &str) -> Body {
    Body::new_with_encoding(report.to_string(), ContentTransferEncoding::EightBit)
        .unwrap_or_else(|_| Body::new(report.to_string()))
}

pub fn to_lettre_message(message: &OutboundMessage) -> Result<Message, DeliveryError> {
    Message::builder()
        .from(parse_mailbox(&message.from)?)
        .to(parse_mailbox(&message.to)?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .header(ReportedVia(message.reported_via.clone()))
        .body(report_body(&message.body))
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

impl MailTransportPort for LettreMailAdapter {
    fn deliver(&self, transport: &str, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let kind = TransportKind::from_str(transport)?;
        let email = to_lettre_message(message)?;
        debug!("Sending report for {} over {:?}", message.to, kind);

        match kind {
            TransportKind::Smtp => self.smtp.send(&email).map(|_| ()).map_err(|e| e.to_string()),
            TransportKind::Sendmail => self.sendmail.send(&email).map_err(|e| e.to_string()),
            TransportKind::Stub => self.stub.send(&email).map_err(|e| e.to_string()),
        }
        .map_err(DeliveryError::Send)
    }
}
