use thiserror::Error;

use crate::domain::message::OutboundMessage;

pub trait MailTransportPort {
    /// Hands `message` to the transport named by `transport`.
    fn deliver(&self, transport: &str, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("unknown mail transport: {0}")]
    UnknownTransport(String),
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("failed to send message: {0}")]
    Send(String),
}
