use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    VERSION,
    config::RelayConfig,
    domain::{
        message::OutboundMessage,
        outcome::{Outcome, RelayError},
        submission::Submission,
    },
    ports::{authorization::KeyAuthorizationPort, mail::MailTransportPort},
};

pub trait RelayReportUseCase {
    /// Runs one submission through validation, authorization and delivery.
    /// Always yields exactly one outcome.
    fn relay_report(&self, submission: &Submission) -> Outcome;
}

pub struct RelayReportUseCaseImpl<M: MailTransportPort> {
    config: Arc<RelayConfig>,
    authorizer: Arc<dyn KeyAuthorizationPort + Send + Sync + 'static>,
    mailer: Arc<M>,
}

impl<M: MailTransportPort> RelayReportUseCaseImpl<M> {
    pub fn new(
        config: Arc<RelayConfig>,
        authorizer: Arc<dyn KeyAuthorizationPort + Send + Sync + 'static>,
        mailer: Arc<M>,
    ) -> Self {
        Self {
            config,
            authorizer,
            mailer,
        }
    }

    fn try_relay(&self, submission: &Submission) -> Result<OutboundMessage, RelayError> {
        let fields = submission.validate()?;

        // Checked after the fields, so a bad key on a malformed submission
        // still reports the field error.
        if !self.authorizer.key_allowed(submission.key.as_deref()) {
            return Err(RelayError::Unauthorized);
        }

        let message = OutboundMessage::compose(
            fields,
            &self.config.destination,
            &self.config.identity,
            VERSION,
        );
        self.mailer.deliver(&self.config.transport, &message)?;
        Ok(message)
    }
}

impl<M: MailTransportPort> RelayReportUseCase for RelayReportUseCaseImpl<M> {
    fn relay_report(&self, submission: &Submission) -> Outcome {
        match self.try_relay(submission) {
            Ok(message) => {
                info!(
                    "Relayed report from {} ({:?}) via {}",
                    message.from, message.subject, self.config.transport
                );
                Outcome::Sent
            }
            Err(err) => {
                match &err {
                    RelayError::Delivery(_) | RelayError::Internal(_) => {
                        error!("Failed to relay report: {}", err)
                    }
                    RelayError::Field(_) | RelayError::Unauthorized => {
                        warn!("Rejected report submission: {}", err)
                    }
                }
                err.into()
            }
        }
    }
}
