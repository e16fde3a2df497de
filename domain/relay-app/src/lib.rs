use std::sync::Arc;

use crate::{
    config::RelayConfig,
    ports::{authorization::KeyAuthorizationPort, mail::MailTransportPort},
    workflow::relay_report::{RelayReportUseCase, RelayReportUseCaseImpl},
};

pub mod config;
pub mod domain;
pub mod ports;
pub mod workflow;

/// Version stamped into the audit header of every relayed message.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Application {
    pub relay_report_use_case: Box<dyn RelayReportUseCase + Send + Sync + 'static>,
}

pub fn build_application<M: MailTransportPort + Send + Sync + 'static>(
    config: Arc<RelayConfig>,
    authorizer: Arc<dyn KeyAuthorizationPort + Send + Sync + 'static>,
    mailer: Arc<M>,
) -> Application {
    let relay_report_use_case = RelayReportUseCaseImpl::new(config, authorizer, mailer);

    Application {
        relay_report_use_case: Box::new(relay_report_use_case),
    }
}
