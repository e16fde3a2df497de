use axum::{
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use relay_app::domain::outcome::{INTERNAL_ERROR_MESSAGE, Outcome};

/// Plaintext answer to a report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl From<Outcome> for ReportResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Sent => Self {
                status: StatusCode::OK,
                body: "Report sent.\n".to_string(),
            },
            Outcome::NotSent { status, message } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = if message.trim().is_empty() {
                    INTERNAL_ERROR_MESSAGE
                } else {
                    message.as_str()
                };
                Self {
                    status,
                    body: format!("Report not sent: {}\n", message),
                }
            }
        }
    }
}

impl IntoResponse for ReportResponse {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, "text/plain")], self.body).into_response()
    }
}
