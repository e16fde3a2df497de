use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
};
use log::{error, warn};
use relay_app::domain::{
    outcome::{Outcome, RelayError},
    submission::Submission,
};

use crate::{AppState, response::ReportResponse};

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Collects every submitted name/value pair, from a urlencoded body, a query
/// string or a multipart form.
async fn read_fields(request: Request) -> Result<Vec<(String, String)>, String> {
    if !is_multipart(&request) {
        let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .map_err(|e| e.to_string())?;
        return Ok(fields);
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| e.to_string())?;
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field.text().await.map_err(|e| e.to_string())?;
        fields.push((name, value));
    }
    Ok(fields)
}

/// The first value sent under each recognized name wins, unknown names are ignored.
pub fn submission_from_fields(fields: Vec<(String, String)>) -> Submission {
    let mut submission = Submission::default();
    for (name, value) in fields {
        let slot = match name.as_str() {
            "from" => &mut submission.from,
            "subject" => &mut submission.subject,
            "via" => &mut submission.via,
            "report" => &mut submission.report,
            "key" => &mut submission.key,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
    submission
}

pub async fn submit_report(State(app_state): State<AppState>, request: Request) -> ReportResponse {
    let submission = match read_fields(request).await {
        Ok(fields) => submission_from_fields(fields),
        Err(reason) => {
            warn!("Unreadable report submission: {}", reason);
            Submission::default()
        }
    };

    // Delivery talks to the mail transport synchronously.
    let app = app_state.app.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        app.relay_report_use_case.relay_report(&submission)
    })
    .await
    .unwrap_or_else(|e| {
        let err = RelayError::Internal(e.to_string());
        error!("Failed to relay report: {}", err);
        Outcome::from(err)
    });

    ReportResponse::from(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        http::{Method, StatusCode},
        response::IntoResponse,
    };
    use relay_app::{
        build_application,
        config::RelayConfig,
        domain::message::OutboundMessage,
        ports::{
            authorization::{AcceptAllKeys, KeyAuthorizationPort, StaticKeyList},
            mail::{DeliveryError, MailTransportPort},
        },
    };

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        fail: bool,
        delivered: Mutex<Vec<OutboundMessage>>,
    }

    impl MailTransportPort for RecordingMailer {
        fn deliver(
            &self,
            _transport: &str,
            message: &OutboundMessage,
        ) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Send(
                    "421 smtp.internal.example closing connection".to_string(),
                ));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn state(
        authorizer: Arc<dyn KeyAuthorizationPort + Send + Sync + 'static>,
        mailer: Arc<RecordingMailer>,
    ) -> AppState {
        let config = Arc::new(RelayConfig::default().with_identity("TestRelay"));
        AppState {
            app: Arc::new(build_application(config, authorizer, mailer)),
        }
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    fn form_request(body: &'static str) -> Request {
        request("application/x-www-form-urlencoded", body)
    }

    async fn submit(state: AppState, request: Request) -> (StatusCode, String) {
        let response = submit_report(State(state), request).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_report_is_sent() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer.clone()),
            form_request("from=a%40b.com&subject=ok&via=tester%2F1.0&report=line1%0Aline2&key="),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Report sent.\n");

        let delivered = mailer.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].from, "a@b.com");
        assert_eq!(delivered[0].body, "line1\nline2");
        assert_eq!(
            delivered[0].reported_via,
            format!("TestRelay {} relayed from tester/1.0", relay_app::VERSION)
        );
    }

    #[tokio::test]
    async fn test_duplicated_field_uses_first_value() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer.clone()),
            form_request("from=a%40b.com&from=c%40d.com&subject=ok&via=t&report=r"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Report sent.\n");
        assert_eq!(mailer.delivered.lock().unwrap()[0].from, "a@b.com");
    }

    #[tokio::test]
    async fn test_multipart_report_is_sent() {
        let mailer = Arc::new(RecordingMailer::default());
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"from\"\r\n\r\n\
            a@b.com\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"subject\"\r\n\r\n\
            ok\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"via\"\r\n\r\n\
            tester/1.0\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"report\"\r\n\r\n\
            line1\nline2\r\n\
            --XBOUNDARY--\r\n";
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer.clone()),
            request("multipart/form-data; boundary=XBOUNDARY", body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Report sent.\n");
        let delivered = mailer.delivered.lock().unwrap();
        assert_eq!(delivered[0].subject, "ok");
        assert_eq!(delivered[0].body, "line1\nline2");
    }

    #[tokio::test]
    async fn test_missing_subject() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer.clone()),
            form_request("from=a%40b.com&via=tester&report=text"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Report not sent: missing subject field\n");
        assert!(mailer.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_newline_in_header_field() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer),
            form_request("from=a%40b.com&subject=ok%0D%0ABcc%3A+x%40y.z&via=tester&report=text"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Report not sent: invalid subject field\n");
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(StaticKeyList::parse("secret")), mailer),
            form_request("from=a%40b.com&subject=ok&via=tester&report=text&key=guess"),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Report not sent: unknown user key\n");
    }

    #[tokio::test]
    async fn test_delivery_failure_hides_transport_detail() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer),
            form_request("from=a%40b.com&subject=ok&via=tester&report=text"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Report not sent: internal error\n");
        assert!(!body.contains("smtp.internal.example"));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_treated_as_empty() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = submit(
            state(Arc::new(AcceptAllKeys), mailer),
            request("application/json", "{}"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Report not sent: missing from field\n");
    }

    #[test]
    fn test_submission_from_fields() {
        let submission = submission_from_fields(vec![
            ("from".to_string(), "a@b.com".to_string()),
            ("unknown".to_string(), "ignored".to_string()),
            ("key".to_string(), String::new()),
            ("key".to_string(), "later".to_string()),
        ]);
        assert_eq!(
            submission,
            Submission {
                from: Some("a@b.com".to_string()),
                key: Some(String::new()),
                ..Default::default()
            }
        );
    }
}
