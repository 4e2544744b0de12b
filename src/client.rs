//! HTTP exchange with the external scheduling service.
//!
//! One POST per submission, no retries. The response's content type decides
//! how the body is read: JSON is either a structured error or a schedule,
//! anything else is an opaque document handed back as bytes.

use crate::assembler::to_statistics;
use crate::config::{RequestContract, ServiceConfig};
use crate::data::{ScheduleResult, SubmissionPayload};
use crate::error::{Error, Result};
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::future::Future;

/// What a successful exchange produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutcome {
    Schedule(ScheduleResult),
    Document { content_type: String, bytes: Vec<u8> },
}

/// Anything that can take a payload and produce an outcome.
pub trait ScheduleService {
    fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<ServiceOutcome>> + Send;
}

#[derive(Debug, Clone)]
pub struct SchedulingServiceClient {
    http: reqwest::Client,
    endpoint: String,
    contract: RequestContract,
}

impl SchedulingServiceClient {
    /// Builds the client once; the configured timeout applies to every request.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.url.clone(),
            contract: config.contract,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exchange(&self, payload: &SubmissionPayload) -> Result<ServiceOutcome> {
        let request = match self.contract {
            RequestContract::Grid => self.http.post(&self.endpoint).json(payload),
            RequestContract::Statistics => {
                self.http.post(&self.endpoint).json(&to_statistics(payload))
            }
        };
        debug!("POST {} ({:?} contract)", self.endpoint, self.contract);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;
        info!(
            "Scheduling service answered {} with {} bytes of '{}'",
            status,
            body.len(),
            content_type
        );

        decode_response(&content_type, &body)
    }
}

impl ScheduleService for SchedulingServiceClient {
    fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<ServiceOutcome>> + Send {
        self.exchange(payload)
    }
}

pub fn is_json(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}

/// Interprets a successful response body according to its content type.
pub fn decode_response(content_type: &str, body: &[u8]) -> Result<ServiceOutcome> {
    if !is_json(content_type) {
        return Ok(ServiceOutcome::Document {
            content_type: content_type.to_string(),
            bytes: body.to_vec(),
        });
    }

    let value: Value = serde_json::from_slice(body)?;
    match value.get("error") {
        Some(Value::String(message)) => return Err(Error::Service(message.clone())),
        Some(Value::Null) | None => {}
        Some(other) => return Err(Error::Service(other.to_string())),
    }

    let result: ScheduleResult = serde_json::from_value(value)?;
    check_result(&result)?;
    Ok(ServiceOutcome::Schedule(result))
}

fn check_result(result: &ScheduleResult) -> Result<()> {
    if result.total_courses as usize != result.assignments.len() {
        return Err(Error::InvalidResponse(format!(
            "total_cours is {} but the planning lists {} courses",
            result.total_courses,
            result.assignments.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule_body(total: u32) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "planning": [{
                "jour": "Lundi", "heure": "08:00-09:00",
                "professeur": "Prof_1", "classe": "Classe_1", "salle": "Salle_1"
            }],
            "total_cours": total,
            "total_heures": 1,
            "heures_par_prof": {"Prof_1": 1},
            "heures_par_classe": {"Classe_1": 1}
        }))
        .unwrap()
    }

    #[test]
    fn json_schedule_is_decoded() {
        let outcome = decode_response("application/json", &schedule_body(1)).unwrap();
        match outcome {
            ServiceOutcome::Schedule(result) => assert_eq!(result.assignments.len(), 1),
            other => panic!("expected a schedule, got {:?}", other),
        }
    }

    #[test]
    fn json_error_becomes_service_error() {
        let body = br#"{"error": "Il faut au moins un professeur"}"#;
        let err = decode_response("application/json; charset=utf-8", body).unwrap_err();
        assert!(matches!(err, Error::Service(ref m) if m == "Il faut au moins un professeur"));
    }

    #[test]
    fn non_json_body_is_never_parsed() {
        let body = b"%PDF-1.4 not json at all";
        let outcome = decode_response("application/pdf", body).unwrap();
        assert_eq!(
            outcome,
            ServiceOutcome::Document {
                content_type: "application/pdf".to_string(),
                bytes: body.to_vec(),
            }
        );
    }

    #[test]
    fn missing_content_type_is_a_document() {
        let outcome = decode_response("", b"{}").unwrap();
        assert!(matches!(outcome, ServiceOutcome::Document { .. }));
    }

    #[test]
    fn malformed_json_fails_fast() {
        let err = decode_response("application/json", b"{\"planning\": 3}").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn inconsistent_totals_are_rejected() {
        let err = decode_response("application/json", &schedule_body(4)).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
