//! Request handling for the five wizard submission endpoints.
//!
//! Each endpoint parses a JSON body, checks a fixed list of required fields,
//! waits for a simulated processing latency and echoes an acknowledgement.
//! Nothing is stored; every call is independent of the previous ones.
//!
//! | Endpoint | Required fields |
//! |---|---|
//! | `/api/project-setup` | `project_name`, `location.latitude`, `location.longitude` |
//! | `/api/system-configuration` | `project_id`, `enabled_components`, `layout_id` |
//! | `/api/technology-parameters` | `project_id`, `project_economic_settings`, `technology_parameters` |
//! | `/api/load-demand` | `project_id`, `load_profile` |
//! | `/api/model-uncertainties` | `project_id`, `selected_model` |

use std::fmt;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Body text of every 400 response.
pub const MISSING_FIELDS: &str = "Missing required fields";
/// Body text of every 500 response.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// HTTP status of an accepted submission.
pub const STATUS_OK: u16 = 200;
/// HTTP status of a submission with missing fields.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// HTTP status of an unexpected failure.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// One of the submission endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ProjectSetup,
    SystemConfiguration,
    TechnologyParameters,
    LoadDemand,
    ModelUncertainties,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::ProjectSetup,
        Endpoint::SystemConfiguration,
        Endpoint::TechnologyParameters,
        Endpoint::LoadDemand,
        Endpoint::ModelUncertainties,
    ];

    /// Last path segment, e.g. `"project-setup"`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::ProjectSetup => "project-setup",
            Self::SystemConfiguration => "system-configuration",
            Self::TechnologyParameters => "technology-parameters",
            Self::LoadDemand => "load-demand",
            Self::ModelUncertainties => "model-uncertainties",
        }
    }

    /// Route path, e.g. `"/api/project-setup"`.
    pub fn path(self) -> &'static str {
        match self {
            Self::ProjectSetup => "/api/project-setup",
            Self::SystemConfiguration => "/api/system-configuration",
            Self::TechnologyParameters => "/api/technology-parameters",
            Self::LoadDemand => "/api/load-demand",
            Self::ModelUncertainties => "/api/model-uncertainties",
        }
    }

    /// Dotted paths that must be present, non-null and not `""` in the request body.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::ProjectSetup => &["project_name", "location.latitude", "location.longitude"],
            Self::SystemConfiguration => &["project_id", "enabled_components", "layout_id"],
            Self::TechnologyParameters => &[
                "project_id",
                "project_economic_settings",
                "technology_parameters",
            ],
            Self::LoadDemand => &["project_id", "load_profile"],
            Self::ModelUncertainties => &["project_id", "selected_model"],
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::ProjectSetup => "Project setup saved successfully",
            Self::SystemConfiguration => "System configuration saved successfully",
            Self::TechnologyParameters => "Technology parameters saved successfully",
            Self::LoadDemand => "Load demand saved successfully",
            Self::ModelUncertainties => "Model uncertainties saved successfully",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Why a submission was not acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{endpoint}: missing required fields: {}", .fields.join(", "))]
    MissingFields {
        endpoint: Endpoint,
        fields: Vec<&'static str>,
    },

    #[error("{endpoint}: unreadable request body: {source}")]
    Malformed {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl HandlerError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingFields { .. } => STATUS_BAD_REQUEST,
            Self::Malformed { .. } => STATUS_INTERNAL_ERROR,
        }
    }

    /// Public response body. Internal details stay in the logs.
    pub fn body(&self) -> Value {
        match self {
            Self::MissingFields { .. } => json!({ "error": MISSING_FIELDS }),
            Self::Malformed { .. } => json!({ "error": INTERNAL_ERROR }),
        }
    }
}

/// Status and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<Result<Value, HandlerError>> for Reply {
    fn from(result: Result<Value, HandlerError>) -> Self {
        match result {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(e) => Self {
                status: e.status(),
                body: e.body(),
            },
        }
    }
}

/// Resolves a dotted path inside a JSON value.
fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(body, |value, key| value.as_object()?.get(key))
}

/// Whether a required field counts as not filled in.
///
/// Zero and `false` are real values here; only absence, `null` and the empty
/// string are missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Parses the raw body and checks the endpoint's required fields.
///
/// # Errors
///
/// [`HandlerError::Malformed`] if the body is not JSON,
/// [`HandlerError::MissingFields`] if a required field is absent, `null` or `""`.
pub fn validate(endpoint: Endpoint, raw: &[u8]) -> Result<Value, HandlerError> {
    let body: Value =
        serde_json::from_slice(raw).map_err(|source| HandlerError::Malformed { endpoint, source })?;

    let missing: Vec<&'static str> = endpoint
        .required_fields()
        .iter()
        .copied()
        .filter(|path| is_missing(lookup(&body, path)))
        .collect();

    if missing.is_empty() {
        Ok(body)
    } else {
        Err(HandlerError::MissingFields {
            endpoint,
            fields: missing,
        })
    }
}

/// Builds the success payload for an accepted body.
pub fn acknowledge(endpoint: Endpoint, body: &Value) -> Value {
    let message = endpoint.success_message();
    match endpoint {
        Endpoint::ProjectSetup => json!({
            "success": true,
            "message": message,
            "data": body,
        }),
        Endpoint::SystemConfiguration => json!({
            "status": "ok",
            "message": message,
            "layout_id": body["layout_id"],
        }),
        Endpoint::TechnologyParameters => json!({
            "status": "ok",
            "message": message,
        }),
        Endpoint::LoadDemand | Endpoint::ModelUncertainties => json!({
            "status": "ok",
            "message": message,
            "project_id": body["project_id"],
        }),
    }
}

/// Handles one submission end to end.
///
/// # Errors
///
/// See [`validate`].
pub async fn process(
    endpoint: Endpoint,
    raw: &[u8],
    latency: Duration,
) -> Result<Value, HandlerError> {
    let body = match validate(endpoint, raw) {
        Ok(body) => body,
        Err(e @ HandlerError::MissingFields { .. }) => {
            warn!(%endpoint, error = %e, "rejected submission");
            return Err(e);
        }
        Err(e) => {
            error!(%endpoint, error = %e, "failed to process submission");
            return Err(e);
        }
    };

    info!(%endpoint, %body, "received submission");

    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    Ok(acknowledge(endpoint, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_setup_without_location_is_missing_fields() {
        let raw = br#"{"project_name":"Lamu"}"#;
        let err = validate(Endpoint::ProjectSetup, raw).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.body(), json!({ "error": "Missing required fields" }));
        match err {
            HandlerError::MissingFields { fields, .. } => {
                assert_eq!(fields, vec!["location.latitude", "location.longitude"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_counts_as_missing() {
        let raw = br#"{"project_id":"abc123","selected_model":null}"#;
        let err = validate(Endpoint::ModelUncertainties, raw).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let raw = br#"{"project_name":"","location":{"latitude":-2.27,"longitude":40.9}}"#;
        let err = validate(Endpoint::ProjectSetup, raw).unwrap_err();
        assert_eq!(err.status(), 400);
        match err {
            HandlerError::MissingFields { fields, .. } => assert_eq!(fields, vec!["project_name"]),
            other => panic!("unexpected error: {other}"),
        }

        let raw = br#"{"project_id":"","load_profile":{"timestep":[0]}}"#;
        assert_eq!(validate(Endpoint::LoadDemand, raw).unwrap_err().status(), 400);

        // Whitespace is a value.
        let raw = br#"{"project_id":" ","selected_model":"linear"}"#;
        assert!(validate(Endpoint::ModelUncertainties, raw).is_ok());
    }

    #[test]
    fn zero_coordinates_are_present() {
        let raw = br#"{"project_name":"Gulf of Guinea","location":{"latitude":0.0,"longitude":0.0}}"#;
        assert!(validate(Endpoint::ProjectSetup, raw).is_ok());
    }

    #[test]
    fn malformed_json_is_internal_error() {
        let err = validate(Endpoint::LoadDemand, b"{not json").unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.body(), json!({ "error": "Internal server error" }));
    }

    #[test]
    fn non_object_body_is_missing_fields() {
        let err = validate(Endpoint::LoadDemand, b"42").unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn acknowledgements_echo_identifying_fields() {
        let body = json!({
            "project_id": "abc123",
            "enabled_components": {},
            "layout_id": 3,
        });
        let ack = acknowledge(Endpoint::SystemConfiguration, &body);
        assert_eq!(ack["status"], "ok");
        assert_eq!(ack["layout_id"], 3);

        let ack = acknowledge(Endpoint::LoadDemand, &body);
        assert_eq!(ack["project_id"], "abc123");
        assert_eq!(ack["message"], "Load demand saved successfully");

        let ack = acknowledge(Endpoint::ProjectSetup, &body);
        assert_eq!(ack["success"], true);
        assert_eq!(ack["data"], body);
    }

    #[test]
    fn paths_are_under_api() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.path(), format!("/api/{}", endpoint.slug()));
        }
    }

    #[tokio::test]
    async fn process_acknowledges_technology_parameters() {
        let raw = br#"{"project_id":"abc123","project_economic_settings":{},"technology_parameters":{}}"#;
        let reply = Reply::from(process(Endpoint::TechnologyParameters, raw, Duration::ZERO).await);
        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body,
            json!({ "status": "ok", "message": "Technology parameters saved successfully" })
        );
    }
}
