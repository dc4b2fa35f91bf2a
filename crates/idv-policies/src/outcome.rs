//! Normalización de respuestas del backend.
//!
//! La API upstream no es consistente: a veces informa éxito con un campo
//! `status`, a veces con un booleano `success`, a veces sólo con texto libre
//! en `message`, y responde 400 cuando un step ya había sido registrado. Todo
//! el matching por substrings vive aquí, en `classify_outcome`, como shim de
//! compatibilidad; el resto del cliente sólo ve `Submission` o `FlowError`.
use idv_domain::{FlowError, SessionProgress};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const SUCCESS_PHRASES: [&str; 3] = ["success", "successfully", "data created successfully"];
const ALREADY_DONE_PHRASES: [&str; 3] = ["already submitted", "already accepted", "already completed"];
const GENERIC_REJECTION: &str = "Unexpected server response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    /// 400 que indica que la acción ya estaba registrada (re-envío idempotente).
    AlreadyDone,
    Failure,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

fn indicates_success(message: &str) -> bool {
    let lower = message.to_lowercase();
    contains_any(&lower, &SUCCESS_PHRASES) && !lower.contains("unsuccess") && !lower.contains("not success")
}

/// Clasifica una respuesta a partir del código HTTP, el `status` reportado y
/// el mensaje libre.
///
/// - 2xx con `status` de éxito, o con un mensaje que indica éxito, o sin
///   `status` ni mensaje: `Success`.
/// - 400 cuyo mensaje indica que la acción ya se realizó: `AlreadyDone`.
/// - Todo lo demás: `Failure`.
pub fn classify_outcome(status_code: u16, status: Option<&str>, message: Option<&str>) -> Classification {
    let status = status.map(str::trim).filter(|s| !s.is_empty());
    let message = message.map(str::trim).filter(|s| !s.is_empty());

    if (200..300).contains(&status_code) {
        let status_ok = status.is_some_and(|s| s.eq_ignore_ascii_case("success") || s.eq_ignore_ascii_case("ok"));
        let message_ok = message.is_some_and(indicates_success);
        if status_ok || message_ok || (status.is_none() && message.is_none()) {
            return Classification::Success;
        }
        return Classification::Failure;
    }
    if status_code == 400 && message.is_some_and(|m| contains_any(m, &ALREADY_DONE_PHRASES)) {
        return Classification::AlreadyDone;
    }
    Classification::Failure
}

/// Envoltorio común de las respuestas JSON del backend. Todos los campos son
/// opcionales porque cada endpoint rellena un subconjunto distinto.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(ApiEnvelope::default());
        }
        serde_json::from_str(body)
    }

    /// `status` efectivo: el campo textual o, en su defecto, el booleano.
    pub fn effective_status(&self) -> Option<&str> {
        match (&self.status, self.success) {
            (Some(s), _) => Some(s.as_str()),
            (None, Some(true)) => Some("success"),
            (None, Some(false)) => Some("error"),
            (None, None) => None,
        }
    }

    pub fn effective_message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }

    pub fn classify(&self, status_code: u16) -> Classification {
        classify_outcome(status_code, self.effective_status(), self.effective_message())
    }

    /// Progreso de la sesión, buscado en `data` y, si no, en la raíz.
    fn progress_from(value: &Value) -> Option<SessionProgress> {
        let obj = value.as_object()?;
        if !obj.contains_key("steps_completed") && !obj.contains_key("steps_remaining") {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn progress(&self, raw: &Value) -> Option<SessionProgress> {
        self.data.as_ref().and_then(Self::progress_from).or_else(|| Self::progress_from(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    AlreadyDone,
}

/// Envío de step aceptado por el backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub disposition: Disposition,
    pub message: Option<String>,
    pub progress: Option<SessionProgress>,
}

impl Submission {
    pub fn accepted() -> Self {
        Submission { disposition: Disposition::Accepted,
                     message: None,
                     progress: None }
    }
}

/// Intenta rescatar un mensaje legible de un cuerpo que no encaja en
/// `ApiEnvelope` (tipos inesperados, JSON truncado).
pub fn salvage_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
        return None;
    }
    // JSON roto: buscar `"message":"..."` a mano.
    let start = body.find("\"message\"")?;
    let rest = &body[start + "\"message\"".len()..];
    let rest = rest.trim_start().strip_prefix(':')?.trim_start().strip_prefix('"')?;
    let end = rest.find('"')?;
    let text = rest[..end].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn rejection(status_code: u16, message: Option<String>) -> FlowError {
    FlowError::rejected(Some(status_code), message.unwrap_or_else(|| GENERIC_REJECTION.to_string()))
}

/// Normaliza la respuesta a un envío de step: `Submission` o `ServerRejected`
/// con el mensaje del servidor y el código.
pub fn normalize_submission(status_code: u16, body: &str) -> Result<Submission, FlowError> {
    let envelope = match ApiEnvelope::parse(body) {
        Ok(env) => env,
        Err(_) => return Err(rejection(status_code, salvage_message(body))),
    };
    let raw: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = envelope.effective_message().map(str::to_string);
    match envelope.classify(status_code) {
        Classification::Success => Ok(Submission { disposition: Disposition::Accepted,
                                                   message,
                                                   progress: envelope.progress(&raw) }),
        Classification::AlreadyDone => Ok(Submission { disposition: Disposition::AlreadyDone,
                                                       message,
                                                       progress: envelope.progress(&raw) }),
        Classification::Failure => Err(rejection(status_code, message)),
    }
}

/// Decodifica el payload de una operación que no es un envío de step
/// (registro, settings, start-session). Una respuesta no exitosa se reporta
/// como `ServerRejected`; un payload exitoso ilegible también, si trae un
/// mensaje rescatable, y si no como `DecodeFailure`.
pub fn decode_payload<T: DeserializeOwned>(status_code: u16, body: &str) -> Result<T, FlowError> {
    let envelope = match ApiEnvelope::parse(body) {
        Ok(env) => env,
        Err(e) => {
            return Err(match salvage_message(body) {
                Some(message) => rejection(status_code, Some(message)),
                None if (200..300).contains(&status_code) => FlowError::DecodeFailure(e.to_string()),
                None => rejection(status_code, None),
            });
        }
    };
    if envelope.classify(status_code) != Classification::Success {
        return Err(rejection(status_code, envelope.effective_message().map(str::to_string)));
    }
    let payload = match envelope.data {
        Some(data) => data,
        None => serde_json::from_str(body).map_err(|e| FlowError::DecodeFailure(e.to_string()))?,
    };
    serde_json::from_value(payload).map_err(|e| FlowError::DecodeFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_domain::StepKind;

    #[test]
    fn success_by_status_or_message() {
        assert_eq!(classify_outcome(200, Some("success"), None), Classification::Success);
        assert_eq!(classify_outcome(200, Some("SUCCESS"), Some("whatever")), Classification::Success);
        assert_eq!(classify_outcome(201, None, Some("Data created successfully")), Classification::Success);
        assert_eq!(classify_outcome(200, Some("pending"), Some("Selfie uploaded successfully")), Classification::Success);
        assert_eq!(classify_outcome(204, None, None), Classification::Success);
    }

    #[test]
    fn two_hundred_with_error_status_is_failure() {
        assert_eq!(classify_outcome(200, Some("error"), Some("Face not detected")), Classification::Failure);
        assert_eq!(classify_outcome(200, Some("error"), Some("Upload unsuccessful")), Classification::Failure);
    }

    #[test]
    fn already_done_only_on_400() {
        assert_eq!(classify_outcome(400, Some("error"), Some("Selfie already submitted")), Classification::AlreadyDone);
        assert_eq!(classify_outcome(400, None, Some("Terms ALREADY ACCEPTED")), Classification::AlreadyDone);
        assert_eq!(classify_outcome(400, None, Some("Step already completed")), Classification::AlreadyDone);
        assert_eq!(classify_outcome(409, None, Some("already submitted")), Classification::Failure);
        assert_eq!(classify_outcome(400, None, Some("Invalid image")), Classification::Failure);
    }

    #[test]
    fn non_success_codes_ignore_success_words() {
        assert_eq!(classify_outcome(500, Some("success"), Some("success")), Classification::Failure);
    }

    #[test]
    fn normalize_extracts_progress_from_data() {
        let body = r#"{"status":"success","data":{"steps_completed":["selfie"],"steps_remaining":["terms"]}}"#;
        let sub = normalize_submission(200, body).unwrap();
        assert_eq!(sub.disposition, Disposition::Accepted);
        let progress = sub.progress.unwrap();
        assert_eq!(progress.steps_completed, vec![StepKind::Selfie]);
        assert_eq!(progress.steps_remaining, vec![StepKind::Terms]);
    }

    #[test]
    fn normalize_rejection_carries_message_and_status() {
        let err = normalize_submission(422, r#"{"status":"error","message":"Face not detected"}"#).unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(422), "Face not detected"));
    }

    #[test]
    fn malformed_body_salvages_message() {
        // `status` con tipo inesperado rompe el envoltorio tipado
        let err = normalize_submission(500, r#"{"status": 7, "message": "Internal hiccup"}"#).unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(500), "Internal hiccup"));

        let err = normalize_submission(502, r#"{"message": "Gateway down", "trace": [1,2"#).unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(502), "Gateway down"));

        let err = normalize_submission(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(502), GENERIC_REJECTION));
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Registered {
        customer_id: String,
    }

    #[test]
    fn decode_payload_reads_data_or_root() {
        let r: Registered = decode_payload(200, r#"{"status":"success","data":{"customer_id":"c-1"}}"#).unwrap();
        assert_eq!(r.customer_id, "c-1");
        let r: Registered = decode_payload(200, r#"{"customer_id":"c-2"}"#).unwrap();
        assert_eq!(r.customer_id, "c-2");
    }

    #[test]
    fn decode_payload_distinguishes_rejection_from_garbage() {
        let err = decode_payload::<Registered>(401, r#"{"message":"Invalid API key"}"#).unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(401), "Invalid API key"));
        let err = decode_payload::<Registered>(200, r#"{"status":"success","data":{"id":1}}"#).unwrap_err();
        assert!(matches!(err, FlowError::DecodeFailure(_)));
    }

    #[test]
    fn unreadable_success_body_keeps_server_message() {
        let err = decode_payload::<Registered>(200, r#"{"message": "Session quota exceeded", "data": {"#).unwrap_err();
        assert_eq!(err, FlowError::rejected(Some(200), "Session quota exceeded"));
        assert_eq!(err.server_message(), Some("Session quota exceeded"));

        let err = decode_payload::<Registered>(200, "<html>ok</html>").unwrap_err();
        assert!(matches!(err, FlowError::DecodeFailure(_)));
    }
}
