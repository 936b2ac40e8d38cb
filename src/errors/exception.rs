use axum::http::StatusCode;
use std::any::Any;
use std::backtrace::BacktraceStatus;
use thiserror::Error;

/// An error raised while serving a request.
///
/// Handlers return this (usually through `?`) and the exception filter turns
/// it into a JSON error response.
#[derive(Debug, Error)]
pub enum Exception {
    /// Error carrying an explicit HTTP status
    #[error("HTTP {} {}", .status.as_u16(), .status.canonical_reason().unwrap_or("Unknown"))]
    Http {
        status: StatusCode,
        message: Option<String>,
    },

    /// Authorization challenge, always 401
    #[error("HTTP 401 Unauthorized")]
    NotAuthorized { challenges: Vec<String> },

    /// Anything else; there is no embedded status
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl Exception {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: Some(message.into()),
        }
    }

    /// An exception with a status and no message text
    pub fn status_only(status: StatusCode) -> Self {
        Self::Http {
            status,
            message: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_authorized<I, S>(challenges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotAuthorized {
            challenges: challenges.into_iter().map(Into::into).collect(),
        }
    }

    /// Build an exception from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self::Unhandled(anyhow::anyhow!("handler panicked: {}", detail))
    }

    /// Message text of the exception, if it has one
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Http { message, .. } => message.clone(),
            Self::NotAuthorized { .. } => Some(self.to_string()),
            Self::Unhandled(err) => Some(err.to_string()),
        }
    }

    /// HTTP status embedded in the exception
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotAuthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Unhandled(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "Http",
            Self::NotAuthorized { .. } => "NotAuthorized",
            Self::Unhandled(_) => "Unhandled",
        }
    }

    /// Render the exception, its cause chain and any captured backtrace.
    ///
    /// The first line is always `<kind>: <display>`, followed by the message or
    /// challenges when the exception carries them, so the result is never empty.
    pub fn trace(&self) -> String {
        let mut trace = format!("{}: {}", self.kind(), self);

        match self {
            Self::Http {
                message: Some(message),
                ..
            } => trace.push_str(&format!(": {}", message)),
            Self::NotAuthorized { challenges } if !challenges.is_empty() => {
                trace.push_str(&format!(": challenges [{}]", challenges.join(", ")))
            }
            _ => {}
        }

        if let Self::Unhandled(err) = self {
            for cause in err.chain().skip(1) {
                trace.push_str(&format!("\nCaused by: {}", cause));
            }

            let backtrace = err.backtrace();
            if backtrace.status() == BacktraceStatus::Captured {
                trace.push_str(&format!("\n{}", backtrace));
            }
        }

        trace
    }
}
