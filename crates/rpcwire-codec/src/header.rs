use serde::{Deserialize, Serialize};

/// Default message header for the RPC layer.
///
/// The codec never looks inside a header; this record is what the RPC layer
/// above rpcwire sends in front of each request and response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// `"Service.Method"` being called.
    pub service_method: String,
    /// Sequence number chosen by the client; echoed in the response.
    pub seq: u64,
    /// Error text set by the server; empty on success.
    #[serde(default)]
    pub error: String,
}

impl Header {
    pub fn new(service_method: impl Into<String>, seq: u64) -> Self {
        Self {
            service_method: service_method.into(),
            seq,
            error: String::new(),
        }
    }

    /// Build the response header for this request carrying `error`.
    pub fn reply_with_error(&self, error: impl Into<String>) -> Self {
        Self {
            service_method: self.service_method.clone(),
            seq: self.seq,
            error: error.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
