//! Incoming request as seen by a workflow

use std::fmt;

use crate::domain::form::FormData;
use crate::domain::record::RecordId;

/// Request method, reduced to what dispatch distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Other(String),
}

impl RequestMethod {
    /// Methods answered by re-rendering the forms
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    /// Methods carrying a submission
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl From<&str> for RequestMethod {
    fn from(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Head => write!(f, "HEAD"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Other(method) => write!(f, "{}", method),
        }
    }
}

/// Method, route id and submitted data of one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: RequestMethod,
    /// Id of the main record addressed by the route, if any
    pub id: Option<RecordId>,
    pub data: Option<FormData>,
}

impl RequestContext {
    pub fn new(method: impl Into<RequestMethod>) -> Self {
        Self {
            method: method.into(),
            id: None,
            data: None,
        }
    }

    /// GET request without data
    pub fn read() -> Self {
        Self::new(RequestMethod::Get)
    }

    /// POST request carrying `data`
    pub fn write(data: FormData) -> Self {
        Self::new(RequestMethod::Post).with_data(data)
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_data(mut self, data: FormData) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!(RequestMethod::from("get"), RequestMethod::Get);
        assert_eq!(RequestMethod::from("PUT"), RequestMethod::Put);
        assert_eq!(
            RequestMethod::from("delete"),
            RequestMethod::Other("DELETE".to_string())
        );
    }

    #[test]
    fn test_method_classes() {
        assert!(RequestMethod::Head.is_read());
        assert!(RequestMethod::Post.is_write());

        let patch = RequestMethod::from("PATCH");
        assert!(!patch.is_read());
        assert!(!patch.is_write());
        assert_eq!(patch.to_string(), "PATCH");
    }

    #[test]
    fn test_request_builders() {
        let request = RequestContext::write(FormData::new().with("name", "Jane")).with_id(RecordId::new(4));
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.id, Some(RecordId::new(4)));
        assert_eq!(request.data.unwrap().get("name"), Some("Jane"));
    }
}
