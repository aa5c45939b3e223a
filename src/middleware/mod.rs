use actix_web::{dev, FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const ADMIN_ID_HEADER: &str = "X-Admin-Id";

/// The administrator a request acts on behalf of, taken from the
/// `X-Admin-Id` header. Only used to attribute admin-log entries; extraction
/// never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActingAdmin(pub Option<String>);

impl ActingAdmin {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The header value, falling back to an id supplied in the request body.
    pub fn or_body(&self, body_admin_id: Option<&str>) -> Option<String> {
        self.id()
            .or(body_admin_id)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

impl FromRequest for ActingAdmin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let admin_id = req
            .headers()
            .get(ADMIN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        ready(Ok(ActingAdmin(admin_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn header_is_extracted_and_trimmed() {
        let req = TestRequest::default().insert_header((ADMIN_ID_HEADER, " admin-1 ")).to_http_request();
        let admin = ActingAdmin::extract(&req).await.unwrap();
        assert_eq!(admin.id(), Some("admin-1"));
    }

    #[actix_web::test]
    async fn missing_header_falls_back_to_body() {
        let req = TestRequest::default().to_http_request();
        let admin = ActingAdmin::extract(&req).await.unwrap();
        assert_eq!(admin.id(), None);
        assert_eq!(admin.or_body(Some("admin-2")), Some("admin-2".to_string()));
        assert_eq!(admin.or_body(Some("  ")), None);
    }
}
