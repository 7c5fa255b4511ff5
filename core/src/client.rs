//! Call dispatcher and endpoint methods for the marketplace API.
//!
//! # Design
//! `MeliClient` owns a `Transport`, the OAuth access token and the site it
//! targets. Every endpoint method builds a path and goes through `call`, which
//! validates the verb, injects the token and normalizes the response into a
//! `serde_json::Value`. Remote error payloads are returned as values, not
//! errors, so callers see exactly what the API said.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{FilePart, HttpResponse, Params, Verb};
use crate::sites::{self, Site, DEFAULT_SITE_ID};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Collection, Picture};

/// Query parameter carrying the OAuth token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Page size used by `get_seller_items`.
pub const DEFAULT_LIMIT: u32 = 50;

/// Form field name for picture uploads.
const MEDIA_FIELD: &str = "file";

/// Synchronous client for the marketplace REST API.
#[derive(Debug, Clone)]
pub struct MeliClient<T = UreqTransport> {
    transport: T,
    access_token: String,
    /// Site used by site-scoped endpoints (categories, search).
    pub site_id: String,
}

impl MeliClient<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self {
            transport: UreqTransport::new(&config.api_url),
            access_token: config.access_token.clone(),
            site_id: config.site_id.clone(),
        })
    }
}

impl<T: Transport> MeliClient<T> {
    /// A client for `DEFAULT_SITE_ID`.
    pub fn new(transport: T, access_token: &str) -> Self {
        Self {
            transport,
            access_token: access_token.to_string(),
            site_id: DEFAULT_SITE_ID.to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Every site the API serves.
    pub fn site_ids() -> &'static [Site] {
        sites::SITES
    }

    /// Registry entry for the configured `site_id`, if it is a known one.
    pub fn site(&self) -> Option<&'static Site> {
        sites::find(&self.site_id)
    }

    /// Switch to another registered site.
    pub fn set_site(&mut self, site_id: &str) -> Result<(), ApiError> {
        let site = sites::find(site_id).ok_or_else(|| ApiError::UnknownSite(site_id.to_string()))?;
        self.site_id = site.id.to_string();
        Ok(())
    }

    /// Issue one request and decode its body.
    ///
    /// `method` is a verb name from `Verb` (`"get"`, `"post"`, `"put"`,
    /// `"delete"`, `"options"`, `"files"`); anything else fails with
    /// `ApiError::NotImplemented` before the transport is touched. `body` is
    /// only sent by `post`/`put`, `files` only by `files`.
    ///
    /// `access_token` is added to `params` unless the caller already set a
    /// non-empty one.
    #[instrument(skip(self, body, files, params))]
    pub fn call(
        &self,
        path: &str,
        body: Option<&Value>,
        files: &[FilePart],
        params: &Params,
        method: &str,
    ) -> Result<Value, ApiError> {
        let verb: Verb = method.parse()?;

        let mut params = params.clone();
        if params.get(ACCESS_TOKEN_PARAM).map_or(true, String::is_empty) {
            params.insert(ACCESS_TOKEN_PARAM.to_string(), self.access_token.clone());
        }

        let response = match verb {
            Verb::Get => self.transport.get(path, &params),
            Verb::Post => self.transport.post(path, body, &params),
            Verb::Put => self.transport.put(path, body, &params),
            Verb::Delete => self.transport.delete(path, &params),
            Verb::Options => self.transport.options(path, &params),
            Verb::Files => self.transport.upload(path, files, &params),
        }?;

        decode(response)
    }

    /// `GET path` with no extra parameters.
    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.call(path, None, &[], &Params::new(), Verb::Get.as_str())
    }

    /// Profile of the user owning the access token.
    pub fn me(&self) -> Result<Value, ApiError> {
        self.get_user("me")
    }

    pub fn get_user(&self, id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/users/{id}"))
    }

    /// One category, or the root categories of the configured site when `id`
    /// is `None` or empty.
    pub fn get_categories(&self, id: Option<&str>) -> Result<Value, ApiError> {
        let path = match id.filter(|id| !id.is_empty()) {
            Some(id) => format!("/categories/{id}"),
            None => format!("/sites/{}/categories", self.site_id),
        };
        self.get(&path)
    }

    /// One page of a seller's listings on the configured site.
    ///
    /// Further pages are the caller's business: bump `offset` (see
    /// `Collection::next_offset`).
    pub fn get_items(&self, user_id: &str, limit: u32, offset: u32) -> Result<Collection, ApiError> {
        let path = format!(
            "/sites/{}/search?seller_id={user_id}&limit={limit}&offset={offset}",
            self.site_id
        );
        let body = self.get(&path)?;
        let collection = Collection::from_search(body)?;
        debug!(results = collection.len(), "search page decoded");
        Ok(collection)
    }

    /// First `DEFAULT_LIMIT` listings of a seller.
    pub fn get_seller_items(&self, user_id: &str) -> Result<Collection, ApiError> {
        self.get_items(user_id, DEFAULT_LIMIT, 0)
    }

    /// Upload the file at `file_path` to `/pictures`.
    ///
    /// A file that cannot be read fails with `ApiError::Io` before any request
    /// is made.
    pub fn set_media(&self, file_path: impl AsRef<Path>) -> Result<Picture, ApiError> {
        let file_path = file_path.as_ref();
        let bytes = std::fs::read(file_path)?;
        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(MEDIA_FIELD);
        let part = FilePart::new(MEDIA_FIELD, file_name, bytes);

        let body = self.call(
            "/pictures",
            None,
            std::slice::from_ref(&part),
            &Params::new(),
            Verb::Files.as_str(),
        )?;
        Picture::from_value(body)
    }
}

/// Success bodies must decode. Error bodies are returned when they decode and
/// replaced by `ApiError::ResponseError` when they don't.
fn decode(response: HttpResponse) -> Result<Value, ApiError> {
    if response.is_ok() {
        return serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()));
    }

    warn!(status = response.status, reason = %response.reason, "error response");
    serde_json::from_slice(&response.body).map_err(|_| ApiError::ResponseError {
        status: response.status,
        reason: response.reason,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::recording::RecordingTransport;

    const TOKEN: &str = "APP_USR-123";

    fn client(transport: RecordingTransport) -> MeliClient<RecordingTransport> {
        MeliClient::new(transport, TOKEN)
    }

    fn temp_file(contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("meli-core-{}.jpg", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn every_verb_hits_its_primitive_once() {
        let c = client(RecordingTransport::new());
        for verb in Verb::ALL {
            c.call("/things", None, &[], &Params::new(), verb.as_str()).unwrap();
        }
        let seen: Vec<Verb> = c.transport().requests().iter().map(|r| r.verb).collect();
        assert_eq!(seen, Verb::ALL.to_vec());
    }

    #[test]
    fn unknown_verb_makes_no_request() {
        let c = client(RecordingTransport::new());
        for method in ["patch", "GET", "head", ""] {
            let err = c.call("/users/me", None, &[], &Params::new(), method).unwrap_err();
            assert!(matches!(err, ApiError::NotImplemented(ref m) if m == method));
        }
        assert!(c.transport().requests().is_empty());
    }

    #[test]
    fn token_is_injected_when_absent() {
        let c = client(RecordingTransport::new());
        let params = Params::from([("attributes".to_string(), "id".to_string())]);
        c.call("/users/me", None, &[], &params, "get").unwrap();
        let req = c.transport().last().unwrap();
        assert_eq!(req.params.get(ACCESS_TOKEN_PARAM).map(String::as_str), Some(TOKEN));
        assert_eq!(req.params.get("attributes").map(String::as_str), Some("id"));
        // The caller's map is left alone.
        assert!(!params.contains_key(ACCESS_TOKEN_PARAM));
    }

    #[test]
    fn caller_token_is_not_overwritten() {
        let c = client(RecordingTransport::new());
        let params = Params::from([(ACCESS_TOKEN_PARAM.to_string(), "OTHER".to_string())]);
        c.call("/users/me", None, &[], &params, "get").unwrap();
        let req = c.transport().last().unwrap();
        assert_eq!(req.params[ACCESS_TOKEN_PARAM], "OTHER");
    }

    #[test]
    fn empty_caller_token_counts_as_absent() {
        let c = client(RecordingTransport::new());
        let params = Params::from([(ACCESS_TOKEN_PARAM.to_string(), String::new())]);
        c.call("/users/me", None, &[], &params, "get").unwrap();
        assert_eq!(c.transport().last().unwrap().params[ACCESS_TOKEN_PARAM], TOKEN);
    }

    #[test]
    fn body_goes_only_to_post_and_put() {
        let c = client(RecordingTransport::new());
        let body = json!({"title": "Mate"});
        for method in ["post", "put", "get", "delete", "options"] {
            c.call("/items", Some(&body), &[], &Params::new(), method).unwrap();
        }
        let bodies: Vec<_> = c.transport().requests().into_iter().map(|r| r.body).collect();
        assert_eq!(bodies, vec![Some(body.clone()), Some(body), None, None, None]);
    }

    #[test]
    fn files_go_only_to_upload() {
        let c = client(RecordingTransport::new());
        let part = FilePart::new("file", "a.jpg", vec![1, 2, 3]);
        c.call("/pictures", None, std::slice::from_ref(&part), &Params::new(), "files").unwrap();
        c.call("/pictures", None, std::slice::from_ref(&part), &Params::new(), "post").unwrap();
        let requests = c.transport().requests();
        assert_eq!(requests[0].files, vec![part]);
        assert!(requests[1].files.is_empty());
    }

    #[test]
    fn ok_body_is_decoded() {
        let c = client(RecordingTransport::new().respond(200, r#"{"id": 42, "nickname": "SELLER"}"#));
        assert_eq!(c.me().unwrap(), json!({"id": 42, "nickname": "SELLER"}));
    }

    #[test]
    fn malformed_ok_body_is_a_decode_error() {
        let c = client(RecordingTransport::new().respond(200, "<html>"));
        let err = c.me().unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn json_error_body_is_returned() {
        let c = client(RecordingTransport::new().respond(404, r#"{"error": "x"}"#));
        assert_eq!(c.get_user("0").unwrap(), json!({"error": "x"}));
    }

    #[test]
    fn undecodable_error_body_carries_reason() {
        let c = client(RecordingTransport::new().respond_with(502, "Bad Gateway", "upstream died"));
        let err = c.me().unwrap_err();
        assert!(matches!(err, ApiError::ResponseError { status: 502, ref reason } if reason == "Bad Gateway"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn non_utf8_error_body_carries_reason() {
        let c = client(RecordingTransport::new().respond_with(502, "Bad Gateway", b"\xff\xfe\x00garbage"));
        let err = c.me().unwrap_err();
        assert!(matches!(err, ApiError::ResponseError { status: 502, ref reason } if reason == "Bad Gateway"));
    }

    #[test]
    fn non_utf8_ok_body_is_a_decode_error() {
        let c = client(RecordingTransport::new().respond(200, b"\xff\xfe"));
        let err = c.me().unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn me_is_get_user_me() {
        let c = client(RecordingTransport::new());
        c.me().unwrap();
        let req = c.transport().last().unwrap();
        assert_eq!(req.verb, Verb::Get);
        assert_eq!(req.path, "/users/me");
    }

    #[test]
    fn categories_root_or_by_id() {
        let c = client(RecordingTransport::new());
        c.get_categories(None).unwrap();
        c.get_categories(Some("")).unwrap();
        c.get_categories(Some("1000")).unwrap();
        let paths: Vec<_> = c.transport().requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/sites/MLA/categories", "/sites/MLA/categories", "/categories/1000"]);
    }

    #[test]
    fn categories_follow_site_changes() {
        let mut c = client(RecordingTransport::new());
        c.set_site("MLB").unwrap();
        c.get_categories(None).unwrap();
        assert_eq!(c.transport().last().unwrap().path, "/sites/MLB/categories");
        assert_eq!(c.site().unwrap().name, "Brasil");
    }

    #[test]
    fn set_site_rejects_unknown_ids() {
        let mut c = client(RecordingTransport::new());
        let err = c.set_site("XYZ").unwrap_err();
        assert!(matches!(err, ApiError::UnknownSite(ref id) if id == "XYZ"));
        assert_eq!(c.site_id, DEFAULT_SITE_ID);
    }

    #[test]
    fn get_items_builds_search_path_and_collection() {
        let body = json!({
            "paging": {"total": 21, "offset": 20, "limit": 10},
            "results": [{"id": "MLA9", "title": "Termo"}]
        });
        let c = client(RecordingTransport::new().respond(200, &body.to_string()));
        let page = c.get_items("123", 10, 20).unwrap();

        let req = c.transport().last().unwrap();
        assert_eq!(req.path, "/sites/MLA/search?seller_id=123&limit=10&offset=20");
        assert_eq!(page.paging(), &body["paging"]);
        let items: Vec<_> = page.into_iter().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("title"), Some(&json!("Termo")));
    }

    #[test]
    fn seller_items_use_default_page() {
        let c = client(RecordingTransport::new().respond(200, r#"{"paging": {}, "results": []}"#));
        c.get_seller_items("7").unwrap();
        assert_eq!(
            c.transport().last().unwrap().path,
            "/sites/MLA/search?seller_id=7&limit=50&offset=0"
        );
    }

    #[test]
    fn get_items_hands_back_error_payload() {
        let payload = json!({"message": "invalid access token", "status": 401});
        let c = client(RecordingTransport::new().respond(401, &payload.to_string()));
        let err = c.get_items("123", 10, 0).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse(ref v) if *v == payload));
    }

    #[test]
    fn set_media_uploads_file_bytes() {
        let path = temp_file(b"\xff\xd8\xff\xe0JFIF");
        let c = client(RecordingTransport::new().respond(201, r#"{"id": "123-MLA", "max_size": "500x500"}"#));
        let picture = c.set_media(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(picture.get("id"), Some(&json!("123-MLA")));
        let req = c.transport().last().unwrap();
        assert_eq!(req.verb, Verb::Files);
        assert_eq!(req.path, "/pictures");
        assert_eq!(req.files.len(), 1);
        assert_eq!(req.files[0].field, "file");
        assert_eq!(req.files[0].file_name, path.file_name().unwrap().to_str().unwrap());
        assert_eq!(req.files[0].bytes, b"\xff\xd8\xff\xe0JFIF");
        assert_eq!(req.params[ACCESS_TOKEN_PARAM], TOKEN);
    }

    #[test]
    fn set_media_missing_file_is_io_error() {
        let c = client(RecordingTransport::new());
        let path = std::env::temp_dir().join(format!("meli-core-missing-{}", uuid::Uuid::new_v4()));
        let err = c.set_media(&path).unwrap_err();
        assert!(matches!(err, ApiError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert!(c.transport().requests().is_empty());
    }

    #[test]
    fn from_config_validates() {
        let config = ClientConfig::default();
        let err = MeliClient::from_config(&config).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));

        let config = ClientConfig {
            access_token: TOKEN.to_string(),
            site_id: "MLU".to_string(),
            ..ClientConfig::default()
        };
        let c = MeliClient::from_config(&config).unwrap();
        assert_eq!(c.site_id, "MLU");
        assert_eq!(c.access_token(), TOKEN);
        assert_eq!(c.transport().base_url(), config.api_url);
    }

    #[test]
    fn site_ids_lists_registry() {
        let ids = MeliClient::<RecordingTransport>::site_ids();
        assert!(ids.iter().any(|s| s.id == "MLA" && s.name == "Argentina"));
    }
}
