//! Remote content reads with locally kept markers.

use crate::api::{ApiService, Request};
use crate::content::{Content, ContentDetailRequest, ContentMarkerRequest, ContentService};
use crate::error::ApiError;
use crate::store::{record_key, JsonTree, SdkStore, TREE_CONTENT_MARKERS};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpContentService {
    api_service: Arc<dyn ApiService>,
    content_api_path: String,
    markers: JsonTree,
}

impl HttpContentService {
    pub fn new(
        api_service: Arc<dyn ApiService>,
        content_api_path: impl Into<String>,
        store: &SdkStore,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            api_service,
            content_api_path: content_api_path.into(),
            markers: store.open_tree(TREE_CONTENT_MARKERS)?,
        })
    }

    fn marker_key(uid: &str, content_id: &str, marker: &str) -> String {
        record_key(&[uid, content_id, marker])
    }

    pub fn get_marker(
        &self,
        uid: &str,
        content_id: &str,
        marker: crate::content::MarkerType,
    ) -> Result<Option<ContentMarkerRequest>, ApiError> {
        Ok(self
            .markers
            .get(&Self::marker_key(uid, content_id, marker.as_str()))?)
    }
}

#[async_trait]
impl ContentService for HttpContentService {
    async fn get_content_details(
        &self,
        request: ContentDetailRequest,
    ) -> Result<Content, ApiError> {
        let response = self
            .api_service
            .fetch(
                Request::get(format!(
                    "{}/read/{}",
                    self.content_api_path, request.content_id
                ))
                .with_api_token(true),
            )
            .await?;
        response.result_field("content")
    }

    async fn set_content_marker(&self, request: ContentMarkerRequest) -> Result<bool, ApiError> {
        let key = Self::marker_key(&request.uid, &request.content_id, request.marker.as_str());
        if request.is_marked {
            self.markers.put(&key, &request)?;
        } else {
            self.markers.remove(&key)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Response;
    use crate::content::MarkerType;
    use serde_json::json;

    struct CannedApi;

    #[async_trait]
    impl ApiService for CannedApi {
        async fn fetch(&self, request: Request) -> Result<Response, ApiError> {
            assert_eq!(request.path, "/api/content/v1/read/do_1");
            Ok(Response {
                status: 200,
                body: json!({ "result": { "content": {
                    "identifier": "do_1",
                    "contentType": "Resource",
                    "mimeType": "video/mp4"
                }}}),
            })
        }
    }

    #[tokio::test]
    async fn reads_content_and_toggles_markers() {
        let store = SdkStore::temporary().unwrap();
        let service = HttpContentService::new(Arc::new(CannedApi), "/api/content/v1", &store).unwrap();

        let content = service
            .get_content_details(ContentDetailRequest {
                content_id: "do_1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(content.mime_type, "video/mp4");
        assert_eq!(content.content_type, "Resource");

        let mut marker = ContentMarkerRequest {
            uid: "u1".to_string(),
            content_id: "do_1".to_string(),
            data: "{}".to_string(),
            marker: MarkerType::Previewed,
            is_marked: true,
            extra_info: Default::default(),
        };
        assert!(service.set_content_marker(marker.clone()).await.unwrap());
        assert!(service
            .get_marker("u1", "do_1", MarkerType::Previewed)
            .unwrap()
            .is_some());

        marker.is_marked = false;
        service.set_content_marker(marker).await.unwrap();
        assert!(service
            .get_marker("u1", "do_1", MarkerType::Previewed)
            .unwrap()
            .is_none());
    }
}
