use crate::{Result, SyncError};
use serde::Deserialize;
use std::collections::BTreeMap;
use tagsync_core::{PostId, TagRuleDelta, TagSet};

/// Tag state of a post as returned by the remote API after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePost {
    pub id: PostId,
    pub tags: TagSet,
}

/// The remote write API.
pub trait PostEditor {
    /// Sends `diff` as the post's tag change and returns the updated post.
    fn submit_edit(&self, post_id: PostId, diff: &TagRuleDelta, reason: &str)
        -> Result<RemotePost>;
}

/// Editor used when no API credentials are configured. Every edit fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEditor;

impl PostEditor for OfflineEditor {
    fn submit_edit(&self, _post_id: PostId, _diff: &TagRuleDelta, _reason: &str)
        -> Result<RemotePost> {
        Err(SyncError::Unavailable("no api credentials configured".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub login: String,
    pub api_key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct PostEnvelope {
    post: PostBody,
}

#[derive(Debug, Deserialize)]
struct PostBody {
    id: i64,
    /// Tag names grouped by category.
    #[serde(default)]
    tags: BTreeMap<String, Vec<String>>,
}

/// Parses a `{"post": {"id": .., "tags": {category: [..]}}}` body, merging
/// all categories into one set.
pub fn parse_post_response(body: &str) -> Result<RemotePost> {
    let envelope: PostEnvelope =
        serde_json::from_str(body).map_err(|err| SyncError::Parse(err.to_string()))?;
    let id = PostId::new(envelope.post.id)?;
    let tags = TagSet::from_names(envelope.post.tags.values().flatten());
    Ok(RemotePost { id, tags })
}

#[cfg(feature = "api-sync")]
mod imp {
    use super::{parse_post_response, ApiSettings, PostEditor, RemotePost};
    use crate::{Result, SyncError};
    use reqwest::blocking::Client;
    use std::time::Duration;
    use tagsync_core::{PostId, TagRuleDelta};
    use url::Url;

    #[derive(Debug, Clone)]
    pub struct ApiClient {
        client: Client,
        base_url: Url,
        login: String,
        api_key: String,
    }

    impl ApiClient {
        pub fn new(settings: ApiSettings) -> Result<Self> {
            let base_url = Url::parse(&settings.base_url)?;
            if base_url.scheme() != "https" {
                return Err(SyncError::Parse("api base url must use https".to_string()));
            }
            let client = Client::builder()
                .user_agent(settings.user_agent)
                .timeout(Duration::from_secs(settings.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()?;
            Ok(Self {
                client,
                base_url,
                login: settings.login,
                api_key: settings.api_key,
            })
        }

        fn post_url(&self, post_id: PostId) -> Result<Url> {
            Ok(self.base_url.join(&format!("posts/{}.json", post_id))?)
        }
    }

    impl PostEditor for ApiClient {
        fn submit_edit(
            &self,
            post_id: PostId,
            diff: &TagRuleDelta,
            reason: &str,
        ) -> Result<RemotePost> {
            let diff = diff.api_string();
            let form = [
                ("post[tag_string_diff]", diff.as_str()),
                ("post[edit_reason]", reason),
            ];
            let response = self
                .client
                .patch(self.post_url(post_id)?)
                .basic_auth(&self.login, Some(&self.api_key))
                .form(&form)
                .send()?;

            let status = response.status();
            let body = response.text()?;
            if !status.is_success() {
                return Err(SyncError::Rejected {
                    post_id: post_id.get(),
                    message: format!("{status}: {}", body.trim()),
                });
            }
            parse_post_response(&body)
        }
    }
}

#[cfg(not(feature = "api-sync"))]
mod imp {
    use super::{ApiSettings, PostEditor, RemotePost};
    use crate::{Result, SyncError};
    use tagsync_core::{PostId, TagRuleDelta};

    #[derive(Debug, Clone)]
    pub struct ApiClient {
        _settings: ApiSettings,
    }

    impl ApiClient {
        pub fn new(_settings: ApiSettings) -> Result<Self> {
            Err(SyncError::Unavailable(
                "remote edits require the api-sync feature".to_string(),
            ))
        }
    }

    impl PostEditor for ApiClient {
        fn submit_edit(
            &self,
            _post_id: PostId,
            _diff: &TagRuleDelta,
            _reason: &str,
        ) -> Result<RemotePost> {
            Err(SyncError::Unavailable(
                "remote edits require the api-sync feature".to_string(),
            ))
        }
    }
}

pub use imp::ApiClient;
