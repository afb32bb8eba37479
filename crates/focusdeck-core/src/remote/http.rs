//! HTTP client for the remote task store.
//!
//! Endpoints:
//! - `GET  {base}/items/{id}`  -> WorkItemSnapshot
//! - `PATCH {base}/items/{id}` <- timer patch body
//! - `GET  {base}/roster`      -> [HandoffTarget]
//!
//! The client owns a small tokio runtime so the synchronous `TaskRemote`
//! methods can be called from any thread, including the backup thread.

use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::error::RemoteError;
use crate::model::{HandoffTarget, WorkItemSnapshot};
use crate::remote::{TaskRemote, TimerPatch};

pub struct HttpTaskRemote {
    base: Url,
    api_token: Option<String>,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTaskRemote {
    pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base,
            api_token,
            client: Client::new(),
            runtime,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base.join(path)?)
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Wire body for an item update. Timer fields are always written;
    /// null means an explicit clear on the remote side.
    fn patch_body(patch: &TimerPatch) -> serde_json::Value {
        let mut body = json!({
            "timer_state": patch.timer_state,
            "current_session_start": patch.current_session_start_ms,
            "focus_sessions": patch.sessions,
            "total_session_count": patch.total_session_count,
            "total_time_spent_ms": patch.total_time_spent_ms,
        });
        let map = body.as_object_mut().expect("patch body is an object");
        if let Some(status) = patch.status {
            map.insert("status".into(), json!(status));
        }
        if let Some(owner) = &patch.owner {
            map.insert("assignee_id".into(), json!(owner.assignee_id));
            map.insert("agent_id".into(), json!(owner.agent_id));
        }
        if let Some(due) = patch.due_date {
            map.insert("due_date".into(), json!(due));
        }
        if patch.clear_queue_position {
            map.insert("queue_position".into(), serde_json::Value::Null);
        }
        body
    }
}

impl TaskRemote for HttpTaskRemote {
    fn fetch_item(&self, id: &str) -> Result<WorkItemSnapshot, RemoteError> {
        let url = self.endpoint(&format!("items/{id}"))?;
        let req = self.with_auth(self.client.get(url));
        let resp = self.runtime.block_on(req.send())?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::ItemNotFound(id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(RemoteError::Api {
                status: resp.status().as_u16(),
                operation: format!("fetch item {id}"),
            });
        }

        let item: WorkItemSnapshot = self.runtime.block_on(resp.json())?;
        Ok(item)
    }

    fn update_item(&self, id: &str, patch: &TimerPatch) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("items/{id}"))?;
        let body = Self::patch_body(patch);
        let req = self.with_auth(self.client.patch(url)).json(&body);
        let resp = self.runtime.block_on(req.send())?;

        if !resp.status().is_success() {
            return Err(RemoteError::Api {
                status: resp.status().as_u16(),
                operation: format!("update item {id}"),
            });
        }
        Ok(())
    }

    fn fetch_roster(&self) -> Result<Vec<HandoffTarget>, RemoteError> {
        let url = self.endpoint("roster")?;
        let req = self.with_auth(self.client.get(url));
        let resp = self.runtime.block_on(req.send())?;

        if !resp.status().is_success() {
            return Err(RemoteError::Api {
                status: resp.status().as_u16(),
                operation: "fetch roster".to_string(),
            });
        }

        let roster: Vec<HandoffTarget> = self.runtime.block_on(resp.json())?;
        Ok(roster)
    }
}
