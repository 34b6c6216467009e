use crate::config::DbSettings;
use crate::context::RequestContext;
use rusqlite::Connection;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    /// Who is asking; stamped into `updated_by` on every write.
    #[serde(default)]
    pub actor: Option<String>,
}

impl Request {
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.id.clone(), self.actor.as_deref())
    }
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub db_settings: DbSettings,
}

impl AppState {
    pub fn new(db_settings: DbSettings) -> Self {
        Self {
            workspace: None,
            db: None,
            db_settings,
        }
    }
}
