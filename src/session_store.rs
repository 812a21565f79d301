use std::fs;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use jiff::Timestamp;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::session::{Session, User};
use crate::error::{AppError, AppResult};

const SESSION_FILE_NAME: &str = "sessions.json";
const SESSION_LIMIT: usize = 8;

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    entries: Vec<SessionEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct SessionEntry {
    key: String,
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
    user: User,
}

/// Signed-in sessions, one per identity endpoint. Tokens are stored in plain
/// text next to the config file.
pub struct SessionStore {
    file_path: PathBuf,
    file: SessionFile,
}

impl SessionStore {
    pub fn load(state_dir: &Path) -> AppResult<Self> {
        let path = state_dir.join(SESSION_FILE_NAME);
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<SessionFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid session file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn get(&self, key: &str) -> Option<Session> {
        self.file
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| Session {
                access_token: SecretString::from(entry.access_token.clone()),
                refresh_token: entry.refresh_token.clone().map(SecretString::from),
                expires_at: entry.expires_at,
                user: entry.user.clone(),
            })
    }

    pub fn insert(&mut self, key: String, session: &Session) {
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(SessionEntry {
            key,
            access_token: session.access_token.expose_secret().to_string(),
            refresh_token: session
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            expires_at: session.expires_at,
            user: session.user.clone(),
        });

        if self.file.entries.len() > SESSION_LIMIT {
            let overflow = self.file.entries.len() - SESSION_LIMIT;
            self.file.entries.drain(0..overflow);
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.file.entries.len();
        self.file.entries.retain(|entry| entry.key != key);
        before != self.file.entries.len()
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.file_path, data)?;

        // Owner read/write only; the file holds bearer tokens.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.file_path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    pub fn compute_key(endpoint: &str, api_key: &str) -> String {
        let mut hasher = Hasher::new();
        hasher.update(endpoint.trim_end_matches('/').as_bytes());
        hasher.update(api_key.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            access_token: SecretString::from(token.to_string()),
            refresh_token: Some(SecretString::from("refresh".to_string())),
            expires_at: Some(Timestamp::constant(1_705_314_600, 0)),
            user: User {
                id: "user-1".to_string(),
                email: Some("agent@example.com".to_string()),
                name: None,
            },
        }
    }

    #[test]
    fn persists_sessions_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        assert!(store.get("a").is_none());

        store.insert("a".to_string(), &session("token-a"));
        store.save().unwrap();

        let reloaded = SessionStore::load(dir.path()).unwrap();
        let restored = reloaded.get("a").unwrap();
        assert_eq!(restored.access_token.expose_secret(), "token-a");
        assert_eq!(
            restored.refresh_token.as_ref().map(|t| t.expose_secret()),
            Some("refresh")
        );
        assert_eq!(restored.user.id, "user-1");
        assert!(reloaded.get("b").is_none());
    }

    #[test]
    fn insert_replaces_and_remove_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        store.insert("a".to_string(), &session("old"));
        store.insert("a".to_string(), &session("new"));
        assert_eq!(store.get("a").unwrap().access_token.expose_secret(), "new");
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
    }

    #[test]
    fn keeps_only_most_recent_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        for index in 0..(SESSION_LIMIT + 2) {
            store.insert(format!("key-{index}"), &session("t"));
        }
        assert!(store.get("key-0").is_none());
        assert!(store.get("key-1").is_none());
        assert!(store.get(&format!("key-{}", SESSION_LIMIT + 1)).is_some());
    }

    #[test]
    fn key_ignores_trailing_slash() {
        assert_eq!(
            SessionStore::compute_key("https://auth.example/", "anon"),
            SessionStore::compute_key("https://auth.example", "anon")
        );
        assert_ne!(
            SessionStore::compute_key("https://auth.example", "anon"),
            SessionStore::compute_key("https://other.example", "anon")
        );
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path()).unwrap();
        store.insert("a".to_string(), &session("token-a"));
        store.save().unwrap();

        let mode = fs::metadata(dir.path().join(SESSION_FILE_NAME))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
