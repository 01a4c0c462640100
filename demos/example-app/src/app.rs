use std::sync::Arc;

use rested::http::Router;
use rested::rested_data::{Database, InMemoryDatabase, Record};
use rested::rested_resource::{
    resource_router, session_router, ResourceConfig, ResourceController, SessionController,
    SessionControllerConfig, StripFields,
};
use rested::rested_security::{Argon2Password, Passwords, Sessions, TokenSession, TokenSessionConfig};
use rested::RestedConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One entry of the `resources` section.
#[derive(Debug, Deserialize)]
struct ResourceEntry {
    #[serde(flatten)]
    resource: ResourceConfig,
    /// Mount point, defaults to `/{table in lowercase}`.
    #[serde(default)]
    path: Option<String>,
    /// Serve without a session.
    #[serde(default)]
    public: bool,
    /// Fields neither accepted from clients nor shown to them.
    #[serde(default)]
    strip: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Seed {
    users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    username: String,
    password: String,
}

/// Assemble the application router from configuration.
pub async fn build(config: &RestedConfig) -> Result<Router, BoxError> {
    let database = Database::new(InMemoryDatabase::new());
    let passwords = Passwords::new(Argon2Password);
    let session_config: TokenSessionConfig = config.get("session")?;
    let sessions = Sessions::new(TokenSession::from_config(session_config)?);
    let accounts: SessionControllerConfig = config.get_opt("accounts")?.unwrap_or_default();

    let seed: Seed = config.get_opt("seed")?.unwrap_or_default();
    for user in seed.users {
        let hash = passwords.hash(&user.password).await?;
        let mut record = Record::new();
        record.insert(accounts.login_field.clone(), Value::String(user.username.clone()));
        record.insert(accounts.password_field.clone(), Value::String(hash));
        database.insert(&accounts.table, record).await?;
        info!(username = %user.username, "Seeded account");
    }

    let mut router = Router::new().nest(
        "/session",
        session_router(Arc::new(SessionController::new(
            database.clone(),
            sessions.clone(),
            passwords,
            accounts,
        ))),
    );

    let entries: Vec<ResourceEntry> = config.get_opt("resources")?.unwrap_or_default();
    for entry in entries {
        let path = entry
            .path
            .unwrap_or_else(|| format!("/{}", entry.resource.table.to_lowercase()));
        info!(table = %entry.resource.table, %path, public = entry.public, "Mounting resource");
        let mut controller = ResourceController::new(database.clone(), entry.resource)
            .with_shaper(StripFields::both(entry.strip));
        if !entry.public {
            controller = controller.with_sessions(sessions.clone());
        }
        router = router.nest(&path, resource_router(Arc::new(controller)));
    }

    Ok(config.response_headers()?.install(router))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rested_test::TestApp;
    use serde_json::json;

    const CONFIG: &str = r#"
cors: on
headers:
  - [x-powered-by, rested]
session:
  secret: test-secret
  expose: [id, username]
seed:
  users:
    - { username: admin, password: admin }
resources:
  - table: Users
    timestamps: { created: createdAt, updated: updatedAt }
    unique: [username]
    strip: [password]
  - table: Tasks
    public: true
"#;

    async fn app() -> TestApp {
        let config = RestedConfig::from_yaml(CONFIG).unwrap();
        TestApp::new(build(&config).await.unwrap())
    }

    #[tokio::test]
    async fn public_resource_needs_no_session() {
        let app = app().await;
        let resp = app
            .post("/tasks")
            .json(&json!({ "title": "write docs" }))
            .send()
            .await
            .assert_created()
            .assert_json_path("title", "write docs");
        assert_eq!(resp.header("x-powered-by"), Some("rested"));
        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn seeded_account_signs_in_and_reads_users() {
        let app = app().await;
        app.get("/users").send().await.assert_unauthorized();

        let token = app
            .post("/session")
            .json(&json!({ "username": "admin", "password": "admin" }))
            .send()
            .await
            .assert_created()
            .assert_json_path_absent("password")
            .header("x-token")
            .unwrap()
            .to_string();

        app.get("/users")
            .bearer(&token)
            .send()
            .await
            .assert_ok()
            .assert_json_path("len()", 1)
            .assert_json_path("[0].username", "admin")
            .assert_json_path_absent("[0].password");
        app.get("/session")
            .bearer(&token)
            .send()
            .await
            .assert_ok()
            .assert_json_path("username", "admin");
    }

    #[tokio::test]
    async fn seeded_account_uses_configured_login_field() {
        let config = RestedConfig::from_yaml(
            r#"
session:
  secret: test-secret
accounts:
  table: Accounts
  loginField: email
seed:
  users:
    - { username: admin@example.com, password: admin }
"#,
        )
        .unwrap();
        let app = TestApp::new(build(&config).await.unwrap());
        app.post("/session")
            .json(&json!({ "email": "admin@example.com", "password": "admin" }))
            .send()
            .await
            .assert_created()
            .assert_json_path("email", "admin@example.com")
            .assert_json_path_absent("username");
    }

    #[tokio::test]
    async fn users_resource_rejects_duplicate_username() {
        let app = app().await;
        let token = app
            .post("/session")
            .json(&json!({ "username": "admin", "password": "admin" }))
            .send()
            .await
            .assert_created()
            .header("x-token")
            .unwrap()
            .to_string();
        app.post("/users")
            .bearer(&token)
            .json(&json!({ "username": "admin", "password": "x" }))
            .send()
            .await
            .assert_conflict();
    }
}
