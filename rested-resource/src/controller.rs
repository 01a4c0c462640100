use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rested_core::http::HeaderMap;
use rested_core::{HttpError, Reply};
use rested_data::{record_id, Database, Record, ID_FIELD};
use rested_security::{Session, Sessions};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ResourceConfig;
use crate::operation::Operation;
use crate::shaper::{IdentityShaper, RecordShaper};

/// One incoming request as seen by a resource operation.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
    pub headers: HeaderMap,
    /// The `{id}` path segment, for member routes.
    pub id: Option<String>,
    /// The parsed JSON object body, when one was sent.
    pub body: Option<Record>,
}

impl ResourceRequest {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Record) -> Self {
        self.body = Some(body);
        self
    }
}

fn require_id(id: &Option<String>) -> Result<&str, HttpError> {
    id.as_deref()
        .ok_or_else(|| HttpError::NotFound("missing identifier".into()))
}

/// CRUD orchestration over one table.
///
/// All capabilities are handed over at construction time. The configuration
/// is revisable between requests through [`reconfigure`](Self::reconfigure);
/// each operation reads one snapshot of it when it starts and keeps that
/// snapshot for its whole lifetime.
///
/// ```ignore
/// let users = ResourceController::new(
///     Database::new(InMemoryDatabase::new()),
///     ResourceConfig::new("Users").unique(["username"]),
/// )
/// .with_sessions(Sessions::new(TokenSession::new("secret")?))
/// .with_shaper(StripFields::outbound(["password"]));
/// ```
pub struct ResourceController {
    database: Database,
    sessions: Option<Sessions>,
    shaper: Arc<dyn RecordShaper>,
    config: RwLock<Arc<ResourceConfig>>,
}

impl ResourceController {
    /// A controller without session gating and with identity shaping.
    pub fn new(database: Database, config: ResourceConfig) -> Self {
        Self {
            database,
            sessions: None,
            shaper: Arc::new(IdentityShaper),
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// Require an authorization context on every operation.
    pub fn with_sessions(mut self, sessions: Sessions) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_shaper(mut self, shaper: impl RecordShaper) -> Self {
        self.shaper = Arc::new(shaper);
        self
    }

    /// Current configuration snapshot.
    pub async fn config(&self) -> Arc<ResourceConfig> {
        self.config.read().await.clone()
    }

    /// Revise the configuration. In-flight operations keep the snapshot they
    /// started with; later ones see the revision.
    pub async fn reconfigure(&self, revise: impl FnOnce(&mut ResourceConfig)) {
        let mut guard = self.config.write().await;
        let mut next = ResourceConfig::clone(&guard);
        revise(&mut next);
        debug!(table = %next.table, unique = ?next.unique, update_on_conflict = next.update_on_conflict, "Resource reconfigured");
        *guard = Arc::new(next);
    }

    /// Run `operation` against `request`.
    pub async fn dispatch(&self, operation: Operation, request: ResourceRequest) -> Result<Reply, HttpError> {
        match operation {
            Operation::Create => self.create(request).await,
            Operation::List => self.list(request).await,
            Operation::Show => self.show(request).await,
            Operation::Update => self.update(request).await,
            Operation::Replace => self.replace(request).await,
            Operation::Delete => self.delete(request).await,
            Operation::Preflight => Ok(Reply::no_content()),
        }
    }

    /// Insert a record, or resolve a unique-field collision.
    ///
    /// Responds 201 on insert. On collision, responds 409, or 200 after
    /// merging the body onto the colliding record when `update_on_conflict`
    /// is set.
    pub async fn create(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let candidate = self.shape_inbound(&config, request.body);

        // check-then-act, not atomic
        if let Some(existing) = self.find_conflict(&config, &candidate).await? {
            let id = record_id(&existing)
                .ok_or_else(|| HttpError::Internal(format!("{} record without identifier", config.table)))?;
            if !config.update_on_conflict {
                return Err(HttpError::Conflict(format!("{}/{id}", config.table)));
            }
            debug!(table = %config.table, id = %id, "Create collided, updating existing record");
            let stored = self
                .database
                .patch(&config.table, &id, touch(&config, &existing, candidate))
                .await?;
            return Ok(Reply::ok(self.shape_outbound(stored)));
        }

        let mut record = candidate;
        if let Some(ts) = &config.timestamps {
            let now = format_timestamp(Utc::now());
            record.insert(ts.created.clone(), now.clone());
            record.insert(ts.updated.clone(), now);
        }
        let stored = self.database.insert(&config.table, record).await?;
        debug!(table = %config.table, id = ?stored.get(ID_FIELD), "Created record");
        Ok(Reply::created(self.shape_outbound(stored)))
    }

    pub async fn show(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let id = require_id(&request.id)?;
        let record = self.fetch(&config, id).await?;
        Ok(Reply::ok(self.shape_outbound(record)))
    }

    pub async fn list(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let records = self.database.list(&config.table).await?;
        let shaped = records
            .into_iter()
            .map(|record| self.shape_outbound(record))
            .collect();
        Ok(Reply::ok(Value::Array(shaped)))
    }

    /// Merge the body onto the stored record. Omitted fields are kept,
    /// `created` is kept, `updated` is reset.
    pub async fn update(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let id = require_id(&request.id)?;
        let existing = self.fetch(&config, id).await?;
        let fields = touch(&config, &existing, self.shape_inbound(&config, request.body));
        let stored = self.database.patch(&config.table, id, fields).await?;
        Ok(Reply::ok(self.shape_outbound(stored)))
    }

    /// Substitute every non-reserved field of the stored record with the body.
    pub async fn replace(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let id = require_id(&request.id)?;
        let existing = self.fetch(&config, id).await?;

        let mut record = touch(&config, &existing, self.shape_inbound(&config, request.body));
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        if let Some(ts) = &config.timestamps {
            if let Some(created) = existing.get(&ts.created) {
                record.insert(ts.created.clone(), created.clone());
            }
        }
        let stored = self.database.replace(&config.table, id, record).await?;
        Ok(Reply::ok(self.shape_outbound(stored)))
    }

    pub async fn delete(&self, request: ResourceRequest) -> Result<Reply, HttpError> {
        let config = self.config().await;
        self.authorize(&request.headers).await?;
        let id = require_id(&request.id)?;
        self.fetch(&config, id).await?;
        self.database.delete(&config.table, id).await?;
        debug!(table = %config.table, id, "Deleted record");
        Ok(Reply::no_content())
    }

    /// Establish the authorization context, if sessions are configured.
    async fn authorize(&self, headers: &HeaderMap) -> Result<Option<Session>, HttpError> {
        let Some(sessions) = &self.sessions else {
            return Ok(None);
        };
        match sessions.load(headers).await? {
            Some(session) => Ok(Some(session)),
            None => Err(HttpError::Unauthorized("no session".into())),
        }
    }

    async fn fetch(&self, config: &ResourceConfig, id: &str) -> Result<Record, HttpError> {
        self.database
            .find_by_id(&config.table, id)
            .await?
            .ok_or_else(|| HttpError::NotFound(format!("{}/{id}", config.table)))
    }

    /// First stored record colliding with `candidate` on a unique field,
    /// in `unique` order.
    async fn find_conflict(
        &self,
        config: &ResourceConfig,
        candidate: &Record,
    ) -> Result<Option<Record>, HttpError> {
        for field in &config.unique {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            if let Some(existing) = self
                .database
                .find_by_field(&config.table, field, value)
                .await?
            {
                return Ok(Some(existing));
            }
        }
        Ok(None)
    }

    fn shape_inbound(&self, config: &ResourceConfig, body: Option<Record>) -> Record {
        let mut record = self.shaper.inbound(body.unwrap_or_default());
        record.retain(|field, _| !config.is_reserved(field));
        record
    }

    fn shape_outbound(&self, record: Record) -> Value {
        Value::Object(self.shaper.outbound(record))
    }
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("database", &self.database)
            .field("sessions", &self.sessions.is_some())
            .finish_non_exhaustive()
    }
}

/// Reset the `updated` timestamp on a set of fields about to be written
/// over `existing`.
fn touch(config: &ResourceConfig, existing: &Record, mut fields: Record) -> Record {
    if let Some(ts) = &config.timestamps {
        let previous = existing.get(&ts.updated).and_then(Value::as_str);
        fields.insert(ts.updated.clone(), format_timestamp(next_timestamp(previous, Utc::now())));
    }
    fields
}

/// `now`, or one millisecond past `previous` when the clock has not moved
/// beyond it at millisecond precision.
fn next_timestamp(previous: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(previous) = previous.and_then(|p| DateTime::parse_from_rfc3339(p).ok()) else {
        return now;
    };
    let previous = previous.with_timezone(&Utc);
    let floor = previous + Duration::milliseconds(1);
    if now.timestamp_millis() < floor.timestamp_millis() {
        floor
    } else {
        now
    }
}

fn format_timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
