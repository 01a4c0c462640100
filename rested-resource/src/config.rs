use serde::{Deserialize, Serialize};

/// Names of the controller-managed timestamp fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created: String,
    pub updated: String,
}

impl Timestamps {
    pub fn new(created: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            created: created.into(),
            updated: updated.into(),
        }
    }
}

/// Settings of one resource controller.
///
/// Deserializes from the `resources` configuration section. Both snake_case
/// and camelCase keys are accepted:
///
/// ```yaml
/// resources:
///   - table: Users
///     timestamps: { created: createdAt, updated: updatedAt }
///     unique: [username]
///     updateOnConflict: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Logical collection name handed to the database backend.
    pub table: String,
    /// Timestamp field names. `None` disables timestamping.
    pub timestamps: Option<Timestamps>,
    /// Fields that must be unique within the table, checked in order.
    pub unique: Vec<String>,
    /// Turn a unique-field collision on create into an update of the
    /// existing record.
    #[serde(alias = "updateOnConflict")]
    pub update_on_conflict: bool,
}

impl ResourceConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn timestamps(mut self, created: impl Into<String>, updated: impl Into<String>) -> Self {
        self.timestamps = Some(Timestamps::new(created, updated));
        self
    }

    pub fn unique<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn update_on_conflict(mut self, enabled: bool) -> Self {
        self.update_on_conflict = enabled;
        self
    }

    /// Fields clients may never set directly: the identifier and both
    /// timestamp fields.
    pub fn is_reserved(&self, field: &str) -> bool {
        if field == rested_data::ID_FIELD {
            return true;
        }
        match &self.timestamps {
            Some(ts) => field == ts.created || field == ts.updated,
            None => false,
        }
    }
}
