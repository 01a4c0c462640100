use rested_data::Record;

/// Pure transforms applied to records on their way in and out of a resource.
///
/// `inbound` turns a raw request body into a persistable record; `outbound`
/// turns a stored record into what the client sees. Both default to the
/// identity. Implementations must be deterministic and must not reach any
/// backend: a shaper may run more than once for the same request.
///
/// ```ignore
/// struct HidePassword;
///
/// impl RecordShaper for HidePassword {
///     fn outbound(&self, mut record: Record) -> Record {
///         record.remove("password");
///         record
///     }
/// }
/// ```
pub trait RecordShaper: Send + Sync + 'static {
    fn inbound(&self, record: Record) -> Record {
        record
    }

    fn outbound(&self, record: Record) -> Record {
        record
    }
}

/// Leaves records untouched in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityShaper;

impl RecordShaper for IdentityShaper {}

/// Removes named top-level fields from records.
#[derive(Debug, Clone, Default)]
pub struct StripFields {
    inbound: Vec<String>,
    outbound: Vec<String>,
}

impl StripFields {
    /// Hide `fields` from every response.
    pub fn outbound<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inbound: Vec::new(),
            outbound: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Drop `fields` from request bodies before they are stored.
    pub fn inbound<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inbound: fields.into_iter().map(Into::into).collect(),
            outbound: Vec::new(),
        }
    }

    /// Strip `fields` in both directions.
    pub fn both<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self {
            inbound: fields.clone(),
            outbound: fields,
        }
    }
}

fn strip(mut record: Record, fields: &[String]) -> Record {
    for field in fields {
        record.remove(field);
    }
    record
}

impl RecordShaper for StripFields {
    fn inbound(&self, record: Record) -> Record {
        strip(record, &self.inbound)
    }

    fn outbound(&self, record: Record) -> Record {
        strip(record, &self.outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rested_data::into_record;
    use serde_json::json;

    fn record() -> Record {
        into_record(json!({ "a": 1, "password": "123", "token": "t" })).unwrap()
    }

    #[test]
    fn identity_is_default() {
        assert_eq!(IdentityShaper.inbound(record()), record());
        assert_eq!(IdentityShaper.outbound(record()), record());
    }

    #[test]
    fn strip_outbound_only() {
        let shaper = StripFields::outbound(["password"]);
        assert!(shaper.inbound(record()).contains_key("password"));
        let out = shaper.outbound(record());
        assert!(!out.contains_key("password"));
        assert_eq!(out["a"], 1);
    }

    #[test]
    fn strip_both_directions() {
        let shaper = StripFields::both(["password", "token"]);
        let inbound = shaper.inbound(record());
        assert_eq!(inbound.len(), 1);
        let outbound = shaper.outbound(record());
        assert_eq!(outbound.len(), 1);
    }
}
