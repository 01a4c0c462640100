use rested_core::http::Method;

/// The closed set of operations a resource answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    List,
    Show,
    Update,
    Replace,
    Delete,
    Preflight,
}

impl Operation {
    /// Map a verb and path shape (`/` or `/{id}`) to an operation.
    ///
    /// Returns `None` for combinations the resource does not serve; the
    /// router answers those with an empty 404.
    pub fn resolve(method: &Method, has_id: bool) -> Option<Self> {
        let op = match (method.as_str(), has_id) {
            ("POST", false) => Operation::Create,
            ("GET", false) => Operation::List,
            ("GET", true) => Operation::Show,
            ("PATCH", true) => Operation::Update,
            ("PUT", true) => Operation::Replace,
            ("DELETE", true) => Operation::Delete,
            ("OPTIONS", _) => Operation::Preflight,
            _ => return None,
        };
        Some(op)
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Show => "show",
            Operation::Update => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Preflight => "preflight",
        }
    }

    /// Whether the operation issues a write to the database.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::Update | Operation::Replace | Operation::Delete
        )
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_table() {
        let cases = [
            (Method::POST, false, Some(Operation::Create)),
            (Method::GET, false, Some(Operation::List)),
            (Method::GET, true, Some(Operation::Show)),
            (Method::PATCH, true, Some(Operation::Update)),
            (Method::PUT, true, Some(Operation::Replace)),
            (Method::DELETE, true, Some(Operation::Delete)),
            (Method::OPTIONS, false, Some(Operation::Preflight)),
            (Method::OPTIONS, true, Some(Operation::Preflight)),
        ];
        for (method, has_id, expected) in cases {
            assert_eq!(Operation::resolve(&method, has_id), expected, "{method} {has_id}");
        }
    }

    #[test]
    fn unserved_combinations() {
        assert_eq!(Operation::resolve(&Method::POST, true), None);
        assert_eq!(Operation::resolve(&Method::PUT, false), None);
        assert_eq!(Operation::resolve(&Method::PATCH, false), None);
        assert_eq!(Operation::resolve(&Method::DELETE, false), None);
        assert_eq!(Operation::resolve(&Method::HEAD, false), None);
        assert_eq!(Operation::resolve(&Method::TRACE, true), None);
    }

    #[test]
    fn mutations() {
        assert!(Operation::Create.is_mutation());
        assert!(Operation::Delete.is_mutation());
        assert!(!Operation::Show.is_mutation());
        assert!(!Operation::Preflight.is_mutation());
        assert_eq!(Operation::Replace.to_string(), "replace");
    }
}
