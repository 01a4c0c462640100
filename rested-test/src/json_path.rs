use serde_json::Value;

/// One step of a JSON path such as `items[1].metadata.b.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

/// Split a dotted path into tokens.
///
/// Panics on malformed brackets, which is the desired behavior in tests.
pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let (field, mut rest) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };
        if !field.is_empty() {
            tokens.push(PathToken::Field(field.to_string()));
        }
        while let Some(inner) = rest.strip_prefix('[') {
            let end = inner.find(']').expect("unclosed bracket in JSON path");
            let index = inner[..end]
                .parse()
                .expect("non-numeric array index in JSON path");
            tokens.push(PathToken::Index(index));
            rest = &inner[end + 1..];
        }
    }
    tokens
}

/// Resolve a path against `root`. Missing steps resolve to `null`.
///
/// A leading `[n]` indexes a top-level array: `[1].a`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root.clone();
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(&name).cloned().unwrap_or(Value::Null),
            PathToken::Index(idx) => current.get(idx).cloned().unwrap_or(Value::Null),
            PathToken::Len => {
                let len = match &current {
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    Value::String(s) => s.len(),
                    other => panic!("len() applied to non-collection: {other}"),
                };
                Value::from(len)
            }
        };
    }
    current
}
