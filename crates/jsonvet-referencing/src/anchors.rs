use std::sync::Arc;

use serde_json::Value;

use crate::{Draft, Error, Resolved, Resolver, Resource};

/// A named location within a resource, addressable by fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Anchor {
    pub(crate) name: String,
    pub(crate) kind: AnchorKind,
    pub(crate) resource: Arc<Resource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnchorKind {
    /// Resolves to its lexical location.
    Static,
    /// `$dynamicAnchor`: resolves through the dynamic scope, outermost first.
    Dynamic,
}

impl Anchor {
    pub(crate) fn resolve<'r>(&'r self, resolver: Resolver<'r>) -> Result<Resolved<'r>, Error> {
        match self.kind {
            AnchorKind::Static => Ok(Resolved::new(
                self.resource.contents(),
                resolver.in_subresource((*self.resource).as_ref())?,
                self.resource.draft(),
            )),
            AnchorKind::Dynamic => {
                // The scope is iterated newest-to-oldest; keeping the last
                // dynamic match selects the outermost scope, which takes
                // precedence in draft 2020-12.
                let mut target = &self.resource;
                for uri in resolver.dynamic_scope() {
                    match resolver.registry().anchor(uri, &self.name) {
                        Ok(anchor) if anchor.kind == AnchorKind::Dynamic => {
                            target = &anchor.resource;
                        }
                        Ok(_) | Err(Error::NoSuchAnchor { .. }) => {}
                        Err(err) => return Err(err),
                    }
                }
                Ok(Resolved::new(
                    target.contents(),
                    resolver.in_subresource((**target).as_ref())?,
                    target.draft(),
                ))
            }
        }
    }
}

/// Collect the anchors declared directly on a schema object.
pub(crate) fn anchors_of(draft: Draft, contents: &Value) -> Vec<Anchor> {
    let Some(schema) = contents.as_object() else {
        return Vec::new();
    };
    let mut anchors = Vec::new();
    let mut push = |name: &str, kind: AnchorKind| {
        anchors.push(Anchor {
            name: name.to_string(),
            kind,
            resource: Arc::new(draft.create_resource(contents.clone())),
        });
    };
    match draft {
        // Fragment-only identifiers act as anchors in the legacy drafts
        Draft::Draft4 => {
            if let Some(name) = schema
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| id.strip_prefix('#'))
            {
                push(name, AnchorKind::Static);
            }
        }
        Draft::Draft6 | Draft::Draft7 => {
            if let Some(name) = schema
                .get("$id")
                .and_then(Value::as_str)
                .and_then(|id| id.strip_prefix('#'))
            {
                push(name, AnchorKind::Static);
            }
        }
        Draft::Draft201909 | Draft::Draft202012 => {
            if let Some(name) = schema.get("$anchor").and_then(Value::as_str) {
                push(name, AnchorKind::Static);
            }
            if draft == Draft::Draft202012 {
                if let Some(name) = schema.get("$dynamicAnchor").and_then(Value::as_str) {
                    push(name, AnchorKind::Dynamic);
                }
            }
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::anchors_of;
    use crate::{AnchorKind, Draft};
    use serde_json::json;

    #[test]
    fn legacy_fragment_ids_become_anchors() {
        let anchors = anchors_of(Draft::Draft7, &json!({"$id": "#node"}));
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name, "node");
        assert_eq!(anchors[0].kind, AnchorKind::Static);
    }

    #[test]
    fn dynamic_anchor_is_only_recognized_in_2020_12() {
        let schema = json!({"$dynamicAnchor": "meta"});
        assert!(anchors_of(Draft::Draft201909, &schema).is_empty());
        let anchors = anchors_of(Draft::Draft202012, &schema);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].kind, AnchorKind::Dynamic);
    }
}
