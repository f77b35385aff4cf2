use crate::record::{relationship_ids, FieldValue};

/// Depth budget. No relationship is expanded once `depth + cost` reaches it.
pub const MAX_DEPTH: usize = 5;

/// Depth consumed by one relationship hop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RelationshipCost {
    Direct,
    /// Credit to person or role, measured from the depth of the object owning the credit.
    ThroughJoin,
}

impl RelationshipCost {
    #[must_use]
    pub fn value(self) -> usize {
        match self {
            Self::Direct => 1,
            Self::ThroughJoin => 2,
        }
    }
}

/// Whether a hop of `cost` from `depth` still fits the budget.
#[must_use]
pub fn within_budget(depth: usize, cost: RelationshipCost) -> bool {
    depth + cost.value() < MAX_DEPTH
}

/// Expand a relationship field into resolved objects.
///
/// Returns `None` when the hop would exhaust the depth budget; `resolve` is not called in
/// that case. Otherwise each referenced id is resolved at `depth + cost`, and ids that do
/// not resolve are dropped.
pub fn expand_field<T, F>(
    value: Option<&FieldValue>,
    depth: usize,
    cost: RelationshipCost,
    mut resolve: F,
) -> Option<Vec<T>>
where
    F: FnMut(&str, usize) -> Option<T>,
{
    if !within_budget(depth, cost) {
        tracing::trace!(depth, cost = cost.value(), "relationship truncated by depth budget");
        return None;
    }
    let child_depth = depth + cost.value();
    let resolved = relationship_ids(value)
        .into_iter()
        .filter_map(|id| {
            let resolved = resolve(id, child_depth);
            if resolved.is_none() {
                tracing::debug!(id, child_depth, "relationship id did not resolve");
            }
            resolved
        })
        .collect();
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn ids(values: &[&str]) -> FieldValue {
        FieldValue::List(values.iter().map(|value| (*value).to_string()).collect())
    }

    #[test]
    fn resolver_is_not_called_when_budget_is_exhausted() {
        let calls = Cell::new(0);
        let field = ids(&["a", "b"]);
        let result = expand_field(Some(&field), MAX_DEPTH - 1, RelationshipCost::Direct, |id, _| {
            calls.set(calls.get() + 1);
            Some(id.to_string())
        });
        assert_eq!(result, None);
        assert_eq!(calls.get(), 0);

        let joined =
            expand_field(Some(&field), MAX_DEPTH - 2, RelationshipCost::ThroughJoin, |id, _| {
                Some(id.to_string())
            });
        assert_eq!(joined, None);
    }

    #[test]
    fn absent_and_scalar_values_normalize() {
        let absent: Option<Vec<String>> =
            expand_field(None, 0, RelationshipCost::Direct, |id, _| Some(id.to_string()));
        assert_eq!(absent, Some(Vec::new()));

        let scalar = FieldValue::Text("p1".to_string());
        let single =
            expand_field(Some(&scalar), 0, RelationshipCost::Direct, |id, _| Some(id.to_string()));
        assert_eq!(single, Some(vec!["p1".to_string()]));

        let number = FieldValue::Number(3.0);
        let ignored: Option<Vec<String>> =
            expand_field(Some(&number), 0, RelationshipCost::Direct, |id, _| Some(id.to_string()));
        assert_eq!(ignored, Some(Vec::new()));
    }

    #[test]
    fn children_resolve_at_increased_depth_and_dangling_ids_drop() {
        let field = ids(&["keep", "dangling", "keep2"]);
        let result = expand_field(Some(&field), 1, RelationshipCost::ThroughJoin, |id, depth| {
            (id != "dangling").then(|| format!("{id}@{depth}"))
        });
        assert_eq!(result, Some(vec!["keep@3".to_string(), "keep2@3".to_string()]));
    }
}
