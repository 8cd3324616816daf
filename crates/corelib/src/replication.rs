//! Replication properties.
//!
//! A property is a set of `(scope, factor)` requirements: `{RACK: 2, NODE: 3}`
//! asks for three copies of every record spread over at least two racks.
//! Narrower scopes can never require fewer copies than wider ones.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::topology::LocationScope;

/// Per-log replication requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationProperty {
    /// Factor required at each specified scope, narrowest first.
    factors: BTreeMap<LocationScope, usize>,
}

impl ReplicationProperty {
    /// Build a property from `(scope, factor)` pairs.
    ///
    /// Fails if no pair is given, a factor is zero, a scope repeats, or a
    /// narrower scope requires fewer copies than a wider one.
    pub fn new(pairs: impl IntoIterator<Item = (LocationScope, usize)>) -> Result<Self> {
        let mut factors = BTreeMap::new();
        for (scope, factor) in pairs {
            if factor == 0 {
                return Err(Error::InvalidReplication(format!(
                    "replication factor for {scope} must be positive"
                )));
            }
            if factors.insert(scope, factor).is_some() {
                return Err(Error::InvalidReplication(format!(
                    "scope {scope} specified more than once"
                )));
            }
        }
        if factors.is_empty() {
            return Err(Error::InvalidReplication("no scopes specified".into()));
        }

        let mut narrower: Option<(LocationScope, usize)> = None;
        for (&scope, &factor) in &factors {
            if let Some((prev_scope, prev_factor)) = narrower {
                if prev_factor < factor {
                    return Err(Error::InvalidReplication(format!(
                        "{prev_scope} requires {prev_factor} copies but wider scope \
                         {scope} requires {factor}"
                    )));
                }
            }
            narrower = Some((scope, factor));
        }

        Ok(Self { factors })
    }

    /// Shorthand for a property with a single requirement.
    pub fn with_sync_scope(scope: LocationScope, replication_factor: usize) -> Result<Self> {
        Self::new([(scope, replication_factor)])
    }

    /// Total number of copies per record.
    pub fn replication_factor(&self) -> usize {
        self.factors.values().copied().max().unwrap_or(0)
    }

    /// All `(scope, factor)` requirements, narrowest first.
    pub fn iter(&self) -> impl Iterator<Item = (LocationScope, usize)> + '_ {
        self.factors.iter().map(|(&scope, &factor)| (scope, factor))
    }

    /// Requirements that are not implied by a wider one, narrowest first.
    ///
    /// `{NODE: 3, RACK: 3}` reduces to `[(RACK, 3)]` since three copies on
    /// three racks are necessarily on three nodes.
    pub fn distinct_replication_factors(&self) -> Vec<(LocationScope, usize)> {
        let pairs: Vec<_> = self.iter().collect();
        pairs
            .iter()
            .enumerate()
            .filter(|(i, (_, factor))| {
                pairs
                    .get(i + 1)
                    .map_or(true, |(_, wider_factor)| wider_factor < factor)
            })
            .map(|(_, pair)| *pair)
            .collect()
    }

    /// Collapse the property to `(sync_replication_scope, replication_factor)`.
    ///
    /// The sync scope is the narrowest distinct requirement; the factor is
    /// the total number of copies.
    pub fn reduce(&self) -> (LocationScope, usize) {
        let scope = self
            .distinct_replication_factors()
            .first()
            .map_or(LocationScope::Node, |(scope, _)| *scope);
        (scope, self.replication_factor())
    }
}

impl fmt::Display for ReplicationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .factors
            .iter()
            .rev()
            .map(|(scope, factor)| format!("{}: {}", scope.name().to_ascii_lowercase(), factor))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LocationScope::*;

    #[test]
    fn test_single_scope_reduce() {
        let prop = ReplicationProperty::with_sync_scope(Rack, 3).unwrap();
        assert_eq!(prop.reduce(), (Rack, 3));
        assert_eq!(prop.replication_factor(), 3);
    }

    #[test]
    fn test_mixed_scopes_reduce_to_narrowest_distinct() {
        let prop = ReplicationProperty::new([(Rack, 2), (Node, 3)]).unwrap();
        assert_eq!(prop.distinct_replication_factors(), vec![(Node, 3), (Rack, 2)]);
        assert_eq!(prop.reduce(), (Node, 3));

        let prop = ReplicationProperty::new([(Node, 3), (Rack, 3), (Region, 2)]).unwrap();
        assert_eq!(prop.distinct_replication_factors(), vec![(Rack, 3), (Region, 2)]);
        assert_eq!(prop.reduce(), (Rack, 3));
    }

    #[test]
    fn test_invalid_properties() {
        assert!(ReplicationProperty::new([]).is_err());
        assert!(ReplicationProperty::new([(Rack, 0)]).is_err());
        assert!(ReplicationProperty::new([(Node, 2), (Rack, 3)]).is_err());
    }

    #[test]
    fn test_display() {
        let prop = ReplicationProperty::new([(Rack, 2), (Node, 3)]).unwrap();
        assert_eq!(prop.to_string(), "{rack: 2, node: 3}");
    }
}
