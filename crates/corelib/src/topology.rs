//! Failure-domain topology.
//!
//! Every node sits at a [`Location`] in a fixed hierarchy of scopes:
//!
//! ```text
//! ROOT
//!  └─ REGION
//!      └─ DATA_CENTER
//!          └─ CLUSTER
//!              └─ ROW
//!                  └─ RACK
//!                      └─ NODE
//! ```
//!
//! A location is written as five dot-separated labels, widest first:
//! `region.datacenter.cluster.row.rack`. Trailing labels may be left empty
//! (`rg1.dc1...`) when the operator does not know the narrower scopes, but a
//! label can never be present below an empty one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A level of the failure-domain hierarchy, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationScope {
    Node,
    Rack,
    Row,
    Cluster,
    DataCenter,
    Region,
    Root,
}

impl LocationScope {
    /// All scopes, narrowest first.
    pub const ALL: [LocationScope; 7] = [
        LocationScope::Node,
        LocationScope::Rack,
        LocationScope::Row,
        LocationScope::Cluster,
        LocationScope::DataCenter,
        LocationScope::Region,
        LocationScope::Root,
    ];

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            LocationScope::Node => "NODE",
            LocationScope::Rack => "RACK",
            LocationScope::Row => "ROW",
            LocationScope::Cluster => "CLUSTER",
            LocationScope::DataCenter => "DATA_CENTER",
            LocationScope::Region => "REGION",
            LocationScope::Root => "ROOT",
        }
    }

    /// The scope directly above this one, `None` for `ROOT`.
    pub fn next_bigger(self) -> Option<LocationScope> {
        let idx = self as usize;
        Self::ALL.get(idx + 1).copied()
    }

    /// Position of this scope's label in a [`Location`], if it has one.
    fn label_index(self) -> Option<usize> {
        match self {
            LocationScope::Region => Some(0),
            LocationScope::DataCenter => Some(1),
            LocationScope::Cluster => Some(2),
            LocationScope::Row => Some(3),
            LocationScope::Rack => Some(4),
            LocationScope::Node | LocationScope::Root => None,
        }
    }
}

impl fmt::Display for LocationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocationScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|scope| scope.name() == upper)
            .ok_or_else(|| Error::InvalidScope(s.to_string()))
    }
}

/// Number of labelled scopes in a location (REGION through RACK).
const NUM_LABELS: usize = 5;

/// Hierarchical position of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Labels widest first; `None` once the operator stopped specifying.
    labels: [Option<String>; NUM_LABELS],
}

impl Location {
    /// True if this location names a domain at `scope`.
    ///
    /// `NODE` and `ROOT` are always specified: every node is its own domain
    /// and everything lives under the root.
    pub fn scope_specified(&self, scope: LocationScope) -> bool {
        match scope.label_index() {
            Some(idx) => self.labels[idx].is_some(),
            None => true,
        }
    }

    /// Canonical name of the domain this location belongs to at `scope`.
    ///
    /// The name is the dot-joined prefix of labels from `REGION` down to
    /// `scope`, so two locations share a domain exactly when their names are
    /// equal. `ROOT` maps to the empty string and `NODE` to the full
    /// location.
    pub fn get_domain(&self, scope: LocationScope) -> String {
        let depth = match scope {
            LocationScope::Root => return String::new(),
            LocationScope::Node => NUM_LABELS,
            other => other.label_index().map_or(NUM_LABELS, |idx| idx + 1),
        };
        self.labels[..depth]
            .iter()
            .map(|label| label.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// True if both locations are specified at `scope` and fall into the
    /// same domain there.
    pub fn shares_domain_with(&self, other: &Location, scope: LocationScope) -> bool {
        self.scope_specified(scope)
            && other.scope_specified(scope)
            && self.get_domain(scope) == other.get_domain(scope)
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidLocation {
            location: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != NUM_LABELS {
            return Err(invalid("expected 5 dot-separated labels"));
        }

        let mut labels: [Option<String>; NUM_LABELS] = Default::default();
        let mut seen_empty = false;
        for (slot, part) in labels.iter_mut().zip(parts) {
            if part.is_empty() {
                seen_empty = true;
            } else if seen_empty {
                return Err(invalid("label follows an empty label"));
            } else {
                *slot = Some(part.to_string());
            }
        }

        if labels[0].is_none() {
            return Err(invalid("location is empty"));
        }
        Ok(Self { labels })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_domain(LocationScope::Node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_ordering() {
        assert!(LocationScope::Node < LocationScope::Rack);
        assert!(LocationScope::Rack < LocationScope::Row);
        assert!(LocationScope::Region < LocationScope::Root);
        assert_eq!(LocationScope::Rack.next_bigger(), Some(LocationScope::Row));
        assert_eq!(LocationScope::Root.next_bigger(), None);
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!("rack".parse::<LocationScope>().unwrap(), LocationScope::Rack);
        assert_eq!(
            "DATA_CENTER".parse::<LocationScope>().unwrap(),
            LocationScope::DataCenter
        );
        assert!("shelf".parse::<LocationScope>().is_err());
    }

    #[test]
    fn test_partial_location() {
        let loc: Location = "rg1.dc1.cl1..".parse().unwrap();
        assert!(loc.scope_specified(LocationScope::Cluster));
        assert!(!loc.scope_specified(LocationScope::Row));
        assert!(!loc.scope_specified(LocationScope::Rack));
        assert_eq!(loc.to_string(), "rg1.dc1.cl1..");
    }

    #[test]
    fn test_gap_in_labels_rejected() {
        assert!("rg1..cl1.ro1.rk1".parse::<Location>().is_err());
        assert!("....".parse::<Location>().is_err());
        assert!("rg1.dc1".parse::<Location>().is_err());
    }
}
