//! Node selection across the members of a CDM cluster
//!
//! A client is configured either with one fixed node address or with the full list
//! of node addresses in the cluster. Every call picks its own target so that load is
//! spread across nodes and a single unreachable node only affects the calls that
//! happened to land on it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Addresses a client may send requests to
///
/// The pool is never empty: the constructors and deserialization reject empty input,
/// which is what lets [`NodePool::select`] be infallible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeList", into = "NodeList")]
pub struct NodePool(NodeList);

/// Wire shape of a node pool: a bare string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum NodeList {
    Single(String),
    Pool(Vec<String>),
}

impl NodePool {
    /// A single fixed node address
    pub fn single(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        check_address(&address)?;
        Ok(Self(NodeList::Single(address)))
    }

    /// A pool of node addresses; selection is uniform over the list
    pub fn pool<I, S>(addresses: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
        if addresses.is_empty() {
            return Err(Error::invalid_argument("node pool must contain at least one address"));
        }
        for address in &addresses {
            check_address(address)?;
        }
        Ok(Self(NodeList::Pool(addresses)))
    }

    /// Parse a comma separated list; one entry yields a single fixed node
    pub fn parse_list(value: &str) -> Result<Self> {
        let addresses: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        match addresses.as_slice() {
            [] => Err(Error::invalid_argument("node list is empty")),
            [one] => Self::single(*one),
            many => Self::pool(many.iter().copied()),
        }
    }

    /// Pick the address to target for one call
    pub fn select(&self) -> &str {
        match &self.0 {
            NodeList::Single(address) => address,
            NodeList::Pool(addresses) => {
                let index = rand::thread_rng().gen_range(0..addresses.len());
                &addresses[index]
            }
        }
    }

    /// All configured addresses, in configuration order
    pub fn addresses(&self) -> Vec<&str> {
        match &self.0 {
            NodeList::Single(address) => vec![address.as_str()],
            NodeList::Pool(addresses) => addresses.iter().map(String::as_str).collect(),
        }
    }

    /// Whether this pool was configured as one fixed address
    pub fn is_single(&self) -> bool {
        matches!(self.0, NodeList::Single(_))
    }
}

fn check_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(Error::invalid_argument("node address cannot be blank"));
    }
    if address.contains("://") || address.contains('/') {
        return Err(Error::invalid_argument(format!(
            "node address '{}' must be a host or host:port, not a URL",
            address
        )));
    }
    Ok(())
}

impl TryFrom<NodeList> for NodePool {
    type Error = Error;

    fn try_from(list: NodeList) -> Result<Self> {
        match list {
            NodeList::Single(address) => Self::single(address),
            NodeList::Pool(addresses) => Self::pool(addresses),
        }
    }
}

impl From<NodePool> for NodeList {
    fn from(pool: NodePool) -> Self {
        pool.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_single_node_is_deterministic() {
        let pool = NodePool::single("10.0.0.5").unwrap();
        for _ in 0..20 {
            assert_eq!(pool.select(), "10.0.0.5");
        }
        assert!(pool.is_single());
    }

    #[test]
    fn test_empty_pool_rejected() {
        let err = NodePool::pool(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_url_rejected_as_address() {
        assert!(NodePool::single("https://10.0.0.1").is_err());
        assert!(NodePool::single("   ").is_err());
    }

    #[test]
    fn test_pool_eventually_visits_every_node() {
        let pool = NodePool::pool(["10.0.0.1", "10.0.0.2", "10.0.0.3"]).unwrap();
        let seen: HashSet<&str> = (0..500).map(|_| pool.select()).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_parse_list() {
        let pool = NodePool::parse_list("10.0.0.1").unwrap();
        assert!(pool.is_single());

        let pool = NodePool::parse_list(" 10.0.0.1, 10.0.0.2 ,").unwrap();
        assert_eq!(pool.addresses(), vec!["10.0.0.1", "10.0.0.2"]);

        assert!(NodePool::parse_list(" , ").is_err());
    }

    #[test]
    fn test_deserialize_string_or_list() {
        let pool: NodePool = serde_json::from_str("\"cdm.example.com\"").unwrap();
        assert!(pool.is_single());

        let pool: NodePool = serde_json::from_str("[\"a.example.com\", \"b.example.com\"]").unwrap();
        assert_eq!(pool.addresses().len(), 2);

        assert!(serde_json::from_str::<NodePool>("[]").is_err());
    }

    proptest! {
        #[test]
        fn prop_selection_stays_within_pool(
            addresses in proptest::collection::vec("[a-z0-9]{1,12}(\\.[a-z0-9]{1,8}){0,3}", 1..8)
        ) {
            let pool = NodePool::pool(addresses.clone()).unwrap();
            for _ in 0..16 {
                let picked = pool.select();
                prop_assert!(addresses.iter().any(|a| a == picked));
            }
        }
    }
}
