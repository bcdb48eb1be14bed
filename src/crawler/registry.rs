use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::debug;

/// Set of addresses already claimed for fetching during one crawl.
///
/// The only mutation is [`VisitedRegistry::claim`], which checks and inserts
/// under a single lock acquisition. Two workers racing on the same address
/// can never both see it as unclaimed.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    /// Addresses claimed so far
    claimed: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an address.
    ///
    /// Returns `true` if this call is the first to claim it, in which case the
    /// caller owns the fetch. Returns `false` if it was already claimed.
    pub async fn claim(&self, address: &str) -> bool {
        let mut claimed = self.claimed.lock().await;

        if claimed.contains(address) {
            debug!("Skipping already claimed address: {}", address);
            return false;
        }

        claimed.insert(address.to_string());
        true
    }

    /// Whether an address has been claimed
    pub async fn contains(&self, address: &str) -> bool {
        self.claimed.lock().await.contains(address)
    }

    /// Number of claimed addresses
    pub async fn len(&self) -> usize {
        self.claimed.lock().await.len()
    }

    /// Whether nothing has been claimed yet
    pub async fn is_empty(&self) -> bool {
        self.claimed.lock().await.is_empty()
    }

    /// Snapshot of the claimed addresses, sorted
    pub async fn claimed(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.claimed.lock().await.iter().cloned().collect();
        addresses.sort();
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_claim_once() {
        let registry = VisitedRegistry::new();
        assert!(registry.is_empty().await);

        // First claim wins
        assert!(registry.claim("http://golang.org/").await);

        // Later claims lose
        assert!(!registry.claim("http://golang.org/").await);
        assert!(!registry.claim("http://golang.org/").await);

        // Other addresses are independent
        assert!(registry.claim("http://golang.org/pkg/").await);

        assert_eq!(registry.len().await, 2);
        assert!(registry.contains("http://golang.org/pkg/").await);
        assert!(!registry.contains("http://golang.org/cmd/").await);
    }

    #[tokio::test]
    async fn test_addresses_are_not_normalized() {
        let registry = VisitedRegistry::new();

        assert!(registry.claim("http://golang.org").await);
        assert!(registry.claim("http://golang.org/").await);
        assert_eq!(
            registry.claimed().await,
            vec!["http://golang.org".to_string(), "http://golang.org/".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(VisitedRegistry::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.claim("http://golang.org/").await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(registry.len().await, 1);
    }
}
