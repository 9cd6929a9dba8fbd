/// Core services
///
/// Every operation takes the caller identity as an explicit `actor`
/// argument, re-reads the entities it needs from the record store, asks the
/// access gate for a decision, and only then mutates. No operation retries.
///
/// # Services
///
/// - [`identity`]: registration, authentication, password change
/// - [`membership`]: groups and membership edges
/// - [`catalog`]: files and tasks
/// - [`sharing`]: share edges and derived visibility

pub mod catalog;
pub mod identity;
pub mod membership;
pub mod sharing;
