/// Database models for GroupShare
///
/// Each model owns the SQL for its table. Authorization is not checked here;
/// the services consult the access gate before calling into models.
///
/// # Models
///
/// - `user`: accounts and password hashes
/// - `group`: groups with a single owner
/// - `membership`: user-group edges
/// - `resource`: shared shape of files and tasks, generic queries
/// - `file`: uploaded file metadata
/// - `task`: tasks
/// - `share`: resource-group share edges
///
/// # Example
///
/// ```no_run
/// use groupshare_shared::models::file::File;
/// use groupshare_shared::models::resource;
/// use groupshare_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let visible: Vec<File> = resource::list_visible_to(&pool, user_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod file;
pub mod group;
pub mod membership;
pub mod resource;
pub mod share;
pub mod task;
pub mod user;
