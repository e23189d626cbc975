//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Project access additionally
//! requires an [`OwnerScope`](tracker_core::ownership::OwnerScope); there is
//! no unscoped project accessor.

pub mod project_repo;
pub mod session_repo;
pub mod user_repo;

pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
