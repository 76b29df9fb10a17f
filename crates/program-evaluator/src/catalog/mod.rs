//! Tenant-scoped program catalog: storage seams, listing queries, the service that
//! feeds stored snapshots into the analytics engine, and its HTTP router.

pub mod query;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use query::{Page, ProgramQuery, SortField, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repository::{ProgramRepository, RepositoryError, StudentRepository};
pub use router::{catalog_router, TenantContext, TENANT_HEADER};
pub use service::{CatalogError, CatalogService, NewProgram, ProgramUpdate};
