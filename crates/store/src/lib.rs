//! Persistence for the order desk.
//!
//! Three stores sit behind traits so the same domain logic runs against
//! in-memory doubles in tests and PostgreSQL in production:
//! - [`OrderStore`]: append-only order lines
//! - [`Catalog`]: item name to unit price
//! - [`UserStore`]: credentials and roles

pub mod catalog;
pub mod error;
pub mod line;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod users;

pub use catalog::{Catalog, Item};
pub use common::{Money, Role, SubmissionId};
pub use error::{Result, StoreError};
pub use line::{NewOrderLine, NewSubmission, OrderLine};
pub use memory::{InMemoryCatalog, InMemoryOrderStore, InMemoryUserStore};
pub use orders::OrderStore;
pub use postgres::{PostgresCatalog, PostgresOrderStore, PostgresUserStore, run_migrations};
pub use users::{UserRecord, UserStore};
