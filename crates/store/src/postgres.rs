use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, Role, SubmissionId};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::{Catalog, Item};
use crate::line::{NewSubmission, OrderLine};
use crate::orders::OrderStore;
use crate::users::{UserRecord, UserStore};
use crate::{Result, StoreError};

/// Runs the database migrations.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

const SELECT_LINES: &str = r#"
    SELECT submission_id, sequence, line_no, submitter, item, quantity, unit_price, line_total, placed_at
    FROM order_lines
"#;

const ORDER_NEWEST_FIRST: &str = " ORDER BY placed_at DESC, sequence DESC, line_no ASC";

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_line(row: PgRow) -> Result<OrderLine> {
        let quantity: i64 = row.try_get("quantity")?;
        let line_no: i32 = row.try_get("line_no")?;

        Ok(OrderLine {
            submission_id: SubmissionId::from_uuid(row.try_get::<Uuid, _>("submission_id")?),
            sequence: row.try_get("sequence")?,
            line_no: u32::try_from(line_no)
                .map_err(|_| StoreError::CorruptRow(format!("line_no {line_no}")))?,
            submitter: row.try_get("submitter")?,
            item: row.try_get("item")?,
            quantity: u32::try_from(quantity)
                .map_err(|_| StoreError::CorruptRow(format!("quantity {quantity}")))?,
            unit_price: Money::from_units(row.try_get("unit_price")?),
            line_total: Money::from_units(row.try_get("line_total")?),
            placed_at: row.try_get::<DateTime<Utc>, _>("placed_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, submission), fields(submitter = %submission.submitter, lines = submission.lines.len()))]
    async fn append(&self, submission: NewSubmission) -> Result<Vec<OrderLine>> {
        if submission.lines.is_empty() {
            return Err(StoreError::EmptySubmission);
        }

        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('submission_sequence')")
            .fetch_one(&mut *tx)
            .await?;

        let lines = submission.into_lines(sequence);
        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (submission_id, sequence, line_no, submitter, item, quantity, unit_price, line_total, placed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(line.submission_id.as_uuid())
            .bind(line.sequence)
            .bind(line.line_no as i32)
            .bind(&line.submitter)
            .bind(&line.item)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.units())
            .bind(line.line_total.units())
            .bind(line.placed_at)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping the transaction on an early return rolls every line back.
        tx.commit().await?;
        tracing::debug!(sequence, "submission stored");
        Ok(lines)
    }

    async fn list_all(&self) -> Result<Vec<OrderLine>> {
        let sql = format!("{SELECT_LINES}{ORDER_NEWEST_FIRST}");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }

    #[instrument(skip(self))]
    async fn list_by(&self, submitter: &str) -> Result<Vec<OrderLine>> {
        let sql = format!("{SELECT_LINES} WHERE submitter = $1{ORDER_NEWEST_FIRST}");
        let rows = sqlx::query(&sql)
            .bind(submitter)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }
}

/// PostgreSQL-backed catalog.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn price(&self, name: &str) -> Result<Money> {
        let price: Option<i64> = sqlx::query_scalar("SELECT price FROM items WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        price
            .map(Money::from_units)
            .ok_or_else(|| StoreError::ItemNotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query("SELECT name, price FROM items ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Item::new(
                    row.try_get::<String, _>("name")?,
                    Money::from_units(row.try_get("price")?),
                ))
            })
            .collect()
    }

    async fn add(&self, item: Item) -> Result<()> {
        sqlx::query("INSERT INTO items (name, price) VALUES ($1, $2)")
            .bind(&item.name)
            .bind(item.price.units())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return StoreError::ItemAlreadyExists(item.name.clone());
                }
                StoreError::Database(e)
            })?;

        Ok(())
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn seed_if_empty(&self, items: Vec<Item>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent seeders started at the same time.
        sqlx::query("LOCK TABLE items IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(false);
        }

        for item in &items {
            sqlx::query("INSERT INTO items (name, price) VALUES ($1, $2)")
                .bind(&item.name)
                .bind(item.price.units())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("catalog seeded");
        Ok(true)
    }
}

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a new PostgreSQL user store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find(&self, username: &str) -> Result<Option<UserRecord>> {
        let row: Option<PgRow> =
            sqlx::query("SELECT username, password_hash, role FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let role: String = row.try_get("role")?;
                Ok(Some(UserRecord {
                    username: row.try_get("username")?,
                    password_hash: row.try_get("password_hash")?,
                    role: role
                        .parse::<Role>()
                        .map_err(|e| StoreError::CorruptRow(e.to_string()))?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, user: UserRecord) -> Result<()> {
        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return StoreError::UserAlreadyExists(user.username.clone());
                }
                StoreError::Database(e)
            })?;

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
