//! Generic data access shared by every entity.
//!
//! Any type implementing [`Record`] gets `all`, `filter`, `get_by_id`,
//! `bulk_create`, `bulk_update`, `save` and `update`. All of them run inside
//! the caller's [`Session`]; only `save(.., commit = true)` commits it.
//!
//! Constraint violations are classified by the driver's error kind and the
//! constraint name, never by parsing the error message.

use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;
use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{DbError, Session};

/// Columns every table carries in addition to [`Record::COLUMNS`].
const BASE_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// A named unique constraint and the columns it covers.
#[derive(Debug, Clone, Copy)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Server-generated values of a written row.
#[derive(Debug, Clone, FromRow)]
pub struct Persisted {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row type stored in its own table with an integer primary key and
/// `created_at`/`updated_at` timestamps.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Entity name used in error messages.
    const NAME: &'static str;
    /// Writable columns, in the order [`Record::values`] returns them.
    const COLUMNS: &'static [&'static str];
    const UNIQUE_CONSTRAINTS: &'static [UniqueConstraint] = &[];

    /// Partial field set accepted by [`update`].
    type Changes: Send;

    /// Primary key, `None` until the record has been written.
    fn id(&self) -> Option<i64>;

    /// Values of [`Record::COLUMNS`].
    fn values(&self) -> Vec<Value>;

    /// Absorb the server-generated values after a write.
    fn mark_persisted(&mut self, persisted: Persisted);

    /// Overwrite the fields present in `changes`.
    fn apply(&mut self, changes: Self::Changes);
}

/// A bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn push_bind(self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Null => {
                builder.push_bind(None::<i64>);
            }
            Value::Integer(v) => {
                builder.push_bind(v);
            }
            Value::Text(v) => {
                builder.push_bind(v);
            }
            Value::Timestamp(v) => {
                builder.push_bind(v);
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    /// Parse the short name used in query keys (`eq`, `ne`, `lt`, `le`, `gt`,
    /// `ge`).
    pub fn from_suffix(suffix: &str) -> Option<Op> {
        match suffix {
            "eq" => Some(Op::Eq),
            "ne" => Some(Op::Ne),
            "lt" => Some(Op::Lt),
            "le" => Some(Op::Le),
            "gt" => Some(Op::Gt),
            "ge" => Some(Op::Ge),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }
}

/// One predicate of a [`filter`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: &'static str,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(column: &'static str, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Eq, value)
    }

    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(self.column);
        match self.op {
            Op::Eq if self.value.is_null() => {
                builder.push(" IS NULL");
            }
            Op::Ne if self.value.is_null() => {
                builder.push(" IS NOT NULL");
            }
            op => {
                builder.push(" ").push(op.as_sql()).push(" ");
                self.value.clone().push_bind(builder);
            }
        }
    }
}

fn select_sql<R: Record>() -> String {
    let columns: Vec<&str> = BASE_COLUMNS.iter().chain(R::COLUMNS).copied().collect();
    format!("SELECT {} FROM {}", columns.join(", "), R::TABLE)
}

fn is_known_column<R: Record>(column: &'static str) -> bool {
    BASE_COLUMNS.contains(&column) || R::COLUMNS.contains(&column)
}

/// The column of `R` called `name`, including `id` and the timestamps.
pub fn column<R: Record>(name: &str) -> Option<&'static str> {
    BASE_COLUMNS
        .iter()
        .chain(R::COLUMNS)
        .copied()
        .find(|column| *column == name)
}

/// Every row of `R`, ordered by id.
pub async fn all<R: Record>(session: &mut Session) -> Result<Vec<R>, DbError> {
    let sql = format!("{} ORDER BY id", select_sql::<R>());
    let rows = sqlx::query_as::<_, R>(&sql)
        .fetch_all(session.conn().await?)
        .await?;
    Ok(rows)
}

/// Rows of `R` matching every condition, ordered by id.
pub async fn filter<R: Record>(
    session: &mut Session,
    conditions: &[Condition],
) -> Result<Vec<R>, DbError> {
    let mut builder = QueryBuilder::<Sqlite>::new(select_sql::<R>());
    for (i, condition) in conditions.iter().enumerate() {
        if !is_known_column::<R>(condition.column) {
            return Err(DbError::UnknownColumn {
                entity: R::NAME,
                column: condition.column,
            });
        }
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        condition.push_to(&mut builder);
    }
    builder.push(" ORDER BY id");

    let rows = builder
        .build_query_as::<R>()
        .fetch_all(session.conn().await?)
        .await?;
    Ok(rows)
}

/// The row with the given primary key, or `None`.
pub async fn get_by_id<R: Record>(session: &mut Session, id: i64) -> Result<Option<R>, DbError> {
    let sql = format!("{} WHERE id = ?", select_sql::<R>());
    let row = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(session.conn().await?)
        .await?;
    Ok(row)
}

/// Insert all records atomically.
///
/// The batch runs in a savepoint: if any insert fails none of them remain in
/// the session.
pub async fn bulk_create<R: Record>(
    session: &mut Session,
    mut records: Vec<R>,
) -> Result<Vec<R>, DbError> {
    if records.is_empty() {
        return Ok(records);
    }

    let now = Utc::now();
    let mut savepoint = session.conn().await?.begin().await?;
    for record in records.iter_mut() {
        let persisted = insert_row(&mut savepoint, &*record, now)
            .await
            .map_err(|err| translate::<R>(err, None))?;
        record.mark_persisted(persisted);
    }
    savepoint.commit().await?;

    tracing::debug!(table = R::TABLE, count = records.len(), "Bulk insert");
    Ok(records)
}

/// Upsert every record by primary key; records without an id are inserted.
///
/// All-or-nothing: the first failing record aborts the batch and the error
/// carries that record's id.
pub async fn bulk_update<R: Record>(
    session: &mut Session,
    mut records: Vec<R>,
) -> Result<Vec<R>, DbError> {
    if records.is_empty() {
        return Ok(records);
    }

    let now = Utc::now();
    let mut savepoint = session.conn().await?.begin().await?;
    for record in records.iter_mut() {
        let object_id = record.id();
        let written = match object_id {
            Some(id) => upsert_row(&mut savepoint, &*record, id, now).await,
            None => insert_row(&mut savepoint, &*record, now).await,
        };
        let persisted = written.map_err(|err| translate::<R>(err, object_id))?;
        record.mark_persisted(persisted);
    }
    savepoint.commit().await?;

    tracing::debug!(table = R::TABLE, count = records.len(), "Bulk upsert");
    Ok(records)
}

/// Write the record inside the session: insert when it has no id, update
/// otherwise. Commits the session only when `commit` is set.
pub async fn save<R: Record>(
    session: &mut Session,
    record: &mut R,
    commit: bool,
) -> Result<(), DbError> {
    let now = Utc::now();
    let conn = session.conn().await?;
    let persisted = match record.id() {
        None => insert_row(conn, &*record, now)
            .await
            .map_err(|err| translate::<R>(err, None))?,
        Some(id) => update_row(conn, &*record, id, now)
            .await
            .map_err(|err| translate::<R>(err, Some(id)))?
            .ok_or(DbError::RowNotFound { entity: R::NAME, id })?,
    };
    record.mark_persisted(persisted);

    if commit {
        session.commit().await?;
    }
    Ok(())
}

/// Apply a partial change set and save without committing.
pub async fn update<R: Record>(
    session: &mut Session,
    record: &mut R,
    changes: R::Changes,
) -> Result<(), DbError> {
    record.apply(changes);
    save(session, record, false).await
}

async fn insert_row<R: Record>(
    conn: &mut SqliteConnection,
    record: &R,
    now: DateTime<Utc>,
) -> Result<Persisted, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "INSERT INTO {} (created_at, updated_at, {}) VALUES (",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));
    builder.push_bind(now);
    builder.push(", ").push_bind(now);
    for value in record.values() {
        builder.push(", ");
        value.push_bind(&mut builder);
    }
    builder.push(") RETURNING id, created_at, updated_at");

    builder.build_query_as::<Persisted>().fetch_one(conn).await
}

async fn upsert_row<R: Record>(
    conn: &mut SqliteConnection,
    record: &R,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Persisted, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "INSERT INTO {} (id, created_at, updated_at, {}) VALUES (",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));
    builder.push_bind(id);
    builder.push(", ").push_bind(now);
    builder.push(", ").push_bind(now);
    for value in record.values() {
        builder.push(", ");
        value.push_bind(&mut builder);
    }
    builder.push(") ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at");
    for column in R::COLUMNS {
        builder.push(format!(", {column} = excluded.{column}"));
    }
    builder.push(" RETURNING id, created_at, updated_at");

    builder.build_query_as::<Persisted>().fetch_one(conn).await
}

async fn update_row<R: Record>(
    conn: &mut SqliteConnection,
    record: &R,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Persisted>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET updated_at = ", R::TABLE));
    builder.push_bind(now);
    for (column, value) in R::COLUMNS.iter().zip(record.values()) {
        builder.push(format!(", {column} = "));
        value.push_bind(&mut builder);
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING id, created_at, updated_at");

    builder
        .build_query_as::<Persisted>()
        .fetch_optional(conn)
        .await
}

/// Map constraint violations to typed errors; everything else passes through.
fn translate<R: Record>(err: sqlx::Error, object_id: Option<i64>) -> DbError {
    let details = err
        .as_database_error()
        .map(|db_err| (db_err.kind(), db_err.constraint().map(str::to_owned)));
    let Some((kind, constraint)) = details else {
        return DbError::Sqlx(err);
    };

    let translated = match kind {
        ErrorKind::UniqueViolation => DbError::Validation {
            message: format!("Unique constraint violated for {}", R::NAME),
            fields: offending_fields::<R>(constraint.as_deref()),
            object_id,
        },
        ErrorKind::ForeignKeyViolation => DbError::ForeignKey {
            message: format!("Foreign key constraint violated for {}", R::NAME),
            object_id,
        },
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => DbError::Validation {
            message: format!("Integrity error for {}", R::NAME),
            fields: Vec::new(),
            object_id,
        },
        _ => return DbError::Sqlx(err),
    };

    tracing::warn!(
        entity = R::NAME,
        object_id = ?object_id,
        error = %err,
        "Constraint violation: {}",
        translated
    );
    translated
}

/// Columns of the violated unique constraint.
///
/// Drivers that report the constraint name are matched by name; otherwise an
/// entity with a single unique constraint is unambiguous.
fn offending_fields<R: Record>(constraint: Option<&str>) -> Vec<String> {
    let matched = match constraint {
        Some(name) => R::UNIQUE_CONSTRAINTS.iter().find(|c| c.name == name),
        None => match R::UNIQUE_CONSTRAINTS {
            [only] => Some(only),
            _ => None,
        },
    };
    matched
        .map(|c| c.columns.iter().map(|col| col.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    use super::*;
    use crate::db::init_database;
    use crate::models::{Card, CardChanges, Deck, DeckChanges};

    async fn setup() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (dir, pool)
    }

    async fn saved_deck(session: &mut Session, name: &str) -> Deck {
        let mut deck = Deck::new(name, None);
        save(session, &mut deck, false).await.unwrap();
        deck
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_timestamps() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let deck = saved_deck(&mut session, "Spanish").await;

        assert!(deck.id.is_some());
        assert!(deck.created_at.is_some());
        assert_eq!(deck.created_at, deck.updated_at);
    }

    #[tokio::test]
    async fn test_save_without_commit_is_rolled_back() {
        let (_dir, pool) = setup().await;

        {
            let mut session = Session::new(pool.clone());
            saved_deck(&mut session, "Temporary").await;
        }

        let mut session = Session::new(pool);
        assert!(all::<Deck>(&mut session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_with_commit_persists() {
        let (_dir, pool) = setup().await;

        {
            let mut session = Session::new(pool.clone());
            let mut deck = Deck::new("French", Some("Basics".to_string()));
            save(&mut session, &mut deck, true).await.unwrap();
        }

        let mut session = Session::new(pool);
        let decks = all::<Deck>(&mut session).await.unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].name, "French");
        assert_eq!(decks[0].description.as_deref(), Some("Basics"));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_none() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        assert!(get_by_id::<Deck>(&mut session, 42).await.unwrap().is_none());
        assert!(get_by_id::<Card>(&mut session, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_only_touches_named_fields() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let mut deck = Deck::new("Spanish", Some("Verbs".to_string()));
        save(&mut session, &mut deck, false).await.unwrap();
        let id = deck.id.unwrap();

        update(
            &mut session,
            &mut deck,
            DeckChanges {
                name: Some("Spanish A1".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();

        let reloaded = get_by_id::<Deck>(&mut session, id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Spanish A1");
        assert_eq!(reloaded.description.as_deref(), Some("Verbs"));
        assert_eq!(reloaded.created_at, deck.created_at);
    }

    #[tokio::test]
    async fn test_update_with_null_clears_optional_fields() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let mut deck = Deck::new("Spanish", Some("Verbs".to_string()));
        save(&mut session, &mut deck, false).await.unwrap();
        let mut card = Card::new("hola", deck.id);
        save(&mut session, &mut card, false).await.unwrap();

        let changes: DeckChanges = serde_json::from_str(r#"{"description": null}"#).unwrap();
        update(&mut session, &mut deck, changes).await.unwrap();
        let changes: CardChanges = serde_json::from_str(r#"{"deck_id": null}"#).unwrap();
        update(&mut session, &mut card, changes).await.unwrap();

        let deck = get_by_id::<Deck>(&mut session, deck.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deck.name, "Spanish");
        assert_eq!(deck.description, None);

        let card = get_by_id::<Card>(&mut session, card.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(card.front, "hola");
        assert_eq!(card.deck_id, None);
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_row_not_found() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let mut deck = Deck::new("Ghost", None);
        deck.id = Some(999);

        let err = save(&mut session, &mut deck, false).await.unwrap_err();
        assert!(matches!(err, DbError::RowNotFound { id: 999, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_front_in_same_deck_is_rejected() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let mut first = Card::new("hola", deck_id);
        save(&mut session, &mut first, false).await.unwrap();

        let mut other_front = Card::new("adios", deck_id);
        save(&mut session, &mut other_front, false).await.unwrap();

        let mut duplicate = Card::new("hola", deck_id);
        let err = save(&mut session, &mut duplicate, false).await.unwrap_err();
        match err {
            DbError::Validation {
                message, fields, ..
            } => {
                assert_eq!(message, "Unique constraint violated for Card");
                assert_eq!(fields, vec!["deck_id".to_string(), "front".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_same_front_in_other_deck_is_accepted() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let first_deck = saved_deck(&mut session, "Spanish").await.id;
        let second_deck = saved_deck(&mut session, "Portuguese").await.id;

        let mut a = Card::new("hola", first_deck);
        let mut b = Card::new("hola", second_deck);
        save(&mut session, &mut a, false).await.unwrap();
        save(&mut session, &mut b, false).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_missing_deck_is_foreign_key_error() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let mut card = Card::new("orphan", Some(12345));
        let err = save(&mut session, &mut card, false).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKey { .. }));
    }

    #[tokio::test]
    async fn test_bulk_create_returns_ids() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let cards = vec![
            Card::new("uno", deck_id),
            Card::new("dos", deck_id),
            Card::new("tres", deck_id),
        ];
        let created = bulk_create(&mut session, cards).await.unwrap();

        assert_eq!(created.len(), 3);
        assert!(created.iter().all(|c| c.id.is_some()));
        assert_eq!(created[1].front, "dos");
    }

    #[tokio::test]
    async fn test_bulk_create_with_duplicate_persists_nothing() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let cards = vec![
            Card::new("uno", deck_id),
            Card::new("dos", deck_id),
            Card::new("uno", deck_id),
        ];
        let err = bulk_create(&mut session, cards).await.unwrap_err();
        assert!(matches!(err, DbError::Validation { .. }));

        // The deck outside the batch survives, the batch does not.
        let remaining = all::<Card>(&mut session).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(all::<Deck>(&mut session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_update_upserts_by_id() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let created = bulk_create(
            &mut session,
            vec![Card::new("uno", deck_id), Card::new("dos", deck_id)],
        )
        .await
        .unwrap();

        let mut changed = created[0].clone();
        changed.back = Some("one".to_string());
        let fresh = Card::new("tres", deck_id);

        let updated = bulk_update(&mut session, vec![changed, fresh]).await.unwrap();
        assert_eq!(updated[0].id, created[0].id);
        assert_eq!(updated[0].created_at, created[0].created_at);
        assert!(updated[1].id.is_some());

        let cards = all::<Card>(&mut session).await.unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].back.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn test_bulk_update_conflict_aborts_batch_and_reports_id() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let created = bulk_create(
            &mut session,
            vec![Card::new("uno", deck_id), Card::new("dos", deck_id)],
        )
        .await
        .unwrap();

        let mut harmless = created[0].clone();
        harmless.hint = Some("number".to_string());
        let mut clashing = created[1].clone();
        clashing.front = "uno".to_string();
        let clashing_id = clashing.id;

        let err = bulk_update(&mut session, vec![harmless, clashing])
            .await
            .unwrap_err();
        match err {
            DbError::Validation { object_id, .. } => assert_eq!(object_id, clashing_id),
            other => panic!("expected validation error, got {other:?}"),
        }

        let first = get_by_id::<Card>(&mut session, created[0].id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.hint, None);
    }

    #[tokio::test]
    async fn test_filter_conjunction_and_null_checks() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let created = bulk_create(
            &mut session,
            vec![
                Card::new("uno", deck_id),
                Card::new("dos", deck_id),
                Card::new("loose", None),
            ],
        )
        .await
        .unwrap();

        let in_deck: Vec<Card> = filter(&mut session, &[Condition::eq("deck_id", deck_id)])
            .await
            .unwrap();
        assert_eq!(in_deck.len(), 2);

        let loose: Vec<Card> = filter(&mut session, &[Condition::eq("deck_id", None::<i64>)])
            .await
            .unwrap();
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].front, "loose");

        let after_first: Vec<Card> = filter(
            &mut session,
            &[
                Condition::eq("deck_id", deck_id),
                Condition::new("id", Op::Gt, created[0].id),
            ],
        )
        .await
        .unwrap();
        assert_eq!(after_first.len(), 1);
        assert_eq!(after_first[0].front, "dos");

        let everything: Vec<Card> = filter(&mut session, &[]).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_filter_compares_timestamps() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck = saved_deck(&mut session, "Spanish").await;
        let created_at = deck.created_at.unwrap();

        let at_or_after: Vec<Deck> = filter(
            &mut session,
            &[Condition::new("created_at", Op::Ge, created_at)],
        )
        .await
        .unwrap();
        assert_eq!(at_or_after.len(), 1);

        let before: Vec<Deck> = filter(
            &mut session,
            &[Condition::new("created_at", Op::Lt, created_at)],
        )
        .await
        .unwrap();
        assert!(before.is_empty());
    }

    #[test]
    fn test_op_from_suffix() {
        assert_eq!(Op::from_suffix("ne"), Some(Op::Ne));
        assert_eq!(Op::from_suffix("le"), Some(Op::Le));
        assert_eq!(Op::from_suffix("like"), None);
    }

    #[test]
    fn test_column_lookup() {
        assert_eq!(column::<Card>("deck_id"), Some("deck_id"));
        assert_eq!(column::<Card>("updated_at"), Some("updated_at"));
        assert_eq!(column::<Deck>("front"), None);
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_column() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);

        let err = filter::<Deck>(&mut session, &[Condition::eq("front", "hola")])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { column: "front", .. }));
    }

    #[tokio::test]
    async fn test_card_changes_merge() {
        let (_dir, pool) = setup().await;
        let mut session = Session::new(pool);
        let deck_id = saved_deck(&mut session, "Spanish").await.id;

        let mut card = Card::new("gato", deck_id);
        card.back = Some("cat".to_string());
        save(&mut session, &mut card, false).await.unwrap();

        update(
            &mut session,
            &mut card,
            CardChanges {
                hint: Some(Some("animal".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let reloaded = get_by_id::<Card>(&mut session, card.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.front, "gato");
        assert_eq!(reloaded.back.as_deref(), Some("cat"));
        assert_eq!(reloaded.hint.as_deref(), Some("animal"));
    }
}
