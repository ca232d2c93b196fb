//! src/services/store.rs
//!
//! Collection-agnostic query pieces shared by the artwork and favorite
//! stores. A `Filter` is a conjunction of field equalities plus at most one
//! OR-group of case-insensitive substring matches; a `Patch` is a list of
//! field assignments. Both are rendered through `QueryBuilder` so every value
//! is a bound parameter and every column name comes from a closed enum.

use crate::models::artwork::Visibility;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document already exists")]
    Duplicate,
    #[error("patch sets no fields")]
    EmptyPatch,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A queryable field of one collection.
pub trait Field: Copy + std::fmt::Debug {
    /// Table backing the collection.
    const TABLE: &'static str;

    fn column(self) -> &'static str;

    /// Shadow column holding the Unicode-lowercased text of this field, used
    /// for case-insensitive substring matches and kept current by `Patch`.
    fn folded_column(self) -> Option<&'static str> {
        None
    }
}

/// Fields a collection exposes for owner-scoped mutations.
pub trait OwnedField: Field {
    const ID: Self;
    const OWNER: Self;
}

/// A value bound into a query.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Id(Uuid),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Id(value)
    }
}

impl From<Visibility> for Value {
    fn from(value: Visibility) -> Self {
        Value::Text(value.as_str().to_string())
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Text(text) => builder.push_bind(text.clone()),
        Value::Id(id) => builder.push_bind(*id),
    };
}

#[derive(Clone, Debug)]
enum Condition<F> {
    Eq(F, Value),
    ContainsAny(Vec<(F, String)>),
}

#[derive(Clone, Debug)]
pub struct Filter<F> {
    conditions: Vec<Condition<F>>,
}

impl<F: Field> Default for Filter<F> {
    fn default() -> Self {
        Self::all()
    }
}

impl<F: Field> Filter<F> {
    /// Matches every document.
    pub fn all() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    pub fn eq(mut self, field: F, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    /// Adds an OR-group: the document matches when any field contains its
    /// term, ignoring case. An empty group adds nothing.
    pub fn contains_any(mut self, terms: Vec<(F, String)>) -> Self {
        if !terms.is_empty() {
            self.conditions.push(Condition::ContainsAny(terms));
        }
        self
    }

    /// Renders ` WHERE ...` (or nothing). `qualifier` prefixes each column,
    /// e.g. `"f."` inside a join.
    pub(crate) fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>, qualifier: &str) {
        for (i, condition) in self.conditions.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match condition {
                Condition::Eq(field, value) => {
                    builder.push(format!("{}{} = ", qualifier, field.column()));
                    push_value(builder, value);
                }
                Condition::ContainsAny(terms) => {
                    builder.push("(");
                    for (j, (field, term)) in terms.iter().enumerate() {
                        if j > 0 {
                            builder.push(" OR ");
                        }
                        let column = field.folded_column().unwrap_or(field.column());
                        builder.push(format!("{}{} LIKE ", qualifier, column));
                        builder.push_bind(like_pattern(&term.to_lowercase()));
                        builder.push(" ESCAPE '\\'");
                    }
                    builder.push(")");
                }
            }
        }
    }
}

/// Wrap `term` for a substring LIKE, escaping the wildcard characters so the
/// client's text is matched literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Single-field ordering; ties fall back to insertion order in the same
/// direction.
#[derive(Clone, Copy, Debug)]
pub struct Sort<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F: Field> Sort<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    pub(crate) fn push_order_by(&self, builder: &mut QueryBuilder<'_, Sqlite>, qualifier: &str) {
        let dir = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        builder.push(format!(
            " ORDER BY {q}{col} {dir}, {q}rowid {dir}",
            q = qualifier,
            col = self.field.column(),
            dir = dir
        ));
    }
}

/// Field assignments applied by `update_one_if_match`.
#[derive(Clone, Debug)]
pub struct Patch<F> {
    sets: Vec<(F, Value)>,
}

impl<F: Field> Default for Patch<F> {
    fn default() -> Self {
        Self { sets: Vec::new() }
    }
}

impl<F: Field> Patch<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: F, value: impl Into<Value>) -> Self {
        self.sets.push((field, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn push_set(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" SET ");
        for (i, (field, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(format!("{} = ", field.column()));
            push_value(builder, value);
            if let (Some(folded), Value::Text(text)) = (field.folded_column(), value) {
                builder.push(format!(", {} = ", folded));
                builder.push_bind(text.to_lowercase());
            }
        }
    }
}

/// Apply `patch` to the first document matching `filter`.
///
/// Returns the matched count (0 or 1). The row is picked by a rowid subquery
/// so at most one document changes even for a loose filter.
pub(crate) async fn update_one<F: Field>(
    db: &SqlitePool,
    filter: &Filter<F>,
    patch: &Patch<F>,
) -> StoreResult<u64> {
    if patch.is_empty() {
        return Err(StoreError::EmptyPatch);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {}", F::TABLE));
    patch.push_set(&mut builder);
    push_single_row(&mut builder, filter);

    let result = builder.build().execute(db).await?;
    Ok(result.rows_affected())
}

/// Delete the first document matching `filter`. Returns the deleted count.
pub(crate) async fn delete_one<F: Field>(db: &SqlitePool, filter: &Filter<F>) -> StoreResult<u64> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {}", F::TABLE));
    push_single_row(&mut builder, filter);

    let result = builder.build().execute(db).await?;
    Ok(result.rows_affected())
}

fn push_single_row<F: Field>(builder: &mut QueryBuilder<'_, Sqlite>, filter: &Filter<F>) {
    builder.push(format!(" WHERE rowid = (SELECT rowid FROM {}", F::TABLE));
    filter.push_where(builder, "");
    builder.push(" LIMIT 1)");
}

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug)]
    enum TestField {
        Title,
        Owner,
        Name,
    }

    impl Field for TestField {
        const TABLE: &'static str = "things";

        fn column(self) -> &'static str {
            match self {
                TestField::Title => "title",
                TestField::Owner => "owner",
                TestField::Name => "name",
            }
        }

        fn folded_column(self) -> Option<&'static str> {
            match self {
                TestField::Name => Some("name_folded"),
                _ => None,
            }
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("sun"), "%sun%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn filter_renders_conjunction_and_or_group() {
        let filter = Filter::all()
            .eq(TestField::Owner, "a@example.com")
            .contains_any(vec![
                (TestField::Title, "sun".into()),
                (TestField::Owner, "ann".into()),
            ]);

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM things");
        filter.push_where(&mut builder, "");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM things WHERE owner = ? AND (title LIKE ? ESCAPE '\\' OR owner LIKE ? ESCAPE '\\')"
        );
    }

    #[test]
    fn empty_or_group_is_dropped() {
        let filter = Filter::<TestField>::all().contains_any(Vec::new());

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM things");
        filter.push_where(&mut builder, "t.");
        assert_eq!(builder.sql(), "SELECT * FROM things");
    }

    #[test]
    fn sort_breaks_ties_by_rowid() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM things");
        Sort::desc(TestField::Title).push_order_by(&mut builder, "");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM things ORDER BY title DESC, rowid DESC"
        );
    }

    #[test]
    fn patch_renders_assignments() {
        let patch = Patch::new()
            .set(TestField::Title, "new")
            .set(TestField::Owner, "b@example.com");
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE things");
        patch.push_set(&mut builder);
        assert_eq!(builder.sql(), "UPDATE things SET title = ?, owner = ?");
    }

    #[test]
    fn folded_fields_match_and_update_their_shadow_column() {
        let filter = Filter::all().contains_any(vec![(TestField::Name, "ÉTÉ".into())]);
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM things");
        filter.push_where(&mut builder, "t.");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM things WHERE (t.name_folded LIKE ? ESCAPE '\\')"
        );

        let patch = Patch::new().set(TestField::Name, "Été");
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE things");
        patch.push_set(&mut builder);
        assert_eq!(
            builder.sql(),
            "UPDATE things SET name = ?, name_folded = ?"
        );
    }
}
