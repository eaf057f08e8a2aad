use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::filter::{Predicate, Scope};
use crate::model::expense::{Expense, ExpenseRow, ExpenseSql, NewExpense};
use crate::model::tag::Tag;
use crate::model::user::{NewUser, User, UserSql};
use crate::store::{Store, StoreError, StoreResult, distinct_tag_ids};

const USER_COLUMNS: &str =
    "id, email, encrypted_password, name, role, manager_user_id, active, revocation_id";

const EXPENSE_SELECT: &str = r#"
    SELECT
        e.id, e.description, e.date, e.amount, e.location, e.status, e.user_id,
        e.receipt_nf, e.receipt_card,
        u.name AS owner_name,
        u.manager_user_id,
        m.name AS manager_name
    FROM expenses e
    JOIN users u ON u.id = e.user_id
    LEFT JOIN users m ON m.id = u.manager_user_id
"#;

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Scoped listing query: scope first, then each predicate, joined with AND.
    pub fn select_expenses<'a>(scope: &Scope, predicates: &[Predicate]) -> QueryBuilder<'a, MySql> {
        let mut qb = QueryBuilder::<MySql>::new(EXPENSE_SELECT);
        qb.push(" WHERE ");
        scope.push_sql(&mut qb);
        for predicate in predicates {
            qb.push(" AND ");
            predicate.push_sql(&mut qb);
        }
        qb.push(" ORDER BY e.id");
        qb
    }

    /// Attaches tag sets to already-loaded expense rows.
    async fn with_tags(&self, rows: Vec<ExpenseSql>) -> StoreResult<Vec<ExpenseRow>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT et.expense_id, t.id, t.description FROM expenses_tags et \
             JOIN tags t ON t.id = et.tag_id WHERE et.expense_id IN (",
        );
        let mut ids = qb.separated(", ");
        for row in &rows {
            ids.push_bind(row.id);
        }
        qb.push(") ORDER BY et.expense_id, t.id");

        let links: Vec<(u64, u64, String)> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut by_expense: HashMap<u64, Vec<Tag>> = HashMap::new();
        for (expense_id, id, description) in links {
            by_expense
                .entry(expense_id)
                .or_default()
                .push(Tag { id, description });
        }

        rows.into_iter()
            .map(|row| {
                let tags = by_expense.remove(&row.id).unwrap_or_default();
                row.into_row(tags).map_err(StoreError::Corrupt)
            })
            .collect()
    }

    async fn write_tags(
        tx: &mut sqlx::Transaction<'_, MySql>,
        expense_id: u64,
        tag_ids: &[u64],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM expenses_tags WHERE expense_id = ?")
            .bind(expense_id)
            .execute(&mut **tx)
            .await?;

        let tag_ids = distinct_tag_ids(tag_ids);
        if tag_ids.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<MySql>::new("INSERT INTO expenses_tags (expense_id, tag_id) ");
        qb.push_values(tag_ids, |mut b, tag_id| {
            b.push_bind(expense_id).push_bind(tag_id);
        });
        qb.build().execute(&mut **tx).await?;
        Ok(())
    }
}

fn user_from_row(row: UserSql) -> StoreResult<User> {
    User::try_from(row).map_err(StoreError::Corrupt)
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (email, encrypted_password, name, role, manager_user_id, active, revocation_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.encrypted_password)
        .bind(&user.name)
        .bind(user.role.to_string())
        .bind(user.manager_user_id)
        .bind(user.active)
        .bind(&user.revocation_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => self
                .find_user(done.last_insert_id())
                .await?
                .ok_or_else(|| StoreError::Corrupt("inserted user vanished".into())),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict("email".into())),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        sqlx::query_as::<_, UserSql>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(user_from_row)
            .transpose()
    }

    async fn rotate_revocation_id(
        &self,
        user_id: u64,
        current: &str,
        fresh: &str,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET revocation_id = ?, updated_at = NOW() WHERE id = ? AND revocation_id = ?",
        )
        .bind(fresh)
        .bind(user_id)
        .bind(current)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET manager_user_id = NULL WHERE manager_user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // expenses and their tag links go with the user (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn query_expenses(
        &self,
        scope: &Scope,
        predicates: &[Predicate],
    ) -> StoreResult<Vec<ExpenseRow>> {
        let mut qb = Self::select_expenses(scope, predicates);
        tracing::debug!(sql = %qb.sql(), "Listing expenses");

        let rows: Vec<ExpenseSql> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.with_tags(rows).await
    }

    async fn find_expense(&self, id: u64) -> StoreResult<Option<ExpenseRow>> {
        let sql = format!("{EXPENSE_SELECT} WHERE e.id = ?");
        let row = sqlx::query_as::<_, ExpenseSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_tags(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_expense(&self, expense: NewExpense, tag_ids: &[u64]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO expenses
                (description, date, amount, location, status, user_id, receipt_nf, receipt_card)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.description)
        .bind(expense.date)
        .bind(expense.amount)
        .bind(&expense.location)
        .bind(expense.status.to_string())
        .bind(expense.user_id)
        .bind(&expense.receipt_nf)
        .bind(&expense.receipt_card)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_id();
        Self::write_tags(&mut tx, id, tag_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_expense(&self, expense: &Expense, tag_ids: Option<&[u64]>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE expenses
            SET description = ?, date = ?, amount = ?, location = ?, status = ?,
                receipt_nf = ?, receipt_card = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&expense.description)
        .bind(expense.date)
        .bind(expense.amount)
        .bind(&expense.location)
        .bind(expense.status.to_string())
        .bind(&expense.receipt_nf)
        .bind(&expense.receipt_card)
        .bind(expense.id)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = tag_ids {
            Self::write_tags(&mut tx, expense.id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_expense(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(
            sqlx::query_as::<_, Tag>("SELECT id, description FROM tags ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_tag(&self, id: u64) -> StoreResult<Option<Tag>> {
        Ok(
            sqlx::query_as::<_, Tag>("SELECT id, description FROM tags WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_tags(&self, ids: &[u64]) -> StoreResult<Vec<Tag>> {
        let ids = distinct_tag_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<MySql>::new("SELECT id, description FROM tags WHERE id IN (");
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(id);
        }
        qb.push(") ORDER BY id");

        Ok(qb.build_query_as::<Tag>().fetch_all(&self.pool).await?)
    }

    async fn insert_tag(&self, description: &str) -> StoreResult<Tag> {
        let result = sqlx::query("INSERT INTO tags (description) VALUES (?)")
            .bind(description)
            .execute(&self.pool)
            .await?;

        Ok(Tag {
            id: result.last_insert_id(),
            description: description.to_string(),
        })
    }

    async fn update_tag(&self, tag: &Tag) -> StoreResult<bool> {
        // MySQL reports 0 affected rows when the value is unchanged, so check existence.
        if self.find_tag(tag.id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query("UPDATE tags SET description = ? WHERE id = ?")
            .bind(&tag.description)
            .bind(tag.id)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    async fn delete_tag(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
