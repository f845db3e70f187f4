use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, Value,
};
use tracing::info;

use crate::entities::{authors, books, prelude::*};
use crate::models::catalog::{Author, Page};

/// Repository for author records
pub struct AuthorRepository {
    conn: DatabaseConnection,
}

impl AuthorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List one page of authors ordered by id. `page` is zero-based.
    pub async fn list(&self, page: u64, per_page: u64) -> Result<Page<Author>> {
        let paginator = Authors::find()
            .order_by_asc(authors::Column::Id)
            .paginate(&self.conn, per_page);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count authors")?;
        let rows = paginator
            .fetch_page(page)
            .await
            .context("Failed to list authors")?;

        Ok(Page {
            items: rows.into_iter().map(Author::from).collect(),
            total,
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Author>> {
        let row = Authors::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query author by ID")?;

        Ok(row.map(Author::from))
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    pub async fn create(&self, author: &Author) -> Result<Author> {
        let model = authors::ActiveModel {
            name: Set(author.name.clone()),
            surname: Set(author.surname.clone()),
            description: Set(author.description.clone()),
            birth_date: Set(author.birth_date),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert author")?;

        info!("Created author {}: {} {}", model.id, model.name, model.surname);
        Ok(Author::from(model))
    }

    /// Returns `None` if no author has this id.
    pub async fn update(&self, id: i32, author: &Author) -> Result<Option<Author>> {
        let Some(existing) = Authors::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: authors::ActiveModel = existing.into();
        active.name = Set(author.name.clone());
        active.surname = Set(author.surname.clone());
        active.description = Set(author.description.clone());
        active.birth_date = Set(author.birth_date);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update author")?;

        Ok(Some(Author::from(model)))
    }

    /// Delete an author and detach their books.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Books::update_many()
            .col_expr(books::Column::AuthorId, Expr::value(Value::Int(None)))
            .filter(books::Column::AuthorId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to detach books from author")?;

        let result = Authors::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete author")?;

        txn.commit().await?;

        if result.rows_affected > 0 {
            info!("Deleted author {}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
