use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::{books, prelude::*};
use crate::models::catalog::{Book, Page};

/// Repository for book records
pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List one page of books ordered by id. `page` is zero-based.
    pub async fn list(&self, page: u64, per_page: u64) -> Result<Page<Book>> {
        let paginator = Books::find()
            .order_by_asc(books::Column::Id)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await.context("Failed to count books")?;
        let rows = paginator
            .fetch_page(page)
            .await
            .context("Failed to list books")?;

        Ok(Page {
            items: rows.into_iter().map(Book::from).collect(),
            total,
        })
    }

    pub async fn list_for_author(&self, author_id: i32) -> Result<Vec<Book>> {
        let rows = Books::find()
            .filter(books::Column::AuthorId.eq(author_id))
            .order_by_asc(books::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list books for author")?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Book>> {
        let row = Books::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query book by ID")?;

        Ok(row.map(Book::from))
    }

    pub async fn create(&self, book: &Book) -> Result<Book> {
        let model = books::ActiveModel {
            title: Set(book.title.clone()),
            description: Set(book.description.clone()),
            publication_date: Set(book.publication_date),
            price: Set(book.price),
            author_id: Set(book.author_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert book")?;

        info!("Created book {}: {}", model.id, model.title);
        Ok(Book::from(model))
    }

    /// Returns `None` if no book has this id.
    pub async fn update(&self, id: i32, book: &Book) -> Result<Option<Book>> {
        let Some(existing) = Books::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: books::ActiveModel = existing.into();
        active.title = Set(book.title.clone());
        active.description = Set(book.description.clone());
        active.publication_date = Set(book.publication_date);
        active.price = Set(book.price);
        active.author_id = Set(book.author_id);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update book")?;

        Ok(Some(Book::from(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Books::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete book")?;

        if result.rows_affected > 0 {
            info!("Deleted book {}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
