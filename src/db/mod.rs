use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::catalog::{Author, Book, Page};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{NewUserRow, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.conn.begin().await
    }

    // ========== User Repository ==========

    #[must_use]
    pub fn user_repo(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    // ========== Catalog Repositories ==========

    fn author_repo(&self) -> repositories::author::AuthorRepository {
        repositories::author::AuthorRepository::new(self.conn.clone())
    }

    fn book_repo(&self) -> repositories::book::BookRepository {
        repositories::book::BookRepository::new(self.conn.clone())
    }

    pub async fn list_authors(&self, page: u64, per_page: u64) -> Result<Page<Author>> {
        self.author_repo().list(page, per_page).await
    }

    pub async fn get_author(&self, id: i32) -> Result<Option<Author>> {
        self.author_repo().get(id).await
    }

    pub async fn author_exists(&self, id: i32) -> Result<bool> {
        self.author_repo().exists(id).await
    }

    pub async fn create_author(&self, author: &Author) -> Result<Author> {
        self.author_repo().create(author).await
    }

    pub async fn update_author(&self, id: i32, author: &Author) -> Result<Option<Author>> {
        self.author_repo().update(id, author).await
    }

    pub async fn delete_author(&self, id: i32) -> Result<bool> {
        self.author_repo().delete(id).await
    }

    pub async fn list_books(&self, page: u64, per_page: u64) -> Result<Page<Book>> {
        self.book_repo().list(page, per_page).await
    }

    pub async fn list_books_for_author(&self, author_id: i32) -> Result<Vec<Book>> {
        self.book_repo().list_for_author(author_id).await
    }

    pub async fn get_book(&self, id: i32) -> Result<Option<Book>> {
        self.book_repo().get(id).await
    }

    pub async fn create_book(&self, book: &Book) -> Result<Book> {
        self.book_repo().create(book).await
    }

    pub async fn update_book(&self, id: i32, book: &Book) -> Result<Option<Book>> {
        self.book_repo().update(id, book).await
    }

    pub async fn delete_book(&self, id: i32) -> Result<bool> {
        self.book_repo().delete(id).await
    }
}
