//! Genres repository

use std::collections::BTreeSet;

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::Genre,
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all genres by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    pub async fn create(&self, name: &str) -> AppResult<Genre> {
        let name = name.trim();
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, format!("Genre \"{}\" already exists", name)))
    }

    /// Genres attached to a book
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Resolve lower-cased genre names to ids.
    ///
    /// Every name must exist; the missing ones are listed in the `NotFound` error.
    pub async fn resolve_names(
        conn: &mut PgConnection,
        keys: &BTreeSet<String>,
    ) -> AppResult<BTreeSet<i32>> {
        if keys.is_empty() {
            return Ok(BTreeSet::new());
        }

        let names: Vec<String> = keys.iter().cloned().collect();
        let found = sqlx::query_as::<_, Genre>(
            "SELECT id, name FROM genres WHERE LOWER(name) = ANY($1)",
        )
        .bind(&names)
        .fetch_all(&mut *conn)
        .await?;

        let found_keys: BTreeSet<String> = found.iter().map(|g| g.name.to_lowercase()).collect();
        let missing: Vec<&str> = keys
            .iter()
            .filter(|k| !found_keys.contains(*k))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "Genre not found: {}",
                missing.join(", ")
            )));
        }

        Ok(found.into_iter().map(|g| g.id).collect())
    }

    /// Genre ids currently attached to a book
    pub async fn ids_for_book(conn: &mut PgConnection, book_id: i32) -> AppResult<BTreeSet<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar("SELECT genre_id FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(ids.into_iter().collect())
    }
}
