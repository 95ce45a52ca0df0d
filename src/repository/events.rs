//! Events repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::event::{CreateEvent, Event, EventQuery, UpdateEvent},
};

use super::page_bounds;

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get event by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id {} not found", id)))
    }

    /// List events, filtered by range and audience, with pagination
    pub async fn search(&self, query: &EventQuery) -> AppResult<(Vec<Event>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut idx = 0;
        let mut next = || {
            idx += 1;
            idx
        };

        if query.from.is_some() {
            conditions.push(format!("starts_at >= ${}", next()));
        }
        if query.until.is_some() {
            conditions.push(format!("starts_at < ${}", next()));
        }
        if query.audience.is_some() {
            conditions.push(format!("(audience = ${} OR audience = 'all')", next()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM events {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(from) = query.from {
            count_query = count_query.bind(from);
        }
        if let Some(until) = query.until {
            count_query = count_query.bind(until);
        }
        if let Some(audience) = query.audience {
            count_query = count_query.bind(audience.as_str());
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM events {} ORDER BY starts_at LIMIT ${} OFFSET ${}",
            where_clause,
            idx + 1,
            idx + 2
        );
        let mut list_query = sqlx::query_as::<_, Event>(&list_sql);
        if let Some(from) = query.from {
            list_query = list_query.bind(from);
        }
        if let Some(until) = query.until {
            list_query = list_query.bind(until);
        }
        if let Some(audience) = query.audience {
            list_query = list_query.bind(audience.as_str());
        }
        let events = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((events, total))
    }

    /// Create an event
    pub async fn create(&self, data: &CreateEvent, created_by: i32) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, location, starts_at, ends_at, audience, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.audience.map(|a| a.as_str()).unwrap_or("all"))
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    /// Update an event
    pub async fn update(&self, id: i32, data: &UpdateEvent) -> AppResult<Event> {
        let current = self.get_by_id(id).await?;

        let starts_at = data.starts_at.unwrap_or(current.starts_at);
        let ends_at = data.ends_at.unwrap_or(current.ends_at);
        if ends_at <= starts_at {
            return Err(AppError::Validation("ends_at must be after starts_at".to_string()));
        }

        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $1, description = $2, location = $3,
                starts_at = $4, ends_at = $5, audience = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(data.title.as_ref().unwrap_or(&current.title))
        .bind(data.description.as_ref().or(current.description.as_ref()))
        .bind(data.location.as_ref().or(current.location.as_ref()))
        .bind(starts_at)
        .bind(ends_at)
        .bind(data.audience.map(|a| a.as_str().to_string()).unwrap_or(current.audience))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    /// Delete an event
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event with id {} not found", id)));
        }
        Ok(())
    }

    /// Count of events starting within the next `days` days
    pub async fn count_upcoming(&self, days: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE starts_at >= NOW() AND starts_at < NOW() + make_interval(days => $1::int)",
        )
        .bind(days as i32)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
