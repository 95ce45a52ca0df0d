//! School calendar service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::event::{CreateEvent, Event, EventQuery, UpdateEvent},
    repository::Repository,
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
}

impl EventsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List events filtered by range and audience
    pub async fn search(&self, query: &EventQuery) -> AppResult<(Vec<Event>, i64)> {
        self.repository.events.search(query).await
    }

    /// Get event by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Event> {
        self.repository.events.get_by_id(id).await
    }

    /// Create an event
    pub async fn create(&self, data: CreateEvent, created_by: i32) -> AppResult<Event> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if data.ends_at <= data.starts_at {
            return Err(AppError::Validation("ends_at must be after starts_at".to_string()));
        }

        self.repository.events.create(&data, created_by).await
    }

    /// Update an event
    pub async fn update(&self, id: i32, data: UpdateEvent) -> AppResult<Event> {
        self.repository.events.update(id, &data).await
    }

    /// Delete an event
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.events.delete(id).await
    }
}
