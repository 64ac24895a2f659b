//! Topic repository.

use std::ops::Deref;
use std::sync::Arc;

use domain::models::Topic;
use shared::pagination::Cursor;

use super::base::{BaseRepository, Page};
use crate::error::RepositoryError;
use crate::store::{Direction, DocumentStore, Filter, Query};

#[derive(Clone)]
pub struct TopicRepository {
    base: BaseRepository<Topic>,
}

impl TopicRepository {
    /// Creates a new TopicRepository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Active topics of a course in syllabus order.
    pub async fn list_for_course(
        &self,
        course_id: &str,
        cursor: Option<Cursor>,
        limit: Option<usize>,
    ) -> Result<Page<Topic>, RepositoryError> {
        let mut query = Query::new()
            .filter(Filter::eq("courseId", course_id))
            .order_by("position", Direction::Asc);
        if let Some(cursor) = cursor {
            query = query.start_after(cursor);
        }
        query.limit = limit;
        self.base.list_active(query).await
    }
}

impl Deref for TopicRepository {
    type Target = BaseRepository<Topic>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
