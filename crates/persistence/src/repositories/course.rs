//! Course repository.

use std::ops::Deref;
use std::sync::Arc;

use domain::models::{Course, Entity, Topic};

use super::base::BaseRepository;
use crate::error::RepositoryError;
use crate::store::{DocumentStore, Filter, Query, WriteBatch};

/// Repository for courses and the topics that belong to them.
#[derive(Clone)]
pub struct CourseRepository {
    base: BaseRepository<Course>,
}

impl CourseRepository {
    /// Creates a new CourseRepository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Delete a course together with every topic referencing it, in one
    /// atomic batch. Returns the number of topics removed.
    pub async fn delete_with_topics(&self, course_id: &str) -> Result<usize, RepositoryError> {
        let store = self.base.store();
        let topics = store
            .query(
                Topic::COLLECTION,
                &Query::new().filter(Filter::eq("courseId", course_id)),
            )
            .await?;

        let mut batch = WriteBatch::new();
        for topic in &topics {
            batch.delete(Topic::COLLECTION, &topic.id);
        }
        batch.delete(Course::COLLECTION, course_id);
        store.commit(batch).await?;

        tracing::info!(
            course_id = %course_id,
            topics_removed = topics.len(),
            "Deleted course with topics"
        );
        Ok(topics.len())
    }
}

impl Deref for CourseRepository {
    type Target = BaseRepository<Course>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::TopicRepository;
    use crate::store::MemoryDocumentStore;
    use domain::models::course::CourseLevel;
    use domain::models::MultilingualText;

    fn course() -> Course {
        Course {
            title: MultilingualText::new("Algebra I".to_string(), "en"),
            code: "MATH-101".to_string(),
            description: None,
            program_id: None,
            subject_ids: vec![],
            learning_outcomes: None,
            level: CourseLevel::Beginner,
        }
    }

    fn topic(course_id: &str, position: u32) -> Topic {
        Topic {
            course_id: course_id.to_string(),
            title: MultilingualText::new(format!("Unit {position}"), "en"),
            summary: None,
            position,
        }
    }

    #[tokio::test]
    async fn test_delete_with_topics_removes_only_that_course() {
        let store = MemoryDocumentStore::new();
        let shared: Arc<dyn DocumentStore> = Arc::new(store.clone());
        let courses = CourseRepository::new(shared.clone());
        let topics = TopicRepository::new(shared);

        let doomed = courses.create(&course(), None).await.unwrap();
        let kept = courses.create(&course(), None).await.unwrap();
        for position in 1..=3 {
            topics.create(&topic(&doomed.id, position), None).await.unwrap();
        }
        topics.create(&topic(&kept.id, 1), None).await.unwrap();

        let removed = courses.delete_with_topics(&doomed.id).await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.count("topics").await, 1);
        assert!(!courses.exists(&doomed.id).await.unwrap());
        assert!(courses.exists(&kept.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_with_topics_is_all_or_nothing() {
        let store = MemoryDocumentStore::new();
        let courses = CourseRepository::new(Arc::new(store.clone()));
        let created = courses.create(&course(), None).await.unwrap();

        store.set_unavailable(true);
        assert!(courses.delete_with_topics(&created.id).await.is_err());
        store.set_unavailable(false);
        assert!(courses.exists(&created.id).await.unwrap());
    }
}
