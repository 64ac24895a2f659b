//! Enrollment repository.

use std::ops::Deref;
use std::sync::Arc;

use domain::models::record::ACTIVE_FIELD;
use domain::models::{Enrollment, Record};

use super::base::BaseRepository;
use crate::error::RepositoryError;
use crate::store::{DocumentStore, Filter, Query};

#[derive(Clone)]
pub struct EnrollmentRepository {
    base: BaseRepository<Enrollment>,
}

impl EnrollmentRepository {
    /// Creates a new EnrollmentRepository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Find the enrollment currently holding the student's seat in a course,
    /// if any. Withdrawn, completed and soft-deleted enrollments are ignored.
    pub async fn find_seat(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Record<Enrollment>>, RepositoryError> {
        let query = Query::new()
            .filter(Filter::eq("studentId", student_id))
            .filter(Filter::eq("courseId", course_id))
            .filter(Filter::ne(ACTIVE_FIELD, false));
        let enrollments = self.base.find_all(query).await?;

        Ok(enrollments
            .into_iter()
            .find(|record| record.fields.status.holds_seat()))
    }
}

impl Deref for EnrollmentRepository {
    type Target = BaseRepository<Enrollment>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use chrono::Utc;
    use domain::models::EnrollmentStatus;
    use serde_json::json;

    fn enrollment(student: &str, course: &str, status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            student_id: student.to_string(),
            course_id: course.to_string(),
            status,
            enrolled_at: shared::time::truncate_to_micros(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_find_seat_ignores_finished_enrollments() {
        let repo = EnrollmentRepository::new(Arc::new(MemoryDocumentStore::new()));
        repo.create(&enrollment("s1", "c1", EnrollmentStatus::Withdrawn), None)
            .await
            .unwrap();
        repo.create(&enrollment("s1", "c2", EnrollmentStatus::Active), None)
            .await
            .unwrap();

        assert!(repo.find_seat("s1", "c1").await.unwrap().is_none());

        let pending = repo
            .create(&enrollment("s1", "c1", EnrollmentStatus::Pending), None)
            .await
            .unwrap();
        let seat = repo.find_seat("s1", "c1").await.unwrap().unwrap();
        assert_eq!(seat.id, pending.id);
    }

    #[tokio::test]
    async fn test_find_seat_behind_many_withdrawals() {
        let repo = EnrollmentRepository::new(Arc::new(MemoryDocumentStore::new()));
        let seat = repo
            .create(&enrollment("s1", "c1", EnrollmentStatus::Active), None)
            .await
            .unwrap();
        // Newer than the seat, so a newest-first page would be full of them.
        for _ in 0..shared::pagination::MAX_PAGE_SIZE + 5 {
            repo.create(&enrollment("s1", "c1", EnrollmentStatus::Withdrawn), None)
                .await
                .unwrap();
        }

        let found = repo.find_seat("s1", "c1").await.unwrap().unwrap();
        assert_eq!(found.id, seat.id);
    }

    #[tokio::test]
    async fn test_find_seat_ignores_soft_deleted() {
        let repo = EnrollmentRepository::new(Arc::new(MemoryDocumentStore::new()));
        let record = repo
            .create(&enrollment("s1", "c1", EnrollmentStatus::Active), None)
            .await
            .unwrap();
        repo.deactivate(&record.id, None).await.unwrap();
        assert!(repo.find_seat("s1", "c1").await.unwrap().is_none());

        repo.update(&record.id, &json!({"status": "completed"}), None)
            .await
            .unwrap();
        repo.restore(&record.id, None).await.unwrap();
        assert!(repo.find_seat("s1", "c1").await.unwrap().is_none());
    }
}
