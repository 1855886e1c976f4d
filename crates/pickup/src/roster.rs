//! Student registration and lookup.

use std::sync::Arc;

use carline_core::car_number::CarNumber;
use carline_core::error::CoreError;
use carline_core::roster::{demo_roster, search};
use carline_core::store::RosterStore;
use carline_core::student::{CreateStudent, NewStudent, Student};
use carline_events::bus::{event_types, DismissalEvent};
use carline_events::EventBus;

/// Owner of the student records.
#[derive(Clone)]
pub struct Roster {
    store: Arc<dyn RosterStore>,
    events: Arc<EventBus>,
}

impl Roster {
    pub fn new(store: Arc<dyn RosterStore>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Register one student. Names are trimmed; car numbers are not unique.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        car_number: i64,
    ) -> Result<Student, CoreError> {
        let input = CreateStudent::new(first_name, last_name, car_number).validate_into()?;
        let student = self.store.insert_student(&input).await?;

        tracing::info!(
            student_id = student.id,
            car_number = student.car_number.get(),
            "Student registered"
        );
        self.publish_registered(&student);
        Ok(student)
    }

    /// Register a batch. Every input is validated before anything is
    /// written, and the batch is stored atomically.
    pub async fn register_many(&self, inputs: Vec<CreateStudent>) -> Result<Vec<Student>, CoreError> {
        let students = self.insert_batch(inputs).await?;
        for student in &students {
            self.publish_registered(student);
        }
        Ok(students)
    }

    /// Students riding in `car_number`, in roster order. No match is an
    /// empty list, not an error. A number no student can hold (zero,
    /// negative, or past `i32::MAX`) matches nobody.
    pub async fn find_by_car_number(&self, car_number: i64) -> Result<Vec<Student>, CoreError> {
        match CarNumber::new(car_number) {
            Ok(car_number) => self.students_in(car_number).await,
            Err(_) => Ok(Vec::new()),
        }
    }

    pub(crate) async fn students_in(&self, car_number: CarNumber) -> Result<Vec<Student>, CoreError> {
        self.store.students_by_car(car_number).await
    }

    /// Every student, by last name, first name, then id.
    pub async fn list_all(&self) -> Result<Vec<Student>, CoreError> {
        self.store.list_students().await
    }

    /// Case-insensitive substring match on first or last name. A blank
    /// query returns the whole roster.
    pub async fn search(&self, query: &str) -> Result<Vec<Student>, CoreError> {
        let students = self.list_all().await?;
        Ok(search(&students, query))
    }

    /// Register the built-in demo roster.
    pub async fn seed_demo(&self) -> Result<Vec<Student>, CoreError> {
        let students = self.insert_batch(demo_roster()).await?;
        self.events.publish(
            DismissalEvent::new(event_types::ROSTER_SEEDED)
                .with_payload(serde_json::json!({ "count": students.len() })),
        );
        Ok(students)
    }

    async fn insert_batch(&self, inputs: Vec<CreateStudent>) -> Result<Vec<Student>, CoreError> {
        let validated = inputs
            .into_iter()
            .map(CreateStudent::validate_into)
            .collect::<Result<Vec<NewStudent>, CoreError>>()?;
        let students = self.store.insert_students(&validated).await?;
        tracing::info!(count = students.len(), "Students registered in batch");
        Ok(students)
    }

    fn publish_registered(&self, student: &Student) {
        self.events.publish(
            DismissalEvent::new(event_types::STUDENT_REGISTERED)
                .with_entity(student.id)
                .with_car(student.car_number)
                .with_payload(serde_json::json!({ "name": student.display_name() })),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
