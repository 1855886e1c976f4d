//! Repository for the `students` table.

use carline_core::student::NewStudent;
use sqlx::PgPool;

use crate::models::student::StudentRow;

/// Column list for `students` queries.
const COLUMNS: &str = "id, first_name, last_name, car_number, created_at";

/// Directory order shared by every listing.
const ORDER: &str = "ORDER BY last_name ASC, first_name ASC, id ASC";

/// Provides insert and lookup operations for students.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert one student.
    pub async fn create(pool: &PgPool, input: &NewStudent) -> Result<StudentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (first_name, last_name, car_number) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentRow>(&query)
            .bind(input.first_name())
            .bind(input.last_name())
            .bind(input.car_number().get())
            .fetch_one(pool)
            .await
    }

    /// Insert a batch inside one transaction. Either every row lands or none.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[NewStudent],
    ) -> Result<Vec<StudentRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (first_name, last_name, car_number) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            let row = sqlx::query_as::<_, StudentRow>(&query)
                .bind(input.first_name())
                .bind(input.last_name())
                .bind(input.car_number().get())
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// List every student in directory order.
    pub async fn list(pool: &PgPool) -> Result<Vec<StudentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students {ORDER}");
        sqlx::query_as::<_, StudentRow>(&query).fetch_all(pool).await
    }

    /// List the students assigned to a car, in directory order.
    pub async fn list_by_car(pool: &PgPool, car_number: i32) -> Result<Vec<StudentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE car_number = $1 {ORDER}");
        sqlx::query_as::<_, StudentRow>(&query)
            .bind(car_number)
            .fetch_all(pool)
            .await
    }
}
