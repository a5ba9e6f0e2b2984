use std::future::Future;

use crate::entities::{Doctor, SqliteStore};

type DoctorRow = (String, String, String, f64, f64);

pub trait DoctorStore: Send + Sync + 'static {
    fn insert_doctor(
        &self,
        doctor: &Doctor,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_doctor(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Doctor>, sqlx::Error>> + Send;
    /// Ordered by name; `specialty` is an exact match when given.
    fn list_doctors(
        &self,
        specialty: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Doctor>, sqlx::Error>> + Send;
}

impl DoctorStore for SqliteStore {
    async fn insert_doctor(&self, doctor: &Doctor) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO doctors (id, name, specialty, latitude, longitude) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&doctor.id)
        .bind(&doctor.name)
        .bind(&doctor.specialty)
        .bind(doctor.latitude)
        .bind(doctor.longitude)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>, sqlx::Error> {
        let row: Option<DoctorRow> = sqlx::query_as(
            "SELECT id, name, specialty, latitude, longitude FROM doctors WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn list_doctors(&self, specialty: Option<&str>) -> Result<Vec<Doctor>, sqlx::Error> {
        let rows: Vec<DoctorRow> = if let Some(s) = specialty {
            sqlx::query_as(
                "SELECT id, name, specialty, latitude, longitude FROM doctors \
                 WHERE specialty = ?1 ORDER BY name",
            )
            .bind(s)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, name, specialty, latitude, longitude FROM doctors ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(from_row).collect())
    }
}

fn from_row((id, name, specialty, latitude, longitude): DoctorRow) -> Doctor {
    Doctor {
        id,
        name,
        specialty,
        latitude,
        longitude,
    }
}
