use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::entities::{
    Appointment, AppointmentStatus, AppointmentType, SqliteStore, decode_ts, encode_ts,
};

type AppointmentRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    i64,
    String,
    String,
);

const COLUMNS: &str = "id, doctor_id, patient_id, appointment_date, appointment_type, reason, \
                       notes, status, duration_minutes, created_at, updated_at";

/// Criteria for [`AppointmentStore::list_appointments`]; unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    /// Inclusive lower bound on `appointment_date`.
    pub starts_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `appointment_date`.
    pub starts_before: Option<DateTime<Utc>>,
    /// Any of these statuses; empty means all.
    pub statuses: Vec<AppointmentStatus>,
}

pub trait AppointmentStore: Send + Sync + 'static {
    fn insert_appointment(
        &self,
        appointment: &Appointment,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_appointment(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Appointment>, sqlx::Error>> + Send;
    /// Ascending by `appointment_date`, then insertion order.
    fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> impl Future<Output = Result<Vec<Appointment>, sqlx::Error>> + Send;
    /// Overwrite every mutable column. Returns `false` when the id is unknown.
    fn update_appointment(
        &self,
        appointment: &Appointment,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl AppointmentStore for SqliteStore {
    async fn insert_appointment(&self, a: &Appointment) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO appointments (id, doctor_id, patient_id, appointment_date, \
             appointment_type, reason, notes, status, duration_minutes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&a.id)
        .bind(&a.doctor_id)
        .bind(&a.patient_id)
        .bind(encode_ts(&a.appointment_date))
        .bind(a.appointment_type.to_string())
        .bind(&a.reason)
        .bind(&a.notes)
        .bind(a.status.to_string())
        .bind(a.duration_minutes)
        .bind(encode_ts(&a.created_at))
        .bind(encode_ts(&a.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, sqlx::Error> {
        let row: Option<AppointmentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(from_row).transpose()
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM appointments WHERE 1 = 1"));
        if let Some(doctor_id) = &filter.doctor_id {
            qb.push(" AND doctor_id = ").push_bind(doctor_id.clone());
        }
        if let Some(patient_id) = &filter.patient_id {
            qb.push(" AND patient_id = ").push_bind(patient_id.clone());
        }
        if let Some(from) = &filter.starts_from {
            qb.push(" AND appointment_date >= ").push_bind(encode_ts(from));
        }
        if let Some(before) = &filter.starts_before {
            qb.push(" AND appointment_date < ").push_bind(encode_ts(before));
        }
        if !filter.statuses.is_empty() {
            qb.push(" AND status IN (");
            let mut statuses = qb.separated(", ");
            for status in &filter.statuses {
                statuses.push_bind(status.to_string());
            }
            statuses.push_unseparated(")");
        }
        qb.push(" ORDER BY appointment_date ASC, rowid ASC");

        let rows: Vec<AppointmentRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(from_row).collect()
    }

    async fn update_appointment(&self, a: &Appointment) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET appointment_date = ?2, appointment_type = ?3, reason = ?4, \
             notes = ?5, status = ?6, duration_minutes = ?7, updated_at = ?8 WHERE id = ?1",
        )
        .bind(&a.id)
        .bind(encode_ts(&a.appointment_date))
        .bind(a.appointment_type.to_string())
        .bind(&a.reason)
        .bind(&a.notes)
        .bind(a.status.to_string())
        .bind(a.duration_minutes)
        .bind(encode_ts(&a.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn from_row(
    (
        id,
        doctor_id,
        patient_id,
        appointment_date,
        appointment_type,
        reason,
        notes,
        status,
        duration_minutes,
        created_at,
        updated_at,
    ): AppointmentRow,
) -> Result<Appointment, sqlx::Error> {
    Ok(Appointment {
        id,
        doctor_id,
        patient_id,
        appointment_date: decode_ts(&appointment_date, "appointments.appointment_date"),
        appointment_type: AppointmentType::from_str(&appointment_type)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        reason,
        notes,
        status: AppointmentStatus::from_str(&status)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        duration_minutes,
        created_at: decode_ts(&created_at, "appointments.created_at"),
        updated_at: decode_ts(&updated_at, "appointments.updated_at"),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{Doctor, DoctorStore, now_ts};
    use chrono::{Duration, TimeZone};

    async fn store_with_doctor() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_doctor(&Doctor {
                id: "d1".into(),
                name: "Dr. Osei".into(),
                specialty: "cardiology".into(),
                latitude: 5.6,
                longitude: -0.2,
            })
            .await
            .unwrap();
        store
    }

    fn appointment(id: &str, patient_id: &str, at: DateTime<Utc>) -> Appointment {
        Appointment {
            id: id.into(),
            doctor_id: "d1".into(),
            patient_id: patient_id.into(),
            appointment_date: at,
            appointment_type: AppointmentType::Regular,
            reason: "checkup".into(),
            notes: None,
            status: AppointmentStatus::Scheduled,
            duration_minutes: 30,
            created_at: now_ts(),
            updated_at: now_ts(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_returns_equal_record() {
        let store = store_with_doctor().await;
        let mut a = appointment("a1", "p1", Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap());
        a.notes = Some("bring results".into());
        a.appointment_type = AppointmentType::FollowUp;
        store.insert_appointment(&a).await.unwrap();

        assert_eq!(store.get_appointment("a1").await.unwrap(), Some(a));
        assert_eq!(store.get_appointment("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_doctor_is_rejected_by_foreign_key() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = appointment("a1", "p1", Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap());
        assert!(store.insert_appointment(&a).await.is_err());
    }

    #[tokio::test]
    async fn list_applies_every_filter() {
        let store = store_with_doctor().await;
        let day = Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap();
        let mut cancelled = appointment("a3", "p1", day + Duration::days(2));
        cancelled.status = AppointmentStatus::Cancelled;
        for a in [
            appointment("a2", "p2", day + Duration::days(1)),
            appointment("a1", "p1", day),
            cancelled,
        ] {
            store.insert_appointment(&a).await.unwrap();
        }

        let ids = |list: Vec<Appointment>| list.into_iter().map(|a| a.id).collect::<Vec<_>>();

        let all = store.list_appointments(&AppointmentFilter::default()).await.unwrap();
        assert_eq!(ids(all), ["a1", "a2", "a3"]);

        let p1 = AppointmentFilter {
            patient_id: Some("p1".into()),
            ..Default::default()
        };
        assert_eq!(ids(store.list_appointments(&p1).await.unwrap()), ["a1", "a3"]);

        let window = AppointmentFilter {
            doctor_id: Some("d1".into()),
            starts_from: Some(day + Duration::hours(1)),
            starts_before: Some(day + Duration::days(2)),
            ..Default::default()
        };
        assert_eq!(ids(store.list_appointments(&window).await.unwrap()), ["a2"]);

        let active = AppointmentFilter {
            statuses: AppointmentStatus::ACTIVE.to_vec(),
            ..Default::default()
        };
        assert_eq!(ids(store.list_appointments(&active).await.unwrap()), ["a1", "a2"]);
    }

    #[tokio::test]
    async fn update_overwrites_mutable_columns() {
        let store = store_with_doctor().await;
        let mut a = appointment("a1", "p1", Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap());
        store.insert_appointment(&a).await.unwrap();

        a.status = AppointmentStatus::Confirmed;
        a.duration_minutes = 45;
        a.notes = Some("fasting".into());
        assert!(store.update_appointment(&a).await.unwrap());
        assert_eq!(store.get_appointment("a1").await.unwrap(), Some(a.clone()));

        a.id = "missing".into();
        assert!(!store.update_appointment(&a).await.unwrap());
    }
}
