use crate::entities::Doctor;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DoctorListQuery {
    /// Exact specialty match, e.g. `"cardiology"`.
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorResponse {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Doctor {
    pub fn to_response(&self) -> DoctorResponse {
        DoctorResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            specialty: self.specialty.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
