/// A row in the `doctors` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub latitude: f64,
    pub longitude: f64,
}
