//! Public types for the users API
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
}
