pub mod camps;
pub mod donations;
pub mod hospitals;
pub mod inventory;
pub mod requests;
pub mod users;

use serde_json::{json, Value};

fn deleted(what: &str) -> Value {
    json!({ "message": format!("{} deleted", what) })
}
