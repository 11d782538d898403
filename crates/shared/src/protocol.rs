use serde::{Deserialize, Serialize};

use crate::domain::{EmployeeId, EmployeeRecord};

pub const EMPLOYEES_ROUTE: &str = "/api/employees";

/// Multipart field carrying the uploaded CSV file.
pub const CSV_UPLOAD_FIELD: &str = "csv";

pub fn employee_route(id: &EmployeeId) -> String {
    format!("{EMPLOYEES_ROUTE}/{}", id.0)
}

/// Body of `GET /api/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEmployeesResponse {
    pub data: Vec<EmployeeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Body of `DELETE /api/employees`: the full id set in one request.
pub type DeleteEmployeesRequest = Vec<EmployeeId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_without_total_decodes() {
        let body = r#"{"data":[{"id":"e0001","login":"hpotter","name":"Harry Potter","salary":1234.0}]}"#;
        let parsed: ListEmployeesResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(parsed.total, None);
        assert_eq!(parsed.data[0].id, EmployeeId::new("e0001"));
        assert_eq!(parsed.data[0].salary, 1234.0);
    }

    #[test]
    fn delete_body_is_a_plain_id_array() {
        let body: DeleteEmployeesRequest = vec![EmployeeId::new("a"), EmployeeId::new("b")];
        assert_eq!(serde_json::to_string(&body).expect("encode"), r#"["a","b"]"#);
    }

    #[test]
    fn employee_route_appends_id() {
        assert_eq!(
            employee_route(&EmployeeId::new("e0042")),
            "/api/employees/e0042"
        );
    }
}
