// src/client/api/hr.rs
use crate::{
    models::hr::{ContractType, EmployeeType},
    services::crud::NoFilter,
};

rest_resource!(contract_types, "/hr/contract-types", ContractType, ContractType, NoFilter);
rest_resource!(employee_types, "/hr/employee-types", EmployeeType, EmployeeType, NoFilter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::{testing::*, HttpMethod};

    #[tokio::test]
    async fn employee_type_key_is_its_name() {
        let (client, transport) = mock_client();
        let _ = employee_types::get(&client, "Entrenador").await;
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(target_of(&request), "/hr/employee-types/Entrenador/");
    }

    #[tokio::test]
    async fn create_contract_type() {
        let (client, transport) = mock_client();
        let payload = ContractType {
            name: "Cátedra".into(),
        };
        let _ = contract_types::create(&client, &payload).await;
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(target_of(&request), "/hr/contract-types/");
        assert!(request.body.unwrap().contains("Cátedra"));
    }
}
