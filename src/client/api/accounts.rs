// src/client/api/accounts.rs
// Recursos só para administradores.
use crate::{
    models::accounts::{AccountFilter, AccountPayload, BackendUser, Employee, Student},
    services::crud::NoFilter,
};

rest_resource!(users, "/accounts/users", BackendUser, AccountPayload, AccountFilter);
rest_resource!(students, "/accounts/students", Student, Student, NoFilter);
rest_resource!(employees, "/accounts/employees", Employee, Employee, NoFilter);
