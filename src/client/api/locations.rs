// src/client/api/locations.rs
use crate::{
    models::locations::{
        Area, AreaFilter, AreaPayload, Campus, CampusFilter, CampusPayload, City, CityFilter,
        CityPayload, Country, CountryPayload, Department, DepartmentFilter, DepartmentPayload,
        Faculty, FacultyFilter, FacultyPayload,
    },
    services::crud::NoFilter,
};

rest_resource!(countries, "/locations/countries", Country, CountryPayload, NoFilter);
rest_resource!(
    departments,
    "/locations/departments",
    Department,
    DepartmentPayload,
    DepartmentFilter
);
rest_resource!(cities, "/locations/cities", City, CityPayload, CityFilter);
rest_resource!(campuses, "/locations/campuses", Campus, CampusPayload, CampusFilter);
rest_resource!(faculties, "/locations/faculties", Faculty, FacultyPayload, FacultyFilter);
rest_resource!(areas, "/locations/areas", Area, AreaPayload, AreaFilter);
