// src/client/api/academics.rs
use crate::models::academics::{
    Enrollment, EnrollmentFilter, EnrollmentPayload, Group, GroupFilter, Program, ProgramFilter,
    ProgramPayload, Subject, SubjectFilter,
};

rest_resource!(programs, "/academics/programs", Program, ProgramPayload, ProgramFilter);
rest_resource!(subjects, "/academics/subjects", Subject, Subject, SubjectFilter);
rest_resource!(groups, "/academics/groups", Group, Group, GroupFilter);
rest_resource!(
    enrollments,
    "/academics/enrollments",
    Enrollment,
    EnrollmentPayload,
    EnrollmentFilter
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::{testing::*, HttpMethod};
    use serde_json::json;

    #[tokio::test]
    async fn programs_by_area() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Get,
            "/academics/programs/?area=4",
            200,
            json!([{"code": 1, "name": "Fisioterapia", "area": 4}]),
        );
        let filter = ProgramFilter { area: Some(4) };
        let programs = programs::list(&client, &filter).await.unwrap();
        assert_eq!(programs[0].name, "Fisioterapia");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn enrollment_payload_uses_group_wire_name() {
        let (client, transport) = mock_client();
        let payload = EnrollmentPayload {
            student: "S-2024001".into(),
            group_nrc: "50123".into(),
            enrollment_date: None,
            status: "active".into(),
        };
        let _ = enrollments::create(&client, &payload).await;

        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(target_of(&request), "/academics/enrollments/");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["group"], "50123");
    }

    #[tokio::test]
    async fn delete_group_by_nrc() {
        let (client, transport) = mock_client();
        let _ = groups::delete(&client, "50123").await;
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(target_of(&request), "/academics/groups/50123/");
    }

    #[tokio::test]
    async fn update_subject() {
        let (client, transport) = mock_client();
        let subject = Subject {
            code: "DEP-101".into(),
            name: "Deporte formativo".into(),
            program: 1,
        };
        let _ = subjects::update(&client, "DEP-101", &subject).await;
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(target_of(&request), "/academics/subjects/DEP-101/");
    }
}
