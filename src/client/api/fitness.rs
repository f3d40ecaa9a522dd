// src/client/api/fitness.rs
use crate::{
    client::http::{ApiClient, ClientResult},
    models::{
        fitness::{
            AdoptRequest, Exercise, ExerciseFilter, ExercisePayload, FollowUp, FollowUpPayload,
            ProgressFilter, ProgressLog, ProgressPayload, RecommendationPayload, Routine,
            RoutineFilter, RoutinePayload, TrainerFilter, TrainerRecommendation,
        },
        statistics::{InstructorStatistics, StatisticsFilter, UserStatistics},
    },
};

rest_resource!(exercises, "/fitness/exercises", Exercise, ExercisePayload, ExerciseFilter);
rest_resource!(routines, "/fitness/routines", Routine, RoutinePayload, RoutineFilter);
rest_resource!(progress, "/fitness/progress", ProgressLog, ProgressPayload, ProgressFilter);
rest_resource!(
    recommendations,
    "/fitness/recommendations",
    TrainerRecommendation,
    RecommendationPayload,
    TrainerFilter
);
rest_resource!(followups, "/fitness/followups", FollowUp, FollowUpPayload, TrainerFilter);

/// Copia uma rotina pré-desenhada para `user_id`. Devolve a cópia nova.
pub async fn adopt_routine(
    client: &ApiClient,
    routine_id: &str,
    user_id: &str,
) -> ClientResult<Routine> {
    let path = format!(
        "/fitness/routines/{}/adopt/",
        urlencoding::encode(routine_id)
    );
    let body = AdoptRequest {
        user_id: user_id.to_string(),
    };
    client.post(&path, &body).await
}

pub async fn user_statistics(
    client: &ApiClient,
    filter: &StatisticsFilter,
) -> ClientResult<Vec<UserStatistics>> {
    client.get_with("/fitness/statistics/users/", filter).await
}

pub async fn instructor_statistics(
    client: &ApiClient,
    filter: &StatisticsFilter,
) -> ClientResult<Vec<InstructorStatistics>> {
    client
        .get_with("/fitness/statistics/instructors/", filter)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::http::{testing::*, HttpMethod},
        models::fitness::{Difficulty, ExerciseKind, RoutineExercise},
    };
    use serde_json::{json, Value};

    fn body_of(request: &crate::client::http::HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn list_exercises_sends_filter_as_querystring() {
        let (client, transport) = mock_client();
        let filter = ExerciseFilter {
            kind: Some(ExerciseKind::Cardio),
            difficulty: Some(Difficulty::Principiante),
            created_by: None,
        };
        let _ = exercises::list(&client, &filter).await;

        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            target_of(&request),
            "/fitness/exercises/?difficulty=principiante&type=cardio"
        );
    }

    #[tokio::test]
    async fn create_exercise_posts_payload() {
        let (client, transport) = mock_client();
        let payload = ExercisePayload {
            name: "Trote suave".into(),
            kind: ExerciseKind::Cardio,
            description: String::new(),
            duration: Some(20.0),
            difficulty: None,
            video_url: None,
            created_by: "juan.perez".into(),
        };
        let _ = exercises::create(&client, &payload).await;

        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(target_of(&request), "/fitness/exercises/");
        let body = body_of(&request);
        assert_eq!(body["type"], "cardio");
        assert_eq!(body["duration"], 20.0);
        assert_eq!(body["created_by"], "juan.perez");
    }

    #[tokio::test]
    async fn update_routine_puts_full_resource() {
        let (client, transport) = mock_client();
        let payload = RoutinePayload {
            name: "Rutina A".into(),
            description: String::new(),
            user_id: Some("juan.perez".into()),
            exercises: vec![RoutineExercise {
                exercise_id: "e1".into(),
                sets: Some(3),
                reps: Some(12),
                duration: None,
                rest_time: Some(60),
                notes: None,
            }],
            is_pre_designed: false,
            created_by: "juan.perez".into(),
            base_routine_id: None,
        };
        let _ = routines::update(&client, "r1", &payload).await;

        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(target_of(&request), "/fitness/routines/r1/");
        assert_eq!(body_of(&request)["exercises"][0]["rest_time"], 60);
    }

    #[tokio::test]
    async fn delete_progress_hits_item_path() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Delete, "/fitness/progress/p1/", 204, Value::Null);

        progress::delete(&client, "p1").await.unwrap();
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn recommendations_are_filtered_by_user() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Get,
            "/fitness/recommendations/?user_id=juan.perez",
            200,
            json!([{
                "id": "rec1",
                "trainer_id": "carlos.trainer",
                "user_id": "juan.perez",
                "message": "Sube la carga",
                "date": "2024-11-02T09:00:00Z"
            }]),
        );
        let filter = TrainerFilter {
            user_id: Some("juan.perez".into()),
            trainer_id: None,
        };
        let list = recommendations::list(&client, &filter).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "Sube la carga");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn get_followup_by_id() {
        let (client, transport) = mock_client();
        let _ = followups::get(&client, "f1").await;
        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(target_of(&request), "/fitness/followups/f1/");
    }

    #[tokio::test]
    async fn adopt_posts_the_adopter() {
        let (client, transport) = mock_client();
        let _ = adopt_routine(&client, "r1", "juan.perez").await;

        let request = single_request(&transport);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(target_of(&request), "/fitness/routines/r1/adopt/");
        assert_eq!(body_of(&request), json!({"user_id": "juan.perez"}));
    }

    #[tokio::test]
    async fn statistics_carry_the_month() {
        let (client, transport) = mock_client();
        let filter = StatisticsFilter {
            month: Some("2024-11".into()),
        };
        let _ = instructor_statistics(&client, &filter).await;
        let _ = user_statistics(&client, &StatisticsFilter::default()).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            target_of(&requests[0]),
            "/fitness/statistics/instructors/?month=2024-11"
        );
        assert_eq!(target_of(&requests[1]), "/fitness/statistics/users/");
    }
}
