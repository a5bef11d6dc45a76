use log::info;
use rouille::{Request, Response};
use std::{
    io::Read,
    sync::{Arc, Mutex},
};

use crate::{
    config::HttpConfig,
    domain::id::TrackId,
    http::{
        controller::{Outcome, TrackController},
        error::ApiError,
    },
    storage::operations::Storage,
};

/// Bodies larger than this are rejected
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub struct HttpServer {
    controller: TrackController,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(storage: Storage, config: HttpConfig) -> Self {
        Self {
            controller: TrackController::new(Arc::new(Mutex::new(storage)), config.upsert_policy),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/api/tracks) => {
                Self::respond(self.controller.list())
            },
            (POST) (/api/tracks) => {
                Self::respond(
                    Self::read_body(request).and_then(|body| self.controller.create(&body)),
                )
            },
            (GET) (/api/tracks/{id: i64}) => {
                Self::respond(self.controller.get(TrackId(id)))
            },
            (PUT) (/api/tracks/{id: i64}) => {
                Self::respond(
                    Self::read_body(request)
                        .and_then(|body| self.controller.upsert(TrackId(id), &body)),
                )
            },
            (PATCH) (/api/tracks/{id: i64}) => {
                Self::respond(
                    Self::read_body(request)
                        .and_then(|body| self.controller.patch(TrackId(id), &body)),
                )
            },
            (DELETE) (/api/tracks/{id: i64}) => {
                Self::respond(self.controller.delete(TrackId(id)))
            },
            _ => Response::empty_404()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn read_body(request: &Request) -> Result<Vec<u8>, ApiError> {
        let Some(data) = request.data() else {
            return Ok(Vec::new());
        };
        let mut body = Vec::new();
        data.take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| ApiError::BadRequest(format!("could not read request body: {e}")))?;
        if body.len() as u64 > MAX_BODY_BYTES {
            return Err(ApiError::BadRequest("request body too large".into()));
        }
        Ok(body)
    }

    fn respond(result: Result<Outcome, ApiError>) -> Response {
        match result {
            Ok(Outcome::Data(payload)) => Response::json(&payload),
            Ok(Outcome::Created(track)) => Response::json(&track).with_status_code(201),
            Ok(Outcome::NoData) => Response::empty_204(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::UpsertPolicy,
        http::{controller::TrackResponse, error::ErrorBody},
        storage::{operations::Storage, schema, seed::sample_tracks},
    };

    use rouille::Request;

    fn setup_storage(seeded: bool) -> anyhow::Result<Storage> {
        let conn = rusqlite::Connection::open_in_memory()?;
        schema::init(&conn)?;
        let mut storage = Storage::from_existing_conn(conn);
        if seeded {
            storage.seed(&sample_tracks())?;
        }
        Ok(storage)
    }

    fn create_server(seeded: bool) -> anyhow::Result<HttpServer> {
        Ok(HttpServer::new(setup_storage(seeded)?, HttpConfig::default()))
    }

    fn json_request(method: &str, url: &str, body: &str) -> Request {
        Request::fake_http(
            method,
            url,
            vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body.as_bytes().to_vec(),
        )
    }

    fn empty_request(method: &str, url: &str) -> Request {
        Request::fake_http(method, url, vec![], vec![])
    }

    #[test]
    fn test_http_list_tracks() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("GET", "/api/tracks"));

        assert_eq!(response.status_code, 200);
        let body: Vec<TrackResponse> = parse_json_response(response)?;
        assert_eq!(body.len(), 5);
        assert_eq!(body[0].id, TrackId(1));
        assert_eq!(body[0].song_name.as_deref(), Some("Suck My Kiss"));

        Ok(())
    }

    #[test]
    fn test_http_get_track_success() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("GET", "/api/tracks/4"));

        assert_eq!(response.status_code, 200);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.id, TrackId(4));
        assert_eq!(body.artist.as_deref(), Some("Pantera"));
        assert_eq!(body.release_year, Some(1990));

        Ok(())
    }

    #[test]
    fn test_http_get_track_not_found() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("GET", "/api/tracks/-5"));

        assert_eq!(response.status_code, 404);
        let body: ErrorBody = parse_json_response(response)?;
        assert_eq!(body.message, "Track -5 doesn't exist");

        Ok(())
    }

    #[test]
    fn test_http_get_track_invalid_id() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("GET", "/api/tracks/not-a-number"));

        assert_eq!(response.status_code, 404);

        Ok(())
    }

    #[test]
    fn test_http_create_track() -> anyhow::Result<()> {
        let server = create_server(false)?;

        let response = server.handle_request(&json_request(
            "POST",
            "/api/tracks",
            r#"{"song_name": "Glitch", "artist": "Parkway Drive", "album": "Darker Still", "release_year": 2022}"#,
        ));

        assert_eq!(response.status_code, 201);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.id, TrackId(1));
        assert_eq!(body.song_name.as_deref(), Some("Glitch"));

        let listed: Vec<TrackResponse> =
            parse_json_response(server.handle_request(&empty_request("GET", "/api/tracks")))?;
        assert_eq!(listed, vec![body]);

        Ok(())
    }

    #[test]
    fn test_http_create_with_empty_body() -> anyhow::Result<()> {
        let server = create_server(false)?;

        let response = server.handle_request(&empty_request("POST", "/api/tracks"));

        assert_eq!(response.status_code, 201);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.song_name, None);
        assert_eq!(body.release_year, None);

        Ok(())
    }

    #[test]
    fn test_http_create_malformed_json() -> anyhow::Result<()> {
        let server = create_server(false)?;

        let response = server.handle_request(&json_request("POST", "/api/tracks", "{oops"));

        assert_eq!(response.status_code, 400);

        Ok(())
    }

    #[test]
    fn test_http_put_existing_replaces() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&json_request(
            "PUT",
            "/api/tracks/1",
            r#"{"song_name": "Sir Psycho Sexy", "artist": "Red Hot Chili Peppers", "album": "BSSM", "release_year": 1991}"#,
        ));

        assert_eq!(response.status_code, 200);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.id, TrackId(1));
        assert_eq!(body.album.as_deref(), Some("BSSM"));

        Ok(())
    }

    #[test]
    fn test_http_put_absent_creates() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response =
            server.handle_request(&json_request("PUT", "/api/tracks/999", r#"{"song_name": "X"}"#));

        assert_eq!(response.status_code, 201);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.id, TrackId(6));
        assert_eq!(body.song_name.as_deref(), Some("X"));

        Ok(())
    }

    #[test]
    fn test_http_put_absent_rejected_by_policy() -> anyhow::Result<()> {
        let server = HttpServer::new(
            setup_storage(true)?,
            HttpConfig {
                upsert_policy: UpsertPolicy::Reject,
                ..HttpConfig::default()
            },
        );

        let response =
            server.handle_request(&json_request("PUT", "/api/tracks/999", r#"{"song_name": "X"}"#));

        assert_eq!(response.status_code, 404);

        Ok(())
    }

    #[test]
    fn test_http_patch_track() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&json_request(
            "PATCH",
            "/api/tracks/3",
            r#"{"artist": "Vasiliy Utkin"}"#,
        ));

        assert_eq!(response.status_code, 200);
        let body: TrackResponse = parse_json_response(response)?;
        assert_eq!(body.song_name.as_deref(), Some("Off the Abyss"));
        assert_eq!(body.artist.as_deref(), Some("Vasiliy Utkin"));
        assert_eq!(body.release_year, Some(2021));

        Ok(())
    }

    #[test]
    fn test_http_patch_invalid_year() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&json_request(
            "PATCH",
            "/api/tracks/4",
            r#"{"song_name": "Walk", "release_year": "dsdjsoiddjdid"}"#,
        ));

        assert_eq!(response.status_code, 400);
        let body: ErrorBody = parse_json_response(response)?;
        assert_eq!(body.message, "release_year: expected an integer");

        Ok(())
    }

    #[test]
    fn test_http_patch_not_found() -> anyhow::Result<()> {
        let server = create_server(false)?;

        let response =
            server.handle_request(&json_request("PATCH", "/api/tracks/1", r#"{"artist": "RHCP"}"#));

        assert_eq!(response.status_code, 404);

        Ok(())
    }

    #[test]
    fn test_http_delete_track() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("DELETE", "/api/tracks/2"));
        assert_eq!(response.status_code, 204);

        let response = server.handle_request(&empty_request("GET", "/api/tracks/2"));
        assert_eq!(response.status_code, 404);

        let response = server.handle_request(&empty_request("DELETE", "/api/tracks/2"));
        assert_eq!(response.status_code, 404);
        let body: ErrorBody = parse_json_response(response)?;
        assert_eq!(body.message, "Track 2 doesn't exist");

        Ok(())
    }

    #[test]
    fn test_http_oversized_body() -> anyhow::Result<()> {
        let server = create_server(false)?;
        let name = "x".repeat(MAX_BODY_BYTES as usize);

        let response = server.handle_request(&json_request(
            "POST",
            "/api/tracks",
            &format!(r#"{{"song_name": "{name}"}}"#),
        ));

        assert_eq!(response.status_code, 400);

        Ok(())
    }

    #[test]
    fn test_http_unknown_route() -> anyhow::Result<()> {
        let server = create_server(true)?;

        let response = server.handle_request(&empty_request("GET", "/tracks"));

        assert_eq!(response.status_code, 404);

        Ok(())
    }
}
