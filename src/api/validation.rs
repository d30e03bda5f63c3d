//! Request validation.
//!
//! Each function turns raw JSON or query input into typed service input.
//! Violations are collected rather than returned on the first failure, and
//! keys nobody asked for are dropped.

use axum::{Json, extract::rejection::JsonRejection};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use super::ApiError;
use crate::domain::pagination::{
    MAX_PAGE_SIZE, PAGE_PARAM, SIZE_PARAM, SORT_ORDER_PARAM, SORT_PARAM,
};
use crate::domain::{
    FieldSpec, FilterKind, ListQuery, MovieChanges, MovieId, NewMovie, NewUser, Rating,
    UserChanges,
};

const MIN_PASSWORD_LEN: usize = 6;

const DATE_PARAMS: [&str; 2] = ["created_at", "updated_at"];

/// Filter keys a client may send when listing users.
pub const USER_FILTERS: &[&str] = &["name", "email"];

pub const MOVIE_FILTERS: &[&str] = &["director", "name", "genre", "actors"];

pub const VOTE_FILTERS: &[&str] = &["movie_id", "user_id", "rating"];

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static DATE_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern defined in code")
    })
}

fn date_re() -> &'static Regex {
    DATE_RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex pattern defined in code")
    })
}

#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    fn finish<T>(self, value: T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::validation(self.0))
        }
    }

    /// Reads a string field. Empty strings count as missing.
    fn string(&mut self, body: &Map<String, Value>, field: &str, required: bool) -> Option<String> {
        match body.get(field) {
            None | Some(Value::Null) => {
                if required {
                    self.push(format!("{field} is a required field"));
                }
                None
            }
            Some(Value::String(s)) if s.is_empty() => {
                if required {
                    self.push(format!("{field} is a required field"));
                }
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(format!("{field} must be a `string` type"));
                None
            }
        }
    }

    fn email(&mut self, body: &Map<String, Value>, required: bool) -> Option<String> {
        let email = self.string(body, "email", required)?;
        if email_re().is_match(&email) {
            Some(email)
        } else {
            self.push("email must be a valid email");
            None
        }
    }

    fn password(&mut self, body: &Map<String, Value>, required: bool) -> Option<String> {
        let password = self.string(body, "password", required)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            self.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
            return None;
        }
        Some(password)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rating(&mut self, body: &Map<String, Value>) -> Option<Rating> {
        let Some(value) = body.get("rating").filter(|v| !v.is_null()) else {
            self.push("rating is a required field");
            return None;
        };

        // Numeric strings are accepted, like a JSON number.
        let number = match value {
            Value::String(raw) => raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            other => other.as_f64(),
        };
        let Some(number) = number else {
            self.push("rating must be a `number` type");
            return None;
        };

        if number.fract() != 0.0 {
            self.push("rating must be an integer");
            None
        } else if number < f64::from(Rating::MIN) {
            self.push(format!(
                "rating must be greater than or equal to {}",
                Rating::MIN
            ));
            None
        } else if number > f64::from(Rating::MAX) {
            self.push(format!(
                "rating must be less than or equal to {}",
                Rating::MAX
            ));
            None
        } else {
            Rating::new(number as i32)
        }
    }

    fn uuid<T: FromStr>(&mut self, field: &str, raw: &str) -> Option<T> {
        if let Ok(id) = raw.parse() {
            Some(id)
        } else {
            self.push(format!("{field} must be a valid UUID"));
            None
        }
    }
}

/// Unwraps an axum JSON extraction, turning a malformed body into a
/// validation failure.
pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(vec![rejection.body_text()]))
}

fn object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object().ok_or_else(|| {
        ApiError::validation(vec!["this must be a `object` type".to_string()])
    })
}

pub fn validate_user_create(body: &Value) -> Result<NewUser, ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let name = violations.string(body, "name", true);
    let email = violations.email(body, true);
    let password = violations.password(body, true);

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => violations.finish(NewUser {
            name,
            email,
            password,
            is_admin: false,
        }),
        _ => Err(ApiError::validation(violations.0)),
    }
}

pub fn validate_user_update(body: &Value) -> Result<UserChanges, ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let changes = UserChanges {
        name: violations.string(body, "name", false),
        email: violations.email(body, false),
        password: violations.password(body, false),
    };

    violations.finish(changes)
}

/// Returns `(email, password)`.
pub fn validate_session(body: &Value) -> Result<(String, String), ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let email = violations.email(body, true);
    let password = violations.password(body, true);

    match (email, password) {
        (Some(email), Some(password)) => violations.finish((email, password)),
        _ => Err(ApiError::validation(violations.0)),
    }
}

pub fn validate_movie_create(body: &Value) -> Result<NewMovie, ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let director = violations.string(body, "director", true);
    let name = violations.string(body, "name", true);
    let genre = violations.string(body, "genre", true);
    let actors = violations.string(body, "actors", true);

    match (director, name, genre, actors) {
        (Some(director), Some(name), Some(genre), Some(actors)) => violations.finish(NewMovie {
            director,
            name,
            genre,
            actors,
        }),
        _ => Err(ApiError::validation(violations.0)),
    }
}

pub fn validate_movie_update(body: &Value) -> Result<MovieChanges, ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let changes = MovieChanges {
        director: violations.string(body, "director", false),
        name: violations.string(body, "name", false),
        genre: violations.string(body, "genre", false),
        actors: violations.string(body, "actors", false),
    };

    violations.finish(changes)
}

pub fn validate_vote_create(body: &Value) -> Result<(MovieId, Rating), ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    let rating = violations.rating(body);
    let movie_id = match body.get("movie_id") {
        None | Some(Value::Null) => {
            violations.push("movie_id is a required field");
            None
        }
        Some(Value::String(raw)) => violations.uuid("movie_id", raw),
        Some(_) => {
            violations.push("movie_id must be a `string` type");
            None
        }
    };

    match (movie_id, rating) {
        (Some(movie_id), Some(rating)) => violations.finish((movie_id, rating)),
        _ => Err(ApiError::validation(violations.0)),
    }
}

pub fn validate_vote_update(body: &Value) -> Result<Rating, ApiError> {
    let body = object(body)?;
    let mut violations = Violations::default();

    match violations.rating(body) {
        Some(rating) => violations.finish(rating),
        None => Err(ApiError::validation(violations.0)),
    }
}

pub fn validate_path_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    let mut violations = Violations::default();
    match violations.uuid("id", raw) {
        Some(id) => Ok(id),
        None => Err(ApiError::validation(violations.0)),
    }
}

/// Validates list parameters against the entity's filterable keys.
///
/// `fields` supplies the filter kind of each allowed key so id and integer
/// filters can be checked up front.
pub fn validate_list_query(
    params: HashMap<String, String>,
    allowed: &[&str],
    fields: &[FieldSpec],
) -> Result<ListQuery, ApiError> {
    let mut violations = Violations::default();
    let mut kept = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            PAGE_PARAM | SIZE_PARAM => match value.parse::<u64>() {
                Ok(0) | Err(_) => violations.push(format!("{key} must be a positive number")),
                Ok(n) if key == SIZE_PARAM && n > MAX_PAGE_SIZE => violations.push(format!(
                    "{key} must be less than or equal to {MAX_PAGE_SIZE}"
                )),
                Ok(_) => {}
            },
            SORT_ORDER_PARAM => {
                if !matches!(value.to_ascii_lowercase().as_str(), "asc" | "desc") {
                    violations.push("Only available DESC and ASC values.");
                }
            }
            SORT_PARAM => {}
            k if DATE_PARAMS.contains(&k) => {
                if !date_re().is_match(&value) {
                    violations.push(format!("{key} must be in YYYY-MM-DD format"));
                }
            }
            k if allowed.contains(&k) => match FieldSpec::find(fields, k).map(|f| f.kind) {
                Some(FilterKind::Id) if value.parse::<uuid::Uuid>().is_err() => {
                    violations.push(format!("{key} must be a valid UUID"));
                }
                Some(FilterKind::Integer) if value.parse::<i64>().is_err() => {
                    violations.push(format!("{key} must be a `number` type"));
                }
                _ => {}
            },
            _ => continue,
        }
        kept.push((key, value));
    }

    violations.finish(ListQuery::from_params(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserRecord, Vote};
    use serde_json::json;

    fn errors(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation { errors, .. } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_validate_user_create() {
        let user = validate_user_create(&json!({
            "name": "Ann",
            "email": "ann@x.io",
            "password": "secret123",
            "is_admin": true,
        }))
        .unwrap();
        assert_eq!(user.name, "Ann");
        assert!(!user.is_admin);

        let errs = errors(validate_user_create(&json!({"email": "nope", "password": "123"})).unwrap_err());
        assert_eq!(
            errs,
            vec![
                "name is a required field",
                "email must be a valid email",
                "password must be at least 6 characters",
            ]
        );
    }

    #[test]
    fn test_validate_user_update() {
        let changes = validate_user_update(&json!({"name": "Bob"})).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Bob"));
        assert!(changes.email.is_none());
        assert!(changes.password.is_none());

        assert!(validate_user_update(&json!({"password": "abc"})).is_err());
        assert!(validate_user_update(&json!({})).is_ok());
    }

    #[test]
    fn test_validate_session() {
        let (email, password) =
            validate_session(&json!({"email": "ann@x.io", "password": "secret123"})).unwrap();
        assert_eq!(email, "ann@x.io");
        assert_eq!(password, "secret123");

        let err = validate_session(&json!({"email": "ann@x.io"})).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: password is a required field");
    }

    #[test]
    fn test_validate_movie() {
        let movie = validate_movie_create(&json!({
            "director": "Nolan",
            "name": "Memento",
            "genre": "Thriller",
            "actors": "Guy Pearce",
        }))
        .unwrap();
        assert_eq!(movie.name, "Memento");

        let errs = errors(validate_movie_create(&json!({"name": ""})).unwrap_err());
        assert_eq!(errs.len(), 4);

        let changes = validate_movie_update(&json!({"genre": "Drama"})).unwrap();
        assert_eq!(changes.genre.as_deref(), Some("Drama"));
        assert!(changes.name.is_none());
    }

    #[test]
    fn test_validate_vote() {
        let movie_id = MovieId::new_v4();
        let (id, rating) =
            validate_vote_create(&json!({"movie_id": movie_id.to_string(), "rating": 3})).unwrap();
        assert_eq!(id, movie_id);
        assert_eq!(rating.value(), 3);

        let errs = errors(validate_vote_create(&json!({"movie_id": "x", "rating": 5})).unwrap_err());
        assert_eq!(
            errs,
            vec!["rating must be less than or equal to 4", "movie_id must be a valid UUID"]
        );

        assert!(validate_vote_update(&json!({"rating": 0})).is_ok());
        assert!(validate_vote_update(&json!({"rating": -1})).is_err());
        assert!(validate_vote_update(&json!({"rating": 2.5})).is_err());
        assert!(validate_vote_update(&json!({"rating": true})).is_err());
    }

    #[test]
    fn test_validate_vote_accepts_numeric_strings() {
        assert_eq!(validate_vote_update(&json!({"rating": "3"})).unwrap().value(), 3);
        assert_eq!(validate_vote_update(&json!({"rating": " 0 "})).unwrap().value(), 0);

        assert_eq!(
            errors(validate_vote_update(&json!({"rating": "three"})).unwrap_err()),
            vec!["rating must be a `number` type"]
        );
        assert_eq!(
            errors(validate_vote_update(&json!({"rating": "9"})).unwrap_err()),
            vec!["rating must be less than or equal to 4"]
        );
        assert!(validate_vote_update(&json!({"rating": "2.5"})).is_err());
    }

    #[test]
    fn test_validate_path_id() {
        let id = MovieId::new_v4();
        assert_eq!(validate_path_id::<MovieId>(&id.to_string()).unwrap(), id);
        assert!(validate_path_id::<MovieId>("42").is_err());
    }

    #[test]
    fn test_validate_list_query_strips_unknown_keys() {
        let query = validate_list_query(
            params(&[("name", "ann"), ("is_admin", "true"), ("page", "2")]),
            USER_FILTERS,
            UserRecord::FIELDS,
        )
        .unwrap();

        assert_eq!(query.get("name"), Some("ann"));
        assert_eq!(query.get("page"), Some("2"));
        assert_eq!(query.get("is_admin"), None);
    }

    #[test]
    fn test_validate_list_query_collects_errors() {
        let errs = errors(
            validate_list_query(
                params(&[
                    ("page", "0"),
                    ("sortOrder", "up"),
                    ("created_at", "01/02/2024"),
                    ("movie_id", "nope"),
                    ("rating", "high"),
                ]),
                VOTE_FILTERS,
                Vote::FIELDS,
            )
            .unwrap_err(),
        );
        assert_eq!(errs.len(), 5);
        assert!(errs.contains(&"Only available DESC and ASC values.".to_string()));
    }

    #[test]
    fn test_validate_list_query_bounds_page_size() {
        assert_eq!(
            errors(
                validate_list_query(
                    params(&[("size", "18446744073709551615")]),
                    MOVIE_FILTERS,
                    &[],
                )
                .unwrap_err()
            ),
            vec!["size must be less than or equal to 100"]
        );
        assert_eq!(
            errors(
                validate_list_query(params(&[("page", "99999999999999999999")]), MOVIE_FILTERS, &[])
                    .unwrap_err()
            ),
            vec!["page must be a positive number"]
        );

        let query = validate_list_query(
            params(&[("size", "100"), ("page", "18446744073709551615")]),
            MOVIE_FILTERS,
            &[],
        )
        .unwrap();
        assert_eq!(query.to_options().limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_validate_list_query_accepts_any_case_order() {
        assert!(
            validate_list_query(
                params(&[("sortOrder", "DESC"), ("updated_at", "2024-01-31")]),
                MOVIE_FILTERS,
                &[],
            )
            .is_ok()
        );
    }
}
