use std::str::FromStr;

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Envelope for every JSON body the API returns, success or failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    // 200 with data
    pub fn success(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::with_data(data))
    }

    // 201 with data
    pub fn created(data: T) -> HttpResponse {
        HttpResponse::Created().json(Self::with_data(data))
    }
}

impl ApiResponse<()> {
    // 200 with only a message
    pub fn message(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
        })
    }

    // Error body (no data)
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

/// Parses an optional enum filter from a query string.
pub fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    raw.filter(|value| !value.is_empty())
        .map(|value| value.parse::<T>().map_err(AppError::Validation))
        .transpose()
}
