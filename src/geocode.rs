//! Responsible for turning postcodes into coordinates

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{Instrument, info_span};

use crate::routing::distance::Coordinate;

/// Resolves a postcode to a coordinate, one attempt per call.
///
/// Failures are per stop and never fatal to a sequencing request; the
/// caller keeps the stop and leaves it off the optimized part of the
/// route.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, postcode: &str) -> Result<Coordinate, GeocodeError>;
}

#[derive(thiserror::Error, Debug)]
pub enum GeocodeError {
    #[error("empty postcode")]
    EmptyPostcode,

    #[error("no match for postcode {postcode}")]
    NoMatch { postcode: String },

    #[error("error fetching the postcode lookup")]
    Http(#[from] reqwest::Error),

    #[error("error parsing the postcode lookup response")]
    Parse(#[from] serde_json::Error),
}

static POSTCODE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{1,2}\d[A-Z\d]?)\s*(\d[A-Z]{2})$").unwrap()
});

/// Trims, uppercases and puts the single canonical space before the
/// inward code. Input that doesn't look like a UK postcode is passed
/// through cleaned, the lookup service gets to reject it.
pub fn normalize_postcode(raw: &str) -> Result<String, GeocodeError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.is_empty() {
        return Err(GeocodeError::EmptyPostcode);
    }

    match POSTCODE_SHAPE.captures(&cleaned) {
        Some(captures) => Ok(format!("{} {}", &captures[1], &captures[2])),
        None => Ok(cleaned),
    }
}

/// Client for the free postcodes.io lookup service.
#[derive(Debug, Clone)]
pub struct PostcodesIoGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl PostcodesIoGeocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        PostcodesIoGeocoder {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostcodesIoEnvelope {
    result: Option<PostcodesIoResult>,
}

#[derive(Debug, Deserialize)]
struct PostcodesIoResult {
    latitude: f64,
    longitude: f64,
}

#[async_trait]
impl Geocoder for PostcodesIoGeocoder {
    async fn resolve(&self, postcode: &str) -> Result<Coordinate, GeocodeError> {
        let postcode = normalize_postcode(postcode)?;

        let url = format!("{}/postcodes/{}", self.base_url, postcode.replace(' ', ""));

        let response = self
            .http
            .get(&url)
            .send()
            .instrument(info_span!("Fetching postcode lookup"))
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GeocodeError::NoMatch { postcode });
        }
        let response = response.error_for_status()?;

        let body = response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await?;

        let envelope: PostcodesIoEnvelope = serde_json::from_str(&body)?;

        let result = envelope
            .result
            .ok_or(GeocodeError::NoMatch { postcode })?;

        Ok(Coordinate::new(result.latitude, result.longitude))
    }
}

/// Fixed lookup table, used by tests and offline setups. Keys are
/// normalized postcodes.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    table: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn new(entries: impl IntoIterator<Item = (String, Coordinate)>) -> Self {
        StaticGeocoder {
            table: entries.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, postcode: &str) -> Result<Coordinate, GeocodeError> {
        let postcode = normalize_postcode(postcode)?;

        self.table
            .get(&postcode)
            .copied()
            .ok_or(GeocodeError::NoMatch { postcode })
    }
}
