use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::routing::distance::Coordinate;

/// Command line options. Every flag falls back to an environment
/// variable, then to the defaults of the original deployment.
#[derive(Debug, Parser)]
#[command(
    name = "magicsell_backend",
    about = "Order management and delivery routing backend"
)]
pub struct Args {
    /// Port to listen on [env: PORT]
    #[arg(long)]
    pub port: Option<u16>,

    /// Path of the JSON data file [env: DATA_FILE]
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Depot latitude in decimal degrees [env: DEPOT_LATITUDE]
    #[arg(long)]
    pub depot_latitude: Option<f64>,

    /// Depot longitude in decimal degrees [env: DEPOT_LONGITUDE]
    #[arg(long)]
    pub depot_longitude: Option<f64>,

    /// Postcode printed as the route start point [env: DEPOT_POSTCODE]
    #[arg(long)]
    pub depot_postcode: Option<String>,

    /// Base URL of the postcode lookup service [env: GEOCODER_URL]
    #[arg(long)]
    pub geocoder_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_file: PathBuf,
    /// Fixed route start point for this deployment.
    pub depot: Coordinate,
    pub depot_postcode: String,
    pub depot_name: String,
    pub geocoder_base_url: String,
}

impl AppConfig {
    pub fn load() -> Result<AppConfig> {
        AppConfig::resolve(Args::parse())
    }

    fn resolve(args: Args) -> Result<AppConfig> {
        let port = match args.port {
            Some(port) => port,
            None => match dotenvy::var("PORT") {
                Ok(value) => value.parse().context("PORT is not a valid port number")?,
                Err(_) => 5000,
            },
        };

        let data_file = args
            .data_file
            .or_else(|| dotenvy::var("DATA_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("data.json"));

        let depot_latitude = match args.depot_latitude {
            Some(latitude) => latitude,
            None => match dotenvy::var("DEPOT_LATITUDE") {
                Ok(value) => value.parse().context("DEPOT_LATITUDE is not a number")?,
                Err(_) => 50.7128,
            },
        };

        let depot_longitude = match args.depot_longitude {
            Some(longitude) => longitude,
            None => match dotenvy::var("DEPOT_LONGITUDE") {
                Ok(value) => value.parse().context("DEPOT_LONGITUDE is not a number")?,
                Err(_) => -1.9876,
            },
        };

        let depot_postcode = args
            .depot_postcode
            .or_else(|| dotenvy::var("DEPOT_POSTCODE").ok())
            .unwrap_or_else(|| "BH13 7EX".to_string());

        let geocoder_base_url = args
            .geocoder_url
            .or_else(|| dotenvy::var("GEOCODER_URL").ok())
            .unwrap_or_else(|| "https://api.postcodes.io".to_string());

        Ok(AppConfig {
            port,
            data_file,
            depot: Coordinate::new(depot_latitude, depot_longitude),
            depot_postcode,
            depot_name: dotenvy::var("DEPOT_NAME").unwrap_or_else(|_| "Poole Depot".to_string()),
            geocoder_base_url,
        })
    }
}
