//! Core library for countryapp
//!
//! This crate implements the **Functional Core** of the countryapp application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`countryapp_core`** (this crate): Pure transformation functions with zero I/O
//! - **`countryapp`**: HTTP requests, page orchestration, CLI and server (the Imperative Shell)
//!
//! All functions in this crate are deterministic and free of side effects, so they
//! are tested with plain fixture data and no mocking.
//!
//! # Module Organization
//!
//! - [`country`]: REST Countries payloads, the `Country` view model and the mapper between them
//! - [`page`]: The by-capital search page state machine
//! - [`routes`]: The static navigation table
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use countryapp_core::country::{map_rest_countries, RestCountry};
//!
//! let payload: Vec<RestCountry> = serde_json::from_str(body)?;
//! let countries = map_rest_countries(&payload);
//! assert_eq!(countries.len(), payload.len());
//! ```

pub mod country;
pub mod page;
pub mod routes;
