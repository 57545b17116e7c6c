#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Task-management REST API: users register, log in and receive a bearer"]
#![doc = "token, then perform CRUD plus search/pagination over tasks. Tasks are"]
#![doc = "soft-deleted, never physically removed. The main binary (`main.rs`)"]
#![doc = "wires these modules into the running application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
