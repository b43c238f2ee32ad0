// dcos-iam-api: Async Rust client for the DC/OS cluster REST APIs
//
// Covers the three API surfaces the IAM backup tool talks to:
// the ACS identity service (`/acs/api/v1`), the Mesos master
// (`/mesos`) and Marathon (`/marathon/v2`).

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod path;
pub mod transport;

mod acls;
mod cluster;
mod groups;
mod ldap;
mod users;

pub use acls::Principal;
pub use client::AcsClient;
pub use error::Error;
pub use path::{escape_id, normalize_base_url};
pub use transport::{TlsMode, TransportConfig};
pub use users::UserCredential;
