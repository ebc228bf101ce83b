//! Remote backend access (PostgREST/Supabase REST dialect).

mod api_types;
pub mod classify;
mod client;
mod table;

pub use client::{RestClient, RestTable};
pub use table::RemoteTable;
