//! Synchronization subsystem — the authoritative state lives on a remote
//! server behind a lossy network, and several operators (plus a
//! background geocoder) edit it concurrently.
//!
//! Best-effort, last-write-wins, sized for small teams: mutations are
//! optimistic with rollback (`mutation`), staleness is resolved by full
//! reload rather than diffing (`broadcast`), and enrichment runs one
//! task at a time behind a rate-limit cool-down (`enrich`). Remote
//! collaborators sit behind the traits in `api`; `http` carries the
//! production `reqwest` implementations.

pub mod api;
pub mod broadcast;
pub mod enrich;
pub mod http;
pub mod mutation;
