//! Data layer: core types, reference loading, and record filtering.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ reference │  parse file → ContinuumReference
//!   └───────────┘
//!        │
//!        ▼
//!   ┌────────────────────┐
//!   │ ContinuumReference │  wavelength + is_continuum columns
//!   └────────────────────┘
//!
//!   ┌──────────┐
//!   │  filter  │  metadata predicates → indices of usable stars
//!   └──────────┘
//! ```

pub mod filter;
pub mod model;
pub mod reference;
