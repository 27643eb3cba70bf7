//! Beacon Core - captured-request assertions for tracker tests
//!
//! This crate holds everything a test needs once tracker requests have been
//! captured:
//!
//! - **Request log**: ordered, append-only store of query parameter maps
//! - **Payload decoding**: URL-safe base64 JSON in `cx` / `ue_px`
//! - **Expectations**: partial literal-or-predicate matching over the log
//! - **Derived checks**: distinct page view ids, universal context coverage
//! - **Suite lifecycle**: outcome bookkeeping and teardown
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use beacon_core::{ContextPattern, Expectation, RequestLog, exists, predicates};
//!
//! let log = RequestLog::new();
//! // ... the collector appends captured requests ...
//!
//! let page_view = Expectation::new()
//!     .field("e", "pv")
//!     .field("aid", "CFe23a")
//!     .matcher(
//!         "cx",
//!         predicates::contexts_containing(
//!             ContextPattern::new("iglu:com.example_company/user/jsonschema/2-0-0")
//!                 .with("userType", "tester"),
//!         ),
//!     );
//! assert!(exists(&page_view, &log.snapshot()));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod checks;
pub mod context;
pub mod equality;
mod error;
pub mod expectation;
mod log;
pub mod payload;
pub mod predicates;
pub mod suite;

pub use checks::{
    ContextCoverageCheck, DistinctIdCheck, all_events_have_gdpr_context,
    page_views_have_distinct_ids,
};
pub use context::{ContextPattern, count_matching, find_by_schema};
pub use error::*;
pub use expectation::{Expectation, FieldMatcher, Predicate, exists, find_matches};
pub use log::*;
pub use payload::{SelfDescribing, decode, decode_contexts, decode_unstruct_event, encode};
pub use suite::{AssertionsSummary, Suite, TeardownReport, TestOutcome};
