//! Domain models for the requirement analyzer.
//!
//! # Core Concepts
//!
//! ## Process-wide
//!
//! - [`Document`]: A reference requirement document. The corpus is loaded once and
//!   never mutated while the server runs.
//!
//! ## Per-request
//!
//! These exist only for the lifetime of one analyze call:
//!
//! - [`EvidenceHit`]: A ranked snippet of a corpus document relevant to the request.
//! - [`ProposalSkeleton`]: Title, summary and key points produced by one synthesis round.
//! - [`DraftResult`]: Narrative draft returned by the drafting collaborator, or a placeholder.
//! - [`Proposal`]: A skeleton merged with its draft, returned to the caller.

mod document;
mod evidence;
mod proposal;

pub use document::*;
pub use evidence::*;
pub use proposal::*;
