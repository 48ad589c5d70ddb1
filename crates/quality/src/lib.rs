//! Quality gates for finished listings
//!
//! Two post-execution passes over a run's results:
//! - `consistency` - flags photos whose final look diverges from the
//!   listing's locked presets
//! - `validator` - scores structural integrity and enhancement quality into
//!   the confidence score that decides prepared vs needs-review

pub mod consistency;
pub mod models;
pub mod validator;

pub use consistency::check_consistency;
pub use models::{
    ConsistencyFlag, ConsistencyFlagKind, IssueKind, IssueSeverity, ValidationIssue,
    ValidationReport,
};
pub use validator::validate;
