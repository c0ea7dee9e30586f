//! Analysis over extracted bill facts: compare versions, render changelogs,
//! and score funding items for pork likelihood.

pub mod changelog;
pub mod comparator;
pub mod scorer;
pub mod similarity;

pub use changelog::{VersionStep, render_changelog, write_changelog};
pub use comparator::compare;
pub use scorer::{
    AiJudgment, BillContext, BillScoreReport, SemanticJudge, score, score_bill,
    score_with_judgment,
};
