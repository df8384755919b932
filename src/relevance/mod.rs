//! Relevance Scorer (E), Advanced Scorer (F), Filter-and-Rank (G).

pub mod advanced;
pub mod filter_rank;
pub mod scorer;

pub use advanced::{score_paper_advanced, ScoreBreakdown};
pub use filter_rank::{filter_and_rank, ExcludedPaper, FilterStats, RankedPaper};
pub use scorer::{score_paper, RelevanceResult};
