mod controller;
mod matcher;

pub use controller::SearchController;
pub use matcher::{build_matcher, LineMatcher, MatchError, MatcherKind};
