use crate::aggregate::AggregatedSet;
use crate::idea::Idea;

/// Pick what goes on screen: newest first, at most `cap`.
///
/// The sort is stable, so ideas sharing a timestamp keep their aggregated
/// (priority) order.
pub fn select_for_display(set: &AggregatedSet, cap: usize) -> Vec<Idea> {
    let mut ideas = set.ideas().to_vec();
    ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ideas.truncate(cap);
    ideas
}
