use crate::board::Action;

/// Order a card's actions chronologically.
///
/// Dated actions are stably sorted by date among the positions they occupy;
/// undated actions stay at their input index. Nothing is dropped or changed,
/// so normalizing twice gives the same sequence.
pub fn normalize(actions: &[Action]) -> Vec<Action> {
  let slots: Vec<usize> = actions
    .iter()
    .enumerate()
    .filter(|(_, a)| a.date.is_some())
    .map(|(i, _)| i)
    .collect();

  let mut dated: Vec<&Action> = slots.iter().map(|&i| &actions[i]).collect();
  dated.sort_by_key(|a| a.date);

  let mut ordered: Vec<Action> = actions.to_vec();
  for (slot, action) in slots.into_iter().zip(dated) {
    ordered[slot] = action.clone();
  }
  ordered
}
