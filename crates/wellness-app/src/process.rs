//! Action processing through a feature's update function

use crate::feature::Feature;

/// Process an action and every follow-up it produces.
///
/// Effects are handed to `spawn` in the order the update function returns
/// them. Returns the number of actions applied.
pub fn process_action<F: Feature>(
    state: &mut F::State,
    action: F::Action,
    mut spawn: impl FnMut(F::Effect),
) -> usize {
    let mut applied = 0;
    let mut next = Some(action);

    while let Some(action) = next {
        tracing::trace!("Processing {}", F::action_name(&action));
        let result = F::update(state, action);
        applied += 1;

        for effect in result.effects {
            spawn(effect);
        }

        // Continue with follow-up action
        next = result.message;
    }

    applied
}
