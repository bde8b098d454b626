use recap_core::{update, AppState, Msg, Phase};

#[test]
fn back_and_scene_selection_are_ignored_when_idle() {
    let state = AppState::new();

    let (next, effects) = update(state.clone(), Msg::BackClicked);
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (mut next, effects) = update(next, Msg::SceneSelected(0));
    assert_eq!(next.phase(), Phase::Idle);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
