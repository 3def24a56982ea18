#![cfg(target_arch = "wasm32")]

use gemquest_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn new_game_is_settled() {
    let mut rng = SmallRng::seed_from_u64(1);
    let round =
        Round::new_game(1, GameConfig::default(), PlayerProfile::default(), &mut rng).unwrap();

    assert!(round.board().is_settled());
    assert_eq!(round.phase(), Phase::Playing);
}
