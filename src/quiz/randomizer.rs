use rand::Rng;

use crate::quiz::Side;

/// Picks the slot that holds the fake clip for a round.
pub trait SideRandomizer {
    fn assign_sides(&mut self) -> Side;
}

fn side_from_coin(is_fake_on_left: bool) -> Side {
    if is_fake_on_left {
        Side::Left
    } else {
        Side::Right
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandomizer;

impl SideRandomizer for ThreadRandomizer {
    fn assign_sides(&mut self) -> Side {
        side_from_coin(rand::thread_rng().gen_bool(0.5))
    }
}
