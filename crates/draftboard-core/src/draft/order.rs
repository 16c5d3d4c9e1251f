// Snake-order arithmetic: which seat acts on a given pick.
//
// Everything here derives from the global pick number and the frozen
// participant count; nothing counts stored picks.

/// Round a 1-based pick number falls in: `ceil(pick / participants)`.
pub fn round_for_pick(pick_number: u32, participants: u32) -> u32 {
    debug_assert!(pick_number >= 1 && participants >= 1);
    pick_number.div_ceil(participants)
}

/// 1-based slot of a pick within its round, before direction is applied.
pub fn slot_in_round(pick_number: u32, participants: u32) -> u32 {
    let round = round_for_pick(pick_number, participants);
    pick_number - (round - 1) * participants
}

/// Draft position that acts on `pick_number`. Odd rounds run `1..=N`, even
/// rounds run `N..=1`.
pub fn draft_position_for_pick(pick_number: u32, participants: u32) -> u32 {
    let round = round_for_pick(pick_number, participants);
    let slot = slot_in_round(pick_number, participants);
    if round % 2 == 1 {
        slot
    } else {
        participants - slot + 1
    }
}

/// Total picks in a draft of `rounds` rounds.
pub fn total_picks(participants: u32, rounds: u32) -> u32 {
    participants * rounds
}
