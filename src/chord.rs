//! Chord-root inference.
//!
//! After every press/release the keyboard asks this module whether the
//! held keys spell a recognizable triad, and if so which pitch class is
//! acting as its root. The heuristic only knows root-position major and
//! minor triads (root + third + fifth); inversions with a missing root,
//! sevenths and suspended chords are deliberately out of scope.

use crate::keyboard::KeyState;
use crate::tuning::OCTAVE;

/// Minimum number of held keys before inference runs. Fewer than three
/// notes cannot spell a triad.
pub const MIN_CHORD_NOTES: usize = 3;

fn is_pressed(states: &[KeyState], slot: usize) -> bool {
    states.get(slot).copied() == Some(KeyState::Pressed)
}

/// Score a slot's likelihood of being the chord root.
///
/// 0 when the slot is not held or carries no fifth; 3 when a perfect
/// fifth and a major third are held above it; 2 when a perfect fifth and
/// a minor third are. Intervals are checked at both the immediate pitch
/// class and one octave up, because the keyboard spans more than one
/// octave and a chord tone may be voiced in either.
pub fn root_potential(states: &[KeyState], slot: usize) -> u8 {
    if !is_pressed(states, slot) {
        return 0;
    }
    let pc = slot % OCTAVE;
    let fifth = (pc + 7) % OCTAVE;
    let major_third = (pc + 4) % OCTAVE;
    let minor_third = (pc + 3) % OCTAVE;

    let held = |interval_pc: usize| {
        is_pressed(states, interval_pc) || is_pressed(states, interval_pc + OCTAVE)
    };

    if !held(fifth) {
        return 0;
    }
    if held(major_third) {
        3
    } else if held(minor_third) {
        2
    } else {
        0
    }
}

/// Infer the root pitch class of the currently held chord.
///
/// Returns `None` when fewer than [`MIN_CHORD_NOTES`] keys are held or
/// no slot scores above zero. Ties go to the lowest slot index, which
/// favors the lowest-voiced note carrying the winning interval pattern.
pub fn infer_root(states: &[KeyState]) -> Option<u8> {
    let pressed = states.iter().filter(|s| **s == KeyState::Pressed).count();
    if pressed < MIN_CHORD_NOTES {
        return None;
    }

    let potentials: Vec<u8> = (0..states.len())
        .map(|slot| root_potential(states, slot))
        .collect();
    let max = *potentials.iter().max()?;
    if max == 0 {
        return None;
    }
    let winner = potentials.iter().position(|&p| p == max)?;
    Some((winner % OCTAVE) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KEY_COUNT;

    fn held(slots: &[usize]) -> Vec<KeyState> {
        let mut states = vec![KeyState::Released; KEY_COUNT];
        for &s in slots {
            states[s] = KeyState::Pressed;
        }
        states
    }

    #[test]
    fn major_triad_scores_three() {
        let states = held(&[0, 4, 7]); // C E G
        assert_eq!(root_potential(&states, 0), 3);
        assert_eq!(infer_root(&states), Some(0));
    }

    #[test]
    fn minor_triad_scores_two() {
        let states = held(&[0, 3, 7]); // C Eb G
        assert_eq!(root_potential(&states, 0), 2);
        assert_eq!(infer_root(&states), Some(0));
    }

    #[test]
    fn two_notes_are_not_enough() {
        let states = held(&[0, 4]); // C E
        assert_eq!(infer_root(&states), None);
    }

    #[test]
    fn three_unrelated_notes_yield_no_root() {
        let states = held(&[0, 2, 4]); // C D E: no fifth above any of them
        assert_eq!(infer_root(&states), None);
    }

    #[test]
    fn unpressed_slot_scores_zero() {
        let states = held(&[0, 4, 7]);
        assert_eq!(root_potential(&states, 2), 0);
    }

    #[test]
    fn fifth_without_third_scores_zero() {
        let states = held(&[0, 2, 7]); // C D G: bare fifth on C
        assert_eq!(root_potential(&states, 0), 0);
        assert_eq!(infer_root(&states), None);
    }

    #[test]
    fn chord_tones_found_an_octave_up() {
        let states = held(&[0, 16, 19]); // C, E and G in the next octave
        assert_eq!(root_potential(&states, 0), 3);
        assert_eq!(infer_root(&states), Some(0));
    }

    #[test]
    fn upper_octave_root_folds_to_pitch_class() {
        let states = held(&[12, 4, 7]); // C an octave up, with E and G below
        assert_eq!(infer_root(&states), Some(0));
    }

    #[test]
    fn tie_break_prefers_lowest_slot() {
        // C major (0 4 7) and G major (7 11 14) both complete: slot 0 wins.
        let states = held(&[0, 4, 7, 11, 14]);
        assert_eq!(root_potential(&states, 0), 3);
        assert_eq!(root_potential(&states, 7), 3);
        assert_eq!(infer_root(&states), Some(0));
    }

    #[test]
    fn major_outranks_minor() {
        // A minor (9 12 16) against C major (0 4 7): C scores 3, A scores 2.
        let states = held(&[0, 4, 7, 9, 12, 16]);
        assert_eq!(root_potential(&states, 9), 2);
        assert_eq!(infer_root(&states), Some(0));
    }
}
