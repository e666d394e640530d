//! Pyramid geometry: legal moves stay on the board and undo each other.

mod common;

use common::cell;
use qbert::{
    Error,
    board::{Action, Cell, Move, NUM_BLOCKS},
};

#[test]
fn test_valid_moves_stay_on_pyramid() {
    for here in Cell::all() {
        for m in Move::ALL {
            let landing = here.neighbor(m);
            assert_eq!(
                landing.is_some(),
                here.is_valid_move(m),
                "{m} from {here}"
            );
            if let Some(landing) = landing {
                assert!(landing.col() <= landing.row());
                assert!(Cell::all().any(|c| c == landing));
            }
        }
        assert!(!here.valid_moves().is_empty());
    }
    assert_eq!(Cell::all().count(), NUM_BLOCKS);
}

#[test]
fn test_corner_moves() {
    assert_eq!(Cell::TOP.valid_moves().len(), 2);
    assert!(Cell::TOP.is_valid_move(Move::Down));
    assert!(Cell::TOP.is_valid_move(Move::Right));

    assert_eq!(cell(5, 0).valid_moves(), &[Move::Up]);
    assert_eq!(cell(5, 5).valid_moves(), &[Move::Left]);
    assert_eq!(cell(5, 2).valid_moves().len(), 2);
    assert_eq!(cell(3, 0).valid_moves().len(), 3);
    assert_eq!(cell(3, 3).valid_moves().len(), 3);
    assert_eq!(cell(3, 1).valid_moves().len(), 4);
}

#[test]
fn test_inverse_move_returns_home() {
    for here in Cell::all() {
        for (m, there) in here.neighbors() {
            assert_eq!(there.neighbor(m.inverse()), Some(here), "{m} from {here}");
            assert_eq!(m.inverse().inverse(), m);
        }
    }
}

#[test]
fn test_off_pyramid_cells_are_rejected() {
    assert!(matches!(Cell::new(2, 3), Err(Error::InvalidCell { .. })));
    assert!(matches!(Cell::new(-1, 0), Err(Error::InvalidCell { .. })));
    assert!(matches!(Cell::new(6, 0), Err(Error::InvalidCell { .. })));
}

#[test]
fn test_moves_map_to_joystick_codes() {
    for m in Move::ALL {
        assert!((2..=5).contains(&m.code()));
        assert_eq!(Action::from_code(m.code()).unwrap().as_move(), Some(m));
    }
    assert_eq!(Action::Noop.as_move(), None);
}
