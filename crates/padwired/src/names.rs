use padwire_input::{Axis, Button, Direction, InputEvent};

pub(crate) fn axis_name(axis: u32) -> String {
    Axis::ALL
        .get(axis as usize)
        .map_or_else(|| format!("Axis{axis}"), |a| format!("{a:?}"))
}

pub(crate) fn button_name(button: u32) -> String {
    Button::ALL
        .get(button as usize)
        .map_or_else(|| format!("Button{button}"), |b| format!("{b:?}"))
}

pub(crate) fn direction_suffix(direction: Direction) -> &'static str {
    match direction {
        Direction::Negative => "-",
        Direction::Positive => "+",
    }
}

/// Case-insensitive lookup of a standard axis by name.
pub(crate) fn parse_axis(name: &str) -> Option<Axis> {
    Axis::ALL
        .into_iter()
        .find(|a| format!("{a:?}").eq_ignore_ascii_case(name))
}

/// Case-insensitive lookup of a standard button by name.
pub(crate) fn parse_button(name: &str) -> Option<Button> {
    Button::ALL
        .into_iter()
        .find(|b| format!("{b:?}").eq_ignore_ascii_case(name))
}

pub(crate) fn describe(event: &InputEvent) -> String {
    match *event {
        InputEvent::Axis { slot, axis, value } => {
            format!("slot {slot} {} {value:.3}", axis_name(axis))
        }
        InputEvent::Button {
            slot,
            button,
            pressed,
        } => format!("slot {slot} {} {}", button_name(button), pressed_word(pressed)),
    }
}

pub(crate) fn pressed_word(pressed: bool) -> &'static str {
    if pressed {
        "pressed"
    } else {
        "released"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        assert_eq!(parse_button("dpadup"), Some(Button::DPadUp));
        assert_eq!(parse_button("A"), Some(Button::A));
        assert_eq!(parse_axis("RightTrigger"), Some(Axis::RightTrigger));
        assert_eq!(parse_button("Turbo"), None);
    }

    #[test]
    fn unnamed_indices_fall_back_to_numbers() {
        assert_eq!(axis_name(0), "LeftX");
        assert_eq!(axis_name(9), "Axis9");
        assert_eq!(button_name(20), "Button20");
    }

    #[test]
    fn describe_events() {
        let press = InputEvent::Button { slot: 1, button: 11, pressed: true };
        let axis = InputEvent::Axis { slot: 0, axis: 1, value: -0.5 };
        assert_eq!(describe(&press), "slot 1 A pressed");
        assert_eq!(describe(&axis), "slot 0 LeftY -0.500");
    }
}
