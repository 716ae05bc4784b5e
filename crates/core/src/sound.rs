use stellar_protocol::{DomCommand, ToneSpec};

/// Falling one-second sweep played when the Sun turns into a red giant.
pub const RED_GIANT_TONE: ToneSpec = ToneSpec {
    start_hz: 200.0,
    end_hz: 100.0,
    start_gain: 0.1,
    end_gain: 0.01,
    duration_secs: 1.0,
};

/// The red giant sound, unless the user asked for reduced motion.
pub fn red_giant(prefers_reduced_motion: bool) -> Option<DomCommand> {
    (!prefers_reduced_motion).then_some(DomCommand::PlayTone(RED_GIANT_TONE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_reduced_motion() {
        assert_eq!(red_giant(true), None);
        assert_eq!(red_giant(false), Some(DomCommand::PlayTone(RED_GIANT_TONE)));
    }
}
